//! Runtime record of one persistent effect (DoT/HoT/aura/area).
//!
//! Lifecycle: Pending → Active (⇄ Paused) → Finished | Cancelled. Terminal
//! states are absorbing. Caster and targets are held as ids and resolved
//! through the zone view on use; a vanished entity is a no-op, never a
//! dangling reference.

use data_runtime::skill::{EffectCfg, EffectType};
use uid_core::Uid;

use crate::combat::context::CastContext;
use crate::combat::effect::{EffectScope, EffectWorld, SkillEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    Pending,
    Active,
    Paused,
    Finished,
    Cancelled,
}

impl EffectState {
    pub fn is_terminal(self) -> bool {
        matches!(self, EffectState::Finished | EffectState::Cancelled)
    }
}

pub struct EffectRuntime {
    pub id: Uid,

    effect: Box<dyn SkillEffect>,
    /// Variant tag, kept for aura matching (dispel/steal).
    pub kind: EffectType,
    /// Aura tag (`ref_id`); 0 when the variant has none.
    pub aura_tag: i64,

    pub ctx: Uid,
    pub caster: Uid,
    pub targets: Vec<Uid>,

    pub start_ms: i64,
    pub end_ms: i64,
    pub last_tick_ms: i64,
    /// Duration from activation; 0 runs until tick-capped or removed.
    duration_ms: i64,

    pub tick_interval_ms: i64,
    pub tick_count: i32,
    /// 0 = unlimited.
    pub max_ticks: i32,

    pub state: EffectState,
}

impl EffectRuntime {
    /// Build a runtime from an effect config: `p2 > 0` is the duration,
    /// `interval_ms` the tick period, `times > 0` the tick cap.
    pub fn new(
        effect: Box<dyn SkillEffect>,
        cfg: &EffectCfg,
        ctx: Uid,
        caster: Uid,
        targets: Vec<Uid>,
    ) -> EffectRuntime {
        EffectRuntime {
            id: uid_core::gen(),
            effect,
            kind: cfg.kind,
            aura_tag: cfg.ref_id,
            ctx,
            caster,
            targets,
            start_ms: 0,
            end_ms: 0,
            last_tick_ms: 0,
            duration_ms: cfg.p2.max(0),
            tick_interval_ms: cfg.interval_ms.max(0) as i64,
            tick_count: 0,
            max_ticks: cfg.times.max(0),
            state: EffectState::Pending,
        }
    }

    pub fn activate(&mut self, now_ms: i64) {
        if self.state != EffectState::Pending {
            return;
        }
        self.state = EffectState::Active;
        self.start_ms = now_ms;
        self.last_tick_ms = now_ms;
        if self.duration_ms > 0 {
            self.end_ms = now_ms + self.duration_ms;
        }
    }

    pub fn pause(&mut self) {
        if self.state != EffectState::Active {
            return;
        }
        self.state = EffectState::Paused;
    }

    /// Resume ticking. The interval restarts from `now_ms` so a long pause
    /// cannot produce a burst tick; the end time is unchanged.
    pub fn resume(&mut self, now_ms: i64) {
        if self.state != EffectState::Paused {
            return;
        }
        self.state = EffectState::Active;
        self.last_tick_ms = now_ms;
    }

    pub fn is_running(&self) -> bool {
        self.state == EffectState::Active
    }

    pub fn should_tick(&self, now_ms: i64) -> bool {
        if self.state != EffectState::Active {
            return false;
        }
        if self.tick_interval_ms > 0 && now_ms - self.last_tick_ms < self.tick_interval_ms {
            return false;
        }
        if self.max_ticks > 0 && self.tick_count >= self.max_ticks {
            return false;
        }
        true
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        if self.state.is_terminal() {
            return true;
        }
        if self.state != EffectState::Active {
            return false;
        }
        if self.end_ms > 0 && now_ms >= self.end_ms {
            return true;
        }
        if self.max_ticks > 0 && self.tick_count >= self.max_ticks {
            return true;
        }
        false
    }

    /// Run `begin` against the stored caster/targets.
    pub fn begin(&mut self, ctx: &mut CastContext, world: &mut EffectWorld<'_>) {
        let EffectRuntime {
            effect,
            caster,
            targets,
            ..
        } = self;
        let scope = EffectScope {
            caster: *caster,
            targets,
        };
        effect.begin(ctx, &scope, world);
    }

    /// Run one tick when due.
    pub fn do_tick(&mut self, now_ms: i64, ctx: &mut CastContext, world: &mut EffectWorld<'_>) {
        if !self.should_tick(now_ms) {
            return;
        }
        let delta = now_ms - self.last_tick_ms;
        let EffectRuntime {
            effect,
            caster,
            targets,
            ..
        } = self;
        let scope = EffectScope {
            caster: *caster,
            targets,
        };
        effect.update(ctx, &scope, delta, world);
        self.last_tick_ms = now_ms;
        self.tick_count += 1;
    }

    /// Natural end: run `end` once and become Finished. Idempotent.
    pub fn finish(&mut self, ctx: &mut CastContext, world: &mut EffectWorld<'_>) {
        if self.state.is_terminal() {
            return;
        }
        let EffectRuntime {
            effect,
            caster,
            targets,
            ..
        } = self;
        let scope = EffectScope {
            caster: *caster,
            targets,
        };
        effect.end(ctx, &scope, world);
        self.state = EffectState::Finished;
    }

    /// Early removal: run `revert` once and become Cancelled. Idempotent.
    pub fn cancel(&mut self, ctx: &mut CastContext, world: &mut EffectWorld<'_>) {
        if self.state.is_terminal() {
            return;
        }
        let EffectRuntime {
            effect,
            caster,
            targets,
            ..
        } = self;
        let scope = EffectScope {
            caster: *caster,
            targets,
        };
        effect.revert(ctx, &scope, world);
        self.state = EffectState::Cancelled;
    }

    /// Mark Cancelled without running hooks; used when a variant panicked
    /// and its state can no longer be trusted.
    pub fn poison(&mut self) {
        if !self.state.is_terminal() {
            self.state = EffectState::Cancelled;
        }
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        if self.end_ms <= 0 {
            return -1;
        }
        (self.end_ms - now_ms).max(0)
    }

    pub fn progress(&self, now_ms: i64) -> f32 {
        if self.end_ms <= 0 || self.start_ms <= 0 {
            return 0.0;
        }
        let total = self.end_ms - self.start_ms;
        if total <= 0 {
            return 1.0;
        }
        let elapsed = now_ms - self.start_ms;
        if elapsed >= total {
            return 1.0;
        }
        elapsed as f32 / total as f32
    }
}
