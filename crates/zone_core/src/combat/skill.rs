//! Per-skill runtime: the Idle/Casting/Channeling state machine plus the
//! queue of scheduled effect firings.
//!
//! A `Skill` never settles damage or heals itself; it only advances the
//! timeline and hands due effect entries to the `exec` callback, which runs
//! target selection and dispatch one layer up.

use std::sync::Arc;

use data_runtime::skill::{EffectCfg, SkillSpec, TimingPoint};
use uid_core::Uid;

/// Execution stage of a skill's timeline. Ordering matters: entries due at
/// the same time fire in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    CastStart = 1,
    CastFinish = 2,
    ChannelTick = 3,
    Hit = 4,
    Cancel = 5,
}

/// One pending effect firing.
#[derive(Debug, Clone)]
pub struct ScheduledEffect {
    pub at: i64,
    pub stage: Stage,
    pub effect: EffectCfg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkillState {
    #[default]
    Idle,
    Casting,
    Channeling,
}

pub struct Skill {
    pub spec: Arc<SkillSpec>,

    /// Cooldown / global-cooldown deadlines, ms on the skill clock.
    pub cd_end_at: i64,
    pub gcd_end_at: i64,

    pub state: SkillState,
    pub cast_end_at: i64,
    pub channel_end_at: i64,

    /// Charge pool; active only when `spec.charges > 1`.
    pub charges_left: i32,
    recharge_at: i64,

    /// Context of the current cast; `Uid::ZERO` when none.
    pub ctx: Uid,
    pub pending: Vec<ScheduledEffect>,
}

impl Skill {
    pub fn new(spec: Arc<SkillSpec>) -> Skill {
        let charges_left = if spec.charges > 1 { spec.charges } else { 0 };
        Skill {
            spec,
            cd_end_at: 0,
            gcd_end_at: 0,
            state: SkillState::Idle,
            cast_end_at: 0,
            channel_end_at: 0,
            charges_left,
            recharge_at: 0,
            ctx: Uid::ZERO,
            pending: Vec::new(),
        }
    }

    fn charged(&self) -> bool {
        self.spec.charges > 1
    }

    pub fn can_cast(&self, now: i64) -> bool {
        if self.state != SkillState::Idle {
            return false;
        }
        if self.gcd_end_at > now {
            return false;
        }
        if self.cd_end_at > now {
            return false;
        }
        true
    }

    /// Try to start a cast. On success the cast-start list is scheduled and
    /// the skill either enters Casting or finishes instantly.
    pub fn start_cast(&mut self, now: i64, ctx: Uid) -> bool {
        if !self.can_cast(now) {
            return false;
        }

        self.ctx = ctx;

        let gcd_start = start_point(self.spec.gcd_start_at);
        let cd_start = start_point(self.spec.cooldown_start_at);
        if gcd_start == TimingPoint::CastStart && self.spec.gcd_ms > 0 {
            self.gcd_end_at = now + self.spec.gcd_ms as i64;
        }
        if self.charged() {
            self.consume_charge(now);
        } else if cd_start == TimingPoint::CastStart && self.spec.cooldown_ms > 0 {
            self.cd_end_at = now + self.spec.cooldown_ms as i64;
        }

        let list = self.spec.effects.on_cast_start.clone();
        self.schedule_list(Stage::CastStart, now, 0, &list);

        if self.spec.cast_time_ms > 0 {
            self.state = SkillState::Casting;
            self.cast_end_at = now + self.spec.cast_time_ms as i64;
            return true;
        }

        self.finish_cast(now);
        true
    }

    /// Cancel or interrupt a cast/channel. Pending firings are dropped and
    /// the cancel list is scheduled at `now`. Cooldowns already started stay.
    pub fn cancel(&mut self, now: i64) {
        if self.state == SkillState::Idle {
            return;
        }

        self.state = SkillState::Idle;
        self.cast_end_at = 0;
        self.channel_end_at = 0;
        self.pending.clear();

        let list = self.spec.effects.on_cancel.clone();
        self.schedule_list(Stage::Cancel, now, 0, &list);
    }

    /// External hit entry (projectile arrival etc.). Attaches `ctx` and
    /// schedules the hit list at `now`.
    pub fn trigger_hit(&mut self, now: i64, ctx: Uid) {
        self.ctx = ctx;
        let list = self.spec.effects.on_hit.clone();
        self.schedule_list(Stage::Hit, now, 0, &list);
    }

    /// Advance the state machine, then fire every pending entry due by `now`
    /// through `exec`, in `(at, stage)` order.
    pub fn update(&mut self, now: i64, mut exec: impl FnMut(Stage, &EffectCfg, Uid)) {
        if self.charged() {
            self.refill_charges(now);
        }

        if self.state == SkillState::Casting && self.cast_end_at > 0 && now >= self.cast_end_at {
            self.finish_cast(now);
        }
        if self.state == SkillState::Channeling
            && self.channel_end_at > 0
            && now >= self.channel_end_at
        {
            self.state = SkillState::Idle;
            self.channel_end_at = 0;
        }

        if self.pending.is_empty() {
            return;
        }

        self.pending.sort_by_key(|e| (e.at, e.stage));

        let mut fired = 0;
        while fired < self.pending.len() && self.pending[fired].at <= now {
            let entry = &self.pending[fired];
            exec(entry.stage, &entry.effect, self.ctx);
            fired += 1;
        }
        if fired > 0 {
            self.pending.drain(..fired);
        }
    }

    fn finish_cast(&mut self, now: i64) {
        self.state = SkillState::Idle;
        self.cast_end_at = 0;

        let gcd_start = start_point(self.spec.gcd_start_at);
        let cd_start = start_point(self.spec.cooldown_start_at);
        if gcd_start == TimingPoint::CastFinish && self.spec.gcd_ms > 0 {
            self.gcd_end_at = now + self.spec.gcd_ms as i64;
        }
        if !self.charged() && cd_start == TimingPoint::CastFinish && self.spec.cooldown_ms > 0 {
            self.cd_end_at = now + self.spec.cooldown_ms as i64;
        }

        let list = self.spec.effects.on_cast_finish.clone();
        self.schedule_list(Stage::CastFinish, now, 0, &list);

        if self.spec.hit_on_cast_finish {
            let mut hit_at = now;
            if self.spec.hit_delay_ms > 0 {
                hit_at = now + self.spec.hit_delay_ms as i64;
            }
            let list = self.spec.effects.on_hit.clone();
            self.schedule_list(Stage::Hit, hit_at, 0, &list);
        }

        if self.spec.channel_time_ms > 0 {
            self.state = SkillState::Channeling;
            self.channel_end_at = now + self.spec.channel_time_ms as i64;
            let mut start_at = now;
            if self.spec.channel_tick_delay_ms > 0 {
                start_at = now + self.spec.channel_tick_delay_ms as i64;
            }
            let list = self.spec.effects.on_channel_tick.clone();
            self.schedule_list(Stage::ChannelTick, start_at, self.channel_end_at, &list);
        }
    }

    fn schedule_list(&mut self, stage: Stage, start_at: i64, end_at: i64, list: &[EffectCfg]) {
        for eff in list {
            self.schedule_effect(stage, start_at, end_at, eff);
        }
    }

    /// Schedule one effect as 1..n firings. An explicit `times > 1` wins;
    /// otherwise channel ticks derive their count from the channel length.
    /// Entries past `end_at` (when set) are dropped, not clamped.
    fn schedule_effect(&mut self, stage: Stage, start_at: i64, end_at: i64, eff: &EffectCfg) {
        let mut times = eff.times;
        if times <= 1 {
            times = 1;
            if stage == Stage::ChannelTick
                && self.spec.channel_tick_ms > 0
                && self.spec.channel_time_ms > 0
            {
                let tick = self.spec.channel_tick_ms as i64;
                let total = self.spec.channel_time_ms as i64;
                times = ((total + tick - 1) / tick).max(1) as i32;
            }
        }
        let mut interval = eff.interval_ms.max(0) as i64;
        if interval == 0 && stage == Stage::ChannelTick && self.spec.channel_tick_ms > 0 {
            interval = self.spec.channel_tick_ms as i64;
        }

        for i in 0..times as i64 {
            let at = start_at + i * interval;
            if end_at > 0 && at > end_at {
                break;
            }
            self.pending.push(ScheduledEffect {
                at,
                stage,
                effect: eff.clone(),
            });
        }
    }

    fn consume_charge(&mut self, now: i64) {
        if self.charges_left >= self.spec.charges {
            // Pool was full; the refill timer starts with this consumption.
            self.recharge_at = now + self.spec.recharge_ms as i64;
        }
        self.charges_left -= 1;
        if self.charges_left <= 0 {
            self.cd_end_at = self.recharge_at;
        }
    }

    fn refill_charges(&mut self, now: i64) {
        while self.charges_left < self.spec.charges && self.recharge_at > 0 && now >= self.recharge_at
        {
            self.charges_left += 1;
            if self.charges_left < self.spec.charges {
                self.recharge_at += self.spec.recharge_ms as i64;
            } else {
                self.recharge_at = 0;
            }
        }
    }
}

fn start_point(p: TimingPoint) -> TimingPoint {
    if p == TimingPoint::Invalid {
        TimingPoint::CastStart
    } else {
        p
    }
}
