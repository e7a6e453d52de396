//! The ten effect variants.
//!
//! Parameter conventions (the arithmetic behind them is table data, not
//! logic this module owns):
//!   Damage/Heal     p1 = base amount, ref_id = formula id for the host
//!   ApplyAura       ref_id = buff id, p1 = per-tick amount, p2 = duration
//!                   ms, p4 = 1 ticks heal instead of damage
//!   Dispel/Steal    ref_id = aura tag (0 = any), p1 = max count (<= 0 = all)
//!   Move            p1 = dash distance when no request point is given
//!   Interrupt       ref_id = skill cid (0 = every active skill)
//!   Threat          p1 = threat amount
//!   Summon          ref_id = recipe id
//!   SpawnArea       ref_id = area id, p1 = per-tick amount, p3 = radius,
//!                   p4 = 1 ticks heal

use data_runtime::skill::EffectCfg;
use glam::DVec3;

use combat_math::{in_circle_2d, normalize2d};

use crate::combat::bus::{
    CtxTag, DamageEvent, DispelEvent, HealEvent, InterruptEvent, MoveEvent, StealEvent,
    SummonEvent, ThreatEvent,
};
use crate::combat::context::CastContext;
use crate::combat::effect::{EffectScope, EffectWorld, SkillEffect};

fn tag_of(ctx: &CastContext) -> CtxTag {
    CtxTag {
        owner: ctx.owner,
        ctx: ctx.id(),
        seq: ctx.current_seq,
    }
}

fn record_damage(ctx: &mut CastContext, amount: i64, hits: i32) {
    let res = ctx.current_result();
    res.damage += amount;
    res.hit_count += hits;
    ctx.total_damage += amount;
    ctx.total_hits += hits;
}

fn record_heal(ctx: &mut CastContext, amount: i64, hits: i32) {
    let res = ctx.current_result();
    res.heal += amount;
    res.hit_count += hits;
    ctx.total_heal += amount;
    ctx.total_hits += hits;
}

macro_rules! inert_ops {
    () => {
        fn update(
            &mut self,
            _ctx: &mut CastContext,
            _scope: &EffectScope<'_>,
            _delta_ms: i64,
            _world: &mut EffectWorld<'_>,
        ) {
        }
        fn end(
            &mut self,
            _ctx: &mut CastContext,
            _scope: &EffectScope<'_>,
            _world: &mut EffectWorld<'_>,
        ) {
        }
        fn revert(
            &mut self,
            _ctx: &mut CastContext,
            _scope: &EffectScope<'_>,
            _world: &mut EffectWorld<'_>,
        ) {
        }
    };
}

pub struct DamageEffect {
    cfg: EffectCfg,
}

impl DamageEffect {
    pub fn new(cfg: EffectCfg) -> DamageEffect {
        DamageEffect { cfg }
    }
}

impl SkillEffect for DamageEffect {
    fn begin(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        let amount = self.cfg.p1.max(0);
        if amount == 0 {
            return;
        }
        let tag = Some(tag_of(ctx));
        for &dst in scope.targets {
            world.bus.damage.push(DamageEvent {
                src: scope.caster,
                dst,
                amount,
                tag,
            });
        }
        record_damage(ctx, amount * scope.targets.len() as i64, scope.targets.len() as i32);
    }

    inert_ops!();
}

pub struct HealEffect {
    cfg: EffectCfg,
}

impl HealEffect {
    pub fn new(cfg: EffectCfg) -> HealEffect {
        HealEffect { cfg }
    }
}

impl SkillEffect for HealEffect {
    fn begin(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        let amount = self.cfg.p1.max(0);
        if amount == 0 {
            return;
        }
        let tag = Some(tag_of(ctx));
        for &dst in scope.targets {
            world.bus.heal.push(HealEvent {
                src: scope.caster,
                dst,
                amount,
                tag,
            });
        }
        record_heal(ctx, amount * scope.targets.len() as i64, scope.targets.len() as i32);
    }

    inert_ops!();
}

pub struct MoveEffect {
    cfg: EffectCfg,
}

impl MoveEffect {
    pub fn new(cfg: EffectCfg) -> MoveEffect {
        MoveEffect { cfg }
    }
}

impl SkillEffect for MoveEffect {
    fn begin(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        // Endpoint: explicit request point, else a dash of p1 units along the
        // request direction (falling back to the caster's facing).
        let to = match ctx.req.pos {
            Some(pos) => pos,
            None => {
                let Some(caster) = world.view.get(scope.caster) else {
                    return;
                };
                let dir = normalize2d(ctx.req.dir.unwrap_or(caster.dir));
                caster.pos + dir * self.cfg.p1 as f64
            }
        };
        for &dst in scope.targets {
            world.bus.moves.push(MoveEvent { dst, to });
        }
    }

    inert_ops!();
}

pub struct InterruptEffect {
    cfg: EffectCfg,
}

impl InterruptEffect {
    pub fn new(cfg: EffectCfg) -> InterruptEffect {
        InterruptEffect { cfg }
    }
}

impl SkillEffect for InterruptEffect {
    fn begin(
        &mut self,
        _ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        for &dst in scope.targets {
            world.bus.interrupts.push(InterruptEvent {
                dst,
                cid: self.cfg.ref_id,
            });
        }
    }

    inert_ops!();
}

pub struct DispelEffect {
    cfg: EffectCfg,
}

impl DispelEffect {
    pub fn new(cfg: EffectCfg) -> DispelEffect {
        DispelEffect { cfg }
    }
}

impl SkillEffect for DispelEffect {
    fn begin(
        &mut self,
        _ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        for &dst in scope.targets {
            world.bus.dispels.push(DispelEvent {
                dst,
                tag: self.cfg.ref_id,
                count: self.cfg.p1,
            });
        }
    }

    inert_ops!();
}

pub struct StealEffect {
    cfg: EffectCfg,
}

impl StealEffect {
    pub fn new(cfg: EffectCfg) -> StealEffect {
        StealEffect { cfg }
    }
}

impl SkillEffect for StealEffect {
    fn begin(
        &mut self,
        _ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        for &dst in scope.targets {
            world.bus.steals.push(StealEvent {
                dst,
                to: scope.caster,
                tag: self.cfg.ref_id,
                count: self.cfg.p1,
            });
        }
    }

    inert_ops!();
}

pub struct ThreatEffect {
    cfg: EffectCfg,
}

impl ThreatEffect {
    pub fn new(cfg: EffectCfg) -> ThreatEffect {
        ThreatEffect { cfg }
    }
}

impl SkillEffect for ThreatEffect {
    fn begin(
        &mut self,
        _ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        for &dst in scope.targets {
            world.bus.threat.push(ThreatEvent {
                dst,
                toward: scope.caster,
                amount: self.cfg.p1,
            });
        }
    }

    inert_ops!();
}

pub struct SummonEffect {
    cfg: EffectCfg,
}

impl SummonEffect {
    pub fn new(cfg: EffectCfg) -> SummonEffect {
        SummonEffect { cfg }
    }
}

impl SkillEffect for SummonEffect {
    fn begin(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        let Some(caster) = world.view.get(scope.caster) else {
            return;
        };
        let pos = ctx.req.pos.unwrap_or(caster.pos);
        world.bus.summons.push(SummonEvent {
            owner: scope.caster,
            recipe: self.cfg.ref_id,
            pos,
            faction: caster.faction,
        });
    }

    inert_ops!();
}

/// Buff/debuff carrier. The runtime's presence is the aura; ticks settle the
/// periodic component and the buff's stat modifiers are host data keyed by
/// `ref_id`.
pub struct AuraEffect {
    cfg: EffectCfg,
}

impl AuraEffect {
    pub fn new(cfg: EffectCfg) -> AuraEffect {
        AuraEffect { cfg }
    }
}

impl SkillEffect for AuraEffect {
    fn begin(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        _world: &mut EffectWorld<'_>,
    ) {
        let res = ctx.current_result();
        res.targets = scope.targets.to_vec();
    }

    fn update(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        _delta_ms: i64,
        world: &mut EffectWorld<'_>,
    ) {
        let amount = self.cfg.p1.max(0);
        if amount == 0 {
            return;
        }
        let tag = Some(tag_of(ctx));
        let heals = self.cfg.p4 == 1;
        for &dst in scope.targets {
            if heals {
                world.bus.heal.push(HealEvent {
                    src: scope.caster,
                    dst,
                    amount,
                    tag,
                });
            } else {
                world.bus.damage.push(DamageEvent {
                    src: scope.caster,
                    dst,
                    amount,
                    tag,
                });
            }
        }
        let total = amount * scope.targets.len() as i64;
        let hits = scope.targets.len() as i32;
        if heals {
            record_heal(ctx, total, hits);
        } else {
            record_damage(ctx, total, hits);
        }
    }

    fn end(&mut self, _ctx: &mut CastContext, _scope: &EffectScope<'_>, _world: &mut EffectWorld<'_>) {}

    fn revert(
        &mut self,
        _ctx: &mut CastContext,
        _scope: &EffectScope<'_>,
        _world: &mut EffectWorld<'_>,
    ) {
    }
}

/// Ground effect anchored where the cast landed; each tick sweeps the circle.
pub struct SpawnAreaEffect {
    cfg: EffectCfg,
    anchor: Option<DVec3>,
}

impl SpawnAreaEffect {
    pub fn new(cfg: EffectCfg) -> SpawnAreaEffect {
        SpawnAreaEffect { cfg, anchor: None }
    }
}

impl SkillEffect for SpawnAreaEffect {
    fn begin(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        world: &mut EffectWorld<'_>,
    ) {
        self.anchor = ctx
            .req
            .pos
            .or_else(|| world.view.get(scope.caster).map(|c| c.pos));
    }

    fn update(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        _delta_ms: i64,
        world: &mut EffectWorld<'_>,
    ) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let view = world.view;
        let Some(caster) = view.get(scope.caster) else {
            return;
        };
        let amount = self.cfg.p1.max(0);
        let radius = self.cfg.p3 as f64;
        if amount == 0 || radius <= 0.0 {
            return;
        }
        let heals = self.cfg.p4 == 1;
        let tag = Some(tag_of(ctx));
        let mut hits = 0;
        for e in view.iter() {
            if !e.alive || !in_circle_2d(anchor, radius, e.pos) {
                continue;
            }
            // Damage areas burn hostiles, heal areas mend allies.
            let affected = if heals {
                caster.faction.is_ally(e.faction)
            } else {
                caster.faction.is_hostile(e.faction)
            };
            if !affected {
                continue;
            }
            if heals {
                world.bus.heal.push(HealEvent {
                    src: scope.caster,
                    dst: e.id,
                    amount,
                    tag,
                });
            } else {
                world.bus.damage.push(DamageEvent {
                    src: scope.caster,
                    dst: e.id,
                    amount,
                    tag,
                });
            }
            hits += 1;
        }
        if hits > 0 {
            let total = amount * hits as i64;
            if heals {
                record_heal(ctx, total, hits);
            } else {
                record_damage(ctx, total, hits);
            }
        }
    }

    fn end(&mut self, _ctx: &mut CastContext, _scope: &EffectScope<'_>, _world: &mut EffectWorld<'_>) {}

    fn revert(
        &mut self,
        _ctx: &mut CastContext,
        _scope: &EffectScope<'_>,
        _world: &mut EffectWorld<'_>,
    ) {
    }
}
