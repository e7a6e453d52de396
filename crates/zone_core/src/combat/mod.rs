//! Per-entity combat module: skill manager, effect manager, cast contexts
//! and the threat table.
//!
//! `update` advances skills before effects so firings scheduled this tick
//! are visible to persistent runtimes on the same tick.

pub mod bus;
pub mod context;
pub mod dispatch;
pub mod effect;
pub mod effect_mgr;
pub mod effect_runtime;
pub mod effects;
pub mod skill;

use std::sync::Arc;

use data_runtime::attr::{AttrType, Attrs};
use data_runtime::skill::SkillSpec;
use uid_core::Uid;

use crate::combat::bus::CombatBus;
use crate::combat::context::CastContext;
use crate::combat::effect::EffectWorld;
use crate::combat::effect_mgr::EffectManager;
use crate::combat::skill::{Skill, SkillState};
use crate::container::{OrderedMap, OrderedSet};
use crate::request::CastRequest;
use crate::zone::ZoneView;

/// Known skills of one entity, in learn order, plus the skill clock.
pub struct SkillManager {
    map: OrderedMap<i64, Skill>,
    pub now_ms: i64,
}

impl Default for SkillManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillManager {
    pub fn new() -> SkillManager {
        SkillManager {
            map: OrderedMap::new(),
            now_ms: 0,
        }
    }

    pub fn add(&mut self, spec: SkillSpec) {
        if spec.cid == 0 {
            return;
        }
        self.map.insert(spec.cid, Skill::new(Arc::new(spec)));
    }

    pub fn get(&self, cid: i64) -> Option<&Skill> {
        self.map.get(&cid)
    }

    pub fn get_mut(&mut self, cid: i64) -> Option<&mut Skill> {
        self.map.get_mut(&cid)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &Skill)> {
        self.map.iter()
    }
}

pub struct CombatModule {
    owner: Uid,
    attrs: Attrs,

    hp: i64,
    max_hp: i64,
    mp: i64,
    max_mp: i64,

    pub skills: SkillManager,
    pub effects: EffectManager,
    contexts: OrderedMap<Uid, CastContext>,
    threat: OrderedMap<Uid, i64>,
}

impl CombatModule {
    pub fn new(owner: Uid, attrs: Attrs) -> CombatModule {
        let max_hp = attrs.get_value(AttrType::MaxHp);
        let max_mp = attrs.get_value(AttrType::MaxMp);
        CombatModule {
            owner,
            attrs,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            skills: SkillManager::new(),
            effects: EffectManager::new(),
            contexts: OrderedMap::new(),
            threat: OrderedMap::new(),
        }
    }

    pub fn owner(&self) -> Uid {
        self.owner
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn hp(&self) -> i64 {
        self.hp
    }

    pub fn max_hp(&self) -> i64 {
        self.max_hp
    }

    pub fn mp(&self) -> i64 {
        self.mp
    }

    pub fn max_mp(&self) -> i64 {
        self.max_mp
    }

    pub fn add_skill(&mut self, spec: SkillSpec) {
        self.skills.add(spec);
    }

    /// Whether `cid` could start right now (state + GCD + cooldown). Mana is
    /// checked by [`CombatModule::cast`], not here.
    pub fn can_cast(&self, cid: i64) -> bool {
        self.skills
            .get(cid)
            .map(|s| s.can_cast(self.skills.now_ms))
            .unwrap_or(false)
    }

    /// Try to cast. A `false` is "not ready", never an error: unknown skill,
    /// cooldown, GCD, or not enough mana. Mana is deducted exactly when the
    /// cast starts.
    pub fn cast(&mut self, cid: i64, req: CastRequest) -> bool {
        let now = self.skills.now_ms;
        let Some(skill) = self.skills.map.get_mut(&cid) else {
            return false;
        };
        if !skill.can_cast(now) {
            return false;
        }
        let cost = skill.spec.cost_mp;
        if cost > self.mp {
            return false;
        }

        let ctx = CastContext::new(self.owner, req, 1);
        let ctx_id = ctx.id();
        self.contexts.insert(ctx_id, ctx);
        let ok = skill.start_cast(now, ctx_id);
        if ok {
            self.mp -= cost;
        } else {
            self.contexts.remove(&ctx_id);
        }
        ok
    }

    pub fn cancel(&mut self, cid: i64) {
        let now = self.skills.now_ms;
        if let Some(skill) = self.skills.map.get_mut(&cid) {
            skill.cancel(now);
        }
    }

    /// Interrupt: cancel one skill, or every active one when `cid == 0`.
    pub fn interrupt(&mut self, cid: i64) {
        let now = self.skills.now_ms;
        if cid != 0 {
            if let Some(skill) = self.skills.map.get_mut(&cid) {
                if skill.state != SkillState::Idle {
                    skill.cancel(now);
                }
            }
            return;
        }
        for skill in self.skills.map.values_mut() {
            if skill.state != SkillState::Idle {
                skill.cancel(now);
            }
        }
    }

    /// External hit entry (projectile arrival etc.): attach a fresh context
    /// and schedule the hit list.
    pub fn trigger_hit(&mut self, cid: i64, req: CastRequest) -> bool {
        let now = self.skills.now_ms;
        let Some(skill) = self.skills.map.get_mut(&cid) else {
            return false;
        };
        let ctx = CastContext::new(self.owner, req, 1);
        let ctx_id = ctx.id();
        self.contexts.insert(ctx_id, ctx);
        skill.trigger_hit(now, ctx_id);
        true
    }

    /// Advance skills, then persistent effects, with one clock step.
    pub fn update(&mut self, delta_ms: i64, view: &ZoneView, bus: &mut CombatBus) {
        // Contexts from finished casts survive until the start of the next
        // tick so the zone's apply phase can still write kill credit back.
        self.sweep_contexts();

        {
            let CombatModule {
                owner,
                skills,
                effects,
                contexts,
                ..
            } = self;
            skills.now_ms += delta_ms;
            let now = skills.now_ms;
            for sk in skills.map.values_mut() {
                let spec = sk.spec.clone();
                sk.update(now, |stage, eff, ctx_id| {
                    dispatch::exec_effect(
                        *owner, &spec, stage, eff, ctx_id, contexts, effects, view, bus, now,
                    );
                });
            }
        }

        self.effects.update(delta_ms, &mut self.contexts, view, bus);
    }

    /// Drop contexts nothing references anymore: no skill that may still
    /// fire them, no live effect runtime.
    fn sweep_contexts(&mut self) {
        if self.contexts.is_empty() {
            return;
        }
        let mut live = OrderedSet::new();
        for sk in self.skills.map.values() {
            if sk.ctx.is_valid() && (sk.state != SkillState::Idle || !sk.pending.is_empty()) {
                live.insert(sk.ctx);
            }
        }
        for (_, rt) in self.effects.iter() {
            if !rt.state.is_terminal() {
                live.insert(rt.ctx);
            }
        }
        self.contexts.retain(|id, _| live.contains(id));
    }

    pub fn context(&self, id: Uid) -> Option<&CastContext> {
        self.contexts.get(&id)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &CastContext> {
        self.contexts.values()
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Apply incoming damage. Returns true when this blow was fatal.
    pub fn apply_damage(&mut self, amount: i64) -> bool {
        if amount <= 0 {
            return false;
        }
        let pre = self.hp;
        self.hp = (self.hp - amount).max(0);
        pre > 0 && self.hp == 0
    }

    pub fn apply_heal(&mut self, amount: i64) {
        if amount <= 0 {
            return;
        }
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Write kill credit back into the cast context that caused it.
    pub fn record_kill(&mut self, ctx_id: Uid, seq: i32) {
        if let Some(ctx) = self.contexts.get_mut(&ctx_id) {
            ctx.kill_count += 1;
            if let Some(res) = ctx.result_by_seq_mut(seq) {
                res.killed_any = true;
            }
        }
    }

    pub fn adjust_threat(&mut self, toward: Uid, amount: i64) {
        if let Some(v) = self.threat.get_mut(&toward) {
            *v += amount;
        } else {
            self.threat.insert(toward, amount);
        }
    }

    pub fn threat_of(&self, toward: Uid) -> i64 {
        self.threat.get(&toward).copied().unwrap_or(0)
    }

    /// Highest-threat entry; ties go to the earliest registered.
    pub fn top_threat(&self) -> Option<(Uid, i64)> {
        let mut best: Option<(Uid, i64)> = None;
        for (id, v) in self.threat.iter() {
            if best.map(|(_, b)| *v > b).unwrap_or(true) {
                best = Some((*id, *v));
            }
        }
        best
    }

    /// Cancel up to `limit` matching auras on `victim` held by this module.
    pub fn dispel_auras_on(
        &mut self,
        victim: Uid,
        tag: i64,
        limit: i64,
        view: &ZoneView,
        bus: &mut CombatBus,
    ) -> i64 {
        let CombatModule {
            effects, contexts, ..
        } = self;
        let mut world = EffectWorld {
            view,
            bus,
            now_ms: effects.now_ms,
        };
        effects.dispel_auras(victim, tag, limit, contexts, &mut world)
    }

    /// Re-home up to `limit` matching auras from `victim` to `thief`.
    pub fn steal_auras_from(&mut self, victim: Uid, thief: Uid, tag: i64, limit: i64) -> i64 {
        self.effects.retarget_auras(victim, thief, tag, limit)
    }

    /// End every persistent effect this module owns.
    pub fn clear_effects(&mut self, view: &ZoneView, bus: &mut CombatBus) {
        let CombatModule {
            effects, contexts, ..
        } = self;
        let mut world = EffectWorld {
            view,
            bus,
            now_ms: effects.now_ms,
        };
        effects.clear(contexts, &mut world);
    }

    /// End every persistent effect this module owns that targets `target`.
    pub fn clear_effects_by_target(&mut self, target: Uid, view: &ZoneView, bus: &mut CombatBus) {
        let CombatModule {
            effects, contexts, ..
        } = self;
        let mut world = EffectWorld {
            view,
            bus,
            now_ms: effects.now_ms,
        };
        effects.clear_by_target(target, contexts, &mut world);
    }
}
