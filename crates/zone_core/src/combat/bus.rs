//! Per-tick combat event bus.
//!
//! Effect variants never reach into other entities; they emit events here and
//! the zone applies them once every entity has advanced. Events that should
//! flow back into a cast context (kill credit) carry a [`CtxTag`].

use glam::DVec3;
use uid_core::Uid;

use crate::entity::Faction;

/// Routing tag back to the cast context an event originated from.
#[derive(Debug, Clone, Copy)]
pub struct CtxTag {
    /// Entity whose combat module owns the context.
    pub owner: Uid,
    pub ctx: Uid,
    pub seq: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    pub src: Uid,
    pub dst: Uid,
    pub amount: i64,
    pub tag: Option<CtxTag>,
}

#[derive(Debug, Clone, Copy)]
pub struct HealEvent {
    pub src: Uid,
    pub dst: Uid,
    pub amount: i64,
    pub tag: Option<CtxTag>,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveEvent {
    pub dst: Uid,
    pub to: DVec3,
}

#[derive(Debug, Clone, Copy)]
pub struct InterruptEvent {
    pub dst: Uid,
    /// Skill to cancel; 0 cancels every active skill.
    pub cid: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct DispelEvent {
    pub dst: Uid,
    /// Aura tag to match; 0 matches any.
    pub tag: i64,
    /// Max auras removed; <= 0 removes all matches.
    pub count: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct StealEvent {
    pub dst: Uid,
    /// Receiving entity (the thief).
    pub to: Uid,
    pub tag: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct ThreatEvent {
    pub dst: Uid,
    /// Entity the threat points at.
    pub toward: Uid,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct SummonEvent {
    pub owner: Uid,
    pub recipe: i64,
    pub pos: DVec3,
    pub faction: Faction,
}

#[derive(Default)]
pub struct CombatBus {
    pub damage: Vec<DamageEvent>,
    pub heal: Vec<HealEvent>,
    pub moves: Vec<MoveEvent>,
    pub interrupts: Vec<InterruptEvent>,
    pub dispels: Vec<DispelEvent>,
    pub steals: Vec<StealEvent>,
    pub threat: Vec<ThreatEvent>,
    pub summons: Vec<SummonEvent>,
}

impl CombatBus {
    pub fn new() -> CombatBus {
        CombatBus::default()
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
            && self.heal.is_empty()
            && self.moves.is_empty()
            && self.interrupts.is_empty()
            && self.dispels.is_empty()
            && self.steals.is_empty()
            && self.threat.is_empty()
            && self.summons.is_empty()
    }

    /// Move all queued events out, leaving the bus empty for reuse.
    pub fn take(&mut self) -> CombatBus {
        std::mem::take(self)
    }
}
