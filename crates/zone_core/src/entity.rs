//! Entities and the per-entity module frame.
//!
//! An entity is a thin frame around its modules; combat is the only module
//! this crate ships. Modules tick in a fixed order with the zone's delta so
//! replays stay deterministic.

use data_runtime::attr::Attrs;
use glam::DVec3;
use uid_core::Uid;

use crate::combat::bus::CombatBus;
use crate::combat::CombatModule;
use crate::zone::ZoneView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Role,
    Npc,
}

/// Allegiance marker. Entities sharing a faction id are allies; two distinct
/// non-neutral factions are hostile; neutral fights nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Faction(pub i32);

impl Faction {
    pub const NEUTRAL: Faction = Faction(0);

    #[inline]
    pub fn is_ally(self, other: Faction) -> bool {
        self.0 == other.0
    }

    #[inline]
    pub fn is_hostile(self, other: Faction) -> bool {
        self.0 != other.0 && self != Faction::NEUTRAL && other != Faction::NEUTRAL
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub pos: DVec3,
    /// Facing; selection falls back to +X when zero.
    pub dir: DVec3,
}

impl Transform {
    pub fn at(pos: DVec3) -> Transform {
        Transform {
            pos,
            dir: DVec3::new(1.0, 0.0, 0.0),
        }
    }
}

pub struct Entity {
    pub id: Uid,
    pub kind: EntityKind,
    pub faction: Faction,
    pub tr: Transform,
    /// Summon recipe this entity was spawned from; 0 for regular spawns.
    /// Recipe content is host data.
    pub recipe_id: i64,
    pub combat: CombatModule,
}

impl Entity {
    pub fn new(kind: EntityKind, faction: Faction, pos: DVec3, attrs: Attrs) -> Entity {
        let id = uid_core::gen();
        Entity {
            id,
            kind,
            faction,
            tr: Transform::at(pos),
            recipe_id: 0,
            combat: CombatModule::new(id, attrs),
        }
    }

    pub fn update(&mut self, delta_ms: i64, view: &ZoneView, bus: &mut CombatBus) {
        self.combat.update(delta_ms, view, bus);
    }

    pub fn is_alive(&self) -> bool {
        self.combat.hp() > 0
    }
}
