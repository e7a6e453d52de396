//! zone_core: the authoritative combat runtime for one zone.
//!
//! A zone owns its entities and is advanced by exactly one thread;
//! `Zone::update(delta_ms)` is the sole clock and runs to completion. Inside
//! a tick, each entity advances its combat module (skills first, then
//! persistent effects); effect variants emit typed events onto a per-tick
//! bus which the zone applies after every entity has advanced, so a tick is
//! externally atomic and iteration order stays deterministic.
//!
//! Cross-zone communication is message passing between zone inboxes; nothing
//! in this crate is shared between zones, so nothing here takes a lock.

pub mod combat;
pub mod container;
pub mod entity;
pub mod request;
pub mod zone;

pub use combat::bus::CombatBus;
pub use container::{OrderedMap, OrderedSet};
pub use entity::{Entity, EntityKind, Faction, Transform};
pub use request::CastRequest;
pub use zone::{EntityView, Zone, ZoneView};
