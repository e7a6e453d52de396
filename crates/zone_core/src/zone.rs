//! The zone: owns entities, drives the tick, applies combat events.
//!
//! One zone, one thread. `update(delta_ms)` drains the cast inbox, advances
//! every entity against a read snapshot, then applies the event bus. Events
//! emitted while applying (hooks cascading) are applied in follow-up rounds
//! within the same tick, with a hard round cap.

use std::collections::HashMap;

use data_runtime::attr::{AttrType, Attrs};
use glam::DVec3;
use uid_core::Uid;

use crate::combat::bus::CombatBus;
use crate::container::OrderedMap;
use crate::entity::{Entity, EntityKind, Faction};
use crate::request::CastRequest;

const APPLY_ROUND_CAP: u32 = 8;

/// Read snapshot of one entity, detached from the zone.
#[derive(Debug, Clone, Copy)]
pub struct EntityView {
    pub id: Uid,
    pub kind: EntityKind,
    pub faction: Faction,
    pub pos: DVec3,
    pub dir: DVec3,
    pub alive: bool,
}

/// Read snapshot of the whole zone, in entity insertion order.
#[derive(Debug, Clone, Default)]
pub struct ZoneView {
    entries: Vec<EntityView>,
    index: HashMap<Uid, usize>,
}

impl ZoneView {
    pub fn get(&self, id: Uid) -> Option<&EntityView> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityView> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Zone {
    entities: OrderedMap<Uid, Entity>,
    inbox: Vec<(Uid, CastRequest)>,
    now_ms: i64,
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

impl Zone {
    pub fn new() -> Zone {
        Zone {
            entities: OrderedMap::new(),
            inbox: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn add_entity(&mut self, entity: Entity) -> Uid {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    pub fn spawn(&mut self, kind: EntityKind, faction: Faction, pos: DVec3, attrs: Attrs) -> Uid {
        self.add_entity(Entity::new(kind, faction, pos, attrs))
    }

    pub fn remove_entity(&mut self, id: Uid) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get_entity(&self, id: Uid) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_entity_mut(&mut self, id: Uid) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Drop entities whose hp reached zero. Host policy decides when.
    pub fn remove_dead(&mut self) -> Vec<Uid> {
        let dead: Vec<Uid> = self
            .entities
            .iter()
            .filter(|(_, e)| !e.is_alive())
            .map(|(id, _)| *id)
            .collect();
        for id in &dead {
            self.entities.remove(id);
        }
        dead
    }

    /// Queue a cast request; consumed at the start of the next tick.
    pub fn enqueue_cast(&mut self, entity: Uid, req: CastRequest) {
        self.inbox.push((entity, req));
    }

    /// Immediate cast entry for hosts that call between ticks themselves.
    pub fn cast(&mut self, entity: Uid, req: CastRequest) -> bool {
        match self.entities.get_mut(&entity) {
            Some(e) => {
                let cid = req.cid;
                e.combat.cast(cid, req)
            }
            None => false,
        }
    }

    pub fn view(&self) -> ZoneView {
        let mut view = ZoneView::default();
        for (id, e) in self.entities.iter() {
            view.index.insert(*id, view.entries.len());
            view.entries.push(EntityView {
                id: *id,
                kind: e.kind,
                faction: e.faction,
                pos: e.tr.pos,
                dir: e.tr.dir,
                alive: e.is_alive(),
            });
        }
        view
    }

    /// Advance the zone one tick. Runs to completion; externally atomic.
    pub fn update(&mut self, delta_ms: i64) {
        self.now_ms += delta_ms;

        let queued: Vec<(Uid, CastRequest)> = self.inbox.drain(..).collect();
        for (id, req) in queued {
            let cid = req.cid;
            if !self.cast(id, req) {
                log::debug!("cast rejected: entity {id} skill {cid}");
            }
        }

        let view = self.view();
        let mut bus = CombatBus::new();
        let ids: Vec<Uid> = self.entities.keys().copied().collect();
        for id in ids {
            if let Some(e) = self.entities.get_mut(&id) {
                e.update(delta_ms, &view, &mut bus);
            }
        }

        self.apply_bus(&mut bus, &view);
    }

    fn apply_bus(&mut self, bus: &mut CombatBus, view: &ZoneView) {
        let mut rounds = 0;
        while !bus.is_empty() {
            rounds += 1;
            if rounds > APPLY_ROUND_CAP {
                log::warn!("combat bus still busy after {APPLY_ROUND_CAP} rounds; dropping rest");
                break;
            }
            let batch = bus.take();

            for ev in batch.damage {
                let mut fatal = false;
                if let Some(t) = self.entities.get_mut(&ev.dst) {
                    fatal = t.combat.apply_damage(ev.amount);
                }
                if fatal {
                    if let Some(tag) = ev.tag {
                        if let Some(c) = self.entities.get_mut(&tag.owner) {
                            c.combat.record_kill(tag.ctx, tag.seq);
                        }
                    }
                }
            }

            for ev in batch.heal {
                if let Some(t) = self.entities.get_mut(&ev.dst) {
                    t.combat.apply_heal(ev.amount);
                }
            }

            for ev in batch.moves {
                if let Some(t) = self.entities.get_mut(&ev.dst) {
                    t.tr.pos = ev.to;
                }
            }

            for ev in batch.interrupts {
                if let Some(t) = self.entities.get_mut(&ev.dst) {
                    t.combat.interrupt(ev.cid);
                }
            }

            for ev in batch.dispels {
                // Auras live in their casters' modules; scan in zone order.
                let holders: Vec<Uid> = self.entities.keys().copied().collect();
                let mut remaining = ev.count;
                for hid in holders {
                    let limit = if ev.count > 0 { remaining } else { 0 };
                    if let Some(h) = self.entities.get_mut(&hid) {
                        let removed = h.combat.dispel_auras_on(ev.dst, ev.tag, limit, view, bus);
                        if ev.count > 0 {
                            remaining -= removed;
                            if remaining <= 0 {
                                break;
                            }
                        }
                    }
                }
            }

            for ev in batch.steals {
                let holders: Vec<Uid> = self.entities.keys().copied().collect();
                let mut remaining = ev.count;
                for hid in holders {
                    let limit = if ev.count > 0 { remaining } else { 0 };
                    if let Some(h) = self.entities.get_mut(&hid) {
                        let moved = h.combat.steal_auras_from(ev.dst, ev.to, ev.tag, limit);
                        if ev.count > 0 {
                            remaining -= moved;
                            if remaining <= 0 {
                                break;
                            }
                        }
                    }
                }
            }

            for ev in batch.threat {
                if let Some(t) = self.entities.get_mut(&ev.dst) {
                    t.combat.adjust_threat(ev.toward, ev.amount);
                }
            }

            for ev in batch.summons {
                let mut attrs = Attrs::default();
                // Placeholder vitals; real stats come from the recipe, which
                // is host data.
                attrs.push(AttrType::MaxHp, 1);
                let mut summon = Entity::new(EntityKind::Npc, ev.faction, ev.pos, attrs);
                summon.recipe_id = ev.recipe;
                self.add_entity(summon);
            }
        }
    }
}
