//! Lifecycle manager for persistent effect runtimes.
//!
//! Runtimes are keyed by uid in an insertion-ordered map so a tick visits
//! them in a reproducible order. Removal never happens mid-iteration:
//! expired ids are collected during the pass and erased afterwards.

use std::panic::{catch_unwind, AssertUnwindSafe};

use uid_core::Uid;

use crate::combat::context::CastContext;
use crate::combat::effect::EffectWorld;
use crate::combat::effect_runtime::{EffectRuntime, EffectState};
use crate::container::OrderedMap;

pub struct EffectManager {
    running: OrderedMap<Uid, EffectRuntime>,
    pub now_ms: i64,
}

impl Default for EffectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectManager {
    pub fn new() -> EffectManager {
        EffectManager {
            running: OrderedMap::new(),
            now_ms: 0,
        }
    }

    /// Activate a runtime, run its `begin`, and register it.
    pub fn add(&mut self, mut runtime: EffectRuntime, ctx: &mut CastContext, world: &mut EffectWorld<'_>) -> Uid {
        runtime.activate(self.now_ms);
        runtime.begin(ctx, world);
        let id = runtime.id;
        self.running.insert(id, runtime);
        id
    }

    /// Register a pre-built runtime without running `begin` (tests and
    /// host-driven effects).
    pub fn add_raw(&mut self, mut runtime: EffectRuntime) -> Uid {
        runtime.activate(self.now_ms);
        let id = runtime.id;
        self.running.insert(id, runtime);
        id
    }

    /// Natural removal: `end` runs, the runtime is erased.
    pub fn remove(&mut self, id: Uid, ctx: &mut CastContext, world: &mut EffectWorld<'_>) {
        if let Some(rt) = self.running.get_mut(&id) {
            rt.finish(ctx, world);
            self.running.remove(&id);
        }
    }

    /// Early removal with rollback: `revert` runs, the runtime is erased.
    pub fn cancel(&mut self, id: Uid, ctx: &mut CastContext, world: &mut EffectWorld<'_>) {
        if let Some(rt) = self.running.get_mut(&id) {
            rt.cancel(ctx, world);
            self.running.remove(&id);
        }
    }

    pub fn pause(&mut self, id: Uid) {
        if let Some(rt) = self.running.get_mut(&id) {
            rt.pause();
        }
    }

    pub fn resume(&mut self, id: Uid) {
        let now = self.now_ms;
        if let Some(rt) = self.running.get_mut(&id) {
            rt.resume(now);
        }
    }

    pub fn pause_all_for(&mut self, target: Uid) {
        for rt in self.running.values_mut() {
            if rt.targets.contains(&target) {
                rt.pause();
            }
        }
    }

    pub fn resume_all_for(&mut self, target: Uid) {
        let now = self.now_ms;
        for rt in self.running.values_mut() {
            if rt.targets.contains(&target) {
                rt.resume(now);
            }
        }
    }

    pub fn get(&self, id: Uid) -> Option<&EffectRuntime> {
        self.running.get(&id)
    }

    pub fn get_mut(&mut self, id: Uid) -> Option<&mut EffectRuntime> {
        self.running.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uid, &EffectRuntime)> {
        self.running.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Uid, &mut EffectRuntime)> {
        self.running.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Ids of runtimes whose target list contains `target`, in insertion
    /// order.
    pub fn list_by_target(&self, target: Uid) -> Vec<Uid> {
        self.running
            .iter()
            .filter(|(_, rt)| rt.targets.contains(&target))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.running.values().filter(|rt| rt.is_running()).count()
    }

    /// Finished when unknown, mirroring "already gone".
    pub fn state_of(&self, id: Uid) -> EffectState {
        self.running
            .get(&id)
            .map(|rt| rt.state)
            .unwrap_or(EffectState::Finished)
    }

    pub fn progress(&self, id: Uid) -> f32 {
        self.running
            .get(&id)
            .map(|rt| rt.progress(self.now_ms))
            .unwrap_or(1.0)
    }

    pub fn remaining_ms(&self, id: Uid) -> i64 {
        self.running
            .get(&id)
            .map(|rt| rt.remaining_ms(self.now_ms))
            .unwrap_or(0)
    }

    /// Re-home every matching aura from `from` to `to` (aura steal). Returns
    /// how many runtimes were retargeted.
    pub fn retarget_auras(&mut self, from: Uid, to: Uid, tag: i64, limit: i64) -> i64 {
        let mut moved = 0;
        for rt in self.running.values_mut() {
            if limit > 0 && moved >= limit {
                break;
            }
            if !rt.state.is_terminal()
                && rt.kind == data_runtime::skill::EffectType::ApplyAura
                && (tag == 0 || rt.aura_tag == tag)
                && rt.targets.contains(&from)
            {
                for t in rt.targets.iter_mut() {
                    if *t == from {
                        *t = to;
                    }
                }
                moved += 1;
            }
        }
        moved
    }

    /// Cancel up to `limit` matching auras on `from` (dispel). Returns how
    /// many were removed.
    pub fn dispel_auras(
        &mut self,
        from: Uid,
        tag: i64,
        limit: i64,
        contexts: &mut OrderedMap<Uid, CastContext>,
        world: &mut EffectWorld<'_>,
    ) -> i64 {
        let matches: Vec<Uid> = self
            .running
            .iter()
            .filter(|(_, rt)| {
                !rt.state.is_terminal()
                    && rt.kind == data_runtime::skill::EffectType::ApplyAura
                    && (tag == 0 || rt.aura_tag == tag)
                    && rt.targets.contains(&from)
            })
            .map(|(id, _)| *id)
            .collect();
        let mut removed = 0;
        for id in matches {
            if limit > 0 && removed >= limit {
                break;
            }
            let Some(rt) = self.running.get_mut(&id) else {
                continue;
            };
            if let Some(ctx) = contexts.get_mut(&rt.ctx) {
                rt.cancel(ctx, world);
            } else {
                rt.poison();
            }
            self.running.remove(&id);
            removed += 1;
        }
        removed
    }

    /// End everything and clear the registry.
    pub fn clear(&mut self, contexts: &mut OrderedMap<Uid, CastContext>, world: &mut EffectWorld<'_>) {
        for rt in self.running.values_mut() {
            if let Some(ctx) = contexts.get_mut(&rt.ctx) {
                rt.finish(ctx, world);
            } else {
                rt.poison();
            }
        }
        self.running.clear();
    }

    /// End every runtime targeting `target` and erase it.
    pub fn clear_by_target(
        &mut self,
        target: Uid,
        contexts: &mut OrderedMap<Uid, CastContext>,
        world: &mut EffectWorld<'_>,
    ) {
        let ids = self.list_by_target(target);
        for id in ids {
            self.remove_with_contexts(id, contexts, world);
        }
    }

    fn remove_with_contexts(
        &mut self,
        id: Uid,
        contexts: &mut OrderedMap<Uid, CastContext>,
        world: &mut EffectWorld<'_>,
    ) {
        if let Some(rt) = self.running.get_mut(&id) {
            if let Some(ctx) = contexts.get_mut(&rt.ctx) {
                rt.finish(ctx, world);
            } else {
                rt.poison();
            }
            self.running.remove(&id);
        }
    }

    /// Advance the manager clock and run one pass: a due tick first, then
    /// expiry. A runtime whose end coincides with a due tick performs that
    /// final tick and finishes in the same pass. A panic inside a variant is
    /// contained: the runtime is poisoned (Cancelled, no rollback hook) and
    /// dropped while the pass keeps going.
    pub fn update(
        &mut self,
        delta_ms: i64,
        contexts: &mut OrderedMap<Uid, CastContext>,
        view: &crate::zone::ZoneView,
        bus: &mut crate::combat::bus::CombatBus,
    ) {
        self.now_ms += delta_ms;
        let now = self.now_ms;
        let mut world = EffectWorld {
            view,
            bus,
            now_ms: now,
        };
        let world = &mut world;

        let mut done: Vec<Uid> = Vec::new();
        for (id, rt) in self.running.iter_mut() {
            let Some(ctx) = contexts.get_mut(&rt.ctx) else {
                rt.poison();
                done.push(*id);
                continue;
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                if rt.is_expired(now) {
                    rt.do_tick(now, ctx, world);
                    rt.finish(ctx, world);
                    true
                } else {
                    rt.do_tick(now, ctx, world);
                    false
                }
            }));
            match outcome {
                Ok(true) => done.push(*id),
                Ok(false) => {}
                Err(_) => {
                    log::error!("effect runtime {} panicked; cancelling it", rt.id);
                    rt.poison();
                    done.push(*id);
                }
            }
        }
        for id in done {
            self.running.remove(&id);
        }
    }
}
