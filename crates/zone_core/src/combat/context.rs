//! Cast context: shared state for one cast, from `start_cast` until the last
//! scheduled firing or effect runtime of that cast is done. Later-stage
//! effects read earlier-stage outcomes through it.

use std::collections::HashMap;

use uid_core::Uid;

use crate::request::CastRequest;

/// Well-known extension keys. Closed so call sites cannot typo a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalKey {
    MarkStacks,
    MarkTargets,
    ComboCount,
    ComboCrit,
    ComboTargets,
    ChainHitTargets,
    ChainCount,
    ChainLastTarget,
    HasTriggered,
    TriggerCount,
}

/// Outcome of one effect execution, indexed by its sequence number.
#[derive(Debug, Clone, Default)]
pub struct EffectResult {
    pub seq: i32,

    pub damage: i64,
    pub heal: i64,
    pub is_crit: bool,
    pub targets: Vec<Uid>,
    pub hit_count: i32,
    pub killed_any: bool,

    pub extra_i64: HashMap<GlobalKey, i64>,
    pub extra_bool: HashMap<GlobalKey, bool>,
    pub extra_entities: HashMap<GlobalKey, Vec<Uid>>,
}

impl EffectResult {
    fn new(seq: i32) -> EffectResult {
        EffectResult {
            seq,
            ..Default::default()
        }
    }
}

pub struct CastContext {
    id: Uid,

    pub owner: Uid,
    pub req: CastRequest,
    pub skill_level: i64,
    pub is_finished: bool,

    /// Sequence number of the effect currently executing.
    pub current_seq: i32,
    next_seq: i32,
    results: Vec<EffectResult>,

    // Cast-wide counters.
    pub total_damage: i64,
    pub total_heal: i64,
    pub total_hits: i32,
    pub kill_count: i32,

    global_i64: HashMap<GlobalKey, i64>,
    global_bool: HashMap<GlobalKey, bool>,
    global_entities: HashMap<GlobalKey, Vec<Uid>>,
}

impl CastContext {
    pub fn new(owner: Uid, req: CastRequest, skill_level: i64) -> CastContext {
        CastContext {
            id: uid_core::gen(),
            owner,
            req,
            skill_level,
            is_finished: false,
            current_seq: 0,
            next_seq: 0,
            results: Vec::with_capacity(16),
            total_damage: 0,
            total_heal: 0,
            total_hits: 0,
            kill_count: 0,
            global_i64: HashMap::new(),
            global_bool: HashMap::new(),
            global_entities: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uid {
        self.id
    }

    pub fn finish(&mut self) {
        self.is_finished = true;
    }

    /// Allocate the sequence number for the next effect execution and make it
    /// current.
    pub fn alloc_seq(&mut self) -> i32 {
        self.current_seq = self.next_seq;
        self.next_seq += 1;
        self.current_seq
    }

    /// Result slot of the current effect, created on demand.
    pub fn current_result(&mut self) -> &mut EffectResult {
        while self.results.len() <= self.current_seq as usize {
            let seq = self.results.len() as i32;
            self.results.push(EffectResult::new(seq));
        }
        &mut self.results[self.current_seq as usize]
    }

    pub fn prev_result(&self) -> Option<&EffectResult> {
        if self.current_seq <= 0 {
            return None;
        }
        self.results.get(self.current_seq as usize - 1)
    }

    pub fn result_by_seq(&self, seq: i32) -> Option<&EffectResult> {
        if seq < 0 {
            return None;
        }
        self.results.get(seq as usize)
    }

    pub fn result_by_seq_mut(&mut self, seq: i32) -> Option<&mut EffectResult> {
        if seq < 0 {
            return None;
        }
        self.results.get_mut(seq as usize)
    }

    pub fn all_results(&self) -> &[EffectResult] {
        &self.results
    }

    pub fn set_global_i64(&mut self, key: GlobalKey, value: i64) {
        self.global_i64.insert(key, value);
    }

    pub fn global_i64(&self, key: GlobalKey) -> Option<i64> {
        self.global_i64.get(&key).copied()
    }

    pub fn increment_global_i64(&mut self, key: GlobalKey, delta: i64) -> i64 {
        let v = self.global_i64.entry(key).or_insert(0);
        *v += delta;
        *v
    }

    pub fn set_global_bool(&mut self, key: GlobalKey, value: bool) {
        self.global_bool.insert(key, value);
    }

    pub fn global_bool(&self, key: GlobalKey) -> Option<bool> {
        self.global_bool.get(&key).copied()
    }

    pub fn set_global_entities(&mut self, key: GlobalKey, entities: Vec<Uid>) {
        self.global_entities.insert(key, entities);
    }

    pub fn global_entities(&self, key: GlobalKey) -> Option<&[Uid]> {
        self.global_entities.get(&key).map(|v| v.as_slice())
    }
}
