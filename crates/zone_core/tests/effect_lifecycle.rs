//! Persistent effect lifecycle: ticking, expiry, pause/resume, cancel
//! idempotence, panic containment and context retention.

use std::sync::{Arc, Mutex};

use data_runtime::attr::Attrs;
use data_runtime::skill::{EffectCfg, EffectType, SkillSpec, StageEffects, TargetCfg, TargetRelation};
use uid_core::Uid;
use zone_core::combat::context::CastContext;
use zone_core::combat::effect::{create_effect, EffectScope, EffectWorld, SkillEffect};
use zone_core::combat::effect_mgr::EffectManager;
use zone_core::combat::effect_runtime::{EffectRuntime, EffectState};
use zone_core::combat::CombatModule;
use zone_core::{CastRequest, CombatBus, OrderedMap, ZoneView};

#[derive(Default)]
struct Probe {
    updates: Vec<i64>,
    ends: i32,
    reverts: i32,
}

struct ProbeEffect {
    probe: Arc<Mutex<Probe>>,
    panic_on_update: bool,
}

impl ProbeEffect {
    fn new(probe: Arc<Mutex<Probe>>) -> ProbeEffect {
        ProbeEffect {
            probe,
            panic_on_update: false,
        }
    }
}

impl SkillEffect for ProbeEffect {
    fn begin(&mut self, _: &mut CastContext, _: &EffectScope<'_>, _: &mut EffectWorld<'_>) {}

    fn update(
        &mut self,
        _: &mut CastContext,
        _: &EffectScope<'_>,
        delta_ms: i64,
        world: &mut EffectWorld<'_>,
    ) {
        if self.panic_on_update {
            panic!("probe effect asked to fail");
        }
        let _ = delta_ms;
        self.probe.lock().unwrap().updates.push(world.now_ms);
    }

    fn end(&mut self, _: &mut CastContext, _: &EffectScope<'_>, _: &mut EffectWorld<'_>) {
        self.probe.lock().unwrap().ends += 1;
    }

    fn revert(&mut self, _: &mut CastContext, _: &EffectScope<'_>, _: &mut EffectWorld<'_>) {
        self.probe.lock().unwrap().reverts += 1;
    }
}

fn dot_cfg() -> EffectCfg {
    EffectCfg {
        kind: EffectType::ApplyAura,
        ref_id: 5,
        times: 4,
        interval_ms: 1000,
        p1: 7,
        p2: 4000,
        ..Default::default()
    }
}

struct Rig {
    mgr: EffectManager,
    contexts: OrderedMap<Uid, CastContext>,
    view: ZoneView,
    bus: CombatBus,
}

impl Rig {
    fn new() -> Rig {
        Rig {
            mgr: EffectManager::new(),
            contexts: OrderedMap::new(),
            view: ZoneView::default(),
            bus: CombatBus::new(),
        }
    }

    fn install(&mut self, effect: Box<dyn SkillEffect>, cfg: &EffectCfg) -> Uid {
        let caster = uid_core::gen();
        let target = uid_core::gen();
        let ctx = CastContext::new(caster, CastRequest::default(), 1);
        let ctx_id = ctx.id();
        self.contexts.insert(ctx_id, ctx);
        self.mgr
            .add_raw(EffectRuntime::new(effect, cfg, ctx_id, caster, vec![target]))
    }

    fn step(&mut self, delta_ms: i64) {
        self.mgr
            .update(delta_ms, &mut self.contexts, &self.view, &mut self.bus);
    }
}

#[test]
fn dot_ticks_four_times_then_finishes_at_end() {
    let probe = Arc::new(Mutex::new(Probe::default()));
    let mut rig = Rig::new();
    let cfg = dot_cfg();
    let id = rig.install(Box::new(ProbeEffect::new(probe.clone())), &cfg);

    for _ in 0..45 {
        rig.step(100);
    }
    let p = probe.lock().unwrap();
    assert_eq!(
        p.updates,
        vec![1000, 2000, 3000, 4000],
        "final tick lands on the expiry pass"
    );
    assert_eq!(p.ends, 1, "end runs exactly once");
    assert_eq!(p.reverts, 0);
    assert_eq!(rig.mgr.state_of(id), EffectState::Finished);
    assert!(rig.mgr.is_empty(), "finished runtime is erased");
}

#[test]
fn tick_cap_without_duration_finishes_after_last_tick() {
    let probe = Arc::new(Mutex::new(Probe::default()));
    let mut rig = Rig::new();
    let mut cfg = dot_cfg();
    cfg.p2 = 0; // no duration, tick-capped only
    rig.install(Box::new(ProbeEffect::new(probe.clone())), &cfg);

    for _ in 0..60 {
        rig.step(100);
    }
    let p = probe.lock().unwrap();
    assert_eq!(p.updates.len(), 4);
    assert_eq!(p.ends, 1);
    assert!(rig.mgr.is_empty());
}

#[test]
fn pause_suppresses_ticks_and_does_not_extend_the_end() {
    let probe = Arc::new(Mutex::new(Probe::default()));
    let mut rig = Rig::new();
    let cfg = dot_cfg();
    let id = rig.install(Box::new(ProbeEffect::new(probe.clone())), &cfg);

    // Run to t=1500, pause, run to t=3500, resume, run past the end.
    for _ in 0..15 {
        rig.step(100);
    }
    rig.mgr.pause(id);
    assert_eq!(rig.mgr.state_of(id), EffectState::Paused);
    for _ in 0..20 {
        rig.step(100);
    }
    rig.mgr.resume(id);
    for _ in 0..20 {
        rig.step(100);
    }

    let p = probe.lock().unwrap();
    assert_eq!(
        p.updates,
        vec![1000],
        "ticks due at 2000/3000 are suppressed; the interval restarts at resume and the end at 4000 arrives first"
    );
    assert_eq!(p.ends, 1, "expiry still lands at the original end time");
    assert!(rig.mgr.is_empty());
}

#[test]
fn resume_restarts_interval_instead_of_burst_ticking() {
    let probe = Arc::new(Mutex::new(Probe::default()));
    let mut rig = Rig::new();
    let mut cfg = dot_cfg();
    cfg.p2 = 10_000;
    cfg.times = 0; // unlimited ticks within the duration
    let id = rig.install(Box::new(ProbeEffect::new(probe.clone())), &cfg);

    for _ in 0..15 {
        rig.step(100);
    }
    rig.mgr.pause(id);
    for _ in 0..20 {
        rig.step(100);
    }
    rig.mgr.resume(id); // t=3500
    for _ in 0..20 {
        rig.step(100);
    }

    let p = probe.lock().unwrap();
    assert_eq!(
        p.updates,
        vec![1000, 4500, 5500],
        "after resume the next tick is one full interval out"
    );
}

#[test]
fn cancel_reverts_once_and_is_idempotent() {
    let probe = Arc::new(Mutex::new(Probe::default()));
    let mut rig = Rig::new();
    let cfg = dot_cfg();
    let id = rig.install(Box::new(ProbeEffect::new(probe.clone())), &cfg);

    for _ in 0..12 {
        rig.step(100);
    }
    let ctx_id = rig.mgr.get(id).unwrap().ctx;
    {
        let ctx = rig.contexts.get_mut(&ctx_id).unwrap();
        let mut world = EffectWorld {
            view: &rig.view,
            bus: &mut rig.bus,
            now_ms: 1200,
        };
        let rt = rig.mgr.get_mut(id).unwrap();
        rt.cancel(ctx, &mut world);
        assert_eq!(rt.state, EffectState::Cancelled);
        // Terminal states absorb further transitions.
        rt.cancel(ctx, &mut world);
        rt.finish(ctx, &mut world);
        assert_eq!(rt.state, EffectState::Cancelled);
    }
    let p = probe.lock().unwrap();
    assert_eq!(p.reverts, 1);
    assert_eq!(p.ends, 0);
}

#[test]
fn panicking_variant_is_contained_and_neighbors_keep_ticking() {
    let sick = Arc::new(Mutex::new(Probe::default()));
    let healthy = Arc::new(Mutex::new(Probe::default()));
    let mut rig = Rig::new();
    let cfg = dot_cfg();

    let mut bad = ProbeEffect::new(sick.clone());
    bad.panic_on_update = true;
    let bad_id = rig.install(Box::new(bad), &cfg);
    let good_id = rig.install(Box::new(ProbeEffect::new(healthy.clone())), &cfg);

    for _ in 0..15 {
        rig.step(100);
    }

    assert_eq!(rig.mgr.state_of(bad_id), EffectState::Finished, "erased");
    assert!(rig.mgr.get(bad_id).is_none(), "poisoned runtime dropped");
    assert!(rig.mgr.get(good_id).is_some());
    assert_eq!(sick.lock().unwrap().reverts, 0, "no rollback after a panic");
    assert_eq!(
        healthy.lock().unwrap().updates,
        vec![1000],
        "the pass survives a neighbor's panic"
    );
}

#[test]
fn aura_variant_emits_damage_per_tick() {
    let mut rig = Rig::new();
    let cfg = dot_cfg();
    let effect = create_effect(&cfg).expect("aura variant");
    rig.install(effect, &cfg);

    for _ in 0..45 {
        rig.step(100);
    }
    assert_eq!(rig.bus.damage.len(), 4);
    assert!(rig.bus.damage.iter().all(|d| d.amount == 7));
}

#[test]
fn per_target_queries_pause_and_clear() {
    let mut rig = Rig::new();
    let cfg = dot_cfg();
    let caster = uid_core::gen();
    let ally = uid_core::gen();
    let foe = uid_core::gen();

    let mut ids = Vec::new();
    for target in [ally, foe, foe] {
        let ctx = CastContext::new(caster, CastRequest::default(), 1);
        let ctx_id = ctx.id();
        rig.contexts.insert(ctx_id, ctx);
        let effect = create_effect(&cfg).expect("aura variant");
        ids.push(rig.mgr.add_raw(EffectRuntime::new(
            effect,
            &cfg,
            ctx_id,
            caster,
            vec![target],
        )));
    }

    assert_eq!(rig.mgr.list_by_target(foe), vec![ids[1], ids[2]]);
    assert_eq!(rig.mgr.active_count(), 3);

    rig.mgr.pause_all_for(foe);
    assert_eq!(rig.mgr.active_count(), 1);
    assert_eq!(rig.mgr.state_of(ids[1]), EffectState::Paused);
    rig.mgr.resume_all_for(foe);
    assert_eq!(rig.mgr.active_count(), 3);

    assert_eq!(rig.mgr.remaining_ms(ids[0]), 4000);
    rig.step(1000);
    assert_eq!(rig.mgr.remaining_ms(ids[0]), 3000);

    {
        let mut world = EffectWorld {
            view: &rig.view,
            bus: &mut rig.bus,
            now_ms: 1000,
        };
        rig.mgr
            .clear_by_target(foe, &mut rig.contexts, &mut world);
    }
    assert_eq!(rig.mgr.len(), 1);
    assert!(rig.mgr.list_by_target(foe).is_empty());
    assert_eq!(rig.mgr.list_by_target(ally), vec![ids[0]]);

    {
        let mut world = EffectWorld {
            view: &rig.view,
            bus: &mut rig.bus,
            now_ms: 1000,
        };
        rig.mgr.clear(&mut rig.contexts, &mut world);
    }
    assert!(rig.mgr.is_empty());
}

#[test]
fn contexts_survive_until_their_last_runtime_is_done() {
    let mut m = CombatModule::new(uid_core::gen(), {
        let mut a = Attrs::default();
        a.push(data_runtime::attr::AttrType::MaxHp, 100);
        a
    });
    m.add_skill(SkillSpec {
        cid: 1,
        hit_on_cast_finish: true,
        target: TargetCfg {
            relation: TargetRelation::Caster,
            ..Default::default()
        },
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::ApplyAura,
                p1: 1,
                p2: 1000,
                interval_ms: 500,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });
    let view = ZoneView::default();
    let mut bus = CombatBus::new();

    assert!(m.cast(1, CastRequest::default()));
    m.update(0, &view, &mut bus);
    assert_eq!(m.context_count(), 1);
    assert_eq!(m.effects.len(), 1);

    // While the aura runtime lives, the context stays.
    for _ in 0..10 {
        m.update(100, &view, &mut bus);
    }
    assert!(m.effects.is_empty(), "aura expired at 1000");

    // The next tick's sweep collects it.
    m.update(100, &view, &mut bus);
    assert_eq!(m.context_count(), 0);
}

#[test]
fn instant_cast_context_is_swept_next_tick() {
    let mut m = CombatModule::new(uid_core::gen(), Attrs::default());
    m.add_skill(SkillSpec {
        cid: 1,
        hit_on_cast_finish: true,
        target: TargetCfg {
            relation: TargetRelation::Caster,
            ..Default::default()
        },
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Damage,
                p1: 3,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });
    let view = ZoneView::default();
    let mut bus = CombatBus::new();

    assert!(m.cast(1, CastRequest::default()));
    m.update(0, &view, &mut bus);
    assert_eq!(m.context_count(), 1, "apply phase can still read it");
    m.update(100, &view, &mut bus);
    assert_eq!(m.context_count(), 0);
}
