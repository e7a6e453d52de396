//! Whole-zone ticks: inbox, event application, interrupts, dispel/steal,
//! summons, threat and movement.

use data_runtime::attr::{AttrType, Attrs};
use data_runtime::skill::{
    EffectCfg, EffectType, SkillSpec, StageEffects, TargetCfg, TargetMode, TargetRelation,
    ShapeType,
};
use glam::DVec3;
use uid_core::Uid;
use zone_core::combat::skill::SkillState;
use zone_core::{CastRequest, EntityKind, Faction, Zone};

fn attrs(hp: i64) -> Attrs {
    let mut a = Attrs::default();
    a.push(AttrType::MaxHp, hp);
    a.push(AttrType::MaxMp, 100);
    a
}

fn req(cid: i64) -> CastRequest {
    CastRequest {
        cid,
        ..Default::default()
    }
}

fn unit_enemy() -> TargetCfg {
    TargetCfg {
        relation: TargetRelation::Enemy,
        mode: TargetMode::Unit,
        shape: ShapeType::Single,
        ..Default::default()
    }
}

fn caster_target() -> TargetCfg {
    TargetCfg {
        relation: TargetRelation::Caster,
        ..Default::default()
    }
}

fn strike_spec(cid: i64, p1: i64) -> SkillSpec {
    SkillSpec {
        cid,
        hit_on_cast_finish: true,
        target: unit_enemy(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Damage,
                p1,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn queued_cast_lands_damage_on_the_locked_target() {
    let mut zone = Zone::new();
    let caster = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let victim = zone.spawn(
        EntityKind::Npc,
        Faction(2),
        DVec3::new(2.0, 0.0, 0.0),
        attrs(100),
    );
    zone.get_entity_mut(caster)
        .unwrap()
        .combat
        .add_skill(strike_spec(1, 30));

    zone.enqueue_cast(caster, CastRequest::on_unit(1, victim));
    zone.update(100);

    assert_eq!(zone.get_entity(victim).unwrap().combat.hp(), 70);
}

#[test]
fn fatal_damage_writes_kill_credit_into_the_cast_context() {
    let mut zone = Zone::new();
    let caster = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let victim = zone.spawn(
        EntityKind::Npc,
        Faction(2),
        DVec3::new(2.0, 0.0, 0.0),
        attrs(10),
    );
    zone.get_entity_mut(caster)
        .unwrap()
        .combat
        .add_skill(strike_spec(1, 25));

    zone.enqueue_cast(caster, CastRequest::on_unit(1, victim));
    zone.update(100);

    let vic = zone.get_entity(victim).unwrap();
    assert_eq!(vic.combat.hp(), 0);
    assert!(!vic.is_alive());

    let caster_mod = &zone.get_entity(caster).unwrap().combat;
    let ctx = caster_mod.contexts().next().expect("context still held");
    assert_eq!(ctx.kill_count, 1);
    assert_eq!(ctx.total_damage, 25);
    assert_eq!(ctx.total_hits, 1);
    assert!(ctx.all_results()[0].killed_any);

    assert_eq!(zone.remove_dead(), vec![victim]);
    assert_eq!(zone.len(), 1);
}

#[test]
fn heal_is_clamped_to_max_hp() {
    let mut zone = Zone::new();
    let healer = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    zone.get_entity_mut(healer)
        .unwrap()
        .combat
        .apply_damage(30);
    zone.get_entity_mut(healer).unwrap().combat.add_skill(SkillSpec {
        cid: 2,
        hit_on_cast_finish: true,
        target: caster_target(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Heal,
                p1: 90,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });

    zone.enqueue_cast(healer, req(2));
    zone.update(100);

    assert_eq!(zone.get_entity(healer).unwrap().combat.hp(), 100);
}

#[test]
fn interrupt_effect_cancels_the_victims_channel() {
    let mut zone = Zone::new();
    let caster = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let victim = zone.spawn(
        EntityKind::Role,
        Faction(2),
        DVec3::new(2.0, 0.0, 0.0),
        attrs(100),
    );

    zone.get_entity_mut(victim).unwrap().combat.add_skill(SkillSpec {
        cid: 10,
        cast_time_ms: 2000,
        cooldown_ms: 5000,
        target: caster_target(),
        ..Default::default()
    });
    zone.get_entity_mut(caster).unwrap().combat.add_skill(SkillSpec {
        cid: 11,
        hit_on_cast_finish: true,
        target: unit_enemy(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Interrupt,
                ref_id: 0,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });

    zone.enqueue_cast(victim, req(10));
    zone.update(100);
    assert_eq!(
        zone.get_entity(victim).unwrap().combat.skills.get(10).unwrap().state,
        SkillState::Casting
    );

    zone.enqueue_cast(caster, CastRequest::on_unit(11, victim));
    zone.update(100);
    let sk = zone.get_entity(victim).unwrap().combat.skills.get(10).unwrap();
    assert_eq!(sk.state, SkillState::Idle, "cast was interrupted");
    assert!(sk.cd_end_at > 0, "cooldown from cast start is kept");
}

fn aura_spec(cid: i64, tag: i64) -> SkillSpec {
    SkillSpec {
        cid,
        hit_on_cast_finish: true,
        target: unit_enemy(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::ApplyAura,
                ref_id: tag,
                p1: 2,
                p2: 60_000,
                interval_ms: 1000,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn dispel_removes_matching_auras_up_to_count() {
    let mut zone = Zone::new();
    let warlock = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let victim = zone.spawn(
        EntityKind::Role,
        Faction(2),
        DVec3::new(2.0, 0.0, 0.0),
        attrs(1000),
    );
    // Two stacks of tag 7, one of tag 9.
    {
        let m = &mut zone.get_entity_mut(warlock).unwrap().combat;
        m.add_skill(aura_spec(20, 7));
        m.add_skill(aura_spec(21, 9));
    }
    zone.enqueue_cast(warlock, CastRequest::on_unit(20, victim));
    zone.update(100);
    zone.enqueue_cast(warlock, CastRequest::on_unit(20, victim));
    zone.update(100);
    zone.enqueue_cast(warlock, CastRequest::on_unit(21, victim));
    zone.update(100);
    assert_eq!(
        zone.get_entity(warlock).unwrap().combat.effects.len(),
        3,
        "three auras installed"
    );

    // The victim dispels one stack of tag 7 off itself.
    zone.get_entity_mut(victim).unwrap().combat.add_skill(SkillSpec {
        cid: 30,
        hit_on_cast_finish: true,
        target: caster_target(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Dispel,
                ref_id: 7,
                p1: 1,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });
    zone.enqueue_cast(victim, req(30));
    zone.update(100);

    let warlock_effects = &zone.get_entity(warlock).unwrap().combat.effects;
    assert_eq!(warlock_effects.len(), 2, "exactly one stack removed");
    let remaining_tags: Vec<i64> = warlock_effects.iter().map(|(_, rt)| rt.aura_tag).collect();
    assert_eq!(remaining_tags, vec![7, 9]);
}

#[test]
fn steal_rehomes_the_aura_to_the_thief() {
    let mut zone = Zone::new();
    let buffed = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let thief = zone.spawn(
        EntityKind::Role,
        Faction(2),
        DVec3::new(2.0, 0.0, 0.0),
        attrs(1000),
    );
    // A self-buff on `buffed` (the aura runtime targets its own caster).
    zone.get_entity_mut(buffed).unwrap().combat.add_skill(SkillSpec {
        cid: 20,
        hit_on_cast_finish: true,
        target: caster_target(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::ApplyAura,
                ref_id: 7,
                p2: 60_000,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });
    zone.enqueue_cast(buffed, req(20));
    zone.update(100);

    zone.get_entity_mut(thief).unwrap().combat.add_skill(SkillSpec {
        cid: 31,
        hit_on_cast_finish: true,
        target: unit_enemy(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Steal,
                ref_id: 7,
                p1: 1,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });
    zone.enqueue_cast(thief, CastRequest::on_unit(31, buffed));
    zone.update(100);

    let buffed_effects = &zone.get_entity(buffed).unwrap().combat.effects;
    assert_eq!(buffed_effects.len(), 1, "runtime still owned by its caster");
    let (_, rt) = buffed_effects.iter().next().unwrap();
    assert_eq!(rt.targets, vec![thief], "aura now sticks to the thief");
}

#[test]
fn summon_adds_an_npc_on_the_casters_side() {
    let mut zone = Zone::new();
    let caster = zone.spawn(
        EntityKind::Role,
        Faction(1),
        DVec3::new(4.0, 4.0, 0.0),
        attrs(100),
    );
    zone.get_entity_mut(caster).unwrap().combat.add_skill(SkillSpec {
        cid: 40,
        hit_on_cast_finish: true,
        target: caster_target(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Summon,
                ref_id: 777,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });

    zone.enqueue_cast(caster, req(40));
    zone.update(100);

    assert_eq!(zone.len(), 2);
    let summon = zone
        .iter()
        .find(|e| e.id != caster)
        .expect("summoned entity");
    assert_eq!(summon.kind, EntityKind::Npc);
    assert_eq!(summon.faction, Faction(1));
    assert_eq!(summon.recipe_id, 777);
    assert_eq!(summon.tr.pos, DVec3::new(4.0, 4.0, 0.0));
    assert!(summon.is_alive());
}

#[test]
fn threat_accumulates_on_the_victims_table() {
    let mut zone = Zone::new();
    let tank = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let boss = zone.spawn(
        EntityKind::Npc,
        Faction(2),
        DVec3::new(2.0, 0.0, 0.0),
        attrs(1000),
    );
    zone.get_entity_mut(tank).unwrap().combat.add_skill(SkillSpec {
        cid: 50,
        hit_on_cast_finish: true,
        target: unit_enemy(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Threat,
                p1: 120,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });

    zone.enqueue_cast(tank, CastRequest::on_unit(50, boss));
    zone.update(100);
    zone.enqueue_cast(tank, CastRequest::on_unit(50, boss));
    zone.update(100);

    let boss_mod = &zone.get_entity(boss).unwrap().combat;
    assert_eq!(boss_mod.threat_of(tank), 240);
    assert_eq!(boss_mod.top_threat(), Some((tank, 240)));
}

#[test]
fn move_effect_teleports_to_the_request_point() {
    let mut zone = Zone::new();
    let blinker = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    zone.get_entity_mut(blinker).unwrap().combat.add_skill(SkillSpec {
        cid: 60,
        hit_on_cast_finish: true,
        target: caster_target(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::Move,
                p1: 5,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });

    zone.enqueue_cast(blinker, CastRequest::at_point(60, DVec3::new(7.0, -2.0, 0.0)));
    zone.update(100);
    assert_eq!(
        zone.get_entity(blinker).unwrap().tr.pos,
        DVec3::new(7.0, -2.0, 0.0)
    );

    // Without a point the move dashes along the facing.
    zone.enqueue_cast(
        blinker,
        CastRequest {
            cid: 60,
            ..Default::default()
        },
    );
    zone.update(100);
    assert_eq!(
        zone.get_entity(blinker).unwrap().tr.pos,
        DVec3::new(12.0, -2.0, 0.0),
        "dash of p1 units along +X facing"
    );
}

#[test]
fn spawned_area_burns_hostiles_inside_it() {
    let mut zone = Zone::new();
    let mage = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let near = zone.spawn(
        EntityKind::Npc,
        Faction(2),
        DVec3::new(10.0, 1.0, 0.0),
        attrs(100),
    );
    let far = zone.spawn(
        EntityKind::Npc,
        Faction(2),
        DVec3::new(25.0, 0.0, 0.0),
        attrs(100),
    );
    zone.get_entity_mut(mage).unwrap().combat.add_skill(SkillSpec {
        cid: 70,
        hit_on_cast_finish: true,
        target: caster_target(),
        effects: StageEffects {
            on_hit: vec![EffectCfg {
                kind: EffectType::SpawnArea,
                ref_id: 900,
                p1: 10,
                p2: 3000,
                p3: 3,
                interval_ms: 1000,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    });

    zone.enqueue_cast(mage, CastRequest::at_point(70, DVec3::new(10.0, 0.0, 0.0)));
    for _ in 0..35 {
        zone.update(100);
    }

    assert_eq!(
        zone.get_entity(near).unwrap().combat.hp(),
        70,
        "three ticks of 10 inside the area"
    );
    assert_eq!(zone.get_entity(far).unwrap().combat.hp(), 100);
    assert_eq!(zone.get_entity(mage).unwrap().combat.hp(), 100, "allies untouched");
    assert!(
        zone.get_entity(mage).unwrap().combat.effects.is_empty(),
        "area expired"
    );
}

#[test]
fn zone_view_reflects_entities_and_order() {
    let mut zone = Zone::new();
    let a = zone.spawn(EntityKind::Role, Faction(1), DVec3::ZERO, attrs(100));
    let b = zone.spawn(EntityKind::Npc, Faction(2), DVec3::new(1.0, 0.0, 0.0), attrs(100));
    let view = zone.view();
    let ids: Vec<Uid> = view.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a, b]);
    assert!(view.get(a).unwrap().alive);
    assert!(view.get(Uid::from_i64(42)).is_none());
}
