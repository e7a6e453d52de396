//! Effect dispatcher: resolves a stage's target rule against the zone view
//! and hands the resulting detached target list to the variant.
//!
//! Selection never mutates the zone; it reads the per-tick snapshot. Planar
//! predicates come from `combat_math`; the ally/enemy predicate is the
//! entity's faction rule.

use data_runtime::skill::{
    EffectCfg, ShapeType, SkillSpec, TargetCfg, TargetMode, TargetRelation,
};
use glam::DVec3;
use uid_core::Uid;

use combat_math::{in_circle_2d, in_cone_2d, in_rect_2d, in_ring_2d, normalize2d};

use crate::combat::bus::CombatBus;
use crate::combat::context::CastContext;
use crate::combat::effect::{create_effect, is_instant_effect, EffectScope, EffectWorld};
use crate::combat::effect_mgr::EffectManager;
use crate::combat::effect_runtime::EffectRuntime;
use crate::combat::skill::Stage;
use crate::container::OrderedMap;
use crate::request::CastRequest;
use crate::zone::ZoneView;

/// Per-stage selector override, else the skill's default rule.
pub fn select_target_cfg(spec: &SkillSpec, stage: Stage) -> &TargetCfg {
    let sel = &spec.selectors;
    let by_stage = match stage {
        Stage::CastStart => sel.on_cast_start.as_ref(),
        Stage::CastFinish => sel.on_cast_finish.as_ref(),
        Stage::ChannelTick => sel.on_channel_tick.as_ref(),
        Stage::Hit => sel.on_hit.as_ref(),
        Stage::Cancel => sel.on_cancel.as_ref(),
    };
    by_stage.unwrap_or(&spec.target)
}

/// Resolve a target rule into a detached entity list. Empty is a normal
/// outcome (AoE hitting nothing, stale lock target).
pub fn resolve_targets(
    owner: Uid,
    cfg: &TargetCfg,
    req: &CastRequest,
    view: &ZoneView,
) -> Vec<Uid> {
    if cfg.relation == TargetRelation::Caster {
        return vec![owner];
    }

    match cfg.mode {
        TargetMode::Unit => {
            let id = req.lock_target;
            if !id.is_valid() {
                return Vec::new();
            }
            match view.get(id) {
                Some(e) if e.alive => filter_relation(owner, cfg.relation, view, vec![id]),
                _ => Vec::new(),
            }
        }
        TargetMode::NoTarget => match cfg.shape {
            ShapeType::Single => vec![owner],
            ShapeType::Circle => {
                // Substitute the caster's position for the query point.
                let Some(caster) = view.get(owner) else {
                    return Vec::new();
                };
                select_in_shape(owner, cfg, caster.pos, req, view)
            }
            _ => Vec::new(),
        },
        TargetMode::Point => {
            let Some(center) = req.pos else {
                return Vec::new();
            };
            select_in_shape(owner, cfg, center, req, view)
        }
        TargetMode::Invalid => Vec::new(),
    }
}

fn select_in_shape(
    owner: Uid,
    cfg: &TargetCfg,
    center: DVec3,
    req: &CastRequest,
    view: &ZoneView,
) -> Vec<Uid> {
    // Cone and rect anchor at the caster and need a facing; circle and ring
    // work off the query point alone.
    let (origin, axis) = match view.get(owner) {
        Some(caster) => {
            let fallback = DVec3::new(center.x - caster.pos.x, center.y - caster.pos.y, 0.0);
            let dir = req.dir.unwrap_or(fallback);
            (caster.pos, normalize2d(dir))
        }
        None => (center, normalize2d(req.dir.unwrap_or(DVec3::ZERO))),
    };

    let mut out = Vec::new();
    for e in view.iter() {
        if !e.alive {
            continue;
        }
        let inside = match cfg.shape {
            ShapeType::Circle => in_circle_2d(center, cfg.radius, e.pos),
            ShapeType::Ring => {
                in_ring_2d(center, (cfg.radius - cfg.width).max(0.0), cfg.radius, e.pos)
            }
            ShapeType::Cone => in_cone_2d(origin, axis, cfg.angle, cfg.radius, e.pos),
            ShapeType::Rect => in_rect_2d(origin, axis, cfg.width, cfg.length, e.pos),
            ShapeType::Single | ShapeType::Invalid => false,
        };
        if inside {
            out.push(e.id);
        }
    }
    filter_relation(owner, cfg.relation, view, out)
}

fn filter_relation(
    owner: Uid,
    relation: TargetRelation,
    view: &ZoneView,
    candidates: Vec<Uid>,
) -> Vec<Uid> {
    let keep_all = matches!(relation, TargetRelation::Invalid);
    if keep_all {
        return candidates;
    }
    let Some(caster) = view.get(owner) else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter(|id| {
            let Some(e) = view.get(*id) else {
                return false;
            };
            match relation {
                TargetRelation::Ally => caster.faction.is_ally(e.faction),
                TargetRelation::Enemy => caster.faction.is_hostile(e.faction),
                TargetRelation::Caster | TargetRelation::Invalid => true,
            }
        })
        .collect()
}

/// Execute one due effect firing: pick the stage's rule, resolve targets,
/// then run the variant (instant) or install a runtime (persistent).
#[allow(clippy::too_many_arguments)]
pub fn exec_effect(
    owner: Uid,
    spec: &SkillSpec,
    stage: Stage,
    eff: &EffectCfg,
    ctx_id: Uid,
    contexts: &mut OrderedMap<Uid, CastContext>,
    effects: &mut EffectManager,
    view: &ZoneView,
    bus: &mut CombatBus,
    now_ms: i64,
) {
    let Some(ctx) = contexts.get_mut(&ctx_id) else {
        return;
    };

    let target_cfg = select_target_cfg(spec, stage);
    let targets = resolve_targets(owner, target_cfg, &ctx.req, view);
    if targets.is_empty() {
        return;
    }

    let Some(mut effect) = create_effect(eff) else {
        return;
    };

    ctx.alloc_seq();
    let mut world = EffectWorld { view, bus, now_ms };

    if is_instant_effect(eff.kind) {
        let scope = EffectScope {
            caster: owner,
            targets: &targets,
        };
        effect.begin(ctx, &scope, &mut world);
    } else {
        let runtime = EffectRuntime::new(effect, eff, ctx_id, owner, targets);
        effects.add(runtime, ctx, &mut world);
    }
}
