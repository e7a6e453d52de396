//! ConfigDb: canonical facade over the exported tables.
//!
//! Indexes rows by id and compiles the runtime [`SkillSpec`] records: a
//! skill row plus its effect rows and selector row become one self-contained
//! spec the zone runtime can execute without touching the tables again.

use std::collections::HashMap;

use crate::skill::{
    EffectCfg, EffectType, ShapeType, SkillSpec, StageEffects, StageSelectors, TargetCfg,
    TargetMode, TargetRelation, TimingPoint,
};
use crate::tables::{
    AllConfig, BuffEffectRow, BuffRow, DamageFormulaRow, SelectorRow, SkillEffectRow, SkillRow,
};

#[derive(Default)]
pub struct ConfigDb {
    skills: HashMap<i64, SkillRow>,
    skill_effects: HashMap<i64, SkillEffectRow>,
    selectors: HashMap<i64, SelectorRow>,
    buffs: HashMap<i64, BuffRow>,
    buff_effects: HashMap<i64, BuffEffectRow>,
    damage_formulas: HashMap<i64, DamageFormulaRow>,
}

impl ConfigDb {
    pub fn from_config(cfg: AllConfig) -> ConfigDb {
        let mut db = ConfigDb::default();
        for r in cfg.skills {
            db.skills.insert(r.id, r);
        }
        for r in cfg.skill_effects {
            db.skill_effects.insert(r.id, r);
        }
        for r in cfg.selectors {
            db.selectors.insert(r.id, r);
        }
        for r in cfg.buffs {
            db.buffs.insert(r.id, r);
        }
        for r in cfg.buff_effects {
            db.buff_effects.insert(r.id, r);
        }
        for r in cfg.damage_formulas {
            db.damage_formulas.insert(r.id, r);
        }
        db
    }

    pub fn skill(&self, id: i64) -> Option<&SkillRow> {
        self.skills.get(&id)
    }
    pub fn skill_effect(&self, id: i64) -> Option<&SkillEffectRow> {
        self.skill_effects.get(&id)
    }
    pub fn selector(&self, id: i64) -> Option<&SelectorRow> {
        self.selectors.get(&id)
    }
    pub fn buff(&self, id: i64) -> Option<&BuffRow> {
        self.buffs.get(&id)
    }
    pub fn buff_effect(&self, id: i64) -> Option<&BuffEffectRow> {
        self.buff_effects.get(&id)
    }
    pub fn damage_formula(&self, id: i64) -> Option<&DamageFormulaRow> {
        self.damage_formulas.get(&id)
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.skills.keys().copied()
    }

    /// Compile the runtime spec for one skill. Returns `None` for an unknown
    /// id; effect ids that resolve to no row are skipped.
    pub fn build_skill(&self, id: i64) -> Option<SkillSpec> {
        let row = self.skills.get(&id)?;

        let mut effects = StageEffects::default();
        let mut hit_delay_ms = 0;
        let mut has_hit = false;
        for eid in &row.effect_ids {
            let Some(er) = self.skill_effects.get(eid) else {
                continue;
            };
            let cfg = effect_cfg_from_row(er);
            match er.stage {
                1 => effects.on_cast_start.push(cfg),
                2 => effects.on_cast_finish.push(cfg),
                3 => effects.on_channel_tick.push(cfg),
                4 => {
                    if !has_hit {
                        has_hit = true;
                        hit_delay_ms = er.delay_ms;
                    }
                    effects.on_hit.push(cfg);
                }
                5 => effects.on_cancel.push(cfg),
                _ => {}
            }
        }

        let target = self
            .selectors
            .get(&row.target_selector_id)
            .map(target_cfg_from_selector)
            .unwrap_or_default();

        Some(SkillSpec {
            cid: row.id,
            name: row.name.clone(),
            cast_time_ms: row.cast_time_ms,
            channel_time_ms: row.channel_time_ms,
            channel_tick_ms: row.channel_tick_ms,
            channel_tick_delay_ms: 0,
            gcd_ms: row.gcd_ms,
            cooldown_ms: row.cooldown_ms,
            gcd_start_at: timing_point(row.gcd_start_stage),
            cooldown_start_at: timing_point(row.cooldown_start_stage),
            hit_on_cast_finish: has_hit,
            hit_delay_ms,
            charges: 0,
            recharge_ms: 0,
            cost_mp: row.resource_cost,
            range_min: 0.0,
            range_max: row.range,
            target,
            selectors: StageSelectors::default(),
            effects,
        })
    }
}

fn timing_point(stage: i32) -> TimingPoint {
    match stage {
        2 => TimingPoint::CastFinish,
        _ => TimingPoint::CastStart,
    }
}

fn target_cfg_from_selector(row: &SelectorRow) -> TargetCfg {
    let shape = match row.shape {
        1 => ShapeType::Single,
        2 => ShapeType::Circle,
        3 => ShapeType::Cone,
        4 => ShapeType::Rect,
        5 => ShapeType::Ring,
        _ => ShapeType::Invalid,
    };
    TargetCfg {
        relation: match row.relation {
            1 => TargetRelation::Caster,
            2 => TargetRelation::Ally,
            3 => TargetRelation::Enemy,
            _ => TargetRelation::Invalid,
        },
        mode: match row.mode {
            1 => TargetMode::Unit,
            2 => TargetMode::Point,
            3 => TargetMode::NoTarget,
            _ => TargetMode::Invalid,
        },
        shape,
        radius: row.radius,
        angle: row.angle,
        // Ring rows export an inner radius; the runtime rule works off the
        // annulus thickness.
        width: if shape == ShapeType::Ring {
            (row.radius - row.inner_radius).max(0.0)
        } else {
            row.width
        },
        length: row.length,
    }
}

fn effect_cfg_from_row(row: &SkillEffectRow) -> EffectCfg {
    let kind = EffectType::from_i32(row.effect_type);
    let mut cfg = EffectCfg {
        kind,
        times: row.times,
        interval_ms: row.interval_ms,
        ref_id: 0,
        p1: row.p1,
        p2: row.p2,
        p3: row.p3,
        p4: row.p4,
        args: Vec::new(),
    };
    match kind {
        EffectType::Damage => cfg.ref_id = row.damage_formula_id,
        EffectType::Heal => cfg.ref_id = row.heal_formula_id,
        EffectType::ApplyAura => {
            cfg.ref_id = row.buff_id;
            if cfg.p2 == 0 {
                cfg.p2 = row.buff_duration_ms;
            }
        }
        EffectType::Dispel | EffectType::Steal => {
            cfg.ref_id = row.dispel_type as i64;
            if cfg.p1 == 0 {
                cfg.p1 = row.dispel_count as i64;
            }
        }
        EffectType::Move => {
            if cfg.p1 == 0 {
                cfg.p1 = row.move_distance as i64;
            }
            if cfg.p2 == 0 {
                cfg.p2 = row.move_type as i64;
            }
        }
        EffectType::Summon => cfg.ref_id = row.summon_id,
        EffectType::Threat => {
            if cfg.p1 == 0 {
                cfg.p1 = row.threat_value;
            }
        }
        EffectType::SpawnArea => cfg.ref_id = row.area_id,
        EffectType::Interrupt | EffectType::Invalid => {}
    }
    cfg
}
