//! Persisted table rows, one struct per exported sheet. Field names mirror
//! the sheet columns; keep them in sync with the exporter.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SkillRow {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub skill_type: i32,
    pub target_type: i32,
    pub max_level: i32,
    pub cooldown_ms: i32,
    pub cooldown_start_stage: i32,
    pub gcd_ms: i32,
    pub gcd_start_stage: i32,
    pub cast_time_ms: i32,
    pub channel_time_ms: i32,
    pub channel_tick_ms: i32,
    pub range: f64,
    pub resource_type: i32,
    pub resource_cost: i64,
    #[serde(rename = "TargetSelectorID")]
    pub target_selector_id: i64,
    #[serde(rename = "EffectIDs")]
    pub effect_ids: Vec<i64>,
    #[serde(rename = "RequireBuffID")]
    pub require_buff_id: i64,
    #[serde(rename = "ConsumeBuffID")]
    pub consume_buff_id: i64,
    pub can_cast_while_moving: bool,
    pub can_cast_while_stunned: bool,
    pub interruptible_by_damage: bool,
    #[serde(rename = "InterruptibleByCC")]
    pub interruptible_by_cc: bool,
    pub school_mask: i32,
    pub tags: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SkillEffectRow {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub effect_type: i32,
    pub stage: i32,
    pub delay_ms: i32,
    pub times: i32,
    pub interval_ms: i32,
    #[serde(rename = "DamageFormulaID")]
    pub damage_formula_id: i64,
    #[serde(rename = "HealFormulaID")]
    pub heal_formula_id: i64,
    #[serde(rename = "BuffID")]
    pub buff_id: i64,
    pub buff_duration_ms: i64,
    pub buff_stacks: i32,
    pub dispel_type: i32,
    pub dispel_count: i32,
    pub move_type: i32,
    pub move_distance: f64,
    #[serde(rename = "SummonID")]
    pub summon_id: i64,
    pub threat_value: i64,
    #[serde(rename = "AreaID")]
    pub area_id: i64,
    #[serde(rename = "P1")]
    pub p1: i64,
    #[serde(rename = "P2")]
    pub p2: i64,
    #[serde(rename = "P3")]
    pub p3: i64,
    #[serde(rename = "P4")]
    pub p4: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BuffRow {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub buff_type: i32,
    pub duration_ms: i64,
    pub max_stacks: i32,
    pub stack_rule: i32,
    pub dispel_type: i32,
    pub can_dispel: bool,
    pub can_steal: bool,
    pub priority: i32,
    #[serde(rename = "EffectIDs")]
    pub effect_ids: Vec<i64>,
    pub immunity_mask: i32,
    pub tags: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BuffEffectRow {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub effect_type: i32,
    pub trigger_type: i32,
    pub tick_interval_ms: i32,
    pub max_ticks: i32,
    pub event_type: i32,
    pub trigger_chance: f64,
    pub cooldown_ms: i32,
    pub attribute_type: i32,
    pub mod_type: i32,
    pub mod_value: i64,
    #[serde(rename = "DamageFormulaID")]
    pub damage_formula_id: i64,
    #[serde(rename = "HealFormulaID")]
    pub heal_formula_id: i64,
    pub shield_amount: i64,
    #[serde(rename = "CCType")]
    pub cc_type: i32,
    pub move_speed_pct: f64,
    pub attack_speed_pct: f64,
    pub cast_speed_pct: f64,
    #[serde(rename = "P1")]
    pub p1: i64,
    #[serde(rename = "P2")]
    pub p2: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SelectorRow {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub mode: i32,
    pub shape: i32,
    pub radius: f64,
    pub angle: f64,
    pub width: f64,
    pub length: f64,
    pub inner_radius: f64,
    pub relation: i32,
    #[serde(rename = "MinHP")]
    pub min_hp: i64,
    #[serde(rename = "MaxHP")]
    pub max_hp: i64,
    #[serde(rename = "MinHPPct")]
    pub min_hp_pct: f64,
    #[serde(rename = "MaxHPPct")]
    pub max_hp_pct: f64,
    #[serde(rename = "RequireBuffID")]
    pub require_buff_id: i64,
    #[serde(rename = "ExcludeBuffID")]
    pub exclude_buff_id: i64,
    pub sort: i32,
    pub max_count: i32,
    pub include_caster: bool,
    pub include_dead: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DamageFormulaRow {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub damage_type: i32,
    pub school: i32,
    pub base_damage: i64,
    pub base_damage_per_level: i64,
    #[serde(rename = "APCoefficient")]
    pub ap_coefficient: f64,
    #[serde(rename = "SPCoefficient")]
    pub sp_coefficient: f64,
    #[serde(rename = "TargetHPCoefficient")]
    pub target_hp_coefficient: f64,
    #[serde(rename = "TargetMissingHPCoefficient")]
    pub target_missing_hp_coefficient: f64,
    #[serde(rename = "CasterHPCoefficient")]
    pub caster_hp_coefficient: f64,
    pub execute_threshold: f64,
    pub execute_bonus: f64,
    pub can_crit: bool,
    pub crit_multiplier: f64,
    pub can_dodge: bool,
    pub can_block: bool,
    pub can_parry: bool,
    pub ignore_armor_pct: f64,
    pub splash_radius: f64,
    pub splash_damage_pct: f64,
    pub min_damage: i64,
    pub max_damage: i64,
}

/// The whole exported config bundle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AllConfig {
    pub buffs: Vec<BuffRow>,
    pub buff_effects: Vec<BuffEffectRow>,
    pub damage_formulas: Vec<DamageFormulaRow>,
    pub selectors: Vec<SelectorRow>,
    pub skills: Vec<SkillRow>,
    pub skill_effects: Vec<SkillEffectRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_accept_sparse_json() {
        let cfg: AllConfig = serde_json::from_str(
            r#"{
                "skills": [{"ID": 10, "Name": "Bolt", "CooldownMs": 1500}],
                "skillEffects": [{"ID": 1, "EffectType": 1, "Stage": 4, "P1": 25}]
            }"#,
        )
        .expect("sparse config parses");
        assert_eq!(cfg.skills.len(), 1);
        assert_eq!(cfg.skills[0].id, 10);
        assert_eq!(cfg.skills[0].cooldown_ms, 1500);
        assert_eq!(cfg.skill_effects[0].p1, 25);
        assert!(cfg.buffs.is_empty());
    }
}
