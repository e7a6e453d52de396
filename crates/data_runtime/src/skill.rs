//! Runtime skill records: "what the skill is", never how far along it is.
//! Cooldown clocks, cast progress and charge counts live in the zone runtime.

/// Point in the skill timeline from which a rule starts counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingPoint {
    #[default]
    Invalid,
    CastStart,
    CastFinish,
}

/// Who an effect may apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetRelation {
    #[default]
    Invalid,
    /// The caster only.
    Caster,
    Ally,
    Enemy,
}

/// How targets are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    #[default]
    Invalid,
    /// The locked unit from the cast request.
    Unit,
    /// An area around the request point.
    Point,
    /// No explicit target; resolved from the caster.
    NoTarget,
}

/// Area shape for Point/NoTarget selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeType {
    #[default]
    Invalid,
    Single,
    Circle,
    Cone,
    Rect,
    Ring,
}

/// Target selection rule: relation, mode, shape and the shape parameters.
/// For `Ring`, `width` is the annulus thickness (inner = radius - width).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetCfg {
    pub relation: TargetRelation,
    pub mode: TargetMode,
    pub shape: ShapeType,
    pub radius: f64,
    pub angle: f64,
    pub width: f64,
    pub length: f64,
}

/// Effect variant tag. Closed: the dispatcher matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum EffectType {
    #[default]
    Invalid = 0,
    Damage = 1,
    Heal = 2,
    ApplyAura = 3,
    Dispel = 4,
    Steal = 5,
    Move = 6,
    Interrupt = 7,
    Summon = 8,
    Threat = 9,
    SpawnArea = 10,
}

impl EffectType {
    pub fn from_i32(v: i32) -> EffectType {
        use EffectType::*;
        match v {
            1 => Damage,
            2 => Heal,
            3 => ApplyAura,
            4 => Dispel,
            5 => Steal,
            6 => Move,
            7 => Interrupt,
            8 => Summon,
            9 => Threat,
            10 => SpawnArea,
            _ => Invalid,
        }
    }
}

/// One effect entry. `times`/`interval_ms` drive multi-hit settlement; the
/// generic parameters are interpreted per variant (see the effect module).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectCfg {
    pub kind: EffectType,

    /// Repeat count; <= 1 means once.
    pub times: i32,
    /// Gap between repeats in milliseconds.
    pub interval_ms: i32,

    /// Reference id: buff id, summon recipe id, area id, aura tag, ...
    pub ref_id: i64,

    pub p1: i64,
    pub p2: i64,
    pub p3: i64,
    pub p4: i64,

    /// Extension parameters (multipliers, marks, ...).
    pub args: Vec<i64>,
}

/// Per-stage selector overrides. A `None` stage falls back to the skill's
/// default target rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageSelectors {
    pub on_cast_start: Option<TargetCfg>,
    pub on_cast_finish: Option<TargetCfg>,
    pub on_channel_tick: Option<TargetCfg>,
    pub on_hit: Option<TargetCfg>,
    pub on_cancel: Option<TargetCfg>,
}

/// Effect lists by stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageEffects {
    pub on_cast_start: Vec<EffectCfg>,
    pub on_cast_finish: Vec<EffectCfg>,
    pub on_channel_tick: Vec<EffectCfg>,
    pub on_hit: Vec<EffectCfg>,
    pub on_cancel: Vec<EffectCfg>,
}

/// Immutable skill configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillSpec {
    pub cid: i64,
    pub name: String,

    /// Cast time in ms; 0 is instant.
    pub cast_time_ms: i32,
    /// Channel duration in ms; 0 means no channel.
    pub channel_time_ms: i32,
    /// Channel tick interval; 0 leaves ticking entirely to the effect's own
    /// `times`/`interval_ms`.
    pub channel_tick_ms: i32,
    /// Delay before the first channel tick; 0 ticks immediately on entry.
    pub channel_tick_delay_ms: i32,
    pub gcd_ms: i32,
    pub cooldown_ms: i32,
    /// Defaults to CastStart when Invalid.
    pub gcd_start_at: TimingPoint,
    /// Defaults to CastStart when Invalid.
    pub cooldown_start_at: TimingPoint,

    /// Auto-fire the hit list after cast finish.
    pub hit_on_cast_finish: bool,
    /// Delay from cast finish to that hit, in ms.
    pub hit_delay_ms: i32,

    /// Charge count; 0/1 disables the charge system.
    pub charges: i32,
    /// Time to refill one charge, in ms.
    pub recharge_ms: i32,

    pub cost_mp: i64,

    pub range_min: f64,
    pub range_max: f64,

    pub target: TargetCfg,
    pub selectors: StageSelectors,
    pub effects: StageEffects,
}
