//! Effect capability surface and the variant factory.
//!
//! Variants are a closed set: the config tag is a plain enum and
//! [`is_instant_effect`] matches it exhaustively. The behavior behind a tag
//! is a small four-operation capability so persistent runtimes can drive it
//! without knowing which variant they hold.

use std::sync::Once;

use data_runtime::skill::{EffectCfg, EffectType};
use uid_core::Uid;

use crate::combat::bus::CombatBus;
use crate::combat::context::CastContext;
use crate::combat::effects;
use crate::zone::ZoneView;

/// Who an effect execution is about: the caster and the resolved targets.
/// The dispatcher guarantees `targets` is non-empty.
pub struct EffectScope<'a> {
    pub caster: Uid,
    pub targets: &'a [Uid],
}

/// Read access to the zone plus the event bus an effect writes through.
pub struct EffectWorld<'a> {
    pub view: &'a ZoneView,
    pub bus: &'a mut CombatBus,
    pub now_ms: i64,
}

/// The four-operation effect contract.
///
/// Implementations must be infallible: every error case degrades to "do
/// nothing". `begin` runs at dispatch; `update` on each runtime tick; `end`
/// on natural expiry; `revert` on cancel/dispel.
pub trait SkillEffect: Send {
    fn begin(&mut self, ctx: &mut CastContext, scope: &EffectScope<'_>, world: &mut EffectWorld<'_>);
    fn update(
        &mut self,
        ctx: &mut CastContext,
        scope: &EffectScope<'_>,
        delta_ms: i64,
        world: &mut EffectWorld<'_>,
    );
    fn end(&mut self, ctx: &mut CastContext, scope: &EffectScope<'_>, world: &mut EffectWorld<'_>);
    fn revert(&mut self, ctx: &mut CastContext, scope: &EffectScope<'_>, world: &mut EffectWorld<'_>);
}

/// Whether a variant settles entirely inside `begin` (no runtime tracking).
pub fn is_instant_effect(kind: EffectType) -> bool {
    match kind {
        EffectType::Damage
        | EffectType::Heal
        | EffectType::Move
        | EffectType::Interrupt
        | EffectType::Dispel
        | EffectType::Steal
        | EffectType::Threat
        | EffectType::Summon => true,
        EffectType::ApplyAura | EffectType::SpawnArea => false,
        EffectType::Invalid => true,
    }
}

/// Build the behavior for one effect config. An unknown tag yields `None`
/// and the dispatcher skips the entry.
pub fn create_effect(cfg: &EffectCfg) -> Option<Box<dyn SkillEffect>> {
    match cfg.kind {
        EffectType::Damage => Some(Box::new(effects::DamageEffect::new(cfg.clone()))),
        EffectType::Heal => Some(Box::new(effects::HealEffect::new(cfg.clone()))),
        EffectType::ApplyAura => Some(Box::new(effects::AuraEffect::new(cfg.clone()))),
        EffectType::Dispel => Some(Box::new(effects::DispelEffect::new(cfg.clone()))),
        EffectType::Steal => Some(Box::new(effects::StealEffect::new(cfg.clone()))),
        EffectType::Move => Some(Box::new(effects::MoveEffect::new(cfg.clone()))),
        EffectType::Interrupt => Some(Box::new(effects::InterruptEffect::new(cfg.clone()))),
        EffectType::Summon => Some(Box::new(effects::SummonEffect::new(cfg.clone()))),
        EffectType::Threat => Some(Box::new(effects::ThreatEffect::new(cfg.clone()))),
        EffectType::SpawnArea => Some(Box::new(effects::SpawnAreaEffect::new(cfg.clone()))),
        EffectType::Invalid => {
            static WARNED: Once = Once::new();
            WARNED.call_once(|| log::warn!("skipping effect with unknown variant tag"));
            None
        }
    }
}
