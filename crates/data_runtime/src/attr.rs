//! Combat attribute table: a closed attribute enum plus a per-entity
//! snapshot of `{value, rate}` slots.

/// Closed attribute identifier. Discriminants are stable sheet ids; gaps are
/// reserved ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AttrType {
    Invalid = 0,
    Constitution = 1,
    Strength = 2,
    Intelligence = 3,
    Endurance = 4,
    Agility = 5,
    MaxHp = 13,
    MaxMp = 14,
    Speed = 15,
    PhyAttack = 16,
    PhyDefense = 17,
    MagicAttack = 18,
    MagicDefense = 19,
    PhyDamageBonus = 30,
    PhyDamageReduction = 31,
    MagicDamageBonus = 32,
    MagicDamageReduction = 33,
    ControlEnhancement = 34,
    ControlResistance = 35,
    HealingEnhancement = 36,
    HealingReceivedBonus = 37,
    PhyDefensePenetrationRate = 38,
    MagicDefensePenetrationRate = 39,
    PhyCritRate = 50,
    PhyCritDamage = 51,
    MagicCritRate = 52,
    MagicCritDamage = 53,
    PhyHitRate = 54,
    PhyDodgeRate = 55,
    MagicHitRate = 56,
    MagicDodgeRate = 57,
    HealingCritRate = 58,
    ControlHitRate = 59,
    ControlDodgeRate = 60,
    Hp = 100,
    Mp = 101,
}

impl AttrType {
    pub fn from_i32(v: i32) -> Option<AttrType> {
        use AttrType::*;
        Some(match v {
            1 => Constitution,
            2 => Strength,
            3 => Intelligence,
            4 => Endurance,
            5 => Agility,
            13 => MaxHp,
            14 => MaxMp,
            15 => Speed,
            16 => PhyAttack,
            17 => PhyDefense,
            18 => MagicAttack,
            19 => MagicDefense,
            30 => PhyDamageBonus,
            31 => PhyDamageReduction,
            32 => MagicDamageBonus,
            33 => MagicDamageReduction,
            34 => ControlEnhancement,
            35 => ControlResistance,
            36 => HealingEnhancement,
            37 => HealingReceivedBonus,
            38 => PhyDefensePenetrationRate,
            39 => MagicDefensePenetrationRate,
            50 => PhyCritRate,
            51 => PhyCritDamage,
            52 => MagicCritRate,
            53 => MagicCritDamage,
            54 => PhyHitRate,
            55 => PhyDodgeRate,
            56 => MagicHitRate,
            57 => MagicDodgeRate,
            58 => HealingCritRate,
            59 => ControlHitRate,
            60 => ControlDodgeRate,
            100 => Hp,
            101 => Mp,
            _ => return None,
        })
    }
}

/// One attribute slot: flat value plus a per-mille rate modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr {
    pub ty: AttrType,
    pub value: i64,
    pub rate: i64,
}

/// Attribute snapshot handed to an entity at spawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(pub Vec<Attr>);

impl Attrs {
    pub fn new(slots: Vec<Attr>) -> Attrs {
        Attrs(slots)
    }

    /// First matching slot's value, or zero.
    pub fn get_value(&self, ty: AttrType) -> i64 {
        self.0.iter().find(|a| a.ty == ty).map(|a| a.value).unwrap_or(0)
    }

    pub fn push(&mut self, ty: AttrType, value: i64) {
        self.0.push(Attr { ty, value, rate: 0 });
    }
}
