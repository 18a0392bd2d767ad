use std::collections::BTreeMap;

use crate::state::UnitTypeId;

bitflags::bitflags! {
    /// Static capabilities attached to a unit type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UnitTraits: u8 {
        /// Spawns cloaked; loses cloak when attacking or ending next to a hostile.
        const CLOAK = 1 << 0;
        /// Never retaliates against melee or ranged attacks.
        const NO_COUNTER = 1 << 1;
    }
}

// Flag names (`"CLOAK | NO_COUNTER"`) in content files, raw bits otherwise.
#[cfg(feature = "serde")]
impl serde::Serialize for UnitTraits {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UnitTraits {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

/// Inclusive attack distance band (Manhattan).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRange {
    pub min: u32,
    pub max: u32,
}

impl AttackRange {
    pub const MELEE: Self = Self { min: 1, max: 1 };

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, distance: u32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

impl Default for AttackRange {
    fn default() -> Self {
        Self::MELEE
    }
}

/// Static stats shared by every unit of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitType {
    pub id: UnitTypeId,
    pub name: String,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub move_range: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_range: AttackRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traits: UnitTraits,
}

impl UnitType {
    pub fn has_cloak(&self) -> bool {
        self.traits.contains(UnitTraits::CLOAK)
    }

    pub fn can_counter(&self) -> bool {
        !self.traits.contains(UnitTraits::NO_COUNTER)
    }
}

/// Read-only lookup of unit type definitions.
pub trait TypeRegistry: Send + Sync {
    fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType>;
}

/// In-memory registry backed by an ordered map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticTypeRegistry {
    types: BTreeMap<UnitTypeId, UnitType>,
}

impl StaticTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any previous definition with the same id.
    pub fn insert(&mut self, unit_type: UnitType) -> Option<UnitType> {
        self.types.insert(unit_type.id, unit_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        self.types.values()
    }
}

impl FromIterator<UnitType> for StaticTypeRegistry {
    fn from_iter<I: IntoIterator<Item = UnitType>>(iter: I) -> Self {
        let mut registry = Self::new();
        for unit_type in iter {
            registry.insert(unit_type);
        }
        registry
    }
}

impl TypeRegistry for StaticTypeRegistry {
    fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.types.get(&id)
    }
}
