#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Witch Battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The static catalogs (units, spells, witches, attribute affinities) also
//! live here as plain serde-friendly records. They are loaded once at startup
//! by an adapter and treated as immutable lookup tables everywhere else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Witch Battle.";

/// Side of the battlefield an entity fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The human-controlled side that owns the MP pool.
    Player,
    /// The automatically driven opposing side.
    Enemy,
}

impl Side {
    /// Returns the side this side fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Describes whether the simulation is advancing or halted behind a modal UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Standard battle mode where units advance, fight and MP regenerates.
    Battle,
    /// Paused mode entered while a modal window captures all input.
    Paused,
}

/// Terminal result of a match, latched the instant a base's HP reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The enemy base was destroyed.
    Victory,
    /// The player base was destroyed.
    Defeat,
}

/// Elemental attribute carried by units, bases and the affinity table.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Fire-aligned entities.
    Fire,
    /// Ice-aligned entities.
    Ice,
    /// Nature-aligned entities.
    Nature,
    /// Entities without an elemental alignment.
    #[default]
    Neutral,
}

/// Damage scaling derived from the attribute affinity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeMultiplier {
    /// Attacker is strong against the defender, damage scales by 1.5.
    Strong,
    /// No advantage either way, damage is unchanged.
    Even,
    /// Attacker is weak against the defender, damage scales by 0.5.
    Weak,
}

impl AttributeMultiplier {
    /// Applies the multiplier to an attack value, flooring to an integer.
    #[must_use]
    pub const fn apply(self, attack: u32) -> u32 {
        match self {
            Self::Strong => attack.saturating_mul(3) / 2,
            Self::Even => attack,
            Self::Weak => attack / 2,
        }
    }
}

/// Unique identifier assigned to a combat unit, monotonically increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Catalog key identifying a summonable unit type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTypeId(String);

impl UnitTypeId {
    /// Creates a new unit-type key from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Catalog key identifying a castable spell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(String);

impl SpellId {
    /// Creates a new spell key from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Catalog key identifying a witch (base) archetype.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitchId(String);

impl WitchId {
    /// Creates a new witch key from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stat a temporary buff applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuffStat {
    /// Raises the unit's current attack.
    Attack,
    /// Raises the unit's current defense.
    Defense,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation by a single tick.
    Tick,
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Requests that a unit of the given type join the battlefield.
    SummonUnit {
        /// Side the unit fights for.
        side: Side,
        /// Catalog key of the unit type to summon.
        unit_type: UnitTypeId,
    },
    /// Debits the spell's cost and either resolves it (area spells) or arms
    /// target selection (single-target spells).
    BeginSpell {
        /// Catalog key of the spell being cast.
        spell: SpellId,
    },
    /// Resolves the pending single-target spell against the provided unit.
    ResolveSpell {
        /// Unit the spell should affect.
        target: UnitId,
    },
    /// Cancels the pending single-target spell, refunding its cost.
    CancelSpell,
    /// Requests that a unit strike an opposing unit.
    Strike {
        /// Unit delivering the blow.
        attacker: UnitId,
        /// Unit receiving the blow.
        target: UnitId,
    },
    /// Requests that a unit standing at the opposing base line strike the base.
    StrikeBase {
        /// Unit delivering the blow.
        attacker: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TickAdvanced {
        /// Tick index reached after advancing.
        tick: u64,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Confirms that a unit joined the battlefield.
    UnitSummoned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Side the unit fights for.
        side: Side,
        /// Catalog key of the summoned type.
        unit_type: UnitTypeId,
    },
    /// Reports that a summon request was rejected.
    SummonRejected {
        /// Side that attempted the summon.
        side: Side,
        /// Catalog key of the requested type.
        unit_type: UnitTypeId,
        /// Specific reason the summon failed.
        reason: SummonError,
    },
    /// Confirms that two opposing units entered melee engagement.
    UnitsEngaged {
        /// One engaged unit.
        first: UnitId,
        /// The opposing engaged unit.
        second: UnitId,
    },
    /// Confirms that a unit struck an opposing unit.
    UnitStruck {
        /// Unit that delivered the blow.
        attacker: UnitId,
        /// Unit that received the blow.
        target: UnitId,
        /// Damage applied after the attribute multiplier.
        damage: u32,
    },
    /// Confirms that a unit struck the opposing base.
    BaseStruck {
        /// Unit that delivered the blow.
        attacker: UnitId,
        /// Side whose base was struck.
        side: Side,
        /// Damage applied to the base.
        damage: u32,
        /// Base HP remaining after the blow.
        remaining: u32,
    },
    /// Announces that a unit's HP reached zero.
    UnitDefeated {
        /// Unit that was defeated.
        unit: UnitId,
    },
    /// Confirms that a heal effect restored HP to a unit.
    UnitHealed {
        /// Unit that was healed.
        unit: UnitId,
        /// HP actually restored after clamping to the maximum.
        amount: u32,
    },
    /// Confirms that a timed buff was applied to a unit.
    BuffApplied {
        /// Unit carrying the buff.
        unit: UnitId,
        /// Stat the buff raises.
        stat: BuffStat,
        /// Magnitude added to the stat.
        amount: u32,
    },
    /// Announces that a timed buff elapsed and was removed.
    BuffExpired {
        /// Unit that lost the buff.
        unit: UnitId,
        /// Stat the buff had raised.
        stat: BuffStat,
    },
    /// Confirms that a spell's cost was debited and target selection is armed.
    SpellPrepared {
        /// Spell awaiting a target.
        spell: SpellId,
    },
    /// Confirms that a spell resolved against its target.
    SpellResolved {
        /// Spell that resolved.
        spell: SpellId,
        /// Unit the spell affected, absent for area spells.
        target: Option<UnitId>,
    },
    /// Confirms that a pending spell was cancelled and its cost refunded.
    SpellCancelled {
        /// Spell that was cancelled.
        spell: SpellId,
        /// MP returned to the pool.
        refunded: u32,
    },
    /// Reports that a cast request was rejected.
    CastRejected {
        /// Spell that was requested, absent when no spell was pending.
        spell: Option<SpellId>,
        /// Specific reason the cast failed.
        reason: CastError,
    },
    /// Announces that the match reached a terminal outcome.
    OutcomeDecided {
        /// Result latched by the world.
        outcome: Outcome,
    },
}

/// Reasons a summon request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SummonError {
    /// The side's MP pool cannot cover the unit's cost.
    InsufficientMp,
    /// The side's witch cannot summon the requested type.
    NotSummonable,
    /// The side already fields the maximum number of units.
    RosterFull,
    /// The requested type is absent from the unit catalog.
    UnknownUnitType,
}

/// Reasons a cast request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastError {
    /// The MP pool cannot cover the spell's cost.
    InsufficientMp,
    /// The player's witch cannot cast the requested spell.
    NotCastable,
    /// The requested spell is absent from the spell catalog.
    UnknownSpell,
    /// Another spell is already awaiting a target.
    AlreadyTargeting,
    /// No spell is awaiting a target.
    NoPendingSpell,
    /// The provided target is dead or not legal for the spell's target kind.
    InvalidTarget,
}

/// Effect a spell applies when it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellEffect {
    /// Restores HP to the target.
    Heal,
    /// Deals damage, mitigated by half the target's defense (minimum 1).
    Damage,
    /// Raises the target's attack for a fixed duration.
    BuffAttack,
    /// Raises the target's defense for a fixed duration.
    BuffDefense,
}

/// Kinds of targets a spell may legally resolve against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A single living unit on the player's side.
    SingleAlly,
    /// A single living unit on the enemy side.
    SingleEnemy,
    /// Every living enemy unit within the blast radius, no selection step.
    Area,
    /// Any single living unit on either side.
    Any,
}

impl TargetKind {
    /// Reports whether a unit on the provided side is a legal target.
    #[must_use]
    pub const fn permits(self, side: Side) -> bool {
        match self {
            Self::SingleAlly => matches!(side, Side::Player),
            Self::SingleEnemy => matches!(side, Side::Enemy),
            Self::Area => false,
            Self::Any => true,
        }
    }

    /// Reports whether the spell resolves immediately without target selection.
    #[must_use]
    pub const fn is_area(self) -> bool {
        matches!(self, Self::Area)
    }
}

/// Color family applied to floating combat text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextColor {
    /// Red, used for damage numbers and defeat markers.
    Damage,
    /// Green, used for healing numbers.
    Heal,
    /// Yellow, used for buff gains and expiries.
    Buff,
    /// White, used for informational markers.
    Info,
}

/// Static record describing a summonable unit type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    /// Display name shown on summon cards.
    pub name: String,
    /// MP debited when the player summons this type.
    pub cost: u32,
    /// Hit points granted at spawn.
    pub hp: u32,
    /// Base attack stat.
    pub attack: u32,
    /// Base defense stat, mitigates damage spells.
    #[serde(default)]
    pub defense: u32,
    /// Horizontal movement speed multiplier.
    pub speed: f32,
    /// Elemental attribute used by the affinity table.
    #[serde(default)]
    pub attribute: Attribute,
    /// Whether the enemy spawn policy may pick this type.
    #[serde(default = "default_true")]
    pub enemy_available: bool,
}

fn default_true() -> bool {
    true
}

/// Static record describing a castable spell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDef {
    /// Display name shown on buttons and cards.
    pub name: String,
    /// MP debited when the spell is cast.
    pub cost: u32,
    /// Effect applied on resolution.
    pub effect: SpellEffect,
    /// Magnitude of the effect (heal amount, damage, buff size).
    pub value: u32,
    /// Target kind constraining legal resolution targets.
    pub target: TargetKind,
    /// Buff duration in ticks, ignored by non-buff effects.
    #[serde(default)]
    pub duration: u64,
    /// One-line description shown on spell cards.
    #[serde(default)]
    pub description: String,
}

/// Static record describing a witch (base) archetype.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitchDef {
    /// Display name shown above the base.
    pub name: String,
    /// Hit points the base starts the match with.
    pub hp: u32,
    /// Attribute affinity that selects the witch's capabilities.
    #[serde(default)]
    pub attribute: Attribute,
    /// Unit types this witch may summon.
    pub summonable_units: Vec<UnitTypeId>,
    /// Spells this witch may cast.
    pub spells: Vec<SpellId>,
}

/// Strong/weak counterpart attributes for a single attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAffinity {
    /// Attribute this attribute deals 1.5x damage against.
    pub strong_against: Attribute,
    /// Attribute this attribute deals 0.5x damage against.
    pub weak_against: Attribute,
}

/// Immutable lookup tables loaded once at startup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Unit records keyed by unit-type id.
    pub units: BTreeMap<UnitTypeId, UnitDef>,
    /// Spell records keyed by spell id.
    pub spells: BTreeMap<SpellId, SpellDef>,
    /// Witch records keyed by witch id.
    pub witches: BTreeMap<WitchId, WitchDef>,
    /// Attribute affinity table.
    pub affinities: BTreeMap<Attribute, AttributeAffinity>,
}

impl Catalog {
    /// Resolves the damage multiplier for an attacker/defender attribute pair.
    ///
    /// Identical attributes always deal even damage; attributes absent from
    /// the affinity table fall back to even damage as well.
    #[must_use]
    pub fn multiplier(&self, attacker: Attribute, defender: Attribute) -> AttributeMultiplier {
        if attacker == defender {
            return AttributeMultiplier::Even;
        }
        match self.affinities.get(&attacker) {
            Some(affinity) if affinity.strong_against == defender => AttributeMultiplier::Strong,
            Some(affinity) if affinity.weak_against == defender => AttributeMultiplier::Weak,
            _ => AttributeMultiplier::Even,
        }
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Side the unit fights for.
    pub side: Side,
    /// Catalog key of the unit's type.
    pub unit_type: UnitTypeId,
    /// Elemental attribute carried by the unit.
    pub attribute: Attribute,
    /// Continuous horizontal position in battlefield units.
    pub x: f32,
    /// Vertical position, fixed at spawn.
    pub y: f32,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points, fixed at spawn.
    pub max_hp: u32,
    /// Current attack including active buffs.
    pub attack: u32,
    /// Current defense including active buffs.
    pub defense: u32,
    /// Whether the unit is engaged in melee and halted.
    pub in_combat: bool,
    /// Whether the unit reached the opposing base line.
    pub at_base: bool,
    /// Whether the unit's attack cooldown reached zero this tick.
    pub ready_to_strike: bool,
    /// Whether any timed buff is currently active.
    pub buffed: bool,
    /// Presentation opacity in the range 0..=255.
    pub alpha: u8,
    /// Presentation flash intensity in the range 0..=255.
    pub flash: u8,
}

/// Read-only snapshot describing all units on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by unit identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of living units fielded by the provided side.
    #[must_use]
    pub fn count_side(&self, side: Side) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.side == side)
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a base's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseSnapshot {
    /// Side the base belongs to.
    pub side: Side,
    /// Display name of the witch defending the base.
    pub name: String,
    /// Attribute affinity of the witch.
    pub attribute: Attribute,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points, fixed at construction.
    pub max_hp: u32,
    /// Horizontal position of the base anchor.
    pub x: f32,
    /// Vertical position of the base anchor.
    pub y: f32,
}

/// Floating combat-text entry captured for presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatingTextSnapshot {
    /// Unit the text is anchored to.
    pub unit: UnitId,
    /// Horizontal anchor in battlefield units.
    pub x: f32,
    /// Vertical anchor after upward drift.
    pub y: f32,
    /// Text to display.
    pub text: String,
    /// Color family of the text.
    pub color: TextColor,
    /// Opacity in the range 0..=255, fading near expiry.
    pub alpha: u8,
}
