#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Witch Battle.
//!
//! The world owns every piece of match state: the unit roster, both bases,
//! the player's MP pool, the play mode, active buffs, floating combat text,
//! the pending targeted spell and the outcome latch. All mutation flows
//! through [`apply`], which executes one [`Command`] at a time and reports
//! what happened through [`Event`] values. Systems and adapters observe the
//! world exclusively through the read-only [`query`] module.

use std::{error::Error, fmt};

use witch_battle_core::{
    Catalog, CastError, Command, Event, Outcome, PlayMode, Side, SpellDef, SpellEffect, SpellId,
    SummonError, TextColor, UnitId, UnitTypeId, WitchId, WELCOME_BANNER,
};
use witch_battle_scheduler::{Easing, Scheduler, Step};

/// Horizontal extent of the battlefield in world units.
pub const BATTLEFIELD_WIDTH: f32 = 256.0;
/// Vertical extent of the battlefield in world units.
pub const BATTLEFIELD_HEIGHT: f32 = 192.0;
/// Vertical lane every unit walks along.
pub const LANE_Y: f32 = BATTLEFIELD_HEIGHT / 2.0;
/// Horizontal anchor of the player base.
pub const PLAYER_BASE_X: f32 = 12.0;
/// Horizontal anchor of the enemy base.
pub const ENEMY_BASE_X: f32 = BATTLEFIELD_WIDTH - 12.0;
/// Maximum number of living units either side may field at once.
pub const MAX_UNITS_PER_SIDE: usize = 5;
/// Ticks a unit's attack cooldown is reset to after striking.
pub const ATTACK_INTERVAL: u32 = 30;
/// MP the player pool starts the match with.
pub const INITIAL_MP: u32 = 50;
/// Upper bound of the player MP pool.
pub const MAX_MP: u32 = 100;

const PLAYER_SPAWN_X: f32 = 24.0;
const ENEMY_SPAWN_X: f32 = BATTLEFIELD_WIDTH - 24.0;
const BASE_STEP: f32 = 0.5;
const COLLISION_DISTANCE: f32 = 16.0;
const BASE_CONTACT_DISTANCE: f32 = 8.0;
const MP_REGEN_RATE: u32 = 1;
const DEFAULT_BUFF_DURATION: u64 = 300;
const FLOATING_TEXT_TICKS: u32 = 30;
const FLOATING_TEXT_FADE_TICKS: u32 = 10;
const FLOATING_TEXT_RISE: f32 = 0.5;
const SPAWN_FADE_TICKS: u32 = 30;
const DAMAGE_FLASH_TICKS: u32 = 5;
const AREA_ANCHOR_X: f32 = BATTLEFIELD_WIDTH * 0.75;
const AREA_RADIUS: f32 = BATTLEFIELD_WIDTH / 4.0;
const AREA_FLASH_STAGGER: u32 = 2;

/// Errors surfaced while assembling a world from catalog records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The requested witch key is absent from the witch catalog.
    UnknownWitch(WitchId),
}

impl fmt::Display for SetupError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWitch(witch) => {
                write!(formatter, "unknown witch in catalog: {}", witch.as_str())
            }
        }
    }
}

impl Error for SetupError {}

/// Scheduler key addressing one animatable presentation value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnimationTarget {
    /// A unit's spawn fade-in opacity.
    UnitAlpha(UnitId),
    /// A unit's damage flash intensity.
    UnitFlash(UnitId),
}

#[derive(Clone, Debug)]
struct Buff {
    stat: witch_battle_core::BuffStat,
    amount: u32,
    remaining: u64,
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    side: Side,
    unit_type: UnitTypeId,
    attribute: witch_battle_core::Attribute,
    x: f32,
    y: f32,
    hp: u32,
    max_hp: u32,
    base_attack: u32,
    base_defense: u32,
    speed: f32,
    attack_cooldown: u32,
    in_combat: bool,
    at_base: bool,
    alpha: i64,
    flash: i64,
    buffs: Vec<Buff>,
}

impl Unit {
    fn current_attack(&self) -> u32 {
        let bonus: u32 = self
            .buffs
            .iter()
            .filter(|buff| buff.stat == witch_battle_core::BuffStat::Attack)
            .map(|buff| buff.amount)
            .sum();
        self.base_attack.saturating_add(bonus)
    }

    fn current_defense(&self) -> u32 {
        let bonus: u32 = self
            .buffs
            .iter()
            .filter(|buff| buff.stat == witch_battle_core::BuffStat::Defense)
            .map(|buff| buff.amount)
            .sum();
        self.base_defense.saturating_add(bonus)
    }

    fn alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Clone, Debug)]
struct Base {
    side: Side,
    name: String,
    attribute: witch_battle_core::Attribute,
    hp: u32,
    max_hp: u32,
    x: f32,
    y: f32,
    summonable: Vec<UnitTypeId>,
    castable: Vec<SpellId>,
}

#[derive(Clone, Debug)]
struct FloatingText {
    unit: UnitId,
    x: f32,
    y: f32,
    text: String,
    color: TextColor,
    remaining: u32,
}

#[derive(Clone, Debug)]
struct PendingSpell {
    spell: SpellId,
    cost: u32,
}

/// Represents the authoritative Witch Battle match state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: Catalog,
    play_mode: PlayMode,
    outcome: Option<Outcome>,
    tick_index: u64,
    next_unit_id: u32,
    units: Vec<Unit>,
    player_base: Base,
    enemy_base: Base,
    mp: u32,
    pending_spell: Option<PendingSpell>,
    scheduler: Scheduler<AnimationTarget>,
    floating_texts: Vec<FloatingText>,
    scheduler_steps: Vec<Step<AnimationTarget>>,
}

impl World {
    /// Creates a new match between the two provided witches.
    ///
    /// Each base derives its HP, attribute and capability lists once from
    /// its witch's catalog record; the lists never change during play.
    pub fn new(
        catalog: Catalog,
        player_witch: &WitchId,
        enemy_witch: &WitchId,
    ) -> Result<Self, SetupError> {
        let player_base = build_base(&catalog, player_witch, Side::Player)?;
        let enemy_base = build_base(&catalog, enemy_witch, Side::Enemy)?;
        Ok(Self {
            banner: WELCOME_BANNER,
            catalog,
            play_mode: PlayMode::Battle,
            outcome: None,
            tick_index: 0,
            next_unit_id: 0,
            units: Vec::new(),
            player_base,
            enemy_base,
            mp: INITIAL_MP,
            pending_spell: None,
            scheduler: Scheduler::new(),
            floating_texts: Vec::new(),
            scheduler_steps: Vec::new(),
        })
    }

    fn base(&self, side: Side) -> &Base {
        match side {
            Side::Player => &self.player_base,
            Side::Enemy => &self.enemy_base,
        }
    }

    fn base_mut(&mut self, side: Side) -> &mut Base {
        match side {
            Side::Player => &mut self.player_base,
            Side::Enemy => &mut self.enemy_base,
        }
    }

    fn unit_index(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id == id)
    }

    fn count_living(&self, side: Side) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.side == side && unit.alive())
            .count()
    }

    fn push_text(&mut self, unit: UnitId, x: f32, y: f32, text: String, color: TextColor) {
        self.floating_texts.push(FloatingText {
            unit,
            x,
            y,
            text,
            color,
            remaining: FLOATING_TEXT_TICKS,
        });
    }

    /// Applies `amount` of damage to the unit at `index`, clamping HP at 0.
    ///
    /// Emits the floating damage text and a defeat marker, schedules the
    /// damage flash, and reports whether this call killed the unit. The unit
    /// stays in the roster until the next tick's pruning pass.
    fn damage_unit(
        &mut self,
        index: usize,
        amount: u32,
        flash_delay: u32,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.units[index].alive() {
            return false;
        }
        let (id, x, y) = {
            let unit = &mut self.units[index];
            unit.hp = unit.hp.saturating_sub(amount);
            (unit.id, unit.x, unit.y)
        };
        self.push_text(id, x, y, format!("-{amount}"), TextColor::Damage);
        self.scheduler.cancel(&AnimationTarget::UnitFlash(id));
        self.scheduler
            .schedule(AnimationTarget::UnitFlash(id), 255, 1, flash_delay, Easing::Linear);
        self.scheduler.schedule(
            AnimationTarget::UnitFlash(id),
            -255,
            DAMAGE_FLASH_TICKS,
            flash_delay + 1,
            Easing::Linear,
        );
        if self.units[index].alive() {
            return false;
        }
        self.push_text(id, x, y, "defeated".to_owned(), TextColor::Info);
        out_events.push(Event::UnitDefeated { unit: id });
        true
    }

    fn advance_scheduler(&mut self) {
        let mut steps = std::mem::take(&mut self.scheduler_steps);
        steps.clear();
        self.scheduler.advance(&mut steps);
        for step in &steps {
            // Targets may die mid-animation; stale steps are dropped.
            match step.key {
                AnimationTarget::UnitAlpha(id) => {
                    if let Some(index) = self.unit_index(id) {
                        let unit = &mut self.units[index];
                        unit.alpha = (unit.alpha + step.delta).clamp(0, 255);
                    }
                }
                AnimationTarget::UnitFlash(id) => {
                    if let Some(index) = self.unit_index(id) {
                        let unit = &mut self.units[index];
                        unit.flash = (unit.flash + step.delta).clamp(0, 255);
                    }
                }
            }
        }
        self.scheduler_steps = steps;
    }

    fn age_floating_texts(&mut self) {
        for text in &mut self.floating_texts {
            text.remaining = text.remaining.saturating_sub(1);
            text.y -= FLOATING_TEXT_RISE;
        }
        self.floating_texts.retain(|text| text.remaining > 0);
    }

    fn advance_movement(&mut self) {
        for unit in &mut self.units {
            if !unit.alive() || unit.in_combat || unit.at_base {
                continue;
            }
            match unit.side {
                Side::Player => {
                    unit.x += BASE_STEP * unit.speed;
                    if unit.x >= ENEMY_BASE_X - BASE_CONTACT_DISTANCE {
                        unit.x = ENEMY_BASE_X - BASE_CONTACT_DISTANCE;
                        unit.at_base = true;
                    }
                }
                Side::Enemy => {
                    unit.x -= BASE_STEP * unit.speed;
                    if unit.x <= PLAYER_BASE_X + BASE_CONTACT_DISTANCE {
                        unit.x = PLAYER_BASE_X + BASE_CONTACT_DISTANCE;
                        unit.at_base = true;
                    }
                }
            }
        }
    }

    /// Recomputes melee engagement from scratch so units disengage the tick
    /// their opponent dies.
    fn recompute_engagement(&mut self, out_events: &mut Vec<Event>) {
        let mut engaged = vec![false; self.units.len()];
        for first in 0..self.units.len() {
            for second in (first + 1)..self.units.len() {
                let (first_id, second_id, colliding) = {
                    let a = &self.units[first];
                    let b = &self.units[second];
                    let colliding = a.alive()
                        && b.alive()
                        && a.side != b.side
                        && (a.x - b.x).abs() < COLLISION_DISTANCE
                        && (a.y - b.y).abs() < COLLISION_DISTANCE;
                    (a.id, b.id, colliding)
                };
                if !colliding {
                    continue;
                }
                let newly = !(self.units[first].in_combat && self.units[second].in_combat);
                engaged[first] = true;
                engaged[second] = true;
                if newly {
                    out_events.push(Event::UnitsEngaged {
                        first: first_id,
                        second: second_id,
                    });
                }
            }
        }
        for (unit, flag) in self.units.iter_mut().zip(engaged) {
            unit.in_combat = flag;
        }
    }

    fn expire_buffs(&mut self, out_events: &mut Vec<Event>) {
        let mut expired: Vec<(UnitId, f32, f32, witch_battle_core::BuffStat)> = Vec::new();
        for unit in &mut self.units {
            if !unit.alive() {
                continue;
            }
            for buff in &mut unit.buffs {
                buff.remaining = buff.remaining.saturating_sub(1);
            }
            let (id, x, y) = (unit.id, unit.x, unit.y);
            for buff in unit.buffs.iter().filter(|buff| buff.remaining == 0) {
                expired.push((id, x, y, buff.stat));
            }
            unit.buffs.retain(|buff| buff.remaining > 0);
        }
        for (id, x, y, stat) in expired {
            self.push_text(id, x, y, "buff ended".to_owned(), TextColor::Buff);
            out_events.push(Event::BuffExpired { unit: id, stat });
        }
    }

    fn prune_dead(&mut self) {
        self.units.retain(|unit| unit.alive());
    }

    fn regenerate_mp(&mut self) {
        if self.mp < MAX_MP {
            self.mp = (self.mp + MP_REGEN_RATE).min(MAX_MP);
        }
    }

    fn latch_outcome(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        let outcome = if self.enemy_base.hp == 0 {
            Some(Outcome::Victory)
        } else if self.player_base.hp == 0 {
            Some(Outcome::Defeat)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            self.outcome = Some(outcome);
            out_events.push(Event::OutcomeDecided { outcome });
        }
    }

    fn summon(&mut self, side: Side, unit_type: UnitTypeId, out_events: &mut Vec<Event>) {
        let Some(def) = self.catalog.units.get(&unit_type).cloned() else {
            out_events.push(Event::SummonRejected {
                side,
                unit_type,
                reason: SummonError::UnknownUnitType,
            });
            return;
        };
        if !self.base(side).summonable.contains(&unit_type) {
            out_events.push(Event::SummonRejected {
                side,
                unit_type,
                reason: SummonError::NotSummonable,
            });
            return;
        }
        if self.count_living(side) >= MAX_UNITS_PER_SIDE {
            out_events.push(Event::SummonRejected {
                side,
                unit_type,
                reason: SummonError::RosterFull,
            });
            return;
        }
        if side == Side::Player {
            if self.mp < def.cost {
                out_events.push(Event::SummonRejected {
                    side,
                    unit_type,
                    reason: SummonError::InsufficientMp,
                });
                return;
            }
            self.mp -= def.cost;
        }
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.wrapping_add(1);
        let x = match side {
            Side::Player => PLAYER_SPAWN_X,
            Side::Enemy => ENEMY_SPAWN_X,
        };
        self.units.push(Unit {
            id,
            side,
            unit_type: unit_type.clone(),
            attribute: def.attribute,
            x,
            y: LANE_Y,
            hp: def.hp,
            max_hp: def.hp,
            base_attack: def.attack,
            base_defense: def.defense,
            speed: def.speed,
            attack_cooldown: ATTACK_INTERVAL,
            in_combat: false,
            at_base: false,
            alpha: 0,
            flash: 0,
            buffs: Vec::new(),
        });
        self.scheduler.schedule(
            AnimationTarget::UnitAlpha(id),
            255,
            SPAWN_FADE_TICKS,
            0,
            Easing::EaseOut,
        );
        out_events.push(Event::UnitSummoned {
            unit: id,
            side,
            unit_type,
        });
    }

    fn begin_spell(&mut self, spell: SpellId, out_events: &mut Vec<Event>) {
        if self.pending_spell.is_some() {
            out_events.push(Event::CastRejected {
                spell: Some(spell),
                reason: CastError::AlreadyTargeting,
            });
            return;
        }
        let Some(def) = self.catalog.spells.get(&spell).cloned() else {
            out_events.push(Event::CastRejected {
                spell: Some(spell),
                reason: CastError::UnknownSpell,
            });
            return;
        };
        if !self.player_base.castable.contains(&spell) {
            out_events.push(Event::CastRejected {
                spell: Some(spell),
                reason: CastError::NotCastable,
            });
            return;
        }
        if self.mp < def.cost {
            out_events.push(Event::CastRejected {
                spell: Some(spell),
                reason: CastError::InsufficientMp,
            });
            return;
        }
        self.mp -= def.cost;
        if def.target.is_area() {
            self.resolve_area(&spell, &def, out_events);
            return;
        }
        self.pending_spell = Some(PendingSpell {
            spell: spell.clone(),
            cost: def.cost,
        });
        out_events.push(Event::SpellPrepared { spell });
    }

    /// Area spells anchor at the centre of the enemy half and hit every
    /// living enemy unit within the blast radius for raw magnitude, with no
    /// defense mitigation. Flashes are staggered for presentation only.
    fn resolve_area(&mut self, spell: &SpellId, def: &SpellDef, out_events: &mut Vec<Event>) {
        let victims: Vec<usize> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| {
                unit.alive()
                    && unit.side == Side::Enemy
                    && distance(unit.x, unit.y, AREA_ANCHOR_X, LANE_Y) <= AREA_RADIUS
            })
            .map(|(index, _)| index)
            .collect();
        for (order, index) in victims.into_iter().enumerate() {
            let delay = order as u32 * AREA_FLASH_STAGGER;
            let _ = self.damage_unit(index, def.value, delay, out_events);
        }
        out_events.push(Event::SpellResolved {
            spell: spell.clone(),
            target: None,
        });
    }

    fn resolve_spell(&mut self, target: UnitId, out_events: &mut Vec<Event>) {
        let Some(pending) = self.pending_spell.take() else {
            out_events.push(Event::CastRejected {
                spell: None,
                reason: CastError::NoPendingSpell,
            });
            return;
        };
        let Some(def) = self.catalog.spells.get(&pending.spell).cloned() else {
            self.mp = (self.mp + pending.cost).min(MAX_MP);
            out_events.push(Event::CastRejected {
                spell: Some(pending.spell),
                reason: CastError::UnknownSpell,
            });
            return;
        };
        let legal = self
            .unit_index(target)
            .filter(|index| self.units[*index].alive())
            .filter(|index| def.target.permits(self.units[*index].side));
        let Some(index) = legal else {
            // Targeting always exits, and a failed cast refunds the debit.
            self.mp = (self.mp + pending.cost).min(MAX_MP);
            out_events.push(Event::CastRejected {
                spell: Some(pending.spell),
                reason: CastError::InvalidTarget,
            });
            return;
        };
        match def.effect {
            SpellEffect::Heal => {
                let (id, x, y, amount) = {
                    let unit = &mut self.units[index];
                    let amount = def.value.min(unit.max_hp - unit.hp);
                    unit.hp += amount;
                    (unit.id, unit.x, unit.y, amount)
                };
                if amount > 0 {
                    self.push_text(id, x, y, format!("+{amount}"), TextColor::Heal);
                    out_events.push(Event::UnitHealed { unit: id, amount });
                }
            }
            SpellEffect::Damage => {
                let mitigated = {
                    let unit = &self.units[index];
                    def.value.saturating_sub(unit.current_defense() / 2).max(1)
                };
                let _ = self.damage_unit(index, mitigated, 0, out_events);
            }
            SpellEffect::BuffAttack | SpellEffect::BuffDefense => {
                let stat = match def.effect {
                    SpellEffect::BuffAttack => witch_battle_core::BuffStat::Attack,
                    _ => witch_battle_core::BuffStat::Defense,
                };
                let duration = if def.duration > 0 {
                    def.duration
                } else {
                    DEFAULT_BUFF_DURATION
                };
                let (id, x, y) = {
                    let unit = &mut self.units[index];
                    unit.buffs.push(Buff {
                        stat,
                        amount: def.value,
                        remaining: duration,
                    });
                    (unit.id, unit.x, unit.y)
                };
                let label = match stat {
                    witch_battle_core::BuffStat::Attack => "ATK",
                    witch_battle_core::BuffStat::Defense => "DEF",
                };
                self.push_text(
                    id,
                    x,
                    y,
                    format!("+{} {label}", def.value),
                    TextColor::Buff,
                );
                out_events.push(Event::BuffApplied {
                    unit: id,
                    stat,
                    amount: def.value,
                });
            }
        }
        out_events.push(Event::SpellResolved {
            spell: pending.spell,
            target: Some(target),
        });
    }

    fn cancel_spell(&mut self, out_events: &mut Vec<Event>) {
        let Some(pending) = self.pending_spell.take() else {
            out_events.push(Event::CastRejected {
                spell: None,
                reason: CastError::NoPendingSpell,
            });
            return;
        };
        self.mp = (self.mp + pending.cost).min(MAX_MP);
        out_events.push(Event::SpellCancelled {
            spell: pending.spell,
            refunded: pending.cost,
        });
    }

    fn strike(&mut self, attacker: UnitId, target: UnitId, out_events: &mut Vec<Event>) {
        let Some(attacker_index) = self.unit_index(attacker) else {
            return;
        };
        let Some(target_index) = self.unit_index(target) else {
            return;
        };
        if attacker_index == target_index {
            return;
        }
        let (ready, attack, attacker_attribute) = {
            let unit = &self.units[attacker_index];
            (
                unit.alive() && unit.attack_cooldown == 0,
                unit.current_attack(),
                unit.attribute,
            )
        };
        if !ready || !self.units[target_index].alive() {
            return;
        }
        let multiplier = self
            .catalog
            .multiplier(attacker_attribute, self.units[target_index].attribute);
        let damage = multiplier.apply(attack);
        self.units[attacker_index].attack_cooldown = ATTACK_INTERVAL;
        out_events.push(Event::UnitStruck {
            attacker,
            target,
            damage,
        });
        let _ = self.damage_unit(target_index, damage, 0, out_events);
    }

    fn strike_base(&mut self, attacker: UnitId, out_events: &mut Vec<Event>) {
        let Some(index) = self.unit_index(attacker) else {
            return;
        };
        let (ready, attack, attribute, side) = {
            let unit = &self.units[index];
            (
                unit.alive() && unit.at_base && unit.attack_cooldown == 0,
                unit.current_attack(),
                unit.attribute,
                unit.side,
            )
        };
        if !ready {
            return;
        }
        let target_side = side.opponent();
        let multiplier = self
            .catalog
            .multiplier(attribute, self.base(target_side).attribute);
        let damage = multiplier.apply(attack);
        self.units[index].attack_cooldown = ATTACK_INTERVAL;
        let base = self.base_mut(target_side);
        base.hp = base.hp.saturating_sub(damage);
        let remaining = base.hp;
        out_events.push(Event::BaseStruck {
            attacker,
            side: target_side,
            damage,
            remaining,
        });
        self.latch_outcome(out_events);
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TickAdvanced {
            tick: self.tick_index,
        });

        // Presentation keeps moving even while a modal window pauses play.
        self.advance_scheduler();
        self.age_floating_texts();

        if self.play_mode != PlayMode::Battle {
            return;
        }

        for unit in &mut self.units {
            if unit.alive() {
                unit.attack_cooldown = unit.attack_cooldown.saturating_sub(1);
            }
        }
        self.advance_movement();
        self.recompute_engagement(out_events);
        self.expire_buffs(out_events);
        self.prune_dead();
        self.regenerate_mp();
        self.latch_outcome(out_events);
    }
}

fn build_base(catalog: &Catalog, witch: &WitchId, side: Side) -> Result<Base, SetupError> {
    let Some(def) = catalog.witches.get(witch) else {
        return Err(SetupError::UnknownWitch(witch.clone()));
    };
    let x = match side {
        Side::Player => PLAYER_BASE_X,
        Side::Enemy => ENEMY_BASE_X,
    };
    Ok(Base {
        side,
        name: def.name.clone(),
        attribute: def.attribute,
        hp: def.hp,
        max_hp: def.hp,
        x,
        y: LANE_Y,
        summonable: def.summonable_units.clone(),
        castable: def.spells.clone(),
    })
}

fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once an outcome is latched every command becomes a silent no-op; the
/// match is over and only drawing continues.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }
    match command {
        Command::Tick => world.tick(out_events),
        Command::SetPlayMode { mode } => {
            if world.play_mode != mode {
                world.play_mode = mode;
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::SummonUnit { side, unit_type } => world.summon(side, unit_type, out_events),
        Command::BeginSpell { spell } => world.begin_spell(spell, out_events),
        Command::ResolveSpell { target } => world.resolve_spell(target, out_events),
        Command::CancelSpell => world.cancel_spell(out_events),
        Command::Strike { attacker, target } => world.strike(attacker, target, out_events),
        Command::StrikeBase { attacker } => world.strike_base(attacker, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{FLOATING_TEXT_FADE_TICKS, World};
    use witch_battle_core::{
        BaseSnapshot, Catalog, FloatingTextSnapshot, Outcome, PlayMode, Side, SpellId, UnitSnapshot,
        UnitTypeId, UnitView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current play mode of the simulation.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Latched match outcome, if the match has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Number of ticks the simulation has processed.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick_index
    }

    /// Current MP available to the player.
    #[must_use]
    pub fn mp(world: &World) -> u32 {
        world.mp
    }

    /// Upper bound of the player MP pool.
    #[must_use]
    pub fn max_mp(_world: &World) -> u32 {
        super::MAX_MP
    }

    /// Static catalog the match was assembled from.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Spell currently awaiting a target, if any.
    #[must_use]
    pub fn pending_spell(world: &World) -> Option<&SpellId> {
        world.pending_spell.as_ref().map(|pending| &pending.spell)
    }

    /// Unit types the provided side's witch may summon.
    #[must_use]
    pub fn summonable_units(world: &World, side: Side) -> &[UnitTypeId] {
        &world.base(side).summonable
    }

    /// Spells the player's witch may cast.
    #[must_use]
    pub fn castable_spells(world: &World) -> &[SpellId] {
        &world.player_base.castable
    }

    /// Captures a read-only view of all living units on the battlefield.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        let snapshots: Vec<UnitSnapshot> = world
            .units
            .iter()
            .filter(|unit| unit.alive())
            .map(|unit| UnitSnapshot {
                id: unit.id,
                side: unit.side,
                unit_type: unit.unit_type.clone(),
                attribute: unit.attribute,
                x: unit.x,
                y: unit.y,
                hp: unit.hp,
                max_hp: unit.max_hp,
                attack: unit.current_attack(),
                defense: unit.current_defense(),
                in_combat: unit.in_combat,
                at_base: unit.at_base,
                ready_to_strike: unit.attack_cooldown == 0,
                buffed: !unit.buffs.is_empty(),
                alpha: unit.alpha.clamp(0, 255) as u8,
                flash: unit.flash.clamp(0, 255) as u8,
            })
            .collect();
        UnitView::from_snapshots(snapshots)
    }

    /// Captures a read-only snapshot of the provided side's base.
    #[must_use]
    pub fn base(world: &World, side: Side) -> BaseSnapshot {
        let base = world.base(side);
        BaseSnapshot {
            side: base.side,
            name: base.name.clone(),
            attribute: base.attribute,
            hp: base.hp,
            max_hp: base.max_hp,
            x: base.x,
            y: base.y,
        }
    }

    /// Captures the floating combat text currently in flight.
    #[must_use]
    pub fn floating_texts(world: &World) -> Vec<FloatingTextSnapshot> {
        world
            .floating_texts
            .iter()
            .map(|text| FloatingTextSnapshot {
                unit: text.unit,
                x: text.x,
                y: text.y,
                text: text.text.clone(),
                color: text.color,
                alpha: if text.remaining >= FLOATING_TEXT_FADE_TICKS {
                    255
                } else {
                    (255 * text.remaining / FLOATING_TEXT_FADE_TICKS) as u8
                },
            })
            .collect()
    }
}
