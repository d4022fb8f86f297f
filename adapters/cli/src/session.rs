//! Per-frame orchestration wiring the systems to the authoritative world.
//!
//! A [`Session`] owns the world and one instance of each system and steps the
//! whole simulation once per rendered frame. The frame order is fixed: pointer
//! input routes through the interface first, queued strikes follow, the tick
//! advances the world clock, and the spawn director reacts to the tick events
//! last so its roster projection sees this frame's casualties.

use glam::Vec2;
use witch_battle_core::{
    Catalog, Command, Event, Outcome, PlayMode, Side, UnitTypeId, UnitView,
};
use witch_battle_rendering::{
    attribute_color, text_color, BasePresentation, BattlefieldPresentation, CardPresentation,
    Color, MpPresentation, RenderingError, Scene, SceneRect, TextPresentation, UnitPresentation,
    WindowPresentation,
};
use witch_battle_system_combat::Combat;
use witch_battle_system_interface::{
    layout, Context, Interface, PointerState, Rect, WindowView,
};
use witch_battle_system_spawning::{Config as SpawnConfig, Spawning, DEFAULT_SPAWN_INTERVAL};
use witch_battle_world::{
    apply, query, SetupError, World, BATTLEFIELD_HEIGHT, BATTLEFIELD_WIDTH, MAX_UNITS_PER_SIDE,
};

use crate::match_code::MatchSettings;

const GROUND_COLOR: Color = Color::from_rgb_u8(0x2b, 0x24, 0x33);

/// One running match: the world plus the systems that drive it.
#[derive(Debug)]
pub struct Session {
    world: World,
    combat: Combat,
    spawning: Spawning,
    interface: Interface,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Session {
    /// Builds a fresh match from a validated catalog and match settings.
    pub fn new(catalog: Catalog, settings: &MatchSettings) -> Result<Self, SetupError> {
        let world = World::new(catalog, &settings.player_witch, &settings.enemy_witch)?;
        let spawning = Spawning::new(SpawnConfig::new(
            DEFAULT_SPAWN_INTERVAL,
            MAX_UNITS_PER_SIDE,
            settings.seed,
        ));
        Ok(Self {
            world,
            combat: Combat::new(),
            spawning,
            interface: Interface::new(),
            commands: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Steps the simulation one frame using the provided pointer snapshot.
    ///
    /// Events emitted during the frame are retained until the next call and
    /// can be inspected through [`Session::events`].
    pub fn advance(&mut self, pointer: PointerState) {
        self.events.clear();
        self.commands.clear();

        let units = query::unit_view(&self.world);
        let pending_target = query::pending_spell(&self.world)
            .and_then(|spell| query::catalog(&self.world).spells.get(spell))
            .map(|def| def.target);
        let context = Context {
            mp: query::mp(&self.world),
            outcome: query::outcome(&self.world),
            pending_target,
            units: &units,
            catalog: query::catalog(&self.world),
            summonable: query::summonable_units(&self.world, Side::Player),
            castable: query::castable_spells(&self.world),
        };
        self.interface.handle(pointer, &context, &mut self.commands);
        self.flush_commands();

        let units = query::unit_view(&self.world);
        self.combat
            .handle(query::play_mode(&self.world), &units, &mut self.commands);
        self.flush_commands();

        let tick_start = self.events.len();
        apply(&mut self.world, Command::Tick, &mut self.events);

        let candidates = self.enemy_candidates();
        let enemy_count = query::unit_view(&self.world).count_side(Side::Enemy);
        self.spawning.handle(
            &self.events[tick_start..],
            query::play_mode(&self.world),
            &candidates,
            enemy_count,
            &mut self.commands,
        );
        self.flush_commands();
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }
    }

    fn enemy_candidates(&self) -> Vec<UnitTypeId> {
        let catalog = query::catalog(&self.world);
        query::summonable_units(&self.world, Side::Enemy)
            .iter()
            .filter(|unit_type| {
                catalog
                    .units
                    .get(*unit_type)
                    .map_or(false, |def| def.enemy_available)
            })
            .cloned()
            .collect()
    }

    /// Copies the frame's world state into the scene a backend will draw.
    pub fn populate_scene(&self, scene: &mut Scene) {
        scene.units = query::unit_view(&self.world)
            .into_vec()
            .into_iter()
            .map(|unit| UnitPresentation {
                position: Vec2::new(unit.x, unit.y),
                color: attribute_color(unit.attribute),
                alpha: f32::from(unit.alpha) / 255.0,
                flash: f32::from(unit.flash) / 255.0,
                hp_ratio: ratio(unit.hp, unit.max_hp),
                buffed: unit.buffed,
            })
            .collect();

        scene.bases = [Side::Player, Side::Enemy]
            .into_iter()
            .map(|side| {
                let base = query::base(&self.world, side);
                BasePresentation {
                    position: Vec2::new(base.x, base.y),
                    name: base.name,
                    color: attribute_color(base.attribute),
                    hp_ratio: ratio(base.hp, base.max_hp),
                }
            })
            .collect();

        scene.floating_texts = query::floating_texts(&self.world)
            .into_iter()
            .map(|text| TextPresentation {
                position: Vec2::new(text.x, text.y),
                color: text_color(text.color).with_alpha(f32::from(text.alpha) / 255.0),
                text: text.text,
            })
            .collect();

        scene.mp = MpPresentation {
            current: query::mp(&self.world),
            maximum: query::max_mp(&self.world),
        };

        scene.window = match self.interface.view() {
            WindowView::Closed => None,
            WindowView::Summon(cards) => Some(window_presentation(
                "Summon",
                cards
                    .iter()
                    .map(|card| (card.name.clone(), card.cost, card.affordable, String::new()))
                    .collect(),
            )),
            WindowView::SpellSelect(cards) => Some(window_presentation(
                "Spells",
                cards
                    .iter()
                    .map(|card| {
                        (
                            card.name.clone(),
                            card.cost,
                            card.affordable,
                            card.description.clone(),
                        )
                    })
                    .collect(),
            )),
        };

        scene.targeting_spell = query::pending_spell(&self.world)
            .and_then(|spell| query::catalog(&self.world).spells.get(spell))
            .map(|def| def.name.clone());
        scene.outcome = query::outcome(&self.world);
    }

    /// Greeting printed when the binary starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Latched match outcome, if the match has been decided.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        query::outcome(&self.world)
    }

    /// Number of ticks the world clock has advanced.
    #[must_use]
    pub fn tick(&self) -> u64 {
        query::tick(&self.world)
    }

    /// MP currently available to the player.
    #[must_use]
    pub fn mp(&self) -> u32 {
        query::mp(&self.world)
    }

    /// Current play mode of the world.
    #[must_use]
    pub fn play_mode(&self) -> PlayMode {
        query::play_mode(&self.world)
    }

    /// Snapshot of the living units.
    #[must_use]
    pub fn units(&self) -> UnitView {
        query::unit_view(&self.world)
    }

    /// Whether a modal window is currently open.
    #[must_use]
    pub fn window_open(&self) -> bool {
        self.interface.is_open()
    }

    /// Events emitted during the most recent frame.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Builds the empty scene a backend starts from.
pub fn initial_scene() -> Result<Scene, RenderingError> {
    let battlefield =
        BattlefieldPresentation::new(BATTLEFIELD_WIDTH, BATTLEFIELD_HEIGHT, GROUND_COLOR)?;
    Ok(Scene::new(battlefield, scene_rect(layout::spells_button_rect())))
}

fn window_presentation(title: &str, cards: Vec<(String, u32, bool, String)>) -> WindowPresentation {
    let count = cards.len();
    WindowPresentation {
        rect: scene_rect(layout::window_rect()),
        title: title.to_owned(),
        close_rect: scene_rect(layout::close_button_rect()),
        cards: cards
            .into_iter()
            .enumerate()
            .map(|(index, (name, cost, affordable, description))| CardPresentation {
                rect: scene_rect(layout::card_rect(index, count)),
                name,
                cost,
                affordable,
                description,
            })
            .collect(),
    }
}

fn scene_rect(rect: Rect) -> SceneRect {
    SceneRect::new(
        Vec2::new(rect.x, rect.y),
        Vec2::new(rect.width, rect.height),
    )
}

fn ratio(current: u32, maximum: u32) -> f32 {
    if maximum == 0 {
        return 0.0;
    }
    (current as f32 / maximum as f32).clamp(0.0, 1.0)
}
