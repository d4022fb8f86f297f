#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interface system owning the modal window machine and click routing.
//!
//! The system consumes one pointer snapshot per frame and translates it into
//! commands following a single precedence order: an armed spell targeting
//! click resolves first, then an open modal window captures everything, then
//! battlefield hit regions (the player base opens the summon window, the
//! spells button opens the spell-select window). Opening a window pushes the
//! world into paused mode; closing it, by any path, resumes battle.
//!
//! Two debounce guards apply to every processed click: a global repeat guard
//! of [`CLICK_COOLDOWN_TICKS`] frames, and an open-grace window of
//! [`OPEN_GRACE_TICKS`] frames after a window opens during which clicks are
//! swallowed so the opening click cannot fall through onto a card.

use witch_battle_core::{
    Catalog, Command, Outcome, PlayMode, Side, SpellId, TargetKind, UnitId, UnitTypeId, UnitView,
};

/// Frames a processed click suppresses further clicks for.
pub const CLICK_COOLDOWN_TICKS: u32 = 5;
/// Frames after opening a window during which clicks are swallowed.
///
/// Longer than the repeat guard so a press held across the opening click
/// cannot fall through onto a card underneath the pointer.
pub const OPEN_GRACE_TICKS: u32 = 8;
/// Maximum number of candidate cards a window lays out.
pub const MAX_DISPLAYED_CARDS: usize = 4;

const TARGET_PICK_RADIUS: f32 = 16.0;

/// Axis-aligned hit region expressed in battlefield coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle from its top-left corner and extents.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Reports whether the provided point falls inside the rectangle.
    #[must_use]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Fixed hit-region layout shared by the click router and the renderer.
pub mod layout {
    use super::Rect;

    const BATTLEFIELD_WIDTH: f32 = 256.0;
    const BATTLEFIELD_HEIGHT: f32 = 192.0;
    const WINDOW_WIDTH: f32 = 200.0;
    const WINDOW_HEIGHT: f32 = 120.0;
    const CLOSE_SIZE: f32 = 12.0;
    const CARD_WIDTH: f32 = 40.0;
    const CARD_HEIGHT: f32 = 56.0;
    const CARD_MARGIN: f32 = 8.0;
    const BUTTON_WIDTH: f32 = 48.0;
    const BUTTON_HEIGHT: f32 = 16.0;

    /// Bounding rectangle of the centered modal window.
    #[must_use]
    pub const fn window_rect() -> Rect {
        Rect::new(
            (BATTLEFIELD_WIDTH - WINDOW_WIDTH) / 2.0,
            (BATTLEFIELD_HEIGHT - WINDOW_HEIGHT) / 2.0,
            WINDOW_WIDTH,
            WINDOW_HEIGHT,
        )
    }

    /// Close-button region in the window's top-right corner.
    #[must_use]
    pub const fn close_button_rect() -> Rect {
        let window = window_rect();
        Rect::new(
            window.x + window.width - CLOSE_SIZE - 4.0,
            window.y + 4.0,
            CLOSE_SIZE,
            CLOSE_SIZE,
        )
    }

    /// Rectangle of the card at `index` in a centered row of `count` cards.
    #[must_use]
    pub fn card_rect(index: usize, count: usize) -> Rect {
        let window = window_rect();
        let row_width = count as f32 * CARD_WIDTH + (count.saturating_sub(1)) as f32 * CARD_MARGIN;
        let start_x = window.x + (window.width - row_width) / 2.0;
        Rect::new(
            start_x + index as f32 * (CARD_WIDTH + CARD_MARGIN),
            window.y + (window.height - CARD_HEIGHT) / 2.0,
            CARD_WIDTH,
            CARD_HEIGHT,
        )
    }

    /// Hit region of the player base that opens the summon window.
    #[must_use]
    pub const fn base_rect() -> Rect {
        Rect::new(0.0, BATTLEFIELD_HEIGHT / 2.0 - 24.0, 24.0, 48.0)
    }

    /// Bottom-bar button that opens the spell-select window.
    #[must_use]
    pub const fn spells_button_rect() -> Rect {
        Rect::new(
            (BATTLEFIELD_WIDTH - BUTTON_WIDTH) / 2.0,
            BATTLEFIELD_HEIGHT - BUTTON_HEIGHT - 4.0,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        )
    }
}

/// Pointer snapshot distilled from adapter-provided frame input.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerState {
    /// Horizontal pointer position in battlefield coordinates.
    pub x: f32,
    /// Vertical pointer position in battlefield coordinates.
    pub y: f32,
    /// Whether the primary button was pressed this frame (edge).
    pub primary_pressed: bool,
    /// Whether the secondary button was pressed this frame (edge).
    pub secondary_pressed: bool,
}

/// Read-only world data the router needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    /// MP currently available to the player.
    pub mp: u32,
    /// Latched match outcome; input is ignored once set.
    pub outcome: Option<Outcome>,
    /// Target kind of the spell awaiting a target, if any.
    pub pending_target: Option<TargetKind>,
    /// Living units for targeting hit tests.
    pub units: &'a UnitView,
    /// Static catalog for card names and costs.
    pub catalog: &'a Catalog,
    /// Unit types the player's witch may summon.
    pub summonable: &'a [UnitTypeId],
    /// Spells the player's witch may cast.
    pub castable: &'a [SpellId],
}

/// Candidate card snapshotted into an open summon window.
#[derive(Clone, Debug, PartialEq)]
pub struct SummonCard {
    /// Catalog key of the unit type.
    pub unit_type: UnitTypeId,
    /// Display name from the catalog.
    pub name: String,
    /// MP cost from the catalog.
    pub cost: u32,
    /// Whether the pool covered the cost when the window opened.
    pub affordable: bool,
}

/// Candidate card snapshotted into an open spell-select window.
#[derive(Clone, Debug, PartialEq)]
pub struct SpellCard {
    /// Catalog key of the spell.
    pub spell: SpellId,
    /// Display name from the catalog.
    pub name: String,
    /// MP cost from the catalog.
    pub cost: u32,
    /// Whether the pool covered the cost when the window opened.
    pub affordable: bool,
    /// One-line description for the card tooltip.
    pub description: String,
}

/// Contents of the currently open modal window, if any.
#[derive(Clone, Debug, PartialEq)]
pub enum WindowView<'a> {
    /// No window is open.
    Closed,
    /// The summon window with its snapshotted candidates.
    Summon(&'a [SummonCard]),
    /// The spell-select window with its snapshotted candidates.
    SpellSelect(&'a [SpellCard]),
}

#[derive(Clone, Debug)]
enum WindowState {
    Closed,
    Summon {
        cards: Vec<SummonCard>,
        opened_frame: u64,
    },
    SpellSelect {
        cards: Vec<SpellCard>,
        opened_frame: u64,
    },
}

/// Interface system owning the window machine and the click debounce state.
#[derive(Debug)]
pub struct Interface {
    state: WindowState,
    click_cooldown: u32,
    frame: u64,
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

impl Interface {
    /// Creates a new interface system with the window closed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WindowState::Closed,
            click_cooldown: 0,
            frame: 0,
        }
    }

    /// Reports whether a modal window is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.state, WindowState::Closed)
    }

    /// Exposes the open window's snapshotted candidates for rendering.
    #[must_use]
    pub fn view(&self) -> WindowView<'_> {
        match &self.state {
            WindowState::Closed => WindowView::Closed,
            WindowState::Summon { cards, .. } => WindowView::Summon(cards),
            WindowState::SpellSelect { cards, .. } => WindowView::SpellSelect(cards),
        }
    }

    /// Routes one frame's pointer input, appending commands to `out`.
    ///
    /// Cooldown bookkeeping advances every frame, including while the match
    /// is paused behind a window. After an outcome is latched all input is
    /// ignored.
    pub fn handle(&mut self, input: PointerState, context: &Context<'_>, out: &mut Vec<Command>) {
        self.frame = self.frame.wrapping_add(1);
        if self.click_cooldown > 0 {
            self.click_cooldown -= 1;
        }

        if context.outcome.is_some() {
            return;
        }

        if context.pending_target.is_some() && input.secondary_pressed {
            out.push(Command::CancelSpell);
            self.close_window(out);
            return;
        }

        if !input.primary_pressed {
            return;
        }
        if self.click_cooldown > 0 {
            return;
        }
        self.click_cooldown = CLICK_COOLDOWN_TICKS;

        if let Some(kind) = context.pending_target {
            match nearest_target(context.units, kind, input.x, input.y) {
                Some(target) => out.push(Command::ResolveSpell { target }),
                None => out.push(Command::CancelSpell),
            }
            // Targeting always exits and closes any window left open.
            self.close_window(out);
            return;
        }

        match &self.state {
            WindowState::Closed => self.route_battlefield_click(input, context, out),
            WindowState::Summon { opened_frame, .. } | WindowState::SpellSelect { opened_frame, .. } => {
                if self.frame.saturating_sub(*opened_frame) < u64::from(OPEN_GRACE_TICKS) {
                    return;
                }
                self.route_window_click(input, out);
            }
        }
    }

    fn route_battlefield_click(
        &mut self,
        input: PointerState,
        context: &Context<'_>,
        out: &mut Vec<Command>,
    ) {
        if layout::base_rect().contains(input.x, input.y) {
            self.state = WindowState::Summon {
                cards: summon_cards(context),
                opened_frame: self.frame,
            };
            out.push(Command::SetPlayMode {
                mode: PlayMode::Paused,
            });
        } else if layout::spells_button_rect().contains(input.x, input.y) {
            self.state = WindowState::SpellSelect {
                cards: spell_cards(context),
                opened_frame: self.frame,
            };
            out.push(Command::SetPlayMode {
                mode: PlayMode::Paused,
            });
        }
    }

    fn route_window_click(&mut self, input: PointerState, out: &mut Vec<Command>) {
        let window = layout::window_rect();
        if layout::close_button_rect().contains(input.x, input.y) {
            self.close_window(out);
            return;
        }
        if !window.contains(input.x, input.y) {
            self.close_window(out);
            return;
        }
        let selected = match &self.state {
            WindowState::Closed => None,
            WindowState::Summon { cards, .. } => hit_card(cards.len(), input)
                .map(|index| &cards[index])
                .filter(|card| card.affordable)
                .map(|card| Command::SummonUnit {
                    side: Side::Player,
                    unit_type: card.unit_type.clone(),
                }),
            WindowState::SpellSelect { cards, .. } => hit_card(cards.len(), input)
                .map(|index| &cards[index])
                .filter(|card| card.affordable)
                .map(|card| Command::BeginSpell {
                    spell: card.spell.clone(),
                }),
        };
        if let Some(command) = selected {
            out.push(command);
            self.close_window(out);
        }
        // Any other click inside the window is consumed without effect.
    }

    fn close_window(&mut self, out: &mut Vec<Command>) {
        if matches!(self.state, WindowState::Closed) {
            return;
        }
        self.state = WindowState::Closed;
        out.push(Command::SetPlayMode {
            mode: PlayMode::Battle,
        });
    }
}

fn summon_cards(context: &Context<'_>) -> Vec<SummonCard> {
    context
        .summonable
        .iter()
        .filter_map(|unit_type| {
            context.catalog.units.get(unit_type).map(|def| SummonCard {
                unit_type: unit_type.clone(),
                name: def.name.clone(),
                cost: def.cost,
                affordable: context.mp >= def.cost,
            })
        })
        .take(MAX_DISPLAYED_CARDS)
        .collect()
}

fn spell_cards(context: &Context<'_>) -> Vec<SpellCard> {
    context
        .castable
        .iter()
        .filter_map(|spell| {
            context.catalog.spells.get(spell).map(|def| SpellCard {
                spell: spell.clone(),
                name: def.name.clone(),
                cost: def.cost,
                affordable: context.mp >= def.cost,
                description: def.description.clone(),
            })
        })
        .take(MAX_DISPLAYED_CARDS)
        .collect()
}

fn hit_card(count: usize, input: PointerState) -> Option<usize> {
    (0..count).find(|index| layout::card_rect(*index, count).contains(input.x, input.y))
}

fn nearest_target(units: &UnitView, kind: TargetKind, x: f32, y: f32) -> Option<UnitId> {
    units
        .iter()
        .filter(|unit| kind.permits(unit.side))
        .map(|unit| {
            let dx = unit.x - x;
            let dy = unit.y - y;
            (unit.id, dx * dx + dy * dy)
        })
        .filter(|(_, squared)| *squared <= TARGET_PICK_RADIUS * TARGET_PICK_RADIUS)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use witch_battle_core::{
        Attribute, SpellDef, SpellEffect, UnitDef, UnitSnapshot,
    };

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        let _ = catalog.units.insert(
            UnitTypeId::new("warrior"),
            UnitDef {
                name: "Warrior".to_owned(),
                cost: 10,
                hp: 30,
                attack: 5,
                defense: 0,
                speed: 1.0,
                attribute: Attribute::Fire,
                enemy_available: true,
            },
        );
        let _ = catalog.units.insert(
            UnitTypeId::new("golem"),
            UnitDef {
                name: "Golem".to_owned(),
                cost: 90,
                hp: 80,
                attack: 8,
                defense: 4,
                speed: 0.5,
                attribute: Attribute::Ice,
                enemy_available: true,
            },
        );
        let _ = catalog.spells.insert(
            SpellId::new("bolt"),
            SpellDef {
                name: "Bolt".to_owned(),
                cost: 15,
                effect: SpellEffect::Damage,
                value: 10,
                target: TargetKind::SingleEnemy,
                duration: 0,
                description: "Zap.".to_owned(),
            },
        );
        catalog
    }

    struct Fixture {
        catalog: Catalog,
        summonable: Vec<UnitTypeId>,
        castable: Vec<SpellId>,
        units: UnitView,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: catalog(),
                summonable: vec![UnitTypeId::new("warrior"), UnitTypeId::new("golem")],
                castable: vec![SpellId::new("bolt")],
                units: UnitView::from_snapshots(Vec::new()),
            }
        }

        fn context(&self) -> Context<'_> {
            Context {
                mp: 50,
                outcome: None,
                pending_target: None,
                units: &self.units,
                catalog: &self.catalog,
                summonable: &self.summonable,
                castable: &self.castable,
            }
        }
    }

    fn click(x: f32, y: f32) -> PointerState {
        PointerState {
            x,
            y,
            primary_pressed: true,
            secondary_pressed: false,
        }
    }

    fn idle_frames(interface: &mut Interface, context: &Context<'_>, frames: u32) {
        let mut out = Vec::new();
        for _ in 0..frames {
            interface.handle(PointerState::default(), context, &mut out);
        }
        assert!(out.is_empty());
    }

    fn center(rect: Rect) -> (f32, f32) {
        (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
    }

    fn open_summon(interface: &mut Interface, fixture: &Fixture) {
        let (x, y) = center(layout::base_rect());
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        assert_eq!(
            out,
            vec![Command::SetPlayMode {
                mode: PlayMode::Paused,
            }]
        );
        assert!(interface.is_open());
        // Drain the repeat guard and the open grace before interacting.
        idle_frames(interface, &fixture.context(), OPEN_GRACE_TICKS);
    }

    #[test]
    fn base_click_opens_summon_window_with_candidates() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        open_summon(&mut interface, &fixture);
        match interface.view() {
            WindowView::Summon(cards) => {
                assert_eq!(cards.len(), 2);
                assert!(cards[0].affordable, "warrior costs 10 of 50");
                assert!(!cards[1].affordable, "golem costs 90 of 50");
            }
            other => panic!("expected summon window, got {other:?}"),
        }
    }

    #[test]
    fn clicks_during_open_grace_are_swallowed() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        let (x, y) = center(layout::base_rect());
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        out.clear();
        // Step past the repeat guard but stay inside the grace window.
        let (card_x, card_y) = center(layout::card_rect(0, 2));
        for _ in 0..CLICK_COOLDOWN_TICKS {
            interface.handle(PointerState::default(), &fixture.context(), &mut out);
        }
        interface.handle(click(card_x, card_y), &fixture.context(), &mut out);
        assert!(out.is_empty(), "grace must swallow the click");
        assert!(interface.is_open());
    }

    #[test]
    fn card_click_summons_and_closes() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        open_summon(&mut interface, &fixture);
        let (x, y) = center(layout::card_rect(0, 2));
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        assert_eq!(
            out,
            vec![
                Command::SummonUnit {
                    side: Side::Player,
                    unit_type: UnitTypeId::new("warrior"),
                },
                Command::SetPlayMode {
                    mode: PlayMode::Battle,
                },
            ]
        );
        assert!(!interface.is_open());
    }

    #[test]
    fn unaffordable_card_click_is_consumed_without_commands() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        open_summon(&mut interface, &fixture);
        let (x, y) = center(layout::card_rect(1, 2));
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        assert!(out.is_empty());
        assert!(interface.is_open());
    }

    #[test]
    fn close_button_closes_and_resumes_battle() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        open_summon(&mut interface, &fixture);
        let (x, y) = center(layout::close_button_rect());
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        assert_eq!(
            out,
            vec![Command::SetPlayMode {
                mode: PlayMode::Battle,
            }]
        );
        assert!(!interface.is_open());
    }

    #[test]
    fn click_outside_the_window_closes_it() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        open_summon(&mut interface, &fixture);
        let mut out = Vec::new();
        interface.handle(click(2.0, 2.0), &fixture.context(), &mut out);
        assert_eq!(
            out,
            vec![Command::SetPlayMode {
                mode: PlayMode::Battle,
            }]
        );
        assert!(!interface.is_open());
    }

    #[test]
    fn dead_window_area_consumes_the_click() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        open_summon(&mut interface, &fixture);
        let window = layout::window_rect();
        let mut out = Vec::new();
        interface.handle(
            click(window.x + 2.0, window.y + window.height - 2.0),
            &fixture.context(),
            &mut out,
        );
        assert!(out.is_empty());
        assert!(interface.is_open());
    }

    #[test]
    fn rapid_clicks_respect_the_repeat_guard() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        let (x, y) = center(layout::base_rect());
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        assert_eq!(out.len(), 1);
        interface.handle(click(2.0, 2.0), &fixture.context(), &mut out);
        assert_eq!(out.len(), 1, "second click arrives inside the cooldown");
        assert!(interface.is_open());
    }

    #[test]
    fn spells_button_opens_spell_select() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        let (x, y) = center(layout::spells_button_rect());
        let mut out = Vec::new();
        interface.handle(click(x, y), &fixture.context(), &mut out);
        assert!(interface.is_open());
        idle_frames(&mut interface, &fixture.context(), OPEN_GRACE_TICKS);
        let (card_x, card_y) = center(layout::card_rect(0, 1));
        interface.handle(click(card_x, card_y), &fixture.context(), &mut out);
        assert!(out.contains(&Command::BeginSpell {
            spell: SpellId::new("bolt"),
        }));
        assert!(!interface.is_open());
    }

    fn enemy_snapshot(id: u32, x: f32, y: f32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            side: Side::Enemy,
            unit_type: UnitTypeId::new("warrior"),
            attribute: Attribute::Neutral,
            x,
            y,
            hp: 10,
            max_hp: 10,
            attack: 3,
            defense: 0,
            in_combat: false,
            at_base: false,
            ready_to_strike: false,
            buffed: false,
            alpha: 255,
            flash: 0,
        }
    }

    #[test]
    fn targeting_click_resolves_on_the_nearest_legal_unit() {
        let mut fixture = Fixture::new();
        fixture.units = UnitView::from_snapshots(vec![
            enemy_snapshot(1, 100.0, 96.0),
            enemy_snapshot(2, 140.0, 96.0),
        ]);
        let mut interface = Interface::new();
        let mut context = fixture.context();
        context.pending_target = Some(TargetKind::SingleEnemy);
        let mut out = Vec::new();
        interface.handle(click(104.0, 98.0), &context, &mut out);
        assert_eq!(
            out,
            vec![Command::ResolveSpell {
                target: UnitId::new(1),
            }]
        );
    }

    #[test]
    fn targeting_click_with_no_legal_hit_cancels() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        let mut context = fixture.context();
        context.pending_target = Some(TargetKind::SingleEnemy);
        let mut out = Vec::new();
        interface.handle(click(50.0, 50.0), &context, &mut out);
        assert_eq!(out, vec![Command::CancelSpell]);
    }

    #[test]
    fn secondary_click_cancels_targeting() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        let mut context = fixture.context();
        context.pending_target = Some(TargetKind::SingleEnemy);
        let mut out = Vec::new();
        interface.handle(
            PointerState {
                x: 0.0,
                y: 0.0,
                primary_pressed: false,
                secondary_pressed: true,
            },
            &context,
            &mut out,
        );
        assert_eq!(out, vec![Command::CancelSpell]);
    }

    #[test]
    fn latched_outcome_ignores_all_input() {
        let fixture = Fixture::new();
        let mut interface = Interface::new();
        let mut context = fixture.context();
        context.outcome = Some(Outcome::Victory);
        let (x, y) = center(layout::base_rect());
        let mut out = Vec::new();
        interface.handle(click(x, y), &context, &mut out);
        assert!(out.is_empty());
        assert!(!interface.is_open());
    }
}
