//! End-to-end frame-loop tests driving a full match through pointer input.

use witch_battle_cli::{catalog, match_code::MatchSettings, session::Session};
use witch_battle_core::{Event, Outcome, PlayMode, Side, WitchId};
use witch_battle_system_interface::{layout, PointerState, Rect, CLICK_COOLDOWN_TICKS};
use witch_battle_world::INITIAL_MP;

fn new_session(seed: u64) -> Session {
    let catalog = catalog::bundled().expect("bundled catalog");
    let settings = MatchSettings {
        seed,
        player_witch: WitchId::new("ember"),
        enemy_witch: WitchId::new("frost"),
    };
    Session::new(catalog, &settings).expect("session")
}

fn click(x: f32, y: f32) -> PointerState {
    PointerState {
        x,
        y,
        primary_pressed: true,
        secondary_pressed: false,
    }
}

fn click_frame(session: &mut Session, point: (f32, f32)) {
    session.advance(click(point.0, point.1));
}

fn idle(session: &mut Session, frames: u32) {
    for _ in 0..frames {
        session.advance(PointerState::default());
    }
}

fn center(rect: Rect) -> (f32, f32) {
    (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

/// Opens the summon window and drains the click guards.
fn open_summon_window(session: &mut Session) {
    click_frame(session, center(layout::base_rect()));
    assert!(session.window_open(), "base click must open the window");
    assert_eq!(session.play_mode(), PlayMode::Paused);
    idle(session, 8);
}

/// Opens the spell-select window and drains the click guards.
fn open_spells_window(session: &mut Session) {
    click_frame(session, center(layout::spells_button_rect()));
    assert!(session.window_open(), "spells click must open the window");
    assert_eq!(session.play_mode(), PlayMode::Paused);
    idle(session, 8);
}

#[test]
fn unaffordable_summon_never_reaches_the_world() {
    let mut session = new_session(7);
    open_summon_window(&mut session);

    // Ember's fourth card is the stone golem, costing more than the pool holds.
    click_frame(&mut session, center(layout::card_rect(3, 4)));

    assert!(session.window_open(), "the click is consumed, not acted on");
    assert_eq!(session.mp(), INITIAL_MP);
    assert_eq!(session.units().count_side(Side::Player), 0);
}

#[test]
fn summoning_debits_the_exact_cost_and_fields_a_full_hp_unit() {
    let mut session = new_session(7);
    open_summon_window(&mut session);

    // First card is the red warrior at 10 MP.
    click_frame(&mut session, center(layout::card_rect(0, 4)));

    assert!(!session.window_open());
    assert!(session
        .events()
        .iter()
        .any(|event| matches!(event, Event::UnitSummoned { .. })));
    // The frame's battle tick ran after the summon, regenerating one MP.
    assert_eq!(session.mp(), INITIAL_MP - 10 + 1);

    let units = session.units();
    assert_eq!(units.count_side(Side::Player), 1);
    let unit = units.iter().next().expect("summoned unit");
    assert_eq!(unit.hp, unit.max_hp);
}

#[test]
fn an_open_window_freezes_the_battle() {
    let mut session = new_session(7);
    idle(&mut session, 10);
    assert_eq!(session.mp(), INITIAL_MP + 10);

    open_summon_window(&mut session);
    idle(&mut session, 20);
    assert_eq!(
        session.mp(),
        INITIAL_MP + 10,
        "the pool is frozen behind the window"
    );
    assert_eq!(session.play_mode(), PlayMode::Paused);
    assert_eq!(session.tick(), 39, "the clock keeps counting while paused");

    // A click outside the panel closes it and resumes the battle.
    click_frame(&mut session, (2.0, 2.0));
    assert!(!session.window_open());
    assert_eq!(session.play_mode(), PlayMode::Battle);
    assert_eq!(session.mp(), INITIAL_MP + 11);
}

#[test]
fn a_summoned_walker_fights_the_directors_walkers() {
    let mut session = new_session(3);
    open_summon_window(&mut session);
    click_frame(&mut session, center(layout::card_rect(0, 4)));

    let mut struck = false;
    let mut defeated = false;
    for _ in 0..1000 {
        session.advance(PointerState::default());
        for event in session.events() {
            match event {
                Event::UnitStruck { damage, .. } => {
                    assert!(*damage > 0);
                    struck = true;
                }
                Event::UnitDefeated { .. } => defeated = true,
                _ => {}
            }
        }
        if struck && defeated {
            break;
        }
    }
    assert!(struck, "no blow was ever exchanged");
    assert!(defeated, "no unit fell in a thousand ticks");
}

#[test]
fn targeted_damage_spell_is_mitigated_by_half_defense() {
    let mut session = new_session(11);

    let mut spawned = false;
    for _ in 0..200 {
        session.advance(PointerState::default());
        if session.units().count_side(Side::Enemy) > 0 {
            spawned = true;
            break;
        }
    }
    assert!(spawned, "the director fielded no walker in 200 ticks");

    open_spells_window(&mut session);
    // First spell card is the firebolt at 15 MP, value 10.
    click_frame(&mut session, center(layout::card_rect(0, 4)));
    assert!(!session.window_open(), "selecting a spell arms targeting");
    idle(&mut session, CLICK_COOLDOWN_TICKS);

    let target = session
        .units()
        .iter()
        .find(|unit| unit.side == Side::Enemy)
        .expect("enemy walker")
        .clone();
    click_frame(&mut session, (target.x, target.y));

    assert!(session.events().iter().any(|event| matches!(
        event,
        Event::SpellResolved { target: Some(id), .. } if *id == target.id
    )));
    let expected = 10u32.saturating_sub(target.defense / 2).max(1);
    let remaining = session
        .units()
        .get(target.id)
        .map_or(0, |snapshot| snapshot.hp);
    assert_eq!(remaining, target.hp - expected);
}

#[test]
fn unopposed_walkers_raze_the_base_and_the_outcome_latches() {
    let mut session = new_session(5);

    let mut decided = None;
    for _ in 0..20_000 {
        session.advance(PointerState::default());
        if let Some(outcome) = session.outcome() {
            decided = Some(outcome);
            break;
        }
    }
    assert_eq!(decided, Some(Outcome::Defeat));

    let frozen_tick = session.tick();
    let frozen_mp = session.mp();
    idle(&mut session, 50);
    assert_eq!(session.tick(), frozen_tick, "the clock froze with the outcome");
    assert_eq!(session.mp(), frozen_mp);
    assert!(
        session.events().is_empty(),
        "no further events after the latch"
    );
}

#[test]
fn identical_seeds_replay_identically() {
    let mut first = new_session(99);
    let mut second = new_session(99);
    for _ in 0..500 {
        first.advance(PointerState::default());
        second.advance(PointerState::default());
    }
    assert_eq!(first.tick(), second.tick());
    assert_eq!(first.mp(), second.mp());
    assert_eq!(first.units().into_vec(), second.units().into_vec());
}
