#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Witch Battle binary entry point.
//!
//! Resolves match settings from the command line or a shared match code,
//! loads and validates the catalog, then either opens the macroquad window
//! or steps the simulation headlessly for a fixed number of ticks.

use anyhow::{Context as _, Result};
use clap::Parser;
use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;
use std::{fs, path::PathBuf};
use witch_battle_cli::{
    catalog,
    match_code::MatchSettings,
    session::{initial_scene, Session},
};
use witch_battle_core::{Side, WitchId};
use witch_battle_rendering::{Color, Presentation, RenderingBackend as _};
use witch_battle_rendering_macroquad::{DisplayConfig, MacroquadBackend};
use witch_battle_system_interface::PointerState;

const WINDOW_TITLE: &str = "Witch Battle";
const CLEAR_COLOR: Color = Color::from_rgb_u8(0x12, 0x0e, 0x1a);

#[derive(Debug, Parser)]
#[command(name = "witch-battle", about = "Real-time witch battle simulation", version)]
struct Args {
    /// Path to a catalog JSON file overriding the bundled one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to a display configuration TOML file.
    #[arg(long)]
    display: Option<PathBuf>,

    /// Match code to restore settings from, as printed by --share.
    #[arg(long, conflicts_with_all = ["player", "enemy", "seed"])]
    match_code: Option<String>,

    /// Witch defending the player base.
    #[arg(long, default_value = "ember")]
    player: String,

    /// Witch defending the enemy base.
    #[arg(long, default_value = "frost")]
    enemy: String,

    /// Seed for the enemy spawn sequence; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Step the simulation without a window for up to this many ticks.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,

    /// Print the shareable match code for the resolved settings and exit.
    #[arg(long)]
    share: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => catalog::load(path)?,
        None => catalog::bundled()?,
    };
    let settings = resolve_settings(&args)?;

    if args.share {
        println!("{}", settings.encode());
        return Ok(());
    }

    let mut session = Session::new(catalog, &settings)?;
    println!("{}", session.welcome_banner());

    match args.headless {
        Some(ticks) => run_headless(&mut session, ticks),
        None => run_windowed(session, &args),
    }
}

fn resolve_settings(args: &Args) -> Result<MatchSettings> {
    if let Some(code) = &args.match_code {
        return MatchSettings::decode(code).context("invalid match code");
    }
    let seed = match args.seed {
        Some(seed) => seed,
        None => ChaCha8Rng::from_entropy().gen(),
    };
    Ok(MatchSettings {
        seed,
        player_witch: WitchId::new(args.player.as_str()),
        enemy_witch: WitchId::new(args.enemy.as_str()),
    })
}

fn run_headless(session: &mut Session, ticks: u64) -> Result<()> {
    for _ in 0..ticks {
        session.advance(PointerState::default());
        if session.outcome().is_some() {
            break;
        }
    }

    match session.outcome() {
        Some(outcome) => println!("match decided after {} ticks: {outcome:?}", session.tick()),
        None => println!("match undecided after {} ticks", session.tick()),
    }
    let units = session.units();
    println!(
        "player mp {}, player units {}, enemy units {}",
        session.mp(),
        units.count_side(Side::Player),
        units.count_side(Side::Enemy),
    );
    Ok(())
}

fn run_windowed(session: Session, args: &Args) -> Result<()> {
    let display = match &args.display {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| {
                format!("failed to read display configuration '{}'", path.display())
            })?;
            DisplayConfig::from_toml_str(&text)?
        }
        None => DisplayConfig::default(),
    };

    let scene = initial_scene()?;
    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);
    let backend = MacroquadBackend::new().with_display(display);

    let mut session = session;
    backend.run(presentation, move |pointer, scene| {
        let state = PointerState {
            x: pointer.position.x,
            y: pointer.position.y,
            primary_pressed: pointer.primary_pressed,
            secondary_pressed: pointer.secondary_pressed,
        };
        session.advance(state);
        session.populate_scene(scene);
    })
}
