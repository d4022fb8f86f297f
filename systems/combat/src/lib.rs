#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits strike commands for units whose cooldown elapsed.
//!
//! Each battle tick the system inspects the unit view and, for every unit
//! ready to strike, targets the nearest living opposing unit by Euclidean
//! distance. A ready unit standing at the opposing base line with no living
//! opponents left strikes the base instead. The system never mutates state;
//! the world validates cooldowns and liveness again when executing the
//! commands.

use witch_battle_core::{Command, PlayMode, UnitSnapshot, UnitView};

/// Combat system that queues strike commands for ready units.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::Strike` and `Command::StrikeBase` entries for ready units.
    pub fn handle(&mut self, play_mode: PlayMode, units: &UnitView, out: &mut Vec<Command>) {
        if play_mode != PlayMode::Battle {
            return;
        }

        self.scratch.clear();

        for unit in units.iter() {
            if !unit.ready_to_strike {
                continue;
            }
            match nearest_opponent(units, unit) {
                Some(target) => self.scratch.push(Command::Strike {
                    attacker: unit.id,
                    target: target.id,
                }),
                None if unit.at_base => self.scratch.push(Command::StrikeBase {
                    attacker: unit.id,
                }),
                None => {}
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn nearest_opponent<'a>(units: &'a UnitView, attacker: &UnitSnapshot) -> Option<&'a UnitSnapshot> {
    units
        .iter()
        .filter(|unit| unit.side == attacker.side.opponent())
        .min_by(|a, b| {
            let da = squared_distance(attacker, a);
            let db = squared_distance(attacker, b);
            da.total_cmp(&db)
        })
}

fn squared_distance(a: &UnitSnapshot, b: &UnitSnapshot) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use witch_battle_core::{Attribute, Side, UnitId, UnitTypeId};

    fn snapshot(id: u32, side: Side, x: f32, ready: bool, at_base: bool) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            side,
            unit_type: UnitTypeId::new("warrior"),
            attribute: Attribute::Neutral,
            x,
            y: 96.0,
            hp: 10,
            max_hp: 10,
            attack: 3,
            defense: 0,
            in_combat: false,
            at_base,
            ready_to_strike: ready,
            buffed: false,
            alpha: 255,
            flash: 0,
        }
    }

    #[test]
    fn paused_mode_is_silent() {
        let mut system = Combat::new();
        let units = UnitView::from_snapshots(vec![
            snapshot(1, Side::Player, 50.0, true, false),
            snapshot(2, Side::Enemy, 55.0, true, false),
        ]);
        let mut out = Vec::new();

        system.handle(PlayMode::Paused, &units, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn ready_units_strike_the_nearest_opponent() {
        let mut system = Combat::new();
        let units = UnitView::from_snapshots(vec![
            snapshot(1, Side::Player, 50.0, true, false),
            snapshot(2, Side::Enemy, 60.0, false, false),
            snapshot(3, Side::Enemy, 200.0, false, false),
        ]);
        let mut out = Vec::new();

        system.handle(PlayMode::Battle, &units, &mut out);

        assert_eq!(
            out,
            vec![Command::Strike {
                attacker: UnitId::new(1),
                target: UnitId::new(2),
            }],
        );
    }

    #[test]
    fn units_on_cooldown_are_skipped() {
        let mut system = Combat::new();
        let units = UnitView::from_snapshots(vec![
            snapshot(1, Side::Player, 50.0, false, false),
            snapshot(2, Side::Enemy, 60.0, false, false),
        ]);
        let mut out = Vec::new();

        system.handle(PlayMode::Battle, &units, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn lone_unit_at_the_base_line_strikes_the_base() {
        let mut system = Combat::new();
        let units = UnitView::from_snapshots(vec![snapshot(7, Side::Player, 236.0, true, true)]);
        let mut out = Vec::new();

        system.handle(PlayMode::Battle, &units, &mut out);

        assert_eq!(
            out,
            vec![Command::StrikeBase {
                attacker: UnitId::new(7),
            }],
        );
    }

    #[test]
    fn opponents_take_priority_over_the_base() {
        let mut system = Combat::new();
        let units = UnitView::from_snapshots(vec![
            snapshot(1, Side::Player, 236.0, true, true),
            snapshot(2, Side::Enemy, 100.0, false, false),
        ]);
        let mut out = Vec::new();

        system.handle(PlayMode::Battle, &units, &mut out);

        assert_eq!(
            out,
            vec![Command::Strike {
                attacker: UnitId::new(1),
                target: UnitId::new(2),
            }],
        );
    }
}
