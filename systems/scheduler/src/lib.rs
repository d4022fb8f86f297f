#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic tick-driven animation scheduler.
//!
//! The scheduler owns a set of keyed animations, each describing a total
//! integer change to apply to some value over a fixed number of ticks with an
//! easing curve. Every call to [`Scheduler::advance`] moves all animations
//! forward by one tick and emits the integer delta each animation contributes
//! during that tick. Deltas are computed by rounding the eased absolute
//! progress and diffing against the progress already applied, so the deltas of
//! a finished animation always sum to exactly the requested change regardless
//! of curve or duration.
//!
//! Keys are opaque to the scheduler; callers decide what a key addresses and
//! how to apply the emitted deltas.

/// Easing curve shaping how an animation's change is distributed over ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant rate of change.
    #[default]
    Linear,
    /// Cubic ease-in, slow start accelerating toward the end.
    EaseIn,
    /// Cubic ease-out, fast start decelerating toward the end.
    EaseOut,
    /// Cubic ease-in-out, slow at both ends.
    EaseInOut,
}

impl Easing {
    /// Evaluates the curve at normalized progress `t` in the range `0..=1`.
    #[must_use]
    fn evaluate(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let shifted = t - 1.0;
                shifted * shifted * shifted + 1.0
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let shifted = -2.0 * t + 2.0;
                    1.0 - shifted * shifted * shifted / 2.0
                }
            }
        }
    }
}

/// Delta emitted for one animation during one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step<K> {
    /// Key of the animation that produced this step.
    pub key: K,
    /// Signed change to apply to the keyed value this tick.
    pub delta: i64,
    /// Whether the animation finished on this tick and was removed.
    pub completed: bool,
}

#[derive(Clone, Debug)]
struct Animation<K> {
    key: K,
    change: i64,
    duration: u32,
    delay: u32,
    elapsed: u32,
    applied: i64,
    easing: Easing,
}

impl<K> Animation<K> {
    fn progress(&self) -> i64 {
        if self.elapsed >= self.duration {
            return self.change;
        }
        let t = f64::from(self.elapsed) / f64::from(self.duration);
        let eased = self.easing.evaluate(t) * self.change as f64;
        eased.round() as i64
    }
}

/// Collection of in-flight keyed animations advanced one tick at a time.
#[derive(Clone, Debug, Default)]
pub struct Scheduler<K> {
    animations: Vec<Animation<K>>,
}

impl<K: Clone + PartialEq> Scheduler<K> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            animations: Vec::new(),
        }
    }

    /// Registers an animation applying `change` over `duration` ticks.
    ///
    /// The animation idles for `delay` ticks before its first step. A zero
    /// duration completes on the animation's first active tick, emitting the
    /// entire change at once.
    pub fn schedule(&mut self, key: K, change: i64, duration: u32, delay: u32, easing: Easing) {
        self.animations.push(Animation {
            key,
            change,
            duration: duration.max(1),
            delay,
            elapsed: 0,
            applied: 0,
            easing,
        });
    }

    /// Removes every in-flight animation addressing `key` without emitting
    /// the remainder of its change.
    pub fn cancel(&mut self, key: &K) {
        self.animations.retain(|animation| animation.key != *key);
    }

    /// Advances all animations by one tick, appending emitted steps to `out`.
    ///
    /// Steps are emitted in scheduling order. Animations that finish are
    /// removed after their final step. Ticks in which an animation's rounded
    /// progress does not move produce no step for that animation.
    pub fn advance(&mut self, out: &mut Vec<Step<K>>) {
        for animation in &mut self.animations {
            if animation.delay > 0 {
                animation.delay -= 1;
                continue;
            }
            animation.elapsed += 1;
            let progress = animation.progress();
            let delta = progress - animation.applied;
            animation.applied = progress;
            let completed = animation.elapsed >= animation.duration;
            if delta != 0 || completed {
                out.push(Step {
                    key: animation.key.clone(),
                    delta,
                    completed,
                });
            }
        }
        self.animations
            .retain(|animation| animation.elapsed < animation.duration);
    }

    /// Reports whether no animations are in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.animations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Easing, Scheduler, Step};

    fn collect_deltas(scheduler: &mut Scheduler<&'static str>, ticks: u32) -> Vec<i64> {
        let mut deltas = Vec::new();
        let mut steps = Vec::new();
        for _ in 0..ticks {
            scheduler.advance(&mut steps);
            deltas.extend(steps.drain(..).map(|step| step.delta));
        }
        deltas
    }

    #[test]
    fn linear_deltas_sum_to_requested_change() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("value", 10, 4, 0, Easing::Linear);
        let deltas = collect_deltas(&mut scheduler, 4);
        assert_eq!(deltas.iter().sum::<i64>(), 10);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn ease_out_fade_covers_full_range_exactly() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("alpha", 255, 30, 0, Easing::EaseOut);
        let deltas = collect_deltas(&mut scheduler, 30);
        assert_eq!(deltas.iter().sum::<i64>(), 255);
        assert!(deltas.iter().all(|delta| *delta >= 0));
        // Ease-out front-loads the change.
        assert!(deltas.first().copied().unwrap_or(0) > deltas.last().copied().unwrap_or(i64::MAX));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn ease_in_back_loads_the_change() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("value", 100, 10, 0, Easing::EaseIn);
        let deltas = collect_deltas(&mut scheduler, 10);
        assert_eq!(deltas.iter().sum::<i64>(), 100);
        let first_half: i64 = deltas.iter().take(5).sum();
        let second_half: i64 = deltas.iter().skip(5).sum();
        assert!(second_half > first_half);
    }

    #[test]
    fn ease_in_out_is_symmetric_for_even_changes() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("value", 200, 20, 0, Easing::EaseInOut);
        let deltas = collect_deltas(&mut scheduler, 20);
        assert_eq!(deltas.iter().sum::<i64>(), 200);
    }

    #[test]
    fn negative_changes_emit_negative_deltas() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("alpha", -255, 10, 0, Easing::Linear);
        let deltas = collect_deltas(&mut scheduler, 10);
        assert_eq!(deltas.iter().sum::<i64>(), -255);
        assert!(deltas.iter().all(|delta| *delta <= 0));
    }

    #[test]
    fn delay_defers_the_first_step() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("flash", 255, 1, 3, Easing::Linear);
        let mut steps = Vec::new();
        for _ in 0..3 {
            scheduler.advance(&mut steps);
            assert!(steps.is_empty());
        }
        scheduler.advance(&mut steps);
        assert_eq!(
            steps,
            vec![Step {
                key: "flash",
                delta: 255,
                completed: true,
            }]
        );
        assert!(scheduler.is_idle());
    }

    #[test]
    fn completion_is_flagged_on_the_final_step() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("value", 6, 3, 0, Easing::Linear);
        let mut steps = Vec::new();
        scheduler.advance(&mut steps);
        assert!(steps.iter().all(|step| !step.completed));
        steps.clear();
        scheduler.advance(&mut steps);
        steps.clear();
        scheduler.advance(&mut steps);
        assert!(steps.iter().any(|step| step.completed));
    }

    #[test]
    fn cancel_discards_remaining_change() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("alpha", 100, 10, 0, Easing::Linear);
        let mut steps = Vec::new();
        scheduler.advance(&mut steps);
        scheduler.cancel(&"alpha");
        assert!(scheduler.is_idle());
        steps.clear();
        scheduler.advance(&mut steps);
        assert!(steps.is_empty());
    }

    #[test]
    fn independent_keys_advance_together() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("a", 10, 2, 0, Easing::Linear);
        scheduler.schedule("b", -4, 2, 0, Easing::Linear);
        let mut steps = Vec::new();
        scheduler.advance(&mut steps);
        let keys: Vec<&str> = steps.iter().map(|step| step.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
