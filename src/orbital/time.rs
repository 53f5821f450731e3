//! Simulation clock: Julian Date time axis, discrete speed steps, throttled ticks

use bevy::prelude::*;

/// Days of simulated time per real second, slowest reverse to fastest forward.
pub const SPEED_TABLE: [f64; 14] = [
    -365.0,
    -30.0,
    -7.0,
    -1.0,
    -1.0 / 24.0,
    -1.0 / 1440.0,
    -1.0 / 86400.0,
    1.0 / 86400.0,
    1.0 / 1440.0,
    1.0 / 24.0,
    1.0,
    7.0,
    30.0,
    365.0,
];

/// Index of the one-second-per-second forward entry.
pub const REAL_TIME_FORWARD_INDEX: usize = 7;

/// 60 Hz update cap.
pub const DEFAULT_MIN_FRAME_INTERVAL_SECS: f64 = 1.0 / 60.0;

/// Vsync deltas jitter around the cap; without slack every other frame at
/// 60 Hz would be throttled.
const FRAME_JITTER_SECS: f64 = 0.001;

pub const DEFAULT_SINGLE_STEP_DAYS: f64 = 1.0;

/// Control input accepted by the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockCommand {
    StepFaster,
    StepSlower,
    JumpToNow,
    TogglePause,
    StepForward,
    StepBackward,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockState {
    #[default]
    Running,
    Paused,
}

/// Result of feeding one frame's wall-clock delta to the clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Time moved; bodies must be re-resolved.
    Advanced { delta_days: f64 },
    /// Below the frame-interval floor; the delta is carried to the next frame.
    Throttled,
    /// Explicitly paused; the delta is dropped.
    Paused,
    /// Non-finite or negative delta; nothing changed.
    Rejected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationClock {
    julian_date: f64,
    speed_index: usize,
    state: ClockState,
    /// Wall time since the last accepted tick
    pending_wall_secs: f64,
    min_frame_interval_secs: f64,
    single_step_days: f64,
}

impl SimulationClock {
    pub fn new(start_jd: f64) -> Self {
        Self {
            julian_date: start_jd,
            speed_index: REAL_TIME_FORWARD_INDEX,
            state: ClockState::Running,
            pending_wall_secs: 0.0,
            min_frame_interval_secs: DEFAULT_MIN_FRAME_INTERVAL_SECS,
            single_step_days: DEFAULT_SINGLE_STEP_DAYS,
        }
    }

    pub fn with_speed_index(mut self, index: usize) -> Self {
        self.speed_index = index.min(SPEED_TABLE.len() - 1);
        self
    }

    pub fn with_min_frame_interval(mut self, secs: f64) -> Self {
        if secs.is_finite() && secs >= 0.0 {
            self.min_frame_interval_secs = secs;
        }
        self
    }

    pub fn with_single_step_days(mut self, days: f64) -> Self {
        if days.is_finite() && days > 0.0 {
            self.single_step_days = days;
        }
        self
    }

    pub fn julian_date(&self) -> f64 {
        self.julian_date
    }

    pub fn speed_index(&self) -> usize {
        self.speed_index
    }

    /// Days per real second at the current speed step.
    pub fn multiplier(&self) -> f64 {
        SPEED_TABLE[self.speed_index]
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    /// Apply a control command. `now_jd` is only read by `JumpToNow`.
    /// Returns true when the simulated time moved.
    pub fn apply(&mut self, command: ClockCommand, now_jd: f64) -> bool {
        match command {
            ClockCommand::StepFaster => {
                self.speed_index = (self.speed_index + 1).min(SPEED_TABLE.len() - 1);
                false
            }
            ClockCommand::StepSlower => {
                self.speed_index = self.speed_index.saturating_sub(1);
                false
            }
            ClockCommand::JumpToNow => {
                if !now_jd.is_finite() {
                    warn!("Ignoring jump to non-finite wall-clock date {}", now_jd);
                    return false;
                }
                self.julian_date = now_jd;
                self.speed_index = REAL_TIME_FORWARD_INDEX;
                self.state = ClockState::Running;
                self.pending_wall_secs = 0.0;
                true
            }
            ClockCommand::TogglePause => {
                self.state = match self.state {
                    ClockState::Running => ClockState::Paused,
                    ClockState::Paused => ClockState::Running,
                };
                self.pending_wall_secs = 0.0;
                false
            }
            ClockCommand::StepForward => self.shift(self.single_step_days),
            ClockCommand::StepBackward => self.shift(-self.single_step_days),
        }
    }

    fn shift(&mut self, days: f64) -> bool {
        let next = self.julian_date + days;
        if !next.is_finite() {
            return false;
        }
        self.julian_date = next;
        true
    }

    /// Feed one frame's wall-clock delta (seconds).
    pub fn tick(&mut self, wall_delta_secs: f64) -> TickOutcome {
        if !wall_delta_secs.is_finite() || wall_delta_secs < 0.0 {
            warn!("Skipping tick with invalid wall-clock delta {}", wall_delta_secs);
            return TickOutcome::Rejected;
        }

        self.pending_wall_secs += wall_delta_secs;
        if self.pending_wall_secs + FRAME_JITTER_SECS < self.min_frame_interval_secs {
            return TickOutcome::Throttled;
        }

        let elapsed = std::mem::take(&mut self.pending_wall_secs);
        if self.is_paused() {
            return TickOutcome::Paused;
        }

        let delta_days = elapsed * self.multiplier();
        let next = self.julian_date + delta_days;
        if !delta_days.is_finite() || !next.is_finite() {
            warn!(
                "Skipping tick: non-finite time advance ({} days from {} s)",
                delta_days, elapsed
            );
            return TickOutcome::Rejected;
        }

        self.julian_date = next;
        TickOutcome::Advanced { delta_days }
    }
}

/// Human-readable label for a speed multiplier, e.g. "+1 day/s".
pub fn speed_label(days_per_second: f64) -> String {
    const UNITS: [(f64, &str); 7] = [
        (365.0, "yr"),
        (30.0, "mo"),
        (7.0, "wk"),
        (1.0, "day"),
        (1.0 / 24.0, "hr"),
        (1.0 / 1440.0, "min"),
        (1.0 / 86400.0, "s"),
    ];

    if days_per_second == 0.0 || !days_per_second.is_finite() {
        return "stopped".to_string();
    }
    let sign = if days_per_second < 0.0 { "-" } else { "+" };
    let magnitude = days_per_second.abs();
    let (unit_days, unit) = UNITS
        .iter()
        .copied()
        .find(|(unit_days, _)| magnitude >= unit_days * (1.0 - 1e-9))
        .unwrap_or(UNITS[UNITS.len() - 1]);
    let count = magnitude / unit_days;
    if (count - count.round()).abs() < 1e-6 {
        format!("{sign}{} {unit}/s", count.round())
    } else {
        format!("{sign}{count:.2} {unit}/s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: f64 = 2_460_000.5;

    #[test]
    fn test_clock_defaults_to_real_time_forward() {
        let clock = SimulationClock::new(START);
        assert_eq!(clock.speed_index(), REAL_TIME_FORWARD_INDEX);
        assert!((clock.multiplier() - 1.0 / 86400.0).abs() < 1e-15);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_speed_table_is_ordered() {
        for pair in SPEED_TABLE.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_step_faster_clamps_at_fastest() {
        let mut clock = SimulationClock::new(START).with_speed_index(SPEED_TABLE.len() - 1);
        for _ in 0..5 {
            clock.apply(ClockCommand::StepFaster, START);
        }
        assert_eq!(clock.speed_index(), SPEED_TABLE.len() - 1);
        assert_eq!(clock.multiplier(), 365.0);
    }

    #[test]
    fn test_step_slower_clamps_at_slowest() {
        let mut clock = SimulationClock::new(START);
        for _ in 0..(SPEED_TABLE.len() + 3) {
            clock.apply(ClockCommand::StepSlower, START);
        }
        assert_eq!(clock.speed_index(), 0);
        assert_eq!(clock.multiplier(), -365.0);
    }

    #[test]
    fn test_tick_below_floor_is_noop() {
        let mut clock = SimulationClock::new(START).with_speed_index(10);
        assert_eq!(clock.tick(0.005), TickOutcome::Throttled);
        assert_eq!(clock.julian_date(), START);
    }

    #[test]
    fn test_throttled_time_carries_over() {
        let mut clock = SimulationClock::new(START).with_speed_index(10); // 1 day/s
        assert_eq!(clock.tick(0.010), TickOutcome::Throttled);
        match clock.tick(0.010) {
            TickOutcome::Advanced { delta_days } => {
                assert!((delta_days - 0.020).abs() < 1e-12, "delta = {}", delta_days)
            }
            other => panic!("expected advance, got {:?}", other),
        }
        assert!((clock.julian_date() - (START + 0.020)).abs() < 1e-9);
    }

    #[test]
    fn test_tick_advances_by_multiplier() {
        let mut clock = SimulationClock::new(START).with_speed_index(13); // 365 days/s
        clock.tick(0.5);
        assert!((clock.julian_date() - (START + 182.5)).abs() < 1e-9);

        let mut reverse = SimulationClock::new(START).with_speed_index(3); // -1 day/s
        reverse.tick(0.25);
        assert!((reverse.julian_date() - (START - 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_deltas_rejected() {
        let mut clock = SimulationClock::new(START).with_speed_index(10);
        assert_eq!(clock.tick(f64::NAN), TickOutcome::Rejected);
        assert_eq!(clock.tick(f64::INFINITY), TickOutcome::Rejected);
        assert_eq!(clock.tick(-0.1), TickOutcome::Rejected);
        assert_eq!(clock.julian_date(), START);
    }

    #[test]
    fn test_paused_clock_does_not_advance() {
        let mut clock = SimulationClock::new(START).with_speed_index(12);
        clock.apply(ClockCommand::TogglePause, START);
        assert!(clock.is_paused());
        assert_eq!(clock.tick(1.0), TickOutcome::Paused);
        assert_eq!(clock.julian_date(), START);

        clock.apply(ClockCommand::TogglePause, START);
        assert!(matches!(clock.tick(1.0), TickOutcome::Advanced { .. }));
        assert!((clock.julian_date() - (START + 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_jump_to_now_resets_speed_and_pause() {
        let mut clock = SimulationClock::new(START).with_speed_index(0);
        clock.apply(ClockCommand::TogglePause, START);
        assert!(clock.apply(ClockCommand::JumpToNow, 2_461_000.0));
        assert_eq!(clock.julian_date(), 2_461_000.0);
        assert_eq!(clock.speed_index(), REAL_TIME_FORWARD_INDEX);
        assert!(!clock.is_paused());

        assert!(!clock.apply(ClockCommand::JumpToNow, f64::NAN));
        assert_eq!(clock.julian_date(), 2_461_000.0);
    }

    #[test]
    fn test_single_steps_move_by_configured_days() {
        let mut clock = SimulationClock::new(START).with_single_step_days(10.0);
        assert!(clock.apply(ClockCommand::StepForward, START));
        assert!(clock.apply(ClockCommand::StepForward, START));
        assert!(clock.apply(ClockCommand::StepBackward, START));
        assert!((clock.julian_date() - (START + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_speed_labels() {
        assert_eq!(speed_label(1.0), "+1 day/s");
        assert_eq!(speed_label(-1.0 / 24.0), "-1 hr/s");
        assert_eq!(speed_label(1.0 / 86400.0), "+1 s/s");
        assert_eq!(speed_label(365.0), "+1 yr/s");
        assert_eq!(speed_label(-30.0), "-1 mo/s");
        assert_eq!(speed_label(0.0), "stopped");
    }
}
