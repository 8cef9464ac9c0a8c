//! Polled periodic timers.
//!
//! Every subsystem is paced by its own timer, all fed from one time source.
//! Timers are edge-triggered: `check` returns true at most once per elapsed
//! period and rearms from the instant it fired — a slow consumer never gets
//! queued fires, lost time is simply dropped.  Timers take the current
//! `Instant` as an argument instead of reading the clock themselves, so
//! tests can drive them with synthetic times.

use std::ops::Range;
use std::time::{Duration, Instant};

use rand::Rng;

pub const SHIP_TICK: Duration = Duration::from_millis(50);
pub const ENEMY_TICK: Duration = Duration::from_millis(250);
pub const BULLET_TICK: Duration = Duration::from_millis(20);
pub const DISPLAY_TICK: Duration = Duration::from_millis(1000);

/// Enemy spawn delay in milliseconds, re-rolled on every fire.
pub const SPAWN_DELAY_MS: Range<u64> = 25_000..40_000;

// ── Periodic timer ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub struct PeriodicTimer {
    period: Duration,
    last: Instant,
}

impl PeriodicTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        PeriodicTimer { period, last: now }
    }

    /// True once per elapsed period; safe to poll every loop iteration.
    pub fn check(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Rearm relative to `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

// ── Enemy spawn timer ─────────────────────────────────────────────────────────

/// A periodic timer whose period is re-randomized on every fire, so each
/// node sees the enemy appear on its own schedule.
#[derive(Clone, Copy, Debug)]
pub struct SpawnTimer {
    inner: PeriodicTimer,
}

impl SpawnTimer {
    pub fn new(now: Instant, rng: &mut impl Rng) -> Self {
        SpawnTimer { inner: PeriodicTimer::new(roll_delay(rng), now) }
    }

    pub fn check(&mut self, now: Instant, rng: &mut impl Rng) -> bool {
        if self.inner.check(now) {
            self.inner.set_period(roll_delay(rng));
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant, rng: &mut impl Rng) {
        self.inner.set_period(roll_delay(rng));
        self.inner.reset(now);
    }

    pub fn period(&self) -> Duration {
        self.inner.period()
    }
}

fn roll_delay(rng: &mut impl Rng) -> Duration {
    Duration::from_millis(rng.gen_range(SPAWN_DELAY_MS))
}

// ── The five game timers ──────────────────────────────────────────────────────

pub struct GameTimers {
    pub ship: PeriodicTimer,
    pub enemy_spawn: SpawnTimer,
    pub enemy: PeriodicTimer,
    pub bullet: PeriodicTimer,
    pub display: PeriodicTimer,
}

impl GameTimers {
    pub fn new(now: Instant, rng: &mut impl Rng) -> Self {
        GameTimers {
            ship: PeriodicTimer::new(SHIP_TICK, now),
            enemy_spawn: SpawnTimer::new(now, rng),
            enemy: PeriodicTimer::new(ENEMY_TICK, now),
            bullet: PeriodicTimer::new(BULLET_TICK, now),
            display: PeriodicTimer::new(DISPLAY_TICK, now),
        }
    }

    /// Rearm everything relative to `now`; called at session start.
    pub fn reset_all(&mut self, now: Instant, rng: &mut impl Rng) {
        self.ship.reset(now);
        self.enemy_spawn.reset(now, rng);
        self.enemy.reset(now);
        self.bullet.reset(now);
        self.display.reset(now);
    }
}
