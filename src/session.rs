//! Session state and the per-timer tick operations.
//!
//! One `Session` holds everything a single playthrough mutates: the ship,
//! the patrol enemy, the three bullet pools, the score and the termination
//! flag.  The control loop owns the timers and calls the matching tick
//! method whenever one fires; nothing here reads the clock or blocks.

use tracing::debug;

use crate::collision::{bullet_hits_enemy, bullet_hits_ship, in_band, OWN_BAND, PEER_BAND};
use crate::entities::{
    PatrolEnemy, Ship, ENEMY_BULLET_SPEED, ENEMY_MAX_CYCLES, FAR_BOUNDARY, PEER_ENTRY_X,
    SHIP_BULLET_SPEED, SHIP_STEP,
};
use crate::pools::{AiPool, OwnPool, PeerPool};
use crate::protocol::{PeerLink, PeerMessage, Transport};

// ── Input ─────────────────────────────────────────────────────────────────────

/// Joystick axis midpoint (0–1023 range).
pub const AXIS_CENTER: i32 = 512;
/// Deviation from center below which the stick reads as neutral.
pub const AXIS_DEADZONE: i32 = 64;

/// One tick's worth of sampled input: two axis positions and a debounced
/// fire button.  The frontend synthesizes these from held keys.
#[derive(Clone, Copy, Debug)]
pub struct InputSample {
    pub horiz: i32,
    pub vert: i32,
    pub fire: bool,
}

impl InputSample {
    /// Stick at rest, button up.
    pub fn centered() -> Self {
        InputSample { horiz: AXIS_CENTER, vert: AXIS_CENTER, fire: false }
    }
}

// ── Scoring and pacing ────────────────────────────────────────────────────────

/// Points for destroying the patrol enemy.
pub const ENEMY_KILL_POINTS: i32 = 20;
/// Points awarded to the peer for hitting our ship (and lost locally when
/// an AI bullet hits us).
pub const SHIP_HIT_POINTS: i32 = 5;

/// Enemy-tick values at which the burst fires, inclusive.  The counter
/// wraps to 0 after the last shot, restarting the window.
pub const BURST_FIRST_TICK: u32 = 16;
pub const BURST_LAST_TICK: u32 = 18;

/// Wall-clock length of one match, counted by the display timer.
pub const MATCH_SECS: u32 = 120;

const EXPLOSION_FRAMES: u32 = 6;

/// Short-lived destruction marker for the presentation layer.
#[derive(Clone, Copy, Debug)]
pub struct Explosion {
    pub x: i32,
    pub y: i32,
    pub frames: u32,
}

// ── Session ───────────────────────────────────────────────────────────────────

pub struct Session {
    pub ship: Ship,
    pub enemy: PatrolEnemy,
    pub own_bullets: OwnPool,
    pub peer_bullets: PeerPool,
    pub ai_bullets: AiPool,
    /// May go negative: AI hits debit faster than kills credit.
    pub score: i32,
    pub elapsed_secs: u32,
    pub over: bool,
    pub explosion: Option<Explosion>,
}

impl Session {
    /// Fresh playthrough: ship at its start row, enemy inactive, empty
    /// pools, score zero.
    pub fn new() -> Self {
        Session {
            ship: Ship::new(),
            enemy: PatrolEnemy::new(),
            own_bullets: OwnPool::new(),
            peer_bullets: PeerPool::new(),
            ai_bullets: AiPool::new(),
            score: 0,
            elapsed_secs: 0,
            over: false,
            explosion: None,
        }
    }

    // ── ship/background timer (50 ms) ────────────────────────────────────────

    /// Steer the ship from the vertical axis; decay the explosion marker.
    pub fn ship_tick(&mut self, input: &InputSample) {
        if input.vert < AXIS_CENTER - AXIS_DEADZONE {
            self.ship.steer(-SHIP_STEP);
        } else if input.vert > AXIS_CENTER + AXIS_DEADZONE {
            self.ship.steer(SHIP_STEP);
        }
        if let Some(explosion) = &mut self.explosion {
            explosion.frames -= 1;
            if explosion.frames == 0 {
                self.explosion = None;
            }
        }
    }

    // ── enemy-spawn timer (random 25–40 s) ───────────────────────────────────

    pub fn spawn_enemy(&mut self) {
        self.enemy.activate();
        debug!("enemy spawned");
    }

    // ── enemy timer (250 ms) ─────────────────────────────────────────────────

    /// One patrol step plus the burst-fire cadence: three AI bullets on the
    /// 16th, 17th and 18th tick of each window, then the counter wraps.
    pub fn enemy_tick(&mut self) {
        if !self.enemy.active {
            return;
        }
        self.enemy.patrol_step();
        self.enemy.burst_tick += 1;
        if (BURST_FIRST_TICK..=BURST_LAST_TICK).contains(&self.enemy.burst_tick) {
            let (mx, my) = self.enemy.muzzle();
            self.ai_bullets.spawn(mx, my, -ENEMY_BULLET_SPEED);
            if self.enemy.burst_tick == BURST_LAST_TICK {
                self.enemy.burst_tick = 0;
            }
        }
        if self.enemy.cycles >= ENEMY_MAX_CYCLES {
            self.enemy.deactivate();
            debug!("enemy despawned after full patrol");
        }
    }

    // ── bullet timer (20 ms) ─────────────────────────────────────────────────

    /// The dense tick: sample fire, drain one inbound peer message, then
    /// move and collision-check each pool in order (own, peer, AI).  Every
    /// bullet gets at most one outcome per tick.
    pub fn bullet_tick<T: Transport>(&mut self, input: &InputSample, link: &mut PeerLink<T>) {
        if input.fire {
            let (mx, my) = self.ship.muzzle();
            // Pool full → the shot is silently dropped.
            self.own_bullets.spawn(mx, my, SHIP_BULLET_SPEED);
        }

        match link.poll() {
            Some(PeerMessage::BulletCrossed(y)) => {
                self.peer_bullets.spawn(PEER_ENTRY_X, y as i32, -SHIP_BULLET_SPEED);
            }
            Some(PeerMessage::EnemyKillCredit) => self.score += ENEMY_KILL_POINTS,
            Some(PeerMessage::ShipHitCredit) => self.score += SHIP_HIT_POINTS,
            None => {}
        }

        self.move_own_bullets(link);
        self.move_peer_bullets(link);
        self.move_ai_bullets();
    }

    /// Own bullets fly toward the peer: kill the enemy inside the near
    /// band, or cross the far boundary and hand off.
    fn move_own_bullets<T: Transport>(&mut self, link: &mut PeerLink<T>) {
        for bullet in self.own_bullets.slots_mut() {
            if !bullet.exists {
                continue;
            }
            bullet.advance();
            if self.enemy.active
                && in_band(bullet.x, OWN_BAND)
                && bullet_hits_enemy(bullet, &self.enemy)
            {
                bullet.exists = false;
                self.explosion = Some(Explosion {
                    x: self.enemy.x,
                    y: self.enemy.y,
                    frames: EXPLOSION_FRAMES,
                });
                self.enemy.deactivate();
                self.score += ENEMY_KILL_POINTS;
                debug!(score = self.score, "enemy destroyed by own bullet");
            } else if bullet.x > FAR_BOUNDARY {
                debug!(y = bullet.y, "own bullet crossed to peer");
                link.send(PeerMessage::BulletCrossed(bullet.y as u16));
                bullet.exists = false;
            }
        }
    }

    /// Peer bullets fly toward us: they can kill our enemy (credit goes to
    /// the peer, not to us), hit our ship (also credits the peer), or fall
    /// off our near edge.
    fn move_peer_bullets<T: Transport>(&mut self, link: &mut PeerLink<T>) {
        for bullet in self.peer_bullets.slots_mut() {
            if !bullet.exists {
                continue;
            }
            bullet.advance();
            if self.enemy.active
                && in_band(bullet.x, PEER_BAND)
                && bullet_hits_enemy(bullet, &self.enemy)
            {
                bullet.exists = false;
                self.explosion = Some(Explosion {
                    x: self.enemy.x,
                    y: self.enemy.y,
                    frames: EXPLOSION_FRAMES,
                });
                self.enemy.deactivate();
                link.send(PeerMessage::EnemyKillCredit);
                debug!("enemy destroyed by peer bullet, credit sent");
            } else if bullet_hits_ship(bullet, &self.ship) {
                bullet.exists = false;
                link.send(PeerMessage::ShipHitCredit);
            } else if bullet.x < 0 {
                bullet.exists = false;
            }
        }
    }

    /// AI bullets fly toward us: hit the ship and debit the score, or fall
    /// off the near edge.
    fn move_ai_bullets(&mut self) {
        for bullet in self.ai_bullets.slots_mut() {
            if !bullet.exists {
                continue;
            }
            bullet.advance();
            if bullet_hits_ship(bullet, &self.ship) {
                bullet.exists = false;
                self.score -= SHIP_HIT_POINTS;
                debug!(score = self.score, "ship hit by AI bullet");
            } else if bullet.x < 0 {
                bullet.exists = false;
            }
        }
    }

    // ── display timer (1000 ms) ──────────────────────────────────────────────

    /// Count elapsed seconds; the match ends when the clock runs out.
    pub fn timer_tick(&mut self) {
        self.elapsed_secs += 1;
        if self.elapsed_secs >= MATCH_SECS {
            self.over = true;
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        MATCH_SECS.saturating_sub(self.elapsed_secs)
    }

    /// Total live bullets across all three pools, for the HUD.
    pub fn live_bullets(&self) -> usize {
        self.own_bullets.live_count() + self.peer_bullets.live_count() + self.ai_bullets.live_count()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
