//! Game entity types and playfield geometry.
//!
//! Ship, PatrolEnemy and Bullet are three independent record types with
//! entity-specific transitions (steer, patrol step, advance).  They are not
//! substitutable for each other and share no trait.  All coordinates are
//! pixels on a 480×320 playfield whose top 40-pixel strip is reserved for
//! the HUD — gameplay y-coordinates therefore never reach 0, which the peer
//! protocol relies on (see `protocol`).

// ── Playfield ─────────────────────────────────────────────────────────────────

pub const SCREEN_W: i32 = 480;
pub const SCREEN_H: i32 = 320;

/// Top of the gameplay band; the strip above it is HUD.
pub const FIELD_TOP: i32 = 40;
pub const FIELD_BOTTOM: i32 = SCREEN_H;

/// An own bullet past this x has left our screen and belongs to the peer.
pub const FAR_BOUNDARY: i32 = SCREEN_W;

// ── Ship ──────────────────────────────────────────────────────────────────────

pub const SHIP_X: i32 = 10;
pub const SHIP_W: i32 = 40;
pub const SHIP_H: i32 = 30;
/// Vertical pixels moved per ship-tick of held input.
pub const SHIP_STEP: i32 = 5;
pub const SHIP_START_Y: i32 = 140;

/// The player ship.  One instance per session, fixed x column, steers
/// vertically only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ship {
    pub x: i32,
    pub y: i32,
}

impl Ship {
    pub fn new() -> Self {
        Ship { x: SHIP_X, y: SHIP_START_Y }
    }

    /// Move vertically by `dy`, clamped to the gameplay band.
    pub fn steer(&mut self, dy: i32) {
        self.y = (self.y + dy).clamp(FIELD_TOP, FIELD_BOTTOM - SHIP_H);
    }

    /// Where own bullets leave the ship.
    pub fn muzzle(&self) -> (i32, i32) {
        (self.x + SHIP_W, self.y + SHIP_H / 2 - 1)
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

// ── Patrol enemy ──────────────────────────────────────────────────────────────

pub const ENEMY_X: i32 = 390;
pub const ENEMY_W: i32 = 40;
pub const ENEMY_H: i32 = 40;
/// Vertical pixels moved per enemy-tick.
pub const ENEMY_SPEED: i32 = 20;
/// Direction reversals before the enemy despawns on its own.
pub const ENEMY_MAX_CYCLES: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The single recurring hostile.  Reused across spawns; `active` gates both
/// the patrol state machine and all collision checks against it.
#[derive(Clone, Copy, Debug)]
pub struct PatrolEnemy {
    pub x: i32,
    pub y: i32,
    pub speed: i32,
    pub direction: Direction,
    /// Direction reversals completed since activation.
    pub cycles: u32,
    /// Enemy-ticks since activation or since the last burst wrap.
    pub burst_tick: u32,
    pub active: bool,
}

impl PatrolEnemy {
    pub fn new() -> Self {
        PatrolEnemy {
            x: ENEMY_X,
            y: FIELD_TOP,
            speed: ENEMY_SPEED,
            direction: Direction::Down,
            cycles: 0,
            burst_tick: 0,
            active: false,
        }
    }

    /// Reset to the spawn point and go live.
    pub fn activate(&mut self) {
        self.x = ENEMY_X;
        self.y = FIELD_TOP;
        self.direction = Direction::Down;
        self.cycles = 0;
        self.burst_tick = 0;
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// One patrol movement: step in the current direction, flip at the band
    /// edges.  Each flip counts one cycle.
    pub fn patrol_step(&mut self) {
        match self.direction {
            Direction::Up => {
                self.y -= self.speed;
                if self.y <= FIELD_TOP {
                    self.y = FIELD_TOP;
                    self.direction = Direction::Down;
                    self.cycles += 1;
                }
            }
            Direction::Down => {
                self.y += self.speed;
                if self.y >= FIELD_BOTTOM - ENEMY_H {
                    self.y = FIELD_BOTTOM - ENEMY_H;
                    self.direction = Direction::Up;
                    self.cycles += 1;
                }
            }
        }
    }

    /// Where AI bullets leave the enemy.
    pub fn muzzle(&self) -> (i32, i32) {
        (self.x - 2, self.y + 17)
    }
}

impl Default for PatrolEnemy {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bullets ───────────────────────────────────────────────────────────────────

/// Own and peer bullet speed, pixels per bullet-tick.
pub const SHIP_BULLET_SPEED: i32 = 10;
/// AI bullet speed, pixels per bullet-tick.
pub const ENEMY_BULLET_SPEED: i32 = 25;
/// Where peer-spawned bullets enter our screen.
pub const PEER_ENTRY_X: i32 = SCREEN_W;

/// One reusable bullet slot.  `exists` is the sole source of truth for
/// whether the slot participates in movement, drawing or collision; a dead
/// slot keeps whatever stale coordinates it last had.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bullet {
    pub x: i32,
    pub y: i32,
    /// Signed travel speed: positive moves toward the peer, negative toward
    /// our own edge.
    pub speed: i32,
    pub exists: bool,
}

impl Bullet {
    /// An empty slot.
    pub const fn dead() -> Self {
        Bullet { x: 0, y: 0, speed: 0, exists: false }
    }

    pub fn spawn(x: i32, y: i32, speed: i32) -> Self {
        Bullet { x, y, speed, exists: true }
    }

    /// One bullet-tick of horizontal travel.
    pub fn advance(&mut self) {
        self.x += self.speed;
    }
}
