//! Collision tests: cheap band pre-filters plus exact overlap checks.
//!
//! Exact tests compare the bullet center against the target's bounding
//! region.  Band pre-filters skip bullets whose x is nowhere near the enemy
//! column before paying for the exact test.

use crate::entities::{Bullet, PatrolEnemy, Ship, ENEMY_H, ENEMY_W, SHIP_H, SHIP_W};

/// x-band inside which an own bullet may be overlapping the enemy.
pub const OWN_BAND: (i32, i32) = (370, 410);
/// x-band for peer bullets, which approach the enemy from the far side.
pub const PEER_BAND: (i32, i32) = (409, 449);

pub fn in_band(x: i32, band: (i32, i32)) -> bool {
    x >= band.0 && x <= band.1
}

/// Bullet center inside the enemy bounding box.  Geometry only — callers
/// gate on `enemy.active`.
pub fn bullet_hits_enemy(bullet: &Bullet, enemy: &PatrolEnemy) -> bool {
    bullet.x >= enemy.x
        && bullet.x <= enemy.x + ENEMY_W
        && bullet.y >= enemy.y
        && bullet.y <= enemy.y + ENEMY_H
}

/// Bullet center inside the ship bounding box.
pub fn bullet_hits_ship(bullet: &Bullet, ship: &Ship) -> bool {
    bullet.x >= ship.x
        && bullet.x <= ship.x + SHIP_W
        && bullet.y >= ship.y
        && bullet.y <= ship.y + SHIP_H
}
