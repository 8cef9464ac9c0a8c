//! Fixed-capacity bullet pools.
//!
//! A pool is an ordered array of reusable `Bullet` slots — no allocation
//! ever happens after construction.  Spawning is a linear scan for the first
//! slot whose existence flag is clear; a full pool silently drops the spawn,
//! which is the accepted degradation policy for the whole game.

use crate::entities::Bullet;

/// Simultaneous bullets the local player may have in flight.
pub const OWN_BULLET_CAP: usize = 5;
/// Simultaneous AI bullets; the burst cadence fires exactly this many.
pub const AI_BULLET_CAP: usize = 3;
/// Simultaneous bullets spawned from peer messages.
pub const PEER_BULLET_CAP: usize = 10;

pub type OwnPool = BulletPool<OWN_BULLET_CAP>;
pub type AiPool = BulletPool<AI_BULLET_CAP>;
pub type PeerPool = BulletPool<PEER_BULLET_CAP>;

#[derive(Clone, Copy, Debug)]
pub struct BulletPool<const N: usize> {
    slots: [Bullet; N],
}

impl<const N: usize> BulletPool<N> {
    pub fn new() -> Self {
        BulletPool { slots: [Bullet::dead(); N] }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Claim the first free slot for a new bullet.  Returns false (and does
    /// nothing) when every slot is live.
    pub fn spawn(&mut self, x: i32, y: i32, speed: i32) -> bool {
        for slot in self.slots.iter_mut() {
            if !slot.exists {
                *slot = Bullet::spawn(x, y, speed);
                return true;
            }
        }
        false
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|b| b.exists).count()
    }

    pub fn slots(&self) -> &[Bullet; N] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Bullet; N] {
        &mut self.slots
    }

    /// Iterate only the live bullets.
    pub fn live(&self) -> impl Iterator<Item = &Bullet> {
        self.slots.iter().filter(|b| b.exists)
    }

    pub fn clear_all(&mut self) {
        self.slots = [Bullet::dead(); N];
    }
}

impl<const N: usize> Default for BulletPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
