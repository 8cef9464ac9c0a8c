//! Peer link: the message set and the byte transport beneath it.
//!
//! A message is one 16-bit word sent as two bytes, high then low.  Most
//! words carry the y-coordinate of a bullet that just crossed to the peer's
//! screen; two reserved codes carry score credits instead.  The word 0 is
//! reserved as "no message" and is never transmitted — gameplay coordinates
//! are biased above the HUD strip (y ≥ 40), so 0 can never be a legal
//! payload.
//!
//! The link is fire-and-forget: no acknowledgment, no retry.  A lost
//! message silently desyncs the two simulations, which the design accepts.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;

/// Receiver adds 20 points: their bullet destroyed our patrol enemy.
pub const ENEMY_KILL_CODE: u16 = 60_000;
/// Receiver adds 5 points: their bullet hit our ship.
pub const SHIP_HIT_CODE: u16 = 50_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerMessage {
    /// An own bullet left the sender's screen at this y; spawn it on ours.
    BulletCrossed(u16),
    /// Credit us for killing the sender's enemy.
    EnemyKillCredit,
    /// Credit us for hitting the sender's ship.
    ShipHitCredit,
}

impl PeerMessage {
    pub fn to_word(self) -> u16 {
        match self {
            PeerMessage::BulletCrossed(y) => y,
            PeerMessage::EnemyKillCredit => ENEMY_KILL_CODE,
            PeerMessage::ShipHitCredit => SHIP_HIT_CODE,
        }
    }

    /// Interpret a received word.  0 is "no message"; the two credit codes
    /// are sentinels; anything else is a bullet y-coordinate.
    pub fn from_word(word: u16) -> Option<Self> {
        match word {
            0 => None,
            ENEMY_KILL_CODE => Some(PeerMessage::EnemyKillCredit),
            SHIP_HIT_CODE => Some(PeerMessage::ShipHitCredit),
            y => Some(PeerMessage::BulletCrossed(y)),
        }
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Byte-level link to the peer.  Assumed to deliver bytes in order; may
/// deliver nothing.  Send failures are swallowed, per the lossy-link model.
pub trait Transport {
    fn send(&mut self, byte: u8);
    fn recv(&mut self) -> Option<u8>;
    fn available(&mut self) -> usize;
}

// ── Peer link ─────────────────────────────────────────────────────────────────

/// Frames `PeerMessage`s onto a byte transport.
pub struct PeerLink<T: Transport> {
    transport: T,
}

impl<T: Transport> PeerLink<T> {
    pub fn new(transport: T) -> Self {
        PeerLink { transport }
    }

    pub fn send(&mut self, msg: PeerMessage) {
        let word = msg.to_word();
        debug!(word, ?msg, "peer send");
        let [hi, lo] = word.to_be_bytes();
        self.transport.send(hi);
        self.transport.send(lo);
    }

    /// Drain at most one message.  A word is consumed only once both of its
    /// bytes have arrived; a half-delivered word stays buffered in the
    /// transport until a later poll.
    pub fn poll(&mut self) -> Option<PeerMessage> {
        if self.transport.available() < 2 {
            return None;
        }
        let hi = self.transport.recv()?;
        let lo = self.transport.recv()?;
        let msg = PeerMessage::from_word(u16::from_be_bytes([hi, lo]));
        if let Some(m) = msg {
            debug!(?m, "peer recv");
        }
        msg
    }
}

// ── Transports ────────────────────────────────────────────────────────────────

/// Discards sends, never receives.  Practice mode and no-op collaborator.
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _byte: u8) {}

    fn recv(&mut self) -> Option<u8> {
        None
    }

    fn available(&mut self) -> usize {
        0
    }
}

/// One end of an in-memory byte link.  `loopback_pair` wires two of these
/// back to back; what one end sends the other receives.
pub struct LoopbackTransport {
    tx: Rc<RefCell<VecDeque<u8>>>,
    rx: Rc<RefCell<VecDeque<u8>>>,
}

pub fn loopback_pair() -> (LoopbackTransport, LoopbackTransport) {
    let a_to_b = Rc::new(RefCell::new(VecDeque::new()));
    let b_to_a = Rc::new(RefCell::new(VecDeque::new()));
    let a = LoopbackTransport { tx: Rc::clone(&a_to_b), rx: Rc::clone(&b_to_a) };
    let b = LoopbackTransport { tx: b_to_a, rx: a_to_b };
    (a, b)
}

impl Transport for LoopbackTransport {
    fn send(&mut self, byte: u8) {
        self.tx.borrow_mut().push_back(byte);
    }

    fn recv(&mut self) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn available(&mut self) -> usize {
        self.rx.borrow().len()
    }
}
