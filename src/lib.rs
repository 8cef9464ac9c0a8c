//! Simulation core of a two-node arcade duel.
//!
//! Each node runs its own full simulation and exchanges a narrow stream of
//! events with its peer (bullets crossing the screen edge, score credits),
//! so the two screens behave like one shared battlefield.  The core is
//! single-threaded and allocation-free per tick: bullets live in
//! fixed-capacity pools and every subsystem is paced by a polled timer.

pub mod collision;
pub mod display;
pub mod entities;
pub mod pools;
pub mod protocol;
pub mod scheduler;
pub mod session;
