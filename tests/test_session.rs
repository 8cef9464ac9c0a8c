use space_duel::entities::*;
use space_duel::pools::OWN_BULLET_CAP;
use space_duel::protocol::{
    loopback_pair, LoopbackTransport, NullTransport, PeerLink, PeerMessage,
};
use space_duel::session::*;

fn null_link() -> PeerLink<NullTransport> {
    PeerLink::new(NullTransport)
}

fn links() -> (PeerLink<LoopbackTransport>, PeerLink<LoopbackTransport>) {
    let (a, b) = loopback_pair();
    (PeerLink::new(a), PeerLink::new(b))
}

fn idle() -> InputSample {
    InputSample::centered()
}

fn firing() -> InputSample {
    InputSample { fire: true, ..InputSample::centered() }
}

// ── Ship steering ─────────────────────────────────────────────────────────────

#[test]
fn stick_past_deadzone_steers_the_ship() {
    let mut s = Session::new();
    let y0 = s.ship.y;

    let mut up = InputSample::centered();
    up.vert = AXIS_CENTER - AXIS_DEADZONE - 1;
    s.ship_tick(&up);
    assert_eq!(s.ship.y, y0 - SHIP_STEP);

    let mut down = InputSample::centered();
    down.vert = AXIS_CENTER + AXIS_DEADZONE + 1;
    s.ship_tick(&down);
    s.ship_tick(&down);
    assert_eq!(s.ship.y, y0 + SHIP_STEP);
}

#[test]
fn stick_inside_deadzone_is_neutral() {
    let mut s = Session::new();
    let y0 = s.ship.y;
    let mut wobble = InputSample::centered();
    wobble.vert = AXIS_CENTER + AXIS_DEADZONE;
    s.ship_tick(&wobble);
    wobble.vert = AXIS_CENTER - AXIS_DEADZONE;
    s.ship_tick(&wobble);
    assert_eq!(s.ship.y, y0);
}

// ── Firing and pool exhaustion ────────────────────────────────────────────────

#[test]
fn fire_spawns_a_bullet_from_the_muzzle() {
    let mut s = Session::new();
    let (mx, my) = s.ship.muzzle();
    s.bullet_tick(&firing(), &mut null_link());
    assert_eq!(s.own_bullets.live_count(), 1);
    let b = s.own_bullets.slots()[0];
    // The new bullet also moved this tick
    assert_eq!(b.x, mx + SHIP_BULLET_SPEED);
    assert_eq!(b.y, my);
}

#[test]
fn fire_with_full_pool_changes_nothing() {
    let mut s = Session::new();
    for _ in 0..OWN_BULLET_CAP {
        s.bullet_tick(&firing(), &mut null_link());
    }
    assert_eq!(s.own_bullets.live_count(), OWN_BULLET_CAP);

    let before = *s.own_bullets.slots();
    s.bullet_tick(&firing(), &mut null_link());
    assert_eq!(s.own_bullets.live_count(), OWN_BULLET_CAP);
    // Only the pre-existing bullets moved; no slot was stolen
    for (old, new) in before.iter().zip(s.own_bullets.slots()) {
        assert_eq!(new.y, old.y);
        assert_eq!(new.x, old.x + SHIP_BULLET_SPEED);
    }
}

#[test]
fn dead_slots_are_never_moved() {
    let mut s = Session::new();
    s.own_bullets.slots_mut()[0] = Bullet { x: 100, y: 50, speed: 10, exists: false };
    s.bullet_tick(&idle(), &mut null_link());
    assert_eq!(s.own_bullets.slots()[0].x, 100);
}

// ── Scenario: simple kill ─────────────────────────────────────────────────────

#[test]
fn own_bullet_kills_enemy_for_twenty_points() {
    let mut s = Session::new();
    s.spawn_enemy(); // enemy at (390, FIELD_TOP), box 40 px tall
    // Moves to x=400: inside the 370–410 band and the enemy box
    s.own_bullets.slots_mut()[0] = Bullet::spawn(390, FIELD_TOP + 20, SHIP_BULLET_SPEED);

    s.bullet_tick(&idle(), &mut null_link());

    assert!(!s.enemy.active);
    assert_eq!(s.score, 20);
    assert_eq!(s.own_bullets.live_count(), 0);
    assert!(s.explosion.is_some());
}

#[test]
fn kill_scores_only_once_per_bullet() {
    let mut s = Session::new();
    s.spawn_enemy();
    s.own_bullets.slots_mut()[0] = Bullet::spawn(390, FIELD_TOP + 20, SHIP_BULLET_SPEED);
    s.bullet_tick(&idle(), &mut null_link());
    s.bullet_tick(&idle(), &mut null_link());
    assert_eq!(s.score, 20);
}

#[test]
fn inactive_enemy_cannot_be_hit() {
    let mut s = Session::new();
    // Same trajectory as the kill scenario, but no spawn
    s.own_bullets.slots_mut()[0] = Bullet::spawn(390, FIELD_TOP + 20, SHIP_BULLET_SPEED);
    s.bullet_tick(&idle(), &mut null_link());
    assert_eq!(s.score, 0);
    assert_eq!(s.own_bullets.live_count(), 1);
}

#[test]
fn bullet_outside_band_skips_the_exact_test() {
    let mut s = Session::new();
    s.spawn_enemy();
    // Moves to x=420: inside the enemy box (390–430) but past the 370–410
    // band, so the pre-filter rules it out this tick
    s.own_bullets.slots_mut()[0] = Bullet::spawn(410, FIELD_TOP + 20, SHIP_BULLET_SPEED);
    s.bullet_tick(&idle(), &mut null_link());
    assert!(s.enemy.active);
    assert_eq!(s.score, 0);
}

// ── Scenario: escape and hand-off ─────────────────────────────────────────────

#[test]
fn bullet_crossing_far_boundary_is_handed_off() {
    let (mut link_a, mut link_b) = links();
    let mut s = Session::new();
    s.own_bullets.slots_mut()[0] = Bullet::spawn(471, 154, SHIP_BULLET_SPEED); // → 481

    s.bullet_tick(&idle(), &mut link_a);

    assert_eq!(s.own_bullets.live_count(), 0);
    assert_eq!(s.score, 0);
    assert_eq!(link_b.poll(), Some(PeerMessage::BulletCrossed(154)));
}

#[test]
fn protocol_round_trip_spawns_one_peer_bullet() {
    let (mut link_a, mut link_b) = links();
    let mut sender = Session::new();
    let mut receiver = Session::new();

    sender.own_bullets.slots_mut()[0] = Bullet::spawn(471, 154, SHIP_BULLET_SPEED);
    sender.bullet_tick(&idle(), &mut link_a);
    receiver.bullet_tick(&idle(), &mut link_b);

    assert_eq!(receiver.peer_bullets.live_count(), 1);
    let b = receiver.peer_bullets.slots()[0];
    assert_eq!(b.y, 154);
    // Entered at the far edge and took its first step toward us
    assert_eq!(b.x, PEER_ENTRY_X - SHIP_BULLET_SPEED);
}

#[test]
fn one_inbound_message_per_tick() {
    let (mut link_a, mut link_b) = links();
    let mut receiver = Session::new();

    link_a.send(PeerMessage::BulletCrossed(100));
    link_a.send(PeerMessage::BulletCrossed(200));

    receiver.bullet_tick(&idle(), &mut link_b);
    assert_eq!(receiver.peer_bullets.live_count(), 1);

    // The backlog drains on the next tick
    receiver.bullet_tick(&idle(), &mut link_b);
    assert_eq!(receiver.peer_bullets.live_count(), 2);
}

// ── Peer bullets on our screen ────────────────────────────────────────────────

#[test]
fn peer_bullet_kill_credits_the_remote_node() {
    let (mut link_a, mut link_b) = links();
    let mut victim = Session::new();
    let mut killer = Session::new();

    victim.spawn_enemy();
    // Moves to x=420: inside the 409–449 peer band and the enemy box
    victim.peer_bullets.slots_mut()[0] =
        Bullet::spawn(430, FIELD_TOP + 20, -SHIP_BULLET_SPEED);
    victim.bullet_tick(&idle(), &mut link_a);

    assert!(!victim.enemy.active);
    assert_eq!(victim.score, 0); // the killer gets the points, not us
    assert_eq!(victim.peer_bullets.live_count(), 0);

    killer.bullet_tick(&idle(), &mut link_b);
    assert_eq!(killer.score, 20);
}

#[test]
fn peer_bullet_hitting_ship_credits_the_remote_node() {
    let (mut link_a, mut link_b) = links();
    let mut victim = Session::new();
    let mut shooter = Session::new();

    // Ship box spans x 10–50; bullet moves to x=45
    victim.peer_bullets.slots_mut()[0] =
        Bullet::spawn(55, victim.ship.y + 10, -SHIP_BULLET_SPEED);
    victim.bullet_tick(&idle(), &mut link_a);

    assert_eq!(victim.peer_bullets.live_count(), 0);
    assert_eq!(victim.score, 0);

    shooter.bullet_tick(&idle(), &mut link_b);
    assert_eq!(shooter.score, 5);
}

#[test]
fn peer_bullet_leaving_near_edge_is_a_silent_miss() {
    let (mut link_a, mut link_b) = links();
    let mut s = Session::new();
    s.peer_bullets.slots_mut()[0] = Bullet::spawn(5, 300, -SHIP_BULLET_SPEED); // → -5
    s.bullet_tick(&idle(), &mut link_a);

    assert_eq!(s.peer_bullets.live_count(), 0);
    assert_eq!(s.score, 0);
    assert_eq!(link_b.poll(), None);
}

// ── AI bullets ────────────────────────────────────────────────────────────────

#[test]
fn ai_bullet_hitting_ship_debits_five_points() {
    let mut s = Session::new();
    // Moves to x=35, inside the ship box
    s.ai_bullets.slots_mut()[0] = Bullet::spawn(60, s.ship.y + 10, -ENEMY_BULLET_SPEED);
    s.bullet_tick(&idle(), &mut null_link());
    assert_eq!(s.score, -5);
    assert_eq!(s.ai_bullets.live_count(), 0);
}

#[test]
fn ai_bullet_leaving_near_edge_costs_nothing() {
    let mut s = Session::new();
    s.ai_bullets.slots_mut()[0] = Bullet::spawn(20, 300, -ENEMY_BULLET_SPEED); // → -5
    s.bullet_tick(&idle(), &mut null_link());
    assert_eq!(s.score, 0);
    assert_eq!(s.ai_bullets.live_count(), 0);
}

// ── Enemy state machine ───────────────────────────────────────────────────────

#[test]
fn burst_fires_on_ticks_16_17_18() {
    let mut s = Session::new();
    s.spawn_enemy();
    for _ in 0..15 {
        s.enemy_tick();
    }
    assert_eq!(s.ai_bullets.live_count(), 0);
    s.enemy_tick(); // 16th
    assert_eq!(s.ai_bullets.live_count(), 1);
    s.enemy_tick(); // 17th
    assert_eq!(s.ai_bullets.live_count(), 2);
    s.enemy_tick(); // 18th — third shot, counter wraps
    assert_eq!(s.ai_bullets.live_count(), 3);
    assert_eq!(s.enemy.burst_tick, 0);
}

#[test]
fn burst_bullets_start_at_the_muzzle() {
    let mut s = Session::new();
    s.spawn_enemy();
    for _ in 0..16 {
        s.enemy_tick();
    }
    let (mx, my) = s.enemy.muzzle();
    let b = s.ai_bullets.slots()[0];
    assert_eq!((b.x, b.y), (mx, my));
    assert_eq!(b.speed, -ENEMY_BULLET_SPEED);
}

#[test]
fn enemy_despawns_after_five_reversals() {
    let mut s = Session::new();
    s.spawn_enemy();
    // 12 enemy-ticks per leg of the patrol → the 5th reversal lands on
    // tick 60
    for _ in 0..59 {
        s.enemy_tick();
    }
    assert!(s.enemy.active);
    s.enemy_tick();
    assert!(!s.enemy.active);
    assert_eq!(s.enemy.cycles, 5);
    assert_eq!(s.score, 0); // natural despawn never scores
}

#[test]
fn inactive_enemy_does_not_tick() {
    let mut s = Session::new();
    s.enemy_tick();
    s.enemy_tick();
    assert_eq!(s.enemy.burst_tick, 0);
    assert_eq!(s.ai_bullets.live_count(), 0);
}

#[test]
fn respawn_restarts_the_patrol() {
    let mut s = Session::new();
    s.spawn_enemy();
    for _ in 0..60 {
        s.enemy_tick();
    }
    assert!(!s.enemy.active);
    s.spawn_enemy();
    assert!(s.enemy.active);
    assert_eq!(s.enemy.y, FIELD_TOP);
    assert_eq!(s.enemy.cycles, 0);
    assert_eq!(s.enemy.burst_tick, 0);
}

// ── Inbound score credits ─────────────────────────────────────────────────────

#[test]
fn inbound_credits_raise_the_local_score() {
    let (mut link_a, mut link_b) = links();
    let mut s = Session::new();

    link_a.send(PeerMessage::EnemyKillCredit);
    s.bullet_tick(&idle(), &mut link_b);
    assert_eq!(s.score, 20);

    link_a.send(PeerMessage::ShipHitCredit);
    s.bullet_tick(&idle(), &mut link_b);
    assert_eq!(s.score, 25);
}

// ── Match clock ───────────────────────────────────────────────────────────────

#[test]
fn match_ends_when_the_clock_runs_out() {
    let mut s = Session::new();
    for _ in 0..MATCH_SECS - 1 {
        s.timer_tick();
    }
    assert!(!s.over);
    s.timer_tick();
    assert!(s.over);
    assert_eq!(s.remaining_secs(), 0);
}

#[test]
fn explosion_marker_decays_on_ship_ticks() {
    let mut s = Session::new();
    s.spawn_enemy();
    s.own_bullets.slots_mut()[0] = Bullet::spawn(390, FIELD_TOP + 20, SHIP_BULLET_SPEED);
    s.bullet_tick(&idle(), &mut null_link());
    assert!(s.explosion.is_some());
    for _ in 0..10 {
        s.ship_tick(&idle());
    }
    assert!(s.explosion.is_none());
}
