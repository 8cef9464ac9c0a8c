use std::collections::{HashMap, VecDeque};
use std::io::{stdout, BufWriter, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::{thread_rng, Rng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use space_duel::display;
use space_duel::protocol::{NullTransport, PeerLink, Transport};
use space_duel::scheduler::GameTimers;
use space_duel::session::{InputSample, Session, AXIS_CENTER};

/// TCP port the host end listens on.
const PEER_PORT: u16 = 7777;

/// A key counts as "held" if its last press/repeat arrived within this
/// window.  Covers terminals that never emit key-release events: OS
/// key-repeat is faster than this, so a held key keeps refreshing itself.
const HOLD_WINDOW: Duration = Duration::from_millis(150);

/// Synthetic axis deflection for a held direction key — comfortably past
/// the dead zone.
const AXIS_PUSH: i32 = 200;

/// Minimum sleep per control-loop iteration; all timers tolerate the stall.
const LOOP_SLEEP: Duration = Duration::from_millis(2);

// ── High-score persistence ────────────────────────────────────────────────────

/// Two fixed byte addresses: [0] high byte, [1] low byte of the best score.

fn score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".space_duel_score")
}

fn load_high_score() -> u16 {
    match std::fs::read(score_path()) {
        Ok(bytes) if bytes.len() >= 2 => (u16::from(bytes[0]) << 8) | u16::from(bytes[1]),
        _ => 0,
    }
}

fn save_high_score(score: u16) {
    let _ = std::fs::write(score_path(), [(score >> 8) as u8, score as u8]);
    info!(score, "high score written");
}

// ── TCP transport ─────────────────────────────────────────────────────────────

/// Non-blocking byte stream to the peer node.  Reads are pumped into a
/// local inbox so `available` can be answered without consuming; writes
/// that fail are dropped, matching the lossy-link model.
struct TcpTransport {
    stream: TcpStream,
    inbox: VecDeque<u8>,
}

impl TcpTransport {
    fn new(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;
        Ok(TcpTransport { stream, inbox: VecDeque::new() })
    }

    fn pump(&mut self) {
        let mut buf = [0u8; 64];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => break, // peer closed; inbox backlog still drains
                Ok(n) => self.inbox.extend(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, byte: u8) {
        let _ = self.stream.write_all(&[byte]);
    }

    fn recv(&mut self) -> Option<u8> {
        self.pump();
        self.inbox.pop_front()
    }

    fn available(&mut self) -> usize {
        self.pump();
        self.inbox.len()
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum LinkChoice {
    Practice,
    Host,
    Join,
}

enum MenuResult {
    Start(LinkChoice),
    Quit,
}

fn peer_addr() -> String {
    std::env::var("SPACE_DUEL_PEER").unwrap_or_else(|_| format!("127.0.0.1:{PEER_PORT}"))
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u16,
    notice: Option<&str>,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  SPACE  DUEL  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(cx.saturating_sub(hs.len() as u16 / 2), cy.saturating_sub(5)))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs))?;
    }

    let options: &[(&str, &str, Color, String)] = &[
        ("1", "Practice", Color::Green, "No peer — just you and the patrol".to_string()),
        ("2", "Host    ", Color::Yellow, format!("Wait for the other ship on port {PEER_PORT}")),
        ("3", "Join    ", Color::Red, format!("Connect to {}", peer_addr())),
    ];
    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(2) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<10}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("W/S or ↑/↓ : Steer   SPACE : Fire   Q : Quit"))?;

    if let Some(msg) = notice {
        out.queue(cursor::MoveTo(cx.saturating_sub(msg.len() as u16 / 2), cy + 5))?;
        out.queue(style::SetForegroundColor(Color::Red))?;
        out.queue(Print(msg))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(LinkChoice::Practice)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(LinkChoice::Host)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(LinkChoice::Join)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

fn draw_wait_screen<W: Write>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    out.queue(cursor::MoveTo(
        (width / 2).saturating_sub(text.len() as u16 / 2),
        height / 2,
    ))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(text))?;
    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

fn connect_peer(host: bool) -> std::io::Result<TcpTransport> {
    if host {
        let listener = TcpListener::bind(("0.0.0.0", PEER_PORT))?;
        let (stream, addr) = listener.accept()?;
        info!(%addr, "peer connected");
        TcpTransport::new(stream)
    } else {
        let stream = TcpStream::connect(peer_addr())?;
        info!(addr = %peer_addr(), "connected to host");
        TcpTransport::new(stream)
    }
}

// ── Input sampling ────────────────────────────────────────────────────────────

fn is_held(held: &HashMap<KeyCode, Instant>, key: KeyCode, now: Instant) -> bool {
    held.get(&key)
        .map(|&last| now.duration_since(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Translate held keys into the joystick sample the core expects.
fn sample_input(held: &HashMap<KeyCode, Instant>, now: Instant) -> InputSample {
    let up = is_held(held, KeyCode::Up, now)
        || is_held(held, KeyCode::Char('w'), now)
        || is_held(held, KeyCode::Char('W'), now);
    let down = is_held(held, KeyCode::Down, now)
        || is_held(held, KeyCode::Char('s'), now)
        || is_held(held, KeyCode::Char('S'), now);

    let mut sample = InputSample::centered();
    if up {
        sample.vert = AXIS_CENTER - AXIS_PUSH;
    } else if down {
        sample.vert = AXIS_CENTER + AXIS_PUSH;
    }
    sample.fire = is_held(held, KeyCode::Char(' '), now);
    sample
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Poll all five timers every iteration and run whatever is due.
/// Returns `true` → quit program, `false` → the match clock ran out.
fn game_loop<W: Write, T: Transport>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut Session,
    timers: &mut GameTimers,
    link: &mut PeerLink<T>,
    rng: &mut impl Rng,
    high_score: u16,
) -> std::io::Result<bool> {
    let mut held: HashMap<KeyCode, Instant> = HashMap::new();

    loop {
        let now = Instant::now();

        // Drain all pending input events (non-blocking)
        while let Ok(ev) = rx.try_recv() {
            if let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev {
                match kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(true);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(true);
                            }
                            _ => {}
                        }
                        held.insert(code, now);
                    }
                    KeyEventKind::Release => {
                        held.remove(&code);
                    }
                }
            }
        }

        let input = sample_input(&held, now);

        if timers.ship.check(now) {
            session.ship_tick(&input);
            display::render(out, session, high_score)?;
        }
        if timers.enemy_spawn.check(now, rng) {
            session.spawn_enemy();
        }
        if timers.enemy.check(now) {
            session.enemy_tick();
        }
        if timers.bullet.check(now) {
            session.bullet_tick(&input, link);
        }
        if timers.display.check(now) {
            session.timer_tick();
        }

        if session.over {
            return Ok(false);
        }

        thread::sleep(LOOP_SLEEP);
    }
}

/// One link's worth of matches: play, show game over, offer a rematch on
/// the same link.  Returns `true` → quit program, `false` → back to menu.
fn play<W: Write, T: Transport>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: &mut u16,
    mut link: PeerLink<T>,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();
    let mut timers = GameTimers::new(Instant::now(), &mut rng);

    loop {
        let mut session = Session::new();
        timers.reset_all(Instant::now(), &mut rng);

        let quit = game_loop(out, rx, &mut session, &mut timers, &mut link, &mut rng, *high_score)?;

        let prev = *high_score;
        if session.score > i32::from(prev) {
            *high_score = session.score.min(i32::from(u16::MAX)) as u16;
            save_high_score(*high_score);
        }
        if quit {
            return Ok(true);
        }

        display::draw_game_over(out, &session, prev)?;
        loop {
            match rx.recv() {
                Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => match code {
                    KeyCode::Char('r') | KeyCode::Char('R') => break, // rematch
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
                    _ => return Ok(false),
                },
                Ok(_) => {}
                Err(_) => return Ok(true),
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut high_score = load_high_score();
    let mut notice: Option<String> = None;

    loop {
        match show_menu(out, rx, high_score, notice.as_deref())? {
            MenuResult::Quit => break,
            MenuResult::Start(choice) => {
                notice = None;
                let quit = match choice {
                    LinkChoice::Practice => {
                        play(out, rx, &mut high_score, PeerLink::new(NullTransport))?
                    }
                    LinkChoice::Host | LinkChoice::Join => {
                        let host = matches!(choice, LinkChoice::Host);
                        let text = if host { "Waiting for the other ship…" } else { "Connecting…" };
                        draw_wait_screen(out, text)?;
                        match connect_peer(host) {
                            Ok(transport) => {
                                play(out, rx, &mut high_score, PeerLink::new(transport))?
                            }
                            Err(e) => {
                                notice = Some(format!("Link failed: {e}"));
                                false
                            }
                        }
                    }
                };
                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release events where the terminal supports them; others
    // fall back to the hold-window expiry.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the control loop never blocks on input.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
