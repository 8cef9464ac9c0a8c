//! Rendering layer — all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! session.  No game logic is performed; this module only translates the
//! 480×320 pixel playfield onto whatever terminal grid is available.  The
//! simulation is correct even if none of this is ever called.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::{FIELD_BOTTOM, FIELD_TOP, SCREEN_W};
use crate::session::Session;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_SHIP: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_BULLET_OWN: Color = Color::Cyan;
const C_BULLET_PEER: Color = Color::Magenta;
const C_BULLET_AI: Color = Color::Red;
const C_EXPLOSION: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

// ── Coordinate mapping ────────────────────────────────────────────────────────

fn col(x: i32, cols: u16) -> u16 {
    let usable = cols.saturating_sub(3) as i32;
    (1 + x.clamp(0, SCREEN_W) * usable / SCREEN_W) as u16
}

fn row(y: i32, rows: u16) -> u16 {
    // Rows 0 (HUD), 1 and rows-2 (border), rows-1 (cursor park) are reserved
    let usable = rows.saturating_sub(5) as i32;
    let span = FIELD_BOTTOM - FIELD_TOP;
    (2 + (y.clamp(FIELD_TOP, FIELD_BOTTOM) - FIELD_TOP) * usable / span) as u16
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, session: &Session, high_score: u16) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;

    out.queue(terminal::Clear(terminal::ClearType::All))?;
    draw_hud(out, session, high_score, cols)?;
    draw_border(out, cols, rows)?;

    if session.enemy.active {
        out.queue(style::SetForegroundColor(C_ENEMY))?;
        out.queue(cursor::MoveTo(col(session.enemy.x, cols), row(session.enemy.y, rows)))?;
        out.queue(Print("◄◆"))?;
    }

    if let Some(explosion) = &session.explosion {
        out.queue(style::SetForegroundColor(C_EXPLOSION))?;
        out.queue(cursor::MoveTo(col(explosion.x, cols), row(explosion.y, rows)))?;
        out.queue(Print("✶✶"))?;
    }

    out.queue(style::SetForegroundColor(C_BULLET_OWN))?;
    for bullet in session.own_bullets.live() {
        out.queue(cursor::MoveTo(col(bullet.x, cols), row(bullet.y, rows)))?;
        out.queue(Print("»"))?;
    }
    out.queue(style::SetForegroundColor(C_BULLET_PEER))?;
    for bullet in session.peer_bullets.live() {
        out.queue(cursor::MoveTo(col(bullet.x, cols), row(bullet.y, rows)))?;
        out.queue(Print("«"))?;
    }
    out.queue(style::SetForegroundColor(C_BULLET_AI))?;
    for bullet in session.ai_bullets.live() {
        out.queue(cursor::MoveTo(col(bullet.x, cols), row(bullet.y, rows)))?;
        out.queue(Print("•"))?;
    }

    out.queue(style::SetForegroundColor(C_SHIP))?;
    out.queue(cursor::MoveTo(col(session.ship.x, cols), row(session.ship.y, rows)))?;
    out.queue(Print("▶"))?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    session: &Session,
    high_score: u16,
    cols: u16,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("SCORE {:>5}   BEST {:>5}", session.score, high_score)))?;

    let time = format!("TIME {:>3}", session.remaining_secs());
    out.queue(cursor::MoveTo(cols.saturating_sub(time.len() as u16 + 1), 0))?;
    out.queue(Print(time))?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let w = cols.saturating_sub(2) as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;
    for r in 2..rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, r))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), r))?;
        out.queue(Print("│"))?;
    }
    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

/// Drawn once when the session clock runs out; leaves the last frame
/// underneath visible.
pub fn draw_game_over<W: Write>(
    out: &mut W,
    session: &Session,
    high_score: u16,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let cx = cols / 2;
    let cy = rows / 2;

    let title = "G A M E   O V E R";
    out.queue(cursor::MoveTo(cx.saturating_sub(title.len() as u16 / 2), cy.saturating_sub(2)))?;
    out.queue(style::SetForegroundColor(Color::Red))?;
    out.queue(Print(title))?;

    let score_line = format!("Final score: {}", session.score);
    out.queue(cursor::MoveTo(cx.saturating_sub(score_line.len() as u16 / 2), cy))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(&score_line))?;

    if session.score > i32::from(high_score) {
        let best = "New best score!";
        out.queue(cursor::MoveTo(cx.saturating_sub(best.len() as u16 / 2), cy + 1))?;
        out.queue(Print(best))?;
    }

    let hint = "Press any key for menu";
    out.queue(cursor::MoveTo(cx.saturating_sub(hint.len() as u16 / 2), cy + 3))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
