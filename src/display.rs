//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! menu or of a round snapshot. No game logic is performed; this module only
//! translates arena coordinates into terminal cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use space_invader::compute::{ARENA_HEIGHT, ARENA_WIDTH};
use space_invader::entities::{Bullet, BulletOwner, Difficulty, Entity, EntityKind, Outcome};
use space_invader::host::Menu;
use space_invader::round::RoundSnapshot;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PLAYER_NAME: Color = Color::Grey;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Red;
const C_ENEMY_HP: Color = Color::Yellow;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Rgb { r: 0, g: 255, b: 153 };

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Normal => Color::Yellow,
        Difficulty::Hard => Color::Red,
        Difficulty::Goddamn => Color::Magenta,
    }
}

// ── Arena → terminal mapping ──────────────────────────────────────────────────

/// Maps arena units onto the cells inside the border (rows 2..h-2).
struct Viewport {
    width: u16,
    height: u16,
}

impl Viewport {
    fn current() -> std::io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self { width, height })
    }

    fn inner_cols(&self) -> f32 {
        self.width.saturating_sub(2).max(1) as f32
    }

    fn inner_rows(&self) -> f32 {
        self.height.saturating_sub(4).max(1) as f32
    }

    fn col(&self, x: f32) -> u16 {
        let c = (x / ARENA_WIDTH * self.inner_cols()).floor().max(0.0) as u16;
        1 + c.min(self.width.saturating_sub(3))
    }

    fn row(&self, y: f32) -> u16 {
        let r = (y / ARENA_HEIGHT * self.inner_rows()).floor().max(0.0) as u16;
        2 + r.min(self.height.saturating_sub(5))
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame of a running round.
pub fn render_round<W: Write>(out: &mut W, snapshot: &RoundSnapshot) -> std::io::Result<()> {
    let view = Viewport::current()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, &view, snapshot)?;

    for enemy in &snapshot.enemies {
        draw_enemy(out, &view, enemy)?;
    }
    for bullet in &snapshot.bullets {
        draw_bullet(out, &view, bullet)?;
    }
    draw_player(out, &view, snapshot)?;
    draw_controls_hint(out, &view)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Render the main menu, including the result of the previous round.
pub fn render_menu<W: Write>(out: &mut W, menu: &Menu) -> std::io::Result<()> {
    let view = Viewport::current()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cx = view.width / 2;
    let cy = view.height / 2;
    let left = cx.saturating_sub(14);

    let title = "SPACE  INVADER";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(7),
    ))?;
    out.queue(style::SetForegroundColor(C_TITLE))?;
    out.queue(Print(title))?;

    if let Some(result) = &menu.last_result {
        let (line, color) = match result.outcome {
            Outcome::Won => (
                format!("You win, {}! Score: {}", result.player_name, result.score),
                Color::Yellow,
            ),
            _ => (
                format!("{}, you lost! Final Score: {}", result.player_name, result.score),
                Color::Red,
            ),
        };
        out.queue(cursor::MoveTo(
            cx.saturating_sub(line.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(line))?;
    }

    out.queue(cursor::MoveTo(left, cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Name: "))?;
    out.queue(style::SetForegroundColor(C_TITLE))?;
    if menu.player_name.is_empty() {
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print("Enter your name..."))?;
    } else {
        out.queue(Print(format!("{}_", menu.player_name)))?;
    }

    out.queue(cursor::MoveTo(left, cy.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Difficulty:"))?;

    for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
        let row = cy + i as u16;
        let marker = if *difficulty == menu.difficulty { "▶ " } else { "  " };
        out.queue(cursor::MoveTo(left + 2, row))?;
        out.queue(style::SetForegroundColor(difficulty_color(*difficulty)))?;
        out.queue(Print(format!("{}{}", marker, difficulty.name())))?;
    }

    out.queue(cursor::MoveTo(left, cy + 5))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑ ↓ : Difficulty   ENTER : Start   ESC : Exit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    view: &Viewport,
    snapshot: &RoundSnapshot,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>6}", snapshot.score)))?;

    let title = format!("[ {} ]", snapshot.difficulty.name().to_uppercase());
    let tx = (view.width / 2).saturating_sub(title.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(difficulty_color(snapshot.difficulty)))?;
    out.queue(Print(&title))?;

    let health = format!("HP: {}", "♥".repeat(snapshot.health as usize));
    let hx = view
        .width
        .saturating_sub(health.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(hx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&health))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    view: &Viewport,
    snapshot: &RoundSnapshot,
) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols), name label on the row above:
    //   name
    //    ▲
    //   /█\
    let p = &snapshot.player;
    let col = view.col(p.x + 20.0);
    let row = view.row(p.y);

    out.queue(style::SetForegroundColor(C_PLAYER_NAME))?;
    out.queue(cursor::MoveTo(
        col.saturating_sub(snapshot.player_name.chars().count() as u16 / 2).max(1),
        row.saturating_sub(1).max(2),
    ))?;
    out.queue(Print(&snapshot.player_name))?;

    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;
    if row + 1 < view.height.saturating_sub(2) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/█\\"))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, view: &Viewport, enemy: &Entity) -> std::io::Result<()> {
    let row = view.row(enemy.y);
    match enemy.kind {
        EntityKind::Boss => {
            //   ╔═BOSS═╗  hp
            //   ╚╦════╦╝
            let col = view.col(enemy.x);
            out.queue(style::SetForegroundColor(C_BOSS))?;
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("╔═BOSS═╗"))?;
            out.queue(cursor::MoveTo(col, row + 1))?;
            out.queue(Print("╚╦════╦╝"))?;
            out.queue(style::SetForegroundColor(C_ENEMY_HP))?;
            out.queue(cursor::MoveTo(col + 9, row))?;
            out.queue(Print(enemy.hp.to_string()))?;
        }
        _ => {
            //   «▼» hp
            let col = view.col(enemy.x + 17.0).saturating_sub(1).max(1);
            out.queue(style::SetForegroundColor(C_ENEMY))?;
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("«▼»"))?;
            if enemy.hp > 1 {
                out.queue(style::SetForegroundColor(C_ENEMY_HP))?;
                out.queue(Print(enemy.hp.to_string()))?;
            }
        }
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, view: &Viewport, bullet: &Bullet) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(view.col(bullet.x), view.row(bullet.y)))?;
    match bullet.owner {
        BulletOwner::Player => {
            out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
            out.queue(Print("║"))?;
        }
        BulletOwner::Enemy => {
            out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
            out.queue(Print("↓"))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   ESC : Menu"))?;
    Ok(())
}
