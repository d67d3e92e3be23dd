/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// world; no simulation state is mutated.  The 800×600 logical canvas is
/// projected onto whatever terminal size the caller reports: row 0 is the
/// HUD, the last row the controls hint, everything between is play area.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate_runner::entities::{
    Entity, Facing, ImageId, WorldState, CANVAS_H, CANVAS_W, FLOOR_MARGIN,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_LIVES: Color = Color::Red;
const C_HUD_COINS: Color = Color::Yellow;
const C_HUD_TEXT: Color = Color::White;
const C_PLAYER: Color = Color::White;
const C_PLAYER_BLINK: Color = Color::DarkGrey;
const C_COIN: Color = Color::Yellow;
const C_CRATE: Color = Color::DarkYellow;
const C_CROW: Color = Color::DarkGrey;
const C_RAT: Color = Color::Grey;
const C_GROUND: Color = Color::DarkGreen;
const C_HINT: Color = Color::DarkGrey;
const C_SKY_FAR: Color = Color::DarkBlue;
const C_HILLS: Color = Color::DarkGreen;
const C_TREES: Color = Color::Green;
const C_BUSHES: Color = Color::DarkGreen;

// ── Glyph art ─────────────────────────────────────────────────────────────────
//
// The resource collaborator of this platform: image ids resolve to small
// glyph strips, one entry per animation frame.

const COIN_FRAMES: [&str; 6] = ["◉", "◎", "○", "◎", "●", "◎"];
const CROW_FRAMES: [&str; 4] = ["\\o/", "-o-", "/o\\", "-o-"];
const RAT_FRAMES: [&str; 5] = ["~=o>", "-=o>", "~=o>", "-=o>", "~=o>"];

const CRATE_ART: [&str; 3] = ["┌──┐", "│╳╳│", "└──┘"];

const PLAYER_RUN_A: [&str; 3] = [" O ", "/|\\", "/ \\"];
const PLAYER_RUN_B: [&str; 3] = [" O ", "/|\\", " |\\"];
const PLAYER_RUN_C: [&str; 3] = [" O ", "/|\\", "/| "];
const PLAYER_IDLE: [&str; 3] = [" O ", " | ", "/ \\"];
const PLAYER_AIR: [&str; 3] = ["\\O/", " | ", "/ \\"];

// Far-to-near parallax bands; each string tiles across the screen with a
// per-layer phase shift.
const BAND_CLOUDS: &str = "   ~      ~~     ~    ";
const BAND_HILLS: &str = "    .-.        .--.   ";
const BAND_TREES: &str = "  ♠    ♠  ♠      ♠  ";
const BAND_BUSHES: &str = " ,,  .  ,,,   .  ,, ";

// ── Projection ───────────────────────────────────────────────────────────────

struct Viewport {
    cols: u16,
    rows: u16,
}

impl Viewport {
    fn new(cols: u16, rows: u16) -> Self {
        Viewport { cols, rows }
    }

    /// First and last row of the play area (HUD above, hint below).
    fn play_top(&self) -> i32 {
        1
    }

    fn play_bottom(&self) -> i32 {
        self.rows.saturating_sub(2) as i32
    }

    fn col(&self, x: f32) -> i32 {
        (x / CANVAS_W * self.cols as f32) as i32
    }

    fn row(&self, y: f32) -> i32 {
        let span = (self.play_bottom() - self.play_top()) as f32;
        self.play_top() + (y / CANVAS_H * span) as i32
    }
}

/// Queue a string at (col, row) if any of it lands inside the viewport.
fn put<W: Write>(out: &mut W, vp: &Viewport, col: i32, row: i32, s: &str) -> std::io::Result<()> {
    if row < 0
        || row >= vp.rows as i32
        || col >= vp.cols as i32
        || col + s.chars().count() as i32 <= 0
    {
        return Ok(());
    }
    // Clip on the left edge; the terminal clips the right edge itself.
    let skip = (-col).max(0) as usize;
    let visible: String = s.chars().skip(skip).collect();
    out.queue(cursor::MoveTo((col + skip as i32) as u16, row as u16))?;
    out.queue(Print(visible))?;
    Ok(())
}

fn put_art<W: Write>(
    out: &mut W,
    vp: &Viewport,
    col: i32,
    row: i32,
    art: &[&str],
) -> std::io::Result<()> {
    for (i, line) in art.iter().enumerate() {
        put(out, vp, col, row + i as i32, line)?;
    }
    Ok(())
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame of the world.
pub fn render<W: Write>(out: &mut W, world: &WorldState) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let vp = Viewport::new(cols, rows);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_background(out, &vp, world)?;
    draw_ground(out, &vp)?;

    for c in &world.crates {
        draw_crate(out, &vp, c)?;
    }
    for coin in &world.coins {
        draw_coin(out, &vp, coin)?;
    }
    for enemy in &world.enemies {
        draw_enemy(out, &vp, enemy)?;
    }

    draw_player(out, &vp, world)?;
    draw_hud(out, &vp, world)?;
    draw_controls_hint(out, &vp)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Background & ground ──────────────────────────────────────────────────────

/// One tiled band per scrolling layer, phase-shifted by its lead tile's
/// offset.  Layer 0 (the static backdrop) stays implicit: plain sky.
fn draw_background<W: Write>(
    out: &mut W,
    vp: &Viewport,
    world: &WorldState,
) -> std::io::Result<()> {
    let span = (vp.play_bottom() - vp.play_top()).max(1);
    let bands: [(usize, &str, Color, i32); 4] = [
        (1, BAND_CLOUDS, C_SKY_FAR, vp.play_top() + 1),
        (2, BAND_HILLS, C_HILLS, vp.play_top() + span * 3 / 5),
        (3, BAND_TREES, C_TREES, vp.play_top() + span * 3 / 4),
        (4, BAND_BUSHES, C_BUSHES, vp.play_bottom() - 2),
    ];

    for (layer, pattern, color, row) in bands {
        let Some(tiles) = world.background.get(layer) else { continue };
        let Some(lead) = tiles.first() else { continue };
        let phase = vp.col(-lead.pos.0);
        draw_band(out, vp, row, pattern, color, phase)?;
    }
    Ok(())
}

fn draw_band<W: Write>(
    out: &mut W,
    vp: &Viewport,
    row: i32,
    pattern: &str,
    color: Color,
    phase: i32,
) -> std::io::Result<()> {
    if row < vp.play_top() || row > vp.play_bottom() {
        return Ok(());
    }
    let glyphs: Vec<char> = pattern.chars().collect();
    let len = glyphs.len() as i32;
    out.queue(style::SetForegroundColor(color))?;
    let line: String = (0..vp.cols as i32)
        .map(|c| glyphs[(((c + phase) % len + len) % len) as usize])
        .collect();
    out.queue(cursor::MoveTo(0, row as u16))?;
    out.queue(Print(line))?;
    Ok(())
}

fn draw_ground<W: Write>(out: &mut W, vp: &Viewport) -> std::io::Result<()> {
    let row = vp.row(CANVAS_H - FLOOR_MARGIN);
    out.queue(style::SetForegroundColor(C_GROUND))?;
    out.queue(cursor::MoveTo(0, row as u16))?;
    out.queue(Print("═".repeat(vp.cols as usize)))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_crate<W: Write>(out: &mut W, vp: &Viewport, c: &Entity) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_CRATE))?;
    put_art(out, vp, vp.col(c.pos.0), vp.row(c.pos.1), &CRATE_ART)
}

fn draw_coin<W: Write>(out: &mut W, vp: &Viewport, coin: &Entity) -> std::io::Result<()> {
    let Some(frame) = coin.sprite.current_frame() else { return Ok(()) };
    out.queue(style::SetForegroundColor(C_COIN))?;
    put(
        out,
        vp,
        vp.col(coin.pos.0),
        vp.row(coin.pos.1),
        COIN_FRAMES[frame % COIN_FRAMES.len()],
    )
}

fn draw_enemy<W: Write>(out: &mut W, vp: &Viewport, enemy: &Entity) -> std::io::Result<()> {
    let Some(frame) = enemy.sprite.current_frame() else { return Ok(()) };
    let (art, color) = match enemy.sprite.image {
        ImageId::Rat => (RAT_FRAMES[frame % RAT_FRAMES.len()], C_RAT),
        _ => (CROW_FRAMES[frame % CROW_FRAMES.len()], C_CROW),
    };
    out.queue(style::SetForegroundColor(color))?;
    put(out, vp, vp.col(enemy.pos.0), vp.row(enemy.pos.1), art)
}

/// The hit blink is a colour dip: three dim windows per second while the
/// invulnerability window lasts.
fn blink_dimmed(world: &WorldState) -> bool {
    if !world.player_hit {
        return false;
    }
    let t = (world.game_time - world.hit_time) % 1.0;
    (0.0..=0.2).contains(&t) || (t > 0.4 && t <= 0.6) || (t > 0.75 && t <= 0.9)
}

fn draw_player<W: Write>(out: &mut W, vp: &Viewport, world: &WorldState) -> std::io::Result<()> {
    let p = &world.player;

    let art: &[&str; 3] = if !p.grounded {
        &PLAYER_AIR
    } else if p.speed == 0.0 {
        &PLAYER_IDLE
    } else {
        match p.sprite.current_frame().unwrap_or(0) % 3 {
            0 => &PLAYER_RUN_A,
            1 => &PLAYER_RUN_B,
            _ => &PLAYER_RUN_C,
        }
    };

    let color = if blink_dimmed(world) { C_PLAYER_BLINK } else { C_PLAYER };
    out.queue(style::SetForegroundColor(color))?;

    let mut col = vp.col(p.pos.0);
    if p.facing == Facing::Backward {
        // Nudge the art toward the sprite's trailing edge when backpedaling.
        col += 1;
    }
    put_art(out, vp, col, vp.row(p.pos.1), art)
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, vp: &Viewport, world: &WorldState) -> std::io::Result<()> {
    // Lives — left
    let hearts: String = "♥".repeat(world.lives_count as usize);
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&hearts))?;

    // Clock and distance — centre
    let meters_left = ((world.target_distance - world.distance) / 100.0) as i32;
    let mid = format!("{}s   {} meters left", world.game_time as i32, meters_left.max(0));
    let mx = (vp.cols / 2).saturating_sub(mid.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(mx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TEXT))?;
    out.queue(Print(&mid))?;

    // Animated coin counter — right
    let icon = world
        .coin_icon
        .current_frame()
        .map(|f| COIN_FRAMES[f % COIN_FRAMES.len()])
        .unwrap_or("◉");
    let coins = format!("{} x {}", icon, world.coins_count);
    let cx = vp.cols.saturating_sub(coins.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(cx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_COINS))?;
    out.queue(Print(&coins))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, vp: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, vp.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Run   ↑ / W : Jump   ↓ / S : Dive   ESC : Menu"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn overlay_lines<W: Write>(out: &mut W, lines: &[(&str, Color)]) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let cx = cols / 2;
    let start = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

/// Pause menu, drawn over the frozen world.
pub fn draw_pause_menu<W: Write>(
    out: &mut W,
    world: &WorldState,
    sound_effects: bool,
) -> std::io::Result<()> {
    let life = format!(
        "[B] Buy life — 15 coins   (lives {}, coins {})",
        world.lives_count, world.coins_count
    );
    let sound = format!("[F] Sound effects: {}", if sound_effects { "ON" } else { "OFF" });
    let lines: &[(&str, Color)] = &[
        ("╔═══════════════════╗", Color::Cyan),
        ("║      PAUSED       ║", Color::Cyan),
        ("╚═══════════════════╝", Color::Cyan),
        ("[ESC] Resume", Color::White),
        (life.as_str(), Color::Yellow),
        (sound.as_str(), Color::DarkGrey),
        ("[R] Restart    [Q] Quit", Color::DarkGrey),
    ];
    overlay_lines(out, lines)
}

/// Shown when the stage target distance is reached.
pub fn draw_stage_complete<W: Write>(
    out: &mut W,
    world: &WorldState,
    stage: u32,
) -> std::io::Result<()> {
    let title = format!("║  STAGE {} COMPLETE  ║", stage);
    let stats = format!(
        "{} coins collected — next target {} meters",
        world.coins_count,
        (world.target_distance * 2.0 / 100.0) as i32
    );
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Green),
        (title.as_str(), Color::Green),
        ("╚════════════════════╝", Color::Green),
        (stats.as_str(), Color::Yellow),
        ("[N] Next stage    [Q] Quit", Color::White),
    ];
    overlay_lines(out, lines)
}

/// Terminal game-over screen.
pub fn draw_game_over<W: Write>(
    out: &mut W,
    world: &WorldState,
    stage: u32,
    best_stage: u32,
) -> std::io::Result<()> {
    let run = format!("Reached stage {} with {} coins", stage, world.coins_count);
    let best = if stage >= best_stage && stage > 1 {
        format!("★ NEW BEST: stage {} ★", stage)
    } else {
        format!("Best run: stage {}", best_stage.max(stage))
    };
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (run.as_str(), Color::Yellow),
        (best.as_str(), Color::Yellow),
        ("[R] Play again   [M] Menu   [Q] Quit", Color::White),
    ];
    overlay_lines(out, lines)
}
