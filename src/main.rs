mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use crate_runner::compute;
use crate_runner::entities::{FrameEvent, GameStatus, InputState, WorldState};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Best-run persistence ──────────────────────────────────────────────────────

fn record_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".crate_runner_record")
}

fn load_best_stage() -> u32 {
    std::fs::read_to_string(record_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
}

fn save_best_stage(stage: u32) {
    let _ = std::fs::write(record_path(), stage.to_string());
}

// ── Sound effects ─────────────────────────────────────────────────────────────

/// The audio device of this platform is the terminal bell.
fn play_effect<W: Write>(out: &mut W, enabled: bool) {
    if enabled {
        let _ = out.write_all(b"\x07");
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    best_stage: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  CRATE  RUNNER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if best_stage > 1 {
        let best_str = format!("Best run: stage {}", best_stage);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(best_str.chars().count() as u16 / 2),
            cy.saturating_sub(4),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&best_str))?;
    }

    let how_to: &[&str] = &[
        "Jump the crates, grab the coins, dodge the crows and rats.",
        "Reach the target distance to clear a stage; every stage runs faster.",
        "15 coins buy a spare life in the pause menu (6 lives max).",
        "",
        "←/→ or A/D : run      ↑/W/Space : jump      ↓/S : fast fall",
    ];
    for (i, line) in how_to.iter().enumerate() {
        out.queue(cursor::MoveTo(
            cx.saturating_sub(line.chars().count() as u16 / 2),
            cy.saturating_sub(1) + i as u16,
        ))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*line))?;
    }

    let prompt = "ENTER : Start      Q : Quit";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(prompt.chars().count() as u16 / 2),
        cy + 6,
    ))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(prompt))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind, .. })) => {
                if kind == KeyEventKind::Release {
                    continue;
                }
                match code {
                    KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        return Ok(MenuResult::Quit);
                    }
                    _ => {}
                }
            }
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit), // input thread gone
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key; each frame the simulation polls which
/// keys are still "fresh" (within `HOLD_WINDOW`), so run + jump can be held
/// together without interference.  One-shot keys (pause, restart, purchase)
/// act on the press event directly.
///
/// The loop never stops scheduling: pause, stage-complete and game-over all
/// skip the world update but keep polling input, so resuming is just a flag
/// flip.
fn game_loop<W: Write>(
    out: &mut W,
    world: &mut WorldState,
    rx: &mpsc::Receiver<Event>,
    best_stage: &mut u32,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut paused = false;
    let mut sound_effects = false;
    let mut stage: u32 = 1;
    let mut last_time = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
                        KeyCode::Esc if world.status == GameStatus::Playing => {
                            paused = !paused;
                        }
                        KeyCode::Char('f') | KeyCode::Char('F') if paused => {
                            sound_effects = !sound_effects;
                        }
                        KeyCode::Char('b') | KeyCode::Char('B') if paused => {
                            if compute::buy_life(world) {
                                play_effect(out, sound_effects);
                            }
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if paused || world.status == GameStatus::GameOver =>
                        {
                            compute::reset(world);
                            stage = 1;
                            paused = false;
                        }
                        KeyCode::Char('m') | KeyCode::Char('M')
                            if world.status == GameStatus::GameOver =>
                        {
                            return Ok(false);
                        }
                        KeyCode::Char('n') | KeyCode::Char('N')
                            if world.status == GameStatus::StageComplete =>
                        {
                            compute::advance_stage(world);
                            stage += 1;
                            if stage > *best_stage {
                                *best_stage = stage;
                                save_best_stage(stage);
                            }
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // Wall-clock delta; it keeps ticking over while paused so resuming
        // doesn't replay the whole pause as one giant step.
        let now = Instant::now();
        let dt = now.duration_since(last_time).as_secs_f32();
        last_time = now;

        if world.status == GameStatus::Playing && !paused {
            let input = InputState {
                left: any_held(
                    &key_frame,
                    &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
                    frame,
                ),
                right: any_held(
                    &key_frame,
                    &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
                    frame,
                ),
                down: any_held(
                    &key_frame,
                    &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
                    frame,
                ),
                jump: any_held(
                    &key_frame,
                    &[
                        KeyCode::Up,
                        KeyCode::Char('w'),
                        KeyCode::Char('W'),
                        KeyCode::Char(' '),
                    ],
                    frame,
                ),
            };

            for ev in compute::tick(world, dt, &input, &mut rng) {
                match ev {
                    FrameEvent::Jumped
                    | FrameEvent::CoinCollected { .. }
                    | FrameEvent::PlayerHit { .. } => play_effect(out, sound_effects),
                    FrameEvent::StageComplete => {}
                    FrameEvent::GameOver => {
                        play_effect(out, sound_effects);
                        if stage > *best_stage {
                            *best_stage = stage;
                            save_best_stage(stage);
                        }
                    }
                }
            }
        }

        display::render(out, world)?;
        if paused {
            display::draw_pause_menu(out, world, sound_effects)?;
        } else {
            match world.status {
                GameStatus::StageComplete => display::draw_stage_complete(out, world, stage)?,
                GameStatus::GameOver => display::draw_game_over(out, world, stage, *best_stage)?,
                GameStatus::Playing => {}
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
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

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut best_stage = load_best_stage();

    loop {
        match show_menu(out, rx, best_stage)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let mut world = compute::init_world();
                compute::reset(&mut world);
                if game_loop(out, &mut world, rx, &mut best_stage)? {
                    break;
                }
                // otherwise fall through back to the menu
            }
        }
    }
    Ok(())
}
