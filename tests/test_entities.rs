use crate_runner::entities::*;

fn strip(speed: f32, frames: Vec<usize>, once: bool) -> Sprite {
    Sprite::new(
        ImageId::Coin,
        (0.0, 0.0),
        (40.0, 43.0),
        (40.0, 43.0),
        speed,
        frames,
        Axis::Vertical,
        once,
    )
}

// ── Sprite animation cursor ───────────────────────────────────────────────────

#[test]
fn cursor_advances_with_time_and_speed() {
    let mut s = strip(10.0, vec![0, 1, 2, 3], false);
    assert_eq!(s.cursor(), 0.0);
    s.advance(0.05);
    s.advance(0.05);
    assert!((s.cursor() - 1.0).abs() < 1e-4);
    assert_eq!(s.current_frame(), Some(1));
}

#[test]
fn looping_strip_wraps_around() {
    let mut s = strip(30.0, vec![0, 1, 2], false);
    s.advance(0.1); // cursor ≈ 3 → wraps to frame 0
    assert_eq!(s.current_frame(), Some(0));
    assert!(!s.finished());
}

#[test]
fn zero_speed_sprite_always_shows_frame_zero() {
    let mut s = strip(0.0, vec![0, 1, 2], false);
    s.advance(10.0);
    assert_eq!(s.cursor(), 0.0);
    assert_eq!(s.current_frame(), Some(0));
}

#[test]
fn play_once_strip_finishes_and_goes_dark() {
    let mut s = strip(10.0, vec![0, 1], true);
    assert_eq!(s.current_frame(), Some(0));
    s.advance(0.25); // cursor 2.5, past the last frame
    assert!(s.finished());
    assert_eq!(s.current_frame(), None);
}

#[test]
fn frame_strip_remaps_indices() {
    // The strip lists source-frame indices, not positions
    let mut s = strip(10.0, vec![4, 5, 6], false);
    assert_eq!(s.current_frame(), Some(4));
    s.advance(0.1);
    assert_eq!(s.current_frame(), Some(5));
}

#[test]
fn static_image_is_a_one_frame_sprite() {
    let s = Sprite::static_image(ImageId::Crate, (100.0, 100.0));
    assert_eq!(s.frame_size, (100.0, 100.0));
    assert_eq!(s.render_size, (100.0, 100.0));
    assert_eq!(s.current_frame(), Some(0));
}

#[test]
fn sprite_clone_is_independent() {
    let original = strip(10.0, vec![0, 1, 2], false);
    let mut cloned = original.clone();
    cloned.advance(0.2);
    assert_eq!(original.cursor(), 0.0);
    assert!(cloned.cursor() > 0.0);
}

// ── Entities ──────────────────────────────────────────────────────────────────

#[test]
fn entity_constructors_set_speed() {
    let sprite = Sprite::static_image(ImageId::Crate, (100.0, 100.0));
    let still = Entity::new((10.0, 20.0), sprite.clone());
    assert_eq!(still.speed, 0.0);
    let moving = Entity::with_speed((10.0, 20.0), sprite, 150.0);
    assert_eq!(moving.speed, 150.0);
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn new_player_starts_on_the_floor_line() {
    let p = PlayerCharacter::new();
    assert_eq!(p.pos, (0.0, 0.0));
    assert_eq!(p.max_speed, PLAYER_MAX_SPEED);
    assert_eq!(p.ground, CANVAS_H - FLOOR_MARGIN);
    assert_eq!(p.friction, GROUND_FRICTION);
    assert!(!p.grounded);
}

#[test]
fn jump_launches_a_grounded_player() {
    let mut p = PlayerCharacter::new();
    p.grounded = true;
    p.jump();
    assert!(!p.grounded);
    assert_eq!(p.gravity_speed, -PLAYER_JUMP_POWER);
    assert_eq!(p.friction, AIR_FRICTION);
}

#[test]
fn jump_in_the_air_changes_nothing() {
    let mut p = PlayerCharacter::new();
    p.grounded = false;
    p.gravity_speed = 120.0;
    p.jump();
    assert_eq!(p.gravity_speed, 120.0);
    assert_eq!(p.friction, GROUND_FRICTION);
}

// ── Input & status ────────────────────────────────────────────────────────────

#[test]
fn input_defaults_to_all_released() {
    let input = InputState::default();
    assert!(!input.left && !input.right && !input.down && !input.jump);
}

#[test]
fn status_and_events_compare_by_value() {
    assert_eq!(GameStatus::Playing, GameStatus::Playing);
    assert_ne!(GameStatus::Playing, GameStatus::GameOver);
    assert_eq!(
        FrameEvent::CoinCollected { total: 3 },
        FrameEvent::CoinCollected { total: 3 }
    );
    assert_ne!(
        FrameEvent::CoinCollected { total: 3 },
        FrameEvent::CoinCollected { total: 4 }
    );
}
