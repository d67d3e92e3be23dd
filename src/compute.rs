/// The simulation core.
///
/// `tick` advances the whole world by one delta-timed frame and reports what
/// happened as `FrameEvent`s; the loop owner turns those into sounds, menus
/// and record keeping.  All randomness comes through an injected `rng` and
/// all timing through the injected `dt`, so callers control determinism
/// (tests run with a seeded RNG and a fixed step).

use rand::Rng;

use crate::collision::{self, Rect, SideInsets};
use crate::entities::{
    Axis, Entity, Facing, FrameEvent, GameStatus, ImageId, InputState, PlayerCharacter, Sprite,
    WorldState, CANVAS_H, CANVAS_W, FLOOR_MARGIN, GROUND_FRICTION, PLAYER_FRAME_H, PLAYER_FRAME_W,
    PLAYER_RUN_FPS,
};

// ── Stage & economy tuning ───────────────────────────────────────────────────

/// Multiplier applied to the stage parameters on every stage advance.
pub const DISTANCE_COEFFICIENT: f32 = 2.0;
pub const LIFE_PRICE: u32 = 15;
pub const MAX_LIVES: u32 = 6;
pub const START_LIVES: u32 = 3;

const START_TARGET_DISTANCE: f32 = 10_000.0;
const START_MAX_SPEED: f32 = 200.0;
const START_SPEED_INCREASER: f32 = 10.0;
/// Scroll speed a restarted run begins at (a brand-new session idles at
/// max/10 instead).
const RESET_GLOBAL_SPEED: f32 = 100.0;

/// Seconds of hit-invulnerability (and blink) after losing a life.
pub const HIT_BLINK_SECS: f32 = 2.0;

// ── Spawn tables ─────────────────────────────────────────────────────────────

const COIN_SPAWN_CHANCE: f64 = 0.01;
const ENEMY_SPAWN_CHANCE: f64 = 0.005;
const CRATE_TARGET_COUNT: usize = 5;

const COIN_FRAME: (f32, f32) = (40.0, 43.0);
const COIN_FPS: f32 = 6.0;
const CRATE_SIZE: (f32, f32) = (100.0, 100.0);
const CROW_FRAME: (f32, f32) = (96.0, 115.0);
const RAT_FRAME: (f32, f32) = (190.0, 60.0);
const RAT_RENDER: (f32, f32) = (95.0, 30.0);

// ── Player motion tuning ─────────────────────────────────────────────────────

/// Horizontal speeds inside the dead zone snap to zero so friction decay
/// terminates instead of drifting forever.
const SPEED_DEAD_ZONE: f32 = 10.0;

/// Visible foot span within the (wide, transparent-margined) player sprite.
/// Only crates under this window count as support.
const FOOT_WINDOW_LEFT: f32 = 40.0;
const FOOT_WINDOW_RIGHT: f32 = 90.0;

/// Per-frame fast-fall nudge while the down key is held.
const FAST_FALL_STEP: f32 = 5.0;

/// Vertical offset of the idle pose row within the character sheet.
const IDLE_ROW_Y: f32 = 301.0;

// ── Constructors ─────────────────────────────────────────────────────────────

fn coin_sprite(render_size: (f32, f32)) -> Sprite {
    Sprite::new(
        ImageId::Coin,
        (0.0, 0.0),
        COIN_FRAME,
        render_size,
        COIN_FPS,
        vec![0, 1, 2, 3, 4, 5],
        Axis::Vertical,
        false,
    )
}

/// The five parallax layers: one static backdrop plus four scrolling layers
/// of two seamlessly-wrapping tiles each.
fn background_layers() -> Vec<Vec<Entity>> {
    let full = (CANVAS_W, CANVAS_H);
    let tile = |depth: usize, x: f32| {
        Entity::new((x, 0.0), Sprite::static_image(ImageId::BackgroundDeep(depth), full))
    };

    let mut layers = Vec::with_capacity(5);
    layers.push(vec![tile(0, 0.0)]);
    for depth in 1..5 {
        layers.push(vec![tile(depth, 0.0), tile(depth, CANVAS_W)]);
    }
    layers
}

/// Build a fresh session.  The player instance created here lives for the
/// whole session; resets reposition it.
pub fn init_world() -> WorldState {
    WorldState {
        game_time: 0.0,
        time_point: 0.0,
        distance: 0.0,
        target_distance: START_TARGET_DISTANCE,
        global_speed: START_MAX_SPEED / 10.0,
        max_speed: START_MAX_SPEED,
        speed_increaser: START_SPEED_INCREASER,
        coins_count: 0,
        lives_count: START_LIVES,
        player_hit: false,
        hit_time: 0.0,
        status: GameStatus::Playing,
        player: PlayerCharacter::new(),
        background: background_layers(),
        coins: Vec::new(),
        crates: Vec::new(),
        enemies: Vec::new(),
        coin_icon: coin_sprite((30.0, 32.0)),
    }
}

fn reset_player(player: &mut PlayerCharacter) {
    player.pos = (0.0, 0.0);
    player.speed = 0.0;
    player.gravity_speed = 0.0;
    player.friction = GROUND_FRICTION;
    player.ground = CANVAS_H - FLOOR_MARGIN;
    player.facing = Facing::Forward;
    player.grounded = false;
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Full new-game reset: score, lives and every stage parameter return to
/// their stage-1 values.  The spawn-protection blink is granted so the player
/// is not hit on the very first frames.
pub fn reset(world: &mut WorldState) {
    world.distance = 0.0;
    world.target_distance = START_TARGET_DISTANCE;
    world.max_speed = START_MAX_SPEED;
    world.speed_increaser = START_SPEED_INCREASER;
    world.global_speed = RESET_GLOBAL_SPEED;
    world.game_time = 0.0;
    world.time_point = 0.0;
    world.coins_count = 0;
    world.lives_count = START_LIVES;
    world.status = GameStatus::Playing;

    world.crates.clear();
    world.coins.clear();
    world.enemies.clear();
    world.background = background_layers();

    reset_player(&mut world.player);
    world.player_hit = true;
    world.hit_time = 0.0;
}

/// Partial reset on stage completion: distance and clock restart, difficulty
/// parameters double, but coins and lives carry over.  `global_speed`
/// restarts from a tenth of the *previous* cap before the cap doubles.
pub fn advance_stage(world: &mut WorldState) {
    world.distance = 0.0;
    world.target_distance *= DISTANCE_COEFFICIENT;
    world.game_time = 0.0;
    world.time_point = 0.0;
    world.global_speed = world.max_speed / 10.0;
    world.speed_increaser *= DISTANCE_COEFFICIENT;
    world.max_speed = (world.max_speed * DISTANCE_COEFFICIENT).floor();
    world.status = GameStatus::Playing;

    world.crates.clear();
    world.coins.clear();
    world.enemies.clear();

    reset_player(&mut world.player);
    world.player_hit = true;
    world.hit_time = 0.0;
}

/// Trade coins for a life.  Fails (returns false) above the life cap or
/// without the coins to pay for it.
pub fn buy_life(world: &mut WorldState) -> bool {
    if world.lives_count >= MAX_LIVES || world.coins_count < LIFE_PRICE {
        return false;
    }
    world.lives_count += 1;
    world.coins_count -= LIFE_PRICE;
    true
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds.  Returns the events of the frame;
/// does nothing unless the world is in the `Playing` state.
pub fn tick(
    world: &mut WorldState,
    dt: f32,
    input: &InputState,
    rng: &mut impl Rng,
) -> Vec<FrameEvent> {
    let mut events = Vec::new();
    if world.status != GameStatus::Playing {
        return events;
    }

    // ── 1. Clock & distance ──────────────────────────────────────────────────
    world.game_time += dt;
    world.distance += world.global_speed * dt;

    // ── 2. Stage completion ──────────────────────────────────────────────────
    if world.target_distance - world.distance <= 0.0 {
        world.status = GameStatus::StageComplete;
        events.push(FrameEvent::StageComplete);
        return events;
    }

    // ── 3. Speed ramp: once per elapsed second, up to the stage cap ──────────
    if world.game_time - world.time_point >= 1.0 && world.global_speed < world.max_speed {
        world.global_speed += world.speed_increaser;
        world.time_point = world.game_time;
    }

    // ── 4. Parallax scroll ───────────────────────────────────────────────────
    update_backgrounds(world, dt);

    // ── 5. Entities & player, in read-after-write order ──────────────────────
    update_crates(world, dt, rng);
    move_player(world, dt, input, &mut events);
    use_gravity(&mut world.player, dt, &world.crates);
    world.player.sprite.advance(dt);

    update_coins(world, dt, rng, &mut events);
    update_enemies(world, dt, rng, &mut events);

    // ── 6. HUD sprite & blink expiry ─────────────────────────────────────────
    world.coin_icon.advance(dt);
    if world.player_hit && world.game_time - world.hit_time >= HIT_BLINK_SECS {
        world.player_hit = false;
    }

    events
}

// ── Background ───────────────────────────────────────────────────────────────

/// Layer 0 is the static backdrop; nearer layers scroll faster.  A tile that
/// has fully left the screen re-docks flush behind its partner.
fn update_backgrounds(world: &mut WorldState, dt: f32) {
    let layer_count = world.background.len();
    for i in 1..layer_count {
        let step = world.global_speed * dt / (layer_count - i) as f32;
        let layer = &mut world.background[i];
        if layer.len() != 2 {
            continue;
        }
        for j in 0..2 {
            layer[j].pos.0 -= step;
            if layer[j].pos.0 + layer[j].sprite.frame_size.0 <= 0.0 {
                let opposite = 1 - j;
                let dock = layer[opposite].pos.0 + layer[opposite].sprite.frame_size.0 - step;
                layer[j].pos.0 = dock;
            }
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Friction decay with a dead-zone snap so speed actually reaches zero.
fn impulse(player: &mut PlayerCharacter) {
    player.speed *= player.friction;
    if player.speed > -SPEED_DEAD_ZONE && player.speed < SPEED_DEAD_ZONE {
        player.speed = 0.0;
        player.sprite.speed = 0.0;
    }
}

fn move_player(world: &mut WorldState, dt: f32, input: &InputState, events: &mut Vec<FrameEvent>) {
    let global_speed = world.global_speed;
    let player = &mut world.player;

    impulse(player);

    // Input sets speed outright (not additive): running forward gets the full
    // scroll boost, backpedaling only half — the world always wins eventually.
    if input.left {
        player.speed = -player.max_speed - global_speed / 2.0;
        player.facing = Facing::Backward;
    }
    if input.right {
        player.speed = player.max_speed + global_speed;
        player.facing = Facing::Forward;
    }
    if input.down {
        player.pos.1 += FAST_FALL_STEP;
    }
    if input.jump && player.grounded {
        player.jump();
        events.push(FrameEvent::Jumped);
    }

    // Pick the sheet row: run strip per facing, or the idle pose when
    // standing still on the ground.  Airborne freezes the current frame.
    player.sprite.src_origin = match player.facing {
        Facing::Forward => (0.0, 0.0),
        Facing::Backward => (0.0, PLAYER_FRAME_H),
    };
    if player.grounded {
        if player.speed != 0.0 {
            player.sprite.speed = PLAYER_RUN_FPS;
        } else {
            player.sprite.speed = 0.0;
            player.sprite.src_origin = match player.facing {
                Facing::Forward => (0.0, IDLE_ROW_Y),
                Facing::Backward => (PLAYER_FRAME_W, IDLE_ROW_Y),
            };
        }
    } else {
        player.sprite.speed = 0.0;
    }

    // The world scrolls under a nominally stationary player.
    player.pos.0 += (player.speed - global_speed) * dt;

    check_player_bounds(player);
}

fn check_player_bounds(player: &mut PlayerCharacter) {
    let (w, h) = player.sprite.frame_size;
    player.pos.0 = player.pos.0.clamp(0.0, CANVAS_W - w);
    player.pos.1 = player.pos.1.clamp(0.0, CANVAS_H - h - FLOOR_MARGIN);
}

/// Recompute the support height from crate tops under the foot window, then
/// integrate gravity while airborne and snap onto whatever is landed on.
fn use_gravity(player: &mut PlayerCharacter, dt: f32, crates: &[Entity]) {
    let mut highest = CANVAS_H - FLOOR_MARGIN;
    for c in crates {
        if c.pos.0 <= player.pos.0 + FOOT_WINDOW_RIGHT
            && c.pos.0 + c.sprite.frame_size.0 >= player.pos.0 + FOOT_WINDOW_LEFT
            && c.pos.1 >= player.pos.1 + player.sprite.frame_size.1
            && c.pos.1 < highest
        {
            highest = c.pos.1;
        }
    }
    player.ground = highest;

    // Support slid out from underneath — start falling.
    if player.pos.1 + player.sprite.frame_size.1 < player.ground {
        player.grounded = false;
    }

    if !player.grounded {
        // Accumulates without a terminal cap; the landing snap below bounds
        // the overshoot.
        player.gravity_speed += player.gravity;
        player.pos.1 += player.gravity_speed * dt;
        settle(player);
    }
}

/// Landing test: at or below the support line, snap on top of it.
fn settle(player: &mut PlayerCharacter) {
    if player.pos.1 >= player.ground - player.sprite.frame_size.1 {
        player.pos.1 = player.ground - player.sprite.frame_size.1;
        player.friction = GROUND_FRICTION;
        player.grounded = true;
        player.gravity_speed = 0.0;
    } else {
        player.grounded = false;
    }
}

fn player_hit_box(player: &PlayerCharacter) -> Rect {
    Rect::from_entity(player.pos, player.sprite.render_size, SideInsets::PLAYER)
}

// ── Coins ────────────────────────────────────────────────────────────────────

fn update_coins(world: &mut WorldState, dt: f32, rng: &mut impl Rng, events: &mut Vec<FrameEvent>) {
    if rng.gen_bool(COIN_SPAWN_CHANCE) {
        let y = rng.gen_range(100.0..CANVAS_H - 100.0);
        world.coins.push(Entity::new((CANVAS_W, y), coin_sprite(COIN_FRAME)));
    }

    for coin in &mut world.coins {
        coin.pos.0 -= world.global_speed * dt;
        coin.sprite.advance(dt);
    }

    // Prune strictly before collection: a coin that scrolled off this frame
    // can never score, even if it still overlaps the player.
    world.coins.retain(|c| c.pos.0 + c.sprite.frame_size.0 >= 0.0);

    let player_box = player_hit_box(&world.player);
    let mut collected = 0u32;
    world.coins.retain(|c| {
        let coin_box = Rect::from_entity(c.pos, c.sprite.render_size, SideInsets::NONE);
        if collision::overlap(&coin_box, &player_box) {
            collected += 1;
            false
        } else {
            true
        }
    });
    for _ in 0..collected {
        world.coins_count += 1;
        events.push(FrameEvent::CoinCollected { total: world.coins_count });
    }
}

// ── Crates ───────────────────────────────────────────────────────────────────

/// Keep the on-screen crate population at its target.  Placement is a greedy
/// scan: a crate directly ahead of the candidate within its 50 px front band
/// forces stacking one level up; any 100 px-band overlap pushes the candidate
/// behind that crate.
fn update_crates(world: &mut WorldState, dt: f32, rng: &mut impl Rng) {
    if world.crates.len() < CRATE_TARGET_COUNT {
        let mut pos_x = CANVAS_W;
        let mut pos_y = 0.0;
        if !world.crates.is_empty() {
            pos_x += rng.gen_range(0.0..CANVAS_W);
            for c in &world.crates {
                if c.pos.0 > CANVAS_W && c.pos.0 <= pos_x && pos_x <= c.pos.0 + 50.0 {
                    pos_y = 100.0;
                } else if (c.pos.0 <= pos_x && pos_x <= c.pos.0 + CRATE_SIZE.0)
                    || (c.pos.0 >= pos_x && pos_x + CRATE_SIZE.0 >= c.pos.0)
                {
                    pos_x = c.pos.0 + CRATE_SIZE.0;
                }
            }
        }
        world.crates.push(Entity::new(
            (pos_x, CANVAS_H - 160.0 - pos_y),
            Sprite::static_image(ImageId::Crate, CRATE_SIZE),
        ));
    }

    for c in &mut world.crates {
        c.pos.0 -= world.global_speed * dt;
    }
    world.crates.retain(|c| c.pos.0 + c.sprite.frame_size.0 >= 0.0);
}

// ── Enemies ──────────────────────────────────────────────────────────────────

fn update_enemies(
    world: &mut WorldState,
    dt: f32,
    rng: &mut impl Rng,
    events: &mut Vec<FrameEvent>,
) {
    // Two independent spawn rolls: crows in the upper quarter, rats along the
    // floor.  Animation speed scales with the enemy's own speed.
    if rng.gen_bool(ENEMY_SPAWN_CHANCE) {
        let speed = rng.gen_range(100.0..200.0);
        let y = rng.gen_range(0.0..CANVAS_H / 4.0);
        world.enemies.push(Entity::with_speed(
            (CANVAS_W, y),
            Sprite::new(
                ImageId::Crow,
                (0.0, 0.0),
                CROW_FRAME,
                CROW_FRAME,
                speed / 16.0,
                vec![0, 1, 2, 3],
                Axis::Horizontal,
                false,
            ),
            speed,
        ));
    }
    if rng.gen_bool(ENEMY_SPAWN_CHANCE) {
        let speed = rng.gen_range(100.0..200.0);
        world.enemies.push(Entity::with_speed(
            (CANVAS_W, CANVAS_H - FLOOR_MARGIN - RAT_RENDER.1),
            Sprite::new(
                ImageId::Rat,
                (0.0, 0.0),
                RAT_FRAME,
                RAT_RENDER,
                speed / 16.0,
                vec![0, 1, 2, 3, 4],
                Axis::Vertical,
                false,
            ),
            speed,
        ));
    }

    // Enemies combine their own speed with the world scroll, so they always
    // close distance faster than static obstacles.
    for e in &mut world.enemies {
        e.pos.0 -= (e.speed + world.global_speed) * dt;
        e.sprite.advance(dt);
    }
    world.enemies.retain(|e| e.pos.0 + e.sprite.frame_size.0 >= 0.0);

    // Contact only counts outside the invulnerability window.
    if world.player_hit {
        return;
    }
    let player_box = player_hit_box(&world.player);
    let mut i = 0;
    while i < world.enemies.len() {
        let enemy_box = Rect::from_entity(
            world.enemies[i].pos,
            world.enemies[i].sprite.render_size,
            SideInsets::NONE,
        );
        if !collision::overlap(&enemy_box, &player_box) {
            i += 1;
            continue;
        }

        world.enemies.remove(i);
        world.lives_count = world.lives_count.saturating_sub(1);
        if world.lives_count > 0 {
            world.player_hit = true;
            world.hit_time = world.game_time;
            events.push(FrameEvent::PlayerHit { lives_left: world.lives_count });
        } else {
            // Terminal: no blink window on the last life.
            world.status = GameStatus::GameOver;
            events.push(FrameEvent::GameOver);
        }
        break;
    }
}
