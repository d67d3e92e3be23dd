/// All game data types — sprites, entities, the player, world state.
///
/// Logic lives in `compute`; this module is data plus the small sprite
/// animation cursor (pure query + explicit advance, never mutated by
/// rendering).

// ── Logical canvas ───────────────────────────────────────────────────────────
//
// The simulation runs in a fixed pixel space; the renderer projects it onto
// whatever surface it has.

pub const CANVAS_W: f32 = 800.0;
pub const CANVAS_H: f32 = 600.0;

/// Height of the strip below the floor line (HUD/earth band).
pub const FLOOR_MARGIN: f32 = 50.0;

// ── Images ───────────────────────────────────────────────────────────────────

/// Identifies the image a sprite samples from.  The renderer resolves these
/// to actual art; the core never touches image data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageId {
    Character,
    /// Parallax layer art, indexed back (0) to front (4).
    BackgroundDeep(usize),
    Coin,
    Crate,
    Crow,
    Rat,
}

// ── Sprite ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One frame strip within an image, plus the animation cursor.
///
/// `advance(dt)` moves the cursor; `current_frame()` is a pure query.  A
/// play-once strip that has exhausted its frames reports `None` and sets
/// `finished` — a terminal per-sprite state, never an error.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub image: ImageId,
    /// Offset of the strip within the image (the character sheet keeps its
    /// facing/idle variants at different origins).
    pub src_origin: (f32, f32),
    /// Size of one source frame.
    pub frame_size: (f32, f32),
    /// On-screen size; collision works on this rectangle.
    pub render_size: (f32, f32),
    /// Playback speed in frames per second.  Zero = static, always frame 0.
    pub speed: f32,
    pub frames: Vec<usize>,
    pub axis: Axis,
    pub once: bool,
    cursor: f32,
    finished: bool,
}

impl Sprite {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        image: ImageId,
        src_origin: (f32, f32),
        frame_size: (f32, f32),
        render_size: (f32, f32),
        speed: f32,
        frames: Vec<usize>,
        axis: Axis,
        once: bool,
    ) -> Self {
        Sprite {
            image,
            src_origin,
            frame_size,
            render_size,
            speed,
            frames,
            axis,
            once,
            cursor: 0.0,
            finished: false,
        }
    }

    /// A single-frame, non-animated sprite.
    pub fn static_image(image: ImageId, size: (f32, f32)) -> Self {
        Sprite::new(image, (0.0, 0.0), size, size, 0.0, vec![0], Axis::Horizontal, false)
    }

    /// Advance the animation cursor by `dt` seconds.  The cursor only ever
    /// grows; a play-once strip flips `finished` when it runs out of frames.
    pub fn advance(&mut self, dt: f32) {
        self.cursor += self.speed * dt;
        if self.once && self.cursor.floor() as usize >= self.frames.len() {
            self.finished = true;
        }
    }

    /// The frame index to draw, or `None` once a play-once strip is spent.
    /// A zero-speed sprite always shows frame 0.
    pub fn current_frame(&self) -> Option<usize> {
        if self.finished {
            return None;
        }
        if self.speed <= 0.0 {
            return Some(0);
        }
        let idx = self.cursor.floor() as usize;
        Some(self.frames[idx % self.frames.len()])
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────

/// A positioned, sprite-bearing world object: coin, crate, enemy or
/// background tile.  Plain composite, no behavior of its own.
#[derive(Clone, Debug)]
pub struct Entity {
    pub pos: (f32, f32),
    pub sprite: Sprite,
    /// Own horizontal speed, on top of the world scroll.  Only enemies use it.
    pub speed: f32,
}

impl Entity {
    pub fn new(pos: (f32, f32), sprite: Sprite) -> Self {
        Entity { pos, sprite, speed: 0.0 }
    }

    pub fn with_speed(pos: (f32, f32), sprite: Sprite, speed: f32) -> Self {
        Entity { pos, sprite, speed }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Forward,
    Backward,
}

// Player tuning.
pub const PLAYER_MAX_SPEED: f32 = 300.0;
pub const PLAYER_GRAVITY: f32 = 35.0;
pub const PLAYER_JUMP_POWER: f32 = 800.0;
pub const GROUND_FRICTION: f32 = 0.8;
pub const AIR_FRICTION: f32 = 0.98;

pub const PLAYER_FRAME_W: f32 = 104.0;
pub const PLAYER_FRAME_H: f32 = 150.0;
pub const PLAYER_RUN_FPS: f32 = 9.0;

/// The player: an entity plus the gravity/ground/jump state machine's data.
/// One instance per session; `compute::reset` repositions it, never recreates.
#[derive(Clone, Debug)]
pub struct PlayerCharacter {
    pub pos: (f32, f32),
    pub sprite: Sprite,
    /// Horizontal speed relative to the world.
    pub speed: f32,
    pub max_speed: f32,
    /// Vertical velocity; accumulates gravity while airborne, zeroed on landing.
    pub gravity_speed: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub friction: f32,
    /// Support height under the player, recomputed each frame from crate tops.
    pub ground: f32,
    pub facing: Facing,
    pub grounded: bool,
}

impl PlayerCharacter {
    pub fn new() -> Self {
        PlayerCharacter {
            pos: (0.0, 0.0),
            sprite: Sprite::new(
                ImageId::Character,
                (0.0, 0.0),
                (PLAYER_FRAME_W, PLAYER_FRAME_H),
                (PLAYER_FRAME_W, PLAYER_FRAME_H),
                PLAYER_RUN_FPS,
                vec![0, 1, 2, 3, 4, 5],
                Axis::Horizontal,
                false,
            ),
            speed: 0.0,
            max_speed: PLAYER_MAX_SPEED,
            gravity_speed: 0.0,
            gravity: PLAYER_GRAVITY,
            jump_power: PLAYER_JUMP_POWER,
            friction: GROUND_FRICTION,
            ground: CANVAS_H - FLOOR_MARGIN,
            facing: Facing::Forward,
            grounded: false,
        }
    }

    /// Start a jump.  Only meaningful from the ground — calling this while
    /// airborne is a no-op.
    pub fn jump(&mut self) {
        if !self.grounded {
            return;
        }
        self.gravity_speed = -self.jump_power;
        self.grounded = false;
        self.friction = AIR_FRICTION;
    }
}

impl Default for PlayerCharacter {
    fn default() -> Self {
        PlayerCharacter::new()
    }
}

// ── Input ────────────────────────────────────────────────────────────────────

/// Polled key state, filled in by the platform loop each frame.  The core
/// only ever asks "is it down right now".
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub jump: bool,
}

// ── Per-frame events ─────────────────────────────────────────────────────────

/// Things that happened during a tick that the loop owner must react to
/// (sound effects, menus, record keeping).  The core never plays sounds or
/// touches the screen itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameEvent {
    Jumped,
    CoinCollected { total: u32 },
    PlayerHit { lives_left: u32 },
    StageComplete,
    GameOver,
}

// ── World state ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Target distance reached; waiting for the host to call `advance_stage`.
    StageComplete,
    GameOver,
}

/// The entire session state.  Mutated exclusively by `compute::tick` and the
/// lifecycle functions; `display::render` is a pure read.
#[derive(Clone, Debug)]
pub struct WorldState {
    pub game_time: f32,
    /// Last whole second at which the speed ramp fired.
    pub time_point: f32,
    pub distance: f32,
    pub target_distance: f32,
    /// World scroll speed, shared by background and entity motion.
    pub global_speed: f32,
    /// Stage cap for `global_speed`.
    pub max_speed: f32,
    /// Added to `global_speed` once per elapsed second.
    pub speed_increaser: f32,
    pub coins_count: u32,
    pub lives_count: u32,
    /// True while the post-hit blink/invulnerability window is open.
    pub player_hit: bool,
    /// `game_time` at which the current blink window opened.
    pub hit_time: f32,
    pub status: GameStatus,
    pub player: PlayerCharacter,
    /// Parallax layers, back to front; each layer holds its wraparound tiles.
    pub background: Vec<Vec<Entity>>,
    pub coins: Vec<Entity>,
    pub crates: Vec<Entity>,
    pub enemies: Vec<Entity>,
    /// Animated coin glyph shown next to the HUD counter.
    pub coin_icon: Sprite,
}
