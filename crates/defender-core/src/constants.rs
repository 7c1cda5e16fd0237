//! Simulation constants and tuning parameters.

/// Nominal simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the nominal rate.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Longest frame the simulation will integrate in one tick (seconds).
/// Larger gaps (debugger pauses, window drags) are clamped to this.
pub const MAX_FRAME_DT: f64 = 0.1;

// --- World bounds ---

/// Default map width; also the wrap modulus.
pub const MAP_WIDTH: f64 = 64.0;

/// Default map height, centred on y = 0.
pub const MAP_HEIGHT: f64 = 16.0;

// --- Camera ---

/// Gap beyond which the camera jumps straight to its target.
pub const CAMERA_SNAP_DISTANCE: f64 = 10.0;

/// Fraction of the follow speed used when the ship is slow or reversing.
pub const CAMERA_SLOW_FOLLOW_FRACTION: f64 = 0.3;

/// Half of the horizontal extent visible through the camera.
pub const CAMERA_VIEW_HALF_WIDTH: f64 = 10.0;

// --- Player ship ---

pub const PLAYER_LIVES: u32 = 5;
pub const PLAYER_MAX_SPEED_X: f64 = 20.0;
pub const PLAYER_MAX_SPEED_Y: f64 = 10.0;
pub const PLAYER_ACCELERATION_X: f64 = 50.0;
pub const PLAYER_ACCELERATION_Y: f64 = 10_000.0;
pub const PLAYER_BRAKE_DAMPING_X: f64 = 2.0;
pub const PLAYER_BRAKE_DAMPING_Y: f64 = 100.0;

/// Seconds between shots while fire is held.
pub const PLAYER_FIRE_RATE: f64 = 0.1;

/// Max-speed fraction at the smallest non-zero stick deflection.
pub const PLAYER_MIN_SPEED_FRACTION: f64 = 0.2;

/// Distance kept from the top/bottom edge of the play area.
pub const PLAYER_VERTICAL_MARGIN: f64 = 0.3;

/// Camera lead ahead of the ship in the facing direction.
pub const PLAYER_CAMERA_OFFSET_X: f64 = 4.0;

pub const PLAYER_CAMERA_FOLLOW_SPEED: f64 = 10.0;

// --- Enemies ---

pub const ENEMY_SPEED: f64 = 2.0;

/// Expected horizontal direction flips per second.
pub const ENEMY_FLIP_RATE: f64 = 0.5;

/// Vertical component of the patrol direction.
pub const ENEMY_VERTICAL_STEP: f64 = 0.5;

/// Distance from the vertical edges at which an enemy bounces.
pub const ENEMY_EDGE_MARGIN: f64 = 1.0;

pub const ENEMY_SCORE_VALUE: u64 = 100;

/// Seconds between enemy shots while the enemy is on screen.
pub const ENEMY_FIRE_INTERVAL: f64 = 2.0;

// --- Projectiles ---

pub const PLAYER_PROJECTILE_SPEED: f64 = 30.0;
pub const PLAYER_PROJECTILE_LIFETIME: f64 = 1.0;
pub const ENEMY_PROJECTILE_SPEED: f64 = 4.0;
pub const ENEMY_PROJECTILE_LIFETIME: f64 = 5.0;

/// Extra travel past the hit point so the last frame shows the impact.
pub const HIT_EPSILON: f64 = 0.01;

/// Trail points kept for player projectiles.
pub const PROJECTILE_TRAIL_LENGTH: usize = 5;

// --- Effects ---

pub const DEATH_EFFECT_DURATION: f64 = 0.5;

// --- Spawner ---

pub const SPAWN_INTERVAL_MIN: f64 = 2.0;
pub const SPAWN_INTERVAL_MAX: f64 = 8.0;
pub const SPAWN_MAX_ALIVE: usize = 6;
