//! Cannonade - a cannon-vs-falling-targets arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, game state)
//! - `driver`: Fixed-step loop and countdown/spawn cadences
//! - `scores`: High-score persistence boundary (HTTP API)
//! - `audio`: Web Audio sound cues (wasm only)

pub mod driver;
pub mod scores;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use driver::LoopDriver;
pub use scores::ScoreBoard;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Canvas dimensions (fixed-size playfield)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Cannon sits centered this far above the bottom edge
    pub const CANNON_OFFSET_Y: f32 = 30.0;
    pub const CANNON_WIDTH: f32 = 40.0;
    pub const CANNON_HEIGHT: f32 = 20.0;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    /// Distance travelled per simulation tick
    pub const PROJECTILE_SPEED: f32 = 10.0;
    /// Obstacle bounces before a projectile is spent
    pub const MAX_BOUNCES: u32 = 3;

    /// Target defaults
    pub const TARGET_RADIUS: f32 = 15.0;
    pub const TARGET_SPAWN_Y: f32 = 30.0;
    pub const TARGET_SCORE: u32 = 10;

    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 60;
    /// Real-time seconds between target spawns
    pub const SPAWN_INTERVAL: f32 = 2.0;
    /// Real-time seconds between countdown steps
    pub const COUNTDOWN_INTERVAL: f32 = 1.0;
}

/// Angle from one point toward another, in radians
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit step vector for an angle
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
