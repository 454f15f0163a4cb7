//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod geom;
pub mod state;
pub mod tick;

pub use geom::{Rect, circles_intersect, reflect_off_rect};
pub use state::{Cannon, GameEvent, GamePhase, GameState, Obstacle, Projectile, Target};
pub use tick::{TickInput, countdown_second, fire, spawn_target, tick};
