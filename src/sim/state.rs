//! Game state and core simulation types
//!
//! Everything the simulation mutates lives here; the presentation layer only
//! ever sees `&GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Frozen; entity state preserved exactly for resumption
    Paused,
    /// Countdown hit zero; terminal
    Ended,
}

/// Discrete events emitted by the simulation, drained each frame by the
/// presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A projectile was fired ("shoot" cue)
    Shoot,
    /// A target was destroyed ("hit" cue)
    Hit,
    /// The countdown expired; carries the final score
    GameOver { score: u32 },
}

/// The player's cannon. Position is fixed; the barrel angle tracks the aim
/// point every tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cannon {
    pub pos: Vec2,
    pub angle: f32,
}

impl Default for Cannon {
    fn default() -> Self {
        Self {
            pos: Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - CANNON_OFFSET_Y),
            angle: 0.0,
        }
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Heading in radians; mutated by obstacle bounces
    pub angle: f32,
    /// Distance per tick, constant after creation
    pub speed: f32,
    pub radius: f32,
    /// Obstacle reflections so far; removed at MAX_BOUNCES
    pub bounces: u32,
    /// Cleared to mark for removal; compacted at end of tick
    pub alive: bool,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, angle: f32) -> Self {
        Self {
            id,
            pos,
            angle,
            speed: PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
            bounces: 0,
            alive: true,
        }
    }
}

/// A target waiting to be shot
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Cleared to mark for removal; compacted at end of tick
    pub alive: bool,
}

/// A static rectangular obstacle; defined at game start, never destroyed
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
}

/// Obstacle layout for the default playfield
pub fn default_obstacles() -> Vec<Obstacle> {
    [
        Rect::new(100.0, 200.0, 20.0, 100.0),
        Rect::new(300.0, 300.0, 100.0, 20.0),
        Rect::new(500.0, 150.0, 20.0, 150.0),
        Rect::new(600.0, 400.0, 150.0, 20.0),
    ]
    .into_iter()
    .map(|rect| Obstacle { rect })
    .collect()
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Spawn RNG; serialized so a restored session spawns identically
    pub rng: Pcg32,
    /// Score, +TARGET_SCORE per destroyed target
    pub score: u32,
    /// Whole seconds remaining in the session
    pub time_left: u32,
    /// Current phase
    pub phase: GamePhase,
    /// Last known aim point (pointer position in canvas coordinates)
    pub aim: Vec2,
    pub cannon: Cannon,
    /// Live projectiles (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    /// Live targets (sorted by id for determinism)
    pub targets: Vec<Target>,
    /// Static obstacles
    pub obstacles: Vec<Obstacle>,
    /// Events queued since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh session with the given spawn seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            time_left: SESSION_SECONDS,
            phase: GamePhase::Running,
            aim: Vec2::new(CANVAS_WIDTH / 2.0, 0.0),
            cannon: Cannon::default(),
            projectiles: Vec::new(),
            targets: Vec::new(),
            obstacles: default_obstacles(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue an event for the presentation layer
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events, leaving the queue empty
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop entities marked dead during the last pass
    pub fn compact(&mut self) {
        self.projectiles.retain(|p| p.alive);
        self.targets.retain(|t| t.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_left, SESSION_SECONDS);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.projectiles.is_empty());
        assert!(state.targets.is_empty());
        assert_eq!(state.obstacles.len(), 4);
        assert_eq!(state.cannon.pos, Vec2::new(400.0, 570.0));
    }

    #[test]
    fn test_entity_ids_monotonic() {
        let mut state = GameState::new(0);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_compact_drops_dead() {
        let mut state = GameState::new(0);
        let id = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(id, Vec2::new(10.0, 10.0), 0.0));
        state.projectiles[0].alive = false;
        let id = state.next_entity_id();
        state.targets.push(Target {
            id,
            pos: Vec2::new(50.0, 30.0),
            radius: TARGET_RADIUS,
            alive: true,
        });
        state.compact();
        assert!(state.projectiles.is_empty());
        assert_eq!(state.targets.len(), 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = GameState::new(42);
        state.score = 30;
        state.time_left = 12;
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.score, 30);
        assert_eq!(restored.time_left, 12);
        assert_eq!(restored.phase, GamePhase::Running);
        assert_eq!(restored.obstacles.len(), state.obstacles.len());
    }
}
