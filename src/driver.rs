//! Real-time loop driver
//!
//! Bridges wall-clock time to the fixed-step simulation. Three cadences run
//! off accumulated frame deltas:
//! - simulation ticks at 60 Hz, only while Running
//! - the one-second countdown, only while Running (pausing for N seconds
//!   pushes game-over out by N seconds)
//! - the two-second target spawn, which keeps running while Paused (an
//!   inherited quirk of the original game, kept on purpose)
//!
//! Pausing freezes the tick and countdown accumulators in place, so resuming
//! continues exactly where the session left off with a single cadence chain.

use glam::Vec2;

use crate::consts::*;
use crate::sim::{self, GameEvent, GamePhase, GameState, TickInput};

/// Owns a game session and its real-time schedule
#[derive(Debug)]
pub struct LoopDriver {
    state: GameState,
    input: TickInput,
    tick_acc: f32,
    countdown_acc: f32,
    spawn_acc: f32,
    score_reported: bool,
}

impl LoopDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::new(seed),
            input: TickInput::default(),
            tick_acc: 0.0,
            countdown_acc: 0.0,
            spawn_acc: 0.0,
            score_reported: false,
        }
    }

    /// Read-only view of the session for drawing and HUD updates
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Record the latest pointer position
    pub fn set_aim(&mut self, aim: Vec2) {
        self.input.aim = Some(aim);
    }

    /// Fire at the current aim point. Ignored unless Running.
    pub fn fire(&mut self) {
        let aim = self.input.aim.unwrap_or(self.state.aim);
        sim::fire(&mut self.state, aim);
    }

    /// Toggle Running <-> Paused. No effect after Ended.
    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Running => {
                self.state.phase = GamePhase::Paused;
                log::info!("Paused");
            }
            GamePhase::Paused => {
                self.state.phase = GamePhase::Running;
                log::info!("Resumed");
            }
            GamePhase::Ended => {}
        }
    }

    /// Advance all cadences by `real_dt` seconds of wall time.
    ///
    /// Callers on the frame path should clamp `real_dt` (see
    /// [`crate::consts::MAX_SUBSTEPS`]) so a backgrounded tab does not replay
    /// a huge burst of elapsed time in one call.
    pub fn advance(&mut self, real_dt: f32) {
        // Spawn cadence runs on wall time regardless of pause
        if self.state.phase != GamePhase::Ended {
            self.spawn_acc += real_dt;
            while self.spawn_acc >= SPAWN_INTERVAL {
                self.spawn_acc -= SPAWN_INTERVAL;
                sim::spawn_target(&mut self.state);
            }
        }

        if self.state.phase != GamePhase::Running {
            return;
        }

        self.countdown_acc += real_dt;
        while self.countdown_acc >= COUNTDOWN_INTERVAL && self.state.phase == GamePhase::Running {
            self.countdown_acc -= COUNTDOWN_INTERVAL;
            sim::countdown_second(&mut self.state);
        }

        self.tick_acc += real_dt;
        while self.tick_acc >= SIM_DT && self.state.phase == GamePhase::Running {
            self.tick_acc -= SIM_DT;
            let input = self.input;
            sim::tick(&mut self.state, &input);
            // Clear one-shot input after it has been seen by a tick
            self.input.fire = false;
        }
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Final score, yielded exactly once after the Ended transition. Drives
    /// the single POST to the score API.
    pub fn final_score(&mut self) -> Option<u32> {
        if self.state.phase == GamePhase::Ended && !self.score_reported {
            self.score_reported = true;
            Some(self.state.score)
        } else {
            None
        }
    }

    /// Start a fresh session, replacing the current one
    pub fn restart(&mut self, seed: u64) {
        self.state = GameState::new(seed);
        self.input = TickInput::default();
        self.tick_acc = 0.0;
        self.countdown_acc = 0.0;
        self.spawn_acc = 0.0;
        self.score_reported = false;
    }
}
