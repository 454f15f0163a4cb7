//! Fixed timestep simulation tick
//!
//! One call to [`tick`] is one simulation step: advance projectiles, cull
//! off-screen ones, re-aim the cannon, and resolve collisions. The countdown
//! and target-spawn cadences are driven separately by the loop driver; they
//! are real-time schedules, not per-tick work.

use glam::Vec2;
use rand::Rng;

use super::geom::{circles_intersect, reflect_off_rect};
use super::state::{GameEvent, GamePhase, GameState, Projectile, Target};
use crate::consts::*;
use crate::{aim_angle, angle_to_dir};

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Latest pointer position in canvas coordinates
    pub aim: Option<Vec2>,
    /// Fire a projectile this tick (one-shot)
    pub fire: bool,
}

/// Fire a projectile from the cannon toward `aim`.
///
/// Silently ignored unless the session is Running.
pub fn fire(state: &mut GameState, aim: Vec2) {
    if state.phase != GamePhase::Running {
        return;
    }
    let angle = aim_angle(state.cannon.pos, aim);
    let id = state.next_entity_id();
    state
        .projectiles
        .push(Projectile::new(id, state.cannon.pos, angle));
    state.emit(GameEvent::Shoot);
}

/// Advance the simulation by one step. No-op when Paused or Ended.
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Running {
        return;
    }

    if let Some(aim) = input.aim {
        state.aim = aim;
    }
    if input.fire {
        let aim = state.aim;
        fire(state, aim);
    }

    // Advance projectiles and cull the ones that left the canvas. Removal is
    // mark-and-compact: nothing is spliced out mid-iteration.
    for p in &mut state.projectiles {
        p.pos += angle_to_dir(p.angle) * p.speed;
        if p.pos.x < 0.0 || p.pos.x > CANVAS_WIDTH || p.pos.y < 0.0 || p.pos.y > CANVAS_HEIGHT {
            p.alive = false;
        }
    }

    // Cannon tracks the last known aim point
    state.cannon.angle = aim_angle(state.cannon.pos, state.aim);

    resolve_collisions(state);
    state.compact();
}

/// Collision resolution for one tick.
///
/// Per projectile the order is fixed: obstacles first, then targets. A bounce
/// reflects the heading, counts toward the bounce limit, and steps the
/// projectile forward along its new heading so the same obstacle cannot
/// re-trigger within this tick.
fn resolve_collisions(state: &mut GameState) {
    for i in 0..state.projectiles.len() {
        if !state.projectiles[i].alive {
            continue;
        }

        for oi in 0..state.obstacles.len() {
            let rect = state.obstacles[oi].rect;
            let p = &mut state.projectiles[i];
            if !p.alive {
                break;
            }
            if rect.contains_with_padding(p.pos, p.radius) {
                p.angle = reflect_off_rect(p.pos, p.angle, &rect);
                p.bounces += 1;
                p.pos += angle_to_dir(p.angle) * p.speed;
                if p.bounces >= MAX_BOUNCES {
                    p.alive = false;
                }
            }
        }

        let (p_pos, p_radius) = {
            let p = &state.projectiles[i];
            if !p.alive {
                continue;
            }
            (p.pos, p.radius)
        };

        for t in &mut state.targets {
            if !t.alive {
                continue;
            }
            if circles_intersect(p_pos, p_radius, t.pos, t.radius) {
                t.alive = false;
                state.projectiles[i].alive = false;
                state.score += TARGET_SCORE;
                state.events.push(GameEvent::Hit);
                break;
            }
        }
    }
}

/// Append one target at a random x along the top of the canvas.
///
/// Driven by the 2-second real-time cadence, which keeps running while the
/// game is paused (inherited behavior, kept deliberately). Stops at Ended.
pub fn spawn_target(state: &mut GameState) {
    if state.phase == GamePhase::Ended {
        return;
    }
    let x = state
        .rng
        .random_range(TARGET_RADIUS..=CANVAS_WIDTH - TARGET_RADIUS);
    let id = state.next_entity_id();
    state.targets.push(Target {
        id,
        pos: Vec2::new(x, TARGET_SPAWN_Y),
        radius: TARGET_RADIUS,
        alive: true,
    });
}

/// Advance the countdown by one second. Only counts while Running; at zero
/// the session ends and the final score is reported.
pub fn countdown_second(state: &mut GameState) {
    if state.phase != GamePhase::Running {
        return;
    }
    state.time_left = state.time_left.saturating_sub(1);
    if state.time_left == 0 {
        state.phase = GamePhase::Ended;
        let score = state.score;
        state.emit(GameEvent::GameOver { score });
        log::info!("Session over, final score {score}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geom::Rect;
    use crate::sim::state::Obstacle;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Fresh state with no obstacles or targets in the way
    fn clear_state() -> GameState {
        let mut state = GameState::new(1);
        state.obstacles.clear();
        state
    }

    fn push_projectile(state: &mut GameState, pos: Vec2, angle: f32) -> u32 {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(id, pos, angle));
        id
    }

    fn push_target(state: &mut GameState, pos: Vec2) {
        let id = state.next_entity_id();
        state.targets.push(Target {
            id,
            pos,
            radius: TARGET_RADIUS,
            alive: true,
        });
    }

    #[test]
    fn test_motion_advance() {
        let mut state = clear_state();
        push_projectile(&mut state, Vec2::new(400.0, 300.0), 0.25);
        tick(&mut state, &TickInput::default());
        let expected = Vec2::new(400.0, 300.0) + angle_to_dir(0.25) * PROJECTILE_SPEED;
        assert!((state.projectiles[0].pos - expected).length() < 1e-4);
    }

    #[test]
    fn test_off_screen_removed_same_tick() {
        let mut state = clear_state();
        // One step from the right edge: next tick puts it past x = width
        push_projectile(&mut state, Vec2::new(CANVAS_WIDTH - 4.0, 300.0), 0.0);
        tick(&mut state, &TickInput::default());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_fire_creates_projectile_and_event() {
        let mut state = clear_state();
        fire(&mut state, Vec2::new(400.0, 100.0));
        assert_eq!(state.projectiles.len(), 1);
        let p = &state.projectiles[0];
        assert_eq!(p.pos, state.cannon.pos);
        assert!((p.angle - (-FRAC_PI_2)).abs() < 1e-6);
        assert_eq!(p.bounces, 0);
        assert_eq!(state.drain_events(), vec![GameEvent::Shoot]);
    }

    #[test]
    fn test_fire_ignored_when_not_running() {
        let mut state = clear_state();
        state.phase = GamePhase::Paused;
        fire(&mut state, Vec2::new(0.0, 0.0));
        state.phase = GamePhase::Ended;
        fire(&mut state, Vec2::new(0.0, 0.0));
        assert!(state.projectiles.is_empty());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_tick_noop_when_paused() {
        let mut state = clear_state();
        push_projectile(&mut state, Vec2::new(400.0, 300.0), 1.0);
        state.phase = GamePhase::Paused;
        let before = state.projectiles[0];
        tick(&mut state, &TickInput::default());
        let after = state.projectiles[0];
        assert_eq!(before.pos, after.pos);
        assert_eq!(before.angle, after.angle);
        assert_eq!(before.bounces, after.bounces);
    }

    #[test]
    fn test_bounce_reflects_and_counts() {
        let mut state = clear_state();
        state.obstacles.push(Obstacle {
            rect: Rect::new(300.0, 300.0, 100.0, 20.0),
        });
        // Moving straight up; lands just inside the rect's padded lower edge
        push_projectile(&mut state, Vec2::new(349.0, 332.0), -FRAC_PI_2);
        tick(&mut state, &TickInput::default());
        let p = &state.projectiles[0];
        assert_eq!(p.bounces, 1);
        // Vertical flip sends it straight back down, plus the one-step nudge
        assert!((p.angle - FRAC_PI_2).abs() < 1e-6);
        assert!((p.pos.y - 332.0).abs() < 1e-3);
    }

    #[test]
    fn test_two_bounces_stay_live_third_removes() {
        let mut state = clear_state();
        state.obstacles.push(Obstacle {
            rect: Rect::new(300.0, 300.0, 100.0, 20.0),
        });
        push_projectile(&mut state, Vec2::new(349.0, 332.0), -FRAC_PI_2);
        state.projectiles[0].bounces = 1;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].bounces, 2);

        // Send it back at the obstacle for the final bounce
        state.projectiles[0].pos = Vec2::new(349.0, 332.0);
        state.projectiles[0].angle = -FRAC_PI_2;
        tick(&mut state, &TickInput::default());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_hit_scores_and_removes_both() {
        let mut state = clear_state();
        // After one step the projectile sits at (103, 100), 3 units from the
        // target center: 3 < 5 + 15, so both go and the score bumps by 10.
        push_projectile(&mut state, Vec2::new(93.0, 100.0), 0.0);
        push_target(&mut state, Vec2::new(106.0, 100.0));
        tick(&mut state, &TickInput::default());
        assert!(state.projectiles.is_empty());
        assert!(state.targets.is_empty());
        assert_eq!(state.score, TARGET_SCORE);
        assert_eq!(state.drain_events(), vec![GameEvent::Hit]);
    }

    #[test]
    fn test_one_projectile_takes_one_target() {
        let mut state = clear_state();
        push_projectile(&mut state, Vec2::new(93.0, 100.0), 0.0);
        // Two overlapping targets; the projectile is spent on the first
        push_target(&mut state, Vec2::new(106.0, 100.0));
        push_target(&mut state, Vec2::new(108.0, 100.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, TARGET_SCORE);
        assert_eq!(state.targets.len(), 1);
    }

    #[test]
    fn test_obstacles_checked_before_targets() {
        let mut state = clear_state();
        state.obstacles.push(Obstacle {
            rect: Rect::new(300.0, 300.0, 100.0, 20.0),
        });
        // The contact point overlaps the target circle, but the bounce is
        // resolved first and nudges the projectile out of range.
        push_projectile(&mut state, Vec2::new(349.0, 332.0), -FRAC_PI_2);
        push_target(&mut state, Vec2::new(349.0, 305.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.projectiles[0].bounces, 1);
    }

    #[test]
    fn test_spawn_target_bounds() {
        let mut state = clear_state();
        for _ in 0..50 {
            spawn_target(&mut state);
        }
        assert_eq!(state.targets.len(), 50);
        for t in &state.targets {
            assert!(t.pos.x >= TARGET_RADIUS);
            assert!(t.pos.x <= CANVAS_WIDTH - TARGET_RADIUS);
            assert_eq!(t.pos.y, TARGET_SPAWN_Y);
            assert_eq!(t.radius, TARGET_RADIUS);
        }
    }

    #[test]
    fn test_spawn_continues_while_paused_stops_when_ended() {
        let mut state = clear_state();
        state.phase = GamePhase::Paused;
        spawn_target(&mut state);
        assert_eq!(state.targets.len(), 1);
        state.phase = GamePhase::Ended;
        spawn_target(&mut state);
        assert_eq!(state.targets.len(), 1);
    }

    #[test]
    fn test_spawns_deterministic_per_seed() {
        let mut a = GameState::new(9);
        let mut b = GameState::new(9);
        for _ in 0..10 {
            spawn_target(&mut a);
            spawn_target(&mut b);
        }
        let xs_a: Vec<f32> = a.targets.iter().map(|t| t.pos.x).collect();
        let xs_b: Vec<f32> = b.targets.iter().map(|t| t.pos.x).collect();
        assert_eq!(xs_a, xs_b);
    }

    #[test]
    fn test_countdown_ends_session_once() {
        let mut state = clear_state();
        for _ in 0..SESSION_SECONDS {
            countdown_second(&mut state);
        }
        assert_eq!(state.time_left, 0);
        assert_eq!(state.phase, GamePhase::Ended);
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver { score: 0 }]);

        // Further calls change nothing
        countdown_second(&mut state);
        assert_eq!(state.time_left, 0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_countdown_frozen_while_paused() {
        let mut state = clear_state();
        state.phase = GamePhase::Paused;
        countdown_second(&mut state);
        assert_eq!(state.time_left, SESSION_SECONDS);
    }

    #[test]
    fn test_no_mutation_after_ended() {
        let mut state = clear_state();
        push_projectile(&mut state, Vec2::new(400.0, 300.0), 0.0);
        state.phase = GamePhase::Ended;
        tick(&mut state, &TickInput { aim: None, fire: true });
        spawn_target(&mut state);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pos, Vec2::new(400.0, 300.0));
        assert!(state.targets.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_end_to_end_fire_at_target() {
        let mut state = clear_state();
        // Target straight above the cannon, clear line of fire
        push_target(&mut state, Vec2::new(400.0, 100.0));
        fire(&mut state, Vec2::new(400.0, 100.0));
        state.drain_events();

        // 470 units at 10/tick; intersection (< 20 units apart) by tick 46
        let mut hit_tick = None;
        for n in 1..=60 {
            tick(&mut state, &TickInput::default());
            if state.score > 0 {
                hit_tick = Some(n);
                break;
            }
        }
        assert_eq!(hit_tick, Some(46));
        assert_eq!(state.score, TARGET_SCORE);
        assert!(state.projectiles.is_empty());
        assert!(state.targets.is_empty());
        assert_eq!(state.drain_events(), vec![GameEvent::Hit]);
    }

    proptest! {
        #[test]
        fn prop_motion_is_exact_step(
            x in 100.0f32..700.0,
            y in 100.0f32..500.0,
            angle in -PI..PI,
        ) {
            let mut state = clear_state();
            push_projectile(&mut state, Vec2::new(x, y), angle);
            tick(&mut state, &TickInput::default());
            let expected = Vec2::new(x, y) + angle_to_dir(angle) * PROJECTILE_SPEED;
            prop_assert!((state.projectiles[0].pos - expected).length() < 1e-3);
        }

        #[test]
        fn prop_reflection_is_involutive(
            dx in -49.0f32..49.0,
            dy in -9.0f32..9.0,
            angle in -PI..PI,
        ) {
            let rect = Rect::new(300.0, 300.0, 100.0, 20.0);
            let pos = rect.center() + Vec2::new(dx, dy);
            let once = reflect_off_rect(pos, angle, &rect);
            let twice = reflect_off_rect(pos, once, &rect);
            prop_assert!((twice - angle).abs() < 1e-4);
        }
    }
}
