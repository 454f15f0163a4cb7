//! Cannonade entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use cannonade::audio::{AudioManager, SoundCue};
    use cannonade::consts::*;
    use cannonade::driver::LoopDriver;
    use cannonade::scores;
    use cannonade::sim::{GameEvent, GamePhase};

    /// Real-time cap per frame so a backgrounded tab doesn't replay a burst
    const FRAME_DT_CAP: f32 = SIM_DT * MAX_SUBSTEPS as f32;
    /// Pump rate for wall-time cadences while the frame chain is cancelled
    const PAUSE_PUMP_MS: i32 = 250;

    /// Game instance holding all state
    struct Game {
        driver: LoopDriver,
        ctx: CanvasRenderingContext2d,
        audio: AudioManager,
        last_time: f64,
        /// Pending animation frame, cancelled on pause so no stray update
        /// runs after the freeze
        raf_id: Option<i32>,
        /// Interval that keeps the spawn cadence alive while paused
        pause_pump_id: Option<i32>,
        last_pump_ms: f64,
    }

    impl Game {
        fn new(seed: u64, ctx: CanvasRenderingContext2d) -> Self {
            Self {
                driver: LoopDriver::new(seed),
                ctx,
                audio: AudioManager::new(),
                last_time: 0.0,
                raf_id: None,
                pause_pump_id: None,
                last_pump_ms: 0.0,
            }
        }

        /// Advance the driver and react to its events
        fn update(&mut self, dt: f32) {
            self.driver.advance(dt.min(FRAME_DT_CAP));

            for event in self.driver.drain_events() {
                if let Some(cue) = SoundCue::for_event(&event) {
                    self.audio.play(cue);
                }
                if let GameEvent::GameOver { score } = event {
                    show_game_over(score);
                }
            }

            if let Some(score) = self.driver.final_score() {
                persist_score(score);
            }
        }

        /// Draw the current state to the 2D canvas
        fn draw(&self) {
            let state = self.driver.state();
            let ctx = &self.ctx;

            ctx.clear_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);

            // Obstacles
            ctx.set_fill_style_str("#666666");
            for obstacle in &state.obstacles {
                let r = obstacle.rect;
                ctx.fill_rect(r.x as f64, r.y as f64, r.w as f64, r.h as f64);
            }

            // Targets
            ctx.set_fill_style_str("#ff0000");
            for target in &state.targets {
                ctx.begin_path();
                let _ = ctx.arc(
                    target.pos.x as f64,
                    target.pos.y as f64,
                    target.radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }

            // Projectiles
            ctx.set_fill_style_str("#ffff00");
            for p in &state.projectiles {
                ctx.begin_path();
                let _ = ctx.arc(
                    p.pos.x as f64,
                    p.pos.y as f64,
                    p.radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }

            // Cannon (rotated rect around its pivot)
            ctx.save();
            let _ = ctx.translate(state.cannon.pos.x as f64, state.cannon.pos.y as f64);
            let _ = ctx.rotate(state.cannon.angle as f64);
            ctx.set_fill_style_str("#00ff00");
            ctx.fill_rect(
                -(CANNON_WIDTH as f64) / 2.0,
                -(CANNON_HEIGHT as f64) / 2.0,
                CANNON_WIDTH as f64,
                CANNON_HEIGHT as f64,
            );
            ctx.restore();
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            let state = self.driver.state();
            set_text("score", &state.score.to_string());
            set_text("timer", &state.time_left.to_string());
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            if let Some(el) = document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Reveal the game-over overlay with the final score
    fn show_game_over(score: u32) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        set_text("finalScore", &score.to_string());
        if let Some(el) = document.get_element_by_id("gameOver") {
            let _ = el.class_list().remove_1("d-none");
        }
    }

    /// Fire-and-forget score submission; on success, refresh the list.
    /// Failures only get logged - game state is already settled.
    fn persist_score(score: u32) {
        wasm_bindgen_futures::spawn_local(async move {
            match scores::submit_score(score).await {
                Ok(()) => refresh_score_list().await,
                Err(e) => log::warn!("Score submission failed: {e:?}"),
            }
        });
    }

    async fn refresh_score_list() {
        let board = match scores::fetch_scores().await {
            Ok(board) => board,
            Err(e) => {
                log::warn!("Score refresh failed: {e:?}");
                return;
            }
        };
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(list) = document.get_element_by_id("scoresList") else {
            return;
        };
        list.set_inner_html("");
        for entry in &board.entries {
            if let Ok(li) = document.create_element("li") {
                li.set_text_content(Some(&format!("{} - {}", entry.points, entry.created_at)));
                let _ = list.append_child(&li);
            }
        }
    }

    fn request_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let handle = game.clone();
        let closure = Closure::once(move |time: f64| {
            handle.borrow_mut().raf_id = None;
            frame(handle, time);
        });
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .unwrap();
        game.borrow_mut().raf_id = Some(id);
        closure.forget();
    }

    fn frame(game: Rc<RefCell<Game>>, time: f64) {
        let phase = {
            let mut g = game.borrow_mut();
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.draw();
            g.update_hud();
            g.driver.phase()
        };

        // Re-arm exactly one frame while Running; Paused cancels the chain
        // and Ended stops it for good.
        if phase == GamePhase::Running {
            request_frame(game);
        }
    }

    /// Pause toggle: swaps the frame chain for the slow pause pump (which
    /// keeps the wall-time spawn cadence going) and back.
    fn toggle_pause(game: &Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let mut g = game.borrow_mut();

        match g.driver.phase() {
            GamePhase::Running => {
                g.driver.toggle_pause();
                if let Some(id) = g.raf_id.take() {
                    window.cancel_animation_frame(id).ok();
                }

                let handle = game.clone();
                let closure = Closure::<dyn FnMut()>::new(move || {
                    let mut g = handle.borrow_mut();
                    let now = js_sys::Date::now();
                    let dt = ((now - g.last_pump_ms) / 1000.0) as f32;
                    g.last_pump_ms = now;
                    // Only the spawn cadence moves while paused
                    g.driver.advance(dt);
                    g.draw();
                });
                g.last_pump_ms = js_sys::Date::now();
                if let Ok(id) = window.set_interval_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    PAUSE_PUMP_MS,
                ) {
                    g.pause_pump_id = Some(id);
                }
                closure.forget();
            }
            GamePhase::Paused => {
                g.driver.toggle_pause();
                if let Some(id) = g.pause_pump_id.take() {
                    window.clear_interval_with_handle(id);
                }
                g.last_time = 0.0;
                drop(g);
                request_frame(game.clone());
            }
            GamePhase::Ended => {}
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - aim the cannon
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let aim = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().driver.set_aim(aim);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click - fire
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().driver.fire();
            });
            let _ =
                canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard - pause toggle and restart
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "p" | "P" | "Escape" => toggle_pause(&game),
                    "r" | "R" => {
                        let seed = js_sys::Date::now() as u64;
                        {
                            let window = web_sys::window().unwrap();
                            let mut g = game.borrow_mut();
                            // Drop whatever schedule was active (frame chain
                            // or pause pump) before re-arming a fresh chain
                            if let Some(id) = g.raf_id.take() {
                                window.cancel_animation_frame(id).ok();
                            }
                            if let Some(id) = g.pause_pump_id.take() {
                                window.clear_interval_with_handle(id);
                            }
                            g.driver.restart(seed);
                            g.last_time = 0.0;
                        }
                        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                            if let Some(el) = document.get_element_by_id("gameOver") {
                                let _ = el.class_list().add_1("d-none");
                            }
                        }
                        request_frame(game.clone());
                        log::info!("Game restarted with seed {seed}");
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("missing #gameCanvas")
            .dyn_into()
            .expect("#gameCanvas is not a canvas");
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("get_context failed")
            .expect("no 2d context")
            .dyn_into()
            .expect("context is not 2d");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, ctx)));

        setup_input_handlers(&canvas, game.clone());

        // Populate the high-score list on load
        wasm_bindgen_futures::spawn_local(refresh_score_list());

        // Start the frame chain
        request_frame(game);

        log::info!("Cannonade running (seed {seed})");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cannonade::consts::*;
    use cannonade::driver::LoopDriver;
    use glam::Vec2;

    env_logger::init();
    log::info!("Cannonade (native) starting - headless smoke session");

    // Drive a full 60-second session at fixed steps, firing at the newest
    // target once a second. The web build is the product; this validates the
    // loop end to end.
    let mut driver = LoopDriver::new(0xC4A0);
    let mut elapsed = 0.0f32;
    let mut next_shot = 0.0f32;
    let mut hits = 0u32;

    while driver.phase() != cannonade::sim::GamePhase::Ended {
        driver.advance(SIM_DT);
        elapsed += SIM_DT;
        if elapsed >= next_shot {
            next_shot += 1.0;
            if let Some(target) = driver.state().targets.first() {
                let aim = Vec2::new(target.pos.x, target.pos.y);
                driver.set_aim(aim);
                driver.fire();
            }
        }
        for event in driver.drain_events() {
            if event == cannonade::sim::GameEvent::Hit {
                hits += 1;
            }
        }
    }

    let score = driver.final_score().unwrap_or(0);
    println!("Session complete: {hits} hits, final score {score}");
}
