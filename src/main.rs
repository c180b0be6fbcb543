//! Pixel Arcade entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the
//! web the variant is picked from the URL hash (`#pixel`, `#space`, `#tag`).
//! Natively a headless demo plays a round with a scripted autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use pixel_arcade::audio::WebAudioSink;
    use pixel_arcade::consts::*;
    use pixel_arcade::persistence::default_store;
    use pixel_arcade::platform::InputState;
    use pixel_arcade::sim::GamePhase;
    use pixel_arcade::{Arcade, Tuning, Variant};

    /// Game instance holding all state
    struct Game {
        arcade: Arcade,
        input: InputState,
        audio: WebAudioSink,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(variant: Variant, seed: u64) -> Self {
            Self {
                arcade: Arcade::new(Tuning::for_variant(variant), seed, default_store()),
                input: InputState::new(),
                audio: WebAudioSink::new(),
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.take_tick_input();
                self.arcade.frame(&input);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            let Game { arcade, audio, .. } = self;
            arcade.audio.flush(audio, &arcade.settings);
            audio.pump();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.arcade.hud();
            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set("#hud-title", hud.title);
            set("#hud-score .hud-value", &hud.score.to_string());
            set("#hud-best .hud-value", &hud.best.to_string());
            set("#hud-level .hud-value", &hud.level.to_string());
            let lives: Vec<String> = hud.lives.iter().map(|l| l.to_string()).collect();
            set("#hud-lives .hud-value", &lives.join(" / "));
            set(
                "#hud-timer .hud-value",
                &hud.seconds_left.map(|s| s.to_string()).unwrap_or_default(),
            );

            let status = match hud.phase {
                GamePhase::Menu => format!("{} players - press 1/2, Space to start", hud.players),
                GamePhase::Playing => String::new(),
                GamePhase::GameOver if hud.new_best => {
                    format!("New best: {}! Space to play again, Esc for menu", hud.final_score)
                }
                GamePhase::GameOver => {
                    format!("Final score {} - Space to play again, Esc for menu", hud.final_score)
                }
            };
            set("#hud-status", &status);
        }
    }

    fn variant_from_hash() -> Variant {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .and_then(|hash| Variant::from_str(hash.trim_start_matches('#')))
            .unwrap_or(Variant::PixelEscape)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {err}").into());
        }

        let variant = variant_from_hash();
        let seed = js_sys::Date::now() as u64;
        log::info!("Pixel Arcade starting: {} (seed {})", variant.as_str(), seed);

        let game = Rc::new(RefCell::new(Game::new(variant, seed)));
        setup_input_handlers(game.clone());
        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let code = event.code();
                // Keep arrows and Space from scrolling the page
                if code.starts_with("Arrow") || code == "Space" {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.key_down(&code);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.click();
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Held keys are lost while unfocused
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let variant = args
        .next()
        .and_then(|arg| Variant::from_str(&arg))
        .unwrap_or(Variant::PixelEscape);
    let seed = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(42);
    let tuning = load_tuning(variant);

    log::info!("Pixel Arcade (native) starting: {} seed {}", variant.as_str(), seed);
    log::info!("Headless demo - run with `trunk serve` for the playable web version");

    let mut arcade = Arcade::new(tuning, seed, default_store());
    let mut sink = LogSink;
    let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);

    arcade.frame(&TickInput { start: true, ..TickInput::default() });
    let limit = 60 * consts::SIM_HZ as u64;
    for _ in 0..limit {
        let input = autopilot(&arcade.session, &mut rng);
        arcade.frame(&input);
        arcade.audio.flush(&mut sink, &arcade.settings);
        if arcade.session.phase != GamePhase::Playing {
            break;
        }
    }

    let hud = arcade.hud();
    println!(
        "{}: {:?} after {} ticks, score {}, final {}, best {}, lives {:?}, winner {:?}",
        hud.title,
        hud.phase,
        arcade.session.progression.elapsed_ticks,
        hud.score,
        hud.final_score,
        hud.best,
        hud.lives,
        arcade.session.winner,
    );
}

#[cfg(not(target_arch = "wasm32"))]
use pixel_arcade::{
    Arcade, Tuning, Variant,
    audio::LogSink,
    consts,
    persistence::default_store,
    sim::{ActorInput, ActorRole, GamePhase, GameSession, TickInput},
};
#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rand_pcg::Pcg32;

/// Built-in tuning, or overrides from the JSON file named by `PIXEL_ARCADE_TUNING`
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(variant: Variant) -> Tuning {
    let Ok(path) = std::env::var("PIXEL_ARCADE_TUNING") else {
        return Tuning::for_variant(variant);
    };
    let result = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::with_overrides(variant, &json).map_err(|e| e.to_string()));
    match result {
        Ok(tuning) => {
            log::info!("Loaded tuning overrides from {}", path);
            tuning
        }
        Err(err) => {
            log::warn!("Ignoring tuning overrides from {}: {}", path, err);
            Tuning::for_variant(variant)
        }
    }
}

/// Jittery scripted input so the demo exercises every system
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(session: &GameSession, rng: &mut Pcg32) -> TickInput {
    let mut wander = || ActorInput {
        up: rng.random_bool(0.3),
        down: rng.random_bool(0.2),
        left: rng.random_bool(0.3),
        right: rng.random_bool(0.3),
        action: rng.random_bool(0.2),
    };
    let mut input = TickInput { primary: wander(), secondary: wander(), ..TickInput::default() };

    // The chaser heads for the runner
    if let (Some(chaser), Some(runner)) =
        (session.actor(ActorRole::Chaser), session.actor(ActorRole::Runner))
    {
        let delta = runner.pos - chaser.pos;
        input.primary = ActorInput {
            up: delta.y < -5.0,
            down: delta.y > 5.0,
            left: delta.x < -5.0,
            right: delta.x > 5.0,
            action: true,
        };
    }
    input
}
