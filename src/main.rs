//! Perky Jump entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::convert::FromWasmAbi;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{DeviceOrientationEvent, Element, EventTarget, KeyboardEvent, TouchEvent};

    use perky_jump::backend::http::HttpBackend;
    use perky_jump::consts::SIM_DT_MS;
    use perky_jump::haptics::WebHaptics;
    use perky_jump::platform::web::{self, Surface};
    use perky_jump::platform::{Direction, InputState, key_direction, touch_direction};
    use perky_jump::session::{PlayerProfile, REWARD_VALID_SECS, Session};
    use perky_jump::sim::{GameMode, GamePhase};
    use perky_jump::store;
    use perky_jump::theme::Theme;
    use perky_jump::{BackendError, FrameControl, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: Session<WebHaptics>,
        surface: Surface,
        backend: HttpBackend,
        input: InputState,
        theme: Theme,
        last_time: f64,
        /// An animation frame is scheduled
        running: bool,
        /// Countdown interval for timed rounds
        timer_handle: Option<i32>,
    }

    impl Game {
        fn clear_timer(&mut self) {
            if let (Some(handle), Some(window)) = (self.timer_handle.take(), web_sys::window()) {
                window.clear_interval_with_handle(handle);
            }
        }

        fn render(&self) {
            if let Some(view) = self.session.view(&self.theme) {
                if let Err(e) = self.surface.draw(&view) {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }

        fn update_hud(&self) {
            web::set_text("heightScore", &self.session.height().to_string());
            web::set_text("coffeeCount", &self.session.beans().to_string());
            if let Some(left) = self.session.time_left() {
                web::set_text("timeLeft", &left.to_string());
            }
        }

        fn update_profile_displays(&self) {
            let stats = &self.session.profile().stats;
            web::set_text("bestHeight", &stats.best_height.to_string());
            web::set_text("bestCoffee", &stats.best_beans.to_string());
            web::set_text("shopCoins", &stats.total_beans.to_string());
            for listing in store::listings(stats) {
                let id = format!("skin-{}", listing.id);
                web::set_text(&id, &listing.label());
                web::set_active(&id, listing.active);
            }
        }
    }

    fn on<E: FromWasmAbi + 'static>(
        target: &EventTarget,
        event: &str,
        handler: impl FnMut(E) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn on_click(
        id: &str,
        handler: impl FnMut(web_sys::MouseEvent) + 'static,
    ) -> Result<(), JsValue> {
        match web::document()?.get_element_by_id(id) {
            Some(el) => on(&el, "click", handler),
            None => {
                log::warn!("Missing #{id}, button disabled");
                Ok(())
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Perky Jump starting...");
        web::telegram_ready();

        let surface = Surface::bind("gameCanvas")?;
        surface.resize()?;

        let settings = Settings::load();
        let profile = PlayerProfile {
            identity: web::telegram_identity(),
            stats: Default::default(),
        };
        log::info!("Player: {} ({:?})", profile.identity.username, profile.identity.id);

        let session = Session::with_haptics(Tuning::default(), settings, profile, WebHaptics::new())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        web::set_active("vibrationToggle", session.settings().vibration);
        web::set_active("gyroToggle", session.settings().tilt_enabled);

        let game = Rc::new(RefCell::new(Game {
            session,
            surface,
            backend: HttpBackend::default(),
            input: InputState::default(),
            theme: Theme::today(GameMode::Classic.profile().background),
            last_time: 0.0,
            running: false,
            timer_handle: None,
        }));

        setup_input_handlers(&game)?;
        setup_tilt(&game)?;
        setup_buttons(&game)?;
        setup_settings_toggles(&game)?;

        show_menu(&game);
        log::info!("Perky Jump running!");
        Ok(())
    }

    fn setup_input_handlers(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = web::document()?;

        for (event, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            on(&document, event, move |event: KeyboardEvent| {
                if let Some(direction) = key_direction(&event.code()) {
                    game.borrow_mut().input.set(direction, pressed);
                }
            })?;
        }

        let canvas = game.borrow().surface.canvas.clone();
        for (event, pressed) in [("touchstart", true), ("touchend", false)] {
            let game = game.clone();
            let window = window.clone();
            on(&canvas, event, move |event: TouchEvent| {
                event.prevent_default();
                let width = window
                    .inner_width()
                    .ok()
                    .and_then(|w| w.as_f64())
                    .unwrap_or(0.0);
                let touches = event.changed_touches();
                let mut g = game.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        g.input
                            .set(touch_direction(touch.client_x() as f64, width), pressed);
                    }
                }
            })?;
        }

        // On-screen buttons (desktop)
        for (id, direction) in [("leftBtn", Direction::Left), ("rightBtn", Direction::Right)] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for (event, pressed) in [
                ("mousedown", true),
                ("mouseup", false),
                ("mouseleave", false),
            ] {
                let game = game.clone();
                on(&btn, event, move |_event: web_sys::MouseEvent| {
                    game.borrow_mut().input.set(direction, pressed);
                })?;
            }
        }

        // Drop held buttons when the app is backgrounded
        {
            let game = game.clone();
            let doc = document.clone();
            on(&document, "visibilitychange", move |_event: web_sys::Event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().input.release_all();
                }
            })?;
        }

        Ok(())
    }

    fn setup_tilt(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let game = game.clone();
        on(&window, "deviceorientation", move |event: DeviceOrientationEvent| {
            let mut g = game.borrow_mut();
            let gamma = if g.session.settings().tilt_enabled {
                Some(event.gamma().unwrap_or(0.0) as f32)
            } else {
                None
            };
            g.input.set_tilt(gamma);
        })
    }

    fn setup_buttons(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let buttons = web::document()?.query_selector_all(".mode-btn[data-mode]")?;
        for i in 0..buttons.length() {
            let Some(btn) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(mode) = btn
                .get_attribute("data-mode")
                .and_then(|tag| GameMode::from_str(&tag))
            else {
                log::warn!("Mode button with unknown data-mode");
                continue;
            };
            let game = game.clone();
            on(&btn, "click", move |_event: web_sys::MouseEvent| start_round(&game, mode))?;
        }

        {
            let game = game.clone();
            on_click("restartBtn", move |_| {
                let mode = game.borrow().session.settings().last_mode;
                start_round(&game, mode);
            })?;
        }
        {
            let game = game.clone();
            on_click("menuBtn", move |_| show_menu(&game))?;
        }
        on_click("closeBonusBtn", |_| web::set_visible("bonusPopup", false))?;

        for skin in store::SKINS {
            let game = game.clone();
            let id = format!("skin-{}", skin.id);
            if web::document()?.get_element_by_id(&id).is_some() {
                on_click(&id, move |_| select_skin(&game, skin.id))?;
            }
        }
        Ok(())
    }

    fn setup_settings_toggles(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            on_click("vibrationToggle", move |_| {
                let mut g = game.borrow_mut();
                let on = g.session.settings_mut().toggle_vibration();
                g.session.settings().save();
                web::set_active("vibrationToggle", on);
            })?;
        }

        let game = game.clone();
        on_click("gyroToggle", move |_| {
            if game.borrow().session.settings().tilt_enabled {
                let mut g = game.borrow_mut();
                g.session.settings_mut().disable_tilt();
                g.input.set_tilt(None);
                g.session.settings().save();
                web::set_active("gyroToggle", false);
                return;
            }
            match web::orientation_permission_request() {
                Some(promise) => {
                    let game = game.clone();
                    spawn_local(async move {
                        let granted = JsFuture::from(promise)
                            .await
                            .ok()
                            .and_then(|v| v.as_string())
                            .is_some_and(|answer| answer == "granted");
                        resolve_tilt(&game, granted);
                    });
                }
                None => resolve_tilt(&game, true),
            }
        })
    }

    fn resolve_tilt(game: &Rc<RefCell<Game>>, granted: bool) {
        let mut g = game.borrow_mut();
        let on = g.session.settings_mut().resolve_tilt_permission(granted);
        g.session.settings().save();
        web::set_active("gyroToggle", on);
    }

    fn start_round(game: &Rc<RefCell<Game>>, mode: GameMode) {
        let token = {
            let mut g = game.borrow_mut();
            g.clear_timer();
            g.input.release_all();
            g.theme = Theme::today(mode.profile().background);
            let token = g.session.start(mode, js_sys::Date::now() as u64);
            g.session.settings().save();
            g.last_time = 0.0;
            token
        };

        web::set_visible("menuScreen", false);
        web::set_visible("gameOverScreen", false);
        web::set_visible("bonusPopup", false);
        web::set_visible("timeDisplay", token.is_some());

        if let Some(token) = token {
            start_countdown(game, token);
        }

        let idle = !std::mem::replace(&mut game.borrow_mut().running, true);
        if idle {
            request_animation_frame(game.clone());
        }
    }

    fn start_countdown(game: &Rc<RefCell<Game>>, token: u64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = {
            let game = game.clone();
            Closure::<dyn FnMut()>::new(move || {
                let mut g = game.borrow_mut();
                if g.session.on_timer_second(token) || !g.session.is_playing() {
                    g.clear_timer();
                }
                g.update_hud();
            })
        };
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1000,
        ) {
            Ok(handle) => game.borrow_mut().timer_handle = Some(handle),
            Err(e) => log::error!("Failed to start countdown: {:?}", e),
        }
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let control = {
            let mut g = game.borrow_mut();

            let elapsed = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                SIM_DT_MS
            };
            g.last_time = time;

            let input = g.input.sample();
            let control = g.session.frame(elapsed, input);
            g.render();
            g.update_hud();
            control
        };

        match control {
            FrameControl::Continue => request_animation_frame(game),
            FrameControl::Stop => {
                game.borrow_mut().running = false;
                on_round_over(&game);
            }
        }
    }

    fn on_round_over(game: &Rc<RefCell<Game>>) {
        let (pending, backend) = {
            let mut g = game.borrow_mut();
            if g.session.phase() != GamePhase::GameOver {
                return;
            }
            g.clear_timer();
            let Some(outcome) = g.session.last_outcome().cloned() else {
                return;
            };

            web::set_text("finalHeight", &outcome.height.to_string());
            web::set_text("finalCoffee", &outcome.beans.to_string());
            web::set_visible("finalTime", outcome.seconds_played.is_some());
            if let Some(secs) = outcome.seconds_played {
                web::set_text("timeSpent", &secs.to_string());
            }
            web::set_visible("gameOverScreen", true);

            if let Some(reward) = outcome.reward {
                web::set_text("bonusTitle", &reward.title());
                web::set_text("bonusContent", &format!("You collected {} beans!", outcome.beans));
                web::set_text(
                    "bonusTimer",
                    &format!(
                        "⏰ Valid for {}:{:02}",
                        REWARD_VALID_SECS / 60,
                        REWARD_VALID_SECS % 60
                    ),
                );
                web::set_visible("bonusPopup", true);
            }

            g.update_profile_displays();
            (g.session.take_pending(), g.backend.clone())
        };

        if let Some(submission) = pending {
            let game = game.clone();
            spawn_local(async move {
                match backend.submit_round(&submission).await {
                    Ok(stats) => {
                        let mut g = game.borrow_mut();
                        g.session.apply_remote_stats(stats);
                        g.update_profile_displays();
                    }
                    Err(e) => log::warn!("Failed to save stats: {}", e),
                }
            });
        }
    }

    fn show_menu(game: &Rc<RefCell<Game>>) {
        let (backend, user_id) = {
            let mut g = game.borrow_mut();
            g.clear_timer();
            g.session.return_to_menu();
            g.update_profile_displays();
            (g.backend.clone(), g.session.profile().identity.id)
        };
        web::set_visible("gameOverScreen", false);
        web::set_visible("menuScreen", true);

        let game = game.clone();
        spawn_local(async move {
            match backend.fetch_leaderboard().await {
                Ok(board) => web::set_text("leaderboardList", &board.display_lines().join("\n")),
                Err(e) => log::warn!("Failed to load leaderboard: {}", e),
            }
            let Some(user_id) = user_id else {
                return;
            };
            match backend.fetch_stats(user_id).await {
                Ok(stats) => {
                    let mut g = game.borrow_mut();
                    g.session.apply_remote_stats(stats);
                    g.update_profile_displays();
                }
                Err(e) => log::warn!("Failed to fetch stats: {}", e),
            }
        });
    }

    fn select_skin(game: &Rc<RefCell<Game>>, skin_id: &'static str) {
        let (backend, user_id, mut stats) = {
            let g = game.borrow();
            let profile = g.session.profile();
            (g.backend.clone(), profile.identity.id, profile.stats.clone())
        };
        let game = game.clone();
        spawn_local(async move {
            let result = match user_id {
                Some(id) => backend.select_skin(id, &mut stats, skin_id).await,
                None => Err(BackendError::Anonymous),
            };
            match result {
                Ok(action) => {
                    log::info!("Skin '{}': {:?}", skin_id, action);
                    let mut g = game.borrow_mut();
                    g.session.apply_remote_stats(stats);
                    g.update_profile_displays();
                    web::set_text("skinStatus", "");
                }
                Err(e) => {
                    log::warn!("Skin selection failed: {}", e);
                    web::set_text("skinStatus", &e.to_string());
                }
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use perky_jump::backend::{MemoryBackend, PlayerIdentity, StatsBackend};
    use perky_jump::consts::{SIM_DT_MS, SIM_HZ};
    use perky_jump::session::PlayerProfile;
    use perky_jump::sim::GameMode;
    use perky_jump::theme::Theme;
    use perky_jump::{FrameControl, Session, Settings, Tuning};

    env_logger::init();
    log::info!("Perky Jump (native) starting...");
    log::info!("The playable build targets wasm32; running autopiloted rounds");

    let tuning = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading tuning from {}", path);
            Tuning::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Tuning::default(),
    };

    let profile = PlayerProfile {
        identity: PlayerIdentity {
            id: Some(1),
            username: "autopilot".to_string(),
            first_name: None,
        },
        ..Default::default()
    };
    let mut session = Session::new(tuning, Settings::default(), profile)?;
    let mut backend = MemoryBackend::new();

    // Five minutes of game time at most per round
    let max_frames = SIM_HZ * 300;

    for (i, mode) in GameMode::ALL.into_iter().enumerate() {
        let token = session.start(mode, 0xC0FFEE + i as u64);
        for frame in 1..=max_frames {
            let input = session.state().map(autopilot).unwrap_or_default();
            if session.frame(SIM_DT_MS, input) == FrameControl::Stop {
                break;
            }
            // One countdown second per 60 simulated frames
            if let Some(token) = token.filter(|_| frame % SIM_HZ == 0) {
                session.on_timer_second(token);
            }
        }

        if let Some(view) = session.view(&Theme::resolve(1, 1, mode.profile().background)) {
            log::debug!("Final frame: {} bytes of draw list", view.to_json()?.len());
        }
        match session.last_outcome() {
            Some(outcome) => println!(
                "{:>8}: {:>5} m, {:>3} beans ({:?})",
                mode.as_str(),
                outcome.height,
                outcome.beans,
                outcome.reason
            ),
            None => println!("{:>8}: still climbing after {} frames", mode.as_str(), max_frames),
        }
        session.submit_pending(&mut backend);
    }

    let stats = &session.profile().stats;
    println!(
        "\n{} games, best {} m, {} beans banked",
        stats.games_played, stats.best_height, stats.total_beans
    );
    println!("\nLeaderboard:");
    for line in backend.fetch_leaderboard()?.display_lines() {
        println!("  {}", line);
    }
    match backend.select_skin(1, "ninja") {
        Ok(action) => println!("\nNinja skin: {:?}", action),
        Err(e) => println!("\nNinja skin: {}", e),
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Steer toward the centre of the nearest solid platform above the feet
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &perky_jump::sim::GameState) -> perky_jump::sim::TickInput {
    let player = &state.player;
    let x = player.center().x;
    let target = state
        .platforms
        .iter()
        .filter(|p| p.is_solid() && p.top() < player.bottom() - 1.0)
        .max_by(|a, b| a.top().total_cmp(&b.top()))
        .map(|p| p.pos.x + p.width / 2.0);

    perky_jump::sim::TickInput {
        left: target.is_some_and(|t| t < x - 5.0),
        right: target.is_some_and(|t| t > x + 5.0),
        tilt: None,
    }
}
