//! Stick Sort entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, PointerEvent};

    use stick_sort::audio::WebAudio;
    use stick_sort::catalog::{
        ALL_STICKS, StickId, level_bar_asset_key, portal_asset_key, stick_asset_key,
    };
    use stick_sort::hitbox::RgbaImage;
    use stick_sort::leaderboard::{Leaderboard, LeaderboardEntry};
    use stick_sort::persistence::GameStore;
    use stick_sort::platform::{ImageStore, LocalStorage};
    use stick_sort::ui::PORTAL_FRAME_COUNT;
    use stick_sort::{Game, GameEvent, Settings, Tuning};

    /// Browser shell around the game core
    struct App {
        game: Game,
        settings: Settings,
        leaderboard: Leaderboard,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        sticks: HashMap<StickId, HtmlImageElement>,
        portal_frames: Vec<HtmlImageElement>,
        last_time: f64,
        last_level_frame: u8,
        shop_dirty: bool,
    }

    impl App {
        /// Canvas-space point for a pointer event (the canvas may be CSS-scaled)
        fn canvas_point(&self, event: &PointerEvent) -> Vec2 {
            let layout = &self.game.tuning().layout;
            let w = self.canvas.client_width().max(1) as f32;
            let h = self.canvas.client_height().max(1) as f32;
            Vec2::new(
                event.offset_x() as f32 * layout.canvas_width / w,
                event.offset_y() as f32 * layout.canvas_height / h,
            )
        }

        fn update(&mut self, dt: f32) {
            // Clamp long frames (tab switches) so tweens don't jump
            self.game.tick(dt.min(0.1));

            let mut submit = false;
            for event in self.game.drain_events() {
                match event {
                    GameEvent::SortComplete(reward) => {
                        submit = true;
                        set_text("reward-text", &format!("+{} XP | +{} 💎", reward.xp_earned, reward.diamonds_earned));
                        set_hidden("success-message", false);
                    }
                    GameEvent::Reshuffled => set_hidden("success-message", true),
                    GameEvent::Purchased { .. } | GameEvent::StateReplaced => self.shop_dirty = true,
                    GameEvent::Prestiged(outcome) => {
                        submit = true;
                        self.shop_dirty = true;
                        set_text("prestige-welcome", &format!("Prestige {}: XP x{:.2}", outcome.prestige_level, outcome.xp_multiplier));
                    }
                    GameEvent::PortalFinished => set_hidden("portal-overlay", true),
                    GameEvent::LevelUp(level) => log::info!("Reached level {}", level),
                    _ => {}
                }
            }

            if submit {
                self.submit_score();
            }
        }

        /// Record the player's row in the cached board
        fn submit_score(&mut self) {
            if self.settings.player_name.is_empty() {
                return;
            }
            let entry = LeaderboardEntry::for_player(&self.settings.player_name, self.game.progress());
            if let Some(rank) = self.leaderboard.submit(entry) {
                log::info!("Leaderboard rank {}", rank);
            }
            if let Ok(storage) = LocalStorage::open() {
                if let Err(e) = self.leaderboard.save_to(&storage) {
                    log::warn!("Failed to cache leaderboard: {}", e);
                }
            }
        }

        fn render(&self) -> Result<(), JsValue> {
            let ctx = &self.ctx;
            let layout = &self.game.tuning().layout;
            ctx.clear_rect(0.0, 0.0, layout.canvas_width as f64, layout.canvas_height as f64);

            // Held stick last so it draws on top
            let held = match self.game.drag_state() {
                stick_sort::sim::DragState::Dragging { id, .. } => Some(id),
                _ => None,
            };
            let board = self.game.board();
            for stick in board.sticks_in_order().filter(|s| Some(s.id) != held) {
                self.draw_stick(stick)?;
            }
            if let Some(stick) = held.and_then(|id| board.stick(id)) {
                self.draw_stick(stick)?;
            }

            if let Some(portal) = self.game.portal() {
                self.draw_portal(portal)?;
            }
            Ok(())
        }

        fn draw_stick(&self, stick: &stick_sort::sim::Stick) -> Result<(), JsValue> {
            let Some(image) = self.sticks.get(&stick.id) else {
                return Ok(());
            };
            let size = stick.display_size();
            self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                stick.pos.x as f64,
                stick.pos.y as f64,
                size.x as f64,
                size.y as f64,
            )
        }

        fn draw_portal(&self, portal: &stick_sort::ui::PortalAnimation) -> Result<(), JsValue> {
            let ctx = &self.ctx;
            let layout = &self.game.tuning().layout;
            let (w, h) = (layout.canvas_width as f64, layout.canvas_height as f64);

            let fade = 1.0 - portal.fade() as f64;
            if portal.phase() != stick_sort::ui::PortalPhase::Reverse {
                ctx.set_fill_style_str(&format!(
                    "rgb({}, {}, {})",
                    (74.0 * fade) as u8,
                    (144.0 * fade) as u8,
                    (184.0 * fade) as u8
                ));
                ctx.fill_rect(0.0, 0.0, w, h);
            }

            let Some(frame) = self.portal_frames.get(portal.frame()) else {
                return Ok(());
            };
            let size = w * portal.scale() as f64;
            ctx.save();
            ctx.translate(w / 2.0, h / 2.0)?;
            ctx.rotate(portal.rotation() as f64)?;
            ctx.draw_image_with_html_image_element_and_dw_and_dh(frame, -size / 2.0, -size / 2.0, size, size)?;
            ctx.restore();
            Ok(())
        }

        fn update_hud(&mut self) {
            let progress = self.game.progress();
            set_text("diamond-count", &progress.diamonds.to_string());
            set_text("level-number", &format!("Lvl {}", progress.level));
            set_text("xp-current", &progress.current_xp.to_string());
            set_text("xp-needed", &(progress.current_xp + self.game.xp_to_next_level()).to_string());
            set_text("info-total-sorts", &progress.total_sorts.to_string());
            set_text("info-xp-mult", &format!("x{:.2}", progress.xp_multiplier));
            set_hidden("portal-button-container", !self.game.is_portal_available());

            let frame = self.game.level_bar().frame();
            if frame != self.last_level_frame {
                self.last_level_frame = frame;
                if let Some(bar) = element("level-bar").and_then(|el| el.dyn_into::<HtmlImageElement>().ok()) {
                    bar.set_src(&level_bar_asset_key(frame));
                }
            }

            if self.shop_dirty {
                self.shop_dirty = false;
                self.render_shop();
            }
        }

        fn render_shop(&self) {
            let Some(list) = element("shop-list") else { return };
            let html: String = self
                .game
                .shop_items()
                .iter()
                .map(|item| {
                    let state = if item.owned {
                        "owned"
                    } else if item.affordable {
                        "affordable"
                    } else {
                        "locked"
                    };
                    format!(
                        "<button class=\"shop-item {}\" data-stick=\"{}\">{} - {} 💎</button>",
                        state, item.stick_id, item.seller, item.price
                    )
                })
                .collect();
            list.set_inner_html(&html);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element(id: &str) -> Option<web_sys::Element> {
        document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = element(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Load and decode an image
    async fn load_image(src: &str) -> Result<HtmlImageElement, JsValue> {
        let image = HtmlImageElement::new()?;
        image.set_src(src);
        JsFuture::from(image.decode()).await?;
        Ok(image)
    }

    /// Read back the RGBA pixels of a decoded image
    fn read_pixels(document: &Document, image: &HtmlImageElement) -> Result<RgbaImage, JsValue> {
        let (w, h) = (image.natural_width(), image.natural_height());
        let scratch: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        scratch.set_width(w);
        scratch.set_height(h);
        let ctx: CanvasRenderingContext2d = scratch
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;
        let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64)?;
        RgbaImage::new(w, h, data.data().0).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Stick Sort starting...");

        let document = document().ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let tuning = Tuning::default();
        canvas.set_width(tuning.layout.canvas_width as u32);
        canvas.set_height(tuning.layout.canvas_height as u32);

        // Decode every stick up front; the core only sees pixels
        let mut images = ImageStore::new();
        let mut sticks = HashMap::new();
        for id in ALL_STICKS {
            match load_image(&stick_asset_key(id)).await {
                Ok(image) => {
                    match read_pixels(&document, &image) {
                        Ok(pixels) => images.insert(id, pixels),
                        Err(e) => log::warn!("Cannot read pixels of stick {}: {:?}", id, e),
                    }
                    sticks.insert(id, image);
                }
                Err(e) => log::warn!("Failed to load stick {}: {:?}", id, e),
            }
        }
        let mut portal_frames = Vec::with_capacity(PORTAL_FRAME_COUNT);
        for i in 0..PORTAL_FRAME_COUNT {
            if let Ok(frame) = load_image(&portal_asset_key(i)).await {
                portal_frames.push(frame);
            }
        }

        let storage = LocalStorage::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let settings = Settings::load();
        let leaderboard = Leaderboard::load_from(&storage);
        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(
            tuning,
            Box::new(images),
            GameStore::new(Box::new(storage)),
            Box::new(WebAudio::new()),
            seed,
        );
        game.apply_settings(&settings);
        for issue in game.load_issues() {
            log::warn!("{}", issue);
        }

        let app = Rc::new(RefCell::new(App {
            game,
            settings,
            leaderboard,
            ctx,
            canvas: canvas.clone(),
            sticks,
            portal_frames,
            last_time: 0.0,
            last_level_frame: 0,
            shop_dirty: true,
        }));

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        setup_pointer_handlers(&canvas, app.clone());
        setup_buttons(app.clone());
        request_animation_frame(app);

        log::info!("Stick Sort running!");
        Ok(())
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                let p = a.canvas_point(&event);
                a.game.pointer_down(p);
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
            });
            let _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                let p = a.canvas_point(&event);
                a.game.pointer_move(p);
            });
            let _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release, cancel and leave all end the drag
        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().game.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, app: Rc<RefCell<App>>, mut handler: impl FnMut(&mut App, web_sys::Event) + 'static) {
        let Some(el) = element(id) else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            handler(&mut app.borrow_mut(), event);
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        on_click("shop-list", app.clone(), |a, event| {
            let id = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.get_attribute("data-stick"))
                .and_then(|v| v.parse::<StickId>().ok());
            if let Some(id) = id {
                match a.game.purchase(id) {
                    Ok(price) => log::info!("Purchased stick {} for {}", id, price),
                    Err(e) => log::info!("Purchase rejected: {}", e),
                }
                a.shop_dirty = true;
            }
        });

        on_click("portal-btn", app.clone(), |_, _| set_hidden("portal-confirm-overlay", false));
        on_click("portal-confirm-no-btn", app.clone(), |_, _| set_hidden("portal-confirm-overlay", true));
        on_click("portal-confirm-yes-btn", app.clone(), |a, _| {
            set_hidden("portal-confirm-overlay", true);
            match a.game.open_portal() {
                Ok(()) => set_hidden("portal-overlay", false),
                Err(e) => log::warn!("{}", e),
            }
        });

        on_click("settings-save-btn", app.clone(), |a, _| {
            let volume = |id: &str| {
                element(id)
                    .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                    .and_then(|input| input.value().parse::<u8>().ok())
            };
            if let Some(v) = volume("music-volume") {
                a.settings.set_music_volume(v);
            }
            if let Some(v) = volume("sfx-volume") {
                a.settings.set_sfx_volume(v);
            }
            if let Some(name) = element("player-name")
                .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                .map(|input| input.value())
            {
                a.settings.set_player_name(&name);
            }
            a.settings.save();
            a.game.apply_settings(&a.settings);
        });

        on_click("leaderboard-btn", app.clone(), |a, _| {
            let rows: String = a
                .leaderboard
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| format!("<li>{}. {} - {} XP (Lvl {})</li>", i + 1, e.name, e.total_xp, e.level))
                .collect();
            if let Some(list) = element("leaderboard-list") {
                list.set_inner_html(&rows);
            }
            set_hidden("leaderboard-overlay", false);
        });
        on_click("leaderboard-close-btn", app.clone(), |_, _| set_hidden("leaderboard-overlay", true));

        on_click("reset-btn", app, |a, _| {
            if let Err(e) = a.game.full_reset() {
                log::error!("Reset failed: {}", e);
            }
        });
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            a.last_time = time;

            a.update(dt);
            if let Err(e) = a.render() {
                log::warn!("Render error: {:?}", e);
            }
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Stick Sort (native) starting...");
    log::info!("The playable version runs in the browser - build for wasm32 and serve with `trunk serve`");

    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless session: sort the row by simulated drags and report the payout
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use stick_sort::audio::NullAudio;
    use stick_sort::catalog::ALL_STICKS;
    use stick_sort::hitbox::RgbaImage;
    use stick_sort::persistence::GameStore;
    use stick_sort::platform::{ImageStore, MemoryStorage};
    use stick_sort::{Game, GameEvent, Tuning};

    const DT: f32 = 1.0 / 60.0;

    /// Plain sticks: an opaque bar with transparent margins
    fn synthetic_images() -> ImageStore {
        let mut store = ImageStore::new();
        for id in ALL_STICKS {
            let mut image = RgbaImage::filled(60, 400 + id as u32 * 20, [0, 0, 0, 0]);
            let width = image.width();
            for (i, texel) in image.texels_mut().iter_mut().enumerate() {
                if (15..45).contains(&(i as u32 % width)) {
                    *texel = [150, 100, 50, 255];
                }
            }
            store.insert(id, image);
        }
        store
    }

    fn run_for(game: &mut Game, seconds: f32) {
        for _ in 0..(seconds / DT).ceil() as usize {
            game.tick(DT);
        }
    }

    pub fn run() {
        let mut game = Game::new(
            Tuning::default(),
            Box::new(synthetic_images()),
            GameStore::new(Box::new(MemoryStorage::new())),
            Box::new(NullAudio),
            42,
        );
        log::info!("Dealt row: {:?}", game.board().arrangement());

        let mut moves = 0;
        while !game.board().is_sorted() && moves < 32 {
            let order = game.board().arrangement().to_vec();
            let mut want = order.clone();
            want.sort_unstable();
            let Some(i) = (0..order.len()).find(|&i| order[i] != want[i]) else {
                break;
            };

            let point = |id| {
                game.board()
                    .stick(id)
                    .map(|s| Vec2::new(s.content_center_x(s.pos.x), s.pos.y + 40.0))
                    .unwrap_or(Vec2::ZERO)
            };
            let (from, to) = (point(want[i]), point(order[i]) - Vec2::new(1.0, 0.0));
            game.pointer_down(from);
            game.pointer_move(to);
            game.pointer_up();
            run_for(&mut game, 0.3);
            moves += 1;
            log::info!("Move {}: {:?}", moves, game.board().arrangement());
        }

        for event in game.drain_events() {
            if let GameEvent::SortComplete(reward) = event {
                log::info!(
                    "Sorted in {} moves: +{} XP, +{} diamonds (level {})",
                    moves,
                    reward.xp_earned,
                    reward.diamonds_earned,
                    reward.new_level
                );
            }
        }
        run_for(&mut game, 2.0);
        log::info!("Next row: {:?}", game.board().arrangement());
    }
}
