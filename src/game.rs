//! Game controller
//!
//! Owns every service (board, drag, progress, storage, audio, animations)
//! and turns pointer input and frame ticks into state changes. Callers
//! read what happened through [`Game::drain_events`].
//!
//! Phases:
//! - `Playing`: pointer input drives the drag controller
//! - `Celebrating`: row was sorted, success message is up, input ignored
//! - `Portal`: portal animation running, prestige applied mid-way

use glam::Vec2;

use crate::audio::{AudioSink, SoundCue};
use crate::catalog::StickId;
use crate::error::{GameError, GameResult};
use crate::hitbox::HitboxCache;
use crate::persistence::GameStore;
use crate::platform::AssetProvider;
use crate::progression::{self, PrestigeBonus, PrestigeOutcome, ProgressState, ShopItem, SortReward};
use crate::settings::Settings;
use crate::sim::{Board, DragController, DragEvent, DragState};
use crate::tuning::Tuning;
use crate::ui::{LevelBar, LevelShown, PortalAnimation, PortalSignal, level_bar_frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamePhase {
    Playing,
    /// Seconds left on the success message
    Celebrating { remaining: f32 },
    Portal,
}

/// Everything the outside world may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PickedUp(StickId),
    Dropped(StickId),
    SortComplete(SortReward),
    LevelUp(u32),
    /// Level bar finished filling for this level
    LevelShown(u32),
    /// Success message over, a fresh row is dealt
    Reshuffled,
    Purchased { id: StickId, price: u64 },
    PortalOpened,
    Prestiged(PrestigeOutcome),
    PortalFinished,
    StateReplaced,
}

/// Level bar animation waiting for the success message to clear
#[derive(Debug, Clone, Copy)]
struct PendingBar {
    start: u8,
    leveled_up: Option<u32>,
}

pub struct Game {
    tuning: Tuning,
    assets: Box<dyn AssetProvider>,
    hitboxes: HitboxCache,
    board: Board,
    drag: DragController,
    progress: ProgressState,
    store: GameStore,
    audio: Box<dyn AudioSink>,
    level_bar: LevelBar,
    portal: Option<PortalAnimation>,
    phase: GamePhase,
    pending_bar: Option<PendingBar>,
    events: Vec<GameEvent>,
    issues: Vec<GameError>,
}

impl Game {
    /// Load saved progress and deal the first row
    pub fn new(
        tuning: Tuning,
        assets: Box<dyn AssetProvider>,
        store: GameStore,
        audio: Box<dyn AudioSink>,
        seed: u64,
    ) -> Self {
        let progress = store.load();
        let mut game = Self {
            hitboxes: HitboxCache::new(tuning.hitbox),
            board: Board::new(tuning.layout.clone(), seed),
            drag: DragController::new(tuning.motion),
            level_bar: LevelBar::default(),
            tuning,
            assets,
            progress,
            store,
            audio,
            portal: None,
            phase: GamePhase::Playing,
            pending_bar: None,
            events: Vec::new(),
            issues: Vec::new(),
        };
        game.rebuild_board();
        game.level_bar = LevelBar::new(game.bar_frame());
        log::info!(
            "Game ready: level {}, {} sticks, prestige {}",
            game.progress.level,
            game.board.owned().len(),
            game.progress.prestige_level
        );
        game
    }

    // === Input ===

    pub fn pointer_down(&mut self, p: Vec2) {
        // First gesture unlocks browser audio
        self.audio.start_music();
        if self.phase != GamePhase::Playing {
            return;
        }
        if let Some(DragEvent::PickedUp(id)) = self.drag.pointer_down(&self.board, p) {
            self.audio.play(SoundCue::PickUp);
            self.events.push(GameEvent::PickedUp(id));
        }
    }

    pub fn pointer_move(&mut self, p: Vec2) {
        if self.phase == GamePhase::Playing {
            self.drag.pointer_move(&mut self.board, p);
        }
    }

    /// Pointer released, cancelled or left the canvas
    pub fn pointer_up(&mut self) {
        if let Some(DragEvent::Dropped(id)) = self.drag.pointer_up(&mut self.board) {
            self.audio.play(SoundCue::Drop);
            self.events.push(GameEvent::Dropped(id));
        }
    }

    // === Frame ===

    pub fn tick(&mut self, dt: f32) {
        match self.phase {
            GamePhase::Playing => {
                if self.drag.tick(&mut self.board, dt) == Some(DragEvent::SortComplete) {
                    self.on_sort_complete();
                }
            }
            GamePhase::Celebrating { remaining } => {
                self.drag.tick(&mut self.board, dt);
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = GamePhase::Celebrating { remaining };
                } else {
                    self.finish_celebration();
                }
            }
            GamePhase::Portal => self.tick_portal(dt),
        }

        if let Some(LevelShown(level)) = self.level_bar.tick(dt) {
            self.events.push(GameEvent::LevelShown(level));
        }
    }

    fn on_sort_complete(&mut self) {
        let start = self.bar_frame();
        let reward = progression::apply_sort(&mut self.progress, self.board.owned().len(), &self.tuning);
        self.persist();

        self.audio.play(SoundCue::CollectDiamond);
        if reward.leveled_up {
            log::info!("Level up: {}", reward.new_level);
            self.audio.play(SoundCue::LevelUp);
            self.events.push(GameEvent::LevelUp(reward.new_level));
        }
        self.events.push(GameEvent::SortComplete(reward));

        self.pending_bar = Some(PendingBar {
            start,
            leveled_up: reward.leveled_up.then_some(reward.new_level),
        });
        self.phase = GamePhase::Celebrating {
            remaining: self.tuning.motion.success_message_duration,
        };
    }

    fn finish_celebration(&mut self) {
        if let Some(bar) = self.pending_bar.take() {
            let end = self.bar_frame();
            self.level_bar.animate(bar.start, end, bar.leveled_up);
        }
        self.drag.reset(&mut self.board);
        self.board.shuffle();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Reshuffled);
    }

    fn tick_portal(&mut self, dt: f32) {
        let Some(portal) = self.portal.as_mut() else {
            self.phase = GamePhase::Playing;
            return;
        };
        match portal.tick(dt) {
            Some(PortalSignal::GrowComplete) => self.apply_prestige(),
            Some(PortalSignal::Complete) => {
                self.portal = None;
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::PortalFinished);
            }
            None => {}
        }
    }

    fn apply_prestige(&mut self) {
        match progression::activate_portal(&mut self.progress, &self.tuning) {
            Ok(outcome) => {
                self.board.reset();
                self.rebuild_board();
                self.persist();
                self.level_bar.snap(self.bar_frame());
                self.events.push(GameEvent::Prestiged(outcome));
            }
            Err(e) => log::warn!("Portal closed without prestige: {}", e),
        }
    }

    // === Actions ===

    /// Buy a stick and deal a new row including it. Returns the price paid.
    pub fn purchase(&mut self, id: StickId) -> GameResult<u64> {
        if self.phase == GamePhase::Portal {
            return Err(GameError::NotAvailable);
        }
        let price = progression::purchase(&mut self.progress, id, &self.tuning)?;
        self.persist();
        self.audio.play(SoundCue::Purchase);

        self.drag.reset(&mut self.board);
        if let Err(e) = self.board.add_stick(id, self.assets.as_ref(), &mut self.hitboxes) {
            log::warn!("Bought stick {} cannot be shown: {}", id, e);
        }
        self.rebuild_board();
        self.events.push(GameEvent::Purchased { id, price });
        Ok(price)
    }

    /// Start the portal animation. Prestige is applied when it fills the screen.
    pub fn open_portal(&mut self) -> GameResult<()> {
        if self.phase == GamePhase::Portal || !progression::is_portal_available(&self.progress) {
            return Err(GameError::NotAvailable);
        }
        self.drag.reset(&mut self.board);
        self.pending_bar = None;
        self.portal = Some(PortalAnimation::new());
        self.phase = GamePhase::Portal;
        self.audio.play(SoundCue::Portal);
        self.events.push(GameEvent::PortalOpened);
        Ok(())
    }

    /// Copy of the progress, e.g. for a cloud upload
    pub fn snapshot(&self) -> ProgressState {
        self.progress.clone()
    }

    /// Swap in progress from elsewhere (a cloud save that is further along)
    pub fn replace_state(&mut self, mut progress: ProgressState) {
        progress.normalize();
        self.drag.reset(&mut self.board);
        self.progress = progress;
        self.rebuild_board();
        self.persist();
        self.level_bar.snap(self.bar_frame());
        if matches!(self.phase, GamePhase::Celebrating { .. }) {
            self.pending_bar = None;
            self.phase = GamePhase::Playing;
        }
        self.events.push(GameEvent::StateReplaced);
    }

    /// Wipe all progress
    pub fn full_reset(&mut self) -> GameResult<()> {
        let fresh = self.store.full_reset()?;
        self.replace_state(fresh);
        Ok(())
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.audio.set_volume(settings.music_gain(), settings.sfx_gain());
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Queries ===

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn level_bar(&self) -> &LevelBar {
        &self.level_bar
    }

    pub fn portal(&self) -> Option<&PortalAnimation> {
        self.portal.as_ref()
    }

    pub fn shop_items(&self) -> Vec<ShopItem> {
        progression::shop_items(&self.progress, &self.tuning)
    }

    pub fn is_portal_available(&self) -> bool {
        progression::is_portal_available(&self.progress)
    }

    pub fn next_prestige_bonus(&self) -> PrestigeBonus {
        progression::next_prestige_bonus(&self.progress, &self.tuning)
    }

    pub fn xp_progress(&self) -> f64 {
        progression::xp_progress(&self.progress, &self.tuning.rewards)
    }

    pub fn xp_to_next_level(&self) -> u64 {
        progression::xp_to_next_level(&self.progress, &self.tuning.rewards)
    }

    /// Problems met while loading sticks (missing images, blank images)
    pub fn load_issues(&self) -> &[GameError] {
        &self.issues
    }

    // === Internals ===

    fn rebuild_board(&mut self) {
        self.issues = self
            .board
            .initialize(&self.progress.owned_sticks, self.assets.as_ref(), &mut self.hitboxes);
    }

    fn bar_frame(&self) -> u8 {
        level_bar_frame(self.xp_progress())
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.progress) {
            log::error!("Failed to save progress: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueLog;
    use crate::catalog::{DEFAULT_STICKS, PURCHASABLE_STICKS};
    use crate::persistence::SAVE_KEY;
    use crate::platform::{ImageStore, MemoryStorage, Storage};
    use crate::sim::board::tests::stick_images;

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        game: Game,
        storage: MemoryStorage,
        cues: CueLog,
    }

    fn harness_with(images: ImageStore, storage: MemoryStorage) -> Harness {
        let cues = CueLog::new();
        let game = Game::new(
            Tuning::default(),
            Box::new(images),
            GameStore::new(Box::new(storage.clone())),
            Box::new(cues.clone()),
            7,
        );
        Harness { game, storage, cues }
    }

    fn harness() -> Harness {
        harness_with(stick_images(), MemoryStorage::new())
    }

    fn run(game: &mut Game, seconds: f32) {
        for _ in 0..(seconds / DT).ceil() as usize {
            game.tick(DT);
        }
    }

    fn grab_point(game: &Game, id: StickId) -> Vec2 {
        let s = game.board().stick(id).unwrap();
        Vec2::new(s.content_center_x(s.pos.x), s.pos.y + 40.0)
    }

    /// Drag sticks into place one at a time until the row is sorted
    fn solve(game: &mut Game) {
        for _ in 0..20 {
            let order = game.board().arrangement().to_vec();
            let mut want = order.clone();
            want.sort_unstable();
            let Some(i) = (0..order.len()).find(|&i| order[i] != want[i]) else {
                return;
            };

            let from = grab_point(game, want[i]);
            let to = grab_point(game, order[i]) - Vec2::new(1.0, 0.0);
            game.pointer_down(from);
            game.pointer_move(to);
            game.pointer_up();
            run(game, 0.3);
        }
        panic!("row never sorted");
    }

    #[test]
    fn test_new_game_deals_unsorted_default_row() {
        let h = harness();
        let mut row = h.game.board().arrangement().to_vec();
        assert!(!h.game.board().is_sorted());
        row.sort_unstable();
        assert_eq!(row, DEFAULT_STICKS);
        assert_eq!(h.game.phase(), GamePhase::Playing);
        assert!(h.game.load_issues().is_empty());
    }

    #[test]
    fn test_sorting_pays_out_then_reshuffles() {
        let mut h = harness();
        solve(&mut h.game);

        assert!(matches!(h.game.phase(), GamePhase::Celebrating { .. }));
        let events = h.game.drain_events();
        let rewards: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::SortComplete(r) => Some(*r),
                _ => None,
            })
            .collect();
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].xp_earned, 70);
        assert_eq!(rewards[0].diamonds_earned, 2);
        assert_eq!(h.game.progress().total_sorts, 1);

        let cues = h.cues.take();
        assert!(cues.contains(&SoundCue::PickUp));
        assert!(cues.contains(&SoundCue::Drop));
        assert!(cues.contains(&SoundCue::CollectDiamond));

        // Input is ignored while the success message is up
        let id = h.game.board().arrangement()[0];
        h.game.pointer_down(grab_point(&h.game, id));
        assert_eq!(h.game.drag_state(), DragState::Idle);

        run(&mut h.game, 1.6);
        assert_eq!(h.game.phase(), GamePhase::Playing);
        assert!(!h.game.board().is_sorted());
        assert!(h.game.drain_events().contains(&GameEvent::Reshuffled));

        let saved = GameStore::new(Box::new(h.storage.clone())).load();
        assert_eq!(saved.total_xp, 70);
        assert_eq!(saved.diamonds, 2);
    }

    #[test]
    fn test_purchase_adds_stick_to_the_row() {
        let mut h = harness();
        assert!(matches!(h.game.purchase(1), Err(GameError::InsufficientFunds { price: 25, balance: 0 })));

        let mut progress = h.game.snapshot();
        progress.diamonds = 30;
        h.game.replace_state(progress);

        assert_eq!(h.game.purchase(1).unwrap(), 25);
        assert_eq!(h.game.progress().diamonds, 5);
        assert_eq!(h.game.board().arrangement().len(), 8);
        assert!(h.game.board().owned().contains(&1));
        assert!(h.cues.take().contains(&SoundCue::Purchase));
        assert!(h.game.drain_events().contains(&GameEvent::Purchased { id: 1, price: 25 }));
        assert!(matches!(h.game.purchase(1), Err(GameError::AlreadyOwned(1))));
        assert!(h.game.shop_items()[0].owned);
    }

    #[test]
    fn test_portal_applies_prestige_once() {
        let mut h = harness();
        assert!(matches!(h.game.open_portal(), Err(GameError::NotAvailable)));

        let mut progress = h.game.snapshot();
        for id in PURCHASABLE_STICKS {
            progress.owned_sticks.push(id);
        }
        progress.owned_sticks.sort_unstable();
        progress.level = 9;
        progress.total_xp = 5_000;
        progress.diamonds = 40;
        h.game.replace_state(progress);
        assert_eq!(h.game.board().arrangement().len(), 14);
        assert!(h.game.is_portal_available());

        h.game.open_portal().unwrap();
        assert_eq!(h.game.phase(), GamePhase::Portal);
        assert!(matches!(h.game.open_portal(), Err(GameError::NotAvailable)));

        run(&mut h.game, 10.0);
        assert_eq!(h.game.phase(), GamePhase::Playing);
        let events = h.game.drain_events();
        let prestiges = events.iter().filter(|e| matches!(e, GameEvent::Prestiged(_))).count();
        assert_eq!(prestiges, 1);
        assert!(events.contains(&GameEvent::PortalFinished));

        let progress = h.game.progress();
        assert_eq!(progress.prestige_level, 1);
        assert_eq!(progress.xp_multiplier, 1.25);
        assert_eq!(progress.level, 9);
        assert_eq!(progress.total_xp, 5_000);
        assert_eq!(progress.diamonds, 0);
        assert_eq!(h.game.board().owned(), &DEFAULT_STICKS);
        assert!(h.game.portal().is_none());
    }

    #[test]
    fn test_missing_image_is_reported_and_skipped() {
        let all = stick_images();
        let images = DEFAULT_STICKS
            .iter()
            .filter(|&&id| id != 5)
            .fold(ImageStore::new(), |store, &id| store.with(id, all.stick_image(id).unwrap().clone()));
        let h = harness_with(images, MemoryStorage::new());

        assert_eq!(h.game.board().owned().len(), 6);
        assert!(!h.game.board().owned().contains(&5));
        assert!(matches!(h.game.load_issues(), [GameError::AssetMissing(5)]));
        // Still owned in the progress state
        assert!(h.game.progress().owns(5));
    }

    #[test]
    fn test_loads_existing_save() {
        let storage = MemoryStorage::new();
        storage
            .set_item(SAVE_KEY, r#"{ "version": 3, "level": 4, "currentXP": 60, "diamonds": 11 }"#)
            .unwrap();
        let h = harness_with(stick_images(), storage);
        assert_eq!(h.game.progress().level, 4);
        assert_eq!(h.game.progress().diamonds, 11);
        // 60 / 152
        assert_eq!(h.game.level_bar().frame(), level_bar_frame(60.0 / 152.0));
    }

    #[test]
    fn test_replace_state_repairs_owned_sticks() {
        let mut h = harness();
        let mut progress = h.game.snapshot();
        progress.owned_sticks = vec![14, 3, 99, 3];
        progress.diamonds = 30;
        h.game.replace_state(progress);

        let owned = vec![2, 3, 5, 7, 10, 11, 13, 14];
        assert_eq!(h.game.progress().owned_sticks, owned);
        assert_eq!(h.game.board().owned(), owned.as_slice());
        assert_eq!(h.game.board().arrangement().len(), 8);

        // Later purchases still land in order
        h.game.purchase(1).unwrap();
        assert_eq!(h.game.progress().owned_sticks[0], 1);
        assert!(h.game.progress().owned_sticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_apply_settings_sets_both_channels() {
        let mut h = harness();
        let mut settings = Settings::default();
        settings.set_music_volume(30);
        settings.set_sfx_volume(80);
        h.game.apply_settings(&settings);
        assert_eq!(h.cues.volume(), Some((0.3, 0.8)));

        settings.muted = true;
        h.game.apply_settings(&settings);
        assert_eq!(h.cues.volume(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_full_reset() {
        let mut h = harness();
        let mut progress = h.game.snapshot();
        progress.diamonds = 999;
        progress.level = 3;
        h.game.replace_state(progress);

        h.game.full_reset().unwrap();
        assert_eq!(h.game.snapshot(), ProgressState::new());
        assert_eq!(GameStore::new(Box::new(h.storage.clone())).load(), ProgressState::new());
    }
}
