//! A full play session through the public API: sort, buy, prestige, reload.

use glam::Vec2;

use stick_sort::audio::{CueLog, SoundCue};
use stick_sort::catalog::{ALL_STICKS, DEFAULT_STICKS, PURCHASABLE_STICKS, StickId};
use stick_sort::hitbox::RgbaImage;
use stick_sort::leaderboard::{Leaderboard, LeaderboardEntry, SyncDecision, decide_sync};
use stick_sort::persistence::GameStore;
use stick_sort::platform::{ImageStore, MemoryStorage};
use stick_sort::{Game, GameError, GameEvent, GamePhase, Settings, Tuning};

const DT: f32 = 1.0 / 60.0;

fn images() -> ImageStore {
    ALL_STICKS.iter().fold(ImageStore::new(), |store, &id| {
        let mut image = RgbaImage::filled(50, 360, [0, 0, 0, 0]);
        for (i, texel) in image.texels_mut().iter_mut().enumerate() {
            if (12..38).contains(&(i % 50)) {
                *texel = [200, 160, 90, 255];
            }
        }
        store.with(id, image)
    })
}

fn new_game(storage: &MemoryStorage, cues: &CueLog) -> Game {
    Game::new(
        Tuning::default(),
        Box::new(images()),
        GameStore::new(Box::new(storage.clone())),
        Box::new(cues.clone()),
        2024,
    )
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

fn solve(game: &mut Game) -> usize {
    for moves in 0..24 {
        let order = game.board().arrangement().to_vec();
        let mut want = order.clone();
        want.sort_unstable();
        let Some(i) = (0..order.len()).find(|&i| order[i] != want[i]) else {
            return moves;
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
fn test_session_sort_buy_prestige_and_reload() {
    let storage = MemoryStorage::new();
    let cues = CueLog::new();
    let mut game = new_game(&storage, &cues);

    let mut settings = Settings::default();
    settings.set_player_name("Mia");
    game.apply_settings(&settings);

    // First sort of the default row
    assert!(solve(&mut game) > 0);
    assert!(matches!(game.phase(), GamePhase::Celebrating { .. }));
    let reward = game
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            GameEvent::SortComplete(r) => Some(r),
            _ => None,
        })
        .unwrap();
    assert_eq!(reward.xp_earned, 70);
    assert_eq!(reward.diamonds_earned, 2);
    assert!(cues.take().contains(&SoundCue::CollectDiamond));
    run(&mut game, 2.0);
    assert_eq!(game.phase(), GamePhase::Playing);

    // Not enough diamonds yet
    assert!(matches!(game.purchase(1), Err(GameError::InsufficientFunds { .. })));

    // Fund the whole shop and buy it out in catalog order
    let mut progress = game.snapshot();
    progress.diamonds = 2_375;
    game.replace_state(progress);
    for id in PURCHASABLE_STICKS {
        game.purchase(id).unwrap();
    }
    assert_eq!(game.progress().diamonds, 0);
    assert_eq!(game.board().arrangement().len(), ALL_STICKS.len());
    assert!(game.is_portal_available());

    let bonus = game.next_prestige_bonus();
    assert_eq!((bonus.current, bonus.next), (1.0, 1.25));

    // A 14 stick row still sorts
    solve(&mut game);
    run(&mut game, 2.0);
    let before = game.snapshot();
    assert_eq!(before.total_sorts, 2);

    game.open_portal().unwrap();
    assert!(matches!(game.purchase(1), Err(GameError::NotAvailable)));
    run(&mut game, 10.0);
    assert_eq!(game.phase(), GamePhase::Playing);
    assert!(game.drain_events().contains(&GameEvent::PortalFinished));

    let after = game.snapshot();
    assert_eq!(after.prestige_level, 1);
    assert_eq!(after.level, before.level);
    assert_eq!(after.total_xp, before.total_xp);
    assert_eq!(game.board().owned(), &DEFAULT_STICKS);

    // A fresh session over the same storage resumes where this one stopped
    let reloaded = new_game(&storage, &CueLog::new());
    assert_eq!(reloaded.snapshot(), after);
    assert!(reloaded.load_issues().is_empty());

    // Leaderboard and cloud sync see the lifetime XP
    let mut board = Leaderboard::from_entries(vec![LeaderboardEntry {
        name: "Kai".into(),
        total_xp: 1,
        ..LeaderboardEntry::default()
    }]);
    let rank = board.submit(LeaderboardEntry::for_player(&settings.player_name, &after));
    assert_eq!(rank, Some(1));
    assert_eq!(decide_sync(&after, Some(&before)), SyncDecision::InSync);
    assert_eq!(decide_sync(&after, None), SyncDecision::PushLocal);
}
