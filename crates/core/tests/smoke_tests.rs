use meiro_core::{Direction, Game, GameConfig, TurnInput};

/// Walks toward the stairs, swinging at whatever blocks the way.
fn autopilot_input(game: &Game) -> TurnInput {
    let state = game.state();
    if let Some(direction) = game.auto_travel_step(state.goal) {
        return TurnInput::Move(direction);
    }
    Direction::ALL
        .into_iter()
        .find(|direction| state.enemy_at(state.player.pos.step(*direction)).is_some())
        .map_or(TurnInput::Wait, TurnInput::Move)
}

fn run_autopilot(seed: u64, max_turns: u64) -> Game {
    let mut game = Game::new(seed, GameConfig::default()).expect("first floor");
    while !game.is_finished() && game.depth() == 1 && game.turn() < max_turns {
        let input = autopilot_input(&game);
        game.step(input).expect("step");
    }
    game
}

#[test]
fn test_smoke_autopilot_leaves_the_first_floor_or_ends_the_run() {
    for seed in [1, 12345, 987_654_321] {
        let game = run_autopilot(seed, 3000);
        assert!(
            game.is_finished() || game.depth() > 1,
            "seed {seed} neither descended nor finished after {} turns",
            game.turn()
        );
        assert!(game.snapshot_hash() != 0);
    }
}

#[test]
fn test_smoke_fog_and_visibility_follow_the_player() {
    let mut game = Game::new(5, GameConfig::default()).expect("first floor");
    let start = game.state().player.pos;
    assert!(game.state().visibility.is_visible(start));
    assert!(game.state().visibility.visible_count() > 1);
    for _ in 0..5 {
        let input = autopilot_input(&game);
        game.step(input).expect("step");
        if game.is_finished() || game.depth() > 1 {
            break;
        }
        let pos = game.state().player.pos;
        assert!(game.state().visibility.is_visible(pos));
        assert!(game.state().visibility.is_seen(start));
    }
}
