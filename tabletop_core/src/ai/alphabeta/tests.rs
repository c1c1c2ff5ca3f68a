use core::time::Duration;

use super::eval::terminal_score;
use super::minimax::{minimax_best, minimax_value};
use super::{MoveOrdering, SearchConfig, Searcher, WIN_SCORE, is_decisive};
use crate::games::connect_four::{self, Column, ConnectFour};
use crate::games::tictactoe::{self, Cell, TicTacToe};
use crate::model::{GameModel as _, Player};

const TEST_TT_SIZE: usize = 1 << 10;

fn play_tictactoe(game: &TicTacToe, cells: &[u8]) -> tictactoe::Position {
    let mut position = game.initial();
    for &index in cells {
        position = match game.apply_move(&position, Cell::from_index(index)) {
            Ok(value) => value,
            Err(err) => panic!("setup move {index} rejected: {err}"),
        };
    }
    position
}

fn play_connect_four(game: &ConnectFour, columns: &[u8]) -> connect_four::Position {
    let mut position = game.initial();
    for &column in columns {
        position = match game.apply_move(&position, Column::new(column)) {
            Ok(value) => value,
            Err(err) => panic!("setup move {column} rejected: {err}"),
        };
    }
    position
}

fn connect_four_searcher(config: SearchConfig) -> Searcher<ConnectFour, connect_four::Heuristic> {
    Searcher::new(
        ConnectFour::standard(),
        connect_four::Heuristic::default(),
        config,
    )
}

#[test]
fn terminal_score_sign_is_from_maximizer_perspective() {
    let game = TicTacToe::standard();
    // X が 0,1,2 の行を揃えて勝ち。
    let won = play_tictactoe(&game, &[0, 3, 1, 4, 2]);

    assert_eq!(terminal_score(&game, &won, Player::First, 3), WIN_SCORE + 3);
    assert_eq!(terminal_score(&game, &won, Player::Second, 3), -(WIN_SCORE + 3));
    assert!(is_decisive(terminal_score(&game, &won, Player::First, 0)));

    let draw = play_tictactoe(&game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
    assert_eq!(terminal_score(&game, &draw, Player::First, 5), 0);
}

#[test]
fn terminal_position_yields_no_move() {
    let game = TicTacToe::standard();
    let won = play_tictactoe(&game, &[0, 3, 1, 4, 2]);
    let mut searcher = Searcher::new(game, tictactoe::Heuristic::default(), SearchConfig::default());

    assert_eq!(searcher.best_move(&won, Player::Second, 4), None);
    assert_eq!(searcher.best_move(&won, Player::First, 4), None);
}

#[test]
fn player_off_turn_gets_no_move() {
    let game = TicTacToe::standard();
    // X: 0,1 / O: 4、O の手番。
    let position = play_tictactoe(&game, &[0, 4, 1]);
    let mut searcher =
        Searcher::new(game.clone(), tictactoe::Heuristic::default(), SearchConfig::default());

    let outcome = searcher.search(&position, Player::First, 3);
    assert_eq!(outcome.best_move(), None);
    assert_eq!(outcome.score(), None);
    assert_eq!(outcome.completed_depth(), 0);
    assert_eq!(outcome.stats().nodes(), 0);

    let bounded = SearchConfig::default().with_node_budget(1_000);
    let mut limited = Searcher::new(game, tictactoe::Heuristic::default(), bounded);
    assert_eq!(limited.best_move(&position, Player::First, 3), None);
    assert!(limited.best_move(&position, Player::Second, 3).is_some());
    assert_eq!(searcher.best_move(&position, Player::Second, 3), Some(Cell::from_index(2)));
}

#[test]
fn blocks_an_immediate_loss() {
    let game = TicTacToe::standard();
    // X: 0,1 / O: 4、O の手番。2 を塞がないと負け。
    let position = play_tictactoe(&game, &[0, 4, 1]);

    for ordering in [MoveOrdering::Generated, MoveOrdering::Tactical, MoveOrdering::Full] {
        let config = SearchConfig::default().with_ordering(ordering);
        let mut searcher = Searcher::new(game.clone(), tictactoe::Heuristic::default(), config);
        for depth in 2..=4 {
            assert_eq!(
                searcher.best_move(&position, Player::Second, depth),
                Some(Cell::from_index(2)),
                "ordering {ordering:?}, depth {depth}"
            );
        }
    }
}

#[test]
fn immediate_win_dominates_extreme_weights() {
    let game = TicTacToe::standard();
    let weights = tictactoe::Weights {
        center: 400_000,
        corner: 400_000,
        edge: 400_000,
        open_line: 10_000_000,
    };
    // X: 0,1 / O: 3,7、X の手番で 2 に置けば勝ち。
    let position = play_tictactoe(&game, &[0, 3, 1, 7]);
    let mut searcher = Searcher::new(game, tictactoe::Heuristic::new(weights), SearchConfig::default());

    let outcome = searcher.search(&position, Player::First, 3);
    assert_eq!(outcome.best_move(), Some(Cell::from_index(2)));
    assert!(outcome.score().is_some_and(|score| score >= WIN_SCORE));
}

#[test]
fn depth_zero_is_searched_as_depth_one() {
    let mut searcher = connect_four_searcher(SearchConfig::default());
    let position = searcher.game().initial();

    let outcome = searcher.search(&position, Player::First, 0);
    assert_eq!(outcome.completed_depth(), 1);
    assert!(outcome.best_move().is_some());
}

#[test]
fn tt_hits_increase_when_searching_same_position_twice() {
    let mut searcher = connect_four_searcher(SearchConfig::default().with_tt_capacity(TEST_TT_SIZE));
    let position = searcher.game().initial();

    let first = searcher.search(&position, Player::First, 5);
    let second = searcher.search(&position, Player::First, 5);

    assert_eq!(first.best_move(), second.best_move());
    assert_eq!(first.score(), second.score());
    assert!(second.stats().tt_hits() > 0);

    searcher.clear_table();
    let cleared = searcher.search(&position, Player::First, 5);
    assert_eq!(cleared.stats().nodes(), first.stats().nodes());
}

#[test]
fn table_does_not_change_fixed_depth_score() {
    let game = ConnectFour::standard();
    let position = play_connect_four(&game, &[3, 3, 2, 4]);

    let mut plain = connect_four_searcher(SearchConfig::default());
    let mut cached = connect_four_searcher(SearchConfig::default().with_tt_capacity(TEST_TT_SIZE));

    for depth in 1..=5 {
        let expected = plain.search(&position, Player::First, depth);
        let actual = cached.search(&position, Player::First, depth);
        assert_eq!(expected.score(), actual.score(), "depth {depth}");
        assert_eq!(expected.best_move(), actual.best_move(), "depth {depth}");
    }
}

#[test]
fn agrees_with_unpruned_minimax() {
    let game = TicTacToe::standard();
    let heuristic = tictactoe::Heuristic::default();

    for (cells, player) in [(&[4_u8, 0][..], Player::First), (&[4_u8][..], Player::Second)] {
        let position = play_tictactoe(&game, cells);
        for depth in 1..=4 {
            let expected = minimax_best(&game, &heuristic, &position, player, depth);
            let mut searcher = Searcher::new(
                game.clone(),
                heuristic,
                SearchConfig::default().with_ordering(MoveOrdering::Generated),
            );
            let outcome = searcher.search(&position, player, depth);
            assert_eq!(outcome.score(), expected.map(|(_, score)| score), "depth {depth}");
            assert_eq!(outcome.best_move(), expected.map(|(mv, _)| mv), "depth {depth}");
        }
    }

    // 中央と角の後、3手先までに勝敗は決まらない。
    let position = play_tictactoe(&game, &[4, 0]);
    assert!(!is_decisive(minimax_value(&game, &heuristic, &position, Player::First, 3)));
}

#[test]
fn node_budget_abort_still_returns_a_legal_move() {
    let mut searcher = connect_four_searcher(SearchConfig::default().with_node_budget(50));
    let game = ConnectFour::standard();
    let position = game.initial();

    let outcome = searcher.search(&position, Player::First, 8);
    let legal = game.legal_moves(&position, Player::First);

    assert!(outcome.completed_depth() < 8);
    assert!(outcome.best_move().is_some_and(|mv| legal.contains(&mv)));
    assert!(outcome.stats().nodes() <= 51);
}

#[test]
fn zero_time_limit_completes_the_first_iteration() {
    let mut searcher = connect_four_searcher(SearchConfig::default().with_time_limit(Duration::ZERO));
    let position = searcher.game().initial();

    let outcome = searcher.search(&position, Player::First, 10);
    // 時刻の確認は 256 ノードごとなので、深さ 1 は必ず完了する。
    assert!(outcome.completed_depth() >= 1);
    assert!(outcome.completed_depth() < 10);
    assert!(outcome.best_move().is_some());
}

#[test]
fn same_inputs_give_same_move() {
    let game = ConnectFour::standard();
    let position = play_connect_four(&game, &[3, 2, 3]);

    let mut a = connect_four_searcher(SearchConfig::default());
    let mut b = connect_four_searcher(SearchConfig::default());
    assert_eq!(
        a.best_move(&position, Player::Second, 5),
        b.best_move(&position, Player::Second, 5)
    );
    assert_eq!(
        a.best_move(&position, Player::Second, 5),
        a.best_move(&position, Player::Second, 5)
    );
}
