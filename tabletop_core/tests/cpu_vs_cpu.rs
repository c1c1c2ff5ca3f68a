//! 結合テスト: CPU同士の対戦が各ゲームで終局まで進むことを確認する。

/// 統合テスト本体。
#[cfg(test)]
mod tests {
    use tabletop_core::ai::alphabeta::{self, Evaluator, FixedDepth, SearchConfig};
    use tabletop_core::ai::{Ai, random};
    use tabletop_core::games::{checkers, connect_four, quarto, reversi, tictactoe};
    use tabletop_core::model::{GameModel, Session, SessionStatus};

    /// 2つのエージェントで最後まで対局し、終局することを確認する。
    fn play_out<G: GameModel + Clone>(
        game: &G,
        mut first: impl Ai<G>,
        mut second: impl Ai<G>,
        max_plies: u16,
    ) {
        let mut session = Session::new(game.clone());

        for _ply in u16::MIN..max_plies {
            if session.is_game_over() {
                break;
            }

            let legal = game.legal_moves(session.position(), session.side_to_move());
            let mv = if session.side_to_move().index() == 0 {
                first.select_move(session.position())
            } else {
                second.select_move(session.position())
            };
            let Some(mv) = mv else {
                panic!("no move in an unfinished position: {:?}", session.position());
            };
            assert!(legal.contains(&mv), "agent must select a legal move, got={mv:?}");

            let play_result = session.play(mv);
            assert!(play_result.is_ok(), "play must succeed, got={play_result:?}");
        }

        let status = session.status();
        assert!(
            matches!(status, SessionStatus::Finished(_)),
            "game did not finish within ply limit, status={status:?}"
        );
    }

    /// `random vs alphabeta` を先後入れ替えて1局ずつ行う。
    fn random_vs_alphabeta<G, E>(game: &G, evaluator: E, depth: u8, seed: u64, max_plies: u16)
    where
        G: GameModel + Clone,
        E: Evaluator<G> + Clone,
    {
        let config = SearchConfig::default().with_tt_capacity(1 << 12);
        let searcher = |evaluator: E| {
            alphabeta::Agent::new(game.clone(), evaluator, FixedDepth::new(depth), config)
        };

        play_out(
            game,
            random::Agent::new(game.clone(), seed),
            searcher(evaluator.clone()),
            max_plies,
        );
        play_out(
            game,
            searcher(evaluator),
            random::Agent::new(game.clone(), seed.wrapping_add(1)),
            max_plies,
        );
    }

    /// `random vs alphabeta` が三目並べで終局まで進む。
    #[test]
    fn tictactoe_finishes() {
        let game = tictactoe::TicTacToe::standard();
        random_vs_alphabeta(&game, tictactoe::Heuristic::default(), 3, 1, 9);

        let large = match tictactoe::TicTacToe::new(4) {
            Ok(value) => value,
            Err(err) => panic!("4x4 board must be accepted: {err}"),
        };
        random_vs_alphabeta(&large, tictactoe::Heuristic::default(), 2, 7, 16);
    }

    /// `random vs alphabeta` がコネクトフォーで終局まで進む。
    #[test]
    fn connect_four_finishes() {
        let game = connect_four::ConnectFour::standard();
        random_vs_alphabeta(&game, connect_four::Heuristic::default(), 3, 42, 42);
    }

    /// `random vs alphabeta` がリバーシで終局まで進む。
    #[test]
    fn reversi_finishes() {
        let game = reversi::Reversi::new();
        // 最大60手（最初の4石を除く）だが、パスもあるので余裕を見て回す。
        random_vs_alphabeta(&game, reversi::Heuristic::default(), 2, 42, 200);
    }

    /// `random vs alphabeta` がチェッカーで終局まで進む。
    #[test]
    fn checkers_finishes() {
        let game = match checkers::Checkers::new(8) {
            Ok(value) => value.with_quiet_limit(40),
            Err(err) => panic!("8x8 board must be accepted: {err}"),
        };
        // 駒取りは高々24回で、その間の手数は40手で打ち切られる。
        random_vs_alphabeta(&game, checkers::Heuristic::default(), 2, 3, 1_100);
    }

    /// `random vs alphabeta` がクアルトで終局まで進む。
    #[test]
    fn quarto_finishes() {
        let game = quarto::Quarto::new();
        // 最初の駒渡しを含めて17手。
        random_vs_alphabeta(&game, quarto::Heuristic::default(), 2, 5, 17);
    }

    /// `random` 同士で終局することを確認する。
    #[test]
    fn random_vs_random_finishes() {
        let game = reversi::Reversi::new();
        play_out(
            &game,
            random::Agent::new(game, u64::MIN),
            random::Agent::new(game, u64::MIN.wrapping_add(1)),
            200,
        );
        play_out(&game, random::Agent::new(game, 42), random::Agent::new(game, 4242), 200);
    }
}
