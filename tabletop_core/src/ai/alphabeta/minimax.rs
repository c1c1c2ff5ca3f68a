//! 枝刈りなしのミニマックス。
//!
//! アルファベータ探索と同じ葉の評価を使うので、同じ深さなら同じ値を返す。
//! 探索結果の検証用。

use crate::model::{GameModel, Player};

use super::eval::{Evaluator, Score, leaf_score, terminal_score};

/// `position` を `depth` 手先まで全探索した `maximizer` 視点の値を返す。
#[must_use]
pub fn minimax_value<G: GameModel, E: Evaluator<G>>(
    game: &G,
    evaluator: &E,
    position: &G::Position,
    maximizer: Player,
    depth: u8,
) -> Score {
    if game.is_terminal(position) {
        return terminal_score(game, position, maximizer, depth);
    }
    if depth == 0 {
        return leaf_score(game, evaluator, position, maximizer, depth);
    }

    let side = game.side_to_move(position);
    let maximizing = side == maximizer;
    let next_depth = depth.saturating_sub(1);

    let values = game
        .legal_moves(position, side)
        .into_iter()
        .filter_map(|mv| game.apply_move(position, mv).ok())
        .map(|next| minimax_value(game, evaluator, &next, maximizer, next_depth));

    let best = if maximizing { values.max() } else { values.min() };
    best.unwrap_or_else(|| leaf_score(game, evaluator, position, maximizer, depth))
}

/// ルートで `maximizer` の各合法手を全探索し、最善手と値を返す。
///
/// 同点の手は生成順で先のものを選ぶ。
#[must_use]
pub fn minimax_best<G: GameModel, E: Evaluator<G>>(
    game: &G,
    evaluator: &E,
    position: &G::Position,
    maximizer: Player,
    depth: u8,
) -> Option<(G::Move, Score)> {
    let next_depth = depth.saturating_sub(1);
    let mut best: Option<(G::Move, Score)> = None;
    for mv in game.legal_moves(position, maximizer) {
        let Ok(next) = game.apply_move(position, mv) else {
            continue;
        };
        let score = minimax_value(game, evaluator, &next, maximizer, next_depth);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
    }
    best
}
