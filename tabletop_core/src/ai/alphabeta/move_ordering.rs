use crate::model::{GameModel, Player};

use super::config::MoveOrdering;
use super::eval::{Evaluator, Score};

/// 置換表が覚えている手の優先度。
const TIER_HINT: i32 = 2;

/// 戦術手（駒取り・即勝ち）の優先度。
const TIER_TACTICAL: i32 = 1;

/// その他の手の優先度。
const TIER_QUIET: i32 = 0;

/// 適用できなかった手の優先度（最後尾）。
const TIER_REJECTED: i32 = -1;

/// 合法手を `mover` 視点の簡易評価で並べ替えて返す。
///
/// 安定ソートなので、同じキーの手は生成順を保つ（同点時の手選択はこの順に従う）。
pub(super) fn order_moves<G: GameModel, E: Evaluator<G>>(
    game: &G,
    evaluator: &E,
    position: &G::Position,
    mover: Player,
    moves: Vec<G::Move>,
    ordering: MoveOrdering,
    hint: Option<G::Move>,
) -> Vec<G::Move> {
    if ordering == MoveOrdering::Generated || moves.len() < 2 {
        return moves;
    }

    let mut keyed: Vec<((i32, Score), G::Move)> = moves
        .into_iter()
        .map(|mv| (move_key(game, evaluator, position, mover, mv, ordering, hint), mv))
        .collect();

    keyed.sort_by(|&(key_a, _), &(key_b, _)| key_b.cmp(&key_a));

    keyed.into_iter().map(|(_, mv)| mv).collect()
}

/// 1手分の並べ替えキー（優先度, 静的評価）を求める。
fn move_key<G: GameModel, E: Evaluator<G>>(
    game: &G,
    evaluator: &E,
    position: &G::Position,
    mover: Player,
    mv: G::Move,
    ordering: MoveOrdering,
    hint: Option<G::Move>,
) -> (i32, Score) {
    let Ok(next) = game.apply_move(position, mv) else {
        return (TIER_REJECTED, 0);
    };

    let tier = if hint == Some(mv) {
        TIER_HINT
    } else if game.is_tactical(position, mv) || game.is_win(&next, mover) {
        TIER_TACTICAL
    } else {
        TIER_QUIET
    };

    let quick = match ordering {
        MoveOrdering::Full => evaluator.evaluate(game, &next, mover),
        MoveOrdering::Generated | MoveOrdering::Tactical => 0,
    };

    (tier, quick)
}
