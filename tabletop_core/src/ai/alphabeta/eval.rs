use crate::model::{GameModel, Player};

/// 評価値。
pub type Score = i32;

/// 勝ち局面の基準点。ヒューリスティック項はこの大きさに届かない。
pub const WIN_SCORE: Score = 1_000_000;

/// ヒューリスティック評価の上限（絶対値）。
pub const HEURISTIC_LIMIT: Score = WIN_SCORE / 2;

/// 探索窓の初期値。どの評価値よりも大きい。
pub const INF: Score = WIN_SCORE * 2;

/// 非終局局面を評価する（ゲームごとの実装）。
///
/// 評価値は常に `maximizer` 視点（大きいほど `maximizer` に有利）。
pub trait Evaluator<G: GameModel> {
    /// 非終局局面のヒューリスティック評価。`HEURISTIC_LIMIT` を超えた分は切り詰められる。
    fn heuristic(&self, game: &G, position: &G::Position, maximizer: Player) -> Score;

    /// 局面の評価値。勝ちは `WIN_SCORE`、負けは `-WIN_SCORE`、引き分けは 0。
    #[inline]
    fn evaluate(&self, game: &G, position: &G::Position, maximizer: Player) -> Score {
        if game.is_terminal(position) {
            return terminal_score(game, position, maximizer, 0);
        }
        clamp_heuristic(self.heuristic(game, position, maximizer))
    }
}

/// 勝敗が確定した評価値かを返す。
#[inline]
#[must_use]
pub const fn is_decisive(score: Score) -> bool {
    score >= WIN_SCORE || score <= -WIN_SCORE
}

/// ヒューリスティック評価を `±HEURISTIC_LIMIT` に収める。
#[inline]
pub(super) const fn clamp_heuristic(score: Score) -> Score {
    if score > HEURISTIC_LIMIT {
        HEURISTIC_LIMIT
    } else if score < -HEURISTIC_LIMIT {
        -HEURISTIC_LIMIT
    } else {
        score
    }
}

/// 終局局面の評価（`maximizer` 視点）。
///
/// 残り深さを加点し、早い勝ちと遅い負けを選ぶ。
pub(super) fn terminal_score<G: GameModel>(
    game: &G,
    position: &G::Position,
    maximizer: Player,
    remaining: u8,
) -> Score {
    let bonus = Score::from(remaining);
    if game.is_win(position, maximizer) {
        WIN_SCORE.saturating_add(bonus)
    } else if game.is_win(position, maximizer.opponent()) {
        WIN_SCORE.saturating_add(bonus).wrapping_neg()
    } else {
        0
    }
}

/// 探索の葉での評価（終局なら終局スコア、そうでなければ切り詰めたヒューリスティック）。
pub(super) fn leaf_score<G: GameModel, E: Evaluator<G>>(
    game: &G,
    evaluator: &E,
    position: &G::Position,
    maximizer: Player,
    remaining: u8,
) -> Score {
    if game.is_terminal(position) {
        return terminal_score(game, position, maximizer, remaining);
    }
    clamp_heuristic(evaluator.heuristic(game, position, maximizer))
}
