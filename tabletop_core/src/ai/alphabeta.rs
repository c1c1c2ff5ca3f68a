use crate::ai::types::Ai;
use crate::model::GameModel;

/// 探索設定。
mod config;
/// 探索深さの決め方。
pub mod depth;
/// 評価関数のインターフェースと終局スコア。
mod eval;
/// 探索制限・統計・コンテキスト。
mod limits;
/// 枝刈りなしの参照実装。
pub mod minimax;
/// 手順付け。
mod move_ordering;
/// アルファベータ探索本体。
mod search;
#[cfg(test)]
mod tests;
/// 置換表。
mod tt;

pub use config::{MoveOrdering, SearchConfig};
pub use depth::{DepthPolicy, FixedDepth};
pub use eval::{Evaluator, HEURISTIC_LIMIT, INF, Score, WIN_SCORE, is_decisive};
pub use limits::SearchStats;
pub use search::{SearchOutcome, Searcher};

/// アルファベータ探索を行うAI。
///
/// 深さは `DepthPolicy` が局面ごとに決め、探索自体は `Searcher` に委ねる。
#[derive(Debug)]
#[non_exhaustive]
pub struct Agent<G: GameModel, E, D> {
    /// 探索深さの決め方。
    depth: D,
    /// 探索器。
    searcher: Searcher<G, E>,
}

impl<G: GameModel, E: Evaluator<G>, D: DepthPolicy<G>> Agent<G, E, D> {
    /// ルール・評価関数・深さ方針・探索設定を指定して初期化する。
    #[inline]
    #[must_use]
    pub fn new(game: G, evaluator: E, depth: D, config: SearchConfig) -> Self {
        Self {
            depth,
            searcher: Searcher::new(game, evaluator, config),
        }
    }

    /// 探索器を返す。
    #[inline]
    #[must_use]
    pub const fn searcher(&self) -> &Searcher<G, E> {
        &self.searcher
    }

    /// 局面に対して選ばれる探索深さを返す。
    #[inline]
    #[must_use]
    pub fn depth_for(&self, position: &G::Position) -> u8 {
        self.depth.depth(self.searcher.game(), position)
    }
}

impl<G: GameModel, E: Evaluator<G>, D: DepthPolicy<G>> Ai<G> for Agent<G, E, D> {
    #[inline]
    fn select_move(&mut self, position: &G::Position) -> Option<G::Move> {
        let depth = self.depth_for(position);
        let player = self.searcher.game().side_to_move(position);
        self.searcher.best_move(position, player, depth)
    }
}
