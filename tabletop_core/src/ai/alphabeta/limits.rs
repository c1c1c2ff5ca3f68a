use std::time::Instant;

use crate::model::{GameModel, Player};

use super::config::MoveOrdering;
use super::eval::Score;
use super::tt::{Bound, TranspositionTable, position_key};

/// 時刻を確認する間隔（ノード数、2のべき乗 - 1 のマスク）。
const DEADLINE_CHECK_MASK: u64 = 0xFF;

/// 探索の制限。
#[derive(Clone, Copy, Debug)]
pub(super) struct SearchLimits {
    /// 探索を打ち切る時刻。
    deadline: Option<Instant>,
    /// 探索の最大深さ（ply）。
    max_depth: u8,
    /// 探索のノード上限。
    node_budget: u64,
}

impl SearchLimits {
    /// 探索の最大深さ（ply）を返す。
    pub(super) const fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// 探索制限を生成する。
    ///
    /// - `max_depth`: 探索の最大深さ（ply）
    /// - `node_budget`: 探索のノード上限（`u64::MAX` で無制限扱い）
    /// - `deadline`: 打ち切り時刻（`None` で無制限）
    pub(super) const fn new(max_depth: u8, node_budget: u64, deadline: Option<Instant>) -> Self {
        Self {
            deadline,
            max_depth,
            node_budget,
        }
    }
}

/// 探索統計。
#[derive(Default, Clone, Copy, Debug, Eq, PartialEq)]
pub struct SearchStats {
    /// ベータカット等で枝刈りした回数。
    cutoffs: u64,
    /// 探索したノード数。
    nodes: u64,
    /// 置換表からのヒット回数。
    tt_hits: u64,
    /// 置換表へ保存した回数。
    tt_stores: u64,
}

impl SearchStats {
    /// 枝刈りの回数を加算する。
    pub(super) const fn inc_cutoffs(&mut self) {
        self.cutoffs = self.cutoffs.wrapping_add(1);
    }

    /// 探索ノード数を加算する。
    pub(super) const fn inc_nodes(&mut self) {
        self.nodes = self.nodes.wrapping_add(1);
    }

    /// 置換表ヒット回数を加算する。
    pub(super) const fn inc_tt_hits(&mut self) {
        self.tt_hits = self.tt_hits.wrapping_add(1);
    }

    /// 置換表保存回数を加算する。
    pub(super) const fn inc_tt_stores(&mut self) {
        self.tt_stores = self.tt_stores.wrapping_add(1);
    }

    /// 枝刈りの回数を返す。
    #[inline]
    #[must_use]
    pub const fn cutoffs(&self) -> u64 {
        self.cutoffs
    }

    /// 探索ノード数を返す。
    #[inline]
    #[must_use]
    pub const fn nodes(&self) -> u64 {
        self.nodes
    }

    /// 置換表ヒット回数を返す。
    #[inline]
    #[must_use]
    pub const fn tt_hits(&self) -> u64 {
        self.tt_hits
    }

    /// 置換表保存回数を返す。
    #[inline]
    #[must_use]
    pub const fn tt_stores(&self) -> u64 {
        self.tt_stores
    }
}

/// ノード上限・時間制限により探索を中断する。
#[derive(Debug, Clone, Copy)]
pub(super) struct SearchAbort;

/// 探索実行に必要な共有コンテキスト。
///
/// 盤面は持たない。兄弟ノード間で共有されるのは統計と置換表だけ。
pub(super) struct SearchContext<'ctx, G: GameModel, E> {
    /// 評価関数。
    evaluator: &'ctx E,
    /// ルール。
    game: &'ctx G,
    /// 探索制限。
    limits: SearchLimits,
    /// 評価値の視点（ルートで手を選ぶ側）。
    maximizer: Player,
    /// 手順付けの方法。
    ordering: MoveOrdering,
    /// 探索統計。
    stats: SearchStats,
    /// 置換表（無効なら `None`）。
    tt: Option<&'ctx mut TranspositionTable<G::Move>>,
}

impl<'ctx, G: GameModel, E> SearchContext<'ctx, G, E> {
    /// 探索コンテキストを生成する。
    pub(super) const fn new(
        game: &'ctx G,
        evaluator: &'ctx E,
        maximizer: Player,
        limits: SearchLimits,
        ordering: MoveOrdering,
        tt: Option<&'ctx mut TranspositionTable<G::Move>>,
    ) -> Self {
        Self {
            evaluator,
            game,
            limits,
            maximizer,
            ordering,
            stats: SearchStats {
                cutoffs: 0,
                nodes: 0,
                tt_hits: 0,
                tt_stores: 0,
            },
            tt,
        }
    }

    /// ノードに入る。制限を超えたら中断する。
    pub(super) fn enter(&mut self) -> Result<(), SearchAbort> {
        self.stats.inc_nodes();
        if self.stats.nodes() > self.limits.node_budget {
            return Err(SearchAbort);
        }
        if let Some(deadline) = self.limits.deadline {
            if self.stats.nodes() & DEADLINE_CHECK_MASK == 0 && Instant::now() >= deadline {
                return Err(SearchAbort);
            }
        }
        Ok(())
    }

    /// 評価関数を返す。
    pub(super) const fn evaluator(&self) -> &'ctx E {
        self.evaluator
    }

    /// ルールを返す。
    pub(super) const fn game(&self) -> &'ctx G {
        self.game
    }

    /// 探索制限を返す。
    pub(super) const fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// 評価値の視点を返す。
    pub(super) const fn maximizer(&self) -> Player {
        self.maximizer
    }

    /// 手順付けの方法を返す。
    pub(super) const fn ordering(&self) -> MoveOrdering {
        self.ordering
    }

    /// 探索統計を返す。
    pub(super) const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// 探索統計への可変参照を返す。
    pub(super) const fn stats_mut(&mut self) -> &mut SearchStats {
        &mut self.stats
    }

    /// 置換表が有効ならハッシュキーを返す。
    pub(super) fn tt_key(&self, position: &G::Position) -> Option<u64> {
        self.tt
            .as_ref()
            .map(|_| position_key(position, self.maximizer))
    }

    /// 置換表のベストムーブを返す。
    pub(super) fn tt_best_move(&self, key: u64) -> Option<G::Move> {
        self.tt.as_ref().and_then(|tt| tt.probe_best_move(key))
    }

    /// 置換表を参照し、探索窓（`alpha`/`beta`）を狭める。
    ///
    /// - `Exact` の場合はその値を即座に返す。
    /// - `Lower`/`Upper` の場合は `alpha`/`beta` を更新し、カットできるなら値を返す。
    /// - 更新後に `alpha >= beta` となった場合も値を返す（カット）。
    pub(super) fn tt_probe_adjust_window(
        &mut self,
        key: u64,
        depth: u8,
        alpha: &mut Score,
        beta: &mut Score,
    ) -> Option<Score> {
        let entry = self.tt.as_ref().and_then(|tt| tt.probe(key, depth))?;
        self.stats.inc_tt_hits();

        let value = entry.value();
        match entry.bound() {
            Bound::Exact => return Some(value),
            Bound::Lower => {
                if value >= *beta {
                    return Some(value);
                }
                if value > *alpha {
                    *alpha = value;
                }
            }
            Bound::Upper => {
                if value <= *alpha {
                    return Some(value);
                }
                if value < *beta {
                    *beta = value;
                }
            }
        }
        (*alpha >= *beta).then_some(value)
    }

    /// 置換表へ保存する。
    pub(super) fn tt_store(
        &mut self,
        key: u64,
        depth: u8,
        value: Score,
        bound: Bound,
        best_move: Option<G::Move>,
    ) {
        if let Some(tt) = self.tt.as_mut() {
            tt.store(key, depth, value, bound, best_move);
            self.stats.inc_tt_stores();
        }
    }
}
