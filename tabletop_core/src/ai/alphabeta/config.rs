use core::time::Duration;

/// 手順付けの方法。
///
/// 枝刈り効率のためだけに使い、固定深さでの評価値には影響しない。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum MoveOrdering {
    /// ゲームモデルの生成順のまま。
    Generated,
    /// 戦術手（駒取り・即勝ちなど）を先頭へ。
    Tactical,
    /// 戦術手を先頭へ、残りは着手後局面の静的評価順。
    #[default]
    Full,
}

/// 探索設定。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SearchConfig {
    /// 探索のノード上限（`u64::MAX` で無制限）。
    node_budget: u64,
    /// 手順付けの方法。
    ordering: MoveOrdering,
    /// 1回の探索にかける時間の上限。
    time_limit: Option<Duration>,
    /// 置換表のエントリ数（0 で無効）。
    tt_capacity: usize,
}

impl Default for SearchConfig {
    #[inline]
    fn default() -> Self {
        Self {
            node_budget: u64::MAX,
            ordering: MoveOrdering::Full,
            time_limit: None,
            tt_capacity: 0,
        }
    }
}

impl SearchConfig {
    /// ノード上限または時間制限が設定されているかを返す。
    ///
    /// 制限付きの場合は反復深化で探索し、中断時は完了した最深の結果を使う。
    #[inline]
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.node_budget != u64::MAX || self.time_limit.is_some()
    }

    /// ノード上限を返す。
    #[inline]
    #[must_use]
    pub const fn node_budget(&self) -> u64 {
        self.node_budget
    }

    /// 手順付けの方法を返す。
    #[inline]
    #[must_use]
    pub const fn ordering(&self) -> MoveOrdering {
        self.ordering
    }

    /// 時間制限を返す。
    #[inline]
    #[must_use]
    pub const fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// 置換表のエントリ数を返す。
    #[inline]
    #[must_use]
    pub const fn tt_capacity(&self) -> usize {
        self.tt_capacity
    }

    /// ノード上限を設定する。
    #[inline]
    #[must_use]
    pub const fn with_node_budget(mut self, nodes: u64) -> Self {
        self.node_budget = nodes;
        self
    }

    /// 手順付けの方法を設定する。
    #[inline]
    #[must_use]
    pub const fn with_ordering(mut self, ordering: MoveOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// 時間制限を設定する。
    #[inline]
    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// 置換表のエントリ数を設定する（0 で無効）。
    #[inline]
    #[must_use]
    pub const fn with_tt_capacity(mut self, entries: usize) -> Self {
        self.tt_capacity = entries;
        self
    }
}
