use std::time::Instant;

use tracing::{debug, trace};

use crate::model::{GameModel, Player};

use super::config::SearchConfig;
use super::depth::normalize_depth;
use super::eval::{Evaluator, INF, Score, leaf_score, terminal_score};
use super::limits::{SearchAbort, SearchContext, SearchLimits, SearchStats};
use super::move_ordering::order_moves;
use super::tt::{Bound, TranspositionTable};

/// 探索結果。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SearchOutcome<M> {
    /// ルートで選択した最善手。
    best_move: Option<M>,
    /// 探索を完了した深さ（0 は未完了）。
    completed_depth: u8,
    /// `best_move` の評価値（探索を完了した場合のみ）。
    score: Option<Score>,
    /// 探索統計。
    stats: SearchStats,
}

impl<M: Copy> SearchOutcome<M> {
    /// ルートで選択した最善手を返す。
    #[inline]
    #[must_use]
    pub const fn best_move(&self) -> Option<M> {
        self.best_move
    }

    /// 探索を完了した深さを返す。
    #[inline]
    #[must_use]
    pub const fn completed_depth(&self) -> u8 {
        self.completed_depth
    }

    /// `best_move` の評価値を返す。
    #[inline]
    #[must_use]
    pub const fn score(&self) -> Option<Score> {
        self.score
    }

    /// 探索統計を返す。
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }
}

/// アルファベータ探索器。
///
/// ルールと評価関数を値として保持する。置換表を有効にした場合は呼び出しをまたいで保持する。
#[derive(Debug, Clone)]
pub struct Searcher<G: GameModel, E> {
    /// 探索設定。
    config: SearchConfig,
    /// 評価関数。
    evaluator: E,
    /// ルール。
    game: G,
    /// 置換表（無効なら `None`）。
    tt: Option<TranspositionTable<G::Move>>,
}

impl<G: GameModel, E: Evaluator<G>> Searcher<G, E> {
    /// ルール・評価関数・設定を指定して生成する。
    #[inline]
    #[must_use]
    pub fn new(game: G, evaluator: E, config: SearchConfig) -> Self {
        let capacity = config.tt_capacity();
        Self {
            config,
            evaluator,
            game,
            tt: (capacity > 0).then(|| TranspositionTable::new(capacity)),
        }
    }

    /// 探索設定を返す。
    #[inline]
    #[must_use]
    pub const fn config(&self) -> SearchConfig {
        self.config
    }

    /// 評価関数を返す。
    #[inline]
    #[must_use]
    pub const fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// ルールを返す。
    #[inline]
    #[must_use]
    pub const fn game(&self) -> &G {
        &self.game
    }

    /// 置換表を消去する。
    #[inline]
    pub fn clear_table(&mut self) {
        if let Some(tt) = self.tt.as_mut() {
            tt.clear();
        }
    }

    /// `player` にとっての最善手を返す。合法手が無ければ `None`。
    ///
    /// 同点の手が複数ある場合は、手順付け後に最初に現れた手を選ぶ。
    #[inline]
    pub fn best_move(
        &mut self,
        position: &G::Position,
        player: Player,
        depth: u8,
    ) -> Option<G::Move> {
        self.search(position, player, depth).best_move()
    }

    /// `player` 視点で `depth` 手先まで探索する。
    ///
    /// ノード上限・時間制限が無ければ指定深さを1回だけ探索する。
    /// 制限がある場合は反復深化し、中断時は完了した最深の結果（無ければ最初の合法手）を返す。
    /// `player` が手番でなければ探索せず、手なしの結果を返す。
    pub fn search(
        &mut self,
        position: &G::Position,
        player: Player,
        depth: u8,
    ) -> SearchOutcome<G::Move> {
        if self.game.side_to_move(position) != player {
            debug!(player = ?player, "not the side to move");
            return SearchOutcome {
                best_move: None,
                completed_depth: 0,
                score: None,
                stats: SearchStats::default(),
            };
        }

        let depth = normalize_depth(depth);
        let deadline = self
            .config
            .time_limit()
            .and_then(|limit| Instant::now().checked_add(limit));
        let limits = SearchLimits::new(depth, self.config.node_budget(), deadline);
        let first_depth = if self.config.is_bounded() { 1 } else { depth };

        let mut ctx = SearchContext::new(
            &self.game,
            &self.evaluator,
            player,
            limits,
            self.config.ordering(),
            self.tt.as_mut(),
        );
        let outcome = iterative_deepening(position, first_depth, &mut ctx);

        debug!(
            depth = outcome.completed_depth,
            nodes = outcome.stats.nodes(),
            cutoffs = outcome.stats.cutoffs(),
            tt_hits = outcome.stats.tt_hits(),
            score = outcome.score,
            "search finished"
        );
        outcome
    }
}

/// `first_depth..=max_depth` の深さで順に探索する。
fn iterative_deepening<G: GameModel, E: Evaluator<G>>(
    position: &G::Position,
    first_depth: u8,
    ctx: &mut SearchContext<'_, G, E>,
) -> SearchOutcome<G::Move> {
    let mut outcome = SearchOutcome {
        best_move: first_legal_move(position, ctx),
        completed_depth: 0,
        score: None,
        stats: SearchStats::default(),
    };

    for depth in first_depth..=ctx.limits().max_depth() {
        match root_search(position, depth, ctx) {
            Ok(Some((mv, score))) => {
                trace!(depth, score, mv = ?mv, "iteration completed");
                outcome.best_move = Some(mv);
                outcome.score = Some(score);
                outcome.completed_depth = depth;
            }
            Ok(None) => break,
            Err(SearchAbort) => {
                debug!(depth, nodes = ctx.stats().nodes(), "search aborted");
                break;
            }
        }
    }

    outcome.stats = ctx.stats();
    outcome
}

/// 合法手のうち最初の1つを返す（探索が1回も完了しなかったときの代替）。
fn first_legal_move<G: GameModel, E>(
    position: &G::Position,
    ctx: &SearchContext<'_, G, E>,
) -> Option<G::Move> {
    ctx.game()
        .legal_moves(position, ctx.maximizer())
        .into_iter()
        .next()
}

/// ルート探索（指定深さの探索）。ルートは常に `maximizer` の手番として扱う。
fn root_search<G: GameModel, E: Evaluator<G>>(
    position: &G::Position,
    depth: u8,
    ctx: &mut SearchContext<'_, G, E>,
) -> Result<Option<(G::Move, Score)>, SearchAbort> {
    let game = ctx.game();
    let player = ctx.maximizer();
    let legal_moves = game.legal_moves(position, player);
    if legal_moves.is_empty() {
        return Ok(None);
    }

    let moves = order_moves(
        game,
        ctx.evaluator(),
        position,
        player,
        legal_moves,
        ctx.ordering(),
        None,
    );
    let mut best: Option<(G::Move, Score)> = None;
    let mut alpha = -INF;
    let beta = INF;
    let next_depth = depth.saturating_sub(1);

    for mv in moves {
        let Ok(next) = game.apply_move(position, mv) else {
            continue;
        };
        let score = alphabeta(&next, next_depth, alpha, beta, ctx)?;
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
        if score > alpha {
            alpha = score;
        }
    }

    Ok(best)
}

/// アルファベータ（fail-soft、max/min 形式）。評価値は常に `maximizer` 視点。
pub(super) fn alphabeta<G: GameModel, E: Evaluator<G>>(
    position: &G::Position,
    depth: u8,
    mut alpha: Score,
    mut beta: Score,
    ctx: &mut SearchContext<'_, G, E>,
) -> Result<Score, SearchAbort> {
    ctx.enter()?;

    let game = ctx.game();
    let evaluator = ctx.evaluator();
    let maximizer = ctx.maximizer();

    if game.is_terminal(position) {
        return Ok(terminal_score(game, position, maximizer, depth));
    }
    if depth == 0 {
        return Ok(leaf_score(game, evaluator, position, maximizer, depth));
    }

    let side = game.side_to_move(position);
    let legal_moves = game.legal_moves(position, side);
    if legal_moves.is_empty() {
        // 非終局で合法手なし（ゲームモデルが終局と見なさない局面）は静的評価で打ち切る。
        return Ok(leaf_score(game, evaluator, position, maximizer, depth));
    }

    let key = ctx.tt_key(position);
    if let Some(key_value) = key {
        if let Some(value) = ctx.tt_probe_adjust_window(key_value, depth, &mut alpha, &mut beta) {
            return Ok(value);
        }
    }
    let alpha_orig = alpha;
    let beta_orig = beta;

    let hint = key.and_then(|key_value| ctx.tt_best_move(key_value));
    let moves = order_moves(
        game,
        evaluator,
        position,
        side,
        legal_moves,
        ctx.ordering(),
        hint,
    );

    let maximizing = side == maximizer;
    let next_depth = depth.saturating_sub(1);
    let mut best: Option<Score> = None;
    let mut best_move: Option<G::Move> = None;

    for mv in moves {
        let Ok(next) = game.apply_move(position, mv) else {
            continue;
        };
        let score = alphabeta(&next, next_depth, alpha, beta, ctx)?;

        if maximizing {
            if best.is_none_or(|value| score > value) {
                best = Some(score);
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
        } else {
            if best.is_none_or(|value| score < value) {
                best = Some(score);
                best_move = Some(mv);
            }
            if score < beta {
                beta = score;
            }
        }

        if alpha >= beta {
            ctx.stats_mut().inc_cutoffs();
            break;
        }
    }

    let Some(best_score) = best else {
        return Ok(leaf_score(game, evaluator, position, maximizer, depth));
    };

    if let Some(key_value) = key {
        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta_orig {
            Bound::Lower
        } else {
            Bound::Exact
        };
        ctx.tt_store(key_value, depth, best_score, bound, best_move);
    }

    Ok(best_score)
}
