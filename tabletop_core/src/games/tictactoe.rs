use core::fmt;

use crate::ai::alphabeta::{DepthPolicy, Evaluator, Score};
use crate::model::rules::check_size;
use crate::model::{ConfigError, GameModel, IllegalMove, Player};

/// 盤サイズの下限。
const MIN_SIZE: u8 = 3;

/// 盤サイズの上限。
const MAX_SIZE: u8 = 7;

/// マス（行優先のインデックス）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Cell(u8);

impl Cell {
    /// インデックスから生成する（範囲は検査しない）。
    #[inline]
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// 行・列から生成する。盤外なら `None`。
    #[inline]
    #[must_use]
    pub const fn from_row_col(row: u8, col: u8, size: u8) -> Option<Self> {
        if row >= size || col >= size {
            return None;
        }
        Some(Self(row.wrapping_mul(size).wrapping_add(col)))
    }

    /// 行優先のインデックスを返す。
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// 局面。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    /// 各マスの石（行優先）。
    cells: Vec<Option<Player>>,
    /// 手番。
    side_to_move: Player,
    /// 盤の一辺。
    size: u8,
}

impl Position {
    /// 盤面と手番から局面を作る。マス数が `size * size` でなければ `None`。
    #[must_use]
    pub fn from_cells(size: u8, cells: Vec<Option<Player>>, side_to_move: Player) -> Option<Self> {
        let expected = usize::from(size).wrapping_mul(usize::from(size));
        (cells.len() == expected).then_some(Self {
            cells,
            side_to_move,
            size,
        })
    }

    /// マスの石を返す。
    #[inline]
    #[must_use]
    pub fn cell(&self, cell: Cell) -> Option<Player> {
        self.cells.get(cell.index()).copied().flatten()
    }

    /// 空きマス数を返す。
    #[inline]
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// 手番を返す。
    #[inline]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(usize::from(self.size)) {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                let mark = match *cell {
                    Some(Player::First) => "X",
                    Some(Player::Second) => "O",
                    None => ".",
                };
                f.write_str(mark)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// N×N の三目並べ。一列（行・列・対角）を揃えた側の勝ち。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicTacToe {
    /// 勝ちとなる列（マスのインデックス列）。
    lines: Vec<Vec<usize>>,
    /// 盤の一辺。
    size: u8,
}

impl TicTacToe {
    /// 一辺 `size` の盤を作る。
    ///
    /// # Errors
    ///
    /// `size` が 3..=7 の範囲外ならエラーを返す。
    pub fn new(size: u8) -> Result<Self, ConfigError> {
        let size = check_size(size, MIN_SIZE, MAX_SIZE)?;
        Ok(Self {
            lines: build_lines(usize::from(size)),
            size,
        })
    }

    /// 3×3 の盤。
    #[must_use]
    pub fn standard() -> Self {
        Self {
            lines: build_lines(usize::from(MIN_SIZE)),
            size: MIN_SIZE,
        }
    }

    /// 盤の一辺を返す。
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// 勝ちとなる列を返す。
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[Vec<usize>] {
        &self.lines
    }

    /// 一列揃えたプレイヤーを返す。
    #[must_use]
    pub fn winner(&self, position: &Position) -> Option<Player> {
        self.lines.iter().find_map(|line| line_owner(position, line))
    }

    /// `player` があと1マスで揃う「開いた列」の数を返す。
    #[must_use]
    pub fn open_lines(&self, position: &Position, player: Player) -> usize {
        self.lines
            .iter()
            .filter(|line| is_open_line(position, line, player))
            .count()
    }

    /// `player` が次の1手で列を揃えられるマスの数（同じマスを共有する列は1つと数える）。
    #[must_use]
    pub fn winning_cells(&self, position: &Position, player: Player) -> usize {
        let mut gaps: Vec<usize> = self
            .lines
            .iter()
            .filter(|line| is_open_line(position, line, player))
            .filter_map(|line| {
                line.iter()
                    .copied()
                    .find(|&index| position.cells.get(index).copied().flatten().is_none())
            })
            .collect();
        gaps.sort_unstable();
        gaps.dedup();
        gaps.len()
    }

    /// `cell` に置くと `player` の列が揃うかを返す。
    fn completes_line(&self, position: &Position, cell: Cell, player: Player) -> bool {
        let target = cell.index();
        self.lines
            .iter()
            .filter(|line| line.contains(&target))
            .any(|line| {
                line.iter()
                    .filter(|&&index| index != target)
                    .all(|&index| position.cells.get(index).copied().flatten() == Some(player))
            })
    }
}

/// 行・列・2本の対角線を作る。
fn build_lines(size: usize) -> Vec<Vec<usize>> {
    let mut lines = Vec::with_capacity(size.wrapping_mul(2).wrapping_add(2));
    for row in 0..size {
        lines.push((0..size).map(|col| row.wrapping_mul(size).wrapping_add(col)).collect());
    }
    for col in 0..size {
        lines.push((0..size).map(|row| row.wrapping_mul(size).wrapping_add(col)).collect());
    }
    lines.push((0..size).map(|i| i.wrapping_mul(size).wrapping_add(i)).collect());
    lines.push(
        (0..size)
            .map(|i| i.wrapping_mul(size).wrapping_add(size.wrapping_sub(1).wrapping_sub(i)))
            .collect(),
    );
    lines
}

/// 列がすべて同じプレイヤーの石ならそのプレイヤーを返す。
fn line_owner(position: &Position, line: &[usize]) -> Option<Player> {
    let first = position.cells.get(*line.first()?).copied().flatten()?;
    line.iter()
        .all(|&index| position.cells.get(index).copied().flatten() == Some(first))
        .then_some(first)
}

/// 相手の石がなく、空きが1マスだけの列か。
fn is_open_line(position: &Position, line: &[usize], player: Player) -> bool {
    let mut own = 0_usize;
    for &index in line {
        match position.cells.get(index).copied().flatten() {
            Some(owner) if owner == player => own = own.wrapping_add(1),
            Some(_) => return false,
            None => {}
        }
    }
    own == line.len().wrapping_sub(1)
}

impl GameModel for TicTacToe {
    type Move = Cell;
    type Position = Position;

    fn initial(&self) -> Position {
        let cells = usize::from(self.size).wrapping_mul(usize::from(self.size));
        Position {
            cells: vec![None; cells],
            side_to_move: Player::First,
            size: self.size,
        }
    }

    #[inline]
    fn side_to_move(&self, position: &Position) -> Player {
        position.side_to_move
    }

    fn legal_moves(&self, position: &Position, _player: Player) -> Vec<Cell> {
        if self.is_terminal(position) {
            return Vec::new();
        }
        position
            .cells
            .iter()
            .enumerate()
            .filter(|&(_, cell)| cell.is_none())
            .filter_map(|(index, _)| u8::try_from(index).ok().map(Cell))
            .collect()
    }

    fn apply_move(&self, position: &Position, mv: Cell) -> Result<Position, IllegalMove> {
        if self.is_terminal(position) {
            return Err(IllegalMove::GameOver);
        }
        let mut next = position.clone();
        match next.cells.get_mut(mv.index()) {
            Some(slot @ None) => *slot = Some(position.side_to_move),
            _ => return Err(IllegalMove::NotLegal),
        }
        next.side_to_move = position.side_to_move.opponent();
        Ok(next)
    }

    fn is_terminal(&self, position: &Position) -> bool {
        self.winner(position).is_some() || position.cells.iter().all(Option::is_some)
    }

    #[inline]
    fn is_win(&self, position: &Position, player: Player) -> bool {
        self.winner(position) == Some(player)
    }

    /// 即勝ちの手と、相手の即勝ちを防ぐ手。
    fn is_tactical(&self, position: &Position, mv: Cell) -> bool {
        let mover = position.side_to_move;
        self.completes_line(position, mv, mover)
            || self.completes_line(position, mv, mover.opponent())
    }
}

/// 評価関数の重み。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Weights {
    /// 中央のマス（偶数盤では中央4マスそれぞれに半分）。
    pub center: Score,
    /// 角。
    pub corner: Score,
    /// 角以外の辺。
    pub edge: Score,
    /// あと1マスで揃う開いた列。
    pub open_line: Score,
}

impl Default for Weights {
    #[inline]
    fn default() -> Self {
        Self {
            center: 10_000,
            corner: 500,
            edge: 100,
            open_line: 1_000,
        }
    }
}

/// 三目並べの評価関数。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Heuristic {
    /// 重み。
    pub weights: Weights,
}

impl Heuristic {
    /// 重みを指定して生成する。
    #[inline]
    #[must_use]
    pub const fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// マスの位置に応じた重みを返す。
    fn cell_weight(&self, index: usize, size: usize) -> Score {
        let row = index.checked_div(size).unwrap_or(0);
        let col = index.checked_rem(size).unwrap_or(0);
        let last = size.wrapping_sub(1);
        let half = size.wrapping_div(2);

        let is_center = if size % 2 == 1 {
            row == half && col == half
        } else {
            (row == half || row.wrapping_add(1) == half)
                && (col == half || col.wrapping_add(1) == half)
        };
        if is_center {
            return if size % 2 == 1 {
                self.weights.center
            } else {
                self.weights.center.wrapping_div(2)
            };
        }

        let row_edge = row == 0 || row == last;
        let col_edge = col == 0 || col == last;
        match (row_edge, col_edge) {
            (true, true) => self.weights.corner,
            (true, false) | (false, true) => self.weights.edge,
            (false, false) => 0,
        }
    }
}

impl Evaluator<TicTacToe> for Heuristic {
    fn heuristic(&self, game: &TicTacToe, position: &Position, maximizer: Player) -> Score {
        let size = usize::from(game.size);
        let mut score: Score = 0;

        for (index, cell) in position.cells.iter().enumerate() {
            let Some(owner) = *cell else { continue };
            let weight = self.cell_weight(index, size);
            score = if owner == maximizer {
                score.saturating_add(weight)
            } else {
                score.saturating_sub(weight)
            };
        }

        let own = count_score(game.open_lines(position, maximizer));
        let opp = count_score(game.open_lines(position, maximizer.opponent()));
        score = score.saturating_add(own.saturating_sub(opp).saturating_mul(self.weights.open_line));
        score
    }
}

/// 件数を評価値の型へ変換する。
fn count_score(count: usize) -> Score {
    Score::try_from(count).unwrap_or(Score::MAX)
}

/// 盤サイズと空きマス数から探索深さを決める。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AdaptiveDepth;

impl DepthPolicy<TicTacToe> for AdaptiveDepth {
    fn depth(&self, game: &TicTacToe, position: &Position) -> u8 {
        let empty = u8::try_from(position.empty_count()).unwrap_or(u8::MAX);
        let base = match game.size {
            3 => 7,
            4 => empty.min(6),
            _ => empty.min(5),
        };
        let mover = position.side_to_move;
        let double_threat =
            game.winning_cells(position, mover) >= 2 || game.winning_cells(position, mover.opponent()) >= 2;
        let depth = if double_threat {
            base.saturating_add(2).min(empty)
        } else {
            base
        };
        depth.max(1)
    }
}
