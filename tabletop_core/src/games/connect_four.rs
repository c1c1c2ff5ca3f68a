use core::fmt;

use crate::ai::alphabeta::{DepthPolicy, Evaluator, Score};
use crate::model::rules::check_size;
use crate::model::{ConfigError, GameModel, IllegalMove, Player};

/// 盤の行数・列数の下限。
const MIN_DIM: u8 = 4;

/// 盤の行数・列数の上限。
const MAX_DIM: u8 = 16;

/// 揃えると勝ちになる石の数。
const CONNECT: usize = 4;

/// 連の方向（行の増分, 列の増分）。行 0 は最下段。
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// 石を落とす列。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Column(u8);

impl Column {
    /// 列番号（左端が 0）から生成する。
    #[inline]
    #[must_use]
    pub const fn new(column: u8) -> Self {
        Self(column)
    }

    /// 列番号を返す。
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// 局面。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    /// 各マスの石（`row * cols + col`、行 0 が最下段）。
    cells: Vec<Option<Player>>,
    /// 列数。
    cols: u8,
    /// 各列に積まれた石の数。
    heights: Vec<u8>,
    /// 手番。
    side_to_move: Player,
    /// 4連を作ったプレイヤー。
    winner: Option<Player>,
}

impl Position {
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
        let cols = usize::from(self.cols).max(1);
        for row in self.cells.chunks(cols).rev() {
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
        for col in 0..self.cols {
            if col > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", col % 10)?;
        }
        writeln!(f)
    }
}

/// 四目並べ（R×C、4連で勝ち）。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConnectFour {
    /// 列数。
    cols: u8,
    /// 行数。
    rows: u8,
}

impl ConnectFour {
    /// 行数・列数を指定して作る。
    ///
    /// # Errors
    ///
    /// どちらかが 4..=16 の範囲外ならエラーを返す。
    pub const fn new(rows: u8, cols: u8) -> Result<Self, ConfigError> {
        let rows = match check_size(rows, MIN_DIM, MAX_DIM) {
            Ok(value) => value,
            Err(err) => return Err(err),
        };
        let cols = match check_size(cols, MIN_DIM, MAX_DIM) {
            Ok(value) => value,
            Err(err) => return Err(err),
        };
        Ok(Self { cols, rows })
    }

    /// 6行7列の標準盤。
    #[inline]
    #[must_use]
    pub const fn standard() -> Self {
        Self { cols: 7, rows: 6 }
    }

    /// 列数を返す。
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u8 {
        self.cols
    }

    /// 行数を返す。
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// マスの石を返す（盤外は `None`）。
    fn at(&self, position: &Position, row: isize, col: isize) -> Option<Player> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        if row >= usize::from(self.rows) || col >= usize::from(self.cols) {
            return None;
        }
        let index = row.wrapping_mul(usize::from(self.cols)).wrapping_add(col);
        position.cells.get(index).copied().flatten()
    }

    /// 盤内の座標か。
    fn on_board(&self, row: isize, col: isize) -> bool {
        let rows = isize::from(self.rows);
        let cols = isize::from(self.cols);
        (0..rows).contains(&row) && (0..cols).contains(&col)
    }

    /// 列に次に石が入る行を返す（満杯なら `None`）。
    fn drop_row(&self, position: &Position, column: Column) -> Option<u8> {
        let height = *position.heights.get(column.index())?;
        (height < self.rows).then_some(height)
    }

    /// (row, col) に `player` の石があるとして、そこを通る4連があるか。
    fn connects_through(&self, position: &Position, row: isize, col: isize, player: Player) -> bool {
        DIRECTIONS.iter().any(|&(dr, dc)| {
            let forward = self.run_length(position, row, col, dr, dc, player);
            let backward =
                self.run_length(position, row, col, dr.wrapping_neg(), dc.wrapping_neg(), player);
            forward.wrapping_add(backward).wrapping_add(1) >= CONNECT
        })
    }

    /// (row, col) から (dr, dc) 方向に続く `player` の石の数（起点は含まない）。
    fn run_length(
        &self,
        position: &Position,
        row: isize,
        col: isize,
        dr: isize,
        dc: isize,
        player: Player,
    ) -> usize {
        let mut count = 0_usize;
        let mut r = row.wrapping_add(dr);
        let mut c = col.wrapping_add(dc);
        while self.at(position, r, c) == Some(player) {
            count = count.wrapping_add(1);
            r = r.wrapping_add(dr);
            c = c.wrapping_add(dc);
        }
        count
    }

    /// `player` が `column` に落とすと即勝ちになるか。
    fn wins_at(&self, position: &Position, column: Column, player: Player) -> bool {
        let Some(row) = self.drop_row(position, column) else {
            return false;
        };
        let col = isize::try_from(column.index()).unwrap_or(isize::MAX);
        self.connects_through(position, isize::from(row), col, player)
    }

    /// `player` が即勝ちできる列の数を返す。
    #[must_use]
    pub fn winning_columns(&self, position: &Position, player: Player) -> usize {
        (0..self.cols)
            .filter(|&col| self.wins_at(position, Column(col), player))
            .count()
    }

    /// 中央から外側への列の並び（同じ距離なら左が先）。
    fn center_first(&self) -> Vec<u8> {
        let center = i16::from(self.cols.wrapping_sub(1));
        let mut columns: Vec<u8> = (0..self.cols).collect();
        columns.sort_by_key(|&col| (i16::from(col).wrapping_mul(2).wrapping_sub(center)).abs());
        columns
    }
}

impl GameModel for ConnectFour {
    type Move = Column;
    type Position = Position;

    fn initial(&self) -> Position {
        let cells = usize::from(self.rows).wrapping_mul(usize::from(self.cols));
        Position {
            cells: vec![None; cells],
            cols: self.cols,
            heights: vec![0; usize::from(self.cols)],
            side_to_move: Player::First,
            winner: None,
        }
    }

    #[inline]
    fn side_to_move(&self, position: &Position) -> Player {
        position.side_to_move
    }

    fn legal_moves(&self, position: &Position, _player: Player) -> Vec<Column> {
        if self.is_terminal(position) {
            return Vec::new();
        }
        self.center_first()
            .into_iter()
            .map(Column)
            .filter(|&column| self.drop_row(position, column).is_some())
            .collect()
    }

    fn apply_move(&self, position: &Position, mv: Column) -> Result<Position, IllegalMove> {
        if self.is_terminal(position) {
            return Err(IllegalMove::GameOver);
        }
        let row = self.drop_row(position, mv).ok_or(IllegalMove::NotLegal)?;
        let mover = position.side_to_move;

        let mut next = position.clone();
        let index = usize::from(row)
            .wrapping_mul(usize::from(self.cols))
            .wrapping_add(mv.index());
        match next.cells.get_mut(index) {
            Some(slot) => *slot = Some(mover),
            None => return Err(IllegalMove::NotLegal),
        }
        if let Some(height) = next.heights.get_mut(mv.index()) {
            *height = height.wrapping_add(1);
        }

        let col = isize::try_from(mv.index()).unwrap_or(isize::MAX);
        if self.connects_through(&next, isize::from(row), col, mover) {
            next.winner = Some(mover);
        }
        next.side_to_move = mover.opponent();
        Ok(next)
    }

    fn is_terminal(&self, position: &Position) -> bool {
        position.winner.is_some() || position.heights.iter().all(|&height| height >= self.rows)
    }

    #[inline]
    fn is_win(&self, position: &Position, player: Player) -> bool {
        position.winner == Some(player)
    }

    /// 即勝ちの手と、相手の即勝ちを防ぐ手。
    fn is_tactical(&self, position: &Position, mv: Column) -> bool {
        let mover = position.side_to_move;
        self.wins_at(position, mv, mover) || self.wins_at(position, mv, mover.opponent())
    }
}

/// 評価関数の重み。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Weights {
    /// 中央列の石1つ。
    pub center: Score,
    /// 3つ＋空き1つの窓。
    pub three: Score,
    /// 2つ＋空き2つの窓。
    pub two: Score,
    /// 相手の窓に掛ける守備係数。
    pub opponent_factor: Score,
}

impl Default for Weights {
    #[inline]
    fn default() -> Self {
        Self {
            center: 10,
            opponent_factor: 4,
            three: 1_000,
            two: 100,
        }
    }
}

/// 四目並べの評価関数。
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

    /// 窓（4マス）の評価。
    fn window_score(&self, own: usize, opp: usize, empty: usize) -> Score {
        let w = &self.weights;
        match (own, opp, empty) {
            (3, 0, 1) => w.three,
            (2, 0, 2) => w.two,
            (0, 3, 1) => w.three.saturating_mul(w.opponent_factor).saturating_neg(),
            (0, 2, 2) => w.two.saturating_mul(w.opponent_factor).saturating_neg(),
            _ => 0,
        }
    }
}

impl Evaluator<ConnectFour> for Heuristic {
    fn heuristic(&self, game: &ConnectFour, position: &Position, maximizer: Player) -> Score {
        let rows = isize::from(game.rows);
        let cols = isize::from(game.cols);
        let span = isize::try_from(CONNECT).unwrap_or(isize::MAX).saturating_sub(1);
        let mut score: Score = 0;

        for row in 0..rows {
            for col in 0..cols {
                for &(dr, dc) in &DIRECTIONS {
                    let end_row = row.saturating_add(dr.saturating_mul(span));
                    let end_col = col.saturating_add(dc.saturating_mul(span));
                    if !game.on_board(end_row, end_col) {
                        continue;
                    }
                    let (mut own, mut opp, mut empty) = (0_usize, 0_usize, 0_usize);
                    for step in 0..=span {
                        let r = row.saturating_add(dr.saturating_mul(step));
                        let c = col.saturating_add(dc.saturating_mul(step));
                        match game.at(position, r, c) {
                            Some(owner) if owner == maximizer => own = own.saturating_add(1),
                            Some(_) => opp = opp.saturating_add(1),
                            None => empty = empty.saturating_add(1),
                        }
                    }
                    score = score.saturating_add(self.window_score(own, opp, empty));
                }
            }
        }

        // 中央列（偶数列数なら中央2列）。
        let left = cols.saturating_sub(1).wrapping_div(2);
        let right = cols.wrapping_div(2);
        let center_cols = if left == right {
            vec![left]
        } else {
            vec![left, right]
        };
        for col in center_cols {
            for row in 0..rows {
                match game.at(position, row, col) {
                    Some(owner) if owner == maximizer => {
                        score = score.saturating_add(self.weights.center);
                    }
                    Some(_) => score = score.saturating_sub(self.weights.center),
                    None => {}
                }
            }
        }
        score
    }
}

/// 空きマス数から探索深さを決める。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AdaptiveDepth;

impl DepthPolicy<ConnectFour> for AdaptiveDepth {
    fn depth(&self, game: &ConnectFour, position: &Position) -> u8 {
        let empty = position.empty_count();
        let base: u8 = if empty >= 35 {
            5
        } else if empty >= 25 {
            6
        } else if empty >= 15 {
            7
        } else {
            8
        };
        let mover = position.side_to_move;
        let double_threat = game.winning_columns(position, mover) >= 2
            || game.winning_columns(position, mover.opponent()) >= 2;
        if double_threat {
            base.saturating_add(1)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AdaptiveDepth, Column, ConnectFour, Heuristic, Position, Weights};
    use crate::ai::alphabeta::{DepthPolicy as _, Evaluator as _, HEURISTIC_LIMIT, Score};
    use crate::model::{GameModel as _, IllegalMove, Outcome, Player};

    fn play(game: &ConnectFour, columns: &[u8]) -> Position {
        let mut position = game.initial();
        for &column in columns {
            position = match game.apply_move(&position, Column::new(column)) {
                Ok(value) => value,
                Err(err) => panic!("setup move {column} rejected: {err}"),
            };
        }
        position
    }

    #[test]
    fn moves_are_generated_center_first() {
        let game = ConnectFour::standard();
        let moves = game.legal_moves(&game.initial(), Player::First);
        let columns: Vec<usize> = moves.into_iter().map(Column::index).collect();
        assert_eq!(columns, vec![3, 2, 4, 1, 5, 0, 6]);
    }

    #[test]
    fn huge_defensive_weight_keeps_the_sign() {
        let game = ConnectFour::standard();
        let heuristic = Heuristic::new(Weights {
            center: 0,
            opponent_factor: 4,
            three: Score::MAX / 2,
            two: 0,
        });
        // 後手が3列目に縦3つ、先手の手番。
        let position = play(&game, &[0, 3, 0, 3, 6, 3]);
        assert_eq!(heuristic.evaluate(&game, &position, Player::First), -HEURISTIC_LIMIT);
        assert_eq!(heuristic.evaluate(&game, &position, Player::Second), HEURISTIC_LIMIT);
    }

    #[test]
    fn horizontal_and_diagonal_wins() {
        let game = ConnectFour::standard();
        let horizontal = play(&game, &[0, 0, 1, 1, 2, 2, 3]);
        assert_eq!(game.outcome(&horizontal), Some(Outcome::Winner(Player::First)));

        // 先手: 0,1,2,3 の斜め（各列の高さ 1,2,3,4 段目）
        let diagonal = play(&game, &[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);
        assert!(game.is_win(&diagonal, Player::First));
        assert!(game.is_terminal(&diagonal));
    }

    #[test]
    fn full_column_is_rejected() {
        let game = ConnectFour::standard();
        let position = play(&game, &[0, 0, 0, 0, 0, 0]);
        assert_eq!(
            game.apply_move(&position, Column::new(0)),
            Err(IllegalMove::NotLegal)
        );
        assert_eq!(
            game.apply_move(&position, Column::new(7)),
            Err(IllegalMove::NotLegal)
        );
        assert_eq!(game.legal_moves(&position, Player::First).len(), 6);
    }

    #[test]
    fn blocking_move_is_tactical() {
        let game = ConnectFour::standard();
        // 先手が 0,1,2 に並べ、後手の手番。
        let position = play(&game, &[0, 6, 1, 6, 2]);
        assert!(game.is_tactical(&position, Column::new(3)));
        assert!(!game.is_tactical(&position, Column::new(5)));
        assert_eq!(game.winning_columns(&position, Player::First), 1);
    }

    #[test]
    fn opponent_threats_weigh_more_than_own() {
        let game = ConnectFour::standard();
        let heuristic = Heuristic::default();
        let position = play(&game, &[0, 6, 1, 6, 2]);
        assert!(heuristic.evaluate(&game, &position, Player::Second) < 0);
        assert!(heuristic.evaluate(&game, &position, Player::First) > 0);
    }

    #[test]
    fn adaptive_depth_grows_as_board_fills() {
        let game = ConnectFour::standard();
        assert_eq!(AdaptiveDepth.depth(&game, &game.initial()), 5);

        // 先手は 1,2,3 列の最下段に並べ、0 列と 4 列の両方で勝てる。
        let position = play(&game, &[1, 1, 2, 2, 3, 3]);
        assert_eq!(game.winning_columns(&position, Player::First), 2);
        assert_eq!(AdaptiveDepth.depth(&game, &position), 6);
    }

    #[test]
    fn display_shows_bottom_row_last() {
        let game = ConnectFour::new(4, 4).unwrap_or_else(|err| panic!("{err}"));
        let position = play(&game, &[1]);
        assert_eq!(
            position.to_string(),
            ". . . .\n. . . .\n. . . .\n. X . .\n0 1 2 3\n"
        );
    }
}
