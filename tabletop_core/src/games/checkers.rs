use core::fmt;

use crate::ai::alphabeta::{DepthPolicy, Evaluator, Score};
use crate::model::rules::check_size;
use crate::model::{ConfigError, GameModel, IllegalMove, Player};

/// 盤サイズの下限。
const MIN_SIZE: u8 = 6;

/// 盤サイズの上限。
const MAX_SIZE: u8 = 12;

/// 駒取りなしで引き分けになる手数の既定値。
const DEFAULT_QUIET_LIMIT: u16 = 60;

/// 斜めの4方向（行の増分, 列の増分）。
const DIAGONALS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// 駒。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Piece {
    /// 成っているか。
    king: bool,
    /// 持ち主。
    owner: Player,
}

impl Piece {
    /// 成っているかを返す。
    #[inline]
    #[must_use]
    pub const fn is_king(self) -> bool {
        self.king
    }

    /// 持ち主を返す。
    #[inline]
    #[must_use]
    pub const fn owner(self) -> Player {
        self.owner
    }
}

/// 着手（1回のジャンプまたは1マスの移動）。連続ジャンプは1跳びずつ指す。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    /// 移動元のマス（行優先インデックス）。
    from: u8,
    /// 移動先のマス（行優先インデックス）。
    to: u8,
}

impl Move {
    /// 移動元・移動先から生成する。
    #[inline]
    #[must_use]
    pub const fn new(from: u8, to: u8) -> Self {
        Self { from, to }
    }

    /// 移動元を返す。
    #[inline]
    #[must_use]
    pub const fn from(self) -> u8 {
        self.from
    }

    /// 移動先を返す。
    #[inline]
    #[must_use]
    pub const fn to(self) -> u8 {
        self.to
    }
}

/// 局面。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    /// 各マスの駒（行優先、行 0 が後手側）。
    cells: Vec<Option<Piece>>,
    /// 連続ジャンプ中の駒の位置。
    chain: Option<u8>,
    /// 駒取りなしで続いた手数。
    quiet_plies: u16,
    /// 手番。
    side_to_move: Player,
    /// 盤の一辺。
    size: u8,
}

impl Position {
    /// マスの駒を返す。
    #[inline]
    #[must_use]
    pub fn piece(&self, row: u8, col: u8) -> Option<Piece> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let index = usize::from(row)
            .wrapping_mul(usize::from(self.size))
            .wrapping_add(usize::from(col));
        self.cells.get(index).copied().flatten()
    }

    /// 連続ジャンプ中の駒の位置を返す。
    #[inline]
    #[must_use]
    pub const fn chain(&self) -> Option<u8> {
        self.chain
    }

    /// 盤上の駒の総数を返す。
    #[inline]
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    /// 駒取りなしで続いた手数を返す。
    #[inline]
    #[must_use]
    pub const fn quiet_plies(&self) -> u16 {
        self.quiet_plies
    }

    /// 手番を返す。
    #[inline]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// 駒を置いた局面を作る（駒のない盤から組み立てる）。
    ///
    /// 盤外のマスや暗マス以外への配置は無視する。
    #[must_use]
    pub fn with_pieces(
        game: &Checkers,
        pieces: &[(u8, u8, Player, bool)],
        side_to_move: Player,
    ) -> Self {
        let cells = usize::from(game.size).wrapping_mul(usize::from(game.size));
        let mut position = Self {
            cells: vec![None; cells],
            chain: None,
            quiet_plies: 0,
            side_to_move,
            size: game.size,
        };
        for &(row, col, owner, king) in pieces {
            if !is_dark(row, col) {
                continue;
            }
            if let Some(index) = game.index(isize::from(row), isize::from(col)) {
                if let Some(slot) = position.cells.get_mut(index) {
                    *slot = Some(Piece { king, owner });
                }
            }
        }
        position
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(usize::from(self.size).max(1)) {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                let mark = match *cell {
                    Some(Piece { owner: Player::First, king: false }) => "x",
                    Some(Piece { owner: Player::First, king: true }) => "X",
                    Some(Piece { owner: Player::Second, king: false }) => "o",
                    Some(Piece { owner: Player::Second, king: true }) => "O",
                    None => ".",
                };
                f.write_str(mark)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 暗いマス（駒が置かれるマス）か。
const fn is_dark(row: u8, col: u8) -> bool {
    (row.wrapping_add(col)) % 2 == 1
}

/// N×N チェッカー。
///
/// 先手は下側から行 0 へ向かって進み、先に指す。後手は行 0 側から下へ進む。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Checkers {
    /// 取れる駒があるとき取りを強制するか。
    forced_capture: bool,
    /// 駒取りなしでこの手数に達したら引き分け。
    quiet_limit: u16,
    /// 盤の一辺。
    size: u8,
}

impl Checkers {
    /// 一辺 `size` の盤を作る（取りは強制、60手で引き分け）。
    ///
    /// # Errors
    ///
    /// `size` が 6..=12 の偶数でなければエラーを返す。
    pub const fn new(size: u8) -> Result<Self, ConfigError> {
        let size = match check_size(size, MIN_SIZE, MAX_SIZE) {
            Ok(value) => value,
            Err(err) => return Err(err),
        };
        if size % 2 != 0 {
            return Err(ConfigError::SizeNotEven { size });
        }
        Ok(Self {
            forced_capture: true,
            quiet_limit: DEFAULT_QUIET_LIMIT,
            size,
        })
    }

    /// 取りを強制するかを設定する。
    #[inline]
    #[must_use]
    pub const fn with_forced_capture(mut self, forced: bool) -> Self {
        self.forced_capture = forced;
        self
    }

    /// 引き分けまでの駒取りなしの手数を設定する（0 は 1 として扱う）。
    #[inline]
    #[must_use]
    pub const fn with_quiet_limit(mut self, plies: u16) -> Self {
        self.quiet_limit = if plies == 0 { 1 } else { plies };
        self
    }

    /// 盤の一辺を返す。
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// (row, col) のインデックス（盤外は `None`）。
    fn index(&self, row: isize, col: isize) -> Option<usize> {
        let size = isize::from(self.size);
        if !(0..size).contains(&row) || !(0..size).contains(&col) {
            return None;
        }
        usize::try_from(row.wrapping_mul(size).wrapping_add(col)).ok()
    }

    /// インデックスから (row, col) を求める。
    fn coords(&self, index: u8) -> (isize, isize) {
        let size = self.size.max(1);
        (isize::from(index / size), isize::from(index % size))
    }

    /// (row, col) のマスの駒。
    fn at(&self, position: &Position, row: isize, col: isize) -> Option<Piece> {
        self.index(row, col)
            .and_then(|index| position.cells.get(index).copied().flatten())
    }

    /// 駒が進める行方向（先手は -1、後手は +1）。
    const fn forward(owner: Player) -> isize {
        match owner {
            Player::First => -1,
            Player::Second => 1,
        }
    }

    /// 成る行。
    const fn promotion_row(&self, owner: Player) -> isize {
        match owner {
            Player::First => 0,
            Player::Second => (self.size as isize).wrapping_sub(1),
        }
    }

    /// 駒が動ける斜め方向。
    fn directions(piece: Piece) -> impl Iterator<Item = (isize, isize)> {
        let forward = Self::forward(piece.owner);
        DIAGONALS
            .into_iter()
            .filter(move |&(dr, _)| piece.king || dr == forward)
    }

    /// `index` の駒のジャンプを `out` に加える。
    fn push_jumps(&self, position: &Position, index: u8, out: &mut Vec<Move>) {
        let (row, col) = self.coords(index);
        let Some(piece) = self.at(position, row, col) else {
            return;
        };
        for (dr, dc) in Self::directions(piece) {
            let over = self.at(position, row.wrapping_add(dr), col.wrapping_add(dc));
            let land_row = row.wrapping_add(dr.wrapping_mul(2));
            let land_col = col.wrapping_add(dc.wrapping_mul(2));
            let Some(land) = self.index(land_row, land_col) else {
                continue;
            };
            let captures = over.is_some_and(|other| other.owner != piece.owner);
            let empty = position.cells.get(land).is_some_and(Option::is_none);
            if captures && empty {
                if let Ok(to) = u8::try_from(land) {
                    out.push(Move { from: index, to });
                }
            }
        }
    }

    /// `index` の駒の1マス移動を `out` に加える。
    fn push_steps(&self, position: &Position, index: u8, out: &mut Vec<Move>) {
        let (row, col) = self.coords(index);
        let Some(piece) = self.at(position, row, col) else {
            return;
        };
        for (dr, dc) in Self::directions(piece) {
            let Some(target) = self.index(row.wrapping_add(dr), col.wrapping_add(dc)) else {
                continue;
            };
            if position.cells.get(target).is_some_and(Option::is_none) {
                if let Ok(to) = u8::try_from(target) {
                    out.push(Move { from: index, to });
                }
            }
        }
    }

    /// `player` の駒のインデックス。
    fn pieces_of(position: &Position, player: Player) -> impl Iterator<Item = u8> + '_ {
        position
            .cells
            .iter()
            .enumerate()
            .filter(move |&(_, cell)| cell.is_some_and(|piece| piece.owner == player))
            .filter_map(|(index, _)| u8::try_from(index).ok())
    }

    /// `player` の全ジャンプ（連続ジャンプ中は無視）。
    fn all_jumps(&self, position: &Position, player: Player) -> Vec<Move> {
        let mut jumps = Vec::new();
        for index in Self::pieces_of(position, player) {
            self.push_jumps(position, index, &mut jumps);
        }
        jumps
    }

    /// 終局判定をせずに `player` の指し手を生成する。ジャンプが先。
    fn generate(&self, position: &Position, player: Player) -> Vec<Move> {
        if let Some(square) = position.chain {
            if player != position.side_to_move {
                return Vec::new();
            }
            let mut jumps = Vec::new();
            self.push_jumps(position, square, &mut jumps);
            return jumps;
        }

        let mut moves = self.all_jumps(position, player);
        if self.forced_capture && !moves.is_empty() {
            return moves;
        }
        for index in Self::pieces_of(position, player) {
            self.push_steps(position, index, &mut moves);
        }
        moves
    }

    /// 双方が取れる駒の数の合計。
    #[must_use]
    pub fn capture_count(&self, position: &Position) -> usize {
        self.all_jumps(position, Player::First)
            .len()
            .wrapping_add(self.all_jumps(position, Player::Second).len())
    }

    /// 駒取りなしの手数が上限に達しているか。
    const fn is_quiet_draw(&self, position: &Position) -> bool {
        position.quiet_plies >= self.quiet_limit
    }

    /// 手番側が指せない（駒がない、または動けない）か。
    fn side_to_move_is_stuck(&self, position: &Position) -> bool {
        self.generate(position, position.side_to_move).is_empty()
    }
}

impl GameModel for Checkers {
    type Move = Move;
    type Position = Position;

    fn initial(&self) -> Position {
        let rows_per_side = self.size.wrapping_div(2).wrapping_sub(1);
        let mut pieces = Vec::new();
        for row in 0..self.size {
            let owner = if row < rows_per_side {
                Player::Second
            } else if row >= self.size.wrapping_sub(rows_per_side) {
                Player::First
            } else {
                continue;
            };
            for col in 0..self.size {
                pieces.push((row, col, owner, false));
            }
        }
        Position::with_pieces(self, &pieces, Player::First)
    }

    #[inline]
    fn side_to_move(&self, position: &Position) -> Player {
        position.side_to_move
    }

    fn legal_moves(&self, position: &Position, player: Player) -> Vec<Move> {
        if self.is_terminal(position) {
            return Vec::new();
        }
        self.generate(position, player)
    }

    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, IllegalMove> {
        if self.is_terminal(position) {
            return Err(IllegalMove::GameOver);
        }
        let mover = position.side_to_move;
        if !self.generate(position, mover).contains(&mv) {
            return Err(IllegalMove::NotLegal);
        }

        let (from_row, from_col) = self.coords(mv.from);
        let (to_row, to_col) = self.coords(mv.to);
        let jump = from_row.wrapping_sub(to_row).abs() == 2;

        let mut next = position.clone();
        let mut piece = next
            .cells
            .get_mut(usize::from(mv.from))
            .and_then(Option::take)
            .ok_or(IllegalMove::NotLegal)?;

        if jump {
            let mid_row = from_row.wrapping_add(to_row).wrapping_div(2);
            let mid_col = from_col.wrapping_add(to_col).wrapping_div(2);
            let captured = self.index(mid_row, mid_col);
            if let Some(slot) = captured.and_then(|mid| next.cells.get_mut(mid)) {
                *slot = None;
            }
        }

        let promoted = !piece.king && to_row == self.promotion_row(mover);
        if promoted {
            piece.king = true;
        }
        if let Some(slot) = next.cells.get_mut(usize::from(mv.to)) {
            *slot = Some(piece);
        }

        next.quiet_plies = if jump {
            0
        } else {
            position.quiet_plies.saturating_add(1)
        };

        next.chain = None;
        next.side_to_move = mover.opponent();
        if jump && !promoted {
            let mut more = Vec::new();
            self.push_jumps(&next, mv.to, &mut more);
            if !more.is_empty() {
                next.chain = Some(mv.to);
                next.side_to_move = mover;
            }
        }
        Ok(next)
    }

    fn is_terminal(&self, position: &Position) -> bool {
        self.side_to_move_is_stuck(position) || self.is_quiet_draw(position)
    }

    /// 手番側が指せなければ相手の勝ち（駒取りなしの上限より優先）。
    fn is_win(&self, position: &Position, player: Player) -> bool {
        position.side_to_move == player.opponent() && self.side_to_move_is_stuck(position)
    }

    /// ジャンプ（駒取り）。
    fn is_tactical(&self, _position: &Position, mv: Move) -> bool {
        let (from_row, _) = self.coords(mv.from);
        let (to_row, _) = self.coords(mv.to);
        from_row.wrapping_sub(to_row).abs() == 2
    }
}

/// 評価関数の重み。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Weights {
    /// 1行前進するごとの加点（成っていない駒）。
    pub advancement: Score,
    /// 自陣最下段に残る駒（守り）。
    pub back_rank: Score,
    /// 取れる駒1つ。
    pub capture: Score,
    /// 中央4マスの駒。
    pub center: Score,
    /// 王の価値。
    pub king: Score,
    /// 成っていない駒の価値。
    pub man: Score,
    /// 指し手1つ。
    pub mobility: Score,
}

impl Default for Weights {
    #[inline]
    fn default() -> Self {
        Self {
            advancement: 5,
            back_rank: 20,
            capture: 30,
            center: 10,
            king: 160,
            man: 100,
            mobility: 10,
        }
    }
}

/// チェッカーの評価関数。
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

    /// 1駒の位置込みの価値。
    fn piece_value(&self, game: &Checkers, piece: Piece, row: isize, col: isize) -> Score {
        let w = &self.weights;
        let size = isize::from(game.size);
        let last = size.saturating_sub(1);
        let mut value = if piece.king { w.king } else { w.man };

        if !piece.king {
            let home = match piece.owner {
                Player::First => last,
                Player::Second => 0,
            };
            let advanced = row.saturating_sub(home).abs();
            let advanced = Score::try_from(advanced).unwrap_or(0);
            value = value.saturating_add(advanced.saturating_mul(w.advancement));
            if row == home {
                value = value.saturating_add(w.back_rank);
            }
        }

        let half = size.wrapping_div(2);
        let central = |coord: isize| coord == half || coord.saturating_add(1) == half;
        if central(row) && central(col) {
            value = value.saturating_add(w.center);
        }
        value
    }
}

impl Evaluator<Checkers> for Heuristic {
    fn heuristic(&self, game: &Checkers, position: &Position, maximizer: Player) -> Score {
        let mut score: Score = 0;
        for (index, cell) in position.cells.iter().enumerate() {
            let Some(piece) = *cell else { continue };
            let (row, col) = game.coords(u8::try_from(index).unwrap_or(u8::MAX));
            let value = self.piece_value(game, piece, row, col);
            score = if piece.owner == maximizer {
                score.saturating_add(value)
            } else {
                score.saturating_sub(value)
            };
        }

        let opponent = maximizer.opponent();
        let own_moves = count_score(game.generate(position, maximizer).len());
        let opp_moves = count_score(game.generate(position, opponent).len());
        let own_captures = count_score(game.all_jumps(position, maximizer).len());
        let opp_captures = count_score(game.all_jumps(position, opponent).len());

        score = score.saturating_add(
            own_moves
                .saturating_sub(opp_moves)
                .saturating_mul(self.weights.mobility),
        );
        score = score.saturating_add(
            own_captures
                .saturating_sub(opp_captures)
                .saturating_mul(self.weights.capture),
        );
        score
    }
}

/// 件数を評価値の型へ変換する。
fn count_score(count: usize) -> Score {
    Score::try_from(count).unwrap_or(Score::MAX)
}

/// 駒数と取り合いの有無から探索深さを決める。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AdaptiveDepth;

impl DepthPolicy<Checkers> for AdaptiveDepth {
    fn depth(&self, game: &Checkers, position: &Position) -> u8 {
        let pieces = position.piece_count();
        let by_material: u8 = if pieces > 18 {
            4
        } else if pieces > 12 {
            5
        } else if pieces > 6 {
            6
        } else {
            7
        };
        let tactical = position.chain.is_some() || game.capture_count(position) >= 3;
        if tactical {
            by_material.max(6)
        } else {
            by_material
        }
    }
}
