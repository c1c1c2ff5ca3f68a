use core::fmt;

use crate::ai::alphabeta::{DepthPolicy, Evaluator, Score};
use crate::model::{GameModel, IllegalMove, Player};

/// 盤のマス数。
const CELLS: usize = 16;

/// 駒の種類数。
const PIECES: u8 = 16;

/// 全駒が残っている状態。
const ALL_PIECES: u16 = u16::MAX;

/// 4属性すべてのマスク。
const ATTRIBUTE_MASK: u8 = 0b1111;

/// 揃うと勝ちになる列（行・列・対角）。
const LINES: [[usize; 4]; 10] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

/// 駒（4つの二値属性）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Piece(u8);

impl Piece {
    /// 背が高い。
    pub const TALL: u8 = 0b0001;
    /// 色が濃い。
    pub const DARK: u8 = 0b0010;
    /// 四角い。
    pub const SQUARE: u8 = 0b0100;
    /// 中空。
    pub const HOLLOW: u8 = 0b1000;

    /// 属性ビットから生成する。0..16 の範囲外なら `None`。
    #[inline]
    #[must_use]
    pub const fn new(bits: u8) -> Option<Self> {
        if bits < PIECES {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// 属性ビットを返す。
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// 残り駒集合の中のビット。
    const fn mask(self) -> u16 {
        match 1_u16.checked_shl(self.0 as u32) {
            Some(value) => value,
            None => 0,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = |flag: u8, upper: char, lower: char| {
            if self.0 & flag != 0 { upper } else { lower }
        };
        write!(
            f,
            "{}{}{}{}",
            letter(Self::TALL, 'T', 't'),
            letter(Self::DARK, 'D', 'd'),
            letter(Self::SQUARE, 'S', 's'),
            letter(Self::HOLLOW, 'H', 'h'),
        )
    }
}

/// 着手：手持ちの駒を置き、相手に駒を渡す。
///
/// 最初の手は置かずに渡すだけ。置いて勝った手と最後の駒を置いた手は渡さない。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    /// 相手に渡す駒。
    give: Option<Piece>,
    /// 置くマス（0..16、行優先）。
    place: Option<u8>,
}

impl Move {
    /// 置くマスと渡す駒から生成する。
    #[inline]
    #[must_use]
    pub const fn new(place: Option<u8>, give: Option<Piece>) -> Self {
        Self { give, place }
    }

    /// 渡す駒を返す。
    #[inline]
    #[must_use]
    pub const fn give(self) -> Option<Piece> {
        self.give
    }

    /// 置くマスを返す。
    #[inline]
    #[must_use]
    pub const fn place(self) -> Option<u8> {
        self.place
    }
}

/// 局面。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    /// まだ誰にも渡していない駒の集合（ビット i が `Piece(i)`）。
    available: u16,
    /// 盤面（行優先）。
    board: [Option<Piece>; CELLS],
    /// 手番側が持っている（置くべき）駒。
    in_hand: Option<Piece>,
    /// 手番。
    side_to_move: Player,
    /// 列を揃えたプレイヤー。
    winner: Option<Player>,
}

impl Position {
    /// 空きマス数を返す。
    #[inline]
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.board.iter().filter(|cell| cell.is_none()).count()
    }

    /// 手番側が持っている駒を返す。
    #[inline]
    #[must_use]
    pub const fn in_hand(&self) -> Option<Piece> {
        self.in_hand
    }

    /// 手番を返す。
    #[inline]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// まだ渡せる駒。
    fn available_pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        (0..PIECES)
            .filter_map(Piece::new)
            .filter(|piece| self.available & piece.mask() != 0)
    }

    /// 空きマス。
    fn empty_cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter(|&(_, cell)| cell.is_none())
            .filter_map(|(index, _)| u8::try_from(index).ok())
    }

    /// `cell` に `piece` を置くと列が揃うか。
    fn completes_line(&self, cell: u8, piece: Piece) -> bool {
        let target = usize::from(cell);
        LINES.iter().filter(|line| line.contains(&target)).any(|line| {
            let mut common = ATTRIBUTE_MASK;
            let mut common_absent = ATTRIBUTE_MASK;
            for &index in line {
                let bits = if index == target {
                    piece.0
                } else {
                    match self.board.get(index).copied().flatten() {
                        Some(other) => other.0,
                        None => return false,
                    }
                };
                common &= bits;
                common_absent &= !bits;
            }
            common != 0 || common_absent != 0
        })
    }

    /// `piece` をどこかに置けば列が揃うか。
    fn has_winning_cell(&self, piece: Piece) -> bool {
        self.empty_cells().any(|cell| self.completes_line(cell, piece))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board.chunks(4) {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                match *cell {
                    Some(piece) => write!(f, "{piece}")?,
                    None => f.write_str("....")?,
                }
            }
            writeln!(f)?;
        }
        match self.in_hand {
            Some(piece) => writeln!(f, "in hand: {piece}"),
            None => writeln!(f, "in hand: -"),
        }
    }
}

/// クアルト（4×4、16駒）。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Quarto;

impl Quarto {
    /// ルールを作る。
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// 置き場所 `place`（`None` は置かない）に対して渡せる駒の選択肢。
    fn gives_after(position: &Position, place: Option<u8>) -> Vec<Option<Piece>> {
        let wins = match (place, position.in_hand) {
            (Some(cell), Some(piece)) => position.completes_line(cell, piece),
            _ => false,
        };
        if wins || position.available == 0 {
            return vec![None];
        }
        position.available_pieces().map(Some).collect()
    }
}

impl GameModel for Quarto {
    type Move = Move;
    type Position = Position;

    fn initial(&self) -> Position {
        Position {
            available: ALL_PIECES,
            board: [None; CELLS],
            in_hand: None,
            side_to_move: Player::First,
            winner: None,
        }
    }

    #[inline]
    fn side_to_move(&self, position: &Position) -> Player {
        position.side_to_move
    }

    fn legal_moves(&self, position: &Position, _player: Player) -> Vec<Move> {
        if self.is_terminal(position) {
            return Vec::new();
        }
        let places: Vec<Option<u8>> = if position.in_hand.is_some() {
            position.empty_cells().map(Some).collect()
        } else {
            vec![None]
        };
        places
            .into_iter()
            .flat_map(|place| {
                Self::gives_after(position, place)
                    .into_iter()
                    .map(move |give| Move { give, place })
            })
            .collect()
    }

    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, IllegalMove> {
        if self.is_terminal(position) {
            return Err(IllegalMove::GameOver);
        }
        let mover = position.side_to_move;
        let mut next = position.clone();

        match (position.in_hand, mv.place) {
            (Some(piece), Some(cell)) => {
                match next.board.get_mut(usize::from(cell)) {
                    Some(slot @ None) => *slot = Some(piece),
                    _ => return Err(IllegalMove::NotLegal),
                }
                if position.completes_line(cell, piece) {
                    next.winner = Some(mover);
                }
                next.in_hand = None;
            }
            (None, None) => {}
            _ => return Err(IllegalMove::NotLegal),
        }

        let must_give = next.winner.is_none() && next.available != 0;
        match (must_give, mv.give) {
            (true, Some(piece)) if next.available & piece.mask() != 0 => {
                next.available &= !piece.mask();
                next.in_hand = Some(piece);
                next.side_to_move = mover.opponent();
            }
            (false, None) => {}
            _ => return Err(IllegalMove::NotLegal),
        }
        Ok(next)
    }

    fn is_terminal(&self, position: &Position) -> bool {
        position.winner.is_some() || position.board.iter().all(Option::is_some)
    }

    #[inline]
    fn is_win(&self, position: &Position, player: Player) -> bool {
        position.winner == Some(player)
    }

    /// 置いて列を揃える手。
    fn is_tactical(&self, position: &Position, mv: Move) -> bool {
        match (mv.place, position.in_hand) {
            (Some(cell), Some(piece)) => position.completes_line(cell, piece),
            _ => false,
        }
    }
}

/// 評価関数の重み。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Weights {
    /// 渡しても相手がすぐには勝てない駒1つ。
    pub safe_piece: Score,
    /// 手持ちの駒で列を揃えられる。
    pub threat: Score,
}

impl Default for Weights {
    #[inline]
    fn default() -> Self {
        Self {
            safe_piece: 35,
            threat: 500,
        }
    }
}

/// クアルトの評価関数（手番側の視点で数え、`maximizer` 視点に直す）。
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
}

impl Evaluator<Quarto> for Heuristic {
    fn heuristic(&self, _game: &Quarto, position: &Position, maximizer: Player) -> Score {
        let mut score: Score = 0;
        if position.in_hand.is_some_and(|piece| position.has_winning_cell(piece)) {
            score = score.saturating_add(self.weights.threat);
        }
        let safe = position
            .available_pieces()
            .filter(|&piece| !position.has_winning_cell(piece))
            .count();
        let safe = Score::try_from(safe).unwrap_or(Score::MAX);
        score = score.saturating_add(safe.saturating_mul(self.weights.safe_piece));

        if position.side_to_move == maximizer {
            score
        } else {
            score.saturating_neg()
        }
    }
}

/// 空きマス数から探索深さ（置く＋渡すを1手とする）を決める。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AdaptiveDepth;

impl DepthPolicy<Quarto> for AdaptiveDepth {
    fn depth(&self, _game: &Quarto, position: &Position) -> u8 {
        let empty = u8::try_from(position.empty_count()).unwrap_or(u8::MAX);
        if empty >= 10 {
            2
        } else if empty >= 6 {
            3
        } else {
            empty.saturating_add(1)
        }
    }
}
