use core::fmt;

use crate::ai::alphabeta::{DepthPolicy, Evaluator, Score};
use crate::model::{GameModel, IllegalMove, Player};

/// ビットボード演算。
mod bitboard;

use bitboard::{bit, flips, indices, legal_moves};

/// 盤の一辺の長さ。
const BOARD_LEN: u8 = 8;

/// マスの総数。
const SQUARES: u8 = 64;

/// 四隅のマスク。
const CORNER_MASK: u64 = 0x8100_0000_0000_0081;

/// 外周のマスク（四隅を含む）。
const EDGE_MASK: u64 = 0xFF81_8181_8181_81FF;

/// 隅と、その隣（C/X マス）の組。
const CORNER_NEIGHBORS: [(u8, [u8; 3]); 4] = [
    (0, [1, 8, 9]),
    (7, [6, 15, 14]),
    (56, [57, 48, 49]),
    (63, [62, 55, 54]),
];

/// 盤面上のマス（`y * 8 + x`）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// 盤面座標（x, y）から生成する。盤外なら `None`。
    #[inline]
    #[must_use]
    pub const fn from_xy(x: u8, y: u8) -> Option<Self> {
        if x >= BOARD_LEN || y >= BOARD_LEN {
            return None;
        }
        Some(Self(y.wrapping_mul(BOARD_LEN).wrapping_add(x)))
    }

    /// 0..=63 のインデックスから生成する。範囲外なら `None`。
    #[inline]
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < SQUARES {
            Some(Self(index))
        } else {
            None
        }
    }

    /// 0..=63 のインデックスを返す。
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// そのマスのビットを返す。
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u64 {
        bit(self.0)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a'.wrapping_add(self.0 % BOARD_LEN));
        write!(f, "{file}{}", self.0 / BOARD_LEN + 1)
    }
}

/// 着手。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Move {
    /// パス（自分は打てず、相手は打てるときのみ）。
    Pass,
    /// 石を置く。
    Place(Square),
}

/// 局面（盤面＋手番）。先手が黒。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    /// 黒石（先手）のビットボード。
    black: u64,
    /// 手番。
    side_to_move: Player,
    /// 白石（後手）のビットボード。
    white: u64,
}

impl Position {
    /// ビットボードから局面を作る。黒と白が重なっていれば `None`。
    #[inline]
    #[must_use]
    pub const fn from_bitboards(black: u64, white: u64, side_to_move: Player) -> Option<Self> {
        if black & white != 0 {
            return None;
        }
        Some(Self {
            black,
            side_to_move,
            white,
        })
    }

    /// `player` の石のビットボードを返す。
    #[inline]
    #[must_use]
    pub const fn discs(&self, player: Player) -> u64 {
        match player {
            Player::First => self.black,
            Player::Second => self.white,
        }
    }

    /// `player` の石数を返す。
    #[inline]
    #[must_use]
    pub const fn count(&self, player: Player) -> u32 {
        self.discs(player).count_ones()
    }

    /// 空きマス数を返す。
    #[inline]
    #[must_use]
    pub const fn empty_count(&self) -> u32 {
        (self.black | self.white).count_zeros()
    }

    /// `player` が石を置けるマスの集合を返す。
    #[inline]
    #[must_use]
    pub fn placements(&self, player: Player) -> u64 {
        legal_moves(self.discs(player), self.discs(player.opponent()))
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
        f.write_str("  a b c d e f g h\n")?;
        for y in 0..BOARD_LEN {
            write!(f, "{}", y.wrapping_add(1))?;
            for x in 0..BOARD_LEN {
                let mask = bit(y.wrapping_mul(BOARD_LEN).wrapping_add(x));
                let mark = if self.black & mask != 0 {
                    "X"
                } else if self.white & mask != 0 {
                    "O"
                } else {
                    "."
                };
                write!(f, " {mark}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 8×8 リバーシ。双方が打てなくなった時点で石の多い側の勝ち。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Reversi;

impl Reversi {
    /// ルールを作る。
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GameModel for Reversi {
    type Move = Move;
    type Position = Position;

    fn initial(&self) -> Position {
        Position {
            black: bit(28) | bit(35),
            side_to_move: Player::First,
            white: bit(27) | bit(36),
        }
    }

    #[inline]
    fn side_to_move(&self, position: &Position) -> Player {
        position.side_to_move
    }

    fn legal_moves(&self, position: &Position, player: Player) -> Vec<Move> {
        let placements = position.placements(player);
        if placements != 0 {
            return indices(placements).map(|index| Move::Place(Square(index))).collect();
        }
        if position.placements(player.opponent()) != 0 {
            return vec![Move::Pass];
        }
        Vec::new()
    }

    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, IllegalMove> {
        if self.is_terminal(position) {
            return Err(IllegalMove::GameOver);
        }
        let mover = position.side_to_move;
        let placements = position.placements(mover);

        let (own, other) = match mv {
            Move::Pass => {
                if placements != 0 {
                    return Err(IllegalMove::NotLegal);
                }
                (position.discs(mover), position.discs(mover.opponent()))
            }
            Move::Place(square) => {
                let mask = square.bit();
                if placements & mask == 0 {
                    return Err(IllegalMove::NotLegal);
                }
                let own = position.discs(mover);
                let other = position.discs(mover.opponent());
                let flipped = flips(own, other, mask);
                (own | mask | flipped, other & !flipped)
            }
        };

        let (black, white) = match mover {
            Player::First => (own, other),
            Player::Second => (other, own),
        };
        Ok(Position {
            black,
            side_to_move: mover.opponent(),
            white,
        })
    }

    fn is_terminal(&self, position: &Position) -> bool {
        position.placements(Player::First) == 0 && position.placements(Player::Second) == 0
    }

    fn is_win(&self, position: &Position, player: Player) -> bool {
        self.is_terminal(position) && position.count(player) > position.count(player.opponent())
    }

    /// 隅への着手。
    #[inline]
    fn is_tactical(&self, _position: &Position, mv: Move) -> bool {
        matches!(mv, Move::Place(square) if square.bit() & CORNER_MASK != 0)
    }
}

/// 評価関数の重み。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Weights {
    /// 隅の石1つ。
    pub corner: Score,
    /// 空いた隅の隣（C/X マス）の石1つ（減点）。
    pub danger: Score,
    /// 石数差1つ。
    pub disc: Score,
    /// 隅以外の辺の石1つ。
    pub edge: Score,
    /// 着手可能数の差1つ。
    pub mobility: Score,
}

impl Default for Weights {
    #[inline]
    fn default() -> Self {
        Self {
            corner: 200,
            danger: 50,
            disc: 10,
            edge: 20,
            mobility: 50,
        }
    }
}

/// リバーシの評価関数。
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

    /// 片側の評価（石数・隅・辺・危険マス）。
    fn side_score(&self, position: &Position, player: Player) -> Score {
        let discs = position.discs(player);
        let occupied = position.black | position.white;
        let w = &self.weights;

        let mut danger = 0_u32;
        for (corner, neighbors) in CORNER_NEIGHBORS {
            if occupied & bit(corner) != 0 {
                continue;
            }
            for neighbor in neighbors {
                if discs & bit(neighbor) != 0 {
                    danger = danger.wrapping_add(1);
                }
            }
        }

        let mut score: Score = 0;
        score = score.saturating_add(count_score(discs.count_ones()).saturating_mul(w.disc));
        score = score
            .saturating_add(count_score((discs & CORNER_MASK).count_ones()).saturating_mul(w.corner));
        score = score.saturating_add(
            count_score((discs & EDGE_MASK & !CORNER_MASK).count_ones()).saturating_mul(w.edge),
        );
        score = score.saturating_sub(count_score(danger).saturating_mul(w.danger));
        score
    }
}

impl Evaluator<Reversi> for Heuristic {
    fn heuristic(&self, _game: &Reversi, position: &Position, maximizer: Player) -> Score {
        let opponent = maximizer.opponent();
        let mobility = count_score(position.placements(maximizer).count_ones())
            .saturating_sub(count_score(position.placements(opponent).count_ones()));

        self.side_score(position, maximizer)
            .saturating_sub(self.side_score(position, opponent))
            .saturating_add(mobility.saturating_mul(self.weights.mobility))
    }
}

/// 件数を評価値の型へ変換する。
fn count_score(count: u32) -> Score {
    Score::try_from(count).unwrap_or(Score::MAX)
}

/// 中盤は固定深さ、終盤（空きが少ない）は最後まで読み切る。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AdaptiveDepth {
    /// 読み切りに切り替える空きマス数。
    pub exact_empties: u8,
    /// 中盤の探索深さ。
    pub midgame: u8,
}

impl Default for AdaptiveDepth {
    #[inline]
    fn default() -> Self {
        Self {
            exact_empties: 12,
            midgame: 3,
        }
    }
}

impl DepthPolicy<Reversi> for AdaptiveDepth {
    fn depth(&self, _game: &Reversi, position: &Position) -> u8 {
        let empty = u8::try_from(position.empty_count()).unwrap_or(u8::MAX);
        if empty > self.exact_empties {
            self.midgame.max(1)
        } else {
            // パスを挟んでも終局まで届く深さ。
            empty.saturating_mul(2).saturating_add(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AdaptiveDepth, Heuristic, Move, Position, Reversi, Square, bit};
    use crate::ai::alphabeta::{DepthPolicy as _, Evaluator as _};
    use crate::model::{GameModel as _, IllegalMove, Outcome, Player};

    fn place(index: u8) -> Move {
        match Square::from_index(index) {
            Some(square) => Move::Place(square),
            None => panic!("square {index} out of range"),
        }
    }

    #[test]
    fn initial_position_has_four_moves() {
        let game = Reversi::new();
        let position = game.initial();
        let moves = game.legal_moves(&position, Player::First);
        assert_eq!(moves, vec![place(19), place(26), place(37), place(44)]);
        assert_eq!(game.legal_moves(&position, Player::Second).len(), 4);
    }

    #[test]
    fn placing_flips_bracketed_discs() {
        let game = Reversi::new();
        let next = match game.apply_move(&game.initial(), place(19)) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        };
        assert_eq!(next.count(Player::First), 4);
        assert_eq!(next.count(Player::Second), 1);
        assert_eq!(next.side_to_move(), Player::Second);
        assert_eq!(
            game.apply_move(&next, place(0)),
            Err(IllegalMove::NotLegal)
        );
    }

    #[test]
    fn pass_only_when_opponent_can_play() {
        let game = Reversi::new();
        // 黒 A1、白 B1：白は打てず、黒は C1 に打てる。
        let position = match Position::from_bitboards(bit(0), bit(1), Player::Second) {
            Some(value) => value,
            None => panic!("overlapping bitboards"),
        };
        assert!(!game.is_terminal(&position));
        assert_eq!(game.legal_moves(&position, Player::Second), vec![Move::Pass]);

        let passed = match game.apply_move(&position, Move::Pass) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        };
        assert_eq!(passed.side_to_move(), Player::First);
        assert_eq!(game.apply_move(&passed, Move::Pass), Err(IllegalMove::NotLegal));
    }

    #[test]
    fn no_placements_for_either_side_ends_the_game() {
        let game = Reversi::new();
        let position = match Position::from_bitboards(bit(0) | bit(9), bit(63), Player::First) {
            Some(value) => value,
            None => panic!("overlapping bitboards"),
        };
        assert!(game.is_terminal(&position));
        assert!(game.legal_moves(&position, Player::First).is_empty());
        assert_eq!(game.outcome(&position), Some(Outcome::Winner(Player::First)));
    }

    #[test]
    fn corners_are_tactical_and_valued() {
        let game = Reversi::new();
        let position = game.initial();
        assert!(game.is_tactical(&position, place(0)));
        assert!(!game.is_tactical(&position, place(19)));

        let heuristic = Heuristic::default();
        let with_corner = Position::from_bitboards(bit(0) | bit(28), bit(27), Player::Second);
        let with_x_square = Position::from_bitboards(bit(9) | bit(28), bit(27), Player::Second);
        let (Some(with_corner), Some(with_x_square)) = (with_corner, with_x_square) else {
            panic!("overlapping bitboards");
        };
        assert!(
            heuristic.heuristic(&game, &with_corner, Player::First)
                > heuristic.heuristic(&game, &with_x_square, Player::First)
        );
    }

    #[test]
    fn endgame_is_solved_exactly() {
        let game = Reversi::new();
        let policy = AdaptiveDepth::default();
        assert_eq!(policy.depth(&game, &game.initial()), 3);

        // 空き 10 マス。
        let full = u64::MAX & !((1_u64 << 10) - 1);
        let black = full & 0x5555_5555_5555_5555;
        let white = full & 0xAAAA_AAAA_AAAA_AAAA;
        let position = match Position::from_bitboards(black, white, Player::First) {
            Some(value) => value,
            None => panic!("overlapping bitboards"),
        };
        assert_eq!(position.empty_count(), 10);
        assert_eq!(policy.depth(&game, &position), 22);
    }

    #[test]
    fn squares_print_in_algebraic_form() {
        let square = Square::from_xy(2, 3).map(|value| value.to_string());
        assert_eq!(square.as_deref(), Some("c4"));
        assert!(Square::from_xy(8, 0).is_none());
    }
}
