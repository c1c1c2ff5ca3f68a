//! 8×8 ビットボードの合法手生成と反転計算。
//!
//! ビット `y * 8 + x` がマス (x, y) に対応する。

/// A列（x = 0）のマスク。
const FILE_A: u64 = 0x0101_0101_0101_0101;

/// H列（x = 7）のマスク。
const FILE_H: u64 = 0x8080_8080_8080_8080;

/// 連続する相手石を伸ばす回数（盤の内側は最大6マス）。
const SPREAD_STEPS: u8 = 5;

/// 石を挟む8方向。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Direction {
    /// x + 1
    East,
    /// y + 1
    North,
    /// x + 1, y + 1
    NorthEast,
    /// x - 1, y + 1
    NorthWest,
    /// y - 1
    South,
    /// x + 1, y - 1
    SouthEast,
    /// x - 1, y - 1
    SouthWest,
    /// x - 1
    West,
}

/// 全方向。
const DIRECTIONS: [Direction; 8] = [
    Direction::East,
    Direction::North,
    Direction::NorthEast,
    Direction::NorthWest,
    Direction::South,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::West,
];

impl Direction {
    /// 盤の端で折り返さないようにマスクしてから1マス進める。
    #[inline]
    const fn step(self, bb: u64) -> u64 {
        match self {
            Self::East => (bb & !FILE_H).wrapping_shl(1),
            Self::North => bb.wrapping_shl(8),
            Self::NorthEast => (bb & !FILE_H).wrapping_shl(9),
            Self::NorthWest => (bb & !FILE_A).wrapping_shl(7),
            Self::South => bb.wrapping_shr(8),
            Self::SouthEast => (bb & !FILE_H).wrapping_shr(7),
            Self::SouthWest => (bb & !FILE_A).wrapping_shr(9),
            Self::West => (bb & !FILE_A).wrapping_shr(1),
        }
    }

    /// `seed` から相手石の上を伸ばした集合（Kogge-Stone）。
    #[inline]
    const fn spread(self, seed: u64, opponent: u64) -> u64 {
        let mut run = seed;
        let mut step = 0_u8;
        while step < SPREAD_STEPS {
            run |= self.step(run) & opponent;
            step = step.wrapping_add(1);
        }
        run
    }
}

/// 指定インデックスのビットを返す（範囲外は 0）。
#[inline]
pub(super) const fn bit(index: u8) -> u64 {
    match 1_u64.checked_shl(index as u32) {
        Some(value) => value,
        None => 0,
    }
}

/// `player` の合法手（着手可能マス）の集合を返す。
pub(super) fn legal_moves(player: u64, opponent: u64) -> u64 {
    let empty = !(player | opponent);
    DIRECTIONS.iter().fold(0, |acc, &dir| {
        let adjacent = dir.step(player) & opponent;
        if adjacent == 0 {
            return acc;
        }
        acc | (dir.step(dir.spread(adjacent, opponent)) & empty)
    })
}

/// `mv` に打ったときに反転する相手石の集合を返す。
pub(super) fn flips(player: u64, opponent: u64, mv: u64) -> u64 {
    DIRECTIONS.iter().fold(0, |acc, &dir| {
        let adjacent = dir.step(mv) & opponent;
        if adjacent == 0 {
            return acc;
        }
        let run = dir.spread(adjacent, opponent);
        if dir.step(run) & player == 0 {
            acc
        } else {
            acc | run
        }
    })
}

/// 立っているビットのインデックスを昇順に返す。
pub(super) fn indices(mut bb: u64) -> impl Iterator<Item = u8> {
    core::iter::from_fn(move || {
        if bb == 0 {
            return None;
        }
        let index = u8::try_from(bb.trailing_zeros()).ok()?;
        bb &= bb.wrapping_sub(1);
        Some(index)
    })
}

#[cfg(test)]
mod tests {
    use super::{bit, flips, indices, legal_moves};

    #[test]
    fn flips_stop_at_board_edge() {
        // 黒 H1(7)、白 A2(8)：A2 は H1 の東隣ではない。
        let player = bit(7);
        let opponent = bit(8);
        assert_eq!(legal_moves(player, opponent), 0);
        assert_eq!(flips(player, opponent, bit(9)), 0);
    }

    #[test]
    fn flips_cover_the_whole_run() {
        // 黒 A1、白 B1..F1、G1 に打つと5枚返る。
        let player = bit(0);
        let opponent = (1..=5).fold(0, |acc, index| acc | bit(index));
        assert_eq!(flips(player, opponent, bit(6)), opponent);
        assert_eq!(indices(legal_moves(player, opponent)).collect::<Vec<_>>(), vec![6]);
    }
}
