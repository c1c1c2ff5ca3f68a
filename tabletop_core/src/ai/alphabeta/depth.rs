//! 探索深さの選び方。
//!
//! 深さは探索器ではなく呼び出し側が局面の複雑さ（空きマス数、駒数、取れる駒の数など）から決める。
//! どの深さでも探索結果の意味は変わらず、かかる時間だけが変わる。

use crate::model::GameModel;

/// 局面から探索深さを決める。
pub trait DepthPolicy<G: GameModel> {
    /// 探索深さ（1以上）を返す。
    fn depth(&self, game: &G, position: &G::Position) -> u8;
}

/// 常に同じ深さを使う。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FixedDepth(
    /// 探索深さ。
    u8,
);

impl FixedDepth {
    /// 深さを指定して生成する（0 は 1 として扱う）。
    #[inline]
    #[must_use]
    pub const fn new(depth: u8) -> Self {
        Self(normalize_depth(depth))
    }

    /// 探索深さを返す。
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl<G: GameModel> DepthPolicy<G> for FixedDepth {
    #[inline]
    fn depth(&self, _game: &G, _position: &G::Position) -> u8 {
        self.0
    }
}

/// 探索深さを正規化する（0の場合は1にする）。
#[inline]
#[must_use]
pub const fn normalize_depth(depth: u8) -> u8 {
    if depth == u8::MIN {
        u8::MIN.wrapping_add(1)
    } else {
        depth
    }
}
