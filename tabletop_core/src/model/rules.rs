use core::fmt::Debug;
use core::hash::Hash;

use super::types::{Outcome, Player};

/// 着手の適用に失敗した理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum IllegalMove {
    /// 指定された手は合法手ではない。
    #[error("move is not legal in this position")]
    NotLegal,
    /// すでに終局している。
    #[error("game is already over")]
    GameOver,
}

/// ゲームの構成値（盤サイズ等）が不正。
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// 盤サイズが範囲外。
    #[error("board size {size} is out of range {min}..={max}")]
    SizeOutOfRange {
        /// 指定された値。
        size: u8,
        /// 下限。
        min: u8,
        /// 上限。
        max: u8,
    },
    /// 盤サイズが偶数でない。
    #[error("board size {size} must be even")]
    SizeNotEven {
        /// 指定された値。
        size: u8,
    },
}

/// 有限・完全情報・二人零和ゲームのルール。
///
/// 探索エンジンはこの4操作（＋手番と戦術手の判定）だけを通じて局面を扱う。
/// ゲームモデル自体は盤サイズなどの不変な構成値で、局面は別の値として受け渡す。
pub trait GameModel {
    /// 局面（盤面＋手番）。探索は複製して分岐ごとに独立に扱う。
    type Position: Clone + Eq + Hash + Debug;
    /// 手。
    type Move: Copy + Eq + Debug;

    /// 初期局面を返す。
    fn initial(&self) -> Self::Position;

    /// 手番を返す。
    fn side_to_move(&self, position: &Self::Position) -> Player;

    /// `player` の合法手を返す（重複なし）。終局局面では空。
    fn legal_moves(&self, position: &Self::Position, player: Player) -> Vec<Self::Move>;

    /// 手を適用した新しい局面を返す。入力局面は変更しない。
    ///
    /// # Errors
    ///
    /// 手番側の合法手でない場合、または終局している場合にエラーを返す。
    fn apply_move(
        &self,
        position: &Self::Position,
        mv: Self::Move,
    ) -> Result<Self::Position, IllegalMove>;

    /// 終局（勝敗または引き分け）しているかを返す。
    fn is_terminal(&self, position: &Self::Position) -> bool;

    /// `player` の勝ちで終局しているかを返す。
    fn is_win(&self, position: &Self::Position, player: Player) -> bool;

    /// 戦術的な手（駒取り、即勝ち、即ブロックなど）かを返す。手順付けにのみ使う。
    #[inline]
    fn is_tactical(&self, _position: &Self::Position, _mv: Self::Move) -> bool {
        false
    }

    /// 終局していれば結果を返す。
    #[inline]
    fn outcome(&self, position: &Self::Position) -> Option<Outcome> {
        if !self.is_terminal(position) {
            return None;
        }
        if self.is_win(position, Player::First) {
            return Some(Outcome::Winner(Player::First));
        }
        if self.is_win(position, Player::Second) {
            return Some(Outcome::Winner(Player::Second));
        }
        Some(Outcome::Draw)
    }
}

/// 盤サイズが `min..=max` に収まっているかを検査する。
pub(crate) const fn check_size(size: u8, min: u8, max: u8) -> Result<u8, ConfigError> {
    if size < min || size > max {
        return Err(ConfigError::SizeOutOfRange { size, min, max });
    }
    Ok(size)
}
