/// 手番（プレイヤー）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Player {
    /// 先手。
    First,
    /// 後手。
    Second,
}

impl Player {
    /// 相手側のプレイヤーを返す。
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// 0（先手）または 1（後手）を返す。
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// 終局時の結果。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Outcome {
    /// 引き分け。
    Draw,
    /// 指定プレイヤーの勝ち。
    Winner(Player),
}

#[cfg(test)]
mod tests {
    use super::Player;

    #[test]
    fn opponent_is_an_involution() {
        assert_eq!(Player::First.opponent(), Player::Second);
        assert_eq!(Player::First.opponent().opponent(), Player::First);
        assert_ne!(Player::First.index(), Player::Second.index());
    }
}
