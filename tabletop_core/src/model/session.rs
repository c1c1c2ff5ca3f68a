use super::rules::{GameModel, IllegalMove};
use super::types::{Outcome, Player};

/// ゲームの状態。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Status {
    /// 終局。
    Finished(Outcome),
    /// 進行中。
    InProgress,
}

/// 手の適用に失敗した理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PlayError {
    /// すでに終局している。
    #[error("game is already over")]
    GameOver,
    /// 指定された手が合法手ではない。
    #[error("illegal move")]
    IllegalMove,
}

/// 1ゲームの進行を管理する構造体。
///
/// 局面を書き換えるのはここだけで、探索側は常に複製を受け取る。
#[derive(Clone, Debug)]
pub struct Session<G: GameModel> {
    /// ルール。
    game: G,
    /// 適用済みの手。
    history: Vec<G::Move>,
    /// 現在の局面。
    position: G::Position,
}

impl<G: GameModel> Session<G> {
    /// 初期局面からゲームを開始する。
    #[inline]
    #[must_use]
    pub fn new(game: G) -> Self {
        let position = game.initial();
        Self::from_position(game, position)
    }

    /// 任意の局面からゲームを開始する。
    #[inline]
    #[must_use]
    pub const fn from_position(game: G, position: G::Position) -> Self {
        Self {
            game,
            history: Vec::new(),
            position,
        }
    }

    /// ルールを返す。
    #[inline]
    #[must_use]
    pub const fn game(&self) -> &G {
        &self.game
    }

    /// 適用済みの手を古い順に返す。
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[G::Move] {
        &self.history
    }

    /// 終局しているかどうかを返す。
    #[inline]
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game.is_terminal(&self.position)
    }

    /// 1手を適用する。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::GameOver`: すでにゲームが終局している場合
    /// - `PlayError::IllegalMove`: 指定された手が手番側の合法手でない場合
    ///
    #[inline]
    pub fn play(&mut self, mv: G::Move) -> Result<Status, PlayError> {
        if self.is_game_over() {
            return Err(PlayError::GameOver);
        }

        let next = match self.game.apply_move(&self.position, mv) {
            Ok(value) => value,
            Err(IllegalMove::GameOver) => return Err(PlayError::GameOver),
            Err(_) => return Err(PlayError::IllegalMove),
        };

        self.position = next;
        self.history.push(mv);
        Ok(self.status())
    }

    /// 現在の局面を返す。
    #[inline]
    #[must_use]
    pub const fn position(&self) -> &G::Position {
        &self.position
    }

    /// 現手番を返す。
    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Player {
        self.game.side_to_move(&self.position)
    }

    /// 現在のゲーム状態を返す。
    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        self.game
            .outcome(&self.position)
            .map_or(Status::InProgress, Status::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayError, Session, Status};
    use crate::games::tictactoe::{Cell, TicTacToe};
    use crate::model::{Outcome, Player};

    fn cell(row: u8, col: u8) -> Cell {
        Cell::from_row_col(row, col, 3).unwrap_or_else(|| Cell::from_index(0))
    }

    #[test]
    fn play_records_history_and_detects_winner() {
        let game = TicTacToe::new(3).unwrap_or_else(|_| TicTacToe::standard());
        let mut session = Session::new(game);

        let moves = [
            cell(0, 0),
            cell(1, 0),
            cell(0, 1),
            cell(1, 1),
        ];
        for mv in moves {
            assert_eq!(session.play(mv), Ok(Status::InProgress));
        }
        assert_eq!(session.side_to_move(), Player::First);

        let status = session.play(cell(0, 2));
        assert_eq!(status, Ok(Status::Finished(Outcome::Winner(Player::First))));
        assert_eq!(session.history().len(), 5);
        assert_eq!(session.play(cell(2, 2)), Err(PlayError::GameOver));
    }

    #[test]
    fn occupied_cell_is_rejected_without_changing_position() {
        let mut session = Session::new(TicTacToe::standard());
        assert!(session.play(cell(1, 1)).is_ok());
        let before = session.position().clone();

        assert_eq!(session.play(cell(1, 1)), Err(PlayError::IllegalMove));
        assert_eq!(session.position(), &before);
        assert_eq!(session.history().len(), 1);
    }
}
