use rand::{Rng as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::ai::types::Ai;
use crate::model::GameModel;

/// 合法手からランダムに1手を選択するAI。
///
/// `seed` が同じなら同じ手順を再現する。
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Agent<G> {
    /// ルール。
    game: G,
    /// 乱数生成器。
    rng: Xoshiro256PlusPlus,
}

impl<G: GameModel> Agent<G> {
    /// `seed` を用いて初期化する。
    #[inline]
    #[must_use]
    pub fn new(game: G, seed: u64) -> Self {
        Self {
            game,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl<G: GameModel> Ai<G> for Agent<G> {
    #[inline]
    fn select_move(&mut self, position: &G::Position) -> Option<G::Move> {
        let side = self.game.side_to_move(position);
        let moves = self.game.legal_moves(position, side);
        if moves.is_empty() {
            return None;
        }

        let index = self.rng.random_range(0..moves.len());
        moves.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::Agent;
    use crate::ai::types::Ai as _;
    use crate::games::connect_four::ConnectFour;
    use crate::model::GameModel as _;

    #[test]
    fn same_seed_replays_same_moves() {
        let game = ConnectFour::standard();
        let mut a = Agent::new(game.clone(), 7);
        let mut b = Agent::new(game.clone(), 7);

        let mut position = game.initial();
        for _ply in 0_u8..10 {
            let mv_a = a.select_move(&position);
            let mv_b = b.select_move(&position);
            assert_eq!(mv_a, mv_b);

            let Some(mv) = mv_a else { break };
            position = match game.apply_move(&position, mv) {
                Ok(value) => value,
                Err(err) => panic!("random agent chose illegal move: {err}"),
            };
        }
    }

    #[test]
    fn terminal_position_yields_no_move() {
        let game = ConnectFour::standard();
        let mut agent = Agent::new(game.clone(), 0);
        let mut position = game.initial();
        // 先手は3列目、後手は4列目に積み、先手の縦4連で終局させる。
        for column in [3_u8, 4, 3, 4, 3, 4, 3] {
            let mv = crate::games::connect_four::Column::new(column);
            position = match game.apply_move(&position, mv) {
                Ok(value) => value,
                Err(err) => panic!("setup move rejected: {err}"),
            };
        }
        assert!(game.is_terminal(&position));
        assert_eq!(agent.select_move(&position), None);
    }
}
