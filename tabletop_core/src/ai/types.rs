use crate::model::GameModel;

/// 手を選択するAI。
pub trait Ai<G: GameModel> {
    /// 現在局面から次の手を選択する。合法手が無ければ `None`。
    fn select_move(&mut self, position: &G::Position) -> Option<G::Move>;
}

impl<G: GameModel, A: Ai<G> + ?Sized> Ai<G> for Box<A> {
    #[inline]
    fn select_move(&mut self, position: &G::Position) -> Option<G::Move> {
        (**self).select_move(position)
    }
}
