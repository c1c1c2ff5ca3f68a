use core::hash::{Hash, Hasher as _};

use rustc_hash::FxHasher;

use crate::model::Player;

use super::eval::Score;

/// 置換表の bound 種別。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum Bound {
    /// 正確な値。
    Exact,
    /// 下限（この値以上）。
    Lower,
    /// 上限（この値以下）。
    Upper,
}

/// 置換表エントリ。
#[derive(Copy, Clone, Debug)]
pub(super) struct TTEntry<M> {
    /// ベストムーブ。
    best_move: Option<M>,
    /// `value` の意味（exact/lower/upper）。
    bound: Bound,
    /// この値を得た探索深さ。
    depth: u8,
    /// 局面ハッシュ。
    key: u64,
    /// 評価値。
    value: Score,
}

impl<M> TTEntry<M> {
    /// このエントリの bound 種別を返す。
    pub(super) const fn bound(&self) -> Bound {
        self.bound
    }

    /// このエントリに保存されている評価値を返す。
    pub(super) const fn value(&self) -> Score {
        self.value
    }
}

/// 置換表（固定長、1スロット1エントリ）。
#[derive(Debug, Clone)]
pub(super) struct TranspositionTable<M> {
    /// ハッシュ表本体。
    entries: Vec<Option<TTEntry<M>>>,
}

impl<M: Copy> TranspositionTable<M> {
    /// キーからインデックスを求める。
    fn index(&self, key: u64) -> usize {
        let mask = self.entries.len().wrapping_sub(1);
        // 32-bit 環境でも偏らないよう、上位と下位を折り畳んでから下位 32bit を使う。
        let folded = key ^ key.wrapping_shr(32);
        let low_u32 = u32::try_from(folded & u64::from(u32::MAX)).unwrap_or(u32::MAX);
        usize::try_from(low_u32).unwrap_or(usize::MAX) & mask
    }

    /// 置換表を初期化する。
    pub(super) fn new(size: usize) -> Self {
        let size_pow2 = size.max(1).next_power_of_two();
        let mut entries = Vec::with_capacity(size_pow2);
        entries.resize_with(size_pow2, || None);
        Self { entries }
    }

    /// 全エントリを消去する。
    pub(super) fn clear(&mut self) {
        self.entries.iter_mut().for_each(|slot| *slot = None);
    }

    /// 同じ深さのエントリを取得する。
    ///
    /// 深い探索の値を浅い探索に流用すると固定深さの結果が変わるため、深さは一致のみ受け付ける。
    pub(super) fn probe(&self, key: u64, depth: u8) -> Option<TTEntry<M>> {
        let entry = (*self.entries.get(self.index(key))?)?;
        (entry.key == key && entry.depth == depth).then_some(entry)
    }

    /// ベストムーブのみを取得する（深さは問わない）。
    pub(super) fn probe_best_move(&self, key: u64) -> Option<M> {
        let entry = (*self.entries.get(self.index(key))?)?;
        if entry.key == key {
            entry.best_move
        } else {
            None
        }
    }

    /// エントリを保存する。同じ局面の深いエントリは残す。
    pub(super) fn store(
        &mut self,
        key: u64,
        depth: u8,
        stored_value: Score,
        bound: Bound,
        best_move: Option<M>,
    ) {
        let idx = self.index(key);
        let Some(slot) = self.entries.get_mut(idx) else {
            return;
        };
        let replace = match *slot {
            Some(old) => old.key != key || depth >= old.depth,
            None => true,
        };
        if replace {
            *slot = Some(TTEntry {
                best_move,
                bound,
                depth,
                key,
                value: stored_value,
            });
        }
    }
}

/// 局面と評価視点からハッシュキーを作る。
///
/// 評価値は視点に依存するので、視点もキーに含める。
pub(super) fn position_key<P: Hash>(position: &P, maximizer: Player) -> u64 {
    let mut hasher = FxHasher::default();
    position.hash(&mut hasher);
    maximizer.hash(&mut hasher);
    hasher.finish()
}
