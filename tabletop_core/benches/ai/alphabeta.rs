//! `ai::alphabeta` の性能計測（固定深さの探索、手順付け・置換表の有無）。

use core::hint::black_box;
use criterion::BatchSize;
use criterion::BenchmarkId;
use criterion::Criterion;
use tabletop_core::ai::alphabeta::{MoveOrdering, SearchConfig, Searcher};
use tabletop_core::games::{connect_four, reversi};
use tabletop_core::model::{GameModel as _, Player};

/// 計測する探索深さ。
const DEPTH: u8 = 5;

/// `cargo bench` の引数を取り込みつつ `Criterion` を生成する。
fn criterion_configured() -> Criterion {
    let base = Criterion::default();
    base.configure_from_args()
}

/// 比較する探索設定（名前付き）。
fn configs() -> [(&'static str, SearchConfig); 4] {
    let base = SearchConfig::default();
    [
        ("generated", base.with_ordering(MoveOrdering::Generated)),
        ("tactical", base.with_ordering(MoveOrdering::Tactical)),
        ("full", base.with_ordering(MoveOrdering::Full)),
        ("full_tt", base.with_ordering(MoveOrdering::Full).with_tt_capacity(1 << 16)),
    ]
}

/// コネクトフォー初期局面の探索を計測する。
fn bench_connect_four(criterion: &mut Criterion) {
    let game = connect_four::ConnectFour::standard();
    let position = game.initial();
    let mut group = criterion.benchmark_group("ai/alphabeta/connect_four");

    for (name, config) in configs() {
        group.bench_with_input(BenchmarkId::new(name, DEPTH), &position, |bench, input| {
            bench.iter_batched(
                || Searcher::new(game, connect_four::Heuristic::default(), config),
                |mut searcher| black_box(searcher.search(input, Player::First, DEPTH)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// リバーシ初期局面の探索を計測する。
fn bench_reversi(criterion: &mut Criterion) {
    let game = reversi::Reversi::new();
    let position = game.initial();
    let mut group = criterion.benchmark_group("ai/alphabeta/reversi");

    for (name, config) in configs() {
        group.bench_with_input(BenchmarkId::new(name, DEPTH), &position, |bench, input| {
            bench.iter_batched(
                || Searcher::new(game, reversi::Heuristic::default(), config),
                |mut searcher| black_box(searcher.search(input, Player::First, DEPTH)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// ベンチマークのエントリーポイント。
fn main() {
    let mut criterion = criterion_configured();

    bench_connect_four(&mut criterion);
    bench_reversi(&mut criterion);

    criterion.final_summary();
}
