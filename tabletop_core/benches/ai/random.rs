//! `ai::random` の性能計測（1手選択）。

use core::hint::black_box;
use criterion::BatchSize;
use criterion::BenchmarkId;
use criterion::Criterion;
use tabletop_core::ai::{Ai as _, random};
use tabletop_core::games::reversi::{Position, Reversi};
use tabletop_core::model::{GameModel as _, Session};

/// `cargo bench` の引数を取り込みつつ `Criterion` を生成する。
fn criterion_configured() -> Criterion {
    let base = Criterion::default();
    base.configure_from_args()
}

/// 指定手数だけ進めた局面を返す（途中で終局した場合はその時点で止める）。
fn position_after_plies(plies: u16) -> Position {
    let game = Reversi::new();
    let mut agent = random::Agent::new(game, u64::MIN);
    let mut session = Session::new(game);

    for _ply in u16::MIN..plies {
        let Some(mv) = agent.select_move(session.position()) else {
            break;
        };
        if session.play(mv).is_err() || session.is_game_over() {
            break;
        }
    }

    *session.position()
}

/// ベンチ用に代表局面をいくつか用意する。
fn position_samples() -> [Position; 3] {
    let p0 = Reversi::new().initial();
    let p1 = position_after_plies(8);
    let p2 = position_after_plies(24);
    [p0, p1, p2]
}

/// `random::Agent::select_move` を計測する。
fn bench_select_move(criterion: &mut Criterion) {
    let samples = position_samples();
    let mut group = criterion.benchmark_group("ai/random/select_move");

    for (index, position) in samples.iter().enumerate() {
        let bench_id = BenchmarkId::new("reversi", index);
        group.bench_with_input(bench_id, position, |bench, input| {
            bench.iter_batched(
                || random::Agent::new(Reversi::new(), u64::MIN),
                |mut agent| black_box(agent.select_move(input)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// ベンチマークのエントリーポイント。
fn main() {
    let mut criterion = criterion_configured();
    bench_select_move(&mut criterion);
    criterion.final_summary();
}
