//! コンピュータ同士を対戦させるコマンドラインアリーナ。

use core::fmt::Display;
use core::time::Duration;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, ValueEnum};
use tabletop_core::ai::alphabeta::{self, DepthPolicy, Evaluator, FixedDepth, MoveOrdering, SearchConfig};
use tabletop_core::ai::{Ai, random};
use tabletop_core::games::{checkers, connect_four, quarto, reversi, tictactoe};
use tabletop_core::model::{GameModel, Outcome, Player, Session, SessionStatus};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// 対戦するゲーム。
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum GameKind {
    /// N×N チェッカー。
    Checkers,
    /// R×C 四目並べ。
    ConnectFour,
    /// クアルト。
    Quarto,
    /// 8×8 リバーシ。
    Reversi,
    /// N×N 三目並べ。
    TicTacToe,
}

/// エージェントの種類。
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum AgentKind {
    /// アルファベータ探索。
    Alphabeta,
    /// 合法手からランダム。
    Random,
}

/// 手順付けの方法。
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OrderingArg {
    /// 生成順のまま。
    Generated,
    /// 戦術手を先頭へ。
    Tactical,
    /// 戦術手を先頭へ、残りは静的評価順。
    Full,
}

impl From<OrderingArg> for MoveOrdering {
    fn from(value: OrderingArg) -> Self {
        match value {
            OrderingArg::Generated => Self::Generated,
            OrderingArg::Tactical => Self::Tactical,
            OrderingArg::Full => Self::Full,
        }
    }
}

/// ログの出力形式。
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    /// JSON Lines。
    Json,
    /// 人が読むテキスト。
    Text,
}

/// コマンドライン引数。
#[derive(Debug, Parser)]
#[command(author, version, about = "Pit two computer players against each other")]
struct Args {
    /// Game to play.
    #[arg(long, value_enum, default_value_t = GameKind::TicTacToe)]
    game: GameKind,

    /// Agent playing first.
    #[arg(long, value_enum, default_value_t = AgentKind::Alphabeta)]
    first: AgentKind,

    /// Agent playing second.
    #[arg(long, value_enum, default_value_t = AgentKind::Random)]
    second: AgentKind,

    /// Fixed search depth (adaptive per game when omitted).
    #[arg(long)]
    depth: Option<u8>,

    /// Node budget per search.
    #[arg(long)]
    nodes: Option<u64>,

    /// Time limit per search in milliseconds.
    #[arg(long)]
    time_ms: Option<u64>,

    /// Move ordering used by the search.
    #[arg(long, value_enum, default_value_t = OrderingArg::Full)]
    ordering: OrderingArg,

    /// Transposition table entries (0 disables the table).
    #[arg(long, default_value_t = 1 << 16)]
    tt: usize,

    /// Seed for random agents.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Board size for tic-tac-toe (3..=7) and checkers (even, 6..=12).
    #[arg(long)]
    size: Option<u8>,

    /// Connect-four rows.
    #[arg(long, default_value_t = 6)]
    rows: u8,

    /// Connect-four columns.
    #[arg(long, default_value_t = 7)]
    cols: u8,

    /// Let checkers players decline captures.
    #[arg(long)]
    no_forced_capture: bool,

    /// Checkers plies without a capture before the game is drawn.
    #[arg(long, default_value_t = 60)]
    quiet_limit: u16,

    /// Stop the match after this many plies.
    #[arg(long, default_value_t = 500)]
    max_plies: u32,

    /// Do not print positions.
    #[arg(long)]
    quiet: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Args {
    /// 探索設定を組み立てる。
    fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::default()
            .with_ordering(self.ordering.into())
            .with_tt_capacity(self.tt);
        if let Some(nodes) = self.nodes {
            config = config.with_node_budget(nodes);
        }
        if let Some(ms) = self.time_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        config
    }
}

/// 固定深さか、ゲームごとの適応深さか。
#[derive(Copy, Clone, Debug)]
enum DepthChoice<D> {
    /// ゲームごとの方針。
    Adaptive(D),
    /// 指定深さ。
    Fixed(FixedDepth),
}

impl<G: GameModel, D: DepthPolicy<G>> DepthPolicy<G> for DepthChoice<D> {
    fn depth(&self, game: &G, position: &G::Position) -> u8 {
        match self {
            Self::Adaptive(policy) => policy.depth(game, position),
            Self::Fixed(fixed) => DepthPolicy::<G>::depth(fixed, game, position),
        }
    }
}

/// 1局分の設定（ルール・評価関数・深さ方針）からエージェントを作って対戦させる。
struct Arena<'args, G, E, D> {
    /// コマンドライン引数。
    args: &'args Args,
    /// 適応深さの方針。
    depth: D,
    /// 評価関数。
    evaluator: E,
    /// ルール。
    game: G,
}

impl<G, E, D> Arena<'_, G, E, D>
where
    G: GameModel + Clone + 'static,
    G::Position: Display,
    E: Evaluator<G> + Clone + 'static,
    D: DepthPolicy<G> + Copy + 'static,
{
    /// 指定した種類のエージェントを作る。
    fn agent(&self, kind: AgentKind, seed: u64) -> Box<dyn Ai<G>> {
        match kind {
            AgentKind::Alphabeta => {
                let depth = match self.args.depth {
                    Some(value) => DepthChoice::Fixed(FixedDepth::new(value)),
                    None => DepthChoice::Adaptive(self.depth),
                };
                Box::new(alphabeta::Agent::new(
                    self.game.clone(),
                    self.evaluator.clone(),
                    depth,
                    self.args.search_config(),
                ))
            }
            AgentKind::Random => Box::new(random::Agent::new(self.game.clone(), seed)),
        }
    }

    /// 1局を最後まで（または手数上限まで）進める。
    fn run(self) -> Result<Option<Outcome>> {
        let mut agents = [
            self.agent(self.args.first, self.args.seed),
            self.agent(self.args.second, self.args.seed.wrapping_add(1)),
        ];
        let mut session = Session::new(self.game.clone());
        if !self.args.quiet {
            println!("{}", session.position());
        }

        let mut ply = 0_u32;
        loop {
            if let SessionStatus::Finished(outcome) = session.status() {
                return Ok(Some(outcome));
            }
            if ply >= self.args.max_plies {
                warn!(ply, "ply limit reached before the game finished");
                return Ok(None);
            }

            let side = session.side_to_move();
            let Some(agent) = agents.get_mut(side.index()) else {
                bail!("no agent for {side:?}");
            };
            let Some(mv) = agent.select_move(session.position()) else {
                bail!("{side:?} has no move in an unfinished position");
            };
            session
                .play(mv)
                .with_context(|| format!("{side:?} chose {mv:?}"))?;
            ply = ply.wrapping_add(1);
            debug!(ply, player = ?side, mv = ?mv, "move played");

            if !self.args.quiet {
                println!("{}: {mv:?}", player_name(side));
                println!("{}", session.position());
            }
        }
    }
}

/// 表示用のプレイヤー名。
const fn player_name(player: Player) -> &'static str {
    match player {
        Player::First => "first",
        Player::Second => "second",
        _ => "unknown",
    }
}

/// ログ出力を初期化する（`RUST_LOG` が無ければ info）。
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// 引数に従ってゲームを作り、対戦させる。
fn play(args: &Args) -> Result<Option<Outcome>> {
    match args.game {
        GameKind::TicTacToe => {
            let game = tictactoe::TicTacToe::new(args.size.unwrap_or(3))
                .context("invalid tic-tac-toe board")?;
            Arena {
                args,
                depth: tictactoe::AdaptiveDepth,
                evaluator: tictactoe::Heuristic::default(),
                game,
            }
            .run()
        }
        GameKind::ConnectFour => {
            let game = connect_four::ConnectFour::new(args.rows, args.cols)
                .context("invalid connect-four board")?;
            Arena {
                args,
                depth: connect_four::AdaptiveDepth,
                evaluator: connect_four::Heuristic::default(),
                game,
            }
            .run()
        }
        GameKind::Reversi => Arena {
            args,
            depth: reversi::AdaptiveDepth::default(),
            evaluator: reversi::Heuristic::default(),
            game: reversi::Reversi::new(),
        }
        .run(),
        GameKind::Checkers => {
            let game = checkers::Checkers::new(args.size.unwrap_or(8))
                .context("invalid checkers board")?
                .with_forced_capture(!args.no_forced_capture)
                .with_quiet_limit(args.quiet_limit);
            Arena {
                args,
                depth: checkers::AdaptiveDepth,
                evaluator: checkers::Heuristic::default(),
                game,
            }
            .run()
        }
        GameKind::Quarto => Arena {
            args,
            depth: quarto::AdaptiveDepth,
            evaluator: quarto::Heuristic::default(),
            game: quarto::Quarto::new(),
        }
        .run(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);
    info!(game = ?args.game, first = ?args.first, second = ?args.second, "match started");

    let result = play(&args)?;
    let summary = match result {
        Some(Outcome::Winner(player)) => format!("{} wins", player_name(player)),
        Some(Outcome::Draw) => "draw".to_owned(),
        Some(_) => "finished".to_owned(),
        None => "unfinished (ply limit)".to_owned(),
    };
    info!(result = %summary, "match finished");
    println!("result: {summary}");
    Ok(())
}
