/// ゲームモデル（合法手・着手・終局判定）の共通トレイト。
pub mod rules;
/// 1局の進行を管理する。
pub mod session;
pub mod types;

pub type Player = types::Player;
pub type Outcome = types::Outcome;
pub use rules::GameModel;
pub type IllegalMove = rules::IllegalMove;
pub type ConfigError = rules::ConfigError;
pub type Session<G> = session::Session<G>;
pub type SessionStatus = session::Status;
pub type PlayError = session::PlayError;
