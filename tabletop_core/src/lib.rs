//! Two-player board games and an alpha-beta search engine.
//!
//! このクレートは、ゲームルールの共通インターフェース `model`、具体的なゲーム実装 `games`、
//! 手を選択する `ai`（アルファベータ探索・ランダム）を提供します。
//! フロントエンド（`tabletop_cli`）から利用されることを想定しています。

#![forbid(unsafe_code)]

/// ゲームモデルの共通インターフェースと対局進行。
pub mod model;

/// 具体的なゲーム（三目並べ、コネクトフォー、リバーシ、チェッカー、クアルト）。
pub mod games;

/// AI（手選択アルゴリズム）を提供するモジュール。
pub mod ai;
