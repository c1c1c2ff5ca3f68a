/// チェッカー（N×N、強制取り・連続ジャンプ・成り）。
pub mod checkers;
/// 四目並べ（重力付き、R×C）。
pub mod connect_four;
/// クアルト（4×4、16駒・4属性）。
pub mod quarto;
/// リバーシ（8×8 ビットボード）。
pub mod reversi;
/// 三目並べ（N×N）。
pub mod tictactoe;
