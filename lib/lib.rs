/// Chess domain types and rules.
pub mod chess;
/// Game clocks.
pub mod clock;
/// Persistent game records.
pub mod record;
