//! Code space arithmetic - maps a randomly advanced counter onto readable codes
//!
//! A code of `D` characters is a `D`-digit number in base `L` (the alphabet
//! size). The counter only moves forward, so every state it visits is new,
//! and the position tables turn each state into a distinct string.

mod alphabet;
mod counter;
mod jump;
mod params;
mod render;
mod tables;

pub use alphabet::{Alphabet, AMBIGUOUS_SYMBOLS};
pub use counter::CounterState;
pub use jump::{draw_jump, next_increment_digits, to_digits};
pub use params::GenerationParameters;
pub use render::{format_grouping, render};
pub use tables::PositionTables;
