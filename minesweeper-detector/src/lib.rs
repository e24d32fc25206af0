//! A mine field and a metal detector that clears it without peeking.
//!
//! [`Field`] owns the true layout and handles opening cells. [`Solver`] only ever sees a
//! [`FieldView`], which exposes numbers on open cells and lets it place flags. [`Game`] ties
//! both together with one seeded generator per game.

pub mod board;
pub mod cell;
pub mod error;
pub mod field;
pub mod game;
pub mod render;
pub mod solver;

pub use board::CellPos;
pub use cell::{Cell, Content, Visibility};
pub use error::{ConfigError, Error, ParsePosError, Result, Violation};
pub use field::{Field, FieldConfig, FieldView, GameOutcome};
pub use game::{Game, Summary, Turn};
pub use render::{Color, ColorHint};
pub use solver::{Decision, Solver, Sweep};
