use thiserror::Error;

use crate::board::CellPos;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while building or playing a field.
///
/// None of these are transient. They are broken configurations or broken invariants and
/// callers are expected to stop the game when they see one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  InvalidConfiguration(#[from] ConfigError),
  #[error("contract violation: {0}")]
  ContractViolation(#[from] Violation),
  #[error("no closed cell left to probe although the game is still in progress")]
  ExhaustedFallback,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
  #[error("field must have at least one row and one column, got {width}x{height}")]
  EmptyField { width: u32, height: u32 },
  #[error("{mines} mines do not leave a free cell on a field of {cells} cells")]
  TooManyMines { mines: u64, cells: u64 },
  #[error("mine at {0:?} lies outside the field")]
  MineOutOfBounds(CellPos),
  #[error("mine at {0:?} was given twice")]
  DuplicateMine(CellPos),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  #[error("{0:?} lies outside the field")]
  OutOfBounds(CellPos),
  #[error("{0:?} is already open")]
  AlreadyOpen(CellPos),
  #[error("the game is already over")]
  GameOver,
  #[error("cannot count neighbouring mines on the mine at {0:?}")]
  CountOnMine(CellPos),
  #[error("{0:?} would have more than eight neighbouring mines")]
  CountOverflow(CellPos),
  #[error("only {unopened} unopened cells left for {mines} mines")]
  UnopenedBelowMines { unopened: usize, mines: usize },
  #[error("cannot flag the open cell at {0:?}")]
  FlagOnOpen(CellPos),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected a position as ROW,COL but got {0:?}")]
pub struct ParsePosError(pub String);
