use std::cmp::Ordering;
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::board::{Board, BoardExplorer, BoardPositionIterator, CellPos};
use crate::cell::{Cell, Content, Visibility};
use crate::error::{ConfigError, Result, Violation};

/// Everything needed to lay out a field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FieldConfig {
  pub width: u32,
  pub height: u32,
  pub mines: u32,
  pub seed: Option<u64>,
}

impl FieldConfig {
  pub fn new(width: u32, height: u32, mines: u32) -> Self {
    Self {
      width,
      height,
      mines,
      seed: None,
    }
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  pub fn cell_count(&self) -> u64 {
    u64::from(self.width) * u64::from(self.height)
  }

  pub fn validate(&self) -> Result<()> {
    validate_layout(self.width, self.height, u64::from(self.mines))
  }

  /// The generator for one game: seeded when a seed is configured, from entropy otherwise.
  pub fn rng(&self) -> StdRng {
    match self.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    }
  }
}

fn validate_layout(width: u32, height: u32, mines: u64) -> Result<()> {
  if width == 0 || height == 0 {
    return Err(ConfigError::EmptyField { width, height }.into());
  }
  let cells = u64::from(width) * u64::from(height);
  if mines >= cells {
    return Err(ConfigError::TooManyMines { mines, cells }.into());
  }
  Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum GameOutcome {
  #[default]
  InProgress,
  Lost,
  Won,
}

impl GameOutcome {
  pub fn is_over(self) -> bool {
    self != GameOutcome::InProgress
  }
}

/// The mine field. Only [`Field::open`] and flag toggles through a [`FieldView`] mutate it.
#[derive(Clone, PartialEq, Eq)]
pub struct Field {
  board: Board<Cell>,
  mines: usize,
  seed: Option<u64>,
  unopened: usize,
  outcome: GameOutcome,
}

impl Field {
  fn blank(config: &FieldConfig) -> Self {
    let board = Board::from_fn(config.height, config.width, Cell::new);
    Self {
      unopened: board.len(),
      board,
      mines: config.mines as usize,
      seed: config.seed,
      outcome: GameOutcome::InProgress,
    }
  }

  /// Lays out a fresh field with a generator derived from the configured seed.
  pub fn generate(config: &FieldConfig) -> Result<Self> {
    Self::generate_with(config, &mut config.rng())
  }

  /// Lays out a fresh field drawing mine positions from `rng`.
  ///
  /// Positions are drawn uniformly and redrawn on collision until `config.mines` distinct
  /// mines are placed.
  pub fn generate_with<R: Rng>(config: &FieldConfig, rng: &mut R) -> Result<Self> {
    config.validate()?;
    let mut field = Self::blank(config);
    let mut placed = 0;
    while placed < config.mines {
      let pos = CellPos::new(
        rng.gen_range(0..config.height) as i32,
        rng.gen_range(0..config.width) as i32,
      );
      if field.board[pos].content().is_mine() {
        continue;
      }
      field.place_mine(pos)?;
      placed += 1;
    }

    debug!(
      width = config.width,
      height = config.height,
      mines = config.mines,
      seed = ?config.seed,
      "generated field"
    );
    Ok(field)
  }

  /// Builds a field with mines exactly at `mines`.
  pub fn with_mines(width: u32, height: u32, mines: &[CellPos]) -> Result<Self> {
    validate_layout(width, height, mines.len() as u64)?;
    let config = FieldConfig::new(width, height, mines.len() as u32);
    let mut field = Self::blank(&config);
    let mut seen = HashSet::new();
    for &pos in mines {
      if !field.board.contains(pos) {
        return Err(ConfigError::MineOutOfBounds(pos).into());
      }
      if !seen.insert(pos) {
        return Err(ConfigError::DuplicateMine(pos).into());
      }
      field.place_mine(pos)?;
    }
    Ok(field)
  }

  fn place_mine(&mut self, pos: CellPos) -> Result<()> {
    self.board[pos].set_content(Content::Mine);
    for neighbour_pos in self.board.neighbours(pos) {
      let neighbour = &mut self.board[neighbour_pos];
      if neighbour.content().is_mine() {
        continue;
      }
      let content = neighbour.content().incremented(neighbour_pos)?;
      neighbour.set_content(content);
    }
    Ok(())
  }

  pub fn rows(&self) -> u32 {
    self.board.rows()
  }

  pub fn cols(&self) -> u32 {
    self.board.cols()
  }

  pub fn mine_count(&self) -> usize {
    self.mines
  }

  pub fn seed(&self) -> Option<u64> {
    self.seed
  }

  pub fn outcome(&self) -> GameOutcome {
    self.outcome
  }

  /// Cells that are closed or flagged.
  pub fn unopened(&self) -> usize {
    self.unopened
  }

  pub fn contains(&self, pos: CellPos) -> bool {
    self.board.contains(pos)
  }

  pub fn cell(&self, pos: CellPos) -> Option<&Cell> {
    self.board.get(pos)
  }

  /// All cells in row-major order.
  pub fn cells(&self) -> impl Iterator<Item = &Cell> {
    self.board.iter()
  }

  pub fn positions(&self) -> BoardPositionIterator {
    self.board.positions()
  }

  /// In-bounds neighbours in the fixed order top-left, top, top-right, left, right,
  /// bottom-left, bottom, bottom-right.
  pub fn neighbours(&self, pos: CellPos) -> impl Iterator<Item = CellPos> {
    self.board.neighbours(pos)
  }

  /// Opens the cell at `pos` and returns the resulting outcome.
  ///
  /// Opening a mine reveals the whole field and loses the game. Opening an empty cell
  /// opens the connected empty region together with its numbered border.
  pub fn open(&mut self, pos: CellPos) -> Result<GameOutcome> {
    if self.outcome.is_over() {
      return Err(Violation::GameOver.into());
    }
    let cell = self.board.get(pos).ok_or(Violation::OutOfBounds(pos))?;
    if cell.visibility().is_open() {
      return Err(Violation::AlreadyOpen(pos).into());
    }

    if cell.content().is_mine() {
      self.reveal_all();
      self.outcome = GameOutcome::Lost;
      info!(?pos, "opened a mine");
      return Ok(self.outcome);
    }

    let opened = self.cascade(pos);
    trace!(?pos, opened, "opened cells");

    self.outcome = match self.unopened.cmp(&self.mines) {
      Ordering::Greater => GameOutcome::InProgress,
      Ordering::Equal => {
        info!("all safe cells are open");
        GameOutcome::Won
      }
      Ordering::Less => {
        return Err(
          Violation::UnopenedBelowMines {
            unopened: self.unopened,
            mines: self.mines,
          }
          .into(),
        )
      }
    };
    Ok(self.outcome)
  }

  fn cascade(&mut self, start: CellPos) -> usize {
    let mut opened = 0;
    let mut explorer = BoardExplorer::from(&self.board);
    explorer.enqueue(start);

    while let Some(pos) = explorer.pop() {
      let cell = &mut self.board[pos];
      if cell.visibility().is_open() {
        continue;
      }
      debug_assert!(!cell.content().is_mine(), "cascade reached the mine at {:?}", pos);
      cell.set_visibility(Visibility::Open);
      self.unopened -= 1;
      opened += 1;
      if cell.content().is_empty() {
        explorer.enqueue_all(self.board.neighbours(pos));
      }
    }

    opened
  }

  fn reveal_all(&mut self) {
    for cell in self.board.iter_mut() {
      cell.set_visibility(Visibility::Open);
    }
    self.unopened = 0;
  }

  /// The restricted view handed to the solver.
  pub fn view(&mut self) -> FieldView<'_> {
    FieldView { field: self }
  }
}

/// What the solver may see and do on a [`Field`].
///
/// Visibility is readable everywhere, content only on open cells, and the only mutation is
/// toggling flags on cells that are not open. There is no way to reach a hidden cell's
/// content through this type:
///
/// ```compile_fail
/// # use minesweeper_detector::{CellPos, Field};
/// let mut field = Field::with_mines(2, 2, &[CellPos::new(0, 0)]).unwrap();
/// let view = field.view();
/// let _ = view.cell(CellPos::new(0, 0));
/// ```
pub struct FieldView<'a> {
  field: &'a mut Field,
}

impl FieldView<'_> {
  pub fn rows(&self) -> u32 {
    self.field.rows()
  }

  pub fn cols(&self) -> u32 {
    self.field.cols()
  }

  pub fn outcome(&self) -> GameOutcome {
    self.field.outcome()
  }

  pub fn positions(&self) -> BoardPositionIterator {
    self.field.positions()
  }

  pub fn neighbours(&self, pos: CellPos) -> impl Iterator<Item = CellPos> {
    self.field.neighbours(pos)
  }

  pub fn visibility(&self, pos: CellPos) -> Option<Visibility> {
    self.field.cell(pos).map(Cell::visibility)
  }

  /// Content of an open cell. `None` for closed, flagged or out-of-range positions.
  pub fn revealed(&self, pos: CellPos) -> Option<Content> {
    self
      .field
      .cell(pos)
      .filter(|cell| cell.visibility().is_open())
      .map(Cell::content)
  }

  /// The number shown on an open, numbered cell.
  pub fn number(&self, pos: CellPos) -> Option<u8> {
    match self.revealed(pos) {
      Some(Content::Count(mines)) => Some(mines),
      _ => None,
    }
  }

  /// Flags a closed cell. Returns whether the flag is new.
  pub fn flag(&mut self, pos: CellPos) -> Result<bool> {
    let cell = self.hidden_cell_mut(pos)?;
    if cell.visibility().is_flagged() {
      return Ok(false);
    }
    cell.set_visibility(Visibility::Flagged);
    Ok(true)
  }

  /// Switches between closed and flagged and returns the new visibility.
  pub fn toggle_flag(&mut self, pos: CellPos) -> Result<Visibility> {
    let cell = self.hidden_cell_mut(pos)?;
    let visibility = match cell.visibility() {
      Visibility::Flagged => Visibility::Closed,
      _ => Visibility::Flagged,
    };
    cell.set_visibility(visibility);
    Ok(visibility)
  }

  fn hidden_cell_mut(&mut self, pos: CellPos) -> Result<&mut Cell> {
    let cell = self.field.board.get_mut(pos).ok_or(Violation::OutOfBounds(pos))?;
    if cell.visibility().is_open() {
      return Err(Violation::FlagOnOpen(pos).into());
    }
    Ok(cell)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;

  fn pos(row: i32, col: i32) -> CellPos {
    CellPos::new(row, col)
  }

  fn contents(field: &Field) -> Vec<Vec<Content>> {
    (0..field.rows() as i32)
      .map(|row| (0..field.cols() as i32).map(|col| field.cell(pos(row, col)).unwrap().content()).collect())
      .collect()
  }

  #[test]
  fn test_counts_around_explicit_mines() {
    use Content::*;
    let field = Field::with_mines(3, 3, &[pos(0, 0), pos(1, 0), pos(1, 1)]).unwrap();
    assert_eq!(
      contents(&field),
      vec![
        vec![Mine, Count(3), Count(1)],
        vec![Mine, Mine, Count(1)],
        vec![Count(2), Count(2), Count(1)],
      ]
    );
  }

  #[test]
  fn test_eight_mines_around_one_cell() {
    let mines: Vec<_> = pos(1, 1).neighbours().collect();
    let field = Field::with_mines(3, 3, &mines).unwrap();
    assert_eq!(field.cell(pos(1, 1)).unwrap().content(), Content::Count(8));
  }

  #[test]
  fn test_rejects_invalid_configuration() {
    assert_eq!(
      Field::generate(&FieldConfig::new(1, 1, 1)),
      Err(Error::InvalidConfiguration(ConfigError::TooManyMines { mines: 1, cells: 1 }))
    );
    assert_eq!(
      Field::generate(&FieldConfig::new(0, 4, 0)),
      Err(Error::InvalidConfiguration(ConfigError::EmptyField { width: 0, height: 4 }))
    );
    assert_eq!(
      Field::with_mines(2, 2, &[pos(0, 0), pos(0, 0)]),
      Err(Error::InvalidConfiguration(ConfigError::DuplicateMine(pos(0, 0))))
    );
    assert_eq!(
      Field::with_mines(2, 2, &[pos(2, 0)]),
      Err(Error::InvalidConfiguration(ConfigError::MineOutOfBounds(pos(2, 0))))
    );
  }

  #[test]
  fn test_generate_places_all_mines() {
    let config = FieldConfig::new(5, 4, 19).with_seed(7);
    let field = Field::generate(&config).unwrap();
    assert_eq!(field.rows(), 4);
    assert_eq!(field.cols(), 5);
    assert_eq!(field.cells().filter(|cell| cell.content().is_mine()).count(), 19);
    assert_eq!(field.unopened(), 20);
  }

  #[test]
  fn test_open_numbered_cell_does_not_cascade() {
    let mut field = Field::with_mines(3, 3, &[pos(0, 0)]).unwrap();
    assert_eq!(field.open(pos(1, 1)), Ok(GameOutcome::InProgress));
    assert_eq!(field.unopened(), 8);
  }

  #[test]
  fn test_open_empty_cell_cascades_and_wins() {
    let mut field = Field::with_mines(3, 3, &[pos(0, 0)]).unwrap();
    assert_eq!(field.open(pos(2, 2)), Ok(GameOutcome::Won));
    assert_eq!(field.unopened(), 1);
    assert_eq!(field.cell(pos(0, 0)).unwrap().visibility(), Visibility::Closed);
  }

  #[test]
  fn test_cascade_stops_at_numbers() {
    // Column 2 is a wall of mines, so opening the left edge must not leak past column 1.
    let mut field = Field::with_mines(4, 3, &[pos(0, 2), pos(1, 2), pos(2, 2)]).unwrap();
    assert_eq!(field.open(pos(1, 0)), Ok(GameOutcome::InProgress));
    for cell in field.cells() {
      assert_eq!(cell.visibility().is_open(), cell.pos().col < 2, "{:?}", cell.pos());
    }
  }

  #[test]
  fn test_open_mine_reveals_everything() {
    let mut field = Field::with_mines(3, 2, &[pos(1, 2)]).unwrap();
    field.view().flag(pos(0, 0)).unwrap();
    assert_eq!(field.open(pos(1, 2)), Ok(GameOutcome::Lost));
    assert!(field.cells().all(|cell| cell.visibility().is_open()));
    assert_eq!(field.cell(pos(0, 0)).unwrap().content(), Content::Empty);
    assert_eq!(field.open(pos(0, 0)), Err(Violation::GameOver.into()));
  }

  #[test]
  fn test_open_rejects_bad_positions() {
    let mut field = Field::with_mines(3, 3, &[pos(0, 0)]).unwrap();
    assert_eq!(field.open(pos(3, 0)), Err(Violation::OutOfBounds(pos(3, 0)).into()));
    assert_eq!(field.open(pos(0, -1)), Err(Violation::OutOfBounds(pos(0, -1)).into()));
    field.open(pos(0, 1)).unwrap();
    assert_eq!(field.open(pos(0, 1)), Err(Violation::AlreadyOpen(pos(0, 1)).into()));
  }

  #[test]
  fn test_flagged_cell_can_still_be_opened() {
    let mut field = Field::with_mines(3, 3, &[pos(0, 0)]).unwrap();
    field.view().flag(pos(2, 2)).unwrap();
    assert_eq!(field.open(pos(2, 2)), Ok(GameOutcome::Won));
  }

  #[test]
  fn test_view_hides_content_of_unopened_cells() {
    let mut field = Field::with_mines(3, 3, &[pos(0, 0)]).unwrap();
    field.open(pos(0, 1)).unwrap();
    let mut view = field.view();
    assert_eq!(view.revealed(pos(0, 1)), Some(Content::Count(1)));
    assert_eq!(view.number(pos(0, 1)), Some(1));
    assert_eq!(view.revealed(pos(0, 0)), None);
    assert_eq!(view.revealed(pos(2, 2)), None);
    view.flag(pos(0, 0)).unwrap();
    assert_eq!(view.revealed(pos(0, 0)), None);
    assert_eq!(view.visibility(pos(0, 0)), Some(Visibility::Flagged));
    assert_eq!(view.visibility(pos(9, 9)), None);
  }

  #[test]
  fn test_view_flag_toggles() {
    let mut field = Field::with_mines(3, 3, &[pos(0, 0)]).unwrap();
    field.open(pos(1, 1)).unwrap();
    let mut view = field.view();
    assert_eq!(view.flag(pos(0, 0)), Ok(true));
    assert_eq!(view.flag(pos(0, 0)), Ok(false));
    assert_eq!(view.toggle_flag(pos(0, 0)), Ok(Visibility::Closed));
    assert_eq!(view.toggle_flag(pos(0, 0)), Ok(Visibility::Flagged));
    assert_eq!(view.flag(pos(1, 1)), Err(Violation::FlagOnOpen(pos(1, 1)).into()));
    assert_eq!(field.cell(pos(0, 0)).unwrap().content(), Content::Mine);
  }
}
