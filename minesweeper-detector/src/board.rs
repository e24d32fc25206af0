use core::fmt;
use std::collections::VecDeque;
use std::ops::{Add, Index, IndexMut};
use std::str::FromStr;

use crate::error::ParsePosError;

pub static TOP_LEFT: CellPos = CellPos::new(-1, -1);
pub static TOP: CellPos = CellPos::new(-1, 0);
pub static TOP_RIGHT: CellPos = CellPos::new(-1, 1);
pub static LEFT: CellPos = CellPos::new(0, -1);
pub static RIGHT: CellPos = CellPos::new(0, 1);
pub static BOTTOM_LEFT: CellPos = CellPos::new(1, -1);
pub static BOTTOM: CellPos = CellPos::new(1, 0);
pub static BOTTOM_RIGHT: CellPos = CellPos::new(1, 1);

/// Neighbour offsets in enumeration order. The solver breaks ties by this order.
pub static DIRECTIONS: [CellPos; 8] = [TOP_LEFT, TOP, TOP_RIGHT, LEFT, RIGHT, BOTTOM_LEFT, BOTTOM, BOTTOM_RIGHT];

/// A `(row, col)` position on the field. Also used for offsets, so it may be negative.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
  pub row: i32,
  pub col: i32,
}

impl CellPos {
  pub const fn new(row: i32, col: i32) -> CellPos {
    CellPos { row, col }
  }

  /// All eight surrounding positions, including those off the board.
  pub fn neighbours(self) -> impl Iterator<Item = CellPos> {
    DIRECTIONS.iter().map(move |&dir| dir + self)
  }
}

impl fmt::Debug for CellPos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

impl fmt::Display for CellPos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{},{}", self.row, self.col)
  }
}

impl Add<CellPos> for CellPos {
  type Output = CellPos;

  fn add(self, rhs: CellPos) -> Self::Output {
    CellPos::new(self.row + rhs.row, self.col + rhs.col)
  }
}

/// Parses `ROW,COL`.
impl FromStr for CellPos {
  type Err = ParsePosError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (row, col) = s.split_once(',').ok_or_else(|| ParsePosError(s.to_owned()))?;
    match (row.trim().parse(), col.trim().parse()) {
      (Ok(row), Ok(col)) => Ok(CellPos::new(row, col)),
      _ => Err(ParsePosError(s.to_owned())),
    }
  }
}

/// Row-major grid storage.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board<T> {
  rows: u32,
  cols: u32,
  cells: Vec<T>,
}

impl<T> Board<T> {
  pub fn new(rows: u32, cols: u32, default: T) -> Self
  where
    T: Clone,
  {
    Self {
      rows,
      cols,
      cells: vec![default; rows as usize * cols as usize],
    }
  }

  pub fn from_fn(rows: u32, cols: u32, f: impl FnMut(CellPos) -> T) -> Self {
    let cells = BoardPositionIterator::new(rows, cols).map(f).collect();
    Self { rows, cols, cells }
  }

  pub fn rows(&self) -> u32 {
    self.rows
  }

  pub fn cols(&self) -> u32 {
    self.cols
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn contains(&self, pos: CellPos) -> bool {
    in_bounds(self.rows, self.cols, pos)
  }

  fn pos_to_index(&self, pos: CellPos) -> Option<usize> {
    if self.contains(pos) {
      Some(pos.col as usize + pos.row as usize * self.cols as usize)
    } else {
      None
    }
  }

  pub fn get(&self, pos: CellPos) -> Option<&T> {
    self.pos_to_index(pos).and_then(|i| self.cells.get(i))
  }

  pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut T> {
    self.pos_to_index(pos).and_then(|i| self.cells.get_mut(i))
  }

  /// In-bounds neighbours of `pos` in [`DIRECTIONS`] order.
  ///
  /// The iterator does not borrow the board, so cells can be mutated while walking it.
  pub fn neighbours(&self, pos: CellPos) -> impl Iterator<Item = CellPos> {
    let (rows, cols) = (self.rows, self.cols);
    pos.neighbours().filter(move |&pos| in_bounds(rows, cols, pos))
  }

  pub fn positions(&self) -> BoardPositionIterator {
    BoardPositionIterator::new(self.rows, self.cols)
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.cells.iter()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
    self.cells.iter_mut()
  }
}

fn in_bounds(rows: u32, cols: u32, pos: CellPos) -> bool {
  match (u32::try_from(pos.row), u32::try_from(pos.col)) {
    (Ok(row), Ok(col)) => row < rows && col < cols,
    _ => false,
  }
}

impl<T> Index<CellPos> for Board<T> {
  type Output = T;

  fn index(&self, index: CellPos) -> &Self::Output {
    self.get(index).unwrap_or_else(|| {
      panic!(
        "Cannot access position {:?} on board with size {}x{}",
        index, self.rows, self.cols
      )
    })
  }
}

impl<T> IndexMut<CellPos> for Board<T> {
  fn index_mut(&mut self, index: CellPos) -> &mut T {
    let (rows, cols) = (self.rows, self.cols);
    self.get_mut(index).unwrap_or_else(|| {
      panic!(
        "Cannot mut-access position {:?} on board with size {}x{}",
        index, rows, cols
      )
    })
  }
}

/// Walks every position of a board in row-major order.
pub struct BoardPositionIterator {
  next_pos: CellPos,
  cols: i32,
  rows: i32,
}

impl BoardPositionIterator {
  pub fn new(rows: u32, cols: u32) -> Self {
    let rows = rows as i32;
    Self {
      next_pos: if cols == 0 { CellPos::new(rows, 0) } else { CellPos::new(0, 0) },
      cols: cols as i32,
      rows,
    }
  }
}

impl Iterator for BoardPositionIterator {
  type Item = CellPos;

  fn next(&mut self) -> Option<Self::Item> {
    let pos = &mut self.next_pos;
    if pos.row >= self.rows {
      None
    } else {
      let result = *pos;
      pos.col += 1;
      if pos.col >= self.cols {
        pos.col = 0;
        pos.row += 1;
      }
      Some(result)
    }
  }
}

/// Worklist for flood fills. Each position is handed out at most once.
#[derive(Clone)]
pub struct BoardExplorer {
  queue: VecDeque<CellPos>,
  visited: Board<bool>,
}

impl BoardExplorer {
  pub fn enqueue(&mut self, pos: CellPos) -> bool {
    if let Some(field) = self.visited.get_mut(pos) {
      if !*field {
        *field = true;
        self.queue.push_back(pos);
        return true;
      }
    }
    false
  }

  pub fn enqueue_all(&mut self, all: impl IntoIterator<Item = CellPos>) {
    for pos in all {
      self.enqueue(pos);
    }
  }

  pub fn pop(&mut self) -> Option<CellPos> {
    self.queue.pop_front()
  }
}

impl<T> From<&Board<T>> for BoardExplorer {
  fn from(board: &Board<T>) -> Self {
    Self {
      queue: VecDeque::new(),
      visited: Board::new(board.rows, board.cols, false),
    }
  }
}
