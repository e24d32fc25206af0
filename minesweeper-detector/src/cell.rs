use core::fmt;

use crate::board::CellPos;
use crate::error::Violation;

/// What a cell really is. Fixed once the field is generated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Content {
  Empty,
  Count(u8),
  Mine,
}

impl Content {
  pub const MAX_COUNT: u8 = 8;

  pub fn is_mine(self) -> bool {
    matches!(self, Content::Mine)
  }

  pub fn is_empty(self) -> bool {
    matches!(self, Content::Empty)
  }

  /// Number of neighbouring mines, `None` for a mine.
  pub fn mines_around(self) -> Option<u8> {
    match self {
      Content::Empty => Some(0),
      Content::Count(mines) => Some(mines),
      Content::Mine => None,
    }
  }

  /// One more neighbouring mine. `pos` only names the cell in the error.
  pub(crate) fn incremented(self, pos: CellPos) -> Result<Content, Violation> {
    match self {
      Content::Empty => Ok(Content::Count(1)),
      Content::Count(mines) if mines < Self::MAX_COUNT => Ok(Content::Count(mines + 1)),
      Content::Count(_) => Err(Violation::CountOverflow(pos)),
      Content::Mine => Err(Violation::CountOnMine(pos)),
    }
  }
}

impl fmt::Display for Content {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Content::Empty => write!(f, "."),
      Content::Count(mines) => write!(f, "{}", mines),
      Content::Mine => write!(f, "M"),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Visibility {
  #[default]
  Closed,
  Open,
  Flagged,
}

impl Visibility {
  pub fn is_open(self) -> bool {
    self == Visibility::Open
  }

  /// Closed or flagged.
  pub fn is_hidden(self) -> bool {
    !self.is_open()
  }

  pub fn is_flagged(self) -> bool {
    self == Visibility::Flagged
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
  pos: CellPos,
  content: Content,
  visibility: Visibility,
}

impl Cell {
  pub(crate) fn new(pos: CellPos) -> Self {
    Self {
      pos,
      content: Content::Empty,
      visibility: Visibility::Closed,
    }
  }

  pub fn pos(&self) -> CellPos {
    self.pos
  }

  pub fn content(&self) -> Content {
    self.content
  }

  pub fn visibility(&self) -> Visibility {
    self.visibility
  }

  pub(crate) fn set_content(&mut self, content: Content) {
    self.content = content;
  }

  pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
    self.visibility = visibility;
  }
}
