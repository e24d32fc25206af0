use core::fmt;

use crate::cell::{Cell, Content, Visibility};
use crate::field::Field;

/// Console colors a renderer can map onto its terminal backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
  Black,
  White,
  Red,
  DarkGrey,
  Blue,
  Green,
  Yellow,
  Cyan,
  DarkGreen,
  DarkYellow,
  DarkMagenta,
  Magenta,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ColorHint {
  pub foreground: Color,
  pub background: Color,
}

impl ColorHint {
  const fn on(background: Color) -> Self {
    Self {
      foreground: Color::Black,
      background,
    }
  }
}

impl Cell {
  /// What a player sees on this cell.
  pub fn glyph(&self) -> char {
    match (self.visibility(), self.content()) {
      (Visibility::Closed, _) => '?',
      (Visibility::Flagged, _) => '!',
      (Visibility::Open, Content::Mine) => 'M',
      (Visibility::Open, Content::Empty) => '.',
      (Visibility::Open, Content::Count(mines)) => char::from_digit(u32::from(mines), 10).unwrap_or('#'),
    }
  }

  pub fn color(&self) -> ColorHint {
    match (self.visibility(), self.content()) {
      (Visibility::Closed, _) => ColorHint::on(Color::White),
      (Visibility::Flagged, _) => ColorHint {
        foreground: Color::Red,
        background: Color::White,
      },
      (Visibility::Open, Content::Mine) => ColorHint::on(Color::Red),
      (Visibility::Open, Content::Empty) => ColorHint::on(Color::DarkGrey),
      (Visibility::Open, Content::Count(mines)) => ColorHint::on(match mines {
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Cyan,
        5 => Color::DarkGreen,
        6 => Color::DarkYellow,
        7 => Color::DarkMagenta,
        _ => Color::Magenta,
      }),
    }
  }
}

/// The field as a player sees it.
impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, cell) in self.cells().enumerate() {
      write!(f, " {} ", cell.glyph())?;
      if (i + 1) % self.cols() as usize == 0 {
        writeln!(f)?;
      }
    }
    Ok(())
  }
}

/// The true layout, regardless of what is open.
impl fmt::Debug for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, cell) in self.cells().enumerate() {
      write!(f, "{}", cell.content())?;
      if (i + 1) % self.cols() as usize == 0 {
        writeln!(f)?;
      }
    }
    Ok(())
  }
}
