use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::board::CellPos;
use crate::cell::Visibility;
use crate::error::{Error, Result, Violation};
use crate::field::FieldView;

/// How the solver arrived at the next cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Decision {
  /// Proven safe by the flags around an open number.
  Deduced(CellPos),
  /// Picked at random among closed cells.
  Guessed(CellPos),
}

impl Decision {
  pub fn pos(self) -> CellPos {
    match self {
      Decision::Deduced(pos) | Decision::Guessed(pos) => pos,
    }
  }

  pub fn is_guess(self) -> bool {
    matches!(self, Decision::Guessed(_))
  }
}

/// Result of one deduction sweep.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Sweep {
  pub decision: Decision,
  pub new_flags: usize,
}

/// Picks the next cell to open using only what a player could see.
///
/// The solver only ever gets a [`FieldView`], so it cannot peek at hidden cells. It keeps
/// scratch buffers between turns and nothing else.
#[derive(Clone, Debug, Default)]
pub struct Solver {
  hidden: Vec<CellPos>,
  candidates: Vec<CellPos>,
}

impl Solver {
  pub fn new() -> Self {
    Self::default()
  }

  /// Runs one sweep over the open numbers and proposes the next cell to open.
  ///
  /// Certain mines are flagged first. Only when that placed a new flag is the field searched
  /// for a number whose flags already account for all of its mines; the first closed
  /// neighbour of such a number is safe. Otherwise a closed cell is picked at random.
  pub fn decide_next_cell<R: Rng>(&mut self, view: &mut FieldView<'_>, rng: &mut R) -> Result<Sweep> {
    if view.outcome().is_over() {
      return Err(Violation::GameOver.into());
    }

    let new_flags = self.flag_certain_mines(view)?;
    debug!(new_flags, "flagging sweep done");

    if new_flags > 0 {
      if let Some(pos) = find_safe_cell(view) {
        debug!(?pos, "deduced safe cell");
        return Ok(Sweep {
          decision: Decision::Deduced(pos),
          new_flags,
        });
      }
    }

    let pos = self.guess(view, rng)?;
    debug!(?pos, "guessing");
    Ok(Sweep {
      decision: Decision::Guessed(pos),
      new_flags,
    })
  }

  /// Flags every hidden neighbour of a number that has exactly as many hidden neighbours as
  /// it shows. Returns how many flags are new.
  fn flag_certain_mines(&mut self, view: &mut FieldView<'_>) -> Result<usize> {
    let mut new_flags = 0;
    for pos in view.positions() {
      let Some(mines) = view.number(pos) else {
        continue;
      };

      self.hidden.clear();
      self.hidden.extend(
        view
          .neighbours(pos)
          .filter(|&neighbour_pos| view.visibility(neighbour_pos).map_or(false, Visibility::is_hidden)),
      );

      if self.hidden.len() == mines as usize {
        for &neighbour_pos in &self.hidden {
          if view.flag(neighbour_pos)? {
            new_flags += 1;
          }
        }
      }
    }
    Ok(new_flags)
  }

  fn guess<R: Rng>(&mut self, view: &FieldView<'_>, rng: &mut R) -> Result<CellPos> {
    self.candidates.clear();
    self
      .candidates
      .extend(view.positions().filter(|&pos| view.visibility(pos) == Some(Visibility::Closed)));
    self.candidates.choose(rng).copied().ok_or(Error::ExhaustedFallback)
  }
}

/// First closed neighbour of a number whose flags already cover it, in row-major order of
/// the numbers and neighbour order around each of them.
fn find_safe_cell(view: &FieldView<'_>) -> Option<CellPos> {
  for pos in view.positions() {
    let Some(mines) = view.number(pos) else {
      continue;
    };

    let mut flagged = 0;
    let mut first_closed = None;
    for neighbour_pos in view.neighbours(pos) {
      match view.visibility(neighbour_pos) {
        Some(Visibility::Flagged) => flagged += 1,
        Some(Visibility::Closed) => {
          first_closed.get_or_insert(neighbour_pos);
        }
        _ => (),
      }
    }

    if flagged >= mines as usize {
      if let Some(safe) = first_closed {
        return Some(safe);
      }
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::field::{Field, GameOutcome};

  fn pos(row: i32, col: i32) -> CellPos {
    CellPos::new(row, col)
  }

  /// Mine in the top left corner of a 3x2 field with the numbers below and beside the
  /// corner already open.
  fn corner_field() -> Field {
    let mut field = Field::with_mines(3, 2, &[pos(0, 0)]).unwrap();
    for open in [pos(0, 1), pos(1, 0), pos(1, 1)] {
      assert_eq!(field.open(open), Ok(GameOutcome::InProgress));
    }
    field
  }

  #[test]
  fn test_flags_mine_and_deduces_safe_cell() {
    let mut field = corner_field();
    let mut rng = StdRng::seed_from_u64(1);
    let sweep = Solver::new().decide_next_cell(&mut field.view(), &mut rng).unwrap();

    assert_eq!(sweep.new_flags, 1);
    assert_eq!(sweep.decision, Decision::Deduced(pos(0, 2)));
    assert_eq!(field.cell(pos(0, 0)).unwrap().visibility(), Visibility::Flagged);
    assert!(!field.cell(pos(0, 2)).unwrap().content().is_mine());
  }

  #[test]
  fn test_guesses_when_no_new_flag_was_placed() {
    let mut field = corner_field();
    let mut rng = StdRng::seed_from_u64(1);
    let mut solver = Solver::new();
    solver.decide_next_cell(&mut field.view(), &mut rng).unwrap();

    let sweep = solver.decide_next_cell(&mut field.view(), &mut rng).unwrap();
    assert_eq!(sweep.new_flags, 0);
    assert!(sweep.decision.is_guess());
    assert!([pos(0, 2), pos(1, 2)].contains(&sweep.decision.pos()));
  }

  #[test]
  fn test_guess_never_picks_flagged_or_open_cells() {
    let mut field = Field::with_mines(4, 4, &[pos(3, 3)]).unwrap();
    field.open(pos(2, 2)).unwrap();
    field.view().flag(pos(0, 0)).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let mut solver = Solver::new();
    for _ in 0..50 {
      let sweep = solver.decide_next_cell(&mut field.view(), &mut rng).unwrap();
      let cell = field.cell(sweep.decision.pos()).unwrap();
      assert_eq!(cell.visibility(), Visibility::Closed);
    }
  }

  #[test]
  fn test_guess_on_untouched_field_covers_the_board() {
    let mut field = Field::with_mines(2, 2, &[pos(0, 0)]).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let mut solver = Solver::new();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
      seen.insert(solver.decide_next_cell(&mut field.view(), &mut rng).unwrap().decision.pos());
    }
    assert_eq!(seen.len(), 4);
  }

  #[test]
  fn test_safe_cell_follows_neighbour_order() {
    // Mines at both ends of the middle row. (1, 1) sees one of them, the flag on (1, 0)
    // comes from (0, 0) and (2, 0), which only border it and open cells.
    let mut field = Field::with_mines(4, 3, &[pos(1, 0), pos(1, 3)]).unwrap();
    for open in [pos(0, 0), pos(2, 0), pos(0, 1), pos(2, 1), pos(1, 1)] {
      field.open(open).unwrap();
    }
    let mut rng = StdRng::seed_from_u64(5);
    let sweep = Solver::new().decide_next_cell(&mut field.view(), &mut rng).unwrap();
    assert_eq!(sweep.new_flags, 1);
    assert_eq!(field.cell(pos(1, 0)).unwrap().visibility(), Visibility::Flagged);
    // (0, 0) is covered but has nothing closed around it. (0, 1) is next, and (0, 2) is its
    // first closed neighbour even though (1, 2) is closed too.
    assert_eq!(sweep.decision, Decision::Deduced(pos(0, 2)));
  }

  #[test]
  fn test_refuses_to_play_finished_games() {
    let mut field = Field::with_mines(2, 2, &[pos(0, 0)]).unwrap();
    field.open(pos(0, 0)).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
      Solver::new().decide_next_cell(&mut field.view(), &mut rng),
      Err(Violation::GameOver.into())
    );
  }

  #[test]
  fn test_exhausted_fallback_is_reported() {
    // Everything hidden is flagged while the game is still running. A sound solver never
    // gets here, but the fallback has to say so instead of looping.
    let mut field = Field::with_mines(3, 1, &[pos(0, 0)]).unwrap();
    field.open(pos(0, 1)).unwrap();
    field.view().flag(pos(0, 2)).unwrap();
    field.view().flag(pos(0, 0)).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let mut solver = Solver::new();
    assert_eq!(solver.guess(&field.view(), &mut rng), Err(Error::ExhaustedFallback));
  }
}
