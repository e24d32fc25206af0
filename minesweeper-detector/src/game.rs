use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::board::CellPos;
use crate::error::Result;
use crate::field::{Field, FieldConfig, GameOutcome};
use crate::solver::{Decision, Solver};

/// What happened in one turn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Turn {
  pub probed: CellPos,
  pub outcome: GameOutcome,
  /// The cell to open next turn, `None` once the game is over.
  pub next: Option<Decision>,
  pub new_flags: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Summary {
  pub outcome: GameOutcome,
  pub turns: u32,
  /// Cells the solver had to pick at random. The first probe is not counted.
  pub guesses: u32,
  pub flags: usize,
}

/// One game: the field, the solver and the single generator both of them draw from.
pub struct Game {
  field: Field,
  solver: Solver,
  rng: StdRng,
  turns: u32,
  guesses: u32,
  flags: usize,
}

impl Game {
  pub fn new(config: FieldConfig) -> Result<Self> {
    let mut rng = config.rng();
    let field = Field::generate_with(&config, &mut rng)?;
    Ok(Self::with_rng(field, rng))
  }

  /// Plays on an existing field. Fallback picks draw from `seed`, or from entropy without one.
  pub fn from_field(field: Field, seed: Option<u64>) -> Self {
    let rng = match seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    Self::with_rng(field, rng)
  }

  fn with_rng(field: Field, rng: StdRng) -> Self {
    Self {
      field,
      solver: Solver::new(),
      rng,
      turns: 0,
      guesses: 0,
      flags: 0,
    }
  }

  pub fn field(&self) -> &Field {
    &self.field
  }

  pub fn outcome(&self) -> GameOutcome {
    self.field.outcome()
  }

  /// A uniformly random first probe. Nothing can be deduced before it.
  pub fn random_start(&mut self) -> CellPos {
    CellPos::new(
      self.rng.gen_range(0..self.field.rows()) as i32,
      self.rng.gen_range(0..self.field.cols()) as i32,
    )
  }

  /// Opens `pos` and, if the game goes on, asks the solver where to continue.
  pub fn step(&mut self, pos: CellPos) -> Result<Turn> {
    let outcome = self.field.open(pos)?;
    self.turns += 1;
    debug!(turn = self.turns, ?pos, ?outcome, "probed");

    let mut turn = Turn {
      probed: pos,
      outcome,
      next: None,
      new_flags: 0,
    };
    if outcome.is_over() {
      return Ok(turn);
    }

    let sweep = self.solver.decide_next_cell(&mut self.field.view(), &mut self.rng)?;
    if sweep.decision.is_guess() {
      self.guesses += 1;
    }
    self.flags += sweep.new_flags;
    turn.next = Some(sweep.decision);
    turn.new_flags = sweep.new_flags;
    Ok(turn)
  }

  /// Plays turns from `start` until the game is won or lost.
  pub fn play(&mut self, start: CellPos) -> Result<Summary> {
    let mut next = start;
    loop {
      let turn = self.step(next)?;
      match turn.next {
        Some(decision) => next = decision.pos(),
        None => break,
      }
    }

    let summary = self.summary();
    info!(
      outcome = ?summary.outcome,
      turns = summary.turns,
      guesses = summary.guesses,
      flags = summary.flags,
      "game finished"
    );
    Ok(summary)
  }

  pub fn summary(&self) -> Summary {
    Summary {
      outcome: self.outcome(),
      turns: self.turns,
      guesses: self.guesses,
      flags: self.flags,
    }
  }
}
