use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{queue, terminal};
use minesweeper_detector::{CellPos, Color, Field, FieldConfig, Game, GameOutcome};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Watch the metal detector clear a mine field, one turn per key press.
#[derive(Parser, Debug)]
#[command(name = "minesweeper-autoplay", version)]
struct Args {
  #[arg(long, default_value_t = 20)]
  width: u32,
  #[arg(long, default_value_t = 20)]
  height: u32,
  #[arg(long, default_value_t = 50)]
  mines: u32,
  /// Seed for mine placement and guesses. Random when omitted.
  #[arg(long)]
  seed: Option<u64>,
  /// First cell to open as ROW,COL. Random when omitted.
  #[arg(long)]
  start: Option<CellPos>,
  /// Play through without waiting for key presses.
  #[arg(long)]
  auto: bool,
  /// Print the board without colors.
  #[arg(long)]
  plain: bool,
}

#[derive(Debug, Error)]
enum AppError {
  #[error(transparent)]
  Game(#[from] minesweeper_detector::Error),
  #[error(transparent)]
  Io(#[from] io::Error),
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();
  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      error!(%err, "game aborted");
      eprintln!("Error: {}", err);
      ExitCode::FAILURE
    }
  }
}

fn run(args: &Args) -> Result<(), AppError> {
  let mut config = FieldConfig::new(args.width, args.height, args.mines);
  config.seed = args.seed;
  let mut game = Game::new(config)?;
  let mut stdout = io::stdout();

  println!("Begin!");
  draw(&mut stdout, game.field(), args.plain)?;

  let mut next = args.start.unwrap_or_else(|| game.random_start());
  while game.outcome() == GameOutcome::InProgress {
    if !args.auto {
      println!("Press any key for next step! (q to quit)");
      if !wait_for_key()? {
        info!("quit before the game ended");
        return Ok(());
      }
    }

    println!("Opened Row: {}, Col: {}", next.row, next.col);
    let turn = game.step(next)?;
    if let Some(decision) = turn.next {
      next = decision.pos();
    }
    draw(&mut stdout, game.field(), args.plain)?;
  }

  let summary = game.summary();
  match summary.outcome {
    GameOutcome::Lost => println!("Game Over"),
    GameOutcome::Won => println!("You Win!"),
    GameOutcome::InProgress => println!("Something went wrong..."),
  }
  println!(
    "{} turns, {} guesses, {} flags",
    summary.turns, summary.guesses, summary.flags
  );
  Ok(())
}

/// Blocks until a key is pressed. Returns `false` when the player asked to quit.
fn wait_for_key() -> io::Result<bool> {
  terminal::enable_raw_mode()?;
  let key = loop {
    match event::read() {
      Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(key),
      Ok(_) => continue,
      Err(err) => break Err(err),
    }
  };
  terminal::disable_raw_mode()?;

  let key = key?;
  let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
  Ok(!(ctrl_c || matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))))
}

fn draw(out: &mut impl Write, field: &Field, plain: bool) -> io::Result<()> {
  if plain {
    write!(out, "{}", field)?;
    return out.flush();
  }

  for row in 0..field.rows() as i32 {
    for col in 0..field.cols() as i32 {
      if let Some(cell) = field.cell(CellPos::new(row, col)) {
        let hint = cell.color();
        queue!(
          out,
          SetForegroundColor(to_terminal(hint.foreground)),
          SetBackgroundColor(to_terminal(hint.background)),
          Print(format!(" {} ", cell.glyph())),
          ResetColor
        )?;
      }
    }
    queue!(out, Print("\n"))?;
  }
  out.flush()
}

fn to_terminal(color: Color) -> style::Color {
  match color {
    Color::Black => style::Color::Black,
    Color::White => style::Color::White,
    Color::Red => style::Color::Red,
    Color::DarkGrey => style::Color::DarkGrey,
    Color::Blue => style::Color::Blue,
    Color::Green => style::Color::Green,
    Color::Yellow => style::Color::Yellow,
    Color::Cyan => style::Color::Cyan,
    Color::DarkGreen => style::Color::DarkGreen,
    Color::DarkYellow => style::Color::DarkYellow,
    Color::DarkMagenta => style::Color::DarkMagenta,
    Color::Magenta => style::Color::Magenta,
  }
}
