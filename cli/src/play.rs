//! Interactive text shell for manual play.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Args;
use minebot_core::{
    BoardGenerator, Coord, Coord2, EpisodeController, GameError, MarkOutcome, RevealOutcome,
};

use crate::config::BoardArgs;
use crate::render::render;

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    #[command(flatten)]
    pub board: BoardArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Quit,
}

fn parse_coords<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<Coord2> {
    let row = parts.next()?.parse::<Coord>().ok()?;
    let col = parts.next()?.parse::<Coord>().ok()?;
    parts.next().is_none().then_some((row, col))
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    match head {
        "q" | "quit" => parts.next().is_none().then_some(Command::Quit),
        "n" | "new" => parts.next().is_none().then_some(Command::NewGame),
        "r" | "reveal" => parse_coords(parts).map(Command::Reveal),
        "f" | "flag" => parse_coords(parts).map(Command::Flag),
        _ => parse_coords(line.split_whitespace()).map(Command::Reveal),
    }
}

const HELP: &str = "commands: r ROW COL | ROW COL | f ROW COL | n | q";

/// Reads commands from `input` until `q` or end of input, drawing the board
/// to `output` after every change.
pub fn run<G, R, W>(controller: &mut EpisodeController<G>, input: R, mut output: W) -> Result<()>
where
    G: BoardGenerator,
    R: BufRead,
    W: Write,
{
    write!(output, "{}", render(controller.session()))?;
    writeln!(output, "{HELP}")?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            writeln!(output, "unrecognized input {:?}, {HELP}", line.trim())?;
            continue;
        };

        let terminal = controller.is_terminal();
        let redraw = match command {
            Command::Quit => break,
            Command::NewGame => {
                controller.reset();
                true
            }
            Command::Reveal(_) | Command::Flag(_) if terminal => {
                writeln!(output, "the game is over, n starts a new one")?;
                false
            }
            Command::Reveal(coords) => match controller.apply_reveal(coords) {
                Ok(RevealOutcome::AlreadyRevealed) => false,
                Ok(_) => true,
                Err(err) => report(&mut output, err)?,
            },
            Command::Flag(coords) => match controller.toggle_flag(coords) {
                Ok(MarkOutcome::NoChange) => false,
                Ok(MarkOutcome::Changed) => true,
                Err(err) => report(&mut output, err)?,
            },
        };

        if redraw {
            write!(output, "{}", render(controller.session()))?;
        }
    }

    output.flush()?;
    Ok(())
}

fn report<W: Write>(output: &mut W, err: GameError) -> Result<bool> {
    log::debug!("Rejected move: {err}");
    writeln!(output, "{err}")?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use minebot_core::{EpisodeOutcome, FixedBoardGenerator, Grid, PlayVariant};

    fn controller() -> EpisodeController<FixedBoardGenerator> {
        let grid = Grid::from_mine_coords((2, 3), &[(0, 0)]).unwrap();
        EpisodeController::new(
            grid.game_config(),
            FixedBoardGenerator::single(grid),
            PlayVariant::Manual,
        )
        .unwrap()
    }

    fn play(controller: &mut EpisodeController<FixedBoardGenerator>, script: &str) -> String {
        let mut output = Vec::new();
        run(controller, Cursor::new(script), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn commands_are_parsed() {
        assert_eq!(parse_command("r 1 2"), Some(Command::Reveal((1, 2))));
        assert_eq!(parse_command("  3 4 "), Some(Command::Reveal((3, 4))));
        assert_eq!(parse_command("f 0 1"), Some(Command::Flag((0, 1))));
        assert_eq!(parse_command("n"), Some(Command::NewGame));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("r 1"), None);
        assert_eq!(parse_command("r 1 2 3"), None);
        assert_eq!(parse_command("f -1 2"), None);
        assert_eq!(parse_command("hello"), None);
    }

    #[test]
    fn flagged_cell_blocks_reveal() {
        let mut controller = controller();

        let text = play(&mut controller, "f 0 0\nr 0 0\nq\nr 1 2\n");

        assert!(text.contains("  0  F  #  #\n"));
        assert_eq!(controller.outcome(), EpisodeOutcome::Playing);
        assert_eq!(controller.revealed().revealed_count(), 0);
    }

    #[test]
    fn winning_then_restarting() {
        let mut controller = controller();

        let text = play(&mut controller, "1 2\n1 0\nr 0 0\nn\n");

        assert!(text.contains("You Win! Press n to restart\n"));
        assert!(text.contains("the game is over, n starts a new one\n"));
        assert_eq!(controller.session().episode(), 2);
        assert_eq!(controller.outcome(), EpisodeOutcome::Playing);
    }

    #[test]
    fn mine_ends_the_game() {
        let mut controller = controller();

        let text = play(&mut controller, "0 0\n");

        assert!(text.ends_with("  0  X  #  #\n  1  #  #  #\nGame Over! Press n to restart\n"));
        assert_eq!(controller.outcome(), EpisodeOutcome::GameOver);
    }

    #[test]
    fn bad_input_is_reported() {
        let mut controller = controller();

        let text = play(&mut controller, "jump\nr 9 9\n");

        assert!(text.contains("unrecognized input \"jump\""));
        assert!(text.contains(&GameError::InvalidCoords.to_string()));
        assert_eq!(controller.revealed().revealed_count(), 0);
    }
}
