use std::fmt::Write;

use minebot_core::{EpisodeOutcome, Session};

/// Text board with row and column indices, plus an overlay line once the
/// episode is over.
pub fn render(session: &Session) -> String {
    let (rows, cols) = session.size();
    let mut out = String::new();

    out.push_str("   ");
    for col in 0..cols {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');

    for row in 0..rows {
        let _ = write!(out, "{:>3}", row);
        for col in 0..cols {
            let _ = write!(out, "{:>3}", session.cell_view((row, col)).symbol());
        }
        out.push('\n');
    }

    match session.outcome() {
        EpisodeOutcome::Playing => {
            let _ = writeln!(
                out,
                "episode {}, mines {}, flags {}",
                session.episode(),
                session.grid().mine_count(),
                session.flags().flagged_count()
            );
        }
        EpisodeOutcome::GameOver => out.push_str("Game Over! Press n to restart\n"),
        EpisodeOutcome::Win => out.push_str("You Win! Press n to restart\n"),
    }
    out
}
