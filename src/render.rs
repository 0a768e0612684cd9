//! Rendering seam between the session controller and the terminal
//!
//! The controller talks to the surface through [`RenderSink`]: repeated
//! `update` calls while a response streams in, then one `commit` per
//! finalized message. [`TerminalRenderer`] implements the sink for an
//! interactive terminal, rewriting the cursor marker in place.

use crate::session::{Message, Role, Session, CURSOR_MARKER};

use colored::{ColoredString, Colorize};
use std::io::{self, Write};

/// Receives render events from the session controller
pub trait RenderSink {
    /// Repaint the in-progress assistant text
    ///
    /// `partial` is the accumulated buffer with the cursor marker
    /// already appended.
    fn update(&mut self, partial: &str);

    /// Finalize the most recent message (no cursor marker)
    fn commit(&mut self, message: &Message);
}

/// Streams render events to stdout
///
/// While a response is in progress only the delta since the previous
/// update is written, stepping back over the cursor marker so the
/// marker always trails the text. Committed messages are printed as
/// role-tagged lines.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    /// Buffer text already written for the in-progress message
    printed: String,
    in_progress: bool,
}

impl TerminalRenderer {
    /// Create a renderer with no in-progress message
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for TerminalRenderer {
    fn update(&mut self, partial: &str) {
        let buffer = partial.strip_suffix(CURSOR_MARKER).unwrap_or(partial);
        let mut stdout = io::stdout();

        if self.in_progress {
            // Step back over the previous cursor marker.
            let _ = write!(stdout, "\u{8}");
        } else {
            let _ = write!(stdout, "{} ", role_tag(Role::Assistant));
            self.in_progress = true;
        }

        let delta = buffer.strip_prefix(self.printed.as_str()).unwrap_or(buffer);
        let _ = write!(stdout, "{}{}", delta, CURSOR_MARKER);
        let _ = stdout.flush();

        self.printed = buffer.to_string();
    }

    fn commit(&mut self, message: &Message) {
        let mut stdout = io::stdout();

        if self.in_progress {
            // Blank the cursor marker cell.
            let _ = write!(stdout, "\u{8} \u{8}");
            if message.content == self.printed {
                let _ = writeln!(stdout, "\n");
            } else {
                // The committed text replaces the partial accumulation
                // (the turn failed mid-stream).
                let _ = writeln!(stdout, "\n{}\n", message.content.red());
            }
        } else {
            let _ = writeln!(stdout, "{} {}\n", role_tag(message.role), message.content);
        }
        let _ = stdout.flush();

        self.printed.clear();
        self.in_progress = false;
    }
}

fn role_tag(role: Role) -> ColoredString {
    match role {
        Role::User => "user >".cyan().bold(),
        Role::Assistant => "assistant >".green().bold(),
    }
}

/// Re-render the committed history onto a sink
///
/// Pure over the session contents: repeated calls produce the same
/// ordered sequence of role/content pairs.
pub fn render_history(session: &Session, sink: &mut dyn RenderSink) {
    for message in session.messages() {
        sink.commit(message);
    }
}
