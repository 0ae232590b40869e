//! Terminal rendering for chat output.
//!
//! During streaming, fragments are printed raw as they arrive. Complete
//! replies (for the history view) are rendered as markdown via termimad.

use std::io::Write;

use termimad::MadSkin;

/// Terminal renderer for streamed and stored replies.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render a complete reply as formatted markdown.
    pub fn render_markdown(&self, markdown: &str) -> String {
        format!("{}", self.skin.term_text(markdown))
    }

    /// Print a single streaming fragment (raw, no formatting).
    pub fn print_streaming_fragment(&self, fragment: &str) {
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }

    /// Print the stats footer after an agent reply.
    pub fn print_stats_footer(&self, response_ms: u64) {
        let seconds = response_ms as f64 / 1000.0;
        println!(
            "\n  {} {}",
            console::style("|").dim(),
            console::style(format!("{seconds:.1}s")).dim(),
        );
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}
