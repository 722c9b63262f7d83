//! Presentation-level configuration
//!
//! Configuration for output formatting and REPL behavior.

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show a spinner while a reply is outstanding
    pub show_progress: bool,
    /// Enable colored terminal output
    pub color: bool,
    /// Prompt printed before each input line
    pub prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            color: true,
            prompt: "> ".to_string(),
        }
    }
}

impl ReplConfig {
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}
