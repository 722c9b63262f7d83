//! Console output formatter for chat messages

use clinichat_domain::{Author, Message, MessageStatus};
use colored::Colorize;

/// Formats messages and session notices for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one message: a label line, then each display line indented.
    pub fn format_message(message: &Message) -> String {
        let mut output = String::new();

        output.push_str(&Self::label(message));
        output.push('\n');

        let body = Self::indent_lines(message.display_lines(), "  ");
        if message.is_failed() {
            output.push_str(&body.red().to_string());
        } else {
            output.push_str(&body);
        }
        output.push('\n');

        output
    }

    /// Format the whole transcript, oldest first
    pub fn format_transcript(messages: &[Message]) -> String {
        if messages.is_empty() {
            return format!("{}\n", "(no messages yet)".dimmed());
        }
        messages
            .iter()
            .map(Self::format_message)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn welcome(responder: &str, policy: &str) -> String {
        let line = "─".repeat(45);
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", line.cyan()));
        output.push_str(&format!("{:^45}\n", "Clinical Assistant - Chat".bold()));
        output.push_str(&format!("{}\n\n", line.cyan()));
        output.push_str(&format!("{} {}\n", "Responder:".cyan().bold(), responder));
        output.push_str(&format!("{} {}\n\n", "While waiting:".cyan().bold(), policy));
        output.push_str(&Self::help());
        output
    }

    pub fn help() -> String {
        let mut output = String::new();
        output.push_str("Commands:\n");
        output.push_str("  /help, /h, /?     - Show this help\n");
        output.push_str("  /history          - Show the conversation so far\n");
        output.push_str("  /quit, /exit, /q  - End the session\n");
        output.push_str("End a line with '\\' to continue the message on the next line.\n");
        output
    }

    pub fn notice(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    fn label(message: &Message) -> String {
        let time = message.timestamp.format("%H:%M").to_string();
        let author = match message.author {
            Author::User => message.author.label().green().bold(),
            Author::Assistant => message.author.label().cyan().bold(),
            Author::System => message.author.label().yellow().bold(),
        };
        match message.status {
            MessageStatus::Committed => format!("{} {}", author, time.dimmed()),
            MessageStatus::Pending => {
                format!("{} {} {}", author, time.dimmed(), "(sending…)".dimmed())
            }
            MessageStatus::Failed => format!("{} {} {}", author, time.dimmed(), "(failed)".red()),
        }
    }

    /// Indent each line with `prefix`, preserving blank lines
    fn indent_lines<'a>(lines: impl Iterator<Item = &'a str>, prefix: &str) -> String {
        lines
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
