//! CLI command definitions

use clap::{Parser, ValueEnum};
use clinichat_domain::DispatchPolicy;
use std::path::PathBuf;

/// Which remote responder answers the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponderChoice {
    /// Offline responder that echoes the last message
    Echo,
    /// Google Gemini generateContent API
    Gemini,
}

/// What happens when a message is submitted while a reply is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyChoice {
    /// Refuse the submission until the reply arrives
    Reject,
    /// Commit immediately, dispatch after the outstanding reply
    Queue,
    /// Dispatch immediately; replies land in arrival order
    Concurrent,
}

impl From<PolicyChoice> for DispatchPolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::Reject => DispatchPolicy::Reject,
            PolicyChoice::Queue => DispatchPolicy::Queue,
            PolicyChoice::Concurrent => DispatchPolicy::Concurrent,
        }
    }
}

/// CLI arguments for clinichat
#[derive(Parser, Debug)]
#[command(name = "clinichat")]
#[command(author, version, about = "Chat panel for the clinical dashboard assistant")]
#[command(long_about = r#"
clinichat is the conversation panel of the clinical dashboard, in your terminal.

Type a message and press Enter to send it. End a line with '\' to continue
the message on the next line. Blank messages are never sent.

Configuration files are loaded from (in priority order):
1. CLINICHAT_* environment variables (nested keys split on '__')
2. --config <path>       Explicit config file
3. ./clinichat.toml      Project-level config
4. ~/.config/clinichat/config.toml   Global config

Example:
  clinichat
  clinichat --responder gemini --policy concurrent
  clinichat --no-greeting --log-conversation ./chat.jsonl
"#)]
pub struct Cli {
    /// Responder that answers messages (overrides config)
    #[arg(short, long, value_enum, value_name = "KIND")]
    pub responder: Option<ResponderChoice>,

    /// Behaviour for submissions while a reply is outstanding (overrides config)
    #[arg(short, long, value_enum, value_name = "POLICY")]
    pub policy: Option<PolicyChoice>,

    /// Start without the assistant greeting
    #[arg(long)]
    pub no_greeting: bool,

    /// Append conversation events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub log_conversation: Option<PathBuf>,

    /// Write diagnostic logs to daily-rotated files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["clinichat"]).unwrap();
        assert!(cli.responder.is_none());
        assert!(cli.policy.is_none());
        assert!(!cli.no_greeting);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "clinichat",
            "--responder",
            "gemini",
            "--policy",
            "concurrent",
            "--no-greeting",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.responder, Some(ResponderChoice::Gemini));
        assert_eq!(
            cli.policy.map(DispatchPolicy::from),
            Some(DispatchPolicy::Concurrent)
        );
        assert!(cli.no_greeting);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(Cli::try_parse_from(["clinichat", "--policy", "sometimes"]).is_err());
    }
}
