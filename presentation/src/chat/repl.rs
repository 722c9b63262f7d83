//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::config::ReplConfig;
use clinichat_application::{SessionCommand, SessionEvent};
use clinichat_domain::{DispatchState, Message, SessionError, is_submittable};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Interactive chat REPL
///
/// Owns no conversation state of its own: it forwards input as
/// [`SessionCommand`]s and renders the [`SessionEvent`]s that come back.
/// The transcript it keeps is a mirror built from those events.
pub struct ChatRepl {
    commands: mpsc::UnboundedSender<SessionCommand>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    transcript: Vec<Message>,
    config: ReplConfig,
    spinner: Option<ProgressBar>,
    outstanding: usize,
    refused: usize,
}

enum Flow {
    Continue,
    Quit,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(
        commands: mpsc::UnboundedSender<SessionCommand>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        Self {
            commands,
            events,
            transcript: Vec::new(),
            config: ReplConfig::default(),
            spinner: None,
            outstanding: 0,
            refused: 0,
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the mirror with messages that existed before events were
    /// subscribed (the greeting)
    pub fn with_transcript(mut self, messages: Vec<Message>) -> Self {
        self.transcript = messages;
        self
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Run the REPL on standard input
    pub async fn run_stdin(&mut self) -> std::io::Result<()> {
        self.run(BufReader::new(tokio::io::stdin())).await
    }

    /// Run the REPL until `/quit`, end of input, or the session ends.
    ///
    /// On return the session has been asked to destroy itself and every
    /// event it emitted before doing so has been applied to the transcript.
    /// This holds for a failed read too; the read error is returned after
    /// the session is gone.
    pub async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        if !self.config.color {
            colored::control::set_override(false);
        }
        for message in &self.transcript {
            println!("{}", ConsoleFormatter::format_message(message));
        }
        self.prompt();

        let mut lines = input.lines();
        let mut buffer = String::new();
        let mut read_error = None;

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Flow::Quit = self.handle_line(&line, &mut buffer) {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("reading input failed: {}", e);
                        read_error = Some(e);
                        break;
                    }
                    Ok(None) => {
                        // Submit a trailing continuation rather than lose it
                        if !buffer.is_empty() {
                            let text = std::mem::take(&mut buffer);
                            self.send_message(text);
                        }
                        break;
                    }
                },
                event = self.events.recv() => match event {
                    Some(SessionEvent::Destroyed) | None => {
                        self.stop_spinner();
                        println!("{}", ConsoleFormatter::notice("Session ended."));
                        return Ok(());
                    }
                    Some(event) => self.handle_event(event),
                },
            }
        }

        self.shutdown().await;
        match read_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn handle_line(&mut self, line: &str, buffer: &mut String) -> Flow {
        if let Some(head) = line.strip_suffix('\\') {
            buffer.push_str(head);
            buffer.push('\n');
            print!("... ");
            let _ = std::io::stdout().flush();
            return Flow::Continue;
        }

        // A continuation of blank lines does not start a message
        let starts_message = buffer.trim().is_empty();
        buffer.push_str(line);
        let text = std::mem::take(buffer);

        if starts_message && text.trim_start().starts_with('/') {
            let flow = self.handle_command(text.trim());
            if let Flow::Continue = flow {
                self.prompt();
            }
            return flow;
        }

        if !self.send_message(text) {
            return Flow::Quit;
        }
        Flow::Continue
    }

    /// Forward a finished message to the session. Returns false if the
    /// session is gone.
    fn send_message(&mut self, text: String) -> bool {
        if !is_submittable(&text) {
            self.prompt();
            return true;
        }
        let sent = self
            .commands
            .send(SessionCommand::DraftChanged(text))
            .and_then(|_| self.commands.send(SessionCommand::SubmitRequested));
        if sent.is_err() {
            eprintln!("{}", ConsoleFormatter::notice("Session is no longer running."));
            return false;
        }
        true
    }

    /// Handle slash commands
    fn handle_command(&mut self, cmd: &str) -> Flow {
        match cmd {
            "/quit" | "/exit" | "/q" => Flow::Quit,
            "/help" | "/h" | "/?" => {
                println!();
                print!("{}", ConsoleFormatter::help());
                println!();
                Flow::Continue
            }
            "/history" => {
                println!();
                println!("{}", ConsoleFormatter::format_transcript(&self.transcript));
                Flow::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                Flow::Continue
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::MessageAppended(message) => {
                // The user's own line is already on screen
                if !message.author.is_user() {
                    let rendered = ConsoleFormatter::format_message(&message);
                    self.print_above_spinner(&format!("\n{}", rendered));
                    if self.outstanding <= 1 {
                        self.prompt();
                    }
                }
                self.transcript.push(message);
            }
            SessionEvent::DraftChanged { submittable, .. } => {
                debug!("draft changed (submittable: {})", submittable);
            }
            SessionEvent::DispatchStarted(id) => {
                debug!("{} started", id);
                self.outstanding += 1;
                self.start_spinner();
            }
            SessionEvent::DispatchQueued(id) => {
                debug!("{} queued", id);
                self.print_above_spinner(&ConsoleFormatter::notice(
                    "Queued: will be sent after the current reply.",
                ));
            }
            SessionEvent::DispatchFinished { id, state } => {
                debug!("{} finished as {}", id, state);
                self.outstanding = self.outstanding.saturating_sub(1);
                if state == DispatchState::Cancelled {
                    self.print_above_spinner(&ConsoleFormatter::notice("Reply cancelled."));
                }
                if self.outstanding == 0 {
                    self.stop_spinner();
                }
            }
            SessionEvent::SubmitRefused(e) => {
                self.refused += 1;
                let text = match e {
                    SessionError::Busy => "A reply is still pending; message not sent.".to_string(),
                    other => format!("Message not sent: {}", other),
                };
                self.print_above_spinner(&ConsoleFormatter::notice(&text));
            }
            SessionEvent::Destroyed => {}
        }
    }

    /// Ask the session to destroy itself and apply its final events
    async fn shutdown(&mut self) {
        let _ = self.commands.send(SessionCommand::Destroy);
        while let Some(event) = self.events.recv().await {
            match event {
                SessionEvent::Destroyed => break,
                // Mirrored without redrawing the prompt
                SessionEvent::MessageAppended(message) => self.transcript.push(message),
                other => self.handle_event(other),
            }
        }
        self.stop_spinner();
        println!("Bye!");
    }

    fn prompt(&self) {
        print!("{}", self.config.prompt);
        let _ = std::io::stdout().flush();
    }

    fn start_spinner(&mut self) {
        if !self.config.show_progress || self.spinner.is_some() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Assistant is typing…");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_above_spinner(&self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| println!("{}", text)),
            None => println!("{}", text),
        }
    }
}
