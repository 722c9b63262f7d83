//! Interactive chat module
//!
//! Provides a line-based chat interface driving a running
//! [`ChatSession`](clinichat_application::ChatSession) through its command channel.

mod repl;

pub use repl::ChatRepl;
