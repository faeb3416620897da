pub mod agent;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use agent::{AgentBackend, AgentClient, AgentReply, DEFAULT_ENDPOINT};
pub use config::Config;
pub use controller::{TranscriptController, TranscriptEvent, CONNECTION_ERROR_TEXT, SILENCE_TEXT};
pub use error::{AgentError, AgentResult};
pub use state::{ChatEntry, Sender, TranscriptState};
