//! Server configuration.

use clap::ValueEnum;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8765;
pub const DEFAULT_PROMPT: &str = "Enter message: ";

/// Where operator lines come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputMode {
    /// Line editor when stdin is a terminal, plain line reader otherwise
    #[default]
    Auto,
    /// Interactive line editor with prompt and history
    Readline,
    /// Plain line reader (for piped stdin)
    Pipe,
}

/// Runtime configuration of the broadcast server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub input_mode: InputMode,
    pub prompt: String,
}

impl ServerConfig {
    /// Address to bind, e.g. `0.0.0.0:8765` or `[::]:8765`
    pub fn bind_addr(&self) -> String {
        // IPv6 literals need brackets to be told apart from the port
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            input_mode: InputMode::default(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}
