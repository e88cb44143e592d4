//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{error::ClientError, session::run_client_session};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// How often and how fast to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            interval: Duration::from_secs(RECONNECT_INTERVAL_SECS),
        }
    }
}

/// Run the listener client until Ctrl+C or until reconnection gives up.
pub async fn run_client(url: String, policy: ReconnectPolicy) -> Result<(), ClientError> {
    tokio::select! {
        result = reconnect_loop(&url, policy) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, exiting");
            Ok(())
        }
    }
}

async fn reconnect_loop(url: &str, policy: ReconnectPolicy) -> Result<(), ClientError> {
    let mut failed_attempts = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            failed_attempts + 1,
            policy.max_attempts
        );

        match run_client_session(url).await {
            // The session had been established, so the budget starts over
            ClientError::ConnectionLost(reason) => {
                tracing::warn!("Connection lost: {}", reason);
                failed_attempts = 0;
            }
            e => {
                tracing::warn!("{}", e);
                failed_attempts += 1;
            }
        }

        if failed_attempts >= policy.max_attempts {
            return Err(ClientError::ReconnectExhausted(policy.max_attempts));
        }

        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            policy.interval,
            failed_attempts + 1,
            policy.max_attempts
        );
        tokio::time::sleep(policy.interval).await;
    }
}
