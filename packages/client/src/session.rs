//! WebSocket client session management.

use futures_util::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use fanout_shared::time::now_millis;

use super::{error::ClientError, formatter::MessageFormatter};

/// Run one session: connect to `url` and print frames until the connection ends.
///
/// Always returns an error describing why the session ended; the caller decides
/// whether to reconnect.
pub async fn run_client_session(url: &str) -> ClientError {
    let (ws_stream, _response) = match connect_async(url).await {
        Ok(result) => result,
        Err(e) => return ClientError::ConnectionFailed(e.to_string()),
    };

    tracing::info!("Connected to {}", url);
    println!("\nListening for broadcasts from {}. Press Ctrl+C to exit.\n", url);

    // Nothing is ever sent, so only the read half is kept
    let (_write, mut read) = ws_stream.split();

    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => {
                println!(
                    "{}",
                    MessageFormatter::format_text_message(text.as_str(), now_millis())
                );
            }
            Ok(Message::Binary(data)) => {
                println!(
                    "{}",
                    MessageFormatter::format_binary_message(data.len(), now_millis())
                );
            }
            Ok(Message::Close(frame)) => {
                let reason = frame
                    .map(|f| f.reason.as_str().to_string())
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or_else(|| "server closed the connection".to_string());
                tracing::info!("Server closed the connection: {}", reason);
                return ClientError::ConnectionLost(reason);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("WebSocket read error: {}", e);
                return ClientError::ConnectionLost(e.to_string());
            }
        }
    }

    ClientError::ConnectionLost("stream ended".to_string())
}
