//! Message formatting utilities for client display.

use fanout_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a received text frame
    ///
    /// # Arguments
    ///
    /// * `text` - Frame payload, printed verbatim
    /// * `received_at` - Unix timestamp when the frame arrived (milliseconds)
    pub fn format_text_message(text: &str, received_at: i64) -> String {
        format!("[{}] {}", timestamp_to_rfc3339(received_at), text)
    }

    /// Format a received binary frame
    pub fn format_binary_message(len: usize, received_at: i64) -> String {
        format!(
            "[{}] (binary message, {} bytes)",
            timestamp_to_rfc3339(received_at),
            len
        )
    }
}
