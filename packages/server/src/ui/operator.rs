//! Operator input: turns terminal or piped lines into broadcasts.
//!
//! Producers push [`OperatorInput`] events into an unbounded channel;
//! [`run_operator_loop`] consumes them and broadcasts each line in turn.

use std::{io::IsTerminal, sync::Arc};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::mpsc,
};

use crate::{
    config::InputMode,
    domain::{DeliveryError, OutboundMessage},
    usecase::BroadcastMessageUseCase,
};

/// One event from the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    /// A completed line, possibly still carrying its terminator
    Line(String),
    /// The operator pressed Ctrl+C inside the line editor
    Interrupted,
}

/// How the operator loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorExit {
    /// Input reached EOF (or the producer went away)
    EndOfInput,
    /// The operator asked the server to stop
    Interrupted,
}

pub type OperatorReceiver = mpsc::UnboundedReceiver<OperatorInput>;

/// Start the producer selected by `mode` on the process's standard input.
pub fn spawn_operator_input(mode: InputMode, prompt: String) -> OperatorReceiver {
    let interactive = match mode {
        InputMode::Auto => std::io::stdin().is_terminal(),
        InputMode::Readline => true,
        InputMode::Pipe => false,
    };

    if interactive {
        tracing::debug!("Reading operator input with line editor");
        spawn_readline(prompt)
    } else {
        tracing::debug!("Reading operator input from piped stdin");
        spawn_line_reader(tokio::io::stdin())
    }
}

/// Interactive producer: a line editor on a blocking thread.
pub fn spawn_readline(prompt: String) -> OperatorReceiver {
    let (input_tx, input_rx) = mpsc::unbounded_channel();

    // rustyline is synchronous, so it gets its own OS thread
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.is_empty() {
                        rl.add_history_entry(line.as_str()).ok();
                    }
                    if input_tx.send(OperatorInput::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // the editor holds the terminal in raw mode, so Ctrl+C arrives here
                    let _ = input_tx.send(OperatorInput::Interrupted);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("Operator input closed (EOF)");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Non-interactive producer: reads `reader` line by line until EOF.
///
/// Lines that are not valid UTF-8 are skipped.
pub fn spawn_line_reader<R>(reader: R) -> OperatorReceiver
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (input_tx, input_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    tracing::info!("Operator input closed (EOF)");
                    break;
                }
                Ok(_) => match String::from_utf8(buf.clone()) {
                    Ok(line) => {
                        if input_tx.send(OperatorInput::Line(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Skipping operator line that is not UTF-8: {}", e),
                },
                Err(e) => {
                    tracing::error!("Failed to read operator input: {}", e);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Broadcast every operator line until input ends or the operator interrupts.
///
/// Each broadcast completes before the next line is taken.
pub async fn run_operator_loop(
    mut input: OperatorReceiver,
    broadcast_usecase: Arc<BroadcastMessageUseCase>,
) -> OperatorExit {
    while let Some(event) = input.recv().await {
        let line = match event {
            OperatorInput::Line(line) => line,
            OperatorInput::Interrupted => {
                tracing::info!("Operator interrupted input");
                return OperatorExit::Interrupted;
            }
        };

        let message = OutboundMessage::from_line(&line);
        let bytes = message.len();
        let report = broadcast_usecase.execute(message).await;

        if report.is_complete() {
            tracing::info!(
                bytes,
                delivered = report.delivered.len(),
                "Broadcast to {} connection(s)",
                report.attempted
            );
        } else {
            let failed_ids = failed_connection_ids(&report.failures);
            tracing::warn!(
                bytes,
                delivered = report.delivered.len(),
                failed = report.failures.len(),
                failed_ids = %failed_ids,
                "Broadcast to {} connection(s) partially failed",
                report.attempted
            );
        }
    }

    OperatorExit::EndOfInput
}

/// Comma separated ids of the connections a broadcast missed.
///
/// Failures without a known connection (aborted delivery tasks) are left out.
fn failed_connection_ids(failures: &[DeliveryError]) -> String {
    failures
        .iter()
        .filter_map(DeliveryError::connection_id)
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
