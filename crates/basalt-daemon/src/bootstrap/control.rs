//! Line-oriented control channel.
//!
//! One command per line: `surprise`, `reset`, `refresh`, `status`, `quit`.
//! `status` answers with the current engine status as one JSON line; the
//! other commands are forwarded to the scheduler as lifecycle events.

use basalt_app::StatusBoard;
use basalt_core::LifecycleEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Surprise,
    Reset,
    Refresh,
    Status,
    Quit,
}

impl ControlCommand {
    fn event(self) -> Option<LifecycleEvent> {
        match self {
            ControlCommand::Surprise => Some(LifecycleEvent::Surprise),
            ControlCommand::Reset => Some(LifecycleEvent::ResetToDaily),
            ControlCommand::Refresh => Some(LifecycleEvent::Refresh),
            ControlCommand::Quit => Some(LifecycleEvent::Shutdown),
            ControlCommand::Status => None,
        }
    }
}

/// Case-insensitive; surrounding whitespace is ignored.
pub fn parse_command(line: &str) -> Option<ControlCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "surprise" => Some(ControlCommand::Surprise),
        "reset" => Some(ControlCommand::Reset),
        "refresh" => Some(ControlCommand::Refresh),
        "status" => Some(ControlCommand::Status),
        "quit" | "exit" => Some(ControlCommand::Quit),
        _ => None,
    }
}

/// Serves commands from `input` until EOF, `quit`, or `shutdown`.
///
/// EOF only stops the channel; the daemon keeps running.
pub async fn run_control<R, W>(
    input: R,
    mut output: W,
    events: mpsc::Sender<LifecycleEvent>,
    status: StatusBoard,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("Control input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = parse_command(&line) else {
            warn!(input = %line.trim(), "Unknown control command");
            output
                .write_all(format!("unknown command: {}\n", line.trim()).as_bytes())
                .await?;
            output.flush().await?;
            continue;
        };

        if command == ControlCommand::Status {
            let mut json = serde_json::to_string(&status.current())?;
            json.push('\n');
            output.write_all(json.as_bytes()).await?;
            output.flush().await?;
            continue;
        }

        info!(command = ?command, "Control command");
        if let Some(event) = command.event() {
            if events.send(event).await.is_err() {
                break;
            }
        }
        if command == ControlCommand::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_accepts_known_words() {
        assert_eq!(parse_command("surprise"), Some(ControlCommand::Surprise));
        assert_eq!(parse_command("  RESET \n"), Some(ControlCommand::Reset));
        assert_eq!(parse_command("refresh"), Some(ControlCommand::Refresh));
        assert_eq!(parse_command("status"), Some(ControlCommand::Status));
        assert_eq!(parse_command("exit"), Some(ControlCommand::Quit));
        assert_eq!(parse_command("shuffle"), None);
        assert_eq!(parse_command(""), None);
    }

    #[tokio::test]
    async fn commands_are_forwarded_until_quit() {
        let input: &[u8] = b"surprise\n\nstatus\nbogus\nreset\nquit\nrefresh\n";
        let mut output = Vec::new();
        let (tx, mut rx) = mpsc::channel(8);

        run_control(
            input,
            &mut output,
            tx,
            StatusBoard::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                LifecycleEvent::Surprise,
                LifecycleEvent::ResetToDaily,
                LifecycleEvent::Shutdown,
            ]
        );

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        let status: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(status["state"], "idle");
        assert_eq!(status["message"], "Ready");
        assert_eq!(lines.next(), Some("unknown command: bogus"));
    }

    #[tokio::test]
    async fn eof_ends_without_shutdown_event() {
        let input: &[u8] = b"refresh\n";
        let (tx, mut rx) = mpsc::channel(8);

        run_control(
            input,
            tokio::io::sink(),
            tx,
            StatusBoard::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(rx.try_recv().unwrap(), LifecycleEvent::Refresh);
        assert!(rx.try_recv().is_err());
    }
}
