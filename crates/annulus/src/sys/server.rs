use super::status::StatusBoard;
use crate::events::AppEvent;
use async_channel::Sender;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/annulus.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Event(AppEvent),
    Status,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match (words.next()?, words.next()) {
        ("tap", None) => Command::Event(AppEvent::Tap),
        ("ambient", Some("on")) => Command::Event(AppEvent::Ambient(true)),
        ("ambient", Some("off")) => Command::Event(AppEvent::Ambient(false)),
        ("reload", None) => Command::Event(AppEvent::ConfigReload),
        ("status", None) => Command::Status,
        _ => return None,
    };
    words.next().is_none().then_some(command)
}

/// Line protocol: one command per line, one reply line per command.
pub async fn run_server(tx: Sender<AppEvent>, status: Arc<StatusBoard>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                let status = Arc::clone(&status);
                tokio::spawn(async move {
                    let (reader, mut writer) = stream.into_split();
                    let mut lines = BufReader::new(reader).lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply = match parse_command(&line) {
                            Some(Command::Event(event)) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                                "ok".to_string()
                            }
                            Some(Command::Status) => status.read().to_string(),
                            None => {
                                log::debug!("Unknown control command '{}'", line.trim());
                                format!("error: unknown command '{}'", line.trim())
                            }
                        };
                        if writer.write_all(format!("{}\n", reply).as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
