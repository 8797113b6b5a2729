//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, http::StatusCode, protocol::Message},
};
use url::Url;

use rickshaw_server::infrastructure::dto::websocket::ServerMessage;

use super::{
    command::{Command, HELP, parse_command},
    error::ClientError,
    formatter::MessageFormatter,
    runner::ConnectOptions,
    ui::redisplay_prompt,
};

/// ハンドシェイク用の URL（identity / role / name をクエリに載せる）
pub fn handshake_url(options: &ConnectOptions) -> Result<Url, ClientError> {
    let mut params = vec![
        ("participant_id", options.participant_id.as_str()),
        ("role", options.role.as_str()),
    ];
    if let Some(name) = &options.name {
        params.push(("name", name.as_str()));
    }
    Url::parse_with_params(&options.url, &params)
        .map_err(|e| ClientError::ConnectionError(format!("invalid url '{}': {}", options.url, e)))
}

/// 接続エラーを ClientError に分類する
fn classify_connect_error(error: tungstenite::Error, participant_id: &str) -> ClientError {
    match error {
        tungstenite::Error::Http(response) if response.status() == StatusCode::CONFLICT => {
            ClientError::DuplicateParticipant(participant_id.to_string())
        }
        tungstenite::Error::Http(response) if response.status().is_client_error() => {
            ClientError::HandshakeRejected(response.status().to_string())
        }
        other => ClientError::ConnectionError(other.to_string()),
    }
}

/// Run the WebSocket client session
pub async fn run_client_session(options: &ConnectOptions) -> Result<(), ClientError> {
    let url = handshake_url(options)?;
    let participant_id = options.participant_id.clone();

    let (ws_stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| classify_connect_error(e, &participant_id))?;

    tracing::info!("Connected to ride matching server!");
    println!(
        "\nYou are '{}' ({}). Type 'help' for commands. Press Ctrl+C to exit.\n",
        participant_id, options.role
    );

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming events
    let id_for_read = participant_id.clone();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(event) => MessageFormatter::format_server_message(&event),
                        Err(_) => MessageFormatter::format_raw_message(&text),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&id_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", participant_id);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into commands
    let id_for_write = participant_id.clone();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let message = match parse_command(&line, &id_for_write) {
                Ok(Command::Send(message)) => message,
                Ok(Command::Help) => {
                    println!("{}", HELP);
                    continue;
                }
                Ok(Command::Quit) => break,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                write_error = true;
                break;
            }
        }

        if !write_error {
            write.send(Message::Close(None)).await.ok();
        }
        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}
