//! Line command parsing.
//!
//! Turns what the user types at the prompt into a `ClientMessage` for the
//! coordinator. Role checks are left to the server; the parser only knows the
//! syntax.

use rickshaw_server::infrastructure::dto::websocket::ClientMessage;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  request <pickup> -> <destination> [fare]   request a ride (students)
  accept <request-id>                        accept an offer (drivers)
  decline <request-id>                       decline an offer (drivers)
  start <request-id>                         start an accepted trip (drivers)
  complete <request-id> [fare]               complete a trip
  cancel <request-id>                        cancel a ride
  available on|off                           toggle availability (drivers)
  read <notification-id>                     mark a notification as read
  sync                                       reload the notification log
  help                                       show this help
  quit                                       leave";

/// 入力された 1 行の解釈結果
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(ClientMessage),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a valid fare")]
    InvalidFare(String),
}

/// 1 行のコマンドを解析する
///
/// `participant_id` は自分の identity で、`ride_request` / `ride_accepted` /
/// `ride_declined` に添えられる。
pub fn parse_command(line: &str, participant_id: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword.to_ascii_lowercase().as_str() {
        "request" => parse_request(rest, participant_id),
        "accept" => Ok(Command::Send(ClientMessage::RideAccepted {
            request_id: single_arg(rest, "accept <request-id>")?,
            driver_id: Some(participant_id.to_string()),
        })),
        "decline" => Ok(Command::Send(ClientMessage::RideDeclined {
            request_id: single_arg(rest, "decline <request-id>")?,
            driver_id: Some(participant_id.to_string()),
        })),
        "start" => Ok(Command::Send(ClientMessage::TripStarted {
            request_id: single_arg(rest, "start <request-id>")?,
        })),
        "complete" => parse_complete(rest),
        "cancel" => Ok(Command::Send(ClientMessage::CancelRide {
            request_id: single_arg(rest, "cancel <request-id>")?,
        })),
        "available" => match rest.to_ascii_lowercase().as_str() {
            "on" => Ok(Command::Send(ClientMessage::UpdateAvailability {
                is_available: true,
            })),
            "off" => Ok(Command::Send(ClientMessage::UpdateAvailability {
                is_available: false,
            })),
            _ => Err(CommandError::Usage("available on|off")),
        },
        "read" => Ok(Command::Send(ClientMessage::MarkNotificationRead {
            notification_id: single_arg(rest, "read <notification-id>")?,
        })),
        "sync" => Ok(Command::Send(ClientMessage::SyncNotifications)),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn parse_fare(value: &str) -> Result<u32, CommandError> {
    value
        .parse::<u32>()
        .map_err(|_| CommandError::InvalidFare(value.to_string()))
}

// request <pickup> -> <destination> [fare]
fn parse_request(rest: &str, participant_id: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "request <pickup> -> <destination> [fare]";

    let (pickup, tail) = rest.split_once("->").ok_or(CommandError::Usage(USAGE))?;
    let pickup = pickup.trim();
    let tail = tail.trim();

    // 末尾の数値は運賃として扱う
    let (destination, fare) = match tail.rsplit_once(char::is_whitespace) {
        Some((destination, last)) if last.chars().all(|c| c.is_ascii_digit()) => {
            (destination.trim(), Some(parse_fare(last)?))
        }
        _ => (tail, None),
    };

    if pickup.is_empty() || destination.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }

    Ok(Command::Send(ClientMessage::RideRequest {
        requester_id: Some(participant_id.to_string()),
        pickup: pickup.to_string(),
        destination: destination.to_string(),
        fare,
        distance_km: None,
        driver_id: None,
    }))
}

// complete <request-id> [fare]
fn parse_complete(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "complete <request-id> [fare]";

    let mut parts = rest.split_whitespace();
    let request_id = parts.next().ok_or(CommandError::Usage(USAGE))?.to_string();
    let actual_fare = parts.next().map(parse_fare).transpose()?;
    if parts.next().is_some() {
        return Err(CommandError::Usage(USAGE));
    }
    Ok(Command::Send(ClientMessage::TripCompleted {
        request_id,
        actual_fare,
    }))
}
