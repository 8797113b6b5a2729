//! Reconnection policy.
//!
//! Pure functions so the decisions can be tested without a server.

use crate::error::ClientError;

/// 再接続しても解決しないエラーか（重複接続・ハンドシェイク拒否）
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::DuplicateParticipant(_) | ClientError::HandshakeRejected(_)
    )
}

/// 再接続を試みるべきか
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The number of reconnection attempts already made
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }
    current_attempt < max_attempts
}
