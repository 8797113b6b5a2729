//! Error types for the rickshaw client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Participant ID is already connected from another session
    #[error("Participant '{0}' is already connected")]
    DuplicateParticipant(String),

    /// The server rejected the handshake (invalid identity or role)
    #[error("Handshake rejected: {0}")]
    HandshakeRejected(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
