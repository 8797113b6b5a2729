//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(participant_id: &str) {
    print!("{}> ", participant_id);
    std::io::stdout().flush().ok();
}
