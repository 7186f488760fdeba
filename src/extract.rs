//! Flight number detection in free-form text.
//!
//! A flight number is any whitespace-delimited token that mixes letters and
//! ASCII digits ("AA123", "dl456?", "N12345"). Tokens are returned exactly as they
//! appear, punctuation included.

use crate::session::Turn;

/// Return the leftmost token containing at least one letter and one digit.
pub fn extract_flight_number(text: &str) -> Option<&str> {
    text.split_whitespace().find(|token| is_flight_token(token))
}

/// Scan prior human messages, oldest first, and return the first flight number found.
pub fn find_flight_number_in_history(turns: &[Turn]) -> Option<&str> {
    turns
        .iter()
        .find_map(|turn| extract_flight_number(&turn.human))
}

fn is_flight_token(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && token.chars().any(|c| c.is_ascii_digit())
}
