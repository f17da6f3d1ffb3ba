// Credential handling: token issue and password comparison

use crate::models::Token;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Issue a fresh random bearer token
pub fn generate_token() -> Token {
    Token::new(Uuid::new_v4().to_string())
}

/// Compare a stored password with a supplied one in constant time.
///
/// Passwords are stored as given; this is the only place that compares them.
pub fn password_matches(stored: &str, supplied: &str) -> bool {
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}
