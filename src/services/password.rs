//! Password generation for broker CLI accounts.
//!
//! The charset leaves out every character the broker's CLI rejects
//! (`:()";'<>,`\*&|`) along with the XML metacharacters. Request bodies are
//! escaped regardless.

use rand::Rng;
use thiserror::Error;

use crate::constants::password::{MAX_LENGTH, MIN_LENGTH};

pub const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^-_=+.~";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {0}")]
    InvalidLength(usize),
}

pub fn validate_length(length: usize) -> Result<usize, PasswordError> {
    if (MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        Ok(length)
    } else {
        Err(PasswordError::InvalidLength(length))
    }
}

/// Generates a password of exactly `length` characters.
///
/// Uses the thread-local CSPRNG, which is reseeded from the OS.
pub fn generate_password(length: usize) -> Result<String, PasswordError> {
    validate_length(length)?;

    let mut rng = rand::rng();
    let password = (0..length)
        .map(|_| char::from(PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())]))
        .collect();

    Ok(password)
}
