//! Cryptographic password and username generation
//!
//! Every invocation draws fresh randomness from the operating system's
//! secure source. An OS-RNG failure is unrecoverable and panics, matching
//! the engine's propagation policy for non-verdict errors.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const PUNCTUATION: &[u8] = b"!@#$%^&*()-_=+[]{}|;:,.<>?";
const ALPHANUMERIC: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Minimum length silently enforced for generated strings
pub const MIN_LENGTH: usize = 8;

fn pick(set: &[u8]) -> char {
    set[OsRng.gen_range(0..set.len())] as char
}

/// Generate a password of `max(length, 8)` characters.
///
/// By construction the result contains at least two uppercase letters, two
/// lowercase letters, two digits, and one punctuation character; the
/// remaining positions are uniform over the union of those alphabets. The
/// positions are then shuffled with a cryptographically-random permutation
/// so the class-guaranteed characters are not predictably placed.
pub fn generate_password(length: usize) -> String {
    let length = length.max(MIN_LENGTH);
    let mut chars = Vec::with_capacity(length);

    for _ in 0..2 {
        chars.push(pick(UPPERCASE));
        chars.push(pick(LOWERCASE));
        chars.push(pick(DIGITS));
    }
    chars.push(pick(PUNCTUATION));

    let union: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, PUNCTUATION].concat();
    while chars.len() < length {
        chars.push(pick(&union));
    }

    chars.shuffle(&mut OsRng);
    chars.into_iter().collect()
}

/// Generate a username of `max(length, 8)` total characters: the prefix
/// verbatim (default `u` when empty) followed by uniformly-random
/// alphanumerics. Punctuation never appears.
pub fn generate_username(prefix: &str, length: usize) -> String {
    let prefix = if prefix.is_empty() { "u" } else { prefix };
    let length = length.max(MIN_LENGTH);

    let mut username = String::with_capacity(length);
    username.push_str(prefix);

    while username.chars().count() < length {
        username.push(pick(ALPHANUMERIC));
    }

    username
}
