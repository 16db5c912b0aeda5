use ring::rand::{SecureRandom, SystemRandom};

pub const POLL_ID_LENGTH: usize = 7;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Largest multiple of the alphabet size that fits in a byte; bytes at or
// above it are rejected so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// Generates a short random alphanumeric poll id.
///
/// Uniqueness is only probabilistic; callers do not check for an existing
/// poll under the same id.
pub fn generate_poll_id() -> Result<String, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    let mut id = String::with_capacity(POLL_ID_LENGTH);
    let mut bytes = [0u8; 16];

    while id.len() < POLL_ID_LENGTH {
        rng.fill(&mut bytes)?;
        for &byte in bytes.iter().filter(|&&b| b < ACCEPT_BELOW) {
            id.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
            if id.len() == POLL_ID_LENGTH {
                break;
            }
        }
    }
    Ok(id)
}

pub fn vote_url(base_url: &str, poll_id: &str) -> String {
    format!("{}/api/v1/polls/{}/vote", base_url.trim_end_matches('/'), poll_id)
}

pub fn results_url(base_url: &str, poll_id: &str) -> String {
    format!("{}/api/v1/polls/{}/results", base_url.trim_end_matches('/'), poll_id)
}
