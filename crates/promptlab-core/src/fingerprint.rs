use sha2::{Digest, Sha256};

/// Number of hex characters kept from the prompt digest.
pub const PROMPT_HASH_LEN: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Short, stable fingerprint of a prompt body.
///
/// Used as a filename component for every artifact of a prompt, so two
/// prompts with the same name but different text never share files.
pub fn prompt_hash(text: &str) -> String {
    let mut hex = sha256_hex(text);
    hex.truncate(PROMPT_HASH_LEN);
    hex
}

/// Current local time as `YYYY-MM-DD_HH-MM-SS`.
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
