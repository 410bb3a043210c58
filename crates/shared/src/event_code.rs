//! Event codes: short uppercase alphanumeric identifiers shared between riders.
//!
//! New codes are 8 characters long. Older events may carry 9-character codes,
//! so lookups accept both lengths.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use url::Url;

/// Length of newly generated event codes.
pub const EVENT_CODE_LENGTH: usize = 8;

/// Query parameter carrying the event code in shareable links.
pub const EVENT_QUERY_PARAM: &str = "event";

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

lazy_static! {
    static ref EXACT_CODE: Regex = Regex::new(r"^[A-Z0-9]{8,9}$").unwrap();
    static ref EMBEDDED_CODE: Regex = Regex::new(r"[A-Z0-9]{8,9}").unwrap();
}

/// Generates a random event code using the thread-local RNG.
pub fn generate_event_code() -> String {
    generate_event_code_with(&mut rand::thread_rng())
}

/// Generates a random event code from the given RNG.
pub fn generate_event_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..EVENT_CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `code` is a well-formed event code.
pub fn is_valid_event_code(code: &str) -> bool {
    EXACT_CODE.is_match(code)
}

/// Drops a trailing `:suffix` (copied share links sometimes carry one),
/// trims and uppercases.
fn clean(input: &str) -> String {
    input
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

/// Extracts an event code from user input.
///
/// Accepts a bare code (`ASN9UH7K`, `asn9uh7k:1`) or a shareable URL carrying
/// the code in its `event` query parameter. When the input is neither a bare
/// code nor a parseable URL, the first 8-9 character alphanumeric run is used.
pub fn extract_event_code(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        return None;
    }

    let cleaned = clean(input);
    if is_valid_event_code(&cleaned) {
        return Some(cleaned);
    }

    match Url::parse(input.trim()) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == EVENT_QUERY_PARAM)
            .map(|(_, value)| clean(&value))
            .filter(|code| is_valid_event_code(code)),
        Err(_) => EMBEDDED_CODE
            .find(&cleaned)
            .map(|m| m.as_str().to_string()),
    }
}
