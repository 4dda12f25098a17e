//! Payment reference generation.
//!
//! A reference is the 10-character alphanumeric code a customer keys into a
//! Multicaixa terminal. Generation is cheap and collision-resistant but not
//! collision-free: the `payment_references.reference` column carries a unique
//! index and the payment service regenerates on conflict.

use chrono::Utc;
use uuid::Uuid;

/// Generate a fresh 10-character payment reference.
pub fn generate() -> String {
    from_parts(Uuid::new_v4(), Utc::now().timestamp_millis())
}

/// Deterministic core: first 5 hex chars of the uuid + last 5 digits of the
/// millisecond timestamp.
fn from_parts(seed: Uuid, unix_millis: i64) -> String {
    let simple = seed.simple().to_string();
    let head = &simple[..5];

    let millis = unix_millis.to_string();
    let tail = &millis[millis.len().saturating_sub(5)..];

    format!("{head}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_ten_alphanumeric_chars() {
        for _ in 0..100 {
            let reference = generate();
            assert_eq!(reference.len(), 10);
            assert!(reference.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let seed = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        assert_eq!(from_parts(seed, 1_700_000_012_345), "a1b2c12345");
    }

    #[test]
    fn short_timestamps_are_kept_whole() {
        let seed = Uuid::parse_str("deadbeef-0000-0000-0000-000000000000").unwrap();
        assert_eq!(from_parts(seed, 123), "deadb123");
    }

    #[test]
    fn fresh_references_differ() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b, "uuid head should differ even within one millisecond");
    }
}
