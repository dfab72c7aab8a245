//! Human-readable order ids: `ORD-<epoch millis, base36>-<4 random base36>`.

use chrono::{DateTime, Utc};
use greenhouse_core::OrderId;
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 4;

/// Generate an order id stamped with `now`.
#[must_use]
pub fn generate(now: DateTime<Utc>) -> OrderId {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| digit(rng.random_range(0..ALPHABET.len())))
        .collect();
    OrderId::new(format!("ORD-{}-{suffix}", base36(millis)))
}

fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(digit(usize::try_from(value % 36).unwrap_or_default()));
        value /= 36;
    }
    digits.iter().rev().collect()
}

fn digit(index: usize) -> char {
    ALPHABET.get(index).map_or('0', |&b| char::from(b))
}
