//! ID and clock utilities: monotonic nonces, wall-clock milliseconds, trace ids.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static NEXT_NONCE: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique, monotonically increasing nonce (starts at 1).
///
/// Used to disambiguate sliding-window counter members that land in the same
/// millisecond: `"{now_ms}-{next_monotonic_id()}"` is unique even when two
/// admits are computed on the same tick.
pub fn next_monotonic_id() -> u64 {
    NEXT_NONCE.fetch_add(1, Ordering::Relaxed)
}

/// Milliseconds since the UNIX epoch, used for sliding-window scoring.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_millis()
        as u64
}

/// Opaque trace identifier (UUID v4) for correlating logs across one request.
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_increments() {
        let a = next_monotonic_id();
        let b = next_monotonic_id();
        assert!(b > a);
    }

    #[test]
    fn trace_id_format() {
        let t = new_trace_id();
        assert_eq!(t.len(), 36);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit() || c == '-'));
    }

    #[test]
    fn now_ms_is_plausible() {
        let t = now_ms();
        assert!(t > 1_700_000_000_000);
    }
}
