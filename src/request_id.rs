//! Request ID generation.

use std::sync::atomic::{AtomicI32, Ordering};

/// Monotonic request ID counter.
///
/// IDs only correlate a response with its request; they are never
/// persisted. The counter wraps from `i32::MAX` back to 1 so IDs stay
/// positive.
///
/// ```
/// use snmp_v1::RequestIdGenerator;
///
/// let ids = RequestIdGenerator::new(1);
/// assert_eq!(ids.next(), 1);
/// assert_eq!(ids.next(), 2);
/// assert_eq!(ids.peek(), 3);
/// ```
#[derive(Debug)]
pub struct RequestIdGenerator {
    next: AtomicI32,
}

impl RequestIdGenerator {
    /// Create a generator whose first ID is `start`.
    pub fn new(start: i32) -> Self {
        Self {
            next: AtomicI32::new(start),
        }
    }

    /// Take the next ID.
    pub fn next(&self) -> i32 {
        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            let following = if current == i32::MAX { 1 } else { current + 1 };
            match self
                .next
                .compare_exchange_weak(current, following, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return current,
                Err(actual) => current = actual,
            }
        }
    }

    /// The ID the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> i32 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}
