//! Session identifier generation
//!
//! Issues the opaque tokens set via `Set-Cookie: JSESSIONID=...` on
//! successful login. Tokens are never validated by this server, so the
//! generator is fire-and-forget: it only has to be random rather than
//! guessable, and unique per call.

use std::hash::{BuildHasher, Hasher, RandomState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Source of fresh session identifiers.
#[derive(Debug)]
pub struct SessionIds {
    seed: u64,
    counter: AtomicU64,
}

impl SessionIds {
    pub fn new() -> Self {
        // RandomState carries per-process OS randomness
        let seed = RandomState::new().build_hasher().finish();

        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }

    /// Generates a fresh opaque token: 32 hex chars, unique per call.
    pub fn generate(&self) -> String {
        let nonce = self.counter.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        let mut state = self.seed ^ nanos.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ nonce;
        let mut token = String::with_capacity(32);

        for _ in 0..2 {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            token.push_str(&format!("{:016x}", state));
        }

        token
    }
}

impl Default for SessionIds {
    fn default() -> Self {
        Self::new()
    }
}
