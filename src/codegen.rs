use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every generated short code.
pub const GENERATED_LEN: usize = 6;

/// Path segments that belong to the router and can never be short codes.
const RESERVED: &[&str] = &["api", "code", "healthz"];

// ── Generator ──────────────────────────────────────────────────────────────

/// Source of candidate short codes.
///
/// Generators know nothing about the store; uniqueness is the service's job.
pub trait CodeGenerator: Send + Sync {
    fn candidate(&self) -> String;
}

/// Random 6-character alphanumeric codes from a non-cryptographic RNG.
pub struct RandomCodes {
    rng: Mutex<StdRng>,
}

impl RandomCodes {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sequence, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodes {
    fn candidate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..GENERATED_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

// ── Validation ─────────────────────────────────────────────────────────────

/// Allowed length range for client-supplied short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl CodePolicy {
    /// Owner-scoped deployments accept 1–20 characters.
    pub const SCOPED: CodePolicy = CodePolicy {
        min_len: 1,
        max_len: 20,
    };

    /// Shared-namespace deployments accept 6–8 characters.
    pub const SHARED: CodePolicy = CodePolicy {
        min_len: 6,
        max_len: 8,
    };

    pub fn accepts(&self, code: &str) -> bool {
        validate_format(code, self.min_len, self.max_len) && !is_reserved(code)
    }
}

/// True iff `code` matches `^[A-Za-z0-9]{min_len,max_len}$`.
pub fn validate_format(code: &str, min_len: usize, max_len: usize) -> bool {
    (min_len..=max_len).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// True iff `url` is `http://` or `https://` followed by something.
///
/// Whitespace and control characters are rejected anywhere in the URL.
pub fn validate_url(url: &str) -> bool {
    let rest = match url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return false,
    };

    !rest.is_empty() && !url.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Router-owned path segments: `api`, `code`, `healthz`, or anything dotted.
pub fn is_reserved(segment: &str) -> bool {
    segment.contains('.') || RESERVED.contains(&segment)
}
