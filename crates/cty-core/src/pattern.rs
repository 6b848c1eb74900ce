//! Sample values for `pattern` constraints
//!
//! Values are drawn from the regex with an RNG seeded from the pattern's
//! SHA-256 digest, so the same pattern always yields the same sample.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Upper bound for unbounded repetitions (`*`, `+`, `{n,}`)
const MAX_REPEAT: u32 = 4;

/// Generator for strings matching a schema pattern
pub struct PatternSampler;

impl PatternSampler {
    /// Produce a string matching `pattern`
    ///
    /// Returns `None` when the pattern does not compile or cannot be sampled.
    pub fn sample(pattern: &str) -> Option<String> {
        regex::Regex::new(pattern).ok()?;

        let generator = rand_regex::Regex::compile(strip_anchors(pattern), MAX_REPEAT).ok()?;
        let mut rng = StdRng::from_seed(seed(pattern));

        Some(rng.sample::<String, _>(&generator))
    }
}

/// Drop the outer `^`/`$` anchors; a sample is always a full match anyway
fn strip_anchors(pattern: &str) -> &str {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    match body.strip_suffix('$') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => body,
    }
}

fn seed(pattern: &str) -> [u8; 32] {
    let digest = Sha256::digest(pattern.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    seed
}
