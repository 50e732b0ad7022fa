//! Bearer-token generation and comparison.

use rand::distributions::Alphanumeric;
use rand::Rng;

use plotd_core::{PlotError, PlotResult};

/// Generate a random alphanumeric token of the requested length.
///
/// Drawn from the thread-local CSPRNG. A length of 0 yields an empty token,
/// meaning "no authentication".
///
/// # Errors
///
/// Returns [`PlotError::InvalidArgument`] for negative lengths.
pub fn random_token(len: i64) -> PlotResult<String> {
    let len = usize::try_from(len)
        .map_err(|_| PlotError::InvalidArgument("token length must be 0 or higher".to_string()))?;
    Ok(rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect())
}

/// Compare a presented credential against the configured token in time
/// independent of where the strings differ. Only the length is observable.
#[must_use]
pub fn token_eq(presented: &str, expected: &str) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
