use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Claims decoded from the middle segment of a session token.
///
/// Kept as a free-form mapping: the only claim the client reads is `exp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims(pub Map<String, Value>);

impl TokenClaims {
    /// Expiry in seconds since the epoch.
    ///
    /// A missing, zero or non-numeric `exp` counts as absent.
    pub fn exp(&self) -> Option<f64> {
        let exp = self.0.get("exp")?.as_f64()?;
        (exp != 0.0 && exp.is_finite()).then_some(exp)
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let nanos = (self.exp()? * 1_000_000_000.0) as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }
}
