use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use time::{Duration, OffsetDateTime};

use crate::{TokenClaims, TokenError};

/// base64url that accepts both padded and unpadded segments.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes the claims segment of a session token without verifying it.
///
/// # Security Note
/// The signature is never checked. The issuing API owns token integrity;
/// the client only reads `exp` to decide when to drop a stale session.
pub fn peek_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount(segments.len()));
    }

    let payload = URL_SAFE_LENIENT.decode(segments[1])?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Time left before the token expires, measured from `now`.
///
/// Negative once the token has expired. `None` when the token cannot be
/// decoded or carries no usable `exp` claim.
pub fn time_until_expiry(token: &str, now: OffsetDateTime) -> Option<Duration> {
    let claims = peek_claims(token).ok()?;
    Some(claims.expires_at()? - now)
}
