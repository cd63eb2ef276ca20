// Typed access-token claims.
//
// The backend issues JWTs; the client only inspects the payload segment to
// learn who is signed in and what role they hold. Decoding fails closed: a
// token that does not parse into the expected shape is treated as
// unauthenticated, never silently mapped to a low-privilege role.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::Error;

/// Role claim as carried in the token payload.
///
/// `Patron` (back-office admin) is a capability superset of `Personel`
/// (field technician); the superset rule itself lives in the core crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RoleClaim {
    #[serde(rename = "PATRON")]
    Patron,
    #[serde(rename = "PERSONEL")]
    Personel,
}

/// Decoded access-token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: i64,
    pub username: String,
    pub role: RoleClaim,
    /// Expiry (unix seconds). Enforced server-side; carried for display.
    pub exp: i64,
}

/// Decode the payload segment of an access token into typed claims.
///
/// No signature verification happens client-side -- the backend is the
/// authority. What this guards against is *shape*: an opaque, truncated,
/// or role-less token yields [`Error::InvalidToken`] rather than a guess.
pub fn decode_access_claims(token: &str) -> Result<AccessClaims, Error> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Error::InvalidToken {
            message: "token is not a three-segment JWT".into(),
        });
    };

    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| Error::InvalidToken {
            message: format!("payload is not base64url: {e}"),
        })?;

    serde_json::from_slice(&raw).map_err(|e| Error::InvalidToken {
        message: format!("payload does not match expected claims: {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn forge(payload: &serde_json::Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("hdr.{body}.sig")
    }

    #[test]
    fn decodes_valid_claims() {
        let token = forge(&json!({
            "sub": 42,
            "username": "ops.demir",
            "role": "PERSONEL",
            "exp": 1_900_000_000
        }));

        let claims = decode_access_claims(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "ops.demir");
        assert_eq!(claims.role, RoleClaim::Personel);
    }

    #[test]
    fn rejects_opaque_token() {
        let result = decode_access_claims("not-a-jwt");
        assert!(matches!(result, Err(Error::InvalidToken { .. })));
    }

    #[test]
    fn rejects_bad_base64_payload() {
        let result = decode_access_claims("hdr.@@@@.sig");
        assert!(matches!(result, Err(Error::InvalidToken { .. })));
    }

    #[test]
    fn rejects_unknown_role() {
        // Fails closed: an unrecognized role never defaults to anything.
        let token = forge(&json!({
            "sub": 1,
            "username": "x",
            "role": "SUPERADMIN",
            "exp": 1
        }));
        assert!(matches!(
            decode_access_claims(&token),
            Err(Error::InvalidToken { .. })
        ));
    }

    #[test]
    fn rejects_missing_role() {
        let token = forge(&json!({ "sub": 1, "username": "x", "exp": 1 }));
        assert!(matches!(
            decode_access_claims(&token),
            Err(Error::InvalidToken { .. })
        ));
    }

    #[test]
    fn rejects_four_segment_token() {
        let result = decode_access_claims("a.b.c.d");
        assert!(matches!(result, Err(Error::InvalidToken { .. })));
    }
}
