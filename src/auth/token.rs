use crate::config::TokenConfig;
use crate::error::AppError;
use chrono::Duration;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The purpose a token was issued for.
///
/// The kind is embedded in the signed payload, so a token issued for one
/// purpose is structurally rejected when presented for another. Each kind is
/// also signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "session-access")]
    SessionAccess,
    #[serde(rename = "session-refresh")]
    SessionRefresh,
    #[serde(rename = "invitation")]
    Invitation,
    #[serde(rename = "reset")]
    Reset,
}

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [
        TokenKind::SessionAccess,
        TokenKind::SessionRefresh,
        TokenKind::Invitation,
        TokenKind::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::SessionAccess => "session-access",
            TokenKind::SessionRefresh => "session-refresh",
            TokenKind::Invitation => "invitation",
            TokenKind::Reset => "reset",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// The purpose this token was issued for.
    pub kind: TokenKind,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
    /// Random token id. Two tokens issued in the same second would otherwise
    /// be byte-identical, and the flows distinguish superseded tokens by
    /// string equality against the stored one.
    pub jti: Uuid,
}

/// Verification failures, distinguished so callers can map them precisely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token's TTL has elapsed.
    Expired,
    /// The token is structurally invalid or its signature matches no kind.
    Malformed,
    /// The token is genuine but was issued for a different purpose.
    KindMismatch {
        expected: TokenKind,
        found: TokenKind,
    },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token expired"),
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::KindMismatch { expected, found } => {
                write!(f, "token kind mismatch: expected {}, got {}", expected, found)
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Expired | TokenError::KindMismatch { .. } => {
                AppError::Unauthorized(format!("Invalid token: {}", error))
            }
            TokenError::Malformed => AppError::Malformed("Invalid token: malformed".into()),
        }
    }
}

struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KindKeys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and verifies signed, expiring tokens carrying a subject id and a
/// kind tag.
///
/// The codec is stateless: verification never consults storage. Secrets and
/// default TTLs come from [`TokenConfig`] at construction; there is no
/// environment fallback.
pub struct TokenCodec {
    session_access: KindKeys,
    session_refresh: KindKeys,
    invitation: KindKeys,
    reset: KindKeys,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            session_access: KindKeys::new(
                &config.session_access.secret,
                config.session_access.ttl,
            ),
            session_refresh: KindKeys::new(
                &config.session_refresh.secret,
                config.session_refresh.ttl,
            ),
            invitation: KindKeys::new(&config.invitation.secret, config.invitation.ttl),
            reset: KindKeys::new(&config.reset.secret, config.reset.ttl),
        }
    }

    fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::SessionAccess => &self.session_access,
            TokenKind::SessionRefresh => &self.session_refresh,
            TokenKind::Invitation => &self.invitation,
            TokenKind::Reset => &self.reset,
        }
    }

    /// Issues a token for `subject` with the kind's configured default TTL.
    pub fn issue(&self, subject: Uuid, kind: TokenKind) -> Result<String, AppError> {
        let ttl = self.keys(kind).ttl;
        self.issue_with_ttl(subject, kind, ttl)
    }

    /// Issues a token for `subject` that expires `ttl` from now.
    pub fn issue_with_ttl(
        &self,
        subject: Uuid,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let expiration = (chrono::Utc::now() + ttl).timestamp() as usize;

        let claims = Claims {
            sub: subject,
            kind,
            exp: expiration,
            jti: Uuid::new_v4(),
        };

        encode(&Header::default(), &claims, &self.keys(kind).encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies `token` against `expected` and returns the subject id.
    ///
    /// Pure and side-effect-free. Single-use semantics (invitation, reset,
    /// refresh) are enforced by the flows comparing against the stored token,
    /// never here.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Uuid, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<Claims>(token, &self.keys(expected).decoding, &validation) {
            Ok(data) => {
                // Reachable only if two kinds share a secret; the kind claim
                // is still the authority.
                if data.claims.kind != expected {
                    return Err(TokenError::KindMismatch {
                        expected,
                        found: data.claims.kind,
                    });
                }
                Ok(data.claims.sub)
            }
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                ErrorKind::InvalidSignature => Err(self.classify_foreign(token, expected)),
                _ => Err(TokenError::Malformed),
            },
        }
    }

    /// A signature that fails under `expected`'s key may still be a genuine
    /// token of another kind. Probing the remaining keys lets callers report
    /// a kind mismatch instead of a generic malformed token.
    fn classify_foreign(&self, token: &str, expected: TokenKind) -> TokenError {
        let mut validation = Validation::default();
        validation.leeway = 0;
        // Classification only; an expired foreign token is still a mismatch.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        for kind in TokenKind::ALL {
            if kind == expected {
                continue;
            }
            if let Ok(data) = decode::<Claims>(token, &self.keys(kind).decoding, &validation) {
                return TokenError::KindMismatch {
                    expected,
                    found: data.claims.kind,
                };
            }
        }
        TokenError::Malformed
    }
}
