//! Publisher and subscriber authorization.
//!
//! [`AuthorizationGate`] holds the two role secrets and turns a bearer
//! token into either a publish decision or a topic entitlement. A token
//! that fails verification is reported as an [`AuthError`], never folded
//! into a plain denial.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

/// Claim carrying the subscriber's entitled topics.
const TOPICS_CLAIM: &str = "topics";

/// Verified JWT claims.
type Claims = Map<String, Value>;

/// A credential failed signature, format, or time-window verification.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthError(#[from] jsonwebtoken::errors::Error);

impl AuthError {
    /// Returns the underlying verification failure kind.
    #[must_use]
    pub fn kind(&self) -> &jsonwebtoken::errors::ErrorKind {
        self.0.kind()
    }
}

/// Decides publisher eligibility and subscriber topic entitlement.
///
/// Configured once at startup and read-only afterwards. A `None` secret
/// puts the corresponding role in open mode.
#[derive(Clone, Default)]
pub struct AuthorizationGate {
    publisher_secret: Option<String>,
    subscriber_secret: Option<String>,
}

impl AuthorizationGate {
    /// Creates a gate from optional role secrets. Empty strings are
    /// treated as unset.
    #[must_use]
    pub fn new(publisher_secret: Option<String>, subscriber_secret: Option<String>) -> Self {
        Self {
            publisher_secret: publisher_secret.filter(|s| !s.is_empty()),
            subscriber_secret: subscriber_secret.filter(|s| !s.is_empty()),
        }
    }

    /// Returns `true` if publishing requires a signed token.
    #[must_use]
    pub fn publisher_secured(&self) -> bool {
        self.publisher_secret.is_some()
    }

    /// Returns `true` if subscribing requires a signed token.
    #[must_use]
    pub fn subscriber_secured(&self) -> bool {
        self.subscriber_secret.is_some()
    }

    /// Decides whether `token` may publish.
    ///
    /// Always allows when no publisher secret is configured. With a secret
    /// configured, an empty token is denied.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token is present but cannot be verified
    /// against the publisher secret.
    pub fn authorize_publisher(&self, token: &str) -> Result<bool, AuthError> {
        let Some(secret) = self.publisher_secret.as_deref() else {
            return Ok(true);
        };
        if token.is_empty() {
            return Ok(false);
        }
        verify(token, secret)?;
        Ok(true)
    }

    /// Resolves the topics `token` may receive.
    ///
    /// - no subscriber secret: `Some(vec![])`, connect but receive nothing
    /// - secret set, empty token: `None`
    /// - verified token: the `topics` claim, or `None` if the claim is
    ///   missing or is not an array of strings
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token is present but cannot be verified
    /// against the subscriber secret.
    pub fn authorize_subscriber(&self, token: &str) -> Result<Option<Vec<String>>, AuthError> {
        let Some(secret) = self.subscriber_secret.as_deref() else {
            return Ok(Some(Vec::new()));
        };
        if token.is_empty() {
            return Ok(None);
        }
        let claims = verify(token, secret)?;
        Ok(topics_claim(&claims))
    }
}

impl fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("publisher_secured", &self.publisher_secured())
            .field("subscriber_secured", &self.subscriber_secured())
            .finish()
    }
}

/// Verifies an HMAC-signed token and returns its claims.
///
/// `exp` and `nbf` are checked when present, with no leeway, but no claim
/// is required.
fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.required_spec_claims.clear();
    validation.validate_aud = false;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = jsonwebtoken::decode::<Claims>(token, &key, &validation)?;
    Ok(data.claims)
}

fn topics_claim(claims: &Claims) -> Option<Vec<String>> {
    claims
        .get(TOPICS_CLAIM)?
        .as_array()?
        .iter()
        .map(|topic| topic.as_str().map(str::to_owned))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    fn sign(claims: &Value, secret: &str) -> String {
        let Ok(token) = jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        ) else {
            panic!("token encoding failed");
        };
        token
    }

    fn gate(publisher: Option<&str>, subscriber: Option<&str>) -> AuthorizationGate {
        AuthorizationGate::new(publisher.map(String::from), subscriber.map(String::from))
    }

    #[test]
    fn open_publisher_allows_empty_token() {
        let gate = gate(None, None);
        assert!(matches!(gate.authorize_publisher(""), Ok(true)));
    }

    #[test]
    fn empty_secret_is_open_mode() {
        let gate = gate(Some(""), Some(""));
        assert!(!gate.publisher_secured());
        assert!(!gate.subscriber_secured());
        assert!(matches!(gate.authorize_publisher(""), Ok(true)));
    }

    #[test]
    fn secured_publisher_denies_missing_token() {
        let gate = gate(Some("s1"), None);
        assert!(matches!(gate.authorize_publisher(""), Ok(false)));
    }

    #[test]
    fn secured_publisher_allows_valid_token() {
        let gate = gate(Some("s1"), None);
        let token = sign(&json!({"sub": "publisher"}), "s1");
        assert!(matches!(gate.authorize_publisher(&token), Ok(true)));
    }

    #[test]
    fn forged_publisher_token_is_an_error() {
        let gate = gate(Some("s1"), None);
        let token = sign(&json!({"sub": "publisher"}), "other");
        let Err(err) = gate.authorize_publisher(&token) else {
            panic!("expected verification error");
        };
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature
        ));
    }

    #[test]
    fn garbage_token_is_an_error() {
        let gate = gate(Some("s1"), Some("s2"));
        assert!(gate.authorize_publisher("not-a-jwt").is_err());
        assert!(gate.authorize_subscriber("not-a-jwt").is_err());
    }

    #[test]
    fn expired_token_is_an_error() {
        let gate = gate(Some("s1"), None);
        let token = sign(&json!({"exp": 1_000}), "s1");
        let Err(err) = gate.authorize_publisher(&token) else {
            panic!("expected expiry error");
        };
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn recently_expired_token_gets_no_leeway() {
        let gate = gate(Some("s1"), None);
        let exp = jsonwebtoken::get_current_timestamp() - 5;
        let token = sign(&json!({ "exp": exp }), "s1");
        let Err(err) = gate.authorize_publisher(&token) else {
            panic!("expected expiry error");
        };
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn not_yet_valid_token_is_an_error() {
        let gate = gate(Some("s1"), Some("s1"));
        let token = sign(&json!({"nbf": 4_000_000_000_u64, "topics": ["a"]}), "s1");

        let Err(err) = gate.authorize_publisher(&token) else {
            panic!("expected immature signature error on publish");
        };
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ImmatureSignature
        ));

        let Err(err) = gate.authorize_subscriber(&token) else {
            panic!("expected immature signature error on subscribe");
        };
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ImmatureSignature
        ));
    }

    #[test]
    fn past_nbf_is_accepted() {
        let gate = gate(None, Some("s1"));
        let token = sign(&json!({"nbf": 1_000, "topics": ["a"]}), "s1");
        let Ok(Some(topics)) = gate.authorize_subscriber(&token) else {
            panic!("expected topics");
        };
        assert_eq!(topics, vec!["a".to_string()]);
    }

    #[test]
    fn open_subscriber_gets_empty_entitlement() {
        let gate = gate(None, None);
        let Ok(Some(topics)) = gate.authorize_subscriber("anything") else {
            panic!("expected empty entitlement");
        };
        assert!(topics.is_empty());
    }

    #[test]
    fn secured_subscriber_without_token_gets_none() {
        let gate = gate(None, Some("s1"));
        assert!(matches!(gate.authorize_subscriber(""), Ok(None)));
    }

    #[test]
    fn subscriber_topics_preserve_claim_order() {
        let gate = gate(None, Some("s1"));
        let token = sign(&json!({"topics": ["b", "a"]}), "s1");
        let Ok(Some(topics)) = gate.authorize_subscriber(&token) else {
            panic!("expected topics");
        };
        assert_eq!(topics, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn missing_topics_claim_degrades_to_none() {
        let gate = gate(None, Some("s1"));
        let token = sign(&json!({"sub": "viewer"}), "s1");
        assert!(matches!(gate.authorize_subscriber(&token), Ok(None)));
    }

    #[test]
    fn malformed_topics_claim_degrades_to_none() {
        let gate = gate(None, Some("s1"));
        for claim in [json!("a"), json!(["a", 1]), json!({"a": true})] {
            let token = sign(&json!({"topics": claim}), "s1");
            assert!(matches!(gate.authorize_subscriber(&token), Ok(None)));
        }
    }

    #[test]
    fn publisher_and_subscriber_secrets_are_independent() {
        let gate = gate(Some("pub"), Some("sub"));
        let sub_token = sign(&json!({"topics": ["a"]}), "sub");
        assert!(gate.authorize_publisher(&sub_token).is_err());
        let pub_token = sign(&json!({"topics": ["a"]}), "pub");
        assert!(gate.authorize_subscriber(&pub_token).is_err());
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let gate = gate(Some("super-secret"), None);
        let rendered = format!("{gate:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("publisher_secured: true"));
    }
}
