use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded access token: whatever the client asked to have signed, plus the
/// issue and expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn email(&self) -> Option<&str> {
        self.payload.get("email").and_then(Value::as_str)
    }
}

/// Sign `payload` as-is. No credential check happens here: whoever calls
/// `/jwt` gets a token for the identity they assert.
pub fn issue(
    mut payload: Map<String, Value>,
    secret: &str,
    ttl_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    payload.remove("iat");
    payload.remove("exp");

    let now = Utc::now();
    let claims = Claims {
        payload,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Check signature and expiry. No clock leeway: a token is dead the second
/// its `exp` passes.
pub fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
