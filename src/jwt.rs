use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: Duration::from_secs(config.ttl_minutes.max(1) as u64 * 60),
        }
    }

    pub fn sign(&self, member_id: i32, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: member_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        tracing::debug!(member_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str, issuer: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify() {
        let keys = keys("dev-secret", "menu-review");
        let token = keys.sign(7, "soldier1").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "soldier1");
        assert_eq!(claims.iss, "menu-review");
    }

    #[test]
    fn rejects_foreign_issuer_and_secret() {
        let token = keys("dev-secret", "menu-review").sign(1, "a").expect("sign");
        assert!(keys("dev-secret", "someone-else").verify(&token).is_err());
        assert!(keys("other-secret", "menu-review").verify(&token).is_err());
    }
}
