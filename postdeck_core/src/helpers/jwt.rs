use super::dto::{Claims, TokenKind, TokenPair};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};

use super::env;

const ACCESS_TTL_HOURS: i64 = 24;
const REFRESH_TTL_DAYS: i64 = 30;

#[derive(Clone)]
pub struct JwtManager {
    secret: String,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>) -> Self {
        JwtManager {
            secret: secret.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env::required("SECRET")?))
    }

    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        kind: TokenKind,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expiration = match kind {
            TokenKind::Access => now + Duration::hours(ACCESS_TTL_HOURS),
            TokenKind::Refresh => now + Duration::days(REFRESH_TTL_DAYS),
        };

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            kind,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
    }

    pub fn generate_pair(
        &self,
        user_id: &str,
        username: &str,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: self.generate_token(user_id, username, TokenKind::Access)?,
            refresh_token: self.generate_token(user_id, username, TokenKind::Refresh)?,
            username: username.to_string(),
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Refresh tokens are rejected here so they cannot be used as bearer credentials.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.kind != TokenKind::Access {
            return Err(anyhow::anyhow!("Refresh token cannot be used for API access"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_roundtrip() {
        let jwt = JwtManager::new("test_secret");
        let pair = jwt.generate_pair("user-1", "alice").unwrap();

        let claims = jwt.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(pair.username, "alice");
    }

    #[test]
    fn test_refresh_token_not_accepted_as_access() {
        let jwt = JwtManager::new("test_secret");
        let pair = jwt.generate_pair("user-1", "alice").unwrap();

        assert!(jwt.validate_access_token(&pair.refresh_token).is_err());
        assert_eq!(
            jwt.validate_token(&pair.refresh_token).unwrap().kind,
            TokenKind::Refresh
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("one")
            .generate_token("u", "bob", TokenKind::Access)
            .unwrap();
        assert!(JwtManager::new("two").validate_token(&token).is_err());
    }
}
