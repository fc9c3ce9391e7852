use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::principal::Principal;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[cfg(test)]
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token carries invalid claims")]
    InvalidClaims,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) is_admin: bool,
    pub(crate) exp: i64,
}

impl Claims {
    pub(crate) fn into_principal(self) -> Result<Principal, JwtError> {
        let email = self.email.trim();
        if self.user_id <= 0 || email.is_empty() {
            return Err(JwtError::InvalidClaims);
        }
        Ok(Principal::new(self.user_id, email, self.is_admin))
    }
}

/// Проверяет токены, выпущенные внешним сервисом аутентификации (HS256).
pub(crate) struct JwtService {
    secret: String,
}

impl JwtService {
    pub(crate) fn new(secret: &str) -> Self {
        JwtService {
            secret: secret.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn generate_token(
        &self,
        principal: &Principal,
        ttl_seconds: i64,
    ) -> Result<String, JwtError> {
        use chrono::{Duration, Utc};
        use jsonwebtoken::{EncodingKey, Header, encode};

        let claims = Claims {
            user_id: principal.id,
            email: principal.email.clone(),
            is_admin: principal.is_admin,
            exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }

    pub(crate) fn resolve_principal(&self, token: &str) -> Result<Principal, JwtError> {
        self.verify_token(token)?.into_principal()
    }
}
