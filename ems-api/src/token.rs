//! Issues and verifies the bearer tokens handed out at login.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{Principal, Role};

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    Creation(String),
    #[error("Token validation failed: {0}")]
    Validation(String),
    #[error("Token expired")]
    Expired,
    #[error("Token carries an unusable claim: {0}")]
    BadClaim(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i32>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn principal_id(&self) -> Result<i32, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::BadClaim(format!("sub '{}'", self.sub)))
    }

    pub fn role(&self) -> Result<Role, TokenError> {
        self.role
            .parse()
            .map_err(|e| TokenError::BadClaim(format!("{e}")))
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, issuer: &str, audience: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    fn issue_at(&self, principal: &Principal, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: principal.id.to_string(),
            email: principal.email.clone(),
            role: principal.role.as_str().to_string(),
            company_id: principal.company_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Creation(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Validation(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret-with-enough-length", "ems-api", "ems-client", 7)
    }

    fn employee() -> Principal {
        Principal {
            id: 42,
            email: "a@acme.test".to_string(),
            role: Role::Employee,
            company_id: Some(3),
            department_id: Some(1),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let svc = service();
        let claims = svc.verify(&svc.issue(&employee()).unwrap()).unwrap();
        assert_eq!(claims.principal_id().unwrap(), 42);
        assert_eq!(claims.role().unwrap(), Role::Employee);
        assert_eq!(claims.company_id, Some(3));
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn super_admin_token_has_no_company() {
        let svc = service();
        let sa = Principal {
            id: 1,
            email: "root@ems.test".to_string(),
            role: Role::SuperAdmin,
            company_id: None,
            department_id: None,
        };
        let token = svc.issue(&sa).unwrap();
        assert_eq!(svc.verify(&token).unwrap().company_id, None);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let other = TokenService::new("another-secret-entirely-different", "ems-api", "ems-client", 7);
        let token = other.issue(&employee()).unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Validation(_))));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let other = TokenService::new("unit-test-secret-with-enough-length", "ems-api", "someone-else", 7);
        let token = other.issue(&employee()).unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let token = svc
            .issue_at(&employee(), Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }
}
