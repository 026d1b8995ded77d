use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{auth::auth::AuthUser, models::Claims};

/// Signs a token for `principal`, valid for `ttl` seconds from `issued_at`.
pub fn generate_token(
    principal: &AuthUser,
    secret: &str,
    ttl: i64,
    issued_at: DateTime<Utc>,
) -> Result<String, Error> {
    let iat = issued_at.timestamp();
    let claims = Claims {
        id: principal.user_id,
        nama: principal.nama.clone(),
        role: principal.role,
        iat: iat.max(0) as usize,
        exp: (iat + ttl).max(0) as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Checks signature and expiry.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use chrono::Duration;
    use jsonwebtoken::errors::ErrorKind;

    fn rina() -> AuthUser {
        AuthUser {
            user_id: 7,
            nama: "Rina".into(),
            role: Role::Mahasiswa,
        }
    }

    #[test]
    fn issued_token_verifies_and_carries_principal() {
        let token = generate_token(&rina(), "s3cret", 86_400, Utc::now()).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();

        assert_eq!(claims.id, 7);
        assert_eq!(claims.nama, "Rina");
        assert_eq!(claims.role, Role::Mahasiswa);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn expired_token_is_rejected() {
        let two_days_ago = Utc::now() - Duration::days(2);
        let token = generate_token(&rina(), "s3cret", 86_400, two_days_ago).unwrap();

        let err = verify_token(&token, "s3cret").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(&rina(), "s3cret", 86_400, Utc::now()).unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }
}
