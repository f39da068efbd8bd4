use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn new<S: Into<String>>(sub: S, email: S, role: S, ttl_hours: i64) -> Self {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp();
        Self {
            sub: sub.into(),
            email: email.into(),
            role: role.into(),
            exp,
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const KEY: &str = "test-secret";

    #[test]
    fn token_roundtrip_keeps_identity() {
        let claims = UserClaims::new("some-user-id", "a@b.c", "student", 1);
        let token = generate_token(claims, KEY).unwrap();

        let decoded = process_token(&token, KEY).unwrap();
        assert_eq!(decoded.claims.sub, "some-user-id");
        assert_eq!(decoded.claims.email, "a@b.c");
        assert_eq!(decoded.claims.role, "student");
    }

    #[test]
    fn expired_token_is_distinct_from_tampered() {
        let mut claims = UserClaims::new("id", "a@b.c", "student", 1);
        claims.exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = generate_token(claims.clone(), KEY).unwrap();

        let err = process_token(&token, KEY).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));

        claims.exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = generate_token(claims, "other-secret").unwrap();
        let err = process_token(&token, KEY).unwrap_err();
        assert!(!matches!(err.kind(), ErrorKind::ExpiredSignature));
    }
}
