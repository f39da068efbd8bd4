use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::error::CryptResult;

pub fn hash_password(password: &str) -> CryptResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// A wrong password is `Ok(false)`; `Err` means the stored digest is broken.
pub fn verify_password(digest: &str, password: &str) -> CryptResult<bool> {
    let parsed = PasswordHash::new(digest)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_verify_roundtrip() {
        let digest = hash_password("hunter2!").unwrap();
        assert!(verify_password(&digest, "hunter2!").unwrap());
        assert!(!verify_password(&digest, "hunter3!").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn broken_digest_is_an_error() {
        assert!(verify_password("not-a-phc-string", "whatever").is_err());
    }
}
