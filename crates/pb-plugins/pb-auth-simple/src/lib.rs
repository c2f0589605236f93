//! # pb-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Hashes account passwords into PHC strings and verifies login attempts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use pb_core::traits::AuthProvider;

pub struct SimpleAuthProvider {
    params: Params,
}

impl SimpleAuthProvider {
    /// Uses the argon2 crate's recommended cost parameters.
    pub fn new() -> Self {
        Self { params: Params::default() }
    }

    /// Cheapest parameters argon2 accepts. Test suites only.
    pub fn insecure_fast() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .unwrap_or_default();
        Self { params }
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for SimpleAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for SimpleAuthProvider {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    /// Cost parameters are read from the hash itself.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
