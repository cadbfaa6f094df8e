use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

/// Well-formed Argon2id hash with default parameters that matches no password.
const FALLBACK_DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c25pcHBldGJveC1kdW1teQ$IMee/Cc1/xbF6A/V3qBWv5+vhSuoh+jQimNy3hGJRzA";

lazy_static! {
    /// Hash checked against when no account matches, so a missing email costs
    /// the same Argon2 work as a wrong password.
    static ref DUMMY_HASH: String = dummy_hash(hash_password("snippetbox-dummy-password"));
}

fn dummy_hash(generated: anyhow::Result<String>) -> String {
    generated.unwrap_or_else(|e| {
        error!(error = %e, "dummy hash generation failed; using fallback");
        FALLBACK_DUMMY_HASH.to_owned()
    })
}

/// Argon2id hash with a random salt, in PHC string format.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Spends a verification's worth of work and always fails.
pub fn verify_against_dummy(plain: &str) {
    let _ = verify_password(plain, &DUMMY_HASH);
}
