//! Salted, iterated password hashing.
//!
//! Hashes use PBKDF2-HMAC-SHA256 and are stored in a self-describing text
//! form, `pbkdf2:sha256:<iterations>$<salt hex>$<digest hex>`, so the
//! iteration count can be raised without invalidating existing accounts.

use std::fmt;
use std::hint::black_box;

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Iteration count applied to newly registered passwords.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

const SCHEME: &str = "pbkdf2:sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Errors raised while parsing a stored hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// The stored value does not start with the expected scheme.
    #[error("unsupported password hash scheme")]
    UnsupportedScheme,
    /// The stored value is not `scheme:iterations$salt$digest`.
    #[error("malformed password hash")]
    Malformed,
}

/// Encoded password hash.
///
/// ## Invariants
/// - The encoded form always parses back into scheme, iteration count, salt,
///   and digest.
///
/// # Examples
/// ```
/// use family_tree::domain::PasswordHash;
///
/// let hash = PasswordHash::create("hunter2", 1_000);
/// assert!(hash.verify("hunter2"));
/// assert!(!hash.verify("hunter3"));
/// assert!(!hash.as_str().contains("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `plaintext` with a fresh random salt.
    pub fn create(plaintext: &str, iterations: u32) -> Self {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let iterations = iterations.max(1);
        let digest = derive(plaintext, &salt, iterations);
        Self(format!(
            "{SCHEME}:{iterations}${}${}",
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    /// Wrap a previously stored hash after checking its shape.
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, PasswordHashError> {
        let encoded = encoded.into();
        parse(&encoded)?;
        Ok(Self(encoded))
    }

    /// Return true when `plaintext` produces the stored digest.
    pub fn verify(&self, plaintext: &str) -> bool {
        let Ok(parts) = parse(&self.0) else {
            return false;
        };
        let candidate = derive(plaintext, &parts.salt, parts.iterations);
        candidate.as_slice().ct_eq(parts.digest.as_slice()).into()
    }

    /// Spend one derivation at `iterations` when no stored hash exists.
    ///
    /// Always false. Lets a login for an unknown account cost as much as one
    /// with a wrong password.
    pub fn verify_absent(plaintext: &str, iterations: u32) -> bool {
        black_box(derive(plaintext, &[0_u8; SALT_LEN], iterations.max(1)));
        false
    }

    /// Encoded form as stored in the `password_hash` column.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

struct HashParts {
    iterations: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn parse(encoded: &str) -> Result<HashParts, PasswordHashError> {
    let rest = encoded
        .strip_prefix(SCHEME)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or(PasswordHashError::UnsupportedScheme)?;
    let mut fields = rest.split('$');
    let (Some(iterations), Some(salt), Some(digest), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(PasswordHashError::Malformed);
    };
    let iterations = iterations
        .parse::<u32>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or(PasswordHashError::Malformed)?;
    let salt = hex::decode(salt).map_err(|_| PasswordHashError::Malformed)?;
    let digest = hex::decode(digest).map_err(|_| PasswordHashError::Malformed)?;
    if salt.is_empty() || digest.len() != DIGEST_LEN {
        return Err(PasswordHashError::Malformed);
    }
    Ok(HashParts {
        iterations,
        salt,
        digest,
    })
}

fn derive(plaintext: &str, salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0_u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(plaintext.as_bytes(), salt, iterations, &mut digest);
    digest
}
