//! Generated password value object.
//!
//! Passwords are produced from the thread-local CSPRNG and never leave the
//! process except inside the directory add request.

use rand::seq::{IndexedRandom, SliceRandom};

use crate::config::{
    PasswordPolicy, MAX_PASSWORD_LENGTH, PASSWORD_ALPHANUMERIC, PASSWORD_PUNCTUATION,
};
use crate::errors::{AppError, AppResult};

/// A freshly generated account password.
#[derive(Clone)]
pub struct Password {
    secret: String,
}

// Don't expose the secret in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Generate a random password.
    ///
    /// # Arguments
    /// * `length` - Total number of characters (1 to 128)
    /// * `min_non_alphanumeric` - Minimum count of punctuation characters
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `length` is zero or above the maximum, or
    /// if `min_non_alphanumeric` exceeds `length`.
    pub fn generate(length: usize, min_non_alphanumeric: usize) -> AppResult<Self> {
        if length == 0 || length > MAX_PASSWORD_LENGTH {
            return Err(AppError::invalid_argument(format!(
                "Password length must be between 1 and {}, got {}",
                MAX_PASSWORD_LENGTH, length
            )));
        }
        if min_non_alphanumeric > length {
            return Err(AppError::invalid_argument(format!(
                "Password of length {} cannot hold {} non-alphanumeric characters",
                length, min_non_alphanumeric
            )));
        }

        let mut rng = rand::rng();
        let mut chars: Vec<u8> = Vec::with_capacity(length);

        for _ in 0..min_non_alphanumeric {
            chars.extend(PASSWORD_PUNCTUATION.choose(&mut rng));
        }
        for _ in min_non_alphanumeric..length {
            chars.extend(PASSWORD_ALPHANUMERIC.choose(&mut rng));
        }
        chars.shuffle(&mut rng);

        let secret = chars.into_iter().map(char::from).collect();
        Ok(Self { secret })
    }

    /// Generate a password under a configured policy.
    pub fn from_policy(policy: &PasswordPolicy) -> AppResult<Self> {
        Self::generate(policy.length, policy.min_non_alphanumeric)
    }

    /// Get the plain text for handing to the directory.
    pub fn expose(&self) -> &str {
        &self.secret
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.secret.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}
