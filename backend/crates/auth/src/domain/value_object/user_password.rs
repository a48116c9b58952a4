//! User Password Value Object
//!
//! Domain wrappers around `platform::password`.
//!
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//!
//! let raw = RawPassword::new("harbor-lights-7".to_string()).unwrap();
//! let hashed = UserPassword::from_raw(&raw).unwrap();
//! assert!(hashed.verify(&raw));
//! ```

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password typed by a user. Zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// A password the user wants to set; the policy applies
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| {
            let message = match e {
                PasswordPolicyError::TooShort { min, .. } => {
                    format!("Password must be at least {} characters", min)
                }
                PasswordPolicyError::TooLong { max, .. } => {
                    format!("Password must be at most {} characters", max)
                }
                other => other.to_string(),
            };
            AuthError::PasswordPolicy(message)
        })?;

        Ok(Self(clear_text))
    }

    /// A password that is only compared against a stored hash
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::new_unchecked(raw))
    }

    pub fn same_as(&self, other: &RawPassword) -> bool {
        self.0.same_as(&other.0)
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id PHC string as stored in `users.password_hash`
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword) -> AuthResult<Self> {
        let hashed = raw
            .inner()
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Self(hashed))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".to_string()))?;

        Ok(Self(hashed))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword) -> bool {
        self.0.verify(raw.inner())
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_policy() {
        assert!(RawPassword::new("ValidPass123!".to_string()).is_ok());

        let err = RawPassword::new("short1".to_string()).unwrap_err();
        assert!(matches!(err, AuthError::PasswordPolicy(ref m) if m.contains("at least 8")));

        let err = RawPassword::new("lettersonly".to_string()).unwrap_err();
        assert!(matches!(err, AuthError::PasswordPolicy(ref m) if m.contains("letters and numbers")));
    }

    #[test]
    fn test_for_verification_skips_policy() {
        let raw = RawPassword::for_verification("x".to_string());
        assert!(format!("{:?}", raw).contains("REDACTED"));
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw).unwrap();

        assert!(hashed.verify(&raw));
        assert!(hashed.verify(&RawPassword::for_verification("TestPassword123!".to_string())));
        assert!(!hashed.verify(&RawPassword::for_verification("WrongPassword123!".to_string())));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string().to_string()).unwrap();
        assert!(restored.verify(&raw));
        assert!(UserPassword::from_phc_string("plain-text").is_err());
    }

    #[test]
    fn test_same_as() {
        let a = RawPassword::for_verification("Secret123".to_string());
        let b = RawPassword::for_verification("Secret123".to_string());
        let c = RawPassword::for_verification("Secret124".to_string());
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }
}
