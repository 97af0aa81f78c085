//! Credential checks for email-or-username login.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },
}

pub const MIN_PASSWORD_LEN: usize = 8;

pub trait CredentialHasher {
    /// Produces a self-describing encoded hash (PHC string) with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] if the hashing backend fails.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `false` for a wrong password and for an unparseable stored hash.
    fn verify(&self, password: &str, encoded: &str) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        use argon2::password_hash::rand_core::OsRng;
        use argon2::password_hash::SaltString;
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, encoded: &str) -> bool {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};

        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// A stored account that a login identifier may refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCandidate {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Chooses the account `identifier` refers to.
///
/// A case-insensitive email match wins. Otherwise the identifier must equal
/// exactly one non-empty username; several accounts sharing it resolve to
/// nobody.
#[must_use]
pub fn pick_login_candidate(
    candidates: Vec<LoginCandidate>,
    identifier: &str,
) -> Option<LoginCandidate> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }

    let folded = identifier.to_lowercase();
    let (by_email, by_username): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.email.to_lowercase() == folded);

    if let Some(found) = by_email.into_iter().next() {
        return Some(found);
    }

    let mut usernames = by_username
        .into_iter()
        .filter(|c| !c.username.is_empty() && c.username == identifier);
    match (usernames.next(), usernames.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Checks `password` against `candidate` and returns the user id on success.
///
/// When there is no candidate a hash is still computed so that unknown
/// identifiers cost as much as wrong passwords. The password is verified
/// before the active flag is looked at for the same reason.
pub fn authenticate<H>(
    hasher: &H,
    candidate: Option<&LoginCandidate>,
    password: &str,
) -> Option<i64>
where
    H: CredentialHasher + ?Sized,
{
    let Some(user) = candidate else {
        let _ = hasher.hash(password);
        return None;
    };

    let password_ok = hasher.verify(password, &user.password_hash);
    (password_ok && user.is_active).then_some(user.user_id)
}

/// Normalizes and validates registration input, returning the trimmed email.
///
/// # Errors
///
/// Returns [`AuthError::InvalidEmail`] or [`AuthError::WeakPassword`].
pub fn validate_registration(email: &str, password: &str) -> Result<String, AuthError> {
    let email = email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        && !email.contains(char::is_whitespace);
    if !valid_email {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Records calls; "hashes" are the password prefixed with `h:`.
    #[derive(Default)]
    struct CountingHasher {
        hashes: AtomicUsize,
        verifies: AtomicUsize,
    }

    impl CredentialHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            self.hashes.fetch_add(1, Ordering::SeqCst);
            Ok(format!("h:{password}"))
        }

        fn verify(&self, password: &str, encoded: &str) -> bool {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            encoded == format!("h:{password}")
        }
    }

    fn candidate(user_id: i64, email: &str, username: &str, is_active: bool) -> LoginCandidate {
        LoginCandidate {
            user_id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "h:correct horse".to_string(),
            is_active,
        }
    }

    #[test]
    fn unknown_identifier_still_hashes() {
        let hasher = CountingHasher::default();
        assert_eq!(authenticate(&hasher, None, "whatever"), None);
        assert_eq!(hasher.hashes.load(Ordering::SeqCst), 1);
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn correct_password_authenticates() {
        let hasher = CountingHasher::default();
        let user = candidate(4, "a@shop.test", "", true);
        assert_eq!(authenticate(&hasher, Some(&user), "correct horse"), Some(4));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hasher = CountingHasher::default();
        let user = candidate(4, "a@shop.test", "", true);
        assert_eq!(authenticate(&hasher, Some(&user), "battery staple"), None);
    }

    #[test]
    fn inactive_account_is_rejected_after_verification() {
        let hasher = CountingHasher::default();
        let user = candidate(4, "a@shop.test", "", false);
        assert_eq!(authenticate(&hasher, Some(&user), "correct horse"), None);
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn email_match_is_case_insensitive_and_wins() {
        let picked = pick_login_candidate(
            vec![
                candidate(1, "other@shop.test", "Alice@Shop.test", true),
                candidate(2, "alice@shop.test", "", true),
            ],
            "Alice@Shop.test",
        );
        assert_eq!(picked.map(|c| c.user_id), Some(2));
    }

    #[test]
    fn email_match_folds_non_ascii_case() {
        let picked = pick_login_candidate(
            vec![candidate(4, "élodie@shop.test", "", true)],
            "ÉLODIE@shop.test",
        );
        assert_eq!(picked.map(|c| c.user_id), Some(4));
    }

    #[test]
    fn unique_username_match_is_used() {
        let picked =
            pick_login_candidate(vec![candidate(3, "x@shop.test", "alice", true)], "alice");
        assert_eq!(picked.map(|c| c.user_id), Some(3));
    }

    #[test]
    fn ambiguous_username_resolves_to_nobody() {
        let picked = pick_login_candidate(
            vec![
                candidate(1, "a@shop.test", "sam", true),
                candidate(2, "b@shop.test", "sam", true),
            ],
            "sam",
        );
        assert!(picked.is_none());
    }

    #[test]
    fn empty_identifier_never_matches_blank_usernames() {
        let picked = pick_login_candidate(vec![candidate(1, "a@shop.test", "", true)], "  ");
        assert!(picked.is_none());
    }

    #[test]
    fn argon2_round_trip() {
        let hasher = Argon2Hasher;
        let encoded = hasher.hash("s3cret-pass").expect("hash");
        assert!(encoded.starts_with("$argon2"));
        assert!(hasher.verify("s3cret-pass", &encoded));
        assert!(!hasher.verify("wrong-pass", &encoded));
        assert!(!hasher.verify("s3cret-pass", "not-a-phc-string"));
    }

    #[test]
    fn registration_validation() {
        assert_eq!(
            validate_registration("  a@shop.test ", "longenough").unwrap(),
            "a@shop.test"
        );
        assert_eq!(
            validate_registration("no-at-sign", "longenough"),
            Err(AuthError::InvalidEmail)
        );
        assert_eq!(
            validate_registration("a@localhost", "longenough"),
            Err(AuthError::InvalidEmail)
        );
        assert_eq!(
            validate_registration("a@shop.test", "short"),
            Err(AuthError::WeakPassword { min: 8 })
        );
    }
}
