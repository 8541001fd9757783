//! Accounts, credentials, and authenticated identities.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::text::{TextValidationError, bounded_text, check_length};
pub use super::ids::UserId;

bounded_text!(
    /// Display name chosen at registration.
    UserName, field = "name", min = 1, max = 64, trimmed
);

/// Maximum email length accepted at registration.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Length is enforced separately; this only checks the local@domain.tld shape.
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lower-cased email address used as the login key.
///
/// # Examples
/// ```
/// use campussphere::domain::Email;
///
/// let email = Email::new("  Ada@Example.ORG ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Normalise and validate an email address.
    ///
    /// # Errors
    /// Returns [`TextValidationError`] for blank, oversized, or malformed input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TextValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        check_length("email", &normalised, 1, EMAIL_MAX)?;
        if !email_regex().is_match(&normalised) {
            return Err(TextValidationError::Malformed { field: "email" });
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Plain-text password held only long enough to hash or verify.
///
/// The buffer is wiped on drop and never printed.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Minimum password length in characters.
    pub const MIN: usize = 8;
    /// Maximum password length in characters.
    pub const MAX: usize = 128;

    /// Validate a password chosen at registration.
    ///
    /// # Errors
    /// Returns [`TextValidationError`] when the length is out of range.
    pub fn new(raw: impl Into<String>) -> Result<Self, TextValidationError> {
        let raw = Zeroizing::new(raw.into());
        check_length("password", &raw, Self::MIN, Self::MAX)?;
        Ok(Self(raw))
    }

    /// Wrap a password supplied at login without applying registration rules.
    #[must_use]
    pub fn unchecked(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Borrow the secret for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Encoded password hash (PHC string format).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash loaded from storage or produced by a hasher.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Platform-wide account role. Registration always assigns `Student`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular campus member.
    Student,
    /// Platform administrator.
    Admin,
}

/// Raised when a stored or claimed role string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role: {0}")]
pub struct UnknownUserRole(pub String);

impl UserRole {
    /// Stable storage and token representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = UnknownUserRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownUserRole(other.to_owned())),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller identity recovered from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated account.
    pub user_id: UserId,
    /// Role claimed at token issue time.
    pub role: UserRole,
}

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: UserName,
    /// Unique, lower-cased login email.
    pub email: Email,
    /// Argon2 PHC hash of the password.
    pub password_hash: PasswordHash,
    /// Platform role.
    pub role: UserRole,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Identity carried in tokens issued for this account.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            role: self.role,
        }
    }
}

/// Bearer token handed out at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Encoded JWT.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.org")]
    #[case("  Grace.Hopper@Navy.MIL ")]
    #[case("a+tag@sub.campus.edu")]
    fn accepts_plausible_emails(#[case] raw: &str) {
        let email = Email::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), raw.trim().to_lowercase());
    }

    #[rstest]
    #[case("", TextValidationError::Empty { field: "email" })]
    #[case("no-at-sign", TextValidationError::Malformed { field: "email" })]
    #[case("two@@example.org", TextValidationError::Malformed { field: "email" })]
    #[case("missing@tld", TextValidationError::Malformed { field: "email" })]
    fn rejects_bad_emails(#[case] raw: &str, #[case] expected: TextValidationError) {
        assert_eq!(Email::new(raw), Err(expected));
    }

    #[rstest]
    fn password_length_is_enforced() {
        assert_eq!(
            Password::new("short").map(|_| ()),
            Err(TextValidationError::TooShort {
                field: "password",
                min: Password::MIN
            })
        );
        assert!(Password::new("long enough").is_ok());
    }

    #[rstest]
    fn secrets_are_not_printed() {
        let password = Password::unchecked("hunter22");
        assert!(!format!("{password:?}").contains("hunter22"));
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert!(!format!("{hash:?}").contains("secret"));
    }

    #[rstest]
    #[case(UserRole::Student)]
    #[case(UserRole::Admin)]
    fn role_parses_its_own_representation(#[case] role: UserRole) {
        assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert!("moderator".parse::<UserRole>().is_err());
    }

    #[rstest]
    fn user_name_is_trimmed() {
        let name = UserName::new("  Ada ").expect("valid name");
        assert_eq!(name.as_str(), "Ada");
    }
}
