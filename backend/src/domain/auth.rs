//! Admin gate primitives: login credentials and the admin context.
//!
//! Inbound adapters parse raw payloads into [`LoginCredentials`], hand them to
//! [`AdminGate::login`], and keep the resulting [`AdminContext`] in whatever
//! session mechanism they use. Mutating services demand an `&AdminContext`,
//! so an unauthenticated caller cannot reach them at all.

use zeroize::Zeroizing;

/// Error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use smartpark::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "pw").expect("valid");
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as supplied.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Proof that an operator passed the admin gate.
///
/// Only [`AdminGate::login`] and [`AdminContext::restore`] create values of
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    operator: String,
}

impl AdminContext {
    /// Operator name recorded at login.
    #[must_use]
    pub fn operator(&self) -> &str {
        self.operator.as_str()
    }

    /// Rebuild a context from a previously persisted operator name.
    ///
    /// Returns `None` for blank names so a tampered or empty session value
    /// never authenticates.
    #[must_use]
    pub fn restore(operator: &str) -> Option<Self> {
        let trimmed = operator.trim();
        (!trimmed.is_empty()).then(|| Self {
            operator: trimmed.to_owned(),
        })
    }
}

/// Permissive admin gate.
///
/// Any well-formed credentials are accepted; nothing is checked against a
/// store.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminGate;

impl AdminGate {
    /// Admit the operator named in `credentials`.
    #[must_use]
    pub fn login(self, credentials: &LoginCredentials) -> AdminContext {
        tracing::info!(operator = credentials.username(), "admin login accepted");
        AdminContext {
            operator: credentials.username().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  admin  ", " secret ")]
    #[case("ops", "x")]
    fn gate_admits_any_well_formed_credentials(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password).expect("valid inputs");
        assert_eq!(creds.password(), password);

        let ctx = AdminGate.login(&creds);
        assert_eq!(ctx.operator(), username.trim());
    }

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case(" ops ", Some("ops"))]
    fn restore_rejects_blank_operators(#[case] stored: &str, #[case] expected: Option<&str>) {
        let restored = AdminContext::restore(stored);
        assert_eq!(restored.as_ref().map(AdminContext::operator), expected);
    }
}
