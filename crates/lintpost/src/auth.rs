//! HTTP Basic credentials for the Bitbucket REST API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Bitbucket username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the `Authorization` header value is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthEncoding {
    /// RFC 7617 `Basic <base64>`
    #[default]
    Standard,

    /// Standard encoding followed by an extra `=`, as sent by older lint reporters.
    /// Only for servers whose proxies were configured to expect that exact value.
    LegacyTrailingPad,
}

/// Encode credentials as an HTTP Basic `Authorization` header value.
#[must_use]
pub fn encode_authorization(credentials: &Credentials, encoding: AuthEncoding) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", credentials.user, credentials.password));
    match encoding {
        AuthEncoding::Standard => format!("Basic {encoded}"),
        AuthEncoding::LegacyTrailingPad => format!("Basic {encoded}="),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_encoding() {
        let creds = Credentials::new("Aladdin", "open sesame");
        assert_eq!(
            encode_authorization(&creds, AuthEncoding::Standard),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_standard_encoding_without_padding() {
        let creds = Credentials::new("user", "pass");
        assert_eq!(
            encode_authorization(&creds, AuthEncoding::Standard),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn test_legacy_encoding_appends_pad() {
        let creds = Credentials::new("user", "pass");
        assert_eq!(
            encode_authorization(&creds, AuthEncoding::LegacyTrailingPad),
            "Basic dXNlcjpwYXNz="
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("ci-bot", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("ci-bot"));
        assert!(!rendered.contains("hunter2"));
    }
}
