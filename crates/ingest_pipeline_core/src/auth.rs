//! Credential check for the upload handler. This is an equality check
//! against one configured identity/secret pair, not a credential system.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Expected identity/secret pair, sourced from configuration rather than
/// embedded constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    pub identity: String,
    pub secret: String,
}

/// Returns true iff `header` is exactly `Basic <base64(identity ":" secret)>`
/// for the expected pair. Fails closed on an absent, non-Basic, undecodable,
/// or colon-free header; never panics.
pub fn authenticate(header: Option<&str>, expected: &UploadCredentials) -> bool {
    let Some(header) = header else {
        return false;
    };
    let Some(encoded) = header.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded) else {
        return false;
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return false;
    };
    let Some((identity, secret)) = credentials.split_once(':') else {
        return false;
    };

    identity == expected.identity && secret == expected.secret
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> UploadCredentials {
        UploadCredentials {
            identity: "arya11".to_string(),
            secret: "732741".to_string(),
        }
    }

    fn encode(pair: &str) -> String {
        format!("Basic {}", STANDARD.encode(pair))
    }

    #[test]
    fn accepts_the_exact_configured_pair() {
        assert!(authenticate(Some(&encode("arya11:732741")), &expected()));
    }

    #[test]
    fn rejects_wrong_secret() {
        assert!(!authenticate(Some(&encode("arya11:000000")), &expected()));
    }

    #[test]
    fn rejects_wrong_identity() {
        assert!(!authenticate(Some(&encode("bran10:732741")), &expected()));
    }

    #[test]
    fn rejects_absent_header() {
        assert!(!authenticate(None, &expected()));
    }

    #[test]
    fn rejects_non_basic_scheme() {
        assert!(!authenticate(Some("Bearer arya11"), &expected()));
    }

    #[test]
    fn rejects_undecodable_payload() {
        assert!(!authenticate(Some("Basic %%%not-base64%%%"), &expected()));
    }

    #[test]
    fn rejects_pair_without_separator() {
        assert!(!authenticate(Some(&encode("arya11732741")), &expected()));
    }
}
