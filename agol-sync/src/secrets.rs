//! Platform credential lookup.

use serde::Deserialize;
use serde_json::error::Category;

use agol_core::{Credentials, SecretStore, SecretStoreError};

#[derive(Deserialize)]
struct SecretBundle {
    #[serde(rename = "AGOL_USER")]
    user: String,
    #[serde(rename = "AGOL_PASS")]
    pass: String,
}

/// Fetch the `{AGOL_USER, AGOL_PASS}` bundle stored under `secret_id`.
///
/// Store errors are returned unchanged. No retry, no caching.
pub fn get_credentials<S>(store: &S, secret_id: &str) -> Result<Credentials, SecretStoreError>
where
    S: SecretStore + ?Sized,
{
    let raw = store.secret_string(secret_id)?;
    let bundle: SecretBundle =
        serde_json::from_str(&raw).map_err(|e| SecretStoreError::Malformed {
            secret_id: secret_id.to_string(),
            message: describe(&e),
        })?;
    tracing::debug!("loaded credentials for {} from {secret_id}", bundle.user);
    Ok(Credentials {
        user: bundle.user,
        pass: bundle.pass,
    })
}

/// Kind and position of a decode failure. The serde_json message quotes the
/// offending value and must not reach logs.
fn describe(err: &serde_json::Error) -> String {
    let kind = match err.classify() {
        Category::Io => "unreadable payload",
        Category::Syntax => "payload is not valid JSON",
        Category::Data => "AGOL_USER and AGOL_PASS must both be present as strings",
        Category::Eof => "payload is truncated",
    };
    format!("{kind} (line {}, column {})", err.line(), err.column())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<&'static str, ()>);

    impl SecretStore for Fixed {
        fn secret_string(&self, secret_id: &str) -> Result<String, SecretStoreError> {
            self.0
                .map(str::to_string)
                .map_err(|()| SecretStoreError::Store {
                    secret_id: secret_id.to_string(),
                    message: "AccessDeniedException".into(),
                })
        }
    }

    #[test]
    fn parses_bundle() {
        let store = Fixed(Ok(r#"{"AGOL_USER": "svc", "AGOL_PASS": "hunter2"}"#));
        let creds = get_credentials(&store, "agol").expect("credentials");
        assert_eq!(creds.user, "svc");
        assert_eq!(creds.pass, "hunter2");
    }

    #[test]
    fn missing_key_is_malformed() {
        let store = Fixed(Ok(r#"{"AGOL_USER": "svc"}"#));
        let err = get_credentials(&store, "agol").unwrap_err();
        assert!(matches!(err, SecretStoreError::Malformed { .. }));
    }

    #[test]
    fn non_json_is_malformed_without_echoing_payload() {
        let store = Fixed(Ok("svc:hunter2"));
        let err = get_credentials(&store, "agol").unwrap_err();
        assert!(matches!(err, SecretStoreError::Malformed { .. }));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn mistyped_password_is_not_echoed() {
        let store = Fixed(Ok(r#"{"AGOL_USER":"svc","AGOL_PASS":918273645}"#));
        let err = get_credentials(&store, "agol").unwrap_err();
        assert!(matches!(err, SecretStoreError::Malformed { .. }));
        let rendered = err.to_string();
        assert!(!rendered.contains("918273645"), "{rendered}");
        assert!(rendered.contains("AGOL_PASS must both be present as strings"));
    }

    #[test]
    fn store_error_passes_through() {
        let err = get_credentials(&Fixed(Err(())), "agol").unwrap_err();
        assert!(matches!(err, SecretStoreError::Store { ref secret_id, .. } if secret_id == "agol"));
    }
}
