use std::path::Path;

use crate::env::expand_env;
use crate::error::{ConfigError, Result};
use crate::types::AppConfig;

/// Load, environment-expand, parse, and validate the YAML configuration
/// file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    load_str(&raw)
}

/// Parse and validate an already-read configuration document. Split out
/// from [`load`] so tests can exercise parsing without touching the
/// filesystem.
pub fn load_str(raw: &str) -> Result<AppConfig> {
    let expanded = expand_env(raw);
    let config: AppConfig = serde_yaml::from_str(&expanded)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_from_disk_and_expands_env() {
        std::env::set_var("PINGUIN_TEST_TOKEN", "secret-token");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  databasePath: "pinguin.db"
  grpcAuthToken: "${{PINGUIN_TEST_TOKEN}}"
  masterEncryptionKey: "01234567890123456789012345678901"
tenants:
  - id: acme
    displayName: Acme
    domains: ["acme.example.com"]
"#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.server.grpc_auth_token, "secret-token");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(load("/nonexistent/pinguin.yaml").is_err());
    }

    #[test]
    fn invalid_config_fails_validation() {
        let result = load_str(
            r#"
server:
  databasePath: ""
  grpcAuthToken: "token"
  masterEncryptionKey: "01234567890123456789012345678901"
tenants: []
"#,
        );
        assert!(result.is_err());
    }
}
