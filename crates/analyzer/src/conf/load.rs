//! Load: the source list is a flat JSON array of `{id, path, type}` objects.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::source::SourceSpec;
use super::error::ConfigError;

/// Read and validate the source list at `path`.
pub fn load_sources(path: impl AsRef<Path>) -> Result<Vec<SourceSpec>, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let specs: Vec<SourceSpec> = serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    validate_sources(&specs)?;
    info!("Loaded {} sources from {}", specs.len(), path.display());
    Ok(specs)
}

/// Ids must be non-empty and unique; paths must be non-empty.
pub fn validate_sources(specs: &[SourceSpec]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        if spec.id.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("source #{} has an empty id", i + 1)));
        }
        if spec.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!("source '{}' has an empty path", spec.id)));
        }
        if !seen.insert(spec.id.as_str()) {
            return Err(ConfigError::Invalid(format!("duplicate source id '{}'", spec.id)));
        }
    }
    Ok(())
}

/// Write `specs` as an indented JSON array, creating parent directories.
pub fn save_sources(path: impl AsRef<Path>, specs: &[SourceSpec]) -> Result<(), ConfigError> {
    let path = path.as_ref();
    validate_sources(specs)?;

    let unwritable = |source| ConfigError::Unwritable {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }

    let json = serde_json::to_string_pretty(specs).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    fs::write(path, json).map_err(unwritable)?;

    debug!("Saved {} sources to {}", specs.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Dialect;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"[
                {"id": "web", "path": "/var/log/nginx/access.log", "type": "nginx-access"},
                {"id": "db", "path": "/var/log/mysql/error.log", "type": "MySQL-Error"},
                {"id": "misc", "path": "misc.log", "type": "syslog"}
            ]"#,
        )
        .unwrap();

        let specs = load_sources(&path).unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].dialect, Dialect::NginxAccess);
        assert_eq!(specs[1].dialect, Dialect::MysqlError);
        assert_eq!(specs[2].dialect, Dialect::Unknown);
    }

    #[test]
    fn test_unreadable_and_malformed_are_distinct() {
        let dir = tempdir().unwrap();

        let missing = load_sources(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Unreadable { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not an array").unwrap();
        assert!(matches!(load_sources(&bad), Err(ConfigError::Malformed { .. })));

        let wrong_shape = dir.path().join("object.json");
        fs::write(&wrong_shape, r#"{"id": "x", "path": "x", "type": "json"}"#).unwrap();
        assert!(matches!(load_sources(&wrong_shape), Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_entries() {
        let dup = vec![
            SourceSpec::new("a", "a.log", Dialect::Generic),
            SourceSpec::new("a", "b.log", Dialect::Generic),
        ];
        assert!(matches!(validate_sources(&dup), Err(ConfigError::Invalid(msg)) if msg.contains("duplicate")));

        let empty_id = vec![SourceSpec::new(" ", "a.log", Dialect::Generic)];
        assert!(matches!(validate_sources(&empty_id), Err(ConfigError::Invalid(_))));

        let empty_path = vec![SourceSpec::new("a", "", Dialect::Generic)];
        assert!(matches!(validate_sources(&empty_path), Err(ConfigError::Invalid(_))));

        assert!(validate_sources(&[]).is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/conf/sources.json");
        let specs = vec![
            SourceSpec::new("app", "app.log", Dialect::CustomApp),
            SourceSpec::new("api", "api.jsonl", Dialect::Json),
        ];

        save_sources(&path, &specs).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"type\": \"custom-app\""));
        assert_eq!(load_sources(&path).unwrap(), specs);
    }
}
