//! Catalog loading
//!
//! Reads the quiz catalog JSON once at startup. A read, parse, or validation
//! failure yields an error and never a partial catalog.

use std::fs;
use std::path::Path;

use super::QuizCatalog;
use crate::game::SETS_PER_CATEGORY;
use crate::{Result, TtalError};

/// Parse and validate a catalog from a JSON document
pub fn parse_catalog(json: &str) -> Result<QuizCatalog> {
    let catalog: QuizCatalog = serde_json::from_str(json)?;
    catalog.validate()?;
    Ok(catalog)
}

/// Categories whose set count differs from the usual [`SETS_PER_CATEGORY`]
pub fn irregular_categories(catalog: &QuizCatalog) -> Vec<(&str, usize)> {
    catalog
        .categories()
        .iter()
        .filter(|c| c.len() != SETS_PER_CATEGORY)
        .map(|c| (c.name(), c.len()))
        .collect()
}

/// Load the catalog from disk
pub fn load_catalog(path: &Path) -> Result<QuizCatalog> {
    let content = fs::read_to_string(path).map_err(|e| {
        TtalError::DataUnavailable(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_and_log(path, &content)
}

/// Load the catalog from disk without blocking the runtime
pub async fn load_catalog_async(path: &Path) -> Result<QuizCatalog> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        TtalError::DataUnavailable(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_and_log(path, &content)
}

fn parse_and_log(path: &Path, content: &str) -> Result<QuizCatalog> {
    match parse_catalog(content) {
        Ok(catalog) => {
            tracing::info!(
                path = %path.display(),
                categories = catalog.len(),
                "Quiz catalog loaded"
            );
            for (name, sets) in irregular_categories(&catalog) {
                tracing::warn!(category = name, sets, "Unusual set count, playing all of them");
            }
            Ok(catalog)
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "Quiz catalog unavailable: {}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"{"Food": {"s1": {"statements": ["a", "b", "c"], "lie_index": 1}}}"#;

    #[test]
    fn test_parse_valid_catalog() {
        let catalog = parse_catalog(VALID).unwrap();
        assert_eq!(catalog.category_names(), vec!["Food"]);
    }

    #[test]
    fn test_parse_error_is_data_unavailable() {
        let err = parse_catalog("{not json").unwrap_err();
        assert!(matches!(err, TtalError::DataUnavailable(_)));
    }

    #[test]
    fn test_wrong_shape_is_data_unavailable() {
        let err = parse_catalog(r#"{"Food": ["a", "b"]}"#).unwrap_err();
        assert!(matches!(err, TtalError::DataUnavailable(_)));
    }

    #[test]
    fn test_malformed_set_is_invalid_catalog() {
        let json = r#"{"Food": {"s1": {"statements": ["a", "b", "c"], "lie_index": 5}}}"#;
        let err = parse_catalog(json).unwrap_err();
        assert!(matches!(err, TtalError::InvalidCatalog(_)));
    }

    #[test]
    fn test_irregular_categories() {
        let catalog = parse_catalog(VALID).unwrap();
        assert_eq!(irregular_categories(&catalog), vec![("Food", 1)]);

        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::DEFAULT_CATALOG_PATH);
        let bundled = load_catalog(&path).unwrap();
        assert!(irregular_categories(&bundled).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_catalog(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, TtalError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_async_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let catalog = load_catalog_async(file.path()).await.unwrap();
        assert!(catalog.category("Food").is_some());
    }
}
