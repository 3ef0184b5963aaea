use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The default guideline document could not be produced.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("default guidelines unavailable: {0}")]
pub struct GuidelineUnavailable(pub String);

/// Source of the guideline set used when a caller supplies none.
///
/// The document is opaque: it is hashed, never interpreted.
pub trait GuidelineLoader: Send + Sync {
    fn load_default(&self) -> Result<Value, GuidelineUnavailable>;
}

/// What to do when the default guideline document cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidelineFallback {
    /// Hash an empty list in place of the document, with a warning.
    #[default]
    EmptyList,
    /// Refuse to compute.
    Fail,
}

/// Reads the default guideline set from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct FileGuidelineLoader {
    path: PathBuf,
}

impl FileGuidelineLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GuidelineLoader for FileGuidelineLoader {
    fn load_default(&self) -> Result<Value, GuidelineUnavailable> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| GuidelineUnavailable(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| GuidelineUnavailable(format!("{}: {e}", self.path.display())))
    }
}

/// A fixed, in-memory guideline document.
#[derive(Debug, Clone)]
pub struct StaticGuidelineLoader {
    document: Value,
}

impl StaticGuidelineLoader {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

impl GuidelineLoader for StaticGuidelineLoader {
    fn load_default(&self) -> Result<Value, GuidelineUnavailable> {
        Ok(self.document.clone())
    }
}

/// No default document is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaultGuidelines;

impl GuidelineLoader for NoDefaultGuidelines {
    fn load_default(&self) -> Result<Value, GuidelineUnavailable> {
        Err(GuidelineUnavailable("no default guideline document configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn file_loader_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"topic": "dosage"}}]"#).unwrap();
        let loader = FileGuidelineLoader::new(file.path());
        assert_eq!(loader.load_default().unwrap(), json!([{"topic": "dosage"}]));
    }

    #[test]
    fn file_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileGuidelineLoader::new(dir.path().join("absent.json"));
        let err = loader.load_default().unwrap_err();
        assert!(err.0.contains("absent.json"));
    }

    #[test]
    fn file_loader_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(FileGuidelineLoader::new(file.path()).load_default().is_err());
    }

    #[test]
    fn static_and_none() {
        let doc = json!({"rules": [1, 2]});
        assert_eq!(StaticGuidelineLoader::new(doc.clone()).load_default().unwrap(), doc);
        assert!(NoDefaultGuidelines.load_default().is_err());
    }

    #[test]
    fn fallback_serde_names() {
        assert_eq!(GuidelineFallback::default(), GuidelineFallback::EmptyList);
        let parsed: GuidelineFallback = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(parsed, GuidelineFallback::Fail);
        assert_eq!(
            serde_json::to_string(&GuidelineFallback::EmptyList).unwrap(),
            "\"empty_list\""
        );
    }
}
