//! TOML configuration for the annotation passes.
//!
//! ```toml
//! replace_builtin_tags = false
//!
//! [tags.lemma]
//! capabilities = ["numbered_block", "refable"]
//!
//! [tags.exercises]
//! capabilities = ["toc_eligible", "refable"]
//!
//! [display_names]
//! chapter = "Kapitel"
//!
//! [lists]
//! cycle = ["decimal", "lower_alpha", "bullet"]
//!
//! [ids]
//! default_base = "node"
//! ```

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::Path,
};

use crate::{
    error::AnnotateError,
    ids::DEFAULT_ID_BASE,
    lists::{LabelKind, DEFAULT_LABEL_CYCLE},
    schema::{CapabilitySet, TagSchema},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Start from an empty tag table instead of the built-in one.
    pub replace_builtin_tags: bool,
    pub tags: BTreeMap<String, TagConfig>,
    pub display_names: BTreeMap<String, String>,
    pub lists: ListConfig,
    pub ids: IdConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    pub capabilities: CapabilitySet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub cycle: Vec<LabelKind>,
}

impl Default for ListConfig {
    fn default() -> Self {
        ListConfig {
            cycle: DEFAULT_LABEL_CYCLE.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    pub default_base: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        IdConfig {
            default_base: DEFAULT_ID_BASE.to_string(),
        }
    }
}

impl AnnotatorConfig {
    pub fn from_toml_str(content: &str) -> Result<AnnotatorConfig, AnnotateError> {
        let config: AnnotatorConfig = toml::from_str(content)?;
        if config.lists.cycle.is_empty() {
            return Err(AnnotateError::Config(
                "lists.cycle must name at least one label style".to_string(),
            ));
        }
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AnnotatorConfig, AnnotateError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read annotator config from: {:?}", path);
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(AnnotatorConfig::default());
        }
        let content = read_to_string(path)?;
        AnnotatorConfig::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, AnnotateError> {
        Ok(toml::to_string(self)?)
    }

    /// The tag schema this configuration describes.
    pub fn schema(&self) -> TagSchema {
        let mut schema = if self.replace_builtin_tags {
            TagSchema::empty()
        } else {
            TagSchema::builtin()
        };
        for (tag, tag_config) in self.tags.iter() {
            schema.register(tag, tag_config.capabilities);
        }
        for (tag, name) in self.display_names.iter() {
            schema.set_display_name(tag, name);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Capability;
    use std::fs::write;
    use tempfile::TempDir;
    use test_log::test;

    const SAMPLE: &str = r#"
[tags.exercises]
capabilities = ["toc_eligible", "refable"]

[tags.section]
capabilities = ["refable"]

[display_names]
chapter = "Kapitel"

[lists]
cycle = ["upper_roman", "bullet"]

[ids]
default_base = "node"
"#;

    #[test]
    fn test_parse_and_build_schema() {
        let config = AnnotatorConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            config.lists.cycle,
            vec![LabelKind::UpperRoman, LabelKind::Bullet]
        );
        assert_eq!(config.ids.default_base, "node");

        let schema = config.schema();
        assert!(schema.is_toc_eligible("exercises"));
        assert!(!schema.is_division("section"));
        assert!(schema.is_division("chapter"));
        assert_eq!(schema.display_name("chapter"), "Kapitel");
        assert_eq!(
            schema.capabilities("exercises"),
            Capability::TocEligible | Capability::Refable
        );
    }

    #[test]
    fn test_replace_builtin_tags() {
        let config = AnnotatorConfig::from_toml_str(
            "replace_builtin_tags = true\n[tags.lesson]\ncapabilities = [\"division\"]\n",
        )
        .unwrap();
        let schema = config.schema();
        assert!(schema.is_division("lesson"));
        assert!(!schema.is_division("chapter"));
    }

    #[test]
    fn test_defaults() {
        let config = AnnotatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnnotatorConfig::default());
        assert_eq!(config.lists.cycle, DEFAULT_LABEL_CYCLE.to_vec());
        assert_eq!(config.ids.default_base, DEFAULT_ID_BASE);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            AnnotatorConfig::from_toml_str("[lists]\ncycle = []\n"),
            Err(AnnotateError::Config(_))
        ));
        assert!(matches!(
            AnnotatorConfig::from_toml_str("[tags.x]\ncapabilities = [\"flying\"]\n"),
            Err(AnnotateError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let missing = AnnotatorConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, AnnotatorConfig::default());

        let path = dir.path().join("annotator.toml");
        write(&path, SAMPLE).unwrap();
        let loaded = AnnotatorConfig::load(&path).unwrap();
        assert_eq!(loaded.display_names.get("chapter").map(String::as_str), Some("Kapitel"));

        let round = AnnotatorConfig::from_toml_str(&loaded.to_toml_string().unwrap()).unwrap();
        assert_eq!(round, loaded);
    }
}
