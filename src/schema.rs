// Tag classification and display names.
//
// A `TagSchema` decides, per tag name, which structural roles a node plays (division, numbered
// block, reference target, ToC entry, list, list item) and how the tag is named for readers.
// Tags missing from the table have no capabilities and a title-cased display name.

use enumset::{EnumSet, EnumSetType};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Built-in schema covering common book/article structure.
pub static DEFAULT_SCHEMA: Lazy<TagSchema> = Lazy::new(TagSchema::builtin);

#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Structural container; resets block numbering and gets a ToC entry.
    Division,
    /// Gets a sequence number within its division.
    NumberedBlock,
    /// Can be the target of a cross-reference; gets an identifier if it lacks one.
    Refable,
    /// Appears in the table of contents without being a division.
    TocEligible,
    List,
    ListItem,
}

pub type CapabilitySet = EnumSet<Capability>;

const DIVISIONS: &[&str] = &[
    "part",
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "appendix",
];

const NUMBERED_BLOCKS: &[&str] = &[
    "definition",
    "theorem",
    "lemma",
    "corollary",
    "proposition",
    "conjecture",
    "example",
    "exercise",
    "remark",
    "figure",
    "table",
];

const BUILTIN_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("subsubsection", "Subsubsection"),
    ("ol", "List"),
    ("ul", "List"),
    ("li", "Item"),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSchema {
    tags: HashMap<String, CapabilitySet>,
    display_names: HashMap<String, String>,
}

impl TagSchema {
    /// An empty schema: no tag has any capability.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut schema = TagSchema::empty();
        for tag in DIVISIONS {
            schema.insert(
                tag,
                Capability::Division | Capability::Refable | Capability::TocEligible,
            );
        }
        for tag in NUMBERED_BLOCKS {
            schema.insert(tag, Capability::NumberedBlock | Capability::Refable);
        }
        for tag in ["list", "ol", "ul"] {
            schema.insert(tag, Capability::List.into());
        }
        for tag in ["item", "li"] {
            schema.insert(tag, Capability::ListItem.into());
        }
        for (tag, name) in BUILTIN_DISPLAY_NAMES {
            schema
                .display_names
                .insert(tag.to_string(), name.to_string());
        }
        schema
    }

    fn insert(&mut self, tag: &str, capabilities: CapabilitySet) {
        self.tags.insert(tag.to_string(), capabilities);
    }

    /// Set the capabilities of `tag`, replacing any previous entry.
    pub fn register(&mut self, tag: &str, capabilities: CapabilitySet) {
        if let Some(previous) = self.tags.insert(tag.to_string(), capabilities) {
            tracing::info!(
                "[TagSchema::register] Overwriting capabilities of '{}': {:?} -> {:?}",
                tag,
                previous,
                capabilities
            );
        }
    }

    pub fn set_display_name(&mut self, tag: &str, name: &str) {
        self.display_names
            .insert(tag.to_string(), name.to_string());
    }

    pub fn capabilities(&self, tag: &str) -> CapabilitySet {
        self.tags.get(tag).copied().unwrap_or_default()
    }

    pub fn is_division(&self, tag: &str) -> bool {
        self.capabilities(tag).contains(Capability::Division)
    }

    pub fn is_numbered_block(&self, tag: &str) -> bool {
        self.capabilities(tag).contains(Capability::NumberedBlock)
    }

    pub fn is_refable(&self, tag: &str) -> bool {
        self.capabilities(tag).contains(Capability::Refable)
    }

    /// Divisions are always in the ToC.
    pub fn is_toc_eligible(&self, tag: &str) -> bool {
        !self
            .capabilities(tag)
            .is_disjoint(Capability::Division | Capability::TocEligible)
    }

    pub fn is_list(&self, tag: &str) -> bool {
        self.capabilities(tag).contains(Capability::List)
    }

    pub fn is_list_item(&self, tag: &str) -> bool {
        self.capabilities(tag).contains(Capability::ListItem)
    }

    /// Nodes of this tag need an identifier even without an explicit `id`.
    pub fn needs_id(&self, tag: &str) -> bool {
        self.is_refable(tag) || self.is_toc_eligible(tag)
    }

    /// Human-readable name for a tag: the configured name, else the tag title-cased.
    pub fn display_name(&self, tag: &str) -> String {
        if let Some(name) = self.display_names.get(tag) {
            return name.clone();
        }
        titlecase::titlecase(&tag.replace(['_', '-'], " "))
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, CapabilitySet)> {
        self.tags.iter().map(|(tag, caps)| (tag.as_str(), *caps))
    }
}
