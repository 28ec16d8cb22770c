//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A small lecture-notes document in the nested JSON form.
///
/// Two chapters, one with a section; a titled definition, an untitled theorem, two levels of
/// list and three references, one of which points nowhere.
#[allow(dead_code)]
pub const NOTES_JSON: &str = r#"{
  "tag": "notes",
  "children": [
    {"tag": "p", "children": [{"text": "Preface"}]},
    {
      "tag": "chapter",
      "attrs": {"id": "groups"},
      "children": [
        {"tag": "title", "children": [{"text": "Groups"}]},
        {
          "tag": "definition",
          "attrs": {"id": "def-group"},
          "children": [{"tag": "title", "children": [{"text": "Group"}]}]
        },
        {"tag": "theorem", "attrs": {"id": "lagrange"}},
        {
          "tag": "section",
          "children": [
            {"tag": "title", "children": [{"text": "Cosets and  Index"}]},
            {
              "tag": "ol",
              "children": [
                {
                  "tag": "li",
                  "children": [
                    {"text": "left"},
                    {"tag": "ol", "children": [{"tag": "li"}, {"tag": "li"}]}
                  ]
                },
                {"tag": "li"}
              ]
            }
          ]
        }
      ]
    },
    {
      "tag": "chapter",
      "children": [
        {"tag": "title", "children": [{"text": "Rings"}]},
        {"tag": "lemma"},
        {"tag": "xref", "attrs": {"ref": "lagrange"}},
        {"tag": "xref", "attrs": {"ref": "groups"}},
        {"tag": "xref", "attrs": {"ref": "fields"}}
      ]
    }
  ]
}"#;

/// Write `content` into `<temp_dir>/<name>` and return the path.
#[allow(dead_code)]
pub fn write_fixture(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}
