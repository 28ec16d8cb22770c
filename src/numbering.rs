//! Sequence numbers for numbered blocks.
//!
//! One pre-order pass with a single running counter: entering a division resets it to zero,
//! each numbered block takes the current value and increments it. The counter is not stacked per
//! division depth, so a block after a nested division closes keeps counting from that nested
//! division's last value. Divisions never take a number here even when their tag is also marked
//! as a numbered block; the table of contents numbers them.

use serde::Serialize;
use std::collections::HashMap;

use crate::{
    error::AnnotateError,
    schema::TagSchema,
    toc::TocItem,
    tree::{Document, NodeId},
    walk::walk,
};

#[derive(Debug, Clone, Default)]
pub struct BlockNumbers {
    numbers: HashMap<NodeId, usize>,
}

impl BlockNumbers {
    pub fn build(doc: &Document, schema: &TagSchema) -> Result<BlockNumbers, AnnotateError> {
        let mut numbers = HashMap::new();
        let mut counter = 0usize;
        walk(doc, doc.root(), |node, _| {
            let Some(tag) = doc.tag(node) else {
                return;
            };
            if schema.is_division(tag) {
                counter = 0;
            } else if schema.is_numbered_block(tag) {
                numbers.insert(node, counter);
                counter += 1;
            }
        })?;
        tracing::debug!("[BlockNumbers::build] numbered {} blocks", numbers.len());
        Ok(BlockNumbers { numbers })
    }

    /// 0-based number of a numbered block.
    pub fn get(&self, node: NodeId) -> Option<usize> {
        self.numbers.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// "<division number>.<block number + 1>", or just the 1-based block number outside divisions.
pub fn block_display_number(block: usize, division: Option<&TocItem>) -> String {
    match division {
        Some(item) => format!("{}.{}", item.display_number(), block + 1),
        None => (block + 1).to_string(),
    }
}

/// What a renderer needs to caption a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockInfo {
    pub display_name: String,
    /// 0-based block number, `None` for nodes that are not numbered blocks.
    pub number: Option<usize>,
    pub display_number: Option<String>,
    pub division: TocItem,
}
