//! List-item labels.
//!
//! A list may fix its label style with a `label` attribute (`1`, `a`, `A`, `i`, `I`, `*`, or a
//! [`LabelKind`] name). Lists without one take their style from a cycle of defaults, advancing
//! one step per unlabeled list between the item and the nearest labeled (or outermost) list, so
//! nested lists stay visually distinct.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::AnnotateError,
    parents::ParentIndex,
    schema::TagSchema,
    tree::{Document, NodeId},
};

/// Attribute on a list node overriding its label style.
pub const LABEL_ATTR: &str = "label";

pub const DEFAULT_LABEL_CYCLE: [LabelKind; 4] = [
    LabelKind::Decimal,
    LabelKind::LowerAlpha,
    LabelKind::LowerRoman,
    LabelKind::Bullet,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    Bullet,
}

impl FromStr for LabelKind {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "decimal" => Ok(LabelKind::Decimal),
            "a" | "lower_alpha" => Ok(LabelKind::LowerAlpha),
            "A" | "upper_alpha" => Ok(LabelKind::UpperAlpha),
            "i" | "lower_roman" => Ok(LabelKind::LowerRoman),
            "I" | "upper_roman" => Ok(LabelKind::UpperRoman),
            "*" | "-" | "bullet" | "disc" => Ok(LabelKind::Bullet),
            other => Err(AnnotateError::Config(format!(
                "unknown list label style '{other}'"
            ))),
        }
    }
}

impl LabelKind {
    /// Marker text for the `ordinal`-th (1-based) item.
    pub fn marker(self, ordinal: usize) -> String {
        match self {
            LabelKind::Decimal => format!("{ordinal}."),
            LabelKind::LowerAlpha => format!("{}.", to_alpha(ordinal)),
            LabelKind::UpperAlpha => format!("{}.", to_alpha(ordinal).to_uppercase()),
            LabelKind::LowerRoman => format!("{}.", to_roman(ordinal)),
            LabelKind::UpperRoman => format!("{}.", to_roman(ordinal).to_uppercase()),
            LabelKind::Bullet => "\u{2022}".to_string(),
        }
    }
}

/// Bijective base-26: 1 -> a, 26 -> z, 27 -> aa.
fn to_alpha(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn to_roman(mut n: usize) -> String {
    const NUMERALS: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelInfo {
    pub kind: LabelKind,
    /// List nesting depth of the item's own list, outermost = 1.
    pub depth: usize,
    /// 1-based position among sibling list items.
    pub ordinal: usize,
    pub marker: String,
}

pub struct ListLabeler<'a> {
    doc: &'a Document,
    schema: &'a TagSchema,
    parents: &'a ParentIndex,
    cycle: &'a [LabelKind],
}

impl<'a> ListLabeler<'a> {
    pub fn new(
        doc: &'a Document,
        schema: &'a TagSchema,
        parents: &'a ParentIndex,
        cycle: &'a [LabelKind],
    ) -> Self {
        let cycle = if cycle.is_empty() {
            &DEFAULT_LABEL_CYCLE[..]
        } else {
            cycle
        };
        ListLabeler {
            doc,
            schema,
            parents,
            cycle,
        }
    }

    /// Label of a list item, or `None` if `item` is not a list item inside a list.
    pub fn label_of(&self, item: NodeId) -> Option<LabelInfo> {
        let tag = self.doc.tag(item)?;
        if !self.schema.is_list_item(tag) {
            return None;
        }
        let lists: Vec<NodeId> = self
            .parents
            .ancestors(item)
            .filter(|ancestor| {
                self.doc
                    .tag(*ancestor)
                    .is_some_and(|tag| self.schema.is_list(tag))
            })
            .collect();
        if lists.is_empty() {
            return None;
        }

        let mut unlabeled = 0;
        let mut kind = None;
        for (nearness, list) in lists.iter().enumerate() {
            if let Some(explicit) = self.explicit_kind(*list) {
                kind = Some(if nearness == 0 {
                    explicit
                } else {
                    self.continue_cycle(explicit, unlabeled)
                });
                break;
            }
            unlabeled += 1;
        }
        let kind = kind.unwrap_or_else(|| self.cycle[(unlabeled - 1) % self.cycle.len()]);
        let ordinal = self.ordinal_of(item);

        Some(LabelInfo {
            kind,
            depth: lists.len(),
            ordinal,
            marker: kind.marker(ordinal),
        })
    }

    fn explicit_kind(&self, list: NodeId) -> Option<LabelKind> {
        let raw = self.doc.attr(list, LABEL_ATTR)?;
        match raw.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::warn!("[ListLabeler] ignoring label on list {list}: {e}");
                None
            }
        }
    }

    /// Style `steps` unlabeled levels inside a list labeled `from`.
    fn continue_cycle(&self, from: LabelKind, steps: usize) -> LabelKind {
        match self.cycle.iter().position(|kind| *kind == from) {
            Some(pos) => self.cycle[(pos + steps) % self.cycle.len()],
            None => self.cycle[(steps - 1) % self.cycle.len()],
        }
    }

    fn ordinal_of(&self, item: NodeId) -> usize {
        let Some(parent) = self.parents.parent_of(item) else {
            return 1;
        };
        self.doc
            .children(parent)
            .iter()
            .copied()
            .filter(|sibling| {
                self.doc
                    .tag(*sibling)
                    .is_some_and(|tag| self.schema.is_list_item(tag))
            })
            .position(|sibling| sibling == item)
            .map_or(1, |pos| pos + 1)
    }
}
