// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Class-label table.
//!
//! Maps class indices to human-readable names, loaded once from a
//! newline-delimited file (one label per line, index = line order).

use std::path::Path;

use crate::warn;

/// Ordered class index → name table, immutable after construction.
///
/// The table may be shorter than the number of classes the network can emit;
/// indices beyond its length have no name and render as confidence-only
/// labels.
#[derive(Debug, Clone, Default)]
pub struct ClassLabels {
    names: Vec<String>,
}

impl ClassLabels {
    /// Load labels from a newline-delimited file.
    ///
    /// A missing or empty file yields an empty table — detections are still
    /// produced, they just render without names. This is deliberately not an
    /// error.
    #[must_use]
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self {
                names: content.lines().map(str::to_string).collect(),
            },
            Err(_) => {
                warn!(
                    "Class file not found: {}. Detections will be unnamed.",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Build a table from an in-memory list of names.
    #[must_use]
    pub fn from_vec(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Get the name for a class index, if the table covers it.
    #[must_use]
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Number of labels in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the label names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
