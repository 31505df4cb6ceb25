// ABOUTME: Splits the source table list into full and structure-only sets
// ABOUTME: Preserves source order and keeps the two sets disjoint

use std::collections::BTreeSet;

/// Tables whose schema is migrated without their rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableClassification {
    structure_only: BTreeSet<String>,
}

impl TableClassification {
    pub fn new(structure_only: BTreeSet<String>) -> Self {
        Self { structure_only }
    }

    pub fn is_structure_only(&self, table: &str) -> bool {
        self.structure_only.contains(table)
    }

    pub fn is_empty(&self) -> bool {
        self.structure_only.is_empty()
    }

    pub fn len(&self) -> usize {
        self.structure_only.len()
    }

    /// Partition the source tables.
    ///
    /// Both halves keep the order of `universe`. Configured names that the
    /// source does not have are logged and dropped.
    pub fn partition(&self, universe: &[String]) -> TablePartition {
        let (structure_only, full): (Vec<String>, Vec<String>) = universe
            .iter()
            .cloned()
            .partition(|table| self.is_structure_only(table));

        let unknown = self.unknown_tables(universe);
        if !unknown.is_empty() {
            tracing::warn!(
                "Ignoring structure_only table(s) not present in source: {}",
                unknown.join(", ")
            );
        }

        TablePartition {
            full,
            structure_only,
        }
    }

    /// Configured structure-only names absent from `universe`, sorted
    pub fn unknown_tables(&self, universe: &[String]) -> Vec<String> {
        let present: BTreeSet<&str> = universe.iter().map(String::as_str).collect();
        self.structure_only
            .iter()
            .filter(|table| !present.contains(table.as_str()))
            .cloned()
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TableClassification {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Result of classifying the source tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePartition {
    pub full: Vec<String>,
    pub structure_only: Vec<String>,
}
