//! Schema descriptor
//!
//! A model declares its table mapping once, declaratively, through
//! [`TableMetadata`]. `TableDescriptor::from_metadata` validates that
//! mapping at DAO construction and produces the immutable, ordered view the
//! clause compiler works against: partition-key columns first, clustering
//! columns after, each sorted by declared ordinal.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TesseraError};

/// Role of a column within the table's key structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Part of the partition key, at the given ordinal
    PartitionKey(u32),
    /// Part of the clustering key, at the given ordinal
    ClusteringColumn(u32),
    /// A regular payload column
    Regular,
}

/// Declared mapping for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// Quote the identifier verbatim instead of lower-casing it
    pub case_sensitive: bool,
    pub role: ColumnRole,
}

impl ColumnSpec {
    /// Declare a partition-key column at the given ordinal
    pub fn partition_key(name: impl Into<String>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            case_sensitive: false,
            role: ColumnRole::PartitionKey(ordinal),
        }
    }

    /// Declare a clustering column at the given ordinal
    pub fn clustering_column(name: impl Into<String>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            case_sensitive: false,
            role: ColumnRole::ClusteringColumn(ordinal),
        }
    }

    /// Declare a regular payload column
    pub fn regular(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            case_sensitive: false,
            role: ColumnRole::Regular,
        }
    }

    /// Mark the identifier case-sensitive (quoted verbatim)
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

/// Declared table mapping for a model type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub keyspace: String,
    pub case_sensitive_keyspace: bool,
    pub table: String,
    pub case_sensitive_table: bool,
    /// All columns, in declared order
    pub columns: Vec<ColumnSpec>,
}

impl TableMetadata {
    /// Start a metadata declaration for `keyspace.table`
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            case_sensitive_keyspace: false,
            table: table.into(),
            case_sensitive_table: false,
            columns: Vec::new(),
        }
    }

    /// Quote the keyspace identifier verbatim
    pub fn case_sensitive_keyspace(mut self) -> Self {
        self.case_sensitive_keyspace = true;
        self
    }

    /// Quote the table identifier verbatim
    pub fn case_sensitive_table(mut self) -> Self {
        self.case_sensitive_table = true;
        self
    }

    /// Append a column declaration
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }
}

/// Render an identifier per store convention: quoted verbatim when
/// case-sensitive, lower-cased otherwise.
fn render_identifier(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        format!("\"{}\"", name)
    } else {
        name.to_lowercase()
    }
}

/// Immutable, validated view of a model's table mapping
///
/// Built once at DAO construction and owned exclusively by the DAO instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    keyspace: String,
    table: String,
    partition_key: Vec<String>,
    clustering_key: Vec<String>,
    primary_key: Vec<String>,
    columns: Vec<String>,
}

impl TableDescriptor {
    /// Validate declared metadata and build the descriptor
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the table or keyspace name is missing, no
    /// partition-key column is declared, or key ordinals are duplicated.
    pub fn from_metadata(metadata: &TableMetadata) -> Result<Self> {
        if metadata.keyspace.is_empty() || metadata.table.is_empty() {
            return Err(TesseraError::configuration(
                "model has no table metadata: keyspace and table are required",
            ));
        }

        let mut partition: Vec<(u32, String)> = Vec::new();
        let mut clustering: Vec<(u32, String)> = Vec::new();
        let mut columns: Vec<String> = Vec::new();

        for spec in &metadata.columns {
            let rendered = render_identifier(&spec.name, spec.case_sensitive);
            match spec.role {
                ColumnRole::PartitionKey(ordinal) => partition.push((ordinal, rendered.clone())),
                ColumnRole::ClusteringColumn(ordinal) => {
                    clustering.push((ordinal, rendered.clone()))
                }
                ColumnRole::Regular => {}
            }
            columns.push(rendered);
        }

        if partition.is_empty() {
            return Err(TesseraError::configuration(format!(
                "table {} declares no partition-key column",
                metadata.table
            )));
        }

        let partition_key = sorted_by_ordinal(partition, "partition", &metadata.table)?;
        let clustering_key = sorted_by_ordinal(clustering, "clustering", &metadata.table)?;

        let mut primary_key = partition_key.clone();
        primary_key.extend(clustering_key.iter().cloned());

        Ok(Self {
            keyspace: render_identifier(&metadata.keyspace, metadata.case_sensitive_keyspace),
            table: render_identifier(&metadata.table, metadata.case_sensitive_table),
            partition_key,
            clustering_key,
            primary_key,
            columns,
        })
    }

    /// Rendered keyspace identifier
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Rendered table identifier
    pub fn table(&self) -> &str {
        &self.table
    }

    /// `keyspace.table`, as it appears in query text
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.table)
    }

    /// Partition-key columns, in ordinal order
    pub fn partition_key(&self) -> &[String] {
        &self.partition_key
    }

    /// Clustering columns, in ordinal order
    pub fn clustering_key(&self) -> &[String] {
        &self.clustering_key
    }

    /// Partition-key columns followed by clustering columns
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// All columns, in declared order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

fn sorted_by_ordinal(
    mut pairs: Vec<(u32, String)>,
    kind: &str,
    table: &str,
) -> Result<Vec<String>> {
    pairs.sort_by_key(|(ordinal, _)| *ordinal);

    for window in pairs.windows(2) {
        if window[0].0 == window[1].0 {
            return Err(TesseraError::configuration(format!(
                "table {} declares duplicate {} ordinal {} on columns '{}' and '{}'",
                table, kind, window[0].0, window[0].1, window[1].1
            )));
        }
    }

    Ok(pairs.into_iter().map(|(_, name)| name).collect())
}
