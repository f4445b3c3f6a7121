//! Solution export parsing
//!
//! Parses the exported data.json into records with their direct references.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Record identifier (the `id` field of the export)
pub type RecordId = i64;

/// A parsed solution export (ordered list of records)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Export {
    /// Records in export order
    pub records: Vec<Record>,
}

impl Export {
    /// Load export from file
    pub fn from_file(path: &Path) -> Result<Self, ExportError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ExportError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_str(&contents)
    }

    /// Parse export from JSON string
    pub fn from_str(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json)
            .map_err(|e| ExportError::ParseError(e.to_string()))
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the export holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by id (first match)
    pub fn get_record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl From<Vec<Record>> for Export {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

/// One entry of the export (folder, measure sheet, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable uuid of the entity
    #[serde(default)]
    pub uuid: Option<String>,

    /// Identifier, unique within the export
    pub id: RecordId,

    /// Id of the folder grouping this record
    #[serde(deserialize_with = "null_as_default")]
    pub parent_id: RecordId,

    /// Display name (e.g., "12.3 Revenue")
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Type tag (e.g., "MeasureSheet")
    #[serde(deserialize_with = "null_as_default")]
    pub type_name: String,

    /// Folders only structure the export
    #[serde(deserialize_with = "null_as_default")]
    pub is_folder: bool,

    /// References declared by this record, in export order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub direct_references: Vec<Reference>,

    /// Position within the parent folder
    #[serde(rename = "SORT_ORDER", default)]
    pub sort_order: Option<i64>,
}

impl Record {
    /// Create a record with no references
    pub fn new(id: RecordId, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            uuid: None,
            id,
            parent_id: 0,
            name: name.into(),
            type_name: type_name.into(),
            is_folder: false,
            direct_references: Vec::new(),
            sort_order: None,
        }
    }

    /// Create a folder record
    pub fn folder(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            is_folder: true,
            ..Self::new(id, name, "Folder")
        }
    }

    /// Set the parent folder
    pub fn with_parent(mut self, parent_id: RecordId) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Append a reference
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.direct_references.push(reference);
        self
    }

    /// Ids of all referenced records, in declaration order
    pub fn referenced_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.direct_references.iter().map(|r| r.id)
    }
}

/// A declared link from one record to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Target record id
    pub id: RecordId,

    /// Type tag of the target
    pub type_name: String,

    /// Relation kinds (opaque to the graph)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependency_type: Vec<i64>,
}

impl Reference {
    /// Create a reference with no relation kinds
    pub fn new(id: RecordId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            dependency_type: Vec::new(),
        }
    }
}

// Exports write `null` for unset values; the field must still be present
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Exports serialize empty lists as `null`
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Export parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to read export file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse export JSON: {0}")]
    ParseError(String),
}
