use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A DynamoDB item: attribute name to typed value.
pub type Item = HashMap<String, AttributeValue>;

/// Name of the demo table.
pub const WIDGETS_TABLE: &str = "Widgets";

/// Partition key attribute of the demo table.
pub const WIDGET_KEY_ATTRIBUTE: &str = "WidgetId";

/// Key of the single record the demo writes and reads back.
pub const FIXED_WIDGET_ID: &str = "123";

/// Description stored on the fixed record.
pub const FIXED_WIDGET_DESCRIPTION: &str = "This is a widget.";

// ---------------------------------------------------------------------------
// TableName
// ---------------------------------------------------------------------------

const MIN_TABLE_NAME_LENGTH: usize = 3;
const MAX_TABLE_NAME_LENGTH: usize = 255;

/// A validated DynamoDB table name: 3-255 characters from `[A-Za-z0-9_.-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Create a new `TableName` after validation.
    pub fn new(s: impl Into<String>) -> Result<Self, TableNameError> {
        let s = s.into();

        if s.len() < MIN_TABLE_NAME_LENGTH {
            return Err(TableNameError::TooShort(s.len()));
        }

        if s.len() > MAX_TABLE_NAME_LENGTH {
            return Err(TableNameError::TooLong(s.len()));
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(TableNameError::InvalidCharacters);
        }

        Ok(Self(s))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when validating a table name.
#[derive(Debug, Clone, Error)]
pub enum TableNameError {
    #[error("table name length {0} is below the minimum of {MIN_TABLE_NAME_LENGTH}")]
    TooShort(usize),

    #[error("table name length {0} exceeds maximum of {MAX_TABLE_NAME_LENGTH}")]
    TooLong(usize),

    #[error("table name must contain only letters, digits, '_', '-' and '.'")]
    InvalidCharacters,
}

// ---------------------------------------------------------------------------
// TableSpec
// ---------------------------------------------------------------------------

/// Scalar type of the partition key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAttributeType {
    String,
    Number,
    Binary,
}

/// Provisioned read/write capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedCapacity {
    pub read_capacity_units: NonZeroU32,
    pub write_capacity_units: NonZeroU32,
}

impl ProvisionedCapacity {
    /// One read and one write capacity unit.
    pub const MINIMAL: Self = Self {
        read_capacity_units: NonZeroU32::MIN,
        write_capacity_units: NonZeroU32::MIN,
    };
}

/// Everything needed to create a table with a single partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: TableName,
    pub key_attribute: String,
    pub key_type: KeyAttributeType,
    pub capacity: ProvisionedCapacity,
}

impl TableSpec {
    /// The `Widgets` table: string `WidgetId` partition key, 1/1 capacity.
    pub fn widgets() -> Result<Self, TableNameError> {
        Ok(Self {
            name: TableName::new(WIDGETS_TABLE)?,
            key_attribute: WIDGET_KEY_ATTRIBUTE.to_string(),
            key_type: KeyAttributeType::String,
            capacity: ProvisionedCapacity::MINIMAL,
        })
    }

    /// Build the key of an item whose partition key is a string.
    pub fn string_key(&self, value: impl Into<String>) -> Item {
        HashMap::from([(self.key_attribute.clone(), AttributeValue::S(value.into()))])
    }
}

// ---------------------------------------------------------------------------
// TableDescription
// ---------------------------------------------------------------------------

/// Lifecycle status reported by the service for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    /// Any status not modelled above (archiving, inaccessible keys, ...).
    Other(String),
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Creating => f.write_str("CREATING"),
            TableStatus::Active => f.write_str("ACTIVE"),
            TableStatus::Updating => f.write_str("UPDATING"),
            TableStatus::Deleting => f.write_str("DELETING"),
            TableStatus::Other(code) => f.write_str(code),
        }
    }
}

/// A snapshot of table metadata. Fetched fresh on every describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub name: String,
    pub status: Option<TableStatus>,
}

impl TableDescription {
    /// Whether the table can serve reads and writes.
    pub fn is_active(&self) -> bool {
        self.status == Some(TableStatus::Active)
    }
}

/// Result of a create call. An existing table is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(TableDescription),
    AlreadyExists,
}

/// Result of a describe call. A missing table is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribeOutcome {
    Found(TableDescription),
    NotFound,
}

impl From<DescribeOutcome> for Option<TableDescription> {
    fn from(outcome: DescribeOutcome) -> Self {
        match outcome {
            DescribeOutcome::Found(description) => Some(description),
            DescribeOutcome::NotFound => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// The record stored in the `Widgets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Widget {
    /// Partition key, stored as `WidgetId`.
    pub widget_id: String,

    /// Free text, stored as `Description`.
    pub description: String,
}

impl Widget {
    /// The single record the demo writes.
    pub fn fixed() -> Self {
        Self {
            widget_id: FIXED_WIDGET_ID.to_string(),
            description: FIXED_WIDGET_DESCRIPTION.to_string(),
        }
    }
}
