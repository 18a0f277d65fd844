use thiserror::Error;

/// Core errors for the widgets demo.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("DynamoDB error: {0}")]
    Dynamo(#[from] aws_sdk_dynamodb::Error),

    #[error("DynamoDB request build error: {0}")]
    Build(#[from] aws_sdk_dynamodb::error::BuildError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_dynamo::Error),

    #[error("Table name validation error: {0}")]
    TableName(#[from] crate::model::TableNameError),

    #[error("table {table} not active after {attempts} status checks")]
    NotActive { table: String, attempts: u32 },

    #[error("table {0} already exists but could not be described")]
    TableVanished(String),
}
