pub mod db;
pub mod error;
pub mod model;
pub mod provision;
pub mod wait;

pub use db::{DynamoStore, TableBackend};
pub use error::CoreError;
pub use model::{
    CreateOutcome, DescribeOutcome, Item, TableDescription, TableName, TableNameError,
    TableSpec, TableStatus, Widget,
};
pub use provision::Provisioner;
pub use wait::{Backoff, WaitPolicy};
