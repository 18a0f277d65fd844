use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    self as sdk, AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{
    CreateOutcome, DescribeOutcome, Item, KeyAttributeType, TableDescription, TableName,
    TableSpec, TableStatus,
};

/// Region used when neither the environment nor a profile names one.
pub const FALLBACK_REGION: &str = "us-west-2";

/// The database operations the provisioning flow depends on.
///
/// Implementations must be safe to share between concurrent callers; the
/// provisioning flow itself only ever issues one call at a time.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Create a table. A same-named existing table yields `AlreadyExists`.
    async fn create_table(&self, spec: &TableSpec) -> Result<CreateOutcome, CoreError>;

    /// Describe a table. A missing table yields `NotFound`.
    async fn describe_table(&self, name: &TableName) -> Result<DescribeOutcome, CoreError>;

    /// Unconditionally write an item, replacing any item with the same key.
    async fn put_item(&self, table: &TableName, item: Item) -> Result<(), CoreError>;

    /// Read an item by key. `None` when no item has that key.
    async fn get_item(&self, table: &TableName, key: Item) -> Result<Option<Item>, CoreError>;
}

/// DynamoDB-backed implementation of [`TableBackend`].
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    /// Load AWS configuration from the environment and construct a client.
    ///
    /// The region comes from the default provider chain, falling back to
    /// [`FALLBACK_REGION`]. `endpoint_url` points the client at e.g. DynamoDB
    /// Local instead of the regional endpoint.
    pub async fn connect(endpoint_url: Option<&str>) -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(url) = endpoint_url {
            dynamo_config = dynamo_config.endpoint_url(url);
        }

        Self::from_client(Client::from_conf(dynamo_config.build()))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableBackend for DynamoStore {
    async fn create_table(&self, spec: &TableSpec) -> Result<CreateOutcome, CoreError> {
        let key_definition = AttributeDefinition::builder()
            .attribute_name(&spec.key_attribute)
            .attribute_type(scalar_type(spec.key_type))
            .build()?;
        let key_schema = KeySchemaElement::builder()
            .attribute_name(&spec.key_attribute)
            .key_type(KeyType::Hash)
            .build()?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(i64::from(spec.capacity.read_capacity_units.get()))
            .write_capacity_units(i64::from(spec.capacity.write_capacity_units.get()))
            .build()?;

        let result = self
            .client
            .create_table()
            .table_name(spec.name.as_ref())
            .attribute_definitions(key_definition)
            .key_schema(key_schema)
            .provisioned_throughput(throughput)
            .send()
            .await;

        match result {
            Ok(output) => Ok(CreateOutcome::Created(description_from_sdk(
                &spec.name,
                output.table_description(),
            ))),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(CreateTableError::is_resource_in_use_exception) =>
            {
                debug!(table = %spec.name, "create_table: resource in use");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(err) => Err(aws_sdk_dynamodb::Error::from(err).into()),
        }
    }

    async fn describe_table(&self, name: &TableName) -> Result<DescribeOutcome, CoreError> {
        let result = self
            .client
            .describe_table()
            .table_name(name.as_ref())
            .send()
            .await;

        match result {
            Ok(output) => Ok(DescribeOutcome::Found(description_from_sdk(
                name,
                output.table(),
            ))),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(DescribeTableError::is_resource_not_found_exception) =>
            {
                debug!(table = %name, "describe_table: resource not found");
                Ok(DescribeOutcome::NotFound)
            }
            Err(err) => Err(aws_sdk_dynamodb::Error::from(err).into()),
        }
    }

    async fn put_item(&self, table: &TableName, item: Item) -> Result<(), CoreError> {
        self.client
            .put_item()
            .table_name(table.as_ref())
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }

    async fn get_item(&self, table: &TableName, key: Item) -> Result<Option<Item>, CoreError> {
        let output = self
            .client
            .get_item()
            .table_name(table.as_ref())
            .set_key(Some(key))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output.item)
    }
}

fn scalar_type(key_type: KeyAttributeType) -> ScalarAttributeType {
    match key_type {
        KeyAttributeType::String => ScalarAttributeType::S,
        KeyAttributeType::Number => ScalarAttributeType::N,
        KeyAttributeType::Binary => ScalarAttributeType::B,
    }
}

/// Convert the SDK's description, keeping the requested name when the
/// response omits it.
fn description_from_sdk(
    requested: &TableName,
    description: Option<&sdk::TableDescription>,
) -> TableDescription {
    let name = description
        .and_then(|d| d.table_name())
        .unwrap_or(requested.as_ref())
        .to_string();
    let status = description
        .and_then(|d| d.table_status())
        .map(status_from_sdk);
    TableDescription { name, status }
}

fn status_from_sdk(status: &sdk::TableStatus) -> TableStatus {
    match status {
        sdk::TableStatus::Creating => TableStatus::Creating,
        sdk::TableStatus::Active => TableStatus::Active,
        sdk::TableStatus::Updating => TableStatus::Updating,
        sdk::TableStatus::Deleting => TableStatus::Deleting,
        other => TableStatus::Other(other.as_str().to_string()),
    }
}
