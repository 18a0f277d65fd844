use tracing::{info, warn};

use crate::db::TableBackend;
use crate::error::CoreError;
use crate::model::{CreateOutcome, FIXED_WIDGET_ID, Item, TableDescription, TableSpec, Widget};
use crate::wait::WaitPolicy;

/// Drives the demo against a [`TableBackend`]:
///
/// 1. Create the table, or describe it if it already exists
/// 2. Poll its status until it is ACTIVE, within the [`WaitPolicy`] budget
/// 3. Write the fixed widget record
/// 4. Read the record back and report its description
///
/// Every call is awaited before the next one starts. Nothing is written
/// before an ACTIVE status has been observed.
pub struct Provisioner<B> {
    backend: B,
    spec: TableSpec,
    policy: WaitPolicy,
}

impl<B: TableBackend> Provisioner<B> {
    pub fn new(backend: B, spec: TableSpec, policy: WaitPolicy) -> Self {
        Self {
            backend,
            spec,
            policy,
        }
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// Create the table, falling back to describing it when it already
    /// exists.
    ///
    /// A table that conflicts on create but is then missing on describe
    /// (deleted in between) is reported as [`CoreError::TableVanished`].
    pub async fn ensure_table(&self) -> Result<TableDescription, CoreError> {
        let table = &self.spec.name;
        info!(%table, "sending request to build table");

        match self.backend.create_table(&self.spec).await? {
            CreateOutcome::Created(description) => {
                info!(%table, status = ?description.status, "table created");
                Ok(description)
            }
            CreateOutcome::AlreadyExists => {
                info!(%table, "table already exists, fetching description");
                self.describe_table()
                    .await?
                    .ok_or_else(|| CoreError::TableVanished(table.to_string()))
            }
        }
    }

    /// Fetch the current table metadata. `None` when the table does not exist.
    pub async fn describe_table(&self) -> Result<Option<TableDescription>, CoreError> {
        Ok(self.backend.describe_table(&self.spec.name).await?.into())
    }

    /// Poll until the table reports ACTIVE, starting from `initial`.
    ///
    /// Returns immediately, without a status check, when `initial` is
    /// already ACTIVE. Fails with [`CoreError::NotActive`] once the policy's
    /// attempts are used up.
    pub async fn wait_until_active(
        &self,
        initial: Option<TableDescription>,
    ) -> Result<TableDescription, CoreError> {
        let table = &self.spec.name;
        let mut current = initial;
        let mut attempts = 0;

        loop {
            match current {
                Some(description) if description.is_active() => {
                    info!(%table, attempts, "table status: ACTIVE");
                    return Ok(description);
                }
                pending => {
                    let status = pending
                        .as_ref()
                        .and_then(|d| d.status.as_ref())
                        .map_or_else(|| "<none>".to_string(), ToString::to_string);

                    if attempts >= self.policy.max_attempts {
                        warn!(%table, %status, attempts, "table did not become active");
                        return Err(CoreError::NotActive {
                            table: table.to_string(),
                            attempts,
                        });
                    }

                    attempts += 1;
                    let delay = self.policy.delay_for(attempts);
                    info!(
                        %table,
                        %status,
                        attempt = attempts,
                        ?delay,
                        "table not ready yet, sleeping"
                    );
                    tokio::time::sleep(delay).await;

                    current = self.describe_table().await?;
                }
            }
        }
    }

    /// Unconditionally write the fixed widget, replacing any existing one.
    pub async fn write_fixed_item(&self) -> Result<(), CoreError> {
        let widget = Widget::fixed();
        info!(table = %self.spec.name, widget_id = %widget.widget_id, "about to save item");

        let item: Item = serde_dynamo::to_item(&widget)?;
        self.backend.put_item(&self.spec.name, item).await
    }

    /// Read the fixed widget's attributes. Empty when no item has its key.
    pub async fn read_fixed_item(&self) -> Result<Item, CoreError> {
        info!(table = %self.spec.name, widget_id = FIXED_WIDGET_ID, "about to fetch item");

        let key = self.spec.string_key(FIXED_WIDGET_ID);
        Ok(self
            .backend
            .get_item(&self.spec.name, key)
            .await?
            .unwrap_or_default())
    }

    /// Run the whole demo and return the widget that was read back.
    ///
    /// An item missing its `Description` fails to decode and surfaces as
    /// [`CoreError::Serde`].
    pub async fn run(&self) -> Result<Widget, CoreError> {
        let description = self.ensure_table().await?;
        self.wait_until_active(Some(description)).await?;
        self.write_fixed_item().await?;

        let item = self.read_fixed_item().await?;
        let widget: Widget = serde_dynamo::from_item(item)?;
        info!(description = %widget.description, "item loaded");
        Ok(widget)
    }
}
