use connectors::{error::WarehouseError, warehouse::Warehouse};
use model::sql::SqlCommand;
use std::sync::Arc;
use tracing::{debug, info};

/// Submits rendered commands to the warehouse, sequentially and in order.
/// In dry-run mode every statement is logged but nothing reaches the
/// warehouse.
pub struct StatementRunner {
    warehouse: Arc<dyn Warehouse>,
    execute: bool,
}

impl StatementRunner {
    pub fn new(warehouse: Arc<dyn Warehouse>, execute: bool) -> Self {
        StatementRunner { warehouse, execute }
    }

    pub async fn submit(&self, command: &SqlCommand) -> Result<(), WarehouseError> {
        if !self.execute {
            debug!(sql = %command.text, "Dry run, statement not submitted");
            return Ok(());
        }

        info!(sql = %command.text, "Submitting statement");
        let output = self.warehouse.execute(&command.text, &command.binds).await?;
        for (key, value) in output.affected_counts() {
            info!("{key}: {value}");
        }
        Ok(())
    }
}
