use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::{schema, DatabaseManager};

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Create the companies, jobs and users tables if missing")]
    Apply,
}

pub async fn handle(cmd: SchemaCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SchemaCommands::Apply => {
            let pool = DatabaseManager::connect(&config().database).await?;
            schema::apply(&pool).await?;
            output_success(
                output_format,
                "Schema applied",
                Some(json!({ "statements": schema::statements().count() })),
            )
        }
    }
}
