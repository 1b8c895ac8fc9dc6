use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{repository, Database};

#[derive(Subcommand)]
pub enum OperatorCommands {
    #[command(about = "List HR operators")]
    List,

    #[command(about = "Create an HR operator")]
    Add {
        #[arg(long, help = "Login name")]
        username: String,

        #[arg(long, help = "Display name")]
        name: String,

        #[arg(long, help = "Region the operator manages")]
        region: i32,

        #[arg(long, help = "Country of the operator")]
        country: Option<i32>,

        #[arg(long, help = "Initial password (defaults to EMS_OPERATOR_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Reset an operator's password")]
    Passwd {
        #[arg(help = "Login name")]
        username: String,

        #[arg(long, help = "New password (defaults to EMS_OPERATOR_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Allow an operator to log in")]
    Activate {
        #[arg(help = "Login name")]
        username: String,
    },

    #[command(about = "Block an operator from logging in")]
    Deactivate {
        #[arg(help = "Login name")]
        username: String,
    },
}

pub async fn handle(cmd: OperatorCommands, db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = db.pool();

    match cmd {
        OperatorCommands::List => {
            let operators = repository::list_operators(pool).await?;

            if operators.is_empty() {
                return output_empty_collection(&output_format, "operators", "No operators configured");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "operators": operators }))?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<20} {:<25} {:<8} {:<8} {}", "ID", "USERNAME", "NAME", "REGION", "COUNTRY", "ACTIVE");
                    println!("{}", "-".repeat(80));

                    for op in &operators {
                        let country = op.country_id.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<6} {:<20} {:<25} {:<8} {:<8} {}",
                            op.hr_id, op.username, op.hr_name, op.region_id, country, op.is_active
                        );
                    }
                }
            }
            Ok(())
        }
        OperatorCommands::Add {
            username,
            name,
            region,
            country,
            password,
        } => {
            let password = resolve_password(password)?;
            let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

            let operator = repository::insert_operator(pool, &username, &name, &hash, region, country)
                .await
                .with_context(|| format!("Failed to create operator '{username}'"))?;

            output_success(
                &output_format,
                &format!("Created operator '{}' (id {})", operator.username, operator.hr_id),
                Some(json!(operator)),
            )
        }
        OperatorCommands::Passwd { username, password } => {
            let password = resolve_password(password)?;
            let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

            if !repository::update_operator_password(pool, &username, &hash).await? {
                bail!("No operator named '{username}'");
            }
            output_success(&output_format, &format!("Password updated for '{username}'"), None)
        }
        OperatorCommands::Activate { username } => set_active(db, &username, true, &output_format).await,
        OperatorCommands::Deactivate { username } => set_active(db, &username, false, &output_format).await,
    }
}

async fn set_active(db: &Database, username: &str, is_active: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    if !repository::set_operator_active(db.pool(), username, is_active).await? {
        bail!("No operator named '{username}'");
    }

    let state = if is_active { "activated" } else { "deactivated" };
    output_success(output_format, &format!("Operator '{username}' {state}"), None)
}
