use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::commands::{fmt_dt, PortalContext};
use crate::cli::OutputFormat;
use crate::types::Role;
use crate::views::admin::AdminService;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Show operating metrics")]
    Overview,

    #[command(about = "List the most recent profiles")]
    Users,

    #[command(about = "Change a user's role")]
    SetRole {
        #[arg(help = "Profile id")]
        id: Uuid,
        #[arg(help = "New role: learner, coach or admin")]
        role: Role,
    },

    #[command(about = "Assign or clear a user's cohort")]
    SetCohort {
        #[arg(help = "Profile id")]
        id: Uuid,
        #[arg(help = "Cohort code (omit to clear)")]
        cohort: Option<String>,
    },

    #[command(about = "Set a user's display name")]
    SetName {
        #[arg(help = "Profile id")]
        id: Uuid,
        #[arg(help = "Full name")]
        name: String,
    },
}

pub async fn handle(ctx: &PortalContext, cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.require_route("/admin")?;
    let service = AdminService::new(ctx.data_api());

    match cmd {
        AdminCommands::Overview => {
            let overview = service.overview().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&overview)?),
                OutputFormat::Text => {
                    println!("Users:    {}", overview.users);
                    println!("Modules:  {}", overview.modules);
                    println!("Outputs:  {}", overview.outputs);
                    println!("Bookings: {}", overview.bookings);
                }
            }
            Ok(())
        }

        AdminCommands::Users => {
            let profiles = service.recent_profiles().await?;
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "profiles": profiles, "count": profiles.len() }))?
                ),
                OutputFormat::Text => {
                    for profile in &profiles {
                        let created = profile.created_at.as_ref().map(fmt_dt).unwrap_or_default();
                        println!(
                            "{}  {:<24} {:<8} {:<10} {}",
                            profile.id,
                            profile.display_name(),
                            profile.role,
                            profile.cohort_code.as_deref().unwrap_or("-"),
                            created
                        );
                    }
                }
            }
            Ok(())
        }

        AdminCommands::SetRole { id, role } => {
            service.set_role(id, role).await?;
            println!("Profile {} is now {}.", id, role);
            Ok(())
        }

        AdminCommands::SetCohort { id, cohort } => {
            let label = cohort.clone().unwrap_or_else(|| "(cleared)".to_string());
            service.set_cohort(id, cohort).await?;
            println!("Profile {} cohort set to {}.", id, label);
            Ok(())
        }

        AdminCommands::SetName { id, name } => {
            service.set_full_name(id, name.clone()).await?;
            println!("Profile {} renamed to {}.", id, name);
            Ok(())
        }
    }
}
