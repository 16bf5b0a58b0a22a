use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::commands::PortalContext;
use crate::cli::OutputFormat;
use crate::views::learning::LearningService;

#[derive(Subcommand)]
pub enum LearnCommands {
    #[command(about = "List your cohort's modules with progress")]
    List,

    #[command(about = "Continue a module (defaults to the next one up)")]
    Continue {
        #[arg(help = "Module id (defaults to the in-progress or next module)")]
        module_id: Option<Uuid>,
    },
}

pub async fn handle(ctx: &PortalContext, cmd: LearnCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = ctx.require_route("/lms")?;
    let profile = ctx.require_profile(&snapshot)?;
    let service = LearningService::new(ctx.data_api());

    match cmd {
        LearnCommands::List => {
            let items = service.modules_with_progress(&profile).await?;
            let stats = LearningService::stats(&items);

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "modules": items, "stats": stats }))?
                ),
                OutputFormat::Text => {
                    if items.is_empty() {
                        println!("No modules found for cohort {}.", profile.cohort_code.as_deref().unwrap_or("?"));
                        return Ok(());
                    }
                    for item in &items {
                        println!(
                            "{}  {:<40} {:<12} {:>3.0}%",
                            item.module.id,
                            item.module.title,
                            item.enrollment.status.label(),
                            item.enrollment.progress
                        );
                    }
                    println!(
                        "\n{} modules · {} completed · {} in progress · {} not started · avg {:.0}%",
                        stats.total,
                        stats.completed,
                        stats.in_progress,
                        stats.not_started,
                        stats.avg_progress * 100.0
                    );
                    if let Some(next) = LearningService::now_playing(&items) {
                        println!("Up next: {}", next.module.title);
                    }
                }
            }
            Ok(())
        }

        LearnCommands::Continue { module_id } => {
            let items = service.modules_with_progress(&profile).await?;
            let target = match module_id {
                Some(id) => items
                    .iter()
                    .find(|i| i.module.id == id)
                    .ok_or_else(|| anyhow::anyhow!("module {} is not in your cohort", id))?,
                None => LearningService::now_playing(&items)
                    .ok_or_else(|| anyhow::anyhow!("no modules available to continue"))?,
            };

            service.continue_module(profile.id, target).await?;
            println!("Continuing '{}' - marked in progress.", target.module.title);
            Ok(())
        }
    }
}
