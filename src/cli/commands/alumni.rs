use clap::Subcommand;
use uuid::Uuid;

use crate::cli::commands::PortalContext;
use crate::cli::OutputFormat;
use crate::views::alumni::AlumniService;

#[derive(Subcommand)]
pub enum AlumniCommands {
    #[command(about = "Browse the alumni directory")]
    List {
        #[arg(long, help = "Filter by name, organization, region, headline or tag")]
        query: Option<String>,
    },

    #[command(about = "List your introduction requests")]
    Requests,

    #[command(about = "Request an introduction to an alumni entry")]
    Request {
        #[arg(help = "Alumni entry id")]
        alumni_id: Uuid,
        #[arg(long, help = "Why do you want the introduction?")]
        reason: Option<String>,
    },
}

pub async fn handle(ctx: &PortalContext, cmd: AlumniCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = ctx.require_route("/alumni")?;
    let profile = ctx.require_profile(&snapshot)?;
    let service = AlumniService::new(ctx.data_api());

    match cmd {
        AlumniCommands::List { query } => {
            let entries = service.directory().await?;
            let filtered = AlumniService::search(&entries, query.as_deref().unwrap_or(""));

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&filtered)?),
                OutputFormat::Text => {
                    if filtered.is_empty() {
                        println!("No matching alumni.");
                        return Ok(());
                    }
                    for entry in filtered {
                        let tags = entry
                            .expertise_tags
                            .as_deref()
                            .map(|t| t.join(", "))
                            .unwrap_or_default();
                        println!(
                            "{}  {:<24} {:<8} {:<20} {}",
                            entry.id,
                            entry.full_name,
                            entry.cohort_code,
                            entry.organization.as_deref().unwrap_or("-"),
                            tags
                        );
                    }
                }
            }
            Ok(())
        }

        AlumniCommands::Requests => {
            let requests = service.link_requests(profile.id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&requests)?),
                OutputFormat::Text => {
                    if requests.is_empty() {
                        println!("No introduction requests yet.");
                        return Ok(());
                    }
                    for link in &requests {
                        println!(
                            "{}  → {}  {:?}{}",
                            link.id,
                            link.target_alumni_id,
                            link.status,
                            link.reason.as_deref().map(|r| format!(" · {}", r)).unwrap_or_default()
                        );
                    }
                }
            }
            Ok(())
        }

        AlumniCommands::Request { alumni_id, reason } => {
            let link = service.request_intro(profile.id, alumni_id, reason).await?;
            println!("Introduction requested ({}).", link.id);
            Ok(())
        }
    }
}
