use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use uuid::Uuid;

use crate::cli::commands::{fmt_dt, PortalContext};
use crate::cli::OutputFormat;
use crate::views::mentoring::{MentoringService, NewSlot};
use crate::views::outputs::OutputService;

#[derive(Subcommand)]
pub enum CoachCommands {
    #[command(about = "Show the review queue with author and reviewer names")]
    Queue,

    #[command(about = "Claim an output for review")]
    Claim {
        #[arg(help = "Output id")]
        id: Uuid,
    },

    #[command(about = "Publish a mentoring slot")]
    OpenSlot {
        #[arg(long, help = "Start time, RFC 3339 (e.g. 2026-09-01T10:00:00Z)")]
        start: String,
        #[arg(long, help = "End time, RFC 3339")]
        end: String,
        #[arg(long, help = "Physical location")]
        location: Option<String>,
        #[arg(long, help = "Meeting URL for online sessions")]
        meeting_url: Option<String>,
        #[arg(long, default_value_t = 1, help = "Seats in the slot")]
        capacity: i32,
    },
}

fn parse_rfc3339(value: &str, which: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("{} is not an RFC 3339 timestamp: {}", which, value))
}

pub async fn handle(ctx: &PortalContext, cmd: CoachCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = ctx.require_route("/coach")?;
    let profile = ctx.require_profile(&snapshot)?;

    match cmd {
        CoachCommands::Queue => {
            let queue = OutputService::new(ctx.data_api()).review_queue().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&queue)?),
                OutputFormat::Text => {
                    if queue.is_empty() {
                        println!("Review queue is empty.");
                        return Ok(());
                    }
                    for entry in &queue {
                        println!(
                            "{}  {:<32} {:<16} by {} · reviewer {} · {}",
                            entry.output.id,
                            entry.output.title,
                            entry.output.review_status.as_str(),
                            entry.author_name.as_deref().unwrap_or("-"),
                            entry.reviewer_name.as_deref().unwrap_or("-"),
                            fmt_dt(&entry.output.updated_at)
                        );
                    }
                }
            }
            Ok(())
        }

        CoachCommands::Claim { id } => {
            OutputService::new(ctx.data_api()).claim_for_review(profile.id, id).await?;
            println!("Output {} claimed for review.", id);
            Ok(())
        }

        CoachCommands::OpenSlot { start, end, location, meeting_url, capacity } => {
            let slot = NewSlot {
                start_at: parse_rfc3339(&start, "--start")?,
                end_at: parse_rfc3339(&end, "--end")?,
                location,
                meeting_url,
                capacity,
            };
            let created = MentoringService::new(ctx.data_api()).create_slot(profile.id, slot).await?;
            println!(
                "Slot {} published: {} ~ {}",
                created.id,
                fmt_dt(&created.start_at),
                fmt_dt(&created.end_at)
            );
            Ok(())
        }
    }
}
