use clap::Subcommand;
use uuid::Uuid;

use crate::cli::commands::{fmt_dt, PortalContext};
use crate::cli::OutputFormat;
use crate::remote::models::OutputStage;
use crate::views::outputs::{NewOutput, OutputService};

#[derive(Subcommand)]
pub enum OutputCommands {
    #[command(about = "Show your cohort's output board (Draft / Review / Final)")]
    Board,

    #[command(about = "Submit a new output")]
    Submit {
        #[arg(long, help = "Title of the output")]
        title: String,
        #[arg(long, help = "Module to attach the output to")]
        module: Option<Uuid>,
        #[arg(long, help = "Free-form note, link or request")]
        content: Option<String>,
    },

    #[command(about = "Ask for a review (Draft → Review)")]
    Review {
        #[arg(help = "Output id")]
        id: Uuid,
    },

    #[command(about = "Send back for revision (Review → Draft)")]
    Revise {
        #[arg(help = "Output id")]
        id: Uuid,
    },

    #[command(about = "Approve as final (Review → Final)")]
    Finalize {
        #[arg(help = "Output id")]
        id: Uuid,
    },
}

pub async fn handle(ctx: &PortalContext, cmd: OutputCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = ctx.require_route("/output")?;
    let profile = ctx.require_profile(&snapshot)?;
    let service = OutputService::new(ctx.data_api());

    match cmd {
        OutputCommands::Board => {
            let board = service.board(&profile).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&board)?),
                OutputFormat::Text => {
                    for stage in [OutputStage::Draft, OutputStage::Review, OutputStage::Final] {
                        let column = board.column(stage);
                        println!("== {} ({})", stage.label(), column.len());
                        for output in column {
                            println!(
                                "  {}  {:<32} {} · {}",
                                output.id,
                                output.title,
                                output.review_status.as_str(),
                                fmt_dt(&output.updated_at)
                            );
                        }
                    }
                }
            }
            Ok(())
        }

        OutputCommands::Submit { title, module, content } => {
            let created = service
                .submit(&profile, NewOutput { title, module_id: module, content })
                .await?;
            println!("Submitted '{}' ({})", created.title, created.id);
            Ok(())
        }

        OutputCommands::Review { id } => {
            service.request_review(id).await?;
            println!("Output {} moved to review.", id);
            Ok(())
        }

        OutputCommands::Revise { id } => {
            service.needs_revision(id).await?;
            println!("Output {} sent back for revision.", id);
            Ok(())
        }

        OutputCommands::Finalize { id } => {
            service.approve(id).await?;
            println!("Output {} approved as final.", id);
            Ok(())
        }
    }
}
