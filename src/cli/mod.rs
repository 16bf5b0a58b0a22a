pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "isls")]
#[command(about = "ISLS Portal CLI - learner/coach/admin client for the hosted portal backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Learning modules and progress")]
    Learn {
        #[command(subcommand)]
        cmd: commands::learn::LearnCommands,
    },

    #[command(about = "Outputs and the review pipeline")]
    Output {
        #[command(subcommand)]
        cmd: commands::output::OutputCommands,
    },

    #[command(about = "Mentoring slots and bookings")]
    Mentoring {
        #[command(subcommand)]
        cmd: commands::mentoring::MentoringCommands,
    },

    #[command(about = "Coach tools: review queue and slot publishing")]
    Coach {
        #[command(subcommand)]
        cmd: commands::coach::CoachCommands,
    },

    #[command(about = "Alumni directory and introductions")]
    Alumni {
        #[command(subcommand)]
        cmd: commands::alumni::AlumniCommands,
    },

    #[command(about = "Admin console: overview and user management")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let ctx = commands::PortalContext::bootstrap().await?;
    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(&ctx, cmd, output_format).await,
        Commands::Learn { cmd } => commands::learn::handle(&ctx, cmd, output_format).await,
        Commands::Output { cmd } => commands::output::handle(&ctx, cmd, output_format).await,
        Commands::Mentoring { cmd } => commands::mentoring::handle(&ctx, cmd, output_format).await,
        Commands::Coach { cmd } => commands::coach::handle(&ctx, cmd, output_format).await,
        Commands::Alumni { cmd } => commands::alumni::handle(&ctx, cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(&ctx, cmd, output_format).await,
    };
    ctx.store.shutdown();
    result
}
