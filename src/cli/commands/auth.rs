use clap::Subcommand;
use serde_json::json;

use crate::auth::token;
use crate::cli::commands::{fmt_dt, PortalContext};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email (falls back to DEMO_EMAIL)")]
        email: Option<String>,
        #[arg(long, help = "Password (falls back to DEMO_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and clear the persisted session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show the signed-in user and profile")]
    Whoami,

    #[command(about = "Create a new account")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (falls back to DEMO_PASSWORD)")]
        password: Option<String>,
    },
}

pub async fn handle(ctx: &PortalContext, cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let email = email
                .or_else(|| std::env::var("DEMO_EMAIL").ok())
                .ok_or_else(|| anyhow::anyhow!("no email given and DEMO_EMAIL is not set"))?;
            let password = password
                .or_else(|| std::env::var("DEMO_PASSWORD").ok())
                .ok_or_else(|| anyhow::anyhow!("no password given and DEMO_PASSWORD is not set"))?;

            let outcome = ctx.store.sign_in_with_password(email.trim(), &password).await;
            if !outcome.ok {
                anyhow::bail!("sign-in failed: {}", outcome.message.unwrap_or_default());
            }
            ctx.store.recheck().await;
            ctx.sync_access_token().await;

            let snapshot = ctx.store.snapshot();
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "signed_in": snapshot.user.is_some(),
                        "user": snapshot.user,
                        "profile": snapshot.profile,
                    }))?
                ),
                OutputFormat::Text => {
                    let who = snapshot.user.and_then(|u| u.email).unwrap_or_else(|| email.clone());
                    println!("Signed in as {}", who);
                    match snapshot.profile {
                        Some(profile) => println!(
                            "Role: {} · Cohort: {}",
                            profile.role,
                            profile.cohort_code.as_deref().unwrap_or("(unset)")
                        ),
                        None => println!("No profile provisioned yet (treated as learner)"),
                    }
                }
            }
            Ok(())
        }

        AuthCommands::Logout => {
            ctx.store.sign_out().await;
            ctx.store.recheck().await;
            ctx.sync_access_token().await;
            println!("Signed out.");
            Ok(())
        }

        AuthCommands::Status => {
            let snapshot = ctx.store.snapshot();
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "signed_in": snapshot.session.is_some(),
                        "expires_at": snapshot.session.as_ref().map(|s| s.expires_at),
                        "user": snapshot.user,
                        "profile": snapshot.profile,
                    }))?
                ),
                OutputFormat::Text => match snapshot.session {
                    Some(session) => {
                        println!("Signed in; session expires {}", fmt_dt(&session.expires_at));
                        if let Some(role) = token::decode_claims(&session.access_token).and_then(|c| c.role) {
                            println!("Token role: {}", role);
                        }
                    }
                    None => println!("Not signed in."),
                },
            }
            Ok(())
        }

        AuthCommands::Whoami => {
            let snapshot = ctx.store.snapshot();
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "user": snapshot.user,
                        "profile": snapshot.profile,
                        "effective_role": snapshot.effective_role(),
                    }))?
                ),
                OutputFormat::Text => match &snapshot.user {
                    Some(user) => {
                        println!("User:  {} ({})", user.email.as_deref().unwrap_or("-"), user.id);
                        match &snapshot.profile {
                            Some(profile) => println!(
                                "Role:  {} · Cohort: {} · Name: {}",
                                profile.role,
                                profile.cohort_code.as_deref().unwrap_or("(unset)"),
                                profile.display_name()
                            ),
                            None => println!("Role:  learner (profile not provisioned)"),
                        }
                    }
                    None => println!("Not signed in."),
                },
            }
            Ok(())
        }

        AuthCommands::Register { email, password } => {
            let password = password
                .or_else(|| std::env::var("DEMO_PASSWORD").ok())
                .ok_or_else(|| anyhow::anyhow!("no password given and DEMO_PASSWORD is not set"))?;

            let outcome = ctx.store.sign_up_with_password(email.trim(), &password).await;
            if !outcome.ok {
                anyhow::bail!("sign-up failed: {}", outcome.message.unwrap_or_default());
            }
            ctx.store.recheck().await;
            ctx.sync_access_token().await;

            if ctx.store.snapshot().session.is_some() {
                println!("Account created and signed in.");
            } else {
                println!("Account created. Check your email to confirm, then sign in.");
            }
            Ok(())
        }
    }
}
