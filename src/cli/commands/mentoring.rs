use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::commands::{fmt_dt, PortalContext};
use crate::cli::OutputFormat;
use crate::views::mentoring::MentoringService;

#[derive(Subcommand)]
pub enum MentoringCommands {
    #[command(about = "List upcoming slots, marking the ones you booked")]
    Slots,

    #[command(about = "List your bookings")]
    My,

    #[command(about = "Book a slot")]
    Book {
        #[arg(help = "Slot id")]
        slot_id: Uuid,
        #[arg(long, help = "What feedback are you looking for?")]
        note: Option<String>,
    },

    #[command(about = "Cancel a booking")]
    Cancel {
        #[arg(help = "Booking id")]
        booking_id: Uuid,
    },
}

pub async fn handle(ctx: &PortalContext, cmd: MentoringCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = ctx.require_route("/mentoring")?;
    let profile = ctx.require_profile(&snapshot)?;
    let service = MentoringService::new(ctx.data_api());

    match cmd {
        MentoringCommands::Slots => {
            let (slots, bookings) = service.overview(profile.id).await?;
            let mine = MentoringService::active_by_slot(&bookings);

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "slots": slots, "bookings": bookings }))?
                ),
                OutputFormat::Text => {
                    if slots.is_empty() {
                        println!("No upcoming slots. (A coach has to publish one first.)");
                        return Ok(());
                    }
                    for slot in &slots {
                        let place = slot
                            .location
                            .as_deref()
                            .or(slot.meeting_url.as_deref())
                            .unwrap_or("TBD");
                        let marker = match mine.get(&slot.id) {
                            Some(booking) => format!("my booking: {}", booking.status.as_str()),
                            None => "available".to_string(),
                        };
                        println!(
                            "{}  {} ~ {}  {:<24} [{}]",
                            slot.id,
                            fmt_dt(&slot.start_at),
                            fmt_dt(&slot.end_at),
                            place,
                            marker
                        );
                    }
                }
            }
            Ok(())
        }

        MentoringCommands::My => {
            let bookings = service.my_bookings(profile.id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bookings)?),
                OutputFormat::Text => {
                    if bookings.is_empty() {
                        println!("No bookings yet.");
                        return Ok(());
                    }
                    for entry in &bookings {
                        let when = entry
                            .slot
                            .as_ref()
                            .map(|s| fmt_dt(&s.start_at))
                            .unwrap_or_else(|| entry.booking.slot_id.to_string());
                        println!(
                            "{}  {}  {}{}",
                            entry.booking.id,
                            when,
                            entry.booking.status.as_str(),
                            entry.booking.note.as_deref().map(|n| format!(" · {}", n)).unwrap_or_default()
                        );
                    }
                }
            }
            Ok(())
        }

        MentoringCommands::Book { slot_id, note } => {
            let booking = service.book(profile.id, slot_id, note).await?;
            println!("Booked slot {} (booking {}).", slot_id, booking.id);
            Ok(())
        }

        MentoringCommands::Cancel { booking_id } => {
            service.cancel(booking_id).await?;
            println!("Booking {} cancelled.", booking_id);
            Ok(())
        }
    }
}
