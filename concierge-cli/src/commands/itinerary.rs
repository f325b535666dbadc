//! Itinerary command - stream a personalised itinerary to the terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use concierge::dashboard::ItineraryView;
use concierge::generation::{GenerationState, PartialTrip, Trip};
use concierge::task_slot::Generation;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the itinerary command.
pub struct ItineraryArgs {
    pub profile: Option<PathBuf>,
    pub feed: Option<PathBuf>,
    /// Replay a saved itinerary document instead of calling the model.
    pub script: Option<PathBuf>,
}

enum Outcome {
    Completed(Arc<Trip>),
    Failed(CliError),
    Cancelled,
}

/// Run the itinerary command. Ctrl-C stops generation.
pub async fn run(runner: &CliRunner, args: ItineraryArgs) -> Result<(), CliError> {
    let model = runner.model(args.script.as_deref())?;
    let dashboard = runner.dashboard(model)?;

    let profile = runner.profile(args.profile.as_deref());
    let feed = runner.feed(args.feed.as_deref());
    if let Some(profile) = &profile {
        println!("Planning for {} ({})", profile.name, profile.tier);
    }

    dashboard.prewarm().await;
    let generation = dashboard.start_itinerary(profile.as_ref(), feed.as_ref());
    let spinner = spinner();
    let mut state = dashboard.subscribe();

    let outcome = loop {
        let view = state.borrow_and_update().itinerary.clone();
        if let Some(outcome) = observe(&view, generation, &spinner) {
            break outcome;
        }
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break Outcome::Cancelled;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                dashboard.stop_itinerary();
                break Outcome::Cancelled;
            }
        }
    };
    spinner.finish_and_clear();

    match outcome {
        Outcome::Completed(trip) => {
            print_trip(&trip);
            Ok(())
        }
        Outcome::Failed(e) => Err(e),
        Outcome::Cancelled => {
            info!(generation = %generation, "Itinerary stopped by user");
            println!("Stopped.");
            Ok(())
        }
    }
}

/// Update progress for `view`; returns the outcome once the run is over.
fn observe(view: &ItineraryView, generation: Generation, spinner: &ProgressBar) -> Option<Outcome> {
    if view.generation != generation {
        return None;
    }
    match &view.state {
        GenerationState::Idle | GenerationState::Generating => {
            spinner.set_message("Waiting for the concierge...");
        }
        GenerationState::Streaming { snapshots } => {
            if let Some(snapshot) = &view.snapshot {
                spinner.set_message(progress(snapshot, *snapshots));
            }
        }
        GenerationState::Completed => {
            return view.trip.clone().map(Outcome::Completed);
        }
        GenerationState::Failed(e) => {
            return Some(Outcome::Failed(CliError::Generation(e.clone())));
        }
        GenerationState::Cancelled => return Some(Outcome::Cancelled),
    }
    None
}

fn progress(snapshot: &PartialTrip, snapshots: usize) -> String {
    let activities: usize = snapshot
        .days
        .iter()
        .flat_map(|day| &day.sections)
        .map(|section| section.activities.len())
        .sum();
    format!(
        "Drafting {}: {} day(s), {} activities ({} updates)",
        snapshot.destination.as_deref().unwrap_or("itinerary"),
        snapshot.days.len(),
        activities,
        snapshots
    )
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_trip(trip: &Trip) {
    println!("{}", trip.destination);
    println!("{} to {}", trip.start_label, trip.end_label);
    if let Some(name) = &trip.traveler_name {
        println!("Prepared for {}", name);
    }
    if let Some(notes) = &trip.notes {
        println!("{}", notes);
    }

    for day in &trip.days {
        println!();
        match &day.summary {
            Some(summary) => println!("{} - {}", day.day_label, summary),
            None => println!("{}", day.day_label),
        }
        for section in &day.sections {
            println!("  {}", section.title);
            if let Some(description) = &section.description {
                println!("    {}", description);
            }
            for activity in &section.activities {
                let time = activity.time_label.as_deref().unwrap_or("");
                match &activity.location_name {
                    Some(location) => {
                        println!("    {:>6}  {} @ {}", time, activity.name, location)
                    }
                    None => println!("    {:>6}  {}", time, activity.name),
                }
                if let Some(notes) = &activity.notes {
                    println!("            {}", notes);
                }
            }
        }
    }
}
