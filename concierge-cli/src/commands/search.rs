//! Search command - run one place search and list ranked results.

use concierge::coord::format_imperial;
use concierge::search::SearchStatus;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the search command.
pub struct SearchArgs {
    pub query: String,
    /// 1-based result to select for a ride quote.
    pub select: Option<usize>,
}

/// Run the search command.
pub async fn run(runner: &CliRunner, args: SearchArgs) -> Result<(), CliError> {
    if args.query.trim().is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }

    let dashboard = runner.dashboard_without_model()?;
    let mut state = dashboard.subscribe();

    dashboard.on_search_input(args.query.as_str());
    dashboard.on_search_submit();

    let snapshot = state
        .wait_for(|s| {
            matches!(
                s.search.status,
                SearchStatus::Ready | SearchStatus::Unavailable
            )
        })
        .await
        .map_err(|_| CliError::Config("dashboard stopped".to_string()))?
        .search
        .clone();

    if snapshot.status == SearchStatus::Unavailable {
        println!("Search is unavailable right now. Use --offline to search the built-in catalog.");
        return Ok(());
    }

    if snapshot.is_empty() {
        println!("No places found for '{}'.", snapshot.query);
        return Ok(());
    }

    println!("Places for '{}':", snapshot.query);
    for (i, result) in snapshot.results.iter().enumerate() {
        println!(
            "  [{}] {:<28} {:>8}  {}",
            i + 1,
            result.name,
            format_imperial(result.distance_from_reference),
            result.address_line
        );
    }

    if let Some(choice) = args.select {
        let quote = choice
            .checked_sub(1)
            .and_then(|index| dashboard.select_result(index))
            .ok_or_else(|| {
                CliError::Config(format!(
                    "--select must be between 1 and {}",
                    snapshot.results.len()
                ))
            })?;
        println!();
        println!("Ride to {}: {}", quote.destination, quote.price_text());
        println!("  {}", quote.bucket_label());
    }

    Ok(())
}
