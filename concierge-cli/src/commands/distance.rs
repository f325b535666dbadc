//! Distance command - resolve distances from the guest for named places.

use concierge::generation::SAMPLE_PLACES;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the distance command.
///
/// With no names, the first recommendations of the configured feed are used.
pub async fn run(runner: &CliRunner, names: Vec<String>) -> Result<(), CliError> {
    let names = if names.is_empty() {
        feed_names(runner)?
    } else {
        names
    };

    let dashboard = runner.dashboard_without_model()?;
    dashboard.resolve_distances(&names).await;

    let state = dashboard.state();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    for name in &names {
        println!("  {:<width$}  {}", name, state.distance_text(name), width = width);
    }
    Ok(())
}

fn feed_names(runner: &CliRunner) -> Result<Vec<String>, CliError> {
    let feed = runner.feed(None).ok_or_else(|| {
        CliError::Config(
            "no place names given and no recommendation feed configured ([data] feed_path)"
                .to_string(),
        )
    })?;
    Ok(feed
        .sample(SAMPLE_PLACES)
        .into_iter()
        .map(|item| item.name.clone())
        .collect())
}
