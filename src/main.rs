use anyhow::{bail, Context};
use gleaner::{
    catalog::CatalogSource,
    config::GleanerConfig,
    extract::ContentExtractor,
    fetch::Fetcher,
    filter,
    harvest::Harvester,
    output,
    types::CurationGroup,
};
use std::path::Path;
use std::time::Instant;
use tracing::{error, warn};

/// The main entry point of the application.
///
/// This function initializes logging, loads the configuration, reads the
/// curation groups, discovers the item set from the listing URL, harvests
/// every item once, applies each curation group to the harvested corpus,
/// and writes the combined report.
///
/// Usage: `gleaner <listing-url-or-query> [curations-file] [output-file]`
///
/// The curations file holds one group per line in the form
/// `Name | keyword1, keyword2`; blank lines and `#` comments are ignored.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = GleanerConfig::load().context("failed to load configuration")?;

    let listing_url = std::env::args().nth(1).unwrap_or_default();

    let curations_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "curations.txt".to_string());

    let output_path = std::env::args()
        .nth(3)
        .unwrap_or_else(|| "all_curations.txt".to_string());

    let groups = load_groups(&curations_path)?;
    if groups.is_empty() {
        bail!("no usable curation lines in {curations_path}");
    }

    let start_time = Instant::now();

    let fetcher = Fetcher::new(&config)?;

    // Discover the item set
    let catalog = CatalogSource::new(fetcher.clone(), config.clone());
    let search_text = catalog.search_text(&listing_url);
    let items = catalog.list_items(&search_text).await;

    if items.is_empty() {
        error!("no items discovered for: {}", listing_url);
        return Ok(());
    }
    let discovered = items.len();

    // Harvest the corpus once
    let harvester = Harvester::new(fetcher, ContentExtractor::default(), config.clone());
    let corpus = harvester.harvest(items).await;

    if corpus.is_empty() {
        error!("no items harvested; nothing to curate");
        return Ok(());
    }

    // Apply every curation group to the same corpus
    let outcomes = filter::apply_groups(&corpus, &groups);
    output::write_report(Path::new(&output_path), &outcomes)?;

    let elapsed = start_time.elapsed();

    println!("\n=== Run Summary ===");
    println!("Items discovered: {}", discovered);
    println!(
        "Items harvested:  {} ({} dropped)",
        corpus.len(),
        discovered - corpus.len()
    );
    println!("Processing time:  {:.2?}", elapsed);
    println!("\nCurations:");
    for outcome in &outcomes {
        println!("  {:<30} {:>5} items", outcome.name, outcome.matched.len());
    }
    println!("\nSaved to {output_path}");

    Ok(())
}

/// Reads the curation groups from a file of `Name | kw1, kw2` lines.
///
/// Malformed lines and duplicate group names are skipped with a warning
/// rather than failing the run.
fn load_groups(path: &str) -> anyhow::Result<Vec<CurationGroup>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read curations from {path}"))?;

    let mut groups: Vec<CurationGroup> = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match CurationGroup::parse(line) {
            Some(group) => {
                if groups.iter().any(|existing| existing.name == group.name) {
                    warn!("duplicate curation name '{}', keeping the first", group.name);
                    continue;
                }
                groups.push(group);
            }
            None => warn!("skipping malformed curation line: {}", line),
        }
    }

    Ok(groups)
}
