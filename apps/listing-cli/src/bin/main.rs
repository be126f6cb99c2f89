use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use listing_catalog::InMemoryCatalog;
use listing_core::config::{resolve_with_base, Config, SearchSettings};
use listing_core::traits::Navigator;
use listing_core::types::{Listing, MinRating, PriceRange, Season};
use listing_query::{DisplayWindow, FacetEdit};
use listing_session::{SearchSession, SessionDriver, View};
use tracing_subscriber::EnvFilter;

const KEYSTROKE_GAP: Duration = Duration::from_millis(80);
const DEFAULT_LOG_FILTER: &str = "info";

struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, encoded_filters: &str) { println!("→ /search?{}", encoded_filters); }
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} query <catalog> \"<text>\" [--category NAME] [--village NAME] [--price LO-HI] [--season S] [--rating N] [--all]", prog);
    eprintln!("       {} trending <catalog>", prog);
    std::process::exit(1)
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.len() < 2 { usage(&prog); }
    let cmd = args.remove(0);
    (cmd, args)
}

/// Facet edits from `--flag value` pairs, plus whether `--all` was given.
fn parse_facets(flags: &[String]) -> anyhow::Result<(Vec<FacetEdit>, bool)> {
    let mut edits = Vec::new();
    let mut show_all = false;
    let mut it = flags.iter();
    while let Some(flag) = it.next() {
        if flag == "--all" { show_all = true; continue; }
        let value = it.next().ok_or_else(|| anyhow::anyhow!("missing value for {}", flag))?;
        let edit = match flag.as_str() {
            "--category" => FacetEdit::Category(Some(value.clone())),
            "--village" => FacetEdit::Village(Some(value.clone())),
            "--price" => FacetEdit::Price(value.parse::<PriceRange>()?),
            "--season" => FacetEdit::Season(value.parse::<Season>()?),
            "--rating" => FacetEdit::MinRating(MinRating::try_from(value.parse::<u8>()?)?),
            other => anyhow::bail!("unknown flag {}", other),
        };
        edits.push(edit);
    }
    Ok((edits, show_all))
}

fn print_listing(marker: &str, l: &Listing) {
    let badge = if l.verified { " ✓" } else { "" };
    println!("  {} {:<28} {:<5} {}{}", marker, l.name, l.price_tier.glyphs(), l.season, badge);
}

async fn run_query(settings: &SearchSettings, driver: &SessionDriver, text: &str, flags: &[String]) -> anyhow::Result<()> {
    let (edits, show_all) = parse_facets(flags)?;
    let mut session = SearchSession::new(settings);
    let effects = session.focus();
    driver.dispatch(&mut session, effects).await;

    // Replay the text one keystroke at a time so the debouncer sees a burst.
    let start = Instant::now();
    let mut now = start;
    for (i, _) in text.char_indices().skip(1).chain(std::iter::once((text.len(), ' '))) {
        let effects = session.tick(now);
        driver.dispatch(&mut session, effects).await;
        let effects = session.edit(FacetEdit::Text(text[..i].to_string()), now);
        driver.dispatch(&mut session, effects).await;
        now += KEYSTROKE_GAP;
    }
    for edit in edits {
        let effects = session.edit(edit, now);
        driver.dispatch(&mut session, effects).await;
    }
    if let Some(deadline) = session.next_deadline() {
        let effects = session.tick(deadline);
        driver.dispatch(&mut session, effects).await;
    }

    let View::Results(result) = session.view() else {
        println!("Nothing to search for; try `trending`.");
        return Ok(());
    };
    if let Some(err) = &result.error_message {
        println!("⚠️  {}", err);
        return Ok(());
    }
    println!("🔎 '{}' → {} match(es)", session.settled_text(), result.total_count);
    let (promoted, organic) = DisplayWindow::from(settings.display).visible(&result, show_all);
    for l in promoted { print_listing("★", l); }
    for l in organic { print_listing("•", l); }
    if !result.suggestions.is_empty() {
        println!("Did you mean: {}", result.suggestions.join(", "));
    }
    let effects = session.submit();
    driver.dispatch(&mut session, effects).await;
    Ok(())
}

async fn run_trending(driver: &SessionDriver, settings: &SearchSettings) -> anyhow::Result<()> {
    let mut session = SearchSession::new(settings);
    let effects = session.focus();
    driver.dispatch(&mut session, effects).await;
    let View::Trending(view) = session.view() else { anyhow::bail!("session did not enter browsing") };
    println!("📈 Trending: {}", view.terms.join(" · "));
    for l in &view.listings { print_listing("★", l); }
    let categories: Vec<&str> = view.categories.iter().map(|c| c.name.as_str()).collect();
    let villages: Vec<&str> = view.villages.iter().map(|v| v.name.as_str()).collect();
    println!("Categories: {}", categories.join(", "));
    println!("Villages:   {}", villages.join(", "));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    tracing::debug!(?settings, "search settings loaded");
    let (cmd, args) = parse_args();
    let catalog_path = resolve_with_base(&env::current_dir()?, &args[0]);
    let catalog = InMemoryCatalog::open(&catalog_path)?;
    let driver = SessionDriver::new(Arc::new(catalog), Arc::new(StdoutNavigator), &settings);

    let rt = tokio::runtime::Runtime::new()?;
    match cmd.as_str() {
        "query" => {
            let text = args.get(1).cloned().unwrap_or_default();
            rt.block_on(run_query(&settings, &driver, &text, args.get(2..).unwrap_or_default()))?;
        }
        "trending" => rt.block_on(run_trending(&driver, &settings))?,
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}
