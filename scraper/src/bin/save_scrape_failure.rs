use anyhow::{Context, Result};
use mlb_scraper::pitching::{commented_tables, parse_pitching_tables};
use mlb_scraper::{parse_box_score, Config, Fetcher};
use scraper::{Html, Selector};
use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get URL from command line arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Please provide a box score URL");
        eprintln!("Usage: cargo run --bin save_scrape_failure <URL>");
        std::process::exit(1);
    }

    let url = &args[1];

    println!("Fetching HTML from {}...", url);
    let mut fetcher = Fetcher::new(&Config::default())?;
    let html = fetcher.get(url).context("Failed to fetch page")?;

    // Name the fixture after the game id so the regression test can rebuild the URL
    let test_name = url
        .rsplit('/')
        .next()
        .and_then(|file| file.split('.').next())
        .filter(|stem| !stem.is_empty())
        .context("URL has no box score file name")?;

    let failures_dir = Path::new("src/tests/fixtures/failures");
    fs::create_dir_all(failures_dir).context("Failed to create failures directory")?;

    let file_path = failures_dir.join(format!("{}.html", test_name));
    fs::write(&file_path, &html).context("Failed to write HTML file")?;

    println!(
        "Saved HTML to {} for regression testing",
        file_path.display()
    );

    println!("\nAttempting to parse with the scraper to confirm failure:");

    let document = Html::parse_document(&html);
    let scorebox_selector = Selector::parse("div.scorebox").unwrap();
    let has_scorebox = document.select(&scorebox_selector).next().is_some();

    let score_selector = Selector::parse("div.scorebox div.score").unwrap();
    let score_count = document.select(&score_selector).count();

    let commented = commented_tables(&html);
    let pitching_tables = parse_pitching_tables(&html).map(|t| t.len());

    println!("HTML analysis results:");
    println!("  - Has scorebox: {}", has_scorebox);
    println!("  - Scores found: {}", score_count);
    println!("  - Commented tables: {}", commented.len());
    match &pitching_tables {
        Ok(n) => println!("  - Pitching tables: {}", n),
        Err(e) => println!("  - Pitching tables: {}", e),
    }

    match parse_box_score(&html, url) {
        Ok(game) => {
            println!(
                "Parse succeeded ({} @ {}). This may not be a failure case.",
                game.away_team, game.home_team
            );
        }
        Err(e) => {
            println!("Parse failed with error: {}", e);

            if e.is_structural() {
                println!("   Missing required HTML elements - structural issue");
            } else {
                println!("   Has all required elements - likely a content parsing issue");
            }

            println!("\nThis test case has been saved and will be included in regression tests.");
        }
    }

    Ok(())
}
