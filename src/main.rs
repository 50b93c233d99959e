mod models;
mod scrapers;
mod search;
mod store;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};

use models::JobListing;
use scrapers::{BrighterMondayScraper, ChromeDriver, JobScraper, ScrapeConfig};
use search::SearchQuery;

const SEARCH_MENU: &str = "
Brighter Monday Jobs Search
----------------------------------------------------------------------------------------
Search Menu

Search scraped jobs by:
[1] Job Title
[2] Location
[3] Company
[4] Date posted ['1 day ago', '2 weeks ago', '1 hour' and so on]
[5] I feel lucky [search by all four criteria]
[6] Exit
";

const DATE_USAGE: &str =
    "Please enter the date posted as [1 day ago, 2 weeks ago, 2 hours, and so on]";

#[derive(Parser, Debug)]
#[command(
    name = "jobs-scout",
    version,
    about = "Scrapes BrighterMonday job listings and searches saved results"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape job listings and save them to a timestamped JSON file
    Scrape {
        /// Number of result pages to scrape
        #[arg(short, long, default_value_t = 5)]
        pages: usize,
        /// Delay between result pages, milliseconds
        #[arg(long, default_value_t = 1_000)]
        delay_ms: u64,
        /// Skip visiting each listing's own page for summary/description
        #[arg(long)]
        no_details: bool,
        /// Directory the output file is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Search a previously saved job listings file
    Search {
        /// JSON file produced by a scrape run
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scrape {
            pages,
            delay_ms,
            no_details,
            out_dir,
        } => run_scrape(pages, delay_ms, no_details, out_dir).await,
        Command::Search { file } => run_search(file).await,
    }
}

async fn run_scrape(pages: usize, delay_ms: u64, no_details: bool, out_dir: PathBuf) -> Result<()> {
    info!("💼 Jobs Scout - BrighterMonday Scraper");
    info!("======================================");
    info!("Beginning scraping operation...");
    info!("Scraping {} pages...", pages);

    let cfg = ScrapeConfig {
        max_pages: pages,
        page_delay_ms: delay_ms,
        fetch_details: !no_details,
        ..ScrapeConfig::default()
    };
    let driver = ChromeDriver::new(Duration::from_millis(cfg.settle_ms))?;
    let mut scraper = BrighterMondayScraper::new(driver, cfg);

    let outcome = scraper.scrape().await;

    if outcome.had_error {
        warn!("Scraping completed but with some errors. Jobs saved so far are still available.");
    } else {
        info!("Scraping completed successfully.");
    }
    info!("Scraped job listings = {} jobs", outcome.jobs.len());

    let path = store::save_jobs(&out_dir, &outcome.jobs).await?;
    info!("💾 Saved {} listings to {}", outcome.jobs.len(), path.display());

    offer_printout(&outcome.jobs)?;
    Ok(())
}

/// Optionally dump the first N scraped records to the terminal.
fn offer_printout(jobs: &[JobListing]) -> Result<()> {
    let answer = prompt("Print jobs to screen? [Y]es or [N]o: ")?.to_lowercase();
    if ["y", "yes", "yeah"].contains(&answer.as_str()) {
        let raw = prompt(&format!(
            "Enter number of jobs to print (Total Jobs = {}): ",
            jobs.len()
        ))?;
        match raw.parse::<usize>() {
            Ok(count) => {
                for job in jobs.iter().take(count) {
                    print_job(job);
                }
                println!("-----------------------------------------");
                println!("Done.");
            }
            Err(_) => println!("Wrong input. Exiting."),
        }
    } else if ["n", "no", "nope"].contains(&answer.as_str()) {
        println!("Ok. Bye.");
    } else {
        println!("Wrong input. Exiting.");
    }
    Ok(())
}

async fn run_search(file: PathBuf) -> Result<()> {
    let jobs = store::load_jobs(&file).await?;

    println!("{SEARCH_MENU}");
    println!("Job listings file: {}", file.display());
    println!("Total jobs in file: {}", jobs.len());
    println!();

    match prompt("Option: ")?.as_str() {
        "1" => {
            let title = prompt("Enter job title: ")?;
            report_matches(&jobs, &SearchQuery::Title(title), false);
        }
        "2" => {
            let location = prompt("Enter location: ")?;
            report_matches(&jobs, &SearchQuery::Location(location), false);
        }
        "3" => {
            let company = prompt("Enter company name: ")?;
            report_matches(&jobs, &SearchQuery::Poster(company), false);
        }
        "4" => {
            let phrase = prompt("Enter date posted: ")?;
            match search::normalize_date_phrase(&phrase) {
                Some(token) => report_matches(&jobs, &SearchQuery::DatePosted(token), false),
                None => println!("{DATE_USAGE}"),
            }
        }
        "5" => {
            let title = prompt("Enter job title: ")?;
            let location = prompt("Enter location: ")?;
            let poster = prompt("Enter company name: ")?;
            let phrase = prompt("Enter date posted: ")?;
            match search::normalize_date_phrase(&phrase) {
                Some(date_token) => {
                    let query = SearchQuery::Lucky {
                        title,
                        location,
                        poster,
                        date_token,
                    };
                    report_matches(&jobs, &query, true);
                }
                None => println!("{DATE_USAGE}"),
            }
        }
        "6" => {}
        _ => println!("Wrong option."),
    }
    Ok(())
}

fn report_matches(jobs: &[JobListing], query: &SearchQuery, lucky: bool) {
    let hits = search::search(jobs, query);
    println!();
    for job in &hits {
        print_job(job);
    }
    println!("Total jobs found: {}", hits.len());
    if hits.is_empty() {
        if lucky {
            println!("No matches found. It appears you weren't so lucky.");
        } else {
            println!("No matches found. Sorry.");
        }
    }
}

fn print_job(job: &JobListing) {
    println!("{:20} : {}", "Title", job.title);
    println!("{:20} : {}", "Category", job.category);
    println!("{:20} : {}", "Location", job.location);
    println!("{:20} : {}", "Posted by", job.poster);
    println!("{:20} : {}", "Type", job.job_type);
    println!("{:20} : {}", "Salary", job.salary);
    println!("{:20} : {}", "Link", job.link);
    println!(
        "{:20} : {}",
        "Date Posted",
        search::expand_date_token(&job.date_posted)
    );
    println!("{:20} : {}", "Summary", job.summary);
    println!();
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
