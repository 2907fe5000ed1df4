mod aggregate;
mod crawl;
mod error;
mod fetch;
mod frontier;
mod model;
mod parser;
mod resolve;
mod settings;
mod slug;
mod store;
mod turtle;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use crate::crawl::{CrawlOptions, Crawler, ScrapeStats};
use crate::fetch::HttpFetcher;
use crate::resolve::{Catalogs, ResolvedGraph};
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "ghibli_graph", about = "Ghibli fandom wiki crawler and RDF exporter")]
struct Cli {
    /// Directory holding films.json, series.json and shorts.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the wiki and write interchange files
    Crawl {
        #[arg(value_enum)]
        target: Target,
        /// Fetch each linked director page for born/nationality/description
        #[arg(long)]
        director_details: bool,
    },
    /// Resolve the interchange files into a Turtle document
    Convert {
        /// Output file (default: from settings)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show catalog counts
    Stats,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Films,
    Series,
    Shorts,
    All,
}

impl Target {
    fn films(self) -> bool {
        matches!(self, Target::Films | Target::All)
    }

    fn series(self) -> bool {
        matches!(self, Target::Series | Target::All)
    }

    fn shorts(self) -> bool {
        matches!(self, Target::Shorts | Target::All)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    let result = match cli.command {
        Commands::Crawl {
            target,
            director_details,
        } => {
            let options = CrawlOptions::from_settings(&settings, director_details)?;
            let crawler = Crawler::new(HttpFetcher::new(&settings)?, options);

            if target.films() {
                println!("Crawling films...");
                let (catalog, stats) = crawler.crawl_films().await;
                print_stats("films", &stats);
                println!(
                    "  {} characters, {} directors",
                    catalog.characters.len(),
                    catalog.directors.len()
                );
                store::save(&settings.films_path(), &catalog)?;
            }
            if target.series() {
                println!("Crawling series...");
                let (catalog, stats) = crawler.crawl_series().await;
                print_stats("series", &stats);
                println!("  {} characters", catalog.characters.len());
                store::save(&settings.series_path(), &catalog)?;
            }
            if target.shorts() {
                println!("Crawling shorts...");
                let (catalog, stats) = crawler.crawl_shorts().await;
                print_stats("shorts", &stats);
                store::save(&settings.shorts_path(), &catalog)?;
            }
            Ok(())
        }
        Commands::Convert { output } => {
            let output = output.unwrap_or_else(|| settings.output.clone());
            let graph = ResolvedGraph::resolve(Catalogs::load(&settings)?);
            turtle::write(&output, &graph)?;
            println!("RDF dataset saved to {}", output.display());
            println!("  Films:      {}", graph.films.len());
            println!("  Series:     {}", graph.series.len());
            println!("  Shorts:     {}", graph.shorts.len());
            println!("  Characters: {}", graph.characters.len());
            println!("  Directors:  {}", graph.directors.len());
            println!("  Genres:     {}", graph.genres.len());
            println!("  Studios:    {}", graph.studios.len());
            Ok(())
        }
        Commands::Stats => {
            let c = Catalogs::load(&settings)?;
            println!("Films:      {}", c.films.movies.len());
            println!("Series:     {}", c.series.series.len());
            println!("Shorts:     {}", c.shorts.shorts.len());
            println!(
                "Characters: {} (films) + {} (series)",
                c.films.characters.len(),
                c.series.characters.len()
            );
            println!("Directors:  {}", c.films.directors.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_stats(kind: &str, stats: &ScrapeStats) {
    println!(
        "Done: {} {} candidates ({} ok, {} rejected, {} errors).",
        stats.total, kind, stats.ok, stats.rejected, stats.errors
    );
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
