use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use console::style;
use pcso_client::{PcsoConfig, Pipeline};
use pcso_core::StatisticsTable;

/// Days fetched by `fetch --quick`
pub const QUICK_DAYS: u32 = 7;

#[derive(Debug, Parser)]
#[command(name = "pcso", version, about = "Fetch, import and summarise PCSO lotto results")]
pub struct Cli {
    /// More output per occurrence (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scrape the results site, generating sample data when it is unavailable
    Fetch {
        /// Days back from today [default: scrape.days_back]
        #[arg(long, conflicts_with = "quick")]
        days: Option<u32>,
        /// Only the last week
        #[arg(long)]
        quick: bool,
    },
    /// Import a manually downloaded CSV sheet
    Import { path: PathBuf },
    /// Summarise the saved statistics
    Stats {
        /// Print the statistics artifact as JSON
        #[arg(long)]
        json: bool,
        /// Numbers listed per pick game
        #[arg(long, default_value_t = 6)]
        top: usize,
    },
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

fn fetch_days(days: Option<u32>, quick: bool, config: &PcsoConfig) -> u32 {
    match (days, quick) {
        (_, true) => QUICK_DAYS,
        (Some(days), false) => days,
        (None, false) => config.scrape.days_back,
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(PcsoConfig::load()?);

    match cli.command {
        Commands::Fetch { days, quick } => {
            let days = fetch_days(days, quick, pipeline.config());
            let report = pipeline.run_fetch(days).await?;
            println!("{report}");
        }
        Commands::Import { path } => {
            let report = pipeline.run_import(&path).await?;
            println!("{report}");
        }
        Commands::Stats { json, top } => {
            let table = pipeline.store().read_statistics()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print!("{}", render_summary(&table, top));
            }
        }
    }
    Ok(())
}

/// Per-game counts and the `top` most drawn numbers of each pick game
pub fn render_summary(table: &StatisticsTable, top: usize) -> String {
    let mut out = String::new();
    let range = match (table.date_range.start, table.date_range.end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "no dated draws".to_owned(),
    };
    writeln!(
        out,
        "{} draws, {}",
        style(table.total_draws).bold(),
        range
    )
    .ok();

    for (code, game) in &table.by_game {
        writeln!(
            out,
            "{:<8} {:<20} {:>6}",
            style(code).cyan(),
            game.display_name,
            game.count
        )
        .ok();
        if let Some(frequency) = &game.number_frequency {
            let hot = frequency
                .iter()
                .take(top)
                .map(|(number, count)| format!("{number:02}x{count}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "         most drawn: {}", style(hot).yellow()).ok();
        }
    }
    out
}
