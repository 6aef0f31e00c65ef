use clap::Parser;
use std::path::PathBuf;

use wallet_sweeper::report::{latest_report, load_report, render_summary};

#[derive(Parser)]
#[command(name = "sweep-report")]
#[command(about = "Print a saved sweep report", long_about = None)]
struct Cli {
    /// Report file; the newest report in --dir when omitted
    path: Option<PathBuf>,

    /// Directory searched for the newest report
    #[arg(short, long, default_value = "wallets")]
    dir: PathBuf,

    /// Print the raw JSON instead of the summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let path = match cli.path {
        Some(path) => path,
        None => latest_report(&cli.dir)?,
    };
    let report = load_report(&path)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", path.display());
        print!("{}", render_summary(&report));
    }
    Ok(())
}
