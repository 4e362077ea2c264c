//! Tally CLI - Turn roster spreadsheets into per-person reports
//!
//! # Commands
//!
//! ```bash
//! tally transform roster.xlsx                 # Detail report -> modified_roster_detail.xlsx
//! tally transform roster.xlsx --mode weight   # Report with total weight
//! tally inspect roster.xlsx                   # Show recognized product columns
//! tally serve                                 # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tally::{
    analyze, parse_file, server::start_server, transform_file, ReportMode, ReportRow, ServerConfig,
};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Turn roster spreadsheets into per-person detail and weight reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report workbook from a roster
    Transform {
        /// Input roster (.xlsx, .xls, .ods, .csv)
        input: PathBuf,

        /// Report mode: detail or weight
        #[arg(short, long, default_value = "detail")]
        mode: ReportMode,

        /// Output workbook (default: modified_<name>_<mode>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the report rows as JSON ("-" for stdout)
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show the product columns and people found in a roster
    Inspect {
        /// Input roster
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: TALLY_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform {
            input,
            mode,
            output,
            json,
        } => cmd_transform(&input, mode, output.as_deref(), json.as_deref()),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    mode: ReportMode,
    output: Option<&Path>,
    json: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {} ({} mode)", input.display(), mode);

    let result = transform_file(input, mode)?;

    if result.is_empty() {
        eprintln!("\n📭 Nothing to report: no person has a positive quantity.");
    } else {
        eprintln!();
        print_rows(&result.rows);
    }

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&result.file_name));
    fs::write(&target, &result.artifact)?;
    eprintln!("\n💾 Report written to: {}", target.display());

    if let Some(json_path) = json {
        let content = serde_json::to_string_pretty(&result.rows)?;
        let dest = (json_path != Path::new("-")).then_some(json_path);
        write_output(&content, dest)?;
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔎 Inspecting: {}", input.display());

    let parsed = parse_file(input)?;
    let analysis = analyze(&parsed.grid)?;

    println!("Grid: {} rows x {} columns", parsed.grid.height(), parsed.grid.width());
    if let Some(ref sheet) = parsed.sheet_name {
        println!("Worksheet: {}", sheet);
    }

    println!("\nProducts ({}):", analysis.products.len());
    for p in &analysis.products {
        println!(
            "  col {:>3}  {:<24} category: {:<16} weight: {:<8} price: {}",
            p.index,
            p.name,
            p.category.as_deref().unwrap_or("-"),
            p.weight.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string()),
            p.unit_price
        );
    }

    println!(
        "\nPeople: {} with orders out of {} scanned rows",
        analysis.persons.len(),
        analysis.scanned_rows
    );
    for person in &analysis.persons {
        println!("  row {:>4}  {} ({} items)", person.row + 1, person.name, person.items.len());
    }

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config = config.with_port(port);
    }
    start_server(config).await
}

fn print_rows(rows: &[ReportRow]) {
    for row in rows {
        let weight = row
            .total_weight
            .map(|w| format!("  weight {:.2}", w))
            .unwrap_or_default();
        eprintln!(
            "   {}: {}  count {}  amount {:.3}{}",
            row.name,
            row.detail,
            tally::models::format_quantity(row.total_count),
            row.total_money,
            weight
        );
    }
    eprintln!("\n📊 {} people in report", rows.len());
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Rows written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
