mod availability;
mod display;
mod error;
mod parser;
mod store;
mod web;

use simplelog::{Config, LevelFilter, SimpleLogger};

use availability::{summarize, AvailabilityGrid};
use display::{grid_table, headcount_table, metadata_table};
use parser::parse_import_payload;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let db_path = std::env::var("DENSUKE_DB").unwrap_or_else(|_| "densuke.db".to_string());

        println!("Starting web server on port {}...", port);
        println!("Store: {}", db_path);
        println!("Access the board at http://localhost:{}", port);

        web::start_server(port, db_path).await?;
        return Ok(());
    }

    // CLI mode: print the board for a schedule export, no store involved.
    let Some(csv_path) = args.get(1) else {
        eprintln!("Usage: densuke-board <export.csv>");
        eprintln!("       densuke-board web [port]");
        std::process::exit(2);
    };

    let bytes = std::fs::read(csv_path)?;
    let payload = parse_import_payload(&bytes)?;
    println!("Loaded {} attendance records", payload.records.len());

    let grid = AvailabilityGrid::from_records(&payload.records);
    if grid.is_empty() {
        println!("No valid dates found in {}", csv_path);
        return Ok(());
    }

    for month in grid.months_present() {
        let monthly = grid.filter_by_month(month);
        println!("\n=== {}月 出欠表 ===", month);
        println!("{}", grid_table(&monthly).to_text());
        println!("\n=== {}月 参加可能人数 ===", month);
        println!("{}", headcount_table(&summarize(&monthly)).to_text());
    }

    if !payload.metadata.is_empty() {
        println!("\n=== メンバー情報 ===");
        println!(
            "{}",
            metadata_table(grid.members(), &payload.metadata).to_text()
        );
    }

    Ok(())
}
