//! # Spot Provisioning
//!
//! Adds parking spots to a Park'it database.
//!
//! ## Usage
//! ```bash
//! # Show the current layout
//! cargo run -p parkit-db --bin provision -- --db ./parkit.db
//!
//! # Add 10 car spots and 4 bike spots after the highest existing number
//! cargo run -p parkit-db --bin provision -- --db ./parkit.db --cars 10 --bikes 4
//! ```
//!
//! New spots start free. Existing spots are never renumbered or removed.

use std::env;

use parkit_core::VehicleType;
use parkit_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./parkit.db");
    let mut cars: u32 = 0;
    let mut bikes: u32 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--cars" | "-c" => {
                if i + 1 < args.len() {
                    cars = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--bikes" | "-b" => {
                if i + 1 < args.len() {
                    bikes = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Park'it spot provisioning");
                println!();
                println!("Usage: provision [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./parkit.db)");
                println!("  -c, --cars <N>      Car spots to add (default: 0)");
                println!("  -b, --bikes <N>     Bike spots to add (default: 0)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Database: {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let spots = db.spots();

    for (vehicle_type, count) in [(VehicleType::Car, cars), (VehicleType::Bike, bikes)] {
        let added = spots.provision(vehicle_type, count).await?;
        if let (Some(first), Some(last)) = (added.first(), added.last()) {
            println!(
                "Added {} {} spot(s): {}-{}",
                added.len(),
                vehicle_type,
                first.number(),
                last.number()
            );
        }
    }

    println!();
    println!("{:>6}  {:<5}  {}", "SPOT", "TYPE", "STATUS");
    for spot in spots.list().await? {
        let status = if spot.is_available() { "free" } else { "occupied" };
        println!("{:>6}  {:<5}  {}", spot.number(), spot.vehicle_type(), status);
    }

    for vehicle_type in VehicleType::ALL {
        println!(
            "{} free: {}",
            vehicle_type,
            spots.count_available(vehicle_type).await?
        );
    }

    db.close().await;
    Ok(())
}
