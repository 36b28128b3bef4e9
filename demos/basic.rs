//! Basic example demonstrating the infrastructure API client.
//!
//! Run with:
//! ```
//! INFRA_API_KEY=your-key cargo run --example basic
//! ```

use infrapi::{
    FilterOp, Get, InfraClient, Instance, List, Network, RequestParams, SortDirection, Volume,
};

fn main() -> infrapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Create client from environment variables
    println!("Creating infrastructure client...");
    let client = InfraClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // List first page of instances, newest first
    println!("\n--- Listing Instances (first page) ---");
    let mut params = RequestParams::new();
    params.add_sort("created_at", SortDirection::Desc);
    let page = Instance::list_page(&client, &params.with_page(1, 10))?;
    println!("Found {} instances (total: {:?})", page.len(), page.total());

    for instance in &page {
        println!("  - {} ({}, {})", instance.name, instance.id, instance.status);
    }

    // Get a specific instance (using the first one from the list)
    if let Some(first) = page.items.first() {
        println!("\n--- Getting Instance Details ---");
        let instance = Instance::get(&client, first.id.clone())?;
        println!("Instance: {}", instance.name);
        println!("  ID: {}", instance.id);
        println!("  Flavor: {}", instance.flavor);
        println!("  IP: {}", instance.primary_ip().unwrap_or("none"));

        // Volumes attached to this instance
        println!("\n--- Attached Volumes ---");
        let volumes = instance.volumes(&client)?;
        println!("Found {} volumes", volumes.len());
        for volume in &volumes {
            println!("  - {} ({} GB, {})", volume.name, volume.size_gb, volume.status);
        }
    }

    // Walk every page of active networks
    println!("\n--- Active Networks ---");
    let mut params = RequestParams::new();
    params.add_filter("status", FilterOp::Eq, ["active"]);
    let networks = Network::list_all(&client, &params)?;
    for network in &networks {
        println!("  - {} {}", network.name, network.cidr);
    }

    // Large volumes, page by page
    println!("\n--- Volumes Over 500 GB ---");
    let mut params = RequestParams::new();
    params
        .add_filter("size_gb", FilterOp::Gt, ["500"])
        .add_sort("size_gb", SortDirection::Desc);
    let mut handle = Volume::pages(&client, &params.with_page(1, 20))?;
    loop {
        for volume in handle.page() {
            println!("  - {} ({} GB)", volume.name, volume.size_gb);
        }
        match handle.next_page()? {
            Some(next) => handle = next,
            None => break,
        }
    }

    println!("\nDone!");
    Ok(())
}
