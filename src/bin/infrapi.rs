//! Infrastructure API CLI binary.
//!
//! A command-line interface for interacting with the infrastructure API.

use std::process::ExitCode;

use clap::Parser;
use infrapi::cli::{list_params, Cli, Command, Entity};
use infrapi::output::PrettyPrint;
use infrapi::{
    Delete, Get, InfraClient, Instance, InstanceAction, List, LoadBalancer, Network, Page,
    RequestParams, Volume,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match InfraClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set INFRA_API_KEY environment variable");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(client: &InfraClient, cli: Cli) -> infrapi::Result<()> {
    match cli.command {
        Command::Get { entity, id } => handle_get(client, entity, id, cli.json),
        Command::List {
            entity,
            page,
            per_page,
            all,
            filter,
            sort,
        } => {
            let params = list_params(page, per_page, &filter, &sort)?;
            handle_list(client, entity, &params, all, cli.json)
        }
        Command::Delete { entity, id } => handle_delete(client, entity, id),
        Command::Action { id, action } => handle_action(client, &id, action, cli.json),
    }
}

fn handle_get(client: &InfraClient, entity: Entity, id: String, json: bool) -> infrapi::Result<()> {
    match entity {
        Entity::Instance => output_single(&Instance::get(client, id)?, json),
        Entity::Network => output_single(&Network::get(client, id)?, json),
        Entity::Volume => output_single(&Volume::get(client, id)?, json),
        Entity::LoadBalancer => output_single(&LoadBalancer::get(client, id)?, json),
    }
}

fn handle_list(
    client: &InfraClient,
    entity: Entity,
    params: &RequestParams,
    all: bool,
    json: bool,
) -> infrapi::Result<()> {
    match entity {
        Entity::Instance => {
            list_entity::<Instance, _, _>(client, params, all, json, |i| InstanceRow::from(i))
        }
        Entity::Network => list_entity::<Network, _, _>(client, params, all, json, |n| NetworkRow::from(n)),
        Entity::Volume => list_entity::<Volume, _, _>(client, params, all, json, |v| VolumeRow::from(v)),
        Entity::LoadBalancer => {
            list_entity::<LoadBalancer, _, _>(client, params, all, json, |lb| LoadBalancerRow::from(lb))
        }
    }
}

fn list_entity<T, R, F>(
    client: &InfraClient,
    params: &RequestParams,
    all: bool,
    json: bool,
    to_row: F,
) -> infrapi::Result<()>
where
    T: List + Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if all {
        let items = T::list_all(client, params)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else {
            println!("{}", render_table(&items, to_row));
            println!("\n{} total items", items.len());
        }
        Ok(())
    } else {
        let page = T::list_page(client, params)?;
        output_page(&page, json, to_row)
    }
}

fn handle_delete(client: &InfraClient, entity: Entity, id: String) -> infrapi::Result<()> {
    match entity {
        Entity::Instance => Instance::delete(client, id.clone())?,
        Entity::Network => Network::delete(client, id.clone())?,
        Entity::Volume => Volume::delete(client, id.clone())?,
        Entity::LoadBalancer => LoadBalancer::delete(client, id.clone())?,
    }
    eprintln!("Deleted {id}");
    Ok(())
}

fn handle_action(
    client: &InfraClient,
    id: &str,
    action: InstanceAction,
    json: bool,
) -> infrapi::Result<()> {
    let instance = Instance::perform_action(client, id, action)?;
    output_single(&instance, json)
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> infrapi::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> infrapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else {
        println!("{}", render_table(&page.items, to_row));
        match (page.total_pages(), page.total()) {
            (Some(total_pages), Some(total)) => {
                println!("\nPage {}/{} ({} total items)", page.page, total_pages, total);
            }
            _ if page.has_more => println!("\nPage {} (more available)", page.page),
            _ => println!("\nPage {} (end)", page.page),
        }
    }
    Ok(())
}

fn render_table<T, R, F>(items: &[T], to_row: F) -> String
where
    R: Tabled,
    F: Fn(&T) -> R,
{
    Table::new(items.iter().map(to_row)).to_string()
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct InstanceRow {
    id: String,
    name: String,
    status: String,
    flavor: String,
    ip: String,
}

impl From<&Instance> for InstanceRow {
    fn from(i: &Instance) -> Self {
        Self {
            id: i.id.clone(),
            name: i.name.clone(),
            status: i.status.to_string(),
            flavor: i.flavor.clone(),
            ip: i.primary_ip().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Tabled)]
struct NetworkRow {
    id: String,
    name: String,
    cidr: String,
    status: String,
}

impl From<&Network> for NetworkRow {
    fn from(n: &Network) -> Self {
        Self {
            id: n.id.clone(),
            name: n.name.clone(),
            cidr: n.cidr.clone(),
            status: n.status.to_string(),
        }
    }
}

#[derive(Tabled)]
struct VolumeRow {
    id: String,
    name: String,
    #[tabled(rename = "size (GB)")]
    size_gb: u32,
    status: String,
    instance: String,
}

impl From<&Volume> for VolumeRow {
    fn from(v: &Volume) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            size_gb: v.size_gb,
            status: v.status.to_string(),
            instance: v.instance_id.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct LoadBalancerRow {
    id: String,
    name: String,
    status: String,
    algorithm: String,
    backends: usize,
}

impl From<&LoadBalancer> for LoadBalancerRow {
    fn from(lb: &LoadBalancer) -> Self {
        Self {
            id: lb.id.clone(),
            name: lb.name.clone(),
            status: lb.status.to_string(),
            algorithm: lb.algorithm.to_string(),
            backends: lb.backend_instance_ids.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, name: &str) -> Instance {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "status": "running",
            "flavor": "g2.small",
            "ip_addresses": ["10.0.0.5"]
        }))
        .unwrap()
    }

    #[test]
    fn test_render_table_from_borrowed_rows() {
        let items = vec![instance("i-1", "web-1"), instance("i-2", "web-2")];

        let table = render_table(&items, |i| InstanceRow::from(i));

        assert!(table.contains("flavor"));
        assert!(table.contains("web-1"));
        assert!(table.contains("10.0.0.5"));
    }

    #[test]
    fn test_render_table_load_balancer_backends() {
        let lb: LoadBalancer = serde_json::from_value(serde_json::json!({
            "id": "lb-1",
            "name": "edge",
            "status": "active",
            "algorithm": "round_robin",
            "backend_instance_ids": ["i-1", "i-2", "i-3"]
        }))
        .unwrap();

        let table = render_table(std::slice::from_ref(&lb), |lb| LoadBalancerRow::from(lb));

        assert!(table.contains("round_robin"));
        assert!(table.contains(" 3 "));
    }
}
