//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the infrapi binary.

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::{InfraError, Result};
use crate::params::{FilterOp, RequestParams, SortDirection};
use crate::InstanceAction;

/// Infrastructure API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "infrapi", about = "Infrastructure API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity ID.
        id: String,
    },

    /// List entities with optional filtering, sorting and pagination.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Page number (1-indexed).
        #[arg(long)]
        page: Option<u32>,

        /// Number of items per page.
        #[arg(long)]
        per_page: Option<u32>,

        /// Fetch every page.
        #[arg(long, conflicts_with = "page")]
        all: bool,

        /// Filter as `field:op:value[,value...]` (repeatable).
        #[arg(long, value_name = "FIELD:OP:VALUES")]
        filter: Vec<String>,

        /// Sort key, `-` prefix for descending (repeatable).
        #[arg(long, value_name = "[-]FIELD", allow_hyphen_values = true)]
        sort: Vec<String>,
    },

    /// Delete an entity.
    Delete {
        /// The type of entity to delete.
        entity: Entity,

        /// The entity ID.
        id: String,
    },

    /// Perform a power or lifecycle action on an instance.
    Action {
        /// The instance ID.
        id: String,

        /// One of start, stop, reboot, rebuild.
        #[arg(value_parser = parse_action)]
        action: InstanceAction,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A compute instance.
    #[value(alias = "instances")]
    Instance,
    /// A private network.
    #[value(alias = "networks")]
    Network,
    /// A block storage volume.
    #[value(alias = "volumes")]
    Volume,
    /// A load balancer.
    #[value(name = "load-balancer", aliases = ["load-balancers", "lb"])]
    LoadBalancer,
}

fn parse_action(raw: &str) -> std::result::Result<InstanceAction, String> {
    raw.parse().map_err(|e: crate::enums::UnrecognizedValue| e.to_string())
}

/// Parse a `field:op:v1,v2` filter argument.
///
/// # Errors
///
/// Returns [`InfraError::InvalidArgument`] for a malformed argument or
/// [`InfraError::UnrecognizedValue`] for an unknown operator.
pub fn parse_filter(raw: &str) -> Result<(String, FilterOp, Vec<String>)> {
    let mut parts = raw.splitn(3, ':');
    let (Some(field), Some(op), Some(values)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(InfraError::InvalidArgument(format!(
            "filter '{raw}' must look like field:op:value[,value...]"
        )));
    };
    if field.is_empty() {
        return Err(InfraError::InvalidArgument(format!("filter '{raw}' has no field")));
    }

    let op: FilterOp = op.parse()?;
    let values = values.split(',').map(str::to_string).collect();
    Ok((field.to_string(), op, values))
}

/// Parse a `[-]field` sort argument.
///
/// # Errors
///
/// Returns [`InfraError::InvalidArgument`] when no field is named.
pub fn parse_sort(raw: &str) -> Result<(String, SortDirection)> {
    let (field, direction) = match raw.strip_prefix('-') {
        Some(field) => (field, SortDirection::Desc),
        None => (raw, SortDirection::Asc),
    };
    if field.is_empty() {
        return Err(InfraError::InvalidArgument(format!("sort '{raw}' has no field")));
    }
    Ok((field.to_string(), direction))
}

/// Build request parameters from the `list` command's arguments.
///
/// # Errors
///
/// Returns the first filter or sort argument that fails to parse.
pub fn list_params(
    page: Option<u32>,
    per_page: Option<u32>,
    filters: &[String],
    sorts: &[String],
) -> Result<RequestParams> {
    let mut params = RequestParams::new();
    for raw in filters {
        let (field, op, values) = parse_filter(raw)?;
        params.add_filter(field, op, values);
    }
    for raw in sorts {
        let (field, direction) = parse_sort(raw)?;
        params.add_sort(field, direction);
    }
    if page.is_some() || per_page.is_some() {
        params.set_page(page.unwrap_or(1), per_page.unwrap_or(crate::DEFAULT_PAGE_SIZE));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let (field, op, values) = parse_filter("status:in:running,stopped").unwrap();
        assert_eq!(field, "status");
        assert_eq!(op, FilterOp::In);
        assert_eq!(values, vec!["running", "stopped"]);
    }

    #[test]
    fn test_parse_filter_keeps_colons_in_values() {
        let (_, _, values) = parse_filter("created_at:gte:2026-01-01T00:00:00Z").unwrap();
        assert_eq!(values, vec!["2026-01-01T00:00:00Z"]);
    }

    #[test]
    fn test_parse_filter_rejects_malformed() {
        assert!(matches!(parse_filter("status"), Err(InfraError::InvalidArgument(_))));
        assert!(matches!(parse_filter(":eq:x"), Err(InfraError::InvalidArgument(_))));
        assert!(matches!(
            parse_filter("status:between:1,2"),
            Err(InfraError::UnrecognizedValue(_))
        ));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("name").unwrap(), ("name".to_string(), SortDirection::Asc));
        assert_eq!(
            parse_sort("-created_at").unwrap(),
            ("created_at".to_string(), SortDirection::Desc)
        );
        assert!(parse_sort("-").is_err());
    }

    #[test]
    fn test_list_params_renders_in_order() {
        let params = list_params(
            Some(2),
            None,
            &["region:eq:fra1".to_string()],
            &["-created_at".to_string(), "name".to_string()],
        )
        .unwrap();

        assert_eq!(
            params.to_query_string(),
            "filter[region][eq]=fra1&sort=-created_at,name&page=2&per_page=100"
        );
    }

    #[test]
    fn test_list_params_empty() {
        assert!(list_params(None, None, &[], &[]).unwrap().is_empty());
    }
}
