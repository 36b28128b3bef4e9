//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::{Instance, LoadBalancer, Network, Volume};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header(kind: &str, id: &str) -> Vec<String> {
    let title = format!("{kind}: {id}");
    let divider = "─".repeat(title.chars().count().max(30));
    vec![title, divider]
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl PrettyPrint for Instance {
    fn pretty_print(&self) -> String {
        let mut lines = header("Instance", &self.id);
        lines.push(format!("Name:           {}", self.name));
        lines.push(format!("Status:         {}", self.status));
        lines.push(format!("Flavor:         {}", self.flavor));

        if let Some(ref image) = self.image {
            lines.push(format!("Image:          {image}"));
        }

        if let Some(ref region) = self.region {
            lines.push(format!("Region:         {region}"));
        }

        if !self.ip_addresses.is_empty() {
            lines.push(format!("Addresses:      {}", self.ip_addresses.join(", ")));
        }

        if !self.network_ids.is_empty() {
            lines.push(format!("Networks:       {}", self.network_ids.join(", ")));
        }

        if !self.tags.is_empty() {
            lines.push(format!("Tags:           {}", self.tags.join(", ")));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Network {
    fn pretty_print(&self) -> String {
        let mut lines = header("Network", &self.id);
        lines.push(format!("Name:           {}", self.name));
        lines.push(format!("CIDR:           {}", self.cidr));
        lines.push(format!("Status:         {}", self.status));

        if let Some(ref region) = self.region {
            lines.push(format!("Region:         {region}"));
        }

        if self.default {
            lines.push("Default:        yes".to_string());
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Volume {
    fn pretty_print(&self) -> String {
        let mut lines = header("Volume", &self.id);
        lines.push(format!("Name:           {}", self.name));
        lines.push(format!("Size:           {} GB", self.size_gb));
        lines.push(format!("Status:         {}", self.status));

        match self.instance_id {
            Some(ref instance) => lines.push(format!("Attached to:    {instance}")),
            None => lines.push("Attached to:    -".to_string()),
        }

        if let Some(ref region) = self.region {
            lines.push(format!("Region:         {region}"));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for LoadBalancer {
    fn pretty_print(&self) -> String {
        let mut lines = header("Load Balancer", &self.id);
        lines.push(format!("Name:           {}", self.name));
        lines.push(format!("Status:         {}", self.status));
        lines.push(format!("Algorithm:      {}", self.algorithm));

        if let Some(ref ip) = self.public_ip {
            lines.push(format!("Public IP:      {ip}"));
        }

        lines.push(format!("Backends:       {}", self.backend_instance_ids.len()));

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        lines.join("\n")
    }
}
