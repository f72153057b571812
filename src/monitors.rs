use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::MonitorsArgs;
use crate::config;
use crate::registry;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
struct MonitorRow {
    id: u32,
    name: String,
    function: String,
    enabled: bool,
    status: Option<String>,
    zones: usize,
}

pub fn handle(args: MonitorsArgs, config_path: &Path) -> Result<()> {
    let config = config::load_config(config_path)?;
    let session = Session::connect(&config)?;
    let registry = registry::fetch_registry(&session)?;

    let rows: Vec<MonitorRow> = registry
        .iter()
        .map(|monitor| MonitorRow {
            id: monitor.id,
            name: monitor.name.clone(),
            function: monitor.function.clone(),
            enabled: monitor.enabled,
            status: monitor.status.clone(),
            zones: monitor.zones.len(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in &rows {
        println!(
            "{:>4}  {:<20} {:<8} {:<9} {:<12} {} zone(s)",
            row.id,
            row.name,
            row.function,
            if row.enabled { "enabled" } else { "disabled" },
            row.status.as_deref().unwrap_or("-"),
            row.zones
        );
    }
    Ok(())
}
