use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::{GetArgs, SetArgs};
use crate::config;
use crate::mutate;
use crate::polygon;
use crate::registry::{self, field_string, Monitor, Zone, ZoneLookup};
use crate::schema::{self, EntityKind, ZONE_LIST_PARAM};
use crate::session::Session;
use crate::units;

/// How a token following the monitor key is interpreted: a monitor
/// parameter name wins, then a zone key; anything else is reported as
/// neither (distinct from "zone id not found").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenMeaning {
    MonitorParam,
    ZoneKey(u32),
    Neither,
}

pub(crate) fn classify_read_token(monitor: &Monitor, token: &str) -> TokenMeaning {
    if schema::validate_read(EntityKind::Monitor, token).is_ok() {
        return TokenMeaning::MonitorParam;
    }
    match monitor.resolve_zone(token) {
        ZoneLookup::Found(id) => TokenMeaning::ZoneKey(id),
        ZoneLookup::Absent => TokenMeaning::Neither,
    }
}

pub(crate) fn classify_write_token(monitor: &Monitor, token: &str) -> TokenMeaning {
    if let Some((name, _)) = token.split_once(':') {
        if schema::lookup(EntityKind::Monitor, name).is_some() {
            return TokenMeaning::MonitorParam;
        }
    }
    match monitor.resolve_zone(token) {
        ZoneLookup::Found(id) => TokenMeaning::ZoneKey(id),
        ZoneLookup::Absent => TokenMeaning::Neither,
    }
}

fn zone_area(zone: &Zone) -> u64 {
    polygon::parse_coords(&zone.coords)
        .map(|vertices| polygon::area(&vertices))
        .unwrap_or(zone.area)
}

fn print_monitor_param(monitor: &Monitor, name: &str) -> Result<()> {
    if name == ZONE_LIST_PARAM {
        for zone in &monitor.zones {
            let zone_type = field_string(&zone.raw, "Type").unwrap_or_default();
            println!(
                "{:>4}  {:<20} {:<10} area={}",
                zone.id,
                zone.name,
                zone_type,
                zone_area(zone)
            );
        }
        return Ok(());
    }
    match field_string(&monitor.raw, name) {
        Some(value) => println!("{name}: {value}"),
        None => println!("{name}:"),
    }
    Ok(())
}

fn print_zone_param(zone: &Zone, name: &str) -> Result<()> {
    schema::validate_read(EntityKind::Zone, name)?;
    if name == "Coords" {
        // Emit the polygon in canonical clockwise order.
        let vertices = polygon::parse_coords(&zone.coords)?;
        let (_, ordered) = polygon::canonicalize(&vertices);
        println!("Coords: {}", polygon::format_coords(&ordered));
        return Ok(());
    }
    let stored = field_string(&zone.raw, name);
    if let Some(value) = units::display_read(zone.units, name, stored.as_deref(), zone_area(zone))? {
        println!("{name}: {value}");
    }
    Ok(())
}

pub fn handle_get(args: GetArgs, config_path: &Path) -> Result<()> {
    let config = config::load_config(config_path)?;
    let session = Session::connect(&config)?;
    let registry = registry::fetch_registry(&session)?;
    let monitor_id = registry.resolve_monitor(&args.monitor)?;
    let monitor = registry
        .get(monitor_id)
        .context("resolved monitor missing from registry")?;

    let mut zone: Option<&Zone> = None;
    for token in &args.tokens {
        if let Some(zone) = zone {
            print_zone_param(zone, token)?;
            continue;
        }
        match classify_read_token(monitor, token) {
            TokenMeaning::MonitorParam => print_monitor_param(monitor, token)?,
            TokenMeaning::ZoneKey(id) => zone = monitor.zone(id),
            TokenMeaning::Neither => bail!(
                "{token:?} is neither a monitor parameter nor a zone of {:?}",
                monitor.name
            ),
        }
    }
    Ok(())
}

fn parse_writes(tokens: &[String]) -> Result<Vec<(String, String)>> {
    tokens
        .iter()
        .map(|token| {
            let (name, value) = schema::parse_assignment(token)?;
            Ok((name.to_string(), value.to_string()))
        })
        .collect()
}

pub fn handle_set(args: SetArgs, config_path: &Path) -> Result<()> {
    let config = config::load_config(config_path)?;
    let session = Session::connect(&config)?;
    let registry = registry::fetch_registry(&session)?;
    let monitor_id = registry.resolve_monitor(&args.monitor)?;
    let monitor = registry
        .get(monitor_id)
        .context("resolved monitor missing from registry")?;

    let first = &args.tokens[0];
    match classify_write_token(monitor, first) {
        TokenMeaning::MonitorParam => {
            let writes = parse_writes(&args.tokens)?;
            mutate::apply_monitor_writes(&session, monitor_id, &writes)
        }
        TokenMeaning::ZoneKey(id) => {
            let zone = monitor
                .zone(id)
                .context("resolved zone missing from monitor")?;
            if args.tokens.len() < 2 {
                bail!("no Name:Value pairs follow zone {first:?}");
            }
            let writes = parse_writes(&args.tokens[1..])?;
            mutate::apply_zone_writes(&session, zone, &writes)
        }
        TokenMeaning::Neither => bail!(
            "{first:?} is neither a monitor parameter nor a zone of {:?}",
            monitor.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_monitor;
    use crate::units::ZoneUnits;
    use serde_json::Value;

    fn monitor_with_zone() -> Monitor {
        let mut monitor = test_monitor(1, "Lawn", "Modect", true);
        monitor.zones = vec![Zone {
            id: 5,
            name: "Driveway".to_string(),
            units: ZoneUnits::Percent,
            coords: "0,0 10,0 10,10 0,10".to_string(),
            area: 100,
            raw: Value::Null,
        }];
        monitor
    }

    #[test]
    fn read_tokens_prefer_monitor_parameters_over_zone_keys() {
        let monitor = monitor_with_zone();
        assert_eq!(
            classify_read_token(&monitor, "Function"),
            TokenMeaning::MonitorParam
        );
        assert_eq!(
            classify_read_token(&monitor, ZONE_LIST_PARAM),
            TokenMeaning::MonitorParam
        );
        assert_eq!(
            classify_read_token(&monitor, "Driveway"),
            TokenMeaning::ZoneKey(5)
        );
        assert_eq!(classify_read_token(&monitor, "5"), TokenMeaning::ZoneKey(5));
        assert_eq!(
            classify_read_token(&monitor, "Porch"),
            TokenMeaning::Neither
        );
    }

    #[test]
    fn write_tokens_split_on_the_assignment_delimiter_first() {
        let monitor = monitor_with_zone();
        assert_eq!(
            classify_write_token(&monitor, "Function:Modect"),
            TokenMeaning::MonitorParam
        );
        assert_eq!(
            classify_write_token(&monitor, "Driveway"),
            TokenMeaning::ZoneKey(5)
        );
        // An assignment to an unknown name is not mistaken for a zone key.
        assert_eq!(
            classify_write_token(&monitor, "Bogus:1"),
            TokenMeaning::Neither
        );
    }

    #[test]
    fn parse_writes_rejects_bare_names() {
        assert!(parse_writes(&["Function".to_string()]).is_err());
        assert!(parse_writes(&["Function:".to_string()]).is_err());
        let writes = parse_writes(&["Function:Modect".to_string(), "Enabled:1".to_string()])
            .unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], ("Function".to_string(), "Modect".to_string()));
    }
}
