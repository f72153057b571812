use anyhow::{Context, Result};
use tracing::info;

use crate::error::ClientResult;
use crate::polygon;
use crate::registry::Zone;
use crate::schema::{self, EntityKind};
use crate::session::Session;
use crate::units;

/// Apply monitor writes in caller order, one form field per call. Partial
/// application is deliberate: writes already sent stay applied when a later
/// one fails, and the error names the failing parameter.
pub fn apply_monitor_writes(
    session: &Session,
    monitor_id: u32,
    writes: &[(String, String)],
) -> Result<()> {
    for (name, value) in writes {
        schema::validate_write(EntityKind::Monitor, name, value)?;
        let url = session.api_url(&["monitors", &format!("{monitor_id}.json")])?;
        let field = format!("Monitor[{name}]");
        session
            .post_form(url, &[(field.clone(), value.clone())])
            .with_context(|| format!("failed writing {field}"))?;
        info!(monitor = monitor_id, param = %name, "monitor parameter written");
        println!("{field} = {value}");
    }
    Ok(())
}

/// The value actually sent for a zone write: pixel-count thresholds are
/// converted against the polygon's computed area, everything else passes
/// through untouched.
pub fn outgoing_zone_value(zone: &Zone, name: &str, value: &str) -> ClientResult<String> {
    if !units::is_area_scaled(name) {
        return Ok(value.to_string());
    }
    let vertices = polygon::parse_coords(&zone.coords)?;
    units::convert_write(zone.units, name, value, polygon::area(&vertices))
}

pub fn apply_zone_writes(session: &Session, zone: &Zone, writes: &[(String, String)]) -> Result<()> {
    for (name, value) in writes {
        schema::validate_write(EntityKind::Zone, name, value)?;
        let outgoing = outgoing_zone_value(zone, name, value)?;
        let url = session.api_url(&["zones", &format!("{}.json", zone.id)])?;
        let field = format!("Zone[{name}]");
        session
            .post_form(url, &[(field.clone(), outgoing.clone())])
            .with_context(|| format!("failed writing {field}"))?;
        info!(zone = zone.id, param = %name, "zone parameter written");
        println!("{field} = {outgoing}");
    }
    Ok(())
}
