use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::units::ZoneUnits;

#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: u32,
    pub name: String,
    pub function: String,
    pub enabled: bool,
    pub status: Option<String>,
    pub zones: Vec<Zone>,
    /// Full parameter document as fetched, for scalar read-out.
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub id: u32,
    pub name: String,
    pub units: ZoneUnits,
    pub coords: String,
    pub area: u64,
    pub raw: Value,
}

/// Outcome of a zone lookup. `Absent` is not a failure: the mixed argument
/// walk in the get/set handlers uses it to decide whether a token was meant
/// as a zone key at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneLookup {
    Found(u32),
    Absent,
}

impl Monitor {
    pub fn resolve_zone(&self, key: &str) -> ZoneLookup {
        if let Ok(id) = key.parse::<u32>() {
            if self.zones.iter().any(|zone| zone.id == id) {
                return ZoneLookup::Found(id);
            }
        }
        match self.zones.iter().find(|zone| zone.name == key) {
            Some(zone) => ZoneLookup::Found(zone.id),
            None => ZoneLookup::Absent,
        }
    }

    pub fn zone(&self, id: u32) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }
}

/// Bidirectional id/name lookup tables, populated once at startup and
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    monitors: Vec<Monitor>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl MonitorRegistry {
    pub fn new(monitors: Vec<Monitor>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, monitor) in monitors.iter().enumerate() {
            by_id.insert(monitor.id, index);
            by_name.insert(monitor.name.clone(), index);
        }
        Self {
            monitors,
            by_id,
            by_name,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Monitor> {
        self.by_id.get(&id).map(|&index| &self.monitors[index])
    }

    /// Resolve a user-supplied key to a monitor id: known numeric id first,
    /// then case-sensitive exact name match.
    pub fn resolve_monitor(&self, key: &str) -> ClientResult<u32> {
        if let Ok(id) = key.parse::<u32>() {
            if self.by_id.contains_key(&id) {
                return Ok(id);
            }
        }
        if let Some(&index) = self.by_name.get(key) {
            return Ok(self.monitors[index].id);
        }
        Err(ClientError::not_found(key))
    }
}

pub(crate) fn field_string(doc: &Value, name: &str) -> Option<String> {
    match doc.get(name) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn require_u32(doc: &Value, name: &str, what: &str) -> ClientResult<u32> {
    field_string(doc, name)
        .and_then(|value| value.parse::<u32>().ok())
        .ok_or_else(|| ClientError::parse(what.to_string(), format!("missing or non-numeric {name}")))
}

fn parse_monitor(entry: &Value) -> ClientResult<Monitor> {
    let raw = entry
        .get("Monitor")
        .ok_or_else(|| ClientError::parse("monitor document", "missing Monitor wrapper"))?;
    let id = require_u32(raw, "Id", "monitor document")?;
    let status = entry
        .get("Monitor_Status")
        .and_then(|status| status.get("Status"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Monitor {
        id,
        name: field_string(raw, "Name").unwrap_or_default(),
        function: field_string(raw, "Function").unwrap_or_else(|| "None".to_string()),
        enabled: field_string(raw, "Enabled").as_deref() == Some("1"),
        status,
        zones: Vec::new(),
        raw: raw.clone(),
    })
}

fn parse_zone(entry: &Value) -> ClientResult<Zone> {
    let raw = entry
        .get("Zone")
        .ok_or_else(|| ClientError::parse("zone document", "missing Zone wrapper"))?;
    let id = require_u32(raw, "Id", "zone document")?;
    let name = field_string(raw, "Name").unwrap_or_default();
    let units = field_string(raw, "Units")
        .as_deref()
        .and_then(ZoneUnits::parse)
        .unwrap_or(ZoneUnits::Percent);
    let area = field_string(raw, "Area")
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(0);
    Ok(Zone {
        id,
        name,
        units,
        coords: field_string(raw, "Coords").unwrap_or_default(),
        area,
        raw: raw.clone(),
    })
}

/// Fetch all monitors and attach each one's zone collection. Called once per
/// invocation; the result is treated as read-only afterwards.
pub fn fetch_registry(session: &Session) -> ClientResult<MonitorRegistry> {
    let url = session.api_url(&["monitors.json"])?;
    let doc = session.get_json(url)?;
    let entries = doc
        .get("monitors")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::parse("monitor listing", "missing monitors array"))?;
    let mut monitors = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut monitor = parse_monitor(entry)?;
        monitor.zones = fetch_zones(session, monitor.id)?;
        debug!(
            monitor = monitor.id,
            zones = monitor.zones.len(),
            "loaded monitor"
        );
        monitors.push(monitor);
    }
    Ok(MonitorRegistry::new(monitors))
}

fn fetch_zones(session: &Session, monitor_id: u32) -> ClientResult<Vec<Zone>> {
    let url = session.api_url(&["zones", "forMonitor", &format!("{monitor_id}.json")])?;
    let doc = session.get_json(url)?;
    let entries = doc
        .get("zones")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::parse("zone listing", "missing zones array"))?;
    entries.iter().map(parse_zone).collect()
}

#[cfg(test)]
pub(crate) fn test_monitor(id: u32, name: &str, function: &str, enabled: bool) -> Monitor {
    Monitor {
        id,
        name: name.to_string(),
        function: function.to_string(),
        enabled,
        status: Some("Connected".to_string()),
        zones: Vec::new(),
        raw: Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use super::test_monitor as monitor;

    fn zone(id: u32, name: &str) -> Zone {
        Zone {
            id,
            name: name.to_string(),
            units: ZoneUnits::Percent,
            coords: "0,0 10,0 10,10 0,10".to_string(),
            area: 100,
            raw: Value::Null,
        }
    }

    #[test]
    fn monitor_resolves_by_id_and_by_name() {
        let registry = MonitorRegistry::new(vec![monitor(7, "Lawn", "Modect", true)]);
        assert_eq!(registry.resolve_monitor("7").unwrap(), 7);
        assert_eq!(registry.resolve_monitor("Lawn").unwrap(), 7);
        assert!(matches!(
            registry.resolve_monitor("NoSuchName"),
            Err(ClientError::NotFound { .. })
        ));
    }

    #[test]
    fn name_matching_is_case_sensitive() {
        let registry = MonitorRegistry::new(vec![monitor(1, "Lawn", "Modect", true)]);
        assert!(registry.resolve_monitor("lawn").is_err());
    }

    #[test]
    fn unknown_numeric_key_falls_back_to_name_lookup() {
        let registry = MonitorRegistry::new(vec![monitor(3, "42", "Monitor", true)]);
        assert_eq!(registry.resolve_monitor("42").unwrap(), 3);
    }

    #[test]
    fn zone_lookup_is_tri_state() {
        let mut owner = monitor(1, "Lawn", "Modect", true);
        owner.zones = vec![zone(5, "Driveway")];
        assert_eq!(owner.resolve_zone("5"), ZoneLookup::Found(5));
        assert_eq!(owner.resolve_zone("Driveway"), ZoneLookup::Found(5));
        assert_eq!(owner.resolve_zone("Porch"), ZoneLookup::Absent);
    }

    #[test]
    fn parses_wrapped_monitor_and_zone_documents() {
        let entry = json!({
            "Monitor": {"Id": "2", "Name": "Patio", "Function": "Record", "Enabled": "1"},
            "Monitor_Status": {"Status": "Connected"}
        });
        let parsed = parse_monitor(&entry).unwrap();
        assert_eq!(parsed.id, 2);
        assert_eq!(parsed.name, "Patio");
        assert!(parsed.enabled);
        assert_eq!(parsed.status.as_deref(), Some("Connected"));

        let entry = json!({
            "Zone": {
                "Id": "9", "Name": "Door", "Units": "Pixels",
                "Coords": "0,0 20,0 20,20 0,20", "Area": "400"
            }
        });
        let parsed = parse_zone(&entry).unwrap();
        assert_eq!(parsed.id, 9);
        assert_eq!(parsed.units, ZoneUnits::Pixels);
        assert_eq!(parsed.area, 400);
    }

    #[test]
    fn missing_wrapper_is_a_parse_failure() {
        assert!(parse_monitor(&json!({"Id": "1"})).is_err());
        assert!(parse_zone(&json!({"Id": "1"})).is_err());
    }
}
