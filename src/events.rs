use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cli::EventsArgs;
use crate::config;
use crate::dates;
use crate::error::{ClientError, ClientResult};
use crate::query::{EventQuery, TimeWindow};
use crate::registry::{self, field_string, MonitorRegistry};
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: u64,
    pub monitor_id: u32,
    pub start_time: String,
    pub notes: String,
    pub frames: u64,
    pub length_seconds: f64,
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub page_count: u32,
}

fn parse_event(entry: &Value) -> ClientResult<Event> {
    let raw = entry
        .get("Event")
        .ok_or_else(|| ClientError::parse("event document", "missing Event wrapper"))?;
    let id = field_string(raw, "Id")
        .and_then(|value| value.parse::<u64>().ok())
        .ok_or_else(|| ClientError::parse("event document", "missing or non-numeric Id"))?;
    let monitor_id = field_string(raw, "MonitorId")
        .and_then(|value| value.parse::<u32>().ok())
        .ok_or_else(|| ClientError::parse("event document", "missing or non-numeric MonitorId"))?;
    let start_time = field_string(raw, "StartTime")
        .or_else(|| field_string(raw, "StartDateTime"))
        .unwrap_or_default();
    Ok(Event {
        id,
        monitor_id,
        start_time,
        notes: field_string(raw, "Notes").unwrap_or_default(),
        frames: field_string(raw, "Frames")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0),
        length_seconds: field_string(raw, "Length")
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(0.0),
        max_score: field_string(raw, "MaxScore").and_then(|value| value.parse::<f64>().ok()),
    })
}

pub fn parse_event_page(doc: &Value) -> ClientResult<EventPage> {
    let entries = doc
        .get("events")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::parse("event listing", "missing events array"))?;
    let events = entries.iter().map(parse_event).collect::<ClientResult<Vec<_>>>()?;
    let pagination = doc.get("pagination").unwrap_or(&Value::Null);
    let page_count = pagination
        .get("pageCount")
        .and_then(|value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse::<u64>().ok(),
            _ => None,
        })
        .unwrap_or(1) as u32;
    Ok(EventPage { events, page_count })
}

/// Drive page fetches starting at page 1, using the first response's
/// reported page count to fetch the remainder in increasing order. Any page
/// failure aborts the whole retrieval; no partial aggregate is returned.
pub fn fetch_all<F>(mut fetch_page: F) -> ClientResult<Vec<Event>>
where
    F: FnMut(u32) -> ClientResult<EventPage>,
{
    let first = fetch_page(1)?;
    let page_count = first.page_count.max(1);
    let mut events = first.events;
    for page in 2..=page_count {
        let mut next = fetch_page(page)?;
        events.append(&mut next.events);
    }
    debug!(pages = page_count, events = events.len(), "retrieval complete");
    Ok(events)
}

pub fn fetch_query(session: &Session, query: &EventQuery) -> ClientResult<Vec<Event>> {
    let base = session.api_url(&["events", "index"])?;
    fetch_all(|page| {
        let url = query.page_url(&base, page)?;
        let doc = session.get_json(url)?;
        parse_event_page(&doc)
    })
}

pub fn build_query(
    registry: &MonitorRegistry,
    from: &str,
    to: Option<&str>,
    selectors: &[String],
    notes: Option<&str>,
) -> ClientResult<EventQuery> {
    let from = dates::parse_when(from)?;
    let to = match to {
        Some(raw) => dates::parse_when(raw)?,
        None => dates::now(),
    };
    EventQuery::build(registry, TimeWindow::new(from, to)?, selectors, notes)
}

pub fn handle(args: EventsArgs, config_path: &Path) -> Result<()> {
    let config = config::load_config(config_path)?;
    let session = Session::connect(&config).context("failed to open server session")?;
    let registry = registry::fetch_registry(&session)?;
    let query = build_query(
        &registry,
        &args.from,
        args.to.as_deref(),
        &args.monitors,
        args.notes.as_deref(),
    )?;
    debug!(monitors = ?query.monitor_ids(), "query built");
    let events = fetch_query(&session, &query)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }
    for event in &events {
        let monitor = registry
            .get(event.monitor_id)
            .map(|m| m.name.as_str())
            .unwrap_or("<unknown>");
        println!(
            "{:>8}  {:<19}  {:<16}  {:>6} frames  {:>7.1}s  {}",
            event.id, event.start_time, monitor, event.frames, event.length_seconds, event.notes
        );
    }
    println!("{} event(s)", events.len());
    Ok(())
}
