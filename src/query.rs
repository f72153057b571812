use chrono::NaiveDateTime;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::registry::MonitorRegistry;

pub const EXCLUDE_PREFIX: char = '!';

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl TimeWindow {
    /// Rejects an inverted window before anything touches the network.
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> ClientResult<Self> {
        if from > to {
            return Err(ClientError::InvalidRange {
                from: from.format(TIME_FORMAT).to_string(),
                to: to.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(Self { from, to })
    }
}

#[derive(Debug, Clone)]
pub struct NotesPredicate {
    pub pattern: String,
    pub negated: bool,
}

impl NotesPredicate {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(EXCLUDE_PREFIX) {
            Some(pattern) => Self {
                pattern: pattern.to_string(),
                negated: true,
            },
            None => Self {
                pattern: raw.to_string(),
                negated: false,
            },
        }
    }
}

/// A finished server filter expression: time window, resolved monitor id
/// set, and an optional notes predicate.
#[derive(Debug, Clone)]
pub struct EventQuery {
    window: TimeWindow,
    monitor_ids: Vec<u32>,
    notes: Option<NotesPredicate>,
}

impl EventQuery {
    pub fn build(
        registry: &MonitorRegistry,
        window: TimeWindow,
        selectors: &[String],
        notes: Option<&str>,
    ) -> ClientResult<Self> {
        Ok(Self {
            window,
            monitor_ids: resolve_selectors(registry, selectors)?,
            notes: notes.map(NotesPredicate::parse),
        })
    }

    /// Resolved monitor id set; empty means no monitor filter segment.
    pub fn monitor_ids(&self) -> &[u32] {
        &self.monitor_ids
    }

    fn filter_segments(&self) -> Vec<String> {
        let mut segments = vec![
            format!("StartTime >=:{}", self.window.from.format(TIME_FORMAT)),
            format!("StartTime <=:{}", self.window.to.format(TIME_FORMAT)),
        ];
        for id in &self.monitor_ids {
            segments.push(format!("MonitorId:{id}"));
        }
        if let Some(notes) = &self.notes {
            let op = if notes.negated { "NOT REGEXP" } else { "REGEXP" };
            segments.push(format!("Notes {op}:{}", notes.pattern));
        }
        segments
    }

    /// URL for one result page of the events index, sorted chronologically
    /// ascending so pages concatenate in server order.
    pub fn page_url(&self, events_base: &Url, page: u32) -> ClientResult<Url> {
        let mut url = events_base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::parse("events URL", "cannot extend path"))?;
            let mut segments = self.filter_segments();
            if let Some(last) = segments.last_mut() {
                last.push_str(".json");
            }
            for segment in &segments {
                path.push(segment);
            }
        }
        url.query_pairs_mut()
            .append_pair("sort", "StartTime")
            .append_pair("direction", "asc")
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

/// Partition monitor selector tokens into an allow- or deny-list and resolve
/// them to a final id set. Mixing the two styles in one invocation is
/// rejected rather than silently treated as a deny-list.
fn resolve_selectors(registry: &MonitorRegistry, selectors: &[String]) -> ClientResult<Vec<u32>> {
    if selectors.is_empty() {
        return Ok(Vec::new());
    }
    let has_exclude = selectors.iter().any(|s| s.starts_with(EXCLUDE_PREFIX));
    let has_include = selectors.iter().any(|s| !s.starts_with(EXCLUDE_PREFIX));
    if has_exclude && has_include {
        return Err(ClientError::MixedSelector);
    }
    if has_exclude {
        let deny: Vec<&str> = selectors
            .iter()
            .filter_map(|s| s.strip_prefix(EXCLUDE_PREFIX))
            .collect();
        let mut ids = Vec::new();
        for monitor in registry.iter() {
            if !monitor.enabled || monitor.function == "None" {
                continue;
            }
            let denied = deny.iter().any(|key| {
                key.parse::<u32>().map(|id| id == monitor.id).unwrap_or(false)
                    || *key == monitor.name
            });
            if !denied {
                ids.push(monitor.id);
            }
        }
        return Ok(ids);
    }
    selectors
        .iter()
        .map(|selector| registry.resolve_monitor(selector))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_monitor;
    use chrono::NaiveDate;

    fn at(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn registry() -> MonitorRegistry {
        MonitorRegistry::new(vec![
            test_monitor(1, "Lawn", "Modect", true),
            test_monitor(2, "Patio", "Record", true),
            test_monitor(3, "Critters", "Mocord", true),
            test_monitor(4, "Attic", "None", true),
            test_monitor(5, "Garage", "Modect", false),
        ])
    }

    #[test]
    fn inverted_window_is_rejected_before_any_fetch() {
        let err = TimeWindow::new(at("2021-01-02"), at("2021-01-01")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRange { .. }));
    }

    #[test]
    fn deny_list_keeps_the_remaining_active_monitors() {
        let registry = registry();
        let window = TimeWindow::new(at("2021-01-01"), at("2021-01-02")).unwrap();
        let query =
            EventQuery::build(&registry, window, &["!Lawn".to_string()], None).unwrap();
        // Attic is function None and Garage is disabled; neither re-enters.
        assert_eq!(query.monitor_ids(), &[2, 3]);
    }

    #[test]
    fn deny_list_accepts_ids_and_ignores_unknown_keys() {
        let registry = registry();
        let window = TimeWindow::new(at("2021-01-01"), at("2021-01-02")).unwrap();
        let query = EventQuery::build(
            &registry,
            window,
            &["!2".to_string(), "!NoSuchMonitor".to_string()],
            None,
        )
        .unwrap();
        assert_eq!(query.monitor_ids(), &[1, 3]);
    }

    #[test]
    fn allow_list_resolves_every_token_or_fails() {
        let registry = registry();
        let window = TimeWindow::new(at("2021-01-01"), at("2021-01-02")).unwrap();
        let query = EventQuery::build(
            &registry,
            window,
            &["Lawn".to_string(), "3".to_string()],
            None,
        )
        .unwrap();
        assert_eq!(query.monitor_ids(), &[1, 3]);

        let err = EventQuery::build(&registry, window, &["Basement".to_string()], None)
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }

    #[test]
    fn mixed_selectors_are_rejected() {
        let registry = registry();
        let window = TimeWindow::new(at("2021-01-01"), at("2021-01-02")).unwrap();
        let err = EventQuery::build(
            &registry,
            window,
            &["Lawn".to_string(), "!Patio".to_string()],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::MixedSelector));
    }

    #[test]
    fn page_url_carries_filters_sort_and_page() {
        let registry = registry();
        let window = TimeWindow::new(at("2021-01-01"), at("2021-01-02")).unwrap();
        let query = EventQuery::build(
            &registry,
            window,
            &["Lawn".to_string()],
            Some("!false alarm"),
        )
        .unwrap();
        let base = Url::parse("http://zm.example/zm/api/events/index").unwrap();
        let url = query.page_url(&base, 2).unwrap();

        let path = url.path();
        assert!(path.contains("StartTime"), "{path}");
        assert!(path.contains("MonitorId:1"), "{path}");
        assert!(path.contains("NOT%20REGEXP:false%20alarm.json"), "{path}");
        let qs = url.query().unwrap();
        assert!(qs.contains("sort=StartTime"));
        assert!(qs.contains("direction=asc"));
        assert!(qs.contains("page=2"));
    }

    #[test]
    fn empty_selector_list_adds_no_monitor_segments() {
        let registry = registry();
        let window = TimeWindow::new(at("2021-01-01"), at("2021-01-02")).unwrap();
        let query = EventQuery::build(&registry, window, &[], None).unwrap();
        assert!(query.monitor_ids().is_empty());
        let base = Url::parse("http://zm.example/zm/api/events/index").unwrap();
        let url = query.page_url(&base, 1).unwrap();
        assert!(!url.path().contains("MonitorId"));
    }
}
