use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::event::EventForm;
use crate::expand::generate_repeated_events_until;

const EVENTS_PATH: &str = "/api/events";
const EVENTS_LIST_PATH: &str = "/api/events-list";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Post,
    Put,
    Delete,
}

/// A backend call the client should make; nothing here performs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    #[default]
    Single,
    All,
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeleteMode::Single => "single",
            DeleteMode::All => "all",
        })
    }
}

impl FromStr for DeleteMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(DeleteMode::Single),
            "all" => Ok(DeleteMode::All),
            other => Err(anyhow!("unknown delete mode: {other} (expected single or all)")),
        }
    }
}

#[instrument(skip(event, ceiling), fields(date = %event.date, kind = %event.repeat.kind))]
pub fn plan_save(
    event: &EventForm,
    editing: bool,
    ceiling: NaiveDate,
) -> anyhow::Result<ApiRequest> {
    let repeating = event.repeat.kind.is_repeating();

    let request = match (editing, repeating) {
        (false, true) => {
            let events = generate_repeated_events_until(event, ceiling);
            info!(count = events.len(), "saving new repeating series");
            ApiRequest::new(
                Method::Post,
                EVENTS_LIST_PATH,
                Some(json!({ "events": to_json(&events)? })),
            )
        }
        (true, true) => ApiRequest::new(
            Method::Put,
            EVENTS_LIST_PATH,
            Some(json!({ "events": [to_json(&event.detached())?] })),
        ),
        (true, false) => {
            let id = event
                .id
                .as_deref()
                .ok_or_else(|| anyhow!("cannot update an event without an id"))?;
            ApiRequest::new(
                Method::Put,
                format!("{EVENTS_PATH}/{id}"),
                Some(to_json(&event.detached())?),
            )
        }
        (false, false) => ApiRequest::new(Method::Post, EVENTS_PATH, Some(to_json(event)?)),
    };

    debug!(method = ?request.method, path = %request.path, "planned save");
    Ok(request)
}

/// Deleting with `DeleteMode::All` removes every loaded event that shares the
/// target's series id; anything else removes just the target.
#[instrument(skip(events))]
pub fn plan_delete(events: &[EventForm], id: &str, mode: DeleteMode) -> ApiRequest {
    let series = events
        .iter()
        .find(|e| e.id.as_deref() == Some(id))
        .and_then(EventForm::series_id);

    match (series, mode) {
        (Some(series), DeleteMode::All) => {
            let ids: Vec<&str> = events
                .iter()
                .filter(|e| e.series_id() == Some(series))
                .filter_map(|e| e.id.as_deref())
                .collect();
            debug!(series, count = ids.len(), "planned series delete");
            ApiRequest::new(
                Method::Delete,
                EVENTS_LIST_PATH,
                Some(json!({ "eventIds": ids })),
            )
        }
        _ => ApiRequest::new(Method::Delete, format!("{EVENTS_PATH}/{id}"), None),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("failed to encode event payload")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{DeleteMode, Method, plan_delete, plan_save};
    use crate::event::EventForm;
    use crate::expand::default_ceiling;
    use crate::repeat::{RepeatInfo, RepeatType};

    fn event(id: Option<&str>, date: &str, kind: RepeatType, series: Option<&str>) -> EventForm {
        let mut repeat = RepeatInfo::new(kind, 1);
        repeat.id = series.map(str::to_string);
        let mut event = EventForm::new(date, repeat);
        event.id = id.map(str::to_string);
        event.extra.insert("title".to_string(), json!("Review"));
        event
    }

    #[test]
    fn new_single_event_posts_itself() {
        let e = event(None, "2024-03-15", RepeatType::None, None);
        let req = plan_save(&e, false, default_ceiling()).expect("plan");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/api/events");
        assert_eq!(req.body.expect("body")["title"], json!("Review"));
    }

    #[test]
    fn new_repeating_event_posts_expanded_list() {
        let mut e = event(None, "2024-03-15", RepeatType::Daily, None);
        e.repeat.end_date = Some("2024-03-17".to_string());

        let req = plan_save(&e, false, default_ceiling()).expect("plan");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/api/events-list");

        let body = req.body.expect("body");
        let dates: Vec<&str> = body["events"]
            .as_array()
            .expect("events array")
            .iter()
            .filter_map(|e| e["date"].as_str())
            .collect();
        assert_eq!(dates, vec!["2024-03-15", "2024-03-16", "2024-03-17"]);
    }

    #[test]
    fn new_repeating_event_respects_ceiling() {
        let e = event(None, "2024-03-15", RepeatType::Weekly, None);
        let ceiling = NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid ceiling");
        let req = plan_save(&e, false, ceiling).expect("plan");
        let body = req.body.expect("body");
        assert_eq!(body["events"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn editing_repeating_event_detaches_it_from_series() {
        let e = event(Some("e1"), "2024-03-15", RepeatType::Weekly, Some("r1"));
        let req = plan_save(&e, true, default_ceiling()).expect("plan");
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path, "/api/events-list");

        let body = req.body.expect("body");
        let events = body["events"].as_array().expect("events array");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["repeat"]["type"], json!("none"));
        assert!(events[0]["repeat"].get("id").is_none());
        assert_eq!(events[0]["id"], json!("e1"));
    }

    #[test]
    fn editing_single_event_puts_by_id() {
        let e = event(Some("e7"), "2024-03-15", RepeatType::None, None);
        let req = plan_save(&e, true, default_ceiling()).expect("plan");
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path, "/api/events/e7");
    }

    #[test]
    fn editing_without_id_is_an_error() {
        let e = event(None, "2024-03-15", RepeatType::None, None);
        assert!(plan_save(&e, true, default_ceiling()).is_err());
    }

    #[test]
    fn delete_all_collects_series_members() {
        let events = vec![
            event(Some("a"), "2024-03-15", RepeatType::Weekly, Some("r1")),
            event(Some("b"), "2024-03-22", RepeatType::Weekly, Some("r1")),
            event(Some("c"), "2024-03-20", RepeatType::None, None),
            event(Some("d"), "2024-03-29", RepeatType::Weekly, Some("r2")),
        ];

        let req = plan_delete(&events, "b", DeleteMode::All);
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.path, "/api/events-list");
        assert_eq!(req.body, Some(json!({ "eventIds": ["a", "b"] })));
    }

    #[test]
    fn delete_single_or_unlinked_targets_one_event() {
        let events = vec![
            event(Some("a"), "2024-03-15", RepeatType::Weekly, Some("r1")),
            event(Some("c"), "2024-03-20", RepeatType::None, None),
        ];

        let single = plan_delete(&events, "a", DeleteMode::Single);
        assert_eq!(single.path, "/api/events/a");
        assert_eq!(single.body, None);

        let unlinked = plan_delete(&events, "c", DeleteMode::All);
        assert_eq!(unlinked.path, "/api/events/c");

        let unknown = plan_delete(&events, "zz", DeleteMode::All);
        assert_eq!(unknown.path, "/api/events/zz");
    }

    #[test]
    fn parses_delete_mode() {
        assert_eq!("ALL".parse::<DeleteMode>().expect("mode"), DeleteMode::All);
        assert!("some".parse::<DeleteMode>().is_err());
    }
}
