use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::calendar::{format_date, parse_date};
use crate::cli::Command;
use crate::config::Settings;
use crate::event::EventForm;
use crate::expand::generate_repeated_events_until;
use crate::options::get_repeat_options_for;
use crate::plan::{plan_delete, plan_save};
use crate::repeat::increment_date;

#[derive(Debug, Deserialize)]
struct EventList {
    events: Vec<EventForm>,
}

#[instrument(skip(settings, command))]
pub fn dispatch(settings: &Settings, command: Command) -> anyhow::Result<()> {
    let output = execute(settings, command)?;
    println!("{output}");
    Ok(())
}

/// Runs one command and returns what it would print.
pub fn execute(settings: &Settings, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Options { kind, date } => {
            let choices = get_repeat_options_for(kind, &date)?;
            render_json(settings, &choices)
        }
        Command::Next {
            date,
            kind,
            interval,
            option,
        } => {
            let from = parse_date(&date)?;
            let next = increment_date(from, kind, interval, option);
            debug!(%from, %next, "computed next occurrence");
            Ok(format_date(next))
        }
        Command::Expand { input } => {
            let event: EventForm = read_json(input.as_deref())?;
            let events = generate_repeated_events_until(&event, settings.ceiling);
            info!(count = events.len(), "expanded event");
            render_json(settings, &events)
        }
        Command::PlanSave { input, editing } => {
            let event: EventForm = read_json(input.as_deref())?;
            let request = plan_save(&event, editing, settings.ceiling)?;
            render_json(settings, &request)
        }
        Command::PlanDelete { id, mode, input } => {
            let list: EventList = read_json(input.as_deref())?;
            let request = plan_delete(&list.events, &id, mode);
            render_json(settings, &request)
        }
    }
}

fn render_json<T: Serialize + ?Sized>(settings: &Settings, value: &T) -> anyhow::Result<String> {
    let text = if settings.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("failed to encode output")
}

fn read_json<T>(input: Option<&Path>) -> anyhow::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let (source, raw) = match input {
        Some(path) if path != Path::new("-") => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (path.display().to_string(), raw)
        }
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            ("stdin".to_string(), raw)
        }
    };
    debug!(source = %source, bytes = raw.len(), "read input document");

    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {source}"))
}
