use chrono::NaiveDate;
use tracing::{
  debug,
  warn
};

use crate::calendar::{
  format_date,
  parse_date
};
use crate::event::EventForm;
use crate::repeat::increment_date;

const DEFAULT_CEILING_YMD: (
  i32,
  u32,
  u32
) = (2025, 6, 25);

/// Last date an open-ended series may
/// reach unless configured otherwise.
#[must_use]
pub fn default_ceiling() -> NaiveDate {
  let (y, m, d) = DEFAULT_CEILING_YMD;
  NaiveDate::from_ymd_opt(y, m, d)
    .unwrap_or(NaiveDate::MAX)
}

#[must_use]
pub fn generate_repeated_events(
  template: &EventForm
) -> Vec<EventForm> {
  generate_repeated_events_until(
    template,
    default_ceiling()
  )
}

/// Materializes one event per occurrence
/// of `template.repeat`, from
/// `template.date` up to the series end
/// date or `ceiling` when it has none.
#[tracing::instrument(
  skip(template),
  fields(
    date = %template.date,
    kind = %template.repeat.kind
  )
)]
pub fn generate_repeated_events_until(
  template: &EventForm,
  ceiling: NaiveDate
) -> Vec<EventForm> {
  let base = match parse_date(
    &template.date
  ) {
    | Ok(date) => date,
    | Err(err) => {
      warn!(
        error = %err,
        "event date unreadable; nothing to expand"
      );
      return vec![];
    }
  };

  let cutoff = match template
    .repeat
    .end_date
    .as_deref()
  {
    | Some(raw)
      if !raw.trim().is_empty() =>
    {
      match parse_date(raw) {
        | Ok(date) => date,
        | Err(err) => {
          warn!(
            error = %err,
            "repeat end date unreadable; nothing to expand"
          );
          return vec![];
        }
      }
    }
    | _ => ceiling
  };

  let repeat = &template.repeat;
  let mut events = Vec::new();
  let mut current = base;
  while current <= cutoff {
    events.push(
      template
        .with_date(format_date(current))
    );

    let next = increment_date(
      current,
      repeat.kind,
      repeat.interval,
      repeat.repeat_option
    );
    if next <= current {
      debug!(
        %current,
        "repeat rule made no progress; stopping"
      );
      break;
    }
    current = next;
  }

  debug!(
    %cutoff,
    count = events.len(),
    "expanded repeating event"
  );
  events
}
