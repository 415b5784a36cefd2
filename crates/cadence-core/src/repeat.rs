use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  Datelike,
  Duration,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  trace,
  warn
};

use crate::calendar::{
  is_leap_year,
  normalize_ymd,
  week_of_month,
  weekday_index
};

/// A full Gregorian cycle; leap-year
/// layout repeats after this many years.
const LEAP_SEARCH_LIMIT: u32 = 400;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize
)]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
  #[default]
  None,
  Daily,
  Weekly,
  Monthly,
  Yearly
}

impl RepeatType {
  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      | Self::None => "none",
      | Self::Daily => "daily",
      | Self::Weekly => "weekly",
      | Self::Monthly => "monthly",
      | Self::Yearly => "yearly"
    }
  }

  #[must_use]
  pub fn is_repeating(self) -> bool {
    self != Self::None
  }
}

impl fmt::Display for RepeatType {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RepeatType {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "none" => Ok(Self::None),
      | "daily" => Ok(Self::Daily),
      | "weekly" => Ok(Self::Weekly),
      | "monthly" => Ok(Self::Monthly),
      | "yearly" => Ok(Self::Yearly),
      | other => {
        Err(anyhow!(
          "unknown repeat type: \
           {other}"
        ))
      }
    }
  }
}

/// Which reading of an ambiguous
/// anchor date a repeating event follows.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize
)]
#[serde(rename_all = "camelCase")]
pub enum RepeatOption {
  Date,
  Week,
  LastDay,
  Leap
}

impl RepeatOption {
  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Date => "date",
      | Self::Week => "week",
      | Self::LastDay => "lastDay",
      | Self::Leap => "leap"
    }
  }
}

impl fmt::Display for RepeatOption {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RepeatOption {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s.trim() {
      | "date" => Ok(Self::Date),
      | "week" => Ok(Self::Week),
      | "lastDay" | "lastday"
      | "last-day" => Ok(Self::LastDay),
      | "leap" => Ok(Self::Leap),
      | other => {
        Err(anyhow!(
          "unknown repeat option: \
           {other}"
        ))
      }
    }
  }
}

fn default_interval() -> u32 { 1 }

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize
)]
#[serde(rename_all = "camelCase")]
pub struct RepeatInfo {
  #[serde(rename = "type", default)]
  pub kind: RepeatType,

  #[serde(default = "default_interval")]
  pub interval: u32,

  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub end_date: Option<String>,

  #[serde(
    default,
    alias = "disambiguationOption",
    skip_serializing_if = "Option::is_none",
    with = "lenient_option"
  )]
  pub repeat_option: Option<RepeatOption>,

  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>
}

impl Default for RepeatInfo {
  fn default() -> Self {
    Self {
      kind:          RepeatType::None,
      interval:      default_interval(),
      end_date:      None,
      repeat_option: None,
      id:            None
    }
  }
}

impl RepeatInfo {
  #[must_use]
  pub fn new(
    kind: RepeatType,
    interval: u32
  ) -> Self {
    Self {
      kind,
      interval,
      ..Self::default()
    }
  }

  /// Copy of this rule that no longer
  /// repeats and is detached from its
  /// series.
  #[must_use]
  pub fn detached(&self) -> Self {
    Self {
      kind: RepeatType::None,
      id: None,
      ..self.clone()
    }
  }
}

/// Advances `date` by one step of the
/// rule. Returns `date` unchanged when the
/// rule cannot make progress.
#[must_use]
pub fn increment_date(
  date: NaiveDate,
  kind: RepeatType,
  interval: u32,
  option: Option<RepeatOption>
) -> NaiveDate {
  if interval == 0 {
    trace!(%date, "zero interval; no step");
    return date;
  }
  let step = i64::from(interval);

  let next = match kind {
    | RepeatType::None => Some(date),
    | RepeatType::Daily => {
      add_days(date, step)
    }
    | RepeatType::Weekly => {
      step
        .checked_mul(7)
        .and_then(|days| {
          add_days(date, days)
        })
    }
    | RepeatType::Monthly => {
      match option {
        | Some(RepeatOption::Week) => {
          same_weekday_months_later(
            date, step
          )
        }
        | _ => shift_months(date, step)
      }
    }
    | RepeatType::Yearly => {
      match option {
        | Some(RepeatOption::Leap) => {
          next_leap_day(date, step)
        }
        | Some(
          RepeatOption::LastDay
        ) => {
          february_end_years_later(
            date, step
          )
        }
        | _ => shift_years(date, step)
      }
    }
  };

  next.unwrap_or_else(|| {
    warn!(
      %date,
      kind = %kind,
      interval,
      "no representable next occurrence"
    );
    date
  })
}

fn add_days(
  date: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  date.checked_add_signed(
    Duration::try_days(days)?
  )
}

fn shift_months(
  date: NaiveDate,
  months: i64
) -> Option<NaiveDate> {
  normalize_ymd(
    i64::from(date.year()),
    i64::from(date.month0())
      .checked_add(months)?,
    i64::from(date.day())
  )
}

fn shift_years(
  date: NaiveDate,
  years: i64
) -> Option<NaiveDate> {
  normalize_ymd(
    i64::from(date.year())
      .checked_add(years)?,
    i64::from(date.month0()),
    i64::from(date.day())
  )
}

fn same_weekday_months_later(
  date: NaiveDate,
  months: i64
) -> Option<NaiveDate> {
  let week = week_of_month(date);
  let weekday = weekday_index(date);

  let shifted =
    shift_months(date, months)?;
  let first_weekday = weekday_index(
    shifted.with_day(1)?
  );
  let offset =
    (weekday + 7 - first_weekday) % 7;
  let target_day =
    1 + offset + (week - 1) * 7;

  normalize_ymd(
    i64::from(shifted.year()),
    i64::from(shifted.month0()),
    i64::from(target_day)
  )
}

fn next_leap_day(
  date: NaiveDate,
  years: i64
) -> Option<NaiveDate> {
  let mut year = i64::from(date.year())
    .checked_add(years)?;
  let mut attempts = 0;
  while !is_leap_year(year) {
    attempts += 1;
    if attempts >= LEAP_SEARCH_LIMIT {
      return None;
    }
    year = year.checked_add(years)?;
  }

  let in_year = normalize_ymd(
    year,
    i64::from(date.month0()),
    i64::from(date.day())
  )?;
  let in_february = normalize_ymd(
    i64::from(in_year.year()),
    1,
    i64::from(in_year.day())
  )?;
  normalize_ymd(
    i64::from(in_february.year()),
    i64::from(in_february.month0()),
    29
  )
}

fn february_end_years_later(
  date: NaiveDate,
  years: i64
) -> Option<NaiveDate> {
  let shifted =
    shift_years(date, years)?;
  normalize_ymd(
    i64::from(shifted.year()),
    2,
    0
  )
}

/// Unknown option tags read as "no
/// option" instead of failing the whole
/// record.
mod lenient_option {
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  use super::RepeatOption;

  pub fn serialize<S>(
    option: &Option<RepeatOption>,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    match option {
      | Some(value) => {
        serializer
          .serialize_str(value.as_str())
      }
      | None => {
        serializer.serialize_none()
      }
    }
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<
    Option<RepeatOption>,
    D::Error
  >
  where
    D: Deserializer<'de>
  {
    let raw =
      Option::<String>::deserialize(
        deserializer
      )?;
    Ok(raw.and_then(|tag| {
      match tag.parse() {
        | Ok(option) => Some(option),
        | Err(err) => {
          if !tag.trim().is_empty() {
            tracing::warn!(
              tag = %tag,
              error = %err,
              "ignoring unknown repeat option"
            );
          }
          None
        }
      }
    }))
  }
}
