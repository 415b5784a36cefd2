use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  NaiveDate
};

const WEEKDAY_NAMES: [&str; 7] = [
  "Sunday",
  "Monday",
  "Tuesday",
  "Wednesday",
  "Thursday",
  "Friday",
  "Saturday"
];

const MONTH_ABBREVS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May",
  "Jun", "Jul", "Aug", "Sep", "Oct",
  "Nov", "Dec"
];

#[must_use]
pub fn is_leap_year(year: i64) -> bool {
  (year % 4 == 0 && year % 100 != 0)
    || year % 400 == 0
}

/// 0 = Sunday .. 6 = Saturday.
#[must_use]
pub fn weekday_index(
  date: NaiveDate
) -> u32 {
  date.weekday().num_days_from_sunday()
}

/// Ordinal of the calendar row the date
/// sits in, counting the partial first
/// week of the month as week 1.
#[must_use]
pub fn week_of_month(
  date: NaiveDate
) -> u32 {
  let day = date.day();
  let first_weekday = (weekday_index(
    date
  ) + 7
    - (day - 1) % 7)
    % 7;
  (day + first_weekday).div_ceil(7)
}

/// Builds a date from a possibly
/// out-of-range zero-based month and
/// one-based day, rolling any excess
/// forward (or backward) into adjacent
/// months and years. Day 0 is the last
/// day of the previous month.
#[must_use]
pub fn normalize_ymd(
  year: i64,
  month0: i64,
  day: i64
) -> Option<NaiveDate> {
  let total_months = year
    .checked_mul(12)?
    .checked_add(month0)?;
  let year = i32::try_from(
    total_months.div_euclid(12)
  )
  .ok()?;
  let month = u32::try_from(
    total_months.rem_euclid(12) + 1
  )
  .ok()?;

  let first =
    NaiveDate::from_ymd_opt(
      year, month, 1
    )?;
  first.checked_add_signed(
    Duration::try_days(
      day.checked_sub(1)?
    )?
  )
}

#[must_use]
pub fn format_date(
  date: NaiveDate
) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(
  input: &str
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  if token.is_empty() {
    return Err(anyhow!(
      "date value is empty"
    ));
  }

  NaiveDate::parse_from_str(
    token, "%Y-%m-%d"
  )
  .with_context(|| {
    format!(
      "invalid date `{input}`; \
       expected YYYY-MM-DD"
    )
  })
}

#[must_use]
pub fn weekday_name(
  index: u32
) -> &'static str {
  usize::try_from(index)
    .ok()
    .and_then(|i| {
      WEEKDAY_NAMES.get(i).copied()
    })
    .unwrap_or("")
}

#[must_use]
pub fn month_abbrev(
  month: u32
) -> &'static str {
  month
    .checked_sub(1)
    .and_then(|m| {
      usize::try_from(m).ok()
    })
    .and_then(|i| {
      MONTH_ABBREVS.get(i).copied()
    })
    .unwrap_or("")
}

#[must_use]
pub fn ordinal(n: u32) -> String {
  let suffix = match (n % 100, n % 10)
  {
    | (11..=13, _) => "th",
    | (_, 1) => "st",
    | (_, 2) => "nd",
    | (_, 3) => "rd",
    | _ => "th"
  };
  format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    format_date,
    is_leap_year,
    month_abbrev,
    normalize_ymd,
    ordinal,
    parse_date,
    week_of_month,
    weekday_index,
    weekday_name
  };

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn detects_leap_years() {
    assert!(is_leap_year(2024));
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(2100));
    assert!(!is_leap_year(2023));
  }

  #[test]
  fn computes_week_of_month() {
    assert_eq!(
      week_of_month(ymd(2024, 3, 1)),
      1
    );
    assert_eq!(
      week_of_month(ymd(2024, 3, 15)),
      3
    );
    assert_eq!(
      week_of_month(ymd(2024, 3, 31)),
      6
    );
    assert_eq!(
      week_of_month(ymd(2025, 5, 15)),
      3
    );
  }

  #[test]
  fn weekday_index_starts_on_sunday() {
    assert_eq!(
      weekday_index(ymd(2024, 3, 17)),
      0
    );
    assert_eq!(
      weekday_index(ymd(2024, 3, 15)),
      5
    );
  }

  #[test]
  fn normalizes_overflowing_days() {
    assert_eq!(
      normalize_ymd(2024, 1, 31),
      Some(ymd(2024, 3, 2))
    );
    assert_eq!(
      normalize_ymd(2025, 1, 29),
      Some(ymd(2025, 3, 1))
    );
    assert_eq!(
      normalize_ymd(2025, 2, 0),
      Some(ymd(2025, 2, 28))
    );
  }

  #[test]
  fn normalizes_overflowing_months() {
    assert_eq!(
      normalize_ymd(2024, 12, 15),
      Some(ymd(2025, 1, 15))
    );
    assert_eq!(
      normalize_ymd(2024, -1, 10),
      Some(ymd(2023, 12, 10))
    );
    assert_eq!(
      normalize_ymd(2024, 25, 1),
      Some(ymd(2026, 2, 1))
    );
  }

  #[test]
  fn normalize_rejects_unrepresentable() {
    assert_eq!(
      normalize_ymd(i64::MAX, 0, 1),
      None
    );
    assert_eq!(
      normalize_ymd(400_000, 0, 1),
      None
    );
  }

  #[test]
  fn parses_and_formats_iso_dates() {
    let date = parse_date(" 2024-03-05 ")
      .expect("parse date");
    assert_eq!(date, ymd(2024, 3, 5));
    assert_eq!(
      format_date(date),
      "2024-03-05"
    );
  }

  #[test]
  fn rejects_malformed_dates() {
    assert!(parse_date("").is_err());
    assert!(
      parse_date("2024-02-30").is_err()
    );
    assert!(
      parse_date("March 5").is_err()
    );
  }

  #[test]
  fn names_and_ordinals() {
    assert_eq!(weekday_name(4), "Thursday");
    assert_eq!(weekday_name(7), "");
    assert_eq!(month_abbrev(2), "Feb");
    assert_eq!(month_abbrev(0), "");
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(13), "13th");
    assert_eq!(ordinal(15), "15th");
    assert_eq!(ordinal(22), "22nd");
    assert_eq!(ordinal(31), "31st");
  }
}
