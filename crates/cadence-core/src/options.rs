use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{
    month_abbrev, ordinal, parse_date, week_of_month, weekday_index, weekday_name,
};
use crate::repeat::{RepeatOption, RepeatType};

/// One selectable reading of an anchor date, as shown in the event form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatChoice {
    pub value: RepeatOption,
    pub label: String,
}

impl RepeatChoice {
    fn new(value: RepeatOption, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Choices the user has to pick between when `anchor` is ambiguous under `kind`.
#[must_use]
pub fn get_repeat_options(kind: RepeatType, anchor: NaiveDate) -> Vec<RepeatChoice> {
    let choices = match kind {
        RepeatType::Monthly => monthly_options(anchor),
        RepeatType::Yearly => yearly_options(anchor),
        RepeatType::None | RepeatType::Daily | RepeatType::Weekly => vec![],
    };
    debug!(kind = %kind, %anchor, count = choices.len(), "computed repeat options");
    choices
}

#[tracing::instrument]
pub fn get_repeat_options_for(kind: RepeatType, anchor: &str) -> anyhow::Result<Vec<RepeatChoice>> {
    let anchor = parse_date(anchor).context("repeat options need a valid anchor date")?;
    Ok(get_repeat_options(kind, anchor))
}

fn monthly_options(anchor: NaiveDate) -> Vec<RepeatChoice> {
    let day = anchor.day();
    if day == 31 {
        return vec![
            RepeatChoice::new(RepeatOption::Date, "every month on the 31st"),
            RepeatChoice::new(RepeatOption::LastDay, "last day of the month"),
        ];
    }

    let week = week_of_month(anchor);
    let weekday = weekday_name(weekday_index(anchor));
    vec![
        RepeatChoice::new(
            RepeatOption::Date,
            format!("every month on the {}", ordinal(day)),
        ),
        RepeatChoice::new(
            RepeatOption::Week,
            format!("every month, {} {weekday}", ordinal(week)),
        ),
    ]
}

fn yearly_options(anchor: NaiveDate) -> Vec<RepeatChoice> {
    if anchor.month() == 2 && anchor.day() == 29 {
        return vec![
            RepeatChoice::new(RepeatOption::Leap, "every year Feb 29"),
            RepeatChoice::new(RepeatOption::LastDay, "last day of February every year"),
        ];
    }

    vec![RepeatChoice::new(
        RepeatOption::Date,
        format!(
            "every year on {} {}",
            month_abbrev(anchor.month()),
            anchor.day()
        ),
    )]
}
