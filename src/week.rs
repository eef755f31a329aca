use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeekError {
    #[error("invalid month {0}")]
    Month(u32),
    #[error("week {week} does not exist in {year}-{month:02}")]
    Week { year: i32, month: u32, week: u32 },
}

/// A week of a month. Week 1 is the Monday-to-Sunday week holding the 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WeekRequest {
    pub year: i32,
    pub month: u32,
    pub week: u32,
}

impl WeekRequest {
    pub fn new(year: i32, month: u32, week: u32) -> Self {
        Self { year, month, week }
    }

    /// The week of its own month that `date` falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let offset = (monday_of(date) - monday_of(first)).num_days();
        Self {
            year: date.year(),
            month: date.month(),
            week: (offset / 7) as u32 + 1,
        }
    }

    /// Monday and Sunday of the week.
    pub fn dates(&self) -> Result<(NaiveDate, NaiveDate), WeekError> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or(WeekError::Month(self.month))?;
        let invalid = WeekError::Week {
            year: self.year,
            month: self.month,
            week: self.week,
        };
        if self.week == 0 {
            return Err(invalid);
        }

        let start = monday_of(first) + Duration::weeks(i64::from(self.week - 1));
        if start > last_day_of_month(first) {
            return Err(invalid);
        }
        Ok((start, start + Duration::days(6)))
    }
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|n| n - Duration::days(1)).unwrap_or(first)
}
