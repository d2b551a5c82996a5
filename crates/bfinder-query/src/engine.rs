//! The birthday query engine.
//!
//! Three derived views over the decrypted table, each a pure function of
//! (today, table): records whose birthday is today, records whose birthday
//! falls on the next `n` distinct future days, and records whose birthday
//! was exactly yesterday.  The table is read through a shared `Arc` and
//! never mutated; every call allocates fresh output rows.
//!
//! Window semantics are deliberately asymmetric: a birthday occurring today
//! appears only in the today view — upcoming requires a strictly positive
//! day delta, and missed looks back exactly one day.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use bfinder_records::{PersonRecord, RecordStore};

use crate::clock::Clock;
use crate::error::{QueryError, Result};
use crate::view::{MissedRow, TodayRow, UpcomingRow};

/// Display format for every date column: day-month-year.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Format a date for display.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// This year's occurrence of a birthday: `dob`'s month/day with `year`
/// substituted.  Feb 29 celebrates on Feb 28 in non-leap years.
pub fn occurrence_in_year(dob: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, dob.month(), dob.day()).unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(year, 2, 28).expect("Feb 28 exists in every year")
    })
}

// ---------------------------------------------------------------------------
// View computation (pure functions, testable)
// ---------------------------------------------------------------------------

/// Records whose birthday is `today` (month/day match, year ignored), in
/// source-table order.
pub fn today_rows(records: &[PersonRecord], today: NaiveDate) -> Vec<TodayRow> {
    records
        .iter()
        .filter(|person| {
            let dob = person.dob.date();
            dob.month() == today.month() && dob.day() == today.day()
        })
        .map(|person| {
            let dob = person.dob.date();
            TodayRow {
                name: person.name.clone(),
                dob: format_date(dob),
                age: today.year() - dob.year(),
                section: person.section.clone(),
                contact: person.contact.clone(),
                roll_no: person.roll_no.clone(),
                registration_no: person.registration_no.clone(),
                gender: person.gender.clone(),
                residency: person.residency.clone(),
                email: person.email.clone(),
            }
        })
        .collect()
}

/// Records whose next birthday falls on one of the `days` nearest distinct
/// future calendar days, grouped by ascending date (source order within a
/// day).  `days` counts calendar days, not rows; a birthday occurring today
/// is excluded.
pub fn upcoming_rows(records: &[PersonRecord], today: NaiveDate, days: usize) -> Vec<UpcomingRow> {
    // Next occurrence and day delta per record; delta 0 (today) is excluded.
    let occurrences: Vec<Option<(i64, NaiveDate)>> = records
        .iter()
        .map(|person| {
            let dob = person.dob.date();
            let mut occurrence = occurrence_in_year(dob, today.year());
            if occurrence < today {
                occurrence = occurrence_in_year(dob, today.year() + 1);
            }
            let delta = (occurrence - today).num_days();
            (delta > 0).then_some((delta, occurrence))
        })
        .collect();

    let selected: BTreeSet<i64> = occurrences
        .iter()
        .flatten()
        .map(|&(delta, _)| delta)
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .take(days)
        .collect();

    let mut rows = Vec::new();
    for wanted in &selected {
        for (person, occurrence) in records.iter().zip(occurrences.iter()) {
            let Some((delta, date)) = occurrence else {
                continue;
            };
            if delta != wanted {
                continue;
            }
            let dob = person.dob.date();
            rows.push(UpcomingRow {
                birthday_date: format_date(*date),
                name: person.name.clone(),
                dob: format_date(dob),
                age_on_day: date.year() - dob.year(),
                section: person.section.clone(),
                email: person.email.clone(),
            });
        }
    }
    rows
}

/// Records whose birthday was exactly `yesterday` (month/day match), in
/// source-table order.
pub fn missed_rows(records: &[PersonRecord], yesterday: NaiveDate) -> Vec<MissedRow> {
    records
        .iter()
        .filter(|person| {
            let dob = person.dob.date();
            dob.month() == yesterday.month() && dob.day() == yesterday.day()
        })
        .map(|person| {
            let dob = person.dob.date();
            MissedRow {
                missed_date: format_date(yesterday),
                name: person.name.clone(),
                dob: format_date(dob),
                age_on_missed: yesterday.year() - dob.year(),
                section: person.section.clone(),
                email: person.email.clone(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Query engine over a shared [`RecordStore`].
///
/// Each call obtains the decrypted table (triggering the one-time load if
/// needed), applies the view's predicate, and returns freshly allocated
/// rows.  No state is held across calls.
pub struct QueryEngine {
    store: Arc<RecordStore>,
}

impl QueryEngine {
    /// Create an engine over `store`.
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Records with a birthday today.  An empty result is not an error.
    pub fn today(&self, clock: &dyn Clock) -> Result<Vec<TodayRow>> {
        let today = clock.today();
        let table = self.store.get_table()?;
        let rows = today_rows(table.records(), today);
        debug!(%today, matches = rows.len(), "computed today view");
        Ok(rows)
    }

    /// Records with a birthday on the next `days` distinct future calendar
    /// days.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidArgument`] for `days == 0` before the
    /// table is touched.  Fewer than `days` distinct future days in the data
    /// is not an error; all available days are returned.
    pub fn upcoming(&self, clock: &dyn Clock, days: usize) -> Result<Vec<UpcomingRow>> {
        if days == 0 {
            return Err(QueryError::InvalidArgument(
                "upcoming window must cover at least one day".into(),
            ));
        }
        let today = clock.today();
        let table = self.store.get_table()?;
        let rows = upcoming_rows(table.records(), today, days);
        debug!(%today, days, matches = rows.len(), "computed upcoming view");
        Ok(rows)
    }

    /// Records whose birthday was yesterday.  An empty result is not an
    /// error.
    pub fn missed(&self, clock: &dyn Clock) -> Result<Vec<MissedRow>> {
        let today = clock.today();
        let Some(yesterday) = today.pred_opt() else {
            return Ok(Vec::new());
        };
        let table = self.store.get_table()?;
        let rows = missed_rows(table.records(), yesterday);
        debug!(%yesterday, matches = rows.len(), "computed missed view");
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, dob: (i32, u32, u32)) -> PersonRecord {
        PersonRecord {
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            section: "A".to_string(),
            contact: "9876543210".to_string(),
            roll_no: "001".to_string(),
            registration_no: "2020000001".to_string(),
            gender: "Female".to_string(),
            residency: "Hosteller".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_matches_month_day_any_year() {
        let records = vec![
            person("A", (1990, 3, 15)),
            person("B", (2003, 3, 15)),
            person("C", (1995, 3, 16)),
        ];

        let rows = today_rows(&records, date(2024, 3, 15));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].age, 34);
        assert_eq!(rows[0].dob, "15-03-1990");
        assert_eq!(rows[1].age, 21);
    }

    #[test]
    fn today_empty_when_none_match() {
        let records = vec![person("A", (1990, 3, 14))];
        assert!(today_rows(&records, date(2024, 3, 15)).is_empty());
    }

    #[test]
    fn upcoming_excludes_today_strictly() {
        let records = vec![person("Today", (1990, 3, 15)), person("Next", (1995, 3, 16))];

        let rows = upcoming_rows(&records, date(2024, 3, 15), 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Next");
        assert_eq!(rows[0].birthday_date, "16-03-2024");
        assert_eq!(rows[0].age_on_day, 29);
    }

    #[test]
    fn upcoming_counts_distinct_days_not_rows() {
        let records = vec![
            person("A", (1990, 3, 16)),
            person("B", (1992, 3, 16)),
            person("C", (1994, 3, 20)),
            person("D", (1996, 3, 25)),
        ];

        // Two distinct days: 16th (two people) and 20th.
        let rows = upcoming_rows(&records, date(2024, 3, 15), 2);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(rows[0].birthday_date, rows[1].birthday_date);
    }

    #[test]
    fn upcoming_wraps_past_birthdays_into_next_year() {
        let records = vec![person("Jan", (2000, 1, 10)), person("Dec", (2000, 12, 20))];

        let rows = upcoming_rows(&records, date(2024, 12, 15), 2);
        assert_eq!(rows[0].name, "Dec");
        assert_eq!(rows[0].birthday_date, "20-12-2024");
        assert_eq!(rows[0].age_on_day, 24);
        assert_eq!(rows[1].name, "Jan");
        assert_eq!(rows[1].birthday_date, "10-01-2025");
        assert_eq!(rows[1].age_on_day, 25);
    }

    #[test]
    fn upcoming_monotonic_in_days() {
        let records = vec![
            person("A", (1990, 3, 16)),
            person("B", (1992, 3, 20)),
            person("C", (1994, 4, 1)),
        ];
        let today = date(2024, 3, 15);

        for n in 1..4 {
            let smaller = upcoming_rows(&records, today, n);
            let larger = upcoming_rows(&records, today, n + 1);
            assert_eq!(&larger[..smaller.len()], &smaller[..]);
        }
    }

    #[test]
    fn upcoming_returns_fewer_days_without_error() {
        let records = vec![person("A", (1990, 3, 16))];
        let rows = upcoming_rows(&records, date(2024, 3, 15), 10);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn feb29_clamps_to_feb28_in_common_years() {
        let records = vec![person("Leap", (2000, 2, 29))];

        // 2025 is not a leap year; the occurrence is Feb 28.
        let rows = upcoming_rows(&records, date(2025, 2, 20), 1);
        assert_eq!(rows[0].birthday_date, "28-02-2025");
        assert_eq!(rows[0].age_on_day, 25);
    }

    #[test]
    fn missed_is_exactly_yesterday() {
        let records = vec![
            person("Yesterday", (2000, 3, 14)),
            person("Today", (2000, 3, 15)),
            person("TwoDaysAgo", (2000, 3, 13)),
        ];

        let rows = missed_rows(&records, date(2024, 3, 14));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Yesterday");
        assert_eq!(rows[0].missed_date, "14-03-2024");
        assert_eq!(rows[0].age_on_missed, 24);
    }

    #[test]
    fn missed_crosses_month_boundary() {
        let records = vec![person("EndOfApril", (1998, 4, 30))];
        let rows = missed_rows(&records, date(2024, 5, 1).pred_opt().unwrap());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].missed_date, "30-04-2024");
    }

    #[test]
    fn missed_crosses_year_boundary() {
        let records = vec![person("NewYearsEve", (1998, 12, 31))];
        let rows = missed_rows(&records, date(2025, 1, 1).pred_opt().unwrap());
        assert_eq!(rows[0].missed_date, "31-12-2024");
        assert_eq!(rows[0].age_on_missed, 26);
    }

    #[test]
    fn occurrence_substitutes_year() {
        assert_eq!(
            occurrence_in_year(date(1990, 3, 15), 2024),
            date(2024, 3, 15)
        );
        assert_eq!(occurrence_in_year(date(2000, 2, 29), 2024), date(2024, 2, 29));
        assert_eq!(occurrence_in_year(date(2000, 2, 29), 2025), date(2025, 2, 28));
    }
}
