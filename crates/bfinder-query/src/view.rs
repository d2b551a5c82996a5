//! Ephemeral, per-call view row types.
//!
//! Each view kind has its own column set; serde renames carry the display
//! column names so serialized output (JSON, HTML tables) matches the
//! dashboard headers.  `COLUMNS`/`values` pairs give renderers an ordered
//! view without reflection.

use serde::{Deserialize, Serialize};

/// One row of the "today" view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayRow {
    #[serde(rename = "Name")]
    pub name: String,
    /// DOB formatted `dd-mm-YYYY`.
    #[serde(rename = "DOB")]
    pub dob: String,
    #[serde(rename = "Age")]
    pub age: i32,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Contact No.")]
    pub contact: String,
    #[serde(rename = "Roll No")]
    pub roll_no: String,
    #[serde(rename = "Registration No")]
    pub registration_no: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Hosteller Or Day Scholar")]
    pub residency: String,
    #[serde(rename = "Email ID")]
    pub email: String,
}

impl TodayRow {
    /// Display column headers, in order.
    pub const COLUMNS: [&'static str; 10] = [
        "Name",
        "DOB",
        "Age",
        "Section",
        "Contact No.",
        "Roll No",
        "Registration No",
        "Gender",
        "Hosteller Or Day Scholar",
        "Email ID",
    ];

    /// Cell values in [`Self::COLUMNS`] order.
    pub fn values(&self) -> [String; 10] {
        [
            self.name.clone(),
            self.dob.clone(),
            self.age.to_string(),
            self.section.clone(),
            self.contact.clone(),
            self.roll_no.clone(),
            self.registration_no.clone(),
            self.gender.clone(),
            self.residency.clone(),
            self.email.clone(),
        ]
    }
}

/// One row of the "upcoming" view.  Rows sharing a `birthday_date` group
/// together; the engine emits them in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRow {
    /// The future occurrence, formatted `dd-mm-YYYY`.
    #[serde(rename = "Birthday Date")]
    pub birthday_date: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// DOB formatted `dd-mm-YYYY`.
    #[serde(rename = "DOB")]
    pub dob: String,
    /// Age the person turns on the occurrence date.
    #[serde(rename = "Age on Day")]
    pub age_on_day: i32,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Email ID")]
    pub email: String,
}

impl UpcomingRow {
    /// Display column headers, in order.
    pub const COLUMNS: [&'static str; 6] = [
        "Birthday Date",
        "Name",
        "DOB",
        "Age on Day",
        "Section",
        "Email ID",
    ];
}

/// One row of the "missed" (yesterday) view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedRow {
    /// Yesterday's date, formatted `dd-mm-YYYY`.
    #[serde(rename = "Missed Date")]
    pub missed_date: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// DOB formatted `dd-mm-YYYY`.
    #[serde(rename = "DOB")]
    pub dob: String,
    /// Age the person turned yesterday.
    #[serde(rename = "Age on Missed")]
    pub age_on_missed: i32,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Email ID")]
    pub email: String,
}

impl MissedRow {
    /// Display column headers, in order.
    pub const COLUMNS: [&'static str; 6] = [
        "Missed Date",
        "Name",
        "DOB",
        "Age on Missed",
        "Section",
        "Email ID",
    ];
}
