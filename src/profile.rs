//! Candidate records exchanged with the service.
//!
//! [`ExtractedProfile`] is what the extraction endpoint returns: every field
//! may be missing, numbers may arrive as floats or strings, and empty
//! strings stand in for "not found". [`CandidateProfile`] is what we send
//! back: every field present, optional text as JSON `null`.
//!
//! Enum values outside their declared set are rejected while decoding. A
//! model that invents a travel mode is a service defect, and guessing a
//! replacement would put words in the candidate's mouth.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ── Enums ────────────────────────────────────────────────────────────────

/// How the candidate gets to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelMode {
    #[serde(rename = "car")]
    Car,
    #[serde(rename = "public transport", alias = "public-transport")]
    PublicTransport,
    #[serde(rename = "bicycle")]
    Bicycle,
    #[serde(rename = "on walk", alias = "on-foot")]
    OnFoot,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Car,
        TravelMode::PublicTransport,
        TravelMode::Bicycle,
        TravelMode::OnFoot,
    ];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Car => "car",
            TravelMode::PublicTransport => "public transport",
            TravelMode::Bicycle => "bicycle",
            TravelMode::OnFoot => "on walk",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(TravelMode::Car),
            "public transport" | "public-transport" | "public_transport" => {
                Ok(TravelMode::PublicTransport)
            }
            "bicycle" | "bike" => Ok(TravelMode::Bicycle),
            "on walk" | "on-foot" | "on foot" => Ok(TravelMode::OnFoot),
            other => Err(format!(
                "expected one of car, public transport, bicycle, on walk; got '{other}'"
            )),
        }
    }
}

/// Period the gross salary refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    #[default]
    Year,
    Month,
}

impl SalaryPeriod {
    pub const ALL: [SalaryPeriod; 2] = [SalaryPeriod::Year, SalaryPeriod::Month];

    pub fn as_str(self) -> &'static str {
        match self {
            SalaryPeriod::Year => "year",
            SalaryPeriod::Month => "month",
        }
    }
}

impl fmt::Display for SalaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" | "yearly" => Ok(SalaryPeriod::Year),
            "month" | "monthly" => Ok(SalaryPeriod::Month),
            other => Err(format!("expected year or month, got '{other}'")),
        }
    }
}

/// Contract size in hours per week. Sent as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum HoursAWeek {
    #[default]
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
    Forty,
}

impl HoursAWeek {
    pub const ALL: [HoursAWeek; 5] = [
        HoursAWeek::Eight,
        HoursAWeek::Sixteen,
        HoursAWeek::TwentyFour,
        HoursAWeek::ThirtyTwo,
        HoursAWeek::Forty,
    ];

    pub fn hours(self) -> u32 {
        match self {
            HoursAWeek::Eight => 8,
            HoursAWeek::Sixteen => 16,
            HoursAWeek::TwentyFour => 24,
            HoursAWeek::ThirtyTwo => 32,
            HoursAWeek::Forty => 40,
        }
    }
}

impl From<HoursAWeek> for u32 {
    fn from(h: HoursAWeek) -> Self {
        h.hours()
    }
}

impl TryFrom<u32> for HoursAWeek {
    type Error = String;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        HoursAWeek::ALL
            .into_iter()
            .find(|h| h.hours() == hours)
            .ok_or_else(|| format!("hours a week must be one of 8, 16, 24, 32, 40; got {hours}"))
    }
}

impl fmt::Display for HoursAWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hours())
    }
}

impl FromStr for HoursAWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hours: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("expected a number of hours, got '{}'", s.trim()))?;
        HoursAWeek::try_from(hours)
    }
}

// ── Submit payload ───────────────────────────────────────────────────────

/// The reviewed record sent to the generation endpoint.
///
/// `Option` fields serialise as `null` when empty; they are never skipped
/// and never sent as `""`. There is no job-description file field: the
/// client does not support attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: String,
    pub employment_status: bool,
    pub current_employer: Option<String>,
    pub current_position: Option<String>,
    pub age: u32,
    pub location: String,
    pub recruiter_name: String,
    pub contact_name: String,
    pub hard_skills: Vec<String>,
    pub experience_description: String,
    pub years_of_experience: u32,
    pub graduation_status: bool,
    pub degree: Option<String>,
    pub target_roles: Vec<String>,
    pub ambitions: Option<String>,
    pub travel_mode: Option<TravelMode>,
    pub minutes_of_road: Vec<u64>,
    pub on_site_days: Vec<u64>,
    pub gross_salary: u64,
    pub salary_period: SalaryPeriod,
    pub hours_a_week: HoursAWeek,
    pub job_description_text: Option<String>,
}

// ── Extraction record ────────────────────────────────────────────────────

/// The partial record returned by the extraction endpoint.
///
/// Unknown keys are ignored. Numbers are kept signed here; flooring at
/// zero happens when the form is rendered. Some services answer with
/// `candidateName`, some with `name`, some with both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedProfile {
    pub name: Option<String>,
    pub candidate_name: Option<String>,
    pub employment_status: Option<bool>,
    pub current_employer: Option<String>,
    pub current_position: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub age: Option<i64>,
    pub location: Option<String>,
    pub recruiter_name: Option<String>,
    pub contact_name: Option<String>,
    pub hard_skills: Option<Vec<String>>,
    pub experience_description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub years_of_experience: Option<i64>,
    pub graduation_status: Option<bool>,
    pub degree: Option<String>,
    pub target_roles: Option<Vec<String>>,
    pub ambitions: Option<String>,
    #[serde(deserialize_with = "lenient::opt_choice")]
    pub travel_mode: Option<TravelMode>,
    #[serde(deserialize_with = "lenient::opt_int_list")]
    pub minutes_of_road: Option<Vec<i64>>,
    #[serde(deserialize_with = "lenient::opt_int_list")]
    pub on_site_days: Option<Vec<i64>>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub gross_salary: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_choice")]
    pub salary_period: Option<SalaryPeriod>,
    #[serde(deserialize_with = "lenient::opt_hours")]
    pub hours_a_week: Option<HoursAWeek>,
    pub job_description_text: Option<String>,
}

impl ExtractedProfile {
    /// Decode an extraction response body.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        ExtractedProfile::deserialize(value)
    }

    /// `name`, falling back to `candidateName`.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.candidate_name.as_deref())
    }
}

/// Deserialisers that accept the loose shapes a model-backed service emits.
mod lenient {
    use super::*;

    pub(super) fn int_from_value(v: &Value) -> Option<i64> {
        match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn opt_int<'de, D>(d: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(v) => int_from_value(&v)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("expected an integer, got {v}"))),
        }
    }

    /// Entries that are not integers are dropped, matching how the form
    /// treats integer lists on submit.
    pub fn opt_int_list<'de, D>(d: D) -> Result<Option<Vec<i64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.iter().filter_map(int_from_value).collect())),
            Some(v) => Err(de::Error::custom(format!("expected a list of integers, got {v}"))),
        }
    }

    /// An empty string means "not found"; anything else must name a variant.
    pub fn opt_choice<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr<Err = String>,
    {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => s.parse().map(Some).map_err(de::Error::custom),
        }
    }

    /// Zero means "not found"; other values must be one of the options.
    pub fn opt_hours<'de, D>(d: D) -> Result<Option<HoursAWeek>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match opt_int(d)? {
            None | Some(0) => Ok(None),
            Some(h) => u32::try_from(h)
                .map_err(|_| format!("hours a week must be one of 8, 16, 24, 32, 40; got {h}"))
                .and_then(HoursAWeek::try_from)
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn travel_mode_uses_service_wording() {
        assert_eq!(
            serde_json::to_value(TravelMode::PublicTransport).unwrap(),
            json!("public transport")
        );
        assert_eq!(serde_json::to_value(TravelMode::OnFoot).unwrap(), json!("on walk"));
        let aliased: TravelMode = serde_json::from_value(json!("on-foot")).unwrap();
        assert_eq!(aliased, TravelMode::OnFoot);
    }

    #[test]
    fn hours_a_week_is_a_bare_integer() {
        assert_eq!(serde_json::to_value(HoursAWeek::Forty).unwrap(), json!(40));
        let h: HoursAWeek = serde_json::from_value(json!(24)).unwrap();
        assert_eq!(h, HoursAWeek::TwentyFour);
        assert!(serde_json::from_value::<HoursAWeek>(json!(12)).is_err());
    }

    #[test]
    fn extracted_profile_tolerates_partial_records() {
        let p = ExtractedProfile::from_json(&json!({
            "name": "Ada",
            "hardSkills": ["C++"],
            "travelMode": "car",
            "somethingElse": {"ignored": true}
        }))
        .unwrap();
        assert_eq!(p.name.as_deref(), Some("Ada"));
        assert_eq!(p.hard_skills, Some(vec!["C++".to_string()]));
        assert_eq!(p.travel_mode, Some(TravelMode::Car));
        assert_eq!(p.age, None);
        assert_eq!(p.hours_a_week, None);
    }

    #[test]
    fn extracted_profile_accepts_candidate_name_alias() {
        let p = ExtractedProfile::from_json(&json!({"candidateName": "Grace"})).unwrap();
        assert_eq!(p.display_name(), Some("Grace"));
    }

    #[test]
    fn name_and_candidate_name_together() {
        let p = ExtractedProfile::from_json(&json!({
            "name": "Ada",
            "candidateName": "Ada Lovelace"
        }))
        .unwrap();
        assert_eq!(p.display_name(), Some("Ada"));
        assert_eq!(p.candidate_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn loose_numbers_are_normalised() {
        let p = ExtractedProfile::from_json(&json!({
            "age": 31.0,
            "yearsOfExperience": "7",
            "grossSalary": null,
            "minutesOfRoad": [10, "x", "20", 30.5],
            "hoursAWeek": "32"
        }))
        .unwrap();
        assert_eq!(p.age, Some(31));
        assert_eq!(p.years_of_experience, Some(7));
        assert_eq!(p.gross_salary, None);
        assert_eq!(p.minutes_of_road, Some(vec![10, 20, 30]));
        assert_eq!(p.hours_a_week, Some(HoursAWeek::ThirtyTwo));
    }

    #[test]
    fn empty_enum_values_mean_absent() {
        let p = ExtractedProfile::from_json(&json!({
            "travelMode": "",
            "salaryPeriod": "",
            "hoursAWeek": 0
        }))
        .unwrap();
        assert_eq!(p.travel_mode, None);
        assert_eq!(p.salary_period, None);
        assert_eq!(p.hours_a_week, None);
    }

    #[test]
    fn invalid_enum_values_are_rejected() {
        assert!(ExtractedProfile::from_json(&json!({"travelMode": "plane"})).is_err());
        assert!(ExtractedProfile::from_json(&json!({"salaryPeriod": "week"})).is_err());
        assert!(ExtractedProfile::from_json(&json!({"hoursAWeek": 12})).is_err());
        assert!(ExtractedProfile::from_json(&json!({"hoursAWeek": -8})).is_err());
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(ExtractedProfile::from_json(&json!(["Ada"])).is_err());
    }
}
