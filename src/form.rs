//! The review form: one editable value per [`CandidateProfile`] attribute.
//!
//! Lists are edited as `", "`-joined text and split back on submit. Text
//! fields that map to optional payload fields turn into `None` when left
//! blank, so the service receives `null` rather than `""`.

use crate::error::WorkflowError;
use crate::profile::{CandidateProfile, ExtractedProfile, HoursAWeek, SalaryPeriod, TravelMode};
use std::fmt;

/// Age shown when the extraction did not find one.
pub const DEFAULT_AGE: u32 = 18;

/// Every field of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    EmploymentStatus,
    CurrentEmployer,
    CurrentPosition,
    Age,
    Location,
    RecruiterName,
    ContactName,
    HardSkills,
    ExperienceDescription,
    YearsOfExperience,
    GraduationStatus,
    Degree,
    TargetRoles,
    Ambitions,
    TravelMode,
    MinutesOfRoad,
    OnSiteDays,
    GrossSalary,
    SalaryPeriod,
    HoursAWeek,
    JobDescriptionText,
}

impl FormField {
    pub const ALL: [FormField; 22] = [
        FormField::Name,
        FormField::EmploymentStatus,
        FormField::CurrentEmployer,
        FormField::CurrentPosition,
        FormField::Age,
        FormField::Location,
        FormField::RecruiterName,
        FormField::ContactName,
        FormField::HardSkills,
        FormField::ExperienceDescription,
        FormField::YearsOfExperience,
        FormField::GraduationStatus,
        FormField::Degree,
        FormField::TargetRoles,
        FormField::Ambitions,
        FormField::TravelMode,
        FormField::MinutesOfRoad,
        FormField::OnSiteDays,
        FormField::GrossSalary,
        FormField::SalaryPeriod,
        FormField::HoursAWeek,
        FormField::JobDescriptionText,
    ];

    /// JSON key of the field in the submit payload.
    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::EmploymentStatus => "employmentStatus",
            FormField::CurrentEmployer => "currentEmployer",
            FormField::CurrentPosition => "currentPosition",
            FormField::Age => "age",
            FormField::Location => "location",
            FormField::RecruiterName => "recruiterName",
            FormField::ContactName => "contactName",
            FormField::HardSkills => "hardSkills",
            FormField::ExperienceDescription => "experienceDescription",
            FormField::YearsOfExperience => "yearsOfExperience",
            FormField::GraduationStatus => "graduationStatus",
            FormField::Degree => "degree",
            FormField::TargetRoles => "targetRoles",
            FormField::Ambitions => "ambitions",
            FormField::TravelMode => "travelMode",
            FormField::MinutesOfRoad => "minutesOfRoad",
            FormField::OnSiteDays => "onSiteDays",
            FormField::GrossSalary => "grossSalary",
            FormField::SalaryPeriod => "salaryPeriod",
            FormField::HoursAWeek => "hoursAWeek",
            FormField::JobDescriptionText => "jobDescriptionText",
        }
    }

    /// Human label used when prompting.
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Candidate Name",
            FormField::EmploymentStatus => "Is candidate unemployed?",
            FormField::CurrentEmployer => "Current Employer",
            FormField::CurrentPosition => "Current Position",
            FormField::Age => "Age",
            FormField::Location => "Location",
            FormField::RecruiterName => "Recruiter Name",
            FormField::ContactName => "Contact Name",
            FormField::HardSkills => "Hard Skills (comma separated)",
            FormField::ExperienceDescription => "Experience Description",
            FormField::YearsOfExperience => "Years of Experience",
            FormField::GraduationStatus => "Is candidate ungraduated?",
            FormField::Degree => "Degree",
            FormField::TargetRoles => "Target Roles (comma separated)",
            FormField::Ambitions => "Ambitions",
            FormField::TravelMode => "Travel Mode (car, public transport, bicycle, on walk)",
            FormField::MinutesOfRoad => "Minutes of Road (comma separated)",
            FormField::OnSiteDays => "On Site Days (comma separated)",
            FormField::GrossSalary => "Gross Salary",
            FormField::SalaryPeriod => "Salary Period (year, month)",
            FormField::HoursAWeek => "Hours a Week (8, 16, 24, 32, 40)",
            FormField::JobDescriptionText => "Job Description Text",
        }
    }

    /// Look a field up by its payload key, ignoring case.
    pub fn from_key(key: &str) -> Result<FormField, WorkflowError> {
        let wanted = key.trim();
        if wanted.eq_ignore_ascii_case("candidateName") {
            return Ok(FormField::Name);
        }
        FormField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WorkflowError::UnknownField(wanted.to_string()))
    }

    /// Whether clearing this field sends `null`.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            FormField::CurrentEmployer
                | FormField::CurrentPosition
                | FormField::Degree
                | FormField::Ambitions
                | FormField::TravelMode
                | FormField::JobDescriptionText
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Editable state of the review step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub employment_status: bool,
    pub current_employer: String,
    pub current_position: String,
    pub age: u32,
    pub location: String,
    pub recruiter_name: String,
    pub contact_name: String,
    pub hard_skills: String,
    pub experience_description: String,
    pub years_of_experience: u32,
    pub graduation_status: bool,
    pub degree: String,
    pub target_roles: String,
    pub ambitions: String,
    pub travel_mode: Option<TravelMode>,
    pub minutes_of_road: String,
    pub on_site_days: String,
    pub gross_salary: u64,
    pub salary_period: SalaryPeriod,
    pub hours_a_week: HoursAWeek,
    pub job_description_text: String,
}

impl ProfileForm {
    /// Pre-populate the form from an extraction result.
    pub fn from_extracted(p: &ExtractedProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let ints = |v: &Option<Vec<i64>>| {
            v.as_deref()
                .map(|items| join_list(items.iter().map(|i| i.to_string())))
                .unwrap_or_default()
        };
        let strings = |v: &Option<Vec<String>>| {
            v.as_deref()
                .map(|items| join_list(items.iter().cloned()))
                .unwrap_or_default()
        };

        Self {
            name: p.display_name().unwrap_or_default().to_string(),
            employment_status: p.employment_status.unwrap_or(false),
            current_employer: text(&p.current_employer),
            current_position: text(&p.current_position),
            age: p.age.map(floor_u32).unwrap_or(DEFAULT_AGE),
            location: text(&p.location),
            recruiter_name: text(&p.recruiter_name),
            contact_name: text(&p.contact_name),
            hard_skills: strings(&p.hard_skills),
            experience_description: text(&p.experience_description),
            years_of_experience: p.years_of_experience.map(floor_u32).unwrap_or(0),
            graduation_status: p.graduation_status.unwrap_or(false),
            degree: text(&p.degree),
            target_roles: strings(&p.target_roles),
            ambitions: text(&p.ambitions),
            travel_mode: p.travel_mode,
            minutes_of_road: ints(&p.minutes_of_road),
            on_site_days: ints(&p.on_site_days),
            gross_salary: p.gross_salary.map(|v| v.max(0) as u64).unwrap_or(0),
            salary_period: p.salary_period.unwrap_or_default(),
            hours_a_week: p.hours_a_week.unwrap_or_default(),
            job_description_text: text(&p.job_description_text),
        }
    }

    /// Current value of a field as the user would see it.
    pub fn get(&self, field: FormField) -> String {
        match field {
            FormField::Name => self.name.clone(),
            FormField::EmploymentStatus => self.employment_status.to_string(),
            FormField::CurrentEmployer => self.current_employer.clone(),
            FormField::CurrentPosition => self.current_position.clone(),
            FormField::Age => self.age.to_string(),
            FormField::Location => self.location.clone(),
            FormField::RecruiterName => self.recruiter_name.clone(),
            FormField::ContactName => self.contact_name.clone(),
            FormField::HardSkills => self.hard_skills.clone(),
            FormField::ExperienceDescription => self.experience_description.clone(),
            FormField::YearsOfExperience => self.years_of_experience.to_string(),
            FormField::GraduationStatus => self.graduation_status.to_string(),
            FormField::Degree => self.degree.clone(),
            FormField::TargetRoles => self.target_roles.clone(),
            FormField::Ambitions => self.ambitions.clone(),
            FormField::TravelMode => self
                .travel_mode
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            FormField::MinutesOfRoad => self.minutes_of_road.clone(),
            FormField::OnSiteDays => self.on_site_days.clone(),
            FormField::GrossSalary => self.gross_salary.to_string(),
            FormField::SalaryPeriod => self.salary_period.to_string(),
            FormField::HoursAWeek => self.hours_a_week.to_string(),
            FormField::JobDescriptionText => self.job_description_text.clone(),
        }
    }

    /// Apply one user edit. On error the field keeps its previous value.
    pub fn set(&mut self, field: FormField, raw: &str) -> Result<(), WorkflowError> {
        let invalid = |reason: String| WorkflowError::InvalidFieldValue {
            field: field.key(),
            value: raw.to_string(),
            reason,
        };

        match field {
            FormField::Name => self.name = raw.to_string(),
            FormField::CurrentEmployer => self.current_employer = raw.to_string(),
            FormField::CurrentPosition => self.current_position = raw.to_string(),
            FormField::Location => self.location = raw.to_string(),
            FormField::RecruiterName => self.recruiter_name = raw.to_string(),
            FormField::ContactName => self.contact_name = raw.to_string(),
            FormField::HardSkills => self.hard_skills = raw.to_string(),
            FormField::ExperienceDescription => self.experience_description = raw.to_string(),
            FormField::Degree => self.degree = raw.to_string(),
            FormField::TargetRoles => self.target_roles = raw.to_string(),
            FormField::Ambitions => self.ambitions = raw.to_string(),
            FormField::MinutesOfRoad => self.minutes_of_road = raw.to_string(),
            FormField::OnSiteDays => self.on_site_days = raw.to_string(),
            FormField::JobDescriptionText => self.job_description_text = raw.to_string(),

            FormField::EmploymentStatus => {
                self.employment_status = parse_bool(raw).map_err(invalid)?
            }
            FormField::GraduationStatus => {
                self.graduation_status = parse_bool(raw).map_err(invalid)?
            }

            FormField::Age => self.age = floor_u32(parse_int(raw).map_err(invalid)?),
            FormField::YearsOfExperience => {
                self.years_of_experience = floor_u32(parse_int(raw).map_err(invalid)?)
            }
            FormField::GrossSalary => {
                self.gross_salary = parse_int(raw).map_err(invalid)?.max(0) as u64
            }

            FormField::TravelMode => {
                self.travel_mode = if raw.trim().is_empty() {
                    None
                } else {
                    Some(raw.parse().map_err(invalid)?)
                }
            }
            FormField::SalaryPeriod => self.salary_period = raw.parse().map_err(invalid)?,
            FormField::HoursAWeek => self.hours_a_week = raw.parse().map_err(invalid)?,
        }
        Ok(())
    }

    /// Build the submit payload.
    pub fn to_profile(&self) -> CandidateProfile {
        CandidateProfile {
            name: self.name.clone(),
            employment_status: self.employment_status,
            current_employer: non_blank(&self.current_employer),
            current_position: non_blank(&self.current_position),
            age: self.age,
            location: self.location.clone(),
            recruiter_name: self.recruiter_name.clone(),
            contact_name: self.contact_name.clone(),
            hard_skills: split_list(&self.hard_skills),
            experience_description: self.experience_description.clone(),
            years_of_experience: self.years_of_experience,
            graduation_status: self.graduation_status,
            degree: non_blank(&self.degree),
            target_roles: split_list(&self.target_roles),
            ambitions: non_blank(&self.ambitions),
            travel_mode: self.travel_mode,
            minutes_of_road: split_int_list(&self.minutes_of_road),
            on_site_days: split_int_list(&self.on_site_days),
            gross_salary: self.gross_salary,
            salary_period: self.salary_period,
            hours_a_week: self.hours_a_week,
            job_description_text: non_blank(&self.job_description_text),
        }
    }
}

// ── List text rules ──────────────────────────────────────────────────────

/// Render a list for editing.
pub fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split edited text on commas, trimming entries and dropping empty ones.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`split_list`], keeping only entries that are non-negative integers.
pub fn split_int_list(text: &str) -> Vec<u64> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn floor_u32(v: i64) -> u32 {
    v.clamp(0, u32::MAX as i64) as u32
}

fn parse_int(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|_| "expected a whole number".to_string())
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err("expected yes or no".to_string()),
    }
}
