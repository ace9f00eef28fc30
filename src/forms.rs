// Form validation for the two request forms
//
// A submission is all-or-nothing: either every required field is present and
// a complete record is produced, or nothing is written.

use crate::store::{
    CareerInterest, CareerRequest, Country, EducationLevel, Interest, Interests,
    MentorshipRequest, PreferredComms, RequestStatus,
};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::Deserialize;
use std::fmt;

/// Message shown when a required field is missing
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill required fields (*)";

/// Form rejected before anything was persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// One or more required (*) fields were blank
    MissingRequired(Vec<&'static str>),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired(_) => f.write_str(REQUIRED_FIELDS_MESSAGE),
        }
    }
}

impl std::error::Error for FormError {}

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Tutoring request form
#[derive(Debug, Clone, Deserialize)]
pub struct MentorshipForm {
    #[serde(default)]
    pub name: String,
    pub country: Country,
    #[serde(default)]
    pub contact: String,
    pub education_level: EducationLevel,
    #[serde(default)]
    pub interests: Vec<Interest>,
    pub preferred_comms: PreferredComms,
}

impl MentorshipForm {
    /// Validate and build a Pending request stamped `timestamp`
    pub fn into_request(self, timestamp: NaiveDateTime) -> Result<MentorshipRequest, FormError> {
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.contact) {
            missing.push("contact");
        }
        if self.interests.is_empty() {
            missing.push("interests");
        }
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        Ok(MentorshipRequest {
            timestamp,
            name: self.name.trim().to_string(),
            country: self.country,
            interests: Interests::new(self.interests),
            contact: self.contact.trim().to_string(),
            status: RequestStatus::Pending,
            notes: String::new(),
            education_level: Some(self.education_level),
            preferred_comms: Some(self.preferred_comms),
        })
    }
}

/// Career guidance form
#[derive(Debug, Clone, Deserialize)]
pub struct CareerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub career_interest: CareerInterest,
}

impl CareerForm {
    pub fn into_request(self, timestamp: NaiveDateTime) -> Result<CareerRequest, FormError> {
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        Ok(CareerRequest {
            timestamp,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            career_interest: self.career_interest,
        })
    }
}
