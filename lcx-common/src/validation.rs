//! Submission validation
//!
//! Turns a [`CandidateResponse`] into a [`NewSurveyResponse`] or reports every
//! violated field at once. A record is accepted or rejected as a whole.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::models::{CandidateResponse, NetworkingInterest, NewSurveyResponse, Sector, KEY_SKILL_COUNT};

/// Minimum length of `name`, in characters
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum length of `profileDescription`
pub const PROFILE_DESCRIPTION_MAX_CHARS: usize = 100;
/// Maximum length of `eventGoal`
pub const EVENT_GOAL_MAX_CHARS: usize = 100;
/// Maximum length of `desiredConnections`
pub const DESIRED_CONNECTIONS_MAX_CHARS: usize = 150;
/// Maximum length of `offerToOthers`
pub const OFFER_TO_OTHERS_MAX_CHARS: usize = 150;

const REQUIRED: &str = "This field is required.";

/// Field-level violations, keyed by wire field name
///
/// Key skills are reported under `keySkills` for count problems and under
/// `keySkills.<index>` for individual blank entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation; the first message for a field wins
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a candidate submission
///
/// Pure; never partially accepts. When `sector` or `networkingInterest` is
/// `other`, the companion label stays optional.
pub fn validate(candidate: &CandidateResponse) -> Result<NewSurveyResponse, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required(&mut errors, "name", &candidate.name).and_then(|name| {
        if name.chars().count() < NAME_MIN_CHARS {
            errors.add(
                "name",
                format!("Name must be at least {} characters.", NAME_MIN_CHARS),
            );
            None
        } else {
            Some(name)
        }
    });

    let sector = choice(
        &mut errors,
        "sector",
        &candidate.sector,
        candidate.other_sector.as_deref(),
        Sector::parse,
        "Please select a sector.",
    );

    let origin = required(&mut errors, "origin", &candidate.origin);

    let linkedin_url = required(&mut errors, "linkedinUrl", &candidate.linkedin_url).and_then(
        |url| match Url::parse(url) {
            Ok(_) => Some(url),
            Err(_) => {
                errors.add("linkedinUrl", "Please enter a valid LinkedIn URL.");
                None
            }
        },
    );

    let profile_description = bounded(
        &mut errors,
        "profileDescription",
        &candidate.profile_description,
        PROFILE_DESCRIPTION_MAX_CHARS,
        "Description",
    );
    let event_goal = bounded(
        &mut errors,
        "eventGoal",
        &candidate.event_goal,
        EVENT_GOAL_MAX_CHARS,
        "Goal",
    );

    let networking_interest = choice(
        &mut errors,
        "networkingInterest",
        &candidate.networking_interest,
        candidate.other_networking_interest.as_deref(),
        NetworkingInterest::parse,
        "Please select a networking interest.",
    );

    let desired_connections = bounded(
        &mut errors,
        "desiredConnections",
        &candidate.desired_connections,
        DESIRED_CONNECTIONS_MAX_CHARS,
        "Description",
    );
    let offer_to_others = bounded(
        &mut errors,
        "offerToOthers",
        &candidate.offer_to_others,
        OFFER_TO_OTHERS_MAX_CHARS,
        "Description",
    );

    let key_skills = key_skills(&mut errors, candidate.key_skills.as_deref());

    // Every checker returns None exactly when it recorded a violation
    let (
        Some(name),
        Some(sector),
        Some(origin),
        Some(linkedin_url),
        Some(profile_description),
        Some(event_goal),
        Some(networking_interest),
        Some(desired_connections),
        Some(offer_to_others),
        Some(key_skills),
    ) = (
        name,
        sector,
        origin,
        linkedin_url,
        profile_description,
        event_goal,
        networking_interest,
        desired_connections,
        offer_to_others,
        key_skills,
    )
    else {
        return Err(errors);
    };
    debug_assert!(errors.is_empty());

    Ok(NewSurveyResponse {
        name: name.to_string(),
        sector,
        origin: origin.to_string(),
        linkedin_url: linkedin_url.to_string(),
        profile_description: profile_description.to_string(),
        event_goal: event_goal.to_string(),
        networking_interest,
        desired_connections: desired_connections.to_string(),
        offer_to_others: offer_to_others.to_string(),
        key_skills,
    })
}

fn required<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: &'a Option<String>,
) -> Option<&'a str> {
    match value {
        Some(value) => Some(value.as_str()),
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

fn bounded<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: &'a Option<String>,
    max_chars: usize,
    subject: &str,
) -> Option<&'a str> {
    let value = required(errors, field, value)?;
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("{} must be at most {} characters.", subject, max_chars),
        );
        return None;
    }
    Some(value)
}

fn choice<T>(
    errors: &mut ValidationErrors,
    field: &str,
    code: &Option<String>,
    other_label: Option<&str>,
    parse: fn(&str, Option<&str>) -> Option<T>,
    missing_message: &str,
) -> Option<T> {
    let Some(code) = code else {
        errors.add(field, missing_message);
        return None;
    };
    let parsed = parse(code, other_label);
    if parsed.is_none() {
        errors.add(field, format!("'{}' is not a valid option.", code));
    }
    parsed
}

fn key_skills(
    errors: &mut ValidationErrors,
    skills: Option<&[String]>,
) -> Option<[String; KEY_SKILL_COUNT]> {
    let Some(skills) = skills else {
        errors.add("keySkills", REQUIRED);
        return None;
    };

    if skills.len() < KEY_SKILL_COUNT {
        errors.add(
            "keySkills",
            format!("Please enter at least {} key skills.", KEY_SKILL_COUNT),
        );
        return None;
    }
    if skills.len() > KEY_SKILL_COUNT {
        errors.add(
            "keySkills",
            format!("At most {} key skills.", KEY_SKILL_COUNT),
        );
        return None;
    }

    let mut blank = false;
    for (index, skill) in skills.iter().enumerate() {
        if skill.trim().is_empty() {
            errors.add(
                format!("keySkills.{}", index),
                format!("Key skill {} is required.", index + 1),
            );
            blank = true;
        }
    }
    if blank {
        return None;
    }

    <[String; KEY_SKILL_COUNT]>::try_from(skills.to_vec()).ok()
}
