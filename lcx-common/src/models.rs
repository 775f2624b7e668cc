//! Survey response model
//!
//! Three shapes cross the crate boundary:
//! - [`CandidateResponse`]: untrusted input, every field optional
//! - [`NewSurveyResponse`]: validated submission, no id yet
//! - [`SurveyResponse`]: stored record carrying the store-assigned id
//!
//! All of them share the flat camelCase JSON layout of [`ResponseRecord`],
//! where the `other` variants carry their free-text label in a companion
//! field (`otherSector`, `otherNetworkingInterest`).

use serde::{Deserialize, Serialize};

use crate::Error;

/// Number of key skills collected per submission
pub const KEY_SKILL_COUNT: usize = 3;

/// Group label used for `other` networking interests without a label
pub const OTHER_FALLBACK_LABEL: &str = "Other";

/// Drop a blank companion label; any other label is kept exactly as sent
pub(crate) fn normalize_label(label: Option<&str>) -> Option<String> {
    label
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
}

/// Professional sector of an attendee
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sector {
    Technology,
    Finance,
    Health,
    Education,
    /// Free-text sector; the label is optional
    Other(Option<String>),
}

impl Sector {
    /// Parse a wire code plus its optional companion label
    ///
    /// Accepts the Spanish codes written by the first deployment of the form
    /// (`tecnologia`, `finanzas`, `salud`, `educacion`, `otros`).
    /// The label is ignored unless the code is `other`.
    pub fn parse(code: &str, other_label: Option<&str>) -> Option<Self> {
        let sector = match code {
            "technology" | "tecnologia" => Sector::Technology,
            "finance" | "finanzas" => Sector::Finance,
            "health" | "salud" => Sector::Health,
            "education" | "educacion" => Sector::Education,
            "other" | "otros" => Sector::Other(normalize_label(other_label)),
            _ => return None,
        };
        Some(sector)
    }

    /// Wire code for this sector
    pub fn code(&self) -> &'static str {
        match self {
            Sector::Technology => "technology",
            Sector::Finance => "finance",
            Sector::Health => "health",
            Sector::Education => "education",
            Sector::Other(_) => "other",
        }
    }

    /// Companion label, only for [`Sector::Other`]
    pub fn other_label(&self) -> Option<&str> {
        match self {
            Sector::Other(label) => label.as_deref(),
            _ => None,
        }
    }
}

/// Main networking interest of an attendee
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkingInterest {
    Technology,
    Business,
    Creativity,
    /// Free-text interest; the label is optional
    Other(Option<String>),
}

impl NetworkingInterest {
    /// Parse a wire code plus its optional companion label
    ///
    /// Accepts the Spanish codes `tecnologia`, `negocios`, `creatividad`, `otros`.
    pub fn parse(code: &str, other_label: Option<&str>) -> Option<Self> {
        let interest = match code {
            "technology" | "tecnologia" => NetworkingInterest::Technology,
            "business" | "negocios" => NetworkingInterest::Business,
            "creativity" | "creatividad" => NetworkingInterest::Creativity,
            "other" | "otros" => NetworkingInterest::Other(normalize_label(other_label)),
            _ => return None,
        };
        Some(interest)
    }

    pub fn code(&self) -> &'static str {
        match self {
            NetworkingInterest::Technology => "technology",
            NetworkingInterest::Business => "business",
            NetworkingInterest::Creativity => "creativity",
            NetworkingInterest::Other(_) => "other",
        }
    }

    pub fn other_label(&self) -> Option<&str> {
        match self {
            NetworkingInterest::Other(label) => label.as_deref(),
            _ => None,
        }
    }

    /// Key this interest is grouped under on the dashboard
    ///
    /// Fixed variants group by code. `Other` groups by its label, or by
    /// [`OTHER_FALLBACK_LABEL`] when no label was given.
    pub fn group_label(&self) -> &str {
        match self {
            NetworkingInterest::Other(Some(label)) => label,
            NetworkingInterest::Other(None) => OTHER_FALLBACK_LABEL,
            fixed => fixed.code(),
        }
    }
}

/// Flat JSON wire layout shared by all response shapes
///
/// Read-side tolerant: free-text fields default to empty, and both the
/// `keySkills` list and the older single `keySkill` field are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_sector: Option<String>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub profile_description: String,
    #[serde(default)]
    pub event_goal: String,
    pub networking_interest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_networking_interest: Option<String>,
    #[serde(default)]
    pub desired_connections: String,
    #[serde(default)]
    pub offer_to_others: String,
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_skill: Option<String>,
}

/// Stored survey response
///
/// Immutable once stored. `key_skills` holds the submitted list (always 3
/// entries for records written through validation); `legacy_key_skill`
/// holds the single `keySkill` field found on older records, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResponseRecord", into = "ResponseRecord")]
pub struct SurveyResponse {
    pub id: i64,
    pub name: String,
    pub sector: Sector,
    pub origin: String,
    pub linkedin_url: String,
    pub profile_description: String,
    pub event_goal: String,
    pub networking_interest: NetworkingInterest,
    pub desired_connections: String,
    pub offer_to_others: String,
    pub key_skills: Vec<String>,
    pub legacy_key_skill: Option<String>,
}

impl SurveyResponse {
    /// Attach a store-assigned id to a validated submission
    pub fn from_submission(id: i64, submission: NewSurveyResponse) -> Self {
        let NewSurveyResponse {
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
        } = submission;

        Self {
            id,
            name,
            sector,
            origin,
            linkedin_url,
            profile_description,
            event_goal,
            networking_interest,
            desired_connections,
            offer_to_others,
            key_skills: key_skills.into(),
            legacy_key_skill: None,
        }
    }
}

impl TryFrom<ResponseRecord> for SurveyResponse {
    type Error = Error;

    fn try_from(record: ResponseRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .ok_or_else(|| Error::InvalidRecord("missing id".to_string()))?;
        let sector = Sector::parse(&record.sector, record.other_sector.as_deref())
            .ok_or_else(|| Error::InvalidRecord(format!("unknown sector '{}'", record.sector)))?;
        let networking_interest = NetworkingInterest::parse(
            &record.networking_interest,
            record.other_networking_interest.as_deref(),
        )
        .ok_or_else(|| {
            Error::InvalidRecord(format!(
                "unknown networking interest '{}'",
                record.networking_interest
            ))
        })?;

        Ok(Self {
            id,
            name: record.name,
            sector,
            origin: record.origin,
            linkedin_url: record.linkedin_url,
            profile_description: record.profile_description,
            event_goal: record.event_goal,
            networking_interest,
            desired_connections: record.desired_connections,
            offer_to_others: record.offer_to_others,
            key_skills: record.key_skills,
            legacy_key_skill: record.key_skill,
        })
    }
}

impl From<SurveyResponse> for ResponseRecord {
    fn from(response: SurveyResponse) -> Self {
        Self {
            id: Some(response.id),
            name: response.name,
            sector: response.sector.code().to_string(),
            other_sector: response.sector.other_label().map(str::to_string),
            origin: response.origin,
            linkedin_url: response.linkedin_url,
            profile_description: response.profile_description,
            event_goal: response.event_goal,
            networking_interest: response.networking_interest.code().to_string(),
            other_networking_interest: response
                .networking_interest
                .other_label()
                .map(str::to_string),
            desired_connections: response.desired_connections,
            offer_to_others: response.offer_to_others,
            key_skills: response.key_skills,
            key_skill: response.legacy_key_skill,
        }
    }
}

/// Validated submission, ready to be written to the store
///
/// Only produced by [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ResponseRecord")]
pub struct NewSurveyResponse {
    pub name: String,
    pub sector: Sector,
    pub origin: String,
    pub linkedin_url: String,
    pub profile_description: String,
    pub event_goal: String,
    pub networking_interest: NetworkingInterest,
    pub desired_connections: String,
    pub offer_to_others: String,
    pub key_skills: [String; KEY_SKILL_COUNT],
}

impl From<NewSurveyResponse> for ResponseRecord {
    fn from(submission: NewSurveyResponse) -> Self {
        Self {
            id: None,
            name: submission.name,
            sector: submission.sector.code().to_string(),
            other_sector: submission.sector.other_label().map(str::to_string),
            origin: submission.origin,
            linkedin_url: submission.linkedin_url,
            profile_description: submission.profile_description,
            event_goal: submission.event_goal,
            networking_interest: submission.networking_interest.code().to_string(),
            other_networking_interest: submission
                .networking_interest
                .other_label()
                .map(str::to_string),
            desired_connections: submission.desired_connections,
            offer_to_others: submission.offer_to_others,
            key_skills: submission.key_skills.into(),
            key_skill: None,
        }
    }
}

/// Untrusted submission as received from a client
///
/// Every field may be absent; [`crate::validation::validate`] decides
/// whether the whole record is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub other_sector: Option<String>,
    pub origin: Option<String>,
    pub linkedin_url: Option<String>,
    pub profile_description: Option<String>,
    pub event_goal: Option<String>,
    pub networking_interest: Option<String>,
    pub other_networking_interest: Option<String>,
    pub desired_connections: Option<String>,
    pub offer_to_others: Option<String>,
    pub key_skills: Option<Vec<String>>,
}

impl From<&NewSurveyResponse> for CandidateResponse {
    fn from(submission: &NewSurveyResponse) -> Self {
        Self {
            name: Some(submission.name.clone()),
            sector: Some(submission.sector.code().to_string()),
            other_sector: submission.sector.other_label().map(str::to_string),
            origin: Some(submission.origin.clone()),
            linkedin_url: Some(submission.linkedin_url.clone()),
            profile_description: Some(submission.profile_description.clone()),
            event_goal: Some(submission.event_goal.clone()),
            networking_interest: Some(submission.networking_interest.code().to_string()),
            other_networking_interest: submission
                .networking_interest
                .other_label()
                .map(str::to_string),
            desired_connections: Some(submission.desired_connections.clone()),
            offer_to_others: Some(submission.offer_to_others.clone()),
            key_skills: Some(submission.key_skills.to_vec()),
        }
    }
}
