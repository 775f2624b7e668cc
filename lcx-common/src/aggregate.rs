//! Aggregation of response collections into dashboard views
//!
//! Every view is recomputed from the full, arrival-ordered collection on
//! each call. Nothing here keeps state between calls or mutates its input.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::SurveyResponse;

/// Default number of entries in the top-skills ranking
pub const DEFAULT_TOP_SKILLS: usize = 5;
/// Default number of entries in the recent-profiles feed
pub const DEFAULT_RECENT_PROFILES: usize = 5;

/// Count of occurrences for one group key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub label: String,
    pub count: usize,
}

/// Which skill fields feed the top-skills ranking
///
/// Submissions carry a list of skills, while older records carry a single
/// `keySkill`. The ranking needs an explicit choice between the two shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillAttribution {
    /// One count per entry of `keySkills`; records with an empty list count
    /// their legacy `keySkill` instead
    #[default]
    EveryListedSkill,
    /// One count per response: the legacy `keySkill` when present, else the
    /// first listed skill
    PrimarySkillOnly,
}

impl FromStr for SkillAttribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "every" | "every_listed_skill" => Ok(SkillAttribution::EveryListedSkill),
            "primary" | "primary_skill_only" => Ok(SkillAttribution::PrimarySkillOnly),
            other => Err(format!(
                "unknown skill attribution '{}' (expected 'every' or 'primary')",
                other
            )),
        }
    }
}

/// Tunables for [`summarize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOptions {
    pub top_skills: usize,
    pub recent_profiles: usize,
    pub skill_attribution: SkillAttribution,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            top_skills: DEFAULT_TOP_SKILLS,
            recent_profiles: DEFAULT_RECENT_PROFILES,
            skill_attribution: SkillAttribution::default(),
        }
    }
}

/// Public part of a response shown in the recent-profiles feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: i64,
    pub name: String,
    pub profile_description: String,
    pub desired_connections: String,
    pub offer_to_others: String,
}

impl From<&SurveyResponse> for ProfileSummary {
    fn from(response: &SurveyResponse) -> Self {
        Self {
            id: response.id,
            name: response.name.clone(),
            profile_description: response.profile_description.clone(),
            desired_connections: response.desired_connections.clone(),
            offer_to_others: response.offer_to_others.clone(),
        }
    }
}

/// Everything the dashboard displays, derived from one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_responses: usize,
    pub sectors: Vec<Tally>,
    pub networking_interests: Vec<Tally>,
    pub top_skills: Vec<Tally>,
    pub recent_profiles: Vec<ProfileSummary>,
}

/// Derive all dashboard views from an arrival-ordered collection
pub fn summarize(responses: &[SurveyResponse], options: &AggregationOptions) -> DashboardSummary {
    DashboardSummary {
        total_responses: responses.len(),
        sectors: sector_distribution(responses),
        networking_interests: networking_interest_distribution(responses),
        top_skills: top_skills(responses, options.skill_attribution, options.top_skills),
        recent_profiles: recent_profiles(responses, options.recent_profiles),
    }
}

/// Responses per sector code, in first-seen order
///
/// `other` is one group regardless of the companion label.
pub fn sector_distribution(responses: &[SurveyResponse]) -> Vec<Tally> {
    tally_first_seen(responses.iter().map(|r| r.sector.code()))
}

/// Responses per networking interest, in first-seen order
///
/// `other` responses group under their label, or under "Other" without one.
pub fn networking_interest_distribution(responses: &[SurveyResponse]) -> Vec<Tally> {
    tally_first_seen(responses.iter().map(|r| r.networking_interest.group_label()))
}

/// Most frequent skills, case-insensitively
///
/// Sorted by count descending, ties by skill ascending. Blank skills are
/// skipped. Returns at most `limit` entries.
pub fn top_skills(
    responses: &[SurveyResponse],
    attribution: SkillAttribution,
    limit: usize,
) -> Vec<Tally> {
    let skills = responses
        .iter()
        .flat_map(|r| attributed_skills(r, attribution))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut ranking = tally_first_seen(skills);
    ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranking.truncate(limit);
    ranking
}

/// Last `limit` responses, most recent first
pub fn recent_profiles(responses: &[SurveyResponse], limit: usize) -> Vec<ProfileSummary> {
    responses
        .iter()
        .rev()
        .take(limit)
        .map(ProfileSummary::from)
        .collect()
}

fn attributed_skills(response: &SurveyResponse, attribution: SkillAttribution) -> Vec<&str> {
    let legacy = response.legacy_key_skill.as_deref();
    match attribution {
        SkillAttribution::EveryListedSkill if response.key_skills.is_empty() => {
            legacy.into_iter().collect()
        }
        SkillAttribution::EveryListedSkill => {
            response.key_skills.iter().map(String::as_str).collect()
        }
        SkillAttribution::PrimarySkillOnly => legacy
            .or_else(|| response.key_skills.first().map(String::as_str))
            .into_iter()
            .collect(),
    }
}

fn tally_first_seen<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Vec<Tally> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<Tally> = Vec::new();

    for key in keys {
        let key = key.as_ref();
        match positions.get(key) {
            Some(&index) => tallies[index].count += 1,
            None => {
                positions.insert(key.to_string(), tallies.len());
                tallies.push(Tally {
                    label: key.to_string(),
                    count: 1,
                });
            }
        }
    }

    tallies
}
