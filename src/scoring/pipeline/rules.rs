use crate::scoring::domain::{Lead, Offer};

const SENIOR_ROLE_MARKERS: [&str; 3] = ["head", "chief", "founder"];
const INFLUENCER_ROLE_MARKERS: [&str; 3] = ["manager", "lead", "executive"];

/// Deterministic score contribution for a lead against an offer:
/// role band + industry band + completeness band.
pub fn rule_points(lead: &Lead, offer: &Offer) -> u16 {
    role_points(&lead.role) + industry_points(&lead.industry, offer) + completeness_points(lead)
}

/// Role band: decision-maker markers score 20, influencer markers 10.
/// The senior band wins outright; the two are never summed.
pub(crate) fn role_points(role: &str) -> u16 {
    let role = role.to_lowercase();
    if SENIOR_ROLE_MARKERS.iter().any(|m| role.contains(m)) {
        20
    } else if INFLUENCER_ROLE_MARKERS.iter().any(|m| role.contains(m)) {
        10
    } else {
        0
    }
}

/// Industry band against the offer's ideal use cases:
/// - a full use-case string appearing inside the industry scores 20;
/// - otherwise any single industry word appearing inside a use case scores 10.
pub(crate) fn industry_points(industry: &str, offer: &Offer) -> u16 {
    let industry = industry.to_lowercase();
    let use_cases: Vec<String> = offer
        .ideal_use_cases
        .iter()
        .map(|uc| uc.to_lowercase())
        .collect();

    if use_cases.iter().any(|uc| industry.contains(uc.as_str())) {
        return 20;
    }

    let word_overlap = industry
        .split_whitespace()
        .any(|word| use_cases.iter().any(|uc| uc.contains(word)));
    if word_overlap {
        10
    } else {
        0
    }
}

/// Completeness band: 10 when all six profile fields are non-empty.
pub(crate) fn completeness_points(lead: &Lead) -> u16 {
    if lead.profile_fields().iter().all(|field| !field.is_empty()) {
        10
    } else {
        0
    }
}
