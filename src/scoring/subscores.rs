// src/scoring/subscores.rs
//! The five independent sub-scores, each on a 0–100 scale.

use chrono::{NaiveDate, Utc};

use crate::model::{Case, EvidenceItem};

/// Bonus applied to items that completed the advisory enhancement step.
const ANALYZED_BONUS: f64 = 1.2;

/// Per-item `relevance*100` weighted by the kind multiplier, averaged over
/// the sum of kind weights rather than the item count. That denominator makes
/// the score sensitive to which kinds are present, which mirrors the
/// shipped behaviour; see DESIGN.md before changing it.
pub fn evidence_quality(items: &[EvidenceItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for item in items {
        let w = item.kind.quality_weight();
        let mut contribution = item.relevance_score * 100.0 * w;
        if item.is_analyzed() {
            contribution *= ANALYZED_BONUS;
        }
        weighted_sum += contribution;
        weight_total += w;
    }
    if weight_total <= 0.0 {
        return 0.0;
    }
    (weighted_sum / weight_total).clamp(0.0, 100.0)
}

/// Banded by count plus a diversity bonus for distinct kinds.
pub fn evidence_quantity(items: &[EvidenceItem]) -> f64 {
    let n = items.len();
    let base = match n {
        0 => return 0.0,
        1..=2 => 25.0 * n as f64,
        3..=5 => 50.0 + 15.0 * (n as f64 - 2.0),
        _ => 95.0,
    };
    let mut kinds: Vec<_> = items.iter().map(|e| e.kind).collect();
    kinds.sort_by_key(|k| *k as u8);
    kinds.dedup();
    let diversity = (kinds.len() as f64 * 2.5).min(10.0);
    (base + diversity).clamp(0.0, 100.0)
}

/// Percentage of a fixed checklist of case fields being filled in.
pub fn case_completeness(case: &Case) -> f64 {
    let mut achieved = 0.0;
    let mut total = 0.0;

    let mut field = |present: bool, weight: f64| {
        total += weight;
        if present {
            achieved += weight;
        }
    };

    field(!case.title.trim().is_empty(), 1.0);
    field(case.description.trim().len() > 20, 1.0);
    field(true, 1.0); // category is a required enum
    field(!case.province.trim().is_empty(), 1.0);
    field(case.incident_date.is_some(), 1.0);
    field(case.filing_deadline.is_some(), 0.5);
    field(case.hearing_date.is_some(), 0.5);
    field(case.jurisdiction.is_some(), 0.5);
    field(case.court_name.is_some(), 0.5);

    (achieved / total * 100.0).clamp(0.0, 100.0)
}

/// Rule-based legal-strength estimate used when the advisory service is
/// unreachable.
pub fn legal_strength_fallback(case: &Case, items: &[EvidenceItem], today: NaiveDate) -> f64 {
    let mut score = 50.0;
    score += case.category.legal_strength_adjustment();

    let keyword_bonus = items
        .iter()
        .filter(|e| !e.legal_keywords.is_empty())
        .count() as f64
        * 5.0;
    score += keyword_bonus.min(20.0);

    if let Some(incident) = case.incident_date {
        let age_days = (today - incident).num_days();
        if age_days <= 30 {
            score += 10.0;
        } else if age_days > 365 {
            score -= 10.0;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Deadline proximity, jurisdiction clarity, and case freshness. The running
/// total is clamped only at the end.
pub fn procedural(case: &Case, today: NaiveDate) -> f64 {
    let mut score: f64 = 50.0;

    if let Some(deadline) = case.filing_deadline {
        let days_left = (deadline - today).num_days();
        if days_left < 0 {
            score -= 30.0;
        } else if days_left < 7 {
            score -= 15.0;
        } else if days_left < 30 {
            score += 10.0;
        } else {
            score += 20.0;
        }
    }

    let has_jurisdiction = case.jurisdiction.is_some();
    let has_province = !case.province.trim().is_empty();
    if has_province && has_jurisdiction {
        score += 15.0;
    } else if has_province {
        score += 10.0;
    }

    let case_age_days = (Utc::now() - case.created_at).num_days();
    if case_age_days < 7 {
        score += 5.0;
    } else if case_age_days > 180 {
        score -= 10.0;
    }

    score.clamp(0.0, 100.0)
}
