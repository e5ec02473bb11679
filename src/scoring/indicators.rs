// src/scoring/indicators.rs
//! Rule checks that are reported alongside the numeric score but not folded
//! into it: strength/weakness indicators, a 1–5 confidence level, and
//! banded recommendations.

use chrono::NaiveDate;

use crate::model::{Case, EvidenceItem, EvidenceStatus};

pub const HIGH_RELEVANCE: f64 = 0.7;
pub const LOW_RELEVANCE: f64 = 0.3;

pub fn strengths(case: &Case, items: &[EvidenceItem], today: NaiveDate) -> Vec<String> {
    let mut out = Vec::new();

    let analyzed = items.iter().filter(|e| e.is_analyzed()).count();
    if analyzed > 0 {
        out.push(format!("{analyzed} evidence item(s) fully analyzed"));
    }

    let high_rel = items
        .iter()
        .filter(|e| e.relevance_score > HIGH_RELEVANCE)
        .count();
    if high_rel > 0 {
        out.push(format!("{high_rel} highly relevant evidence item(s)"));
    }

    if case.description.trim().len() >= 200 {
        out.push("Detailed case description".to_string());
    }

    if let Some(incident) = case.incident_date {
        if (today - incident).num_days() <= 90 {
            out.push("Recent incident, evidence likely fresh".to_string());
        }
    }

    if let Some(deadline) = case.filing_deadline {
        if (deadline - today).num_days() >= 30 {
            out.push("Comfortable filing-deadline headroom".to_string());
        }
    }

    let mut kinds: Vec<_> = items.iter().map(|e| e.kind).collect();
    kinds.sort_by_key(|k| *k as u8);
    kinds.dedup();
    if kinds.len() >= 3 {
        out.push("Diverse evidence types".to_string());
    }

    out
}

pub fn weaknesses(case: &Case, items: &[EvidenceItem], today: NaiveDate) -> Vec<String> {
    let mut out = Vec::new();

    if items.len() < 3 {
        out.push("Limited evidence (fewer than 3 items)".to_string());
    }

    let unprocessed = items
        .iter()
        .filter(|e| {
            matches!(
                e.status,
                EvidenceStatus::Pending | EvidenceStatus::Processing | EvidenceStatus::Error
            )
        })
        .count();
    if unprocessed > 0 {
        out.push(format!("{unprocessed} evidence item(s) not yet processed"));
    }

    if !items.is_empty() {
        let low_rel = items
            .iter()
            .filter(|e| e.relevance_score < LOW_RELEVANCE)
            .count();
        if low_rel * 2 > items.len() {
            out.push("Most evidence has low relevance".to_string());
        }
    }

    if case.description.trim().len() < 50 {
        out.push("Case description is very brief".to_string());
    }

    if case.incident_date.is_none() {
        out.push("Missing incident date".to_string());
    }

    if case.jurisdiction.is_none() && case.court_name.is_none() {
        out.push("Missing jurisdiction and court information".to_string());
    }

    if let Some(deadline) = case.filing_deadline {
        let days_left = (deadline - today).num_days();
        if days_left < 0 {
            out.push("Filing deadline is past".to_string());
        } else if days_left < 14 {
            out.push("Filing deadline is very close".to_string());
        }
    }

    out
}

/// Confidence in the analysis itself (1–5), not in the case.
pub fn confidence_level(case: &Case, items: &[EvidenceItem]) -> u8 {
    let mut level: i8 = 3;

    if items.len() >= 5 {
        level += 1;
    } else if items.len() < 2 {
        level -= 1;
    }

    if !items.is_empty() {
        let analyzed = items.iter().filter(|e| e.is_analyzed()).count();
        if analyzed as f64 / items.len() as f64 > 0.8 {
            level += 1;
        }
    }

    if case.description.trim().is_empty() || case.incident_date.is_none() {
        level -= 1;
    }

    level.clamp(1, 5) as u8
}

/// Banded, plus per-gap suggestions mirroring the weakness checks.
pub fn recommendations(
    overall: f64,
    case: &Case,
    items: &[EvidenceItem],
    today: NaiveDate,
) -> Vec<String> {
    let mut out = Vec::new();

    out.push(
        match overall {
            s if s < 30.0 => {
                "This case currently scores low; consider seeking a legal consultation before filing"
            }
            s if s < 50.0 => "Strengthen the case before filing; the gaps below are a starting point",
            s if s < 70.0 => "A reasonable foundation; addressing the gaps below would improve it",
            _ => "A strong foundation; keep records current as the matter progresses",
        }
        .to_string(),
    );

    if items.len() < 3 {
        out.push("Upload additional supporting evidence".to_string());
    }
    if case.description.trim().len() < 50 {
        out.push("Expand the case description with specifics and timeline".to_string());
    }
    if case.incident_date.is_none() {
        out.push("Record the incident date".to_string());
    }
    if case.jurisdiction.is_none() && case.court_name.is_none() {
        out.push("Identify the jurisdiction and court handling the matter".to_string());
    }
    if let Some(deadline) = case.filing_deadline {
        if (deadline - today).num_days() < 14 {
            out.push("Prioritize filing; the deadline is close or past".to_string());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaseCategory, EvidenceKind};
    use chrono::{Duration, Utc};

    fn case() -> Case {
        Case {
            id: 1,
            owner: 1,
            title: "Title".into(),
            description: "Short".into(),
            category: CaseCategory::FamilyCourt,
            province: "Ontario".into(),
            jurisdiction: None,
            court_name: None,
            incident_date: None,
            filing_deadline: None,
            hearing_date: None,
            created_at: Utc::now(),
            merit: None,
        }
    }

    fn item(relevance: f64, status: EvidenceStatus) -> EvidenceItem {
        EvidenceItem {
            id: 1,
            case_id: 1,
            owner: 1,
            file_path: "uploads/x".into(),
            original_filename: "x".into(),
            file_hash: None,
            kind: EvidenceKind::Document,
            status,
            extracted_text: None,
            word_count: 10,
            identified_dates: vec![],
            identified_names: vec![],
            legal_keywords: vec![],
            relevance_score: relevance,
            summary: None,
            relevance_indicators: vec![],
            extraction: None,
            uploaded_at: Utc::now(),
            processed_at: None,
            analyzed_at: None,
        }
    }

    #[test]
    fn past_deadline_yields_weakness() {
        let today = Utc::now().date_naive();
        let mut c = case();
        c.filing_deadline = Some(today - Duration::days(5));
        let w = weaknesses(&c, &[], today);
        assert!(w.iter().any(|s| s.contains("deadline is past")));
    }

    #[test]
    fn scarce_and_unprocessed_evidence_flagged() {
        let today = Utc::now().date_naive();
        let items = vec![item(0.5, EvidenceStatus::Pending)];
        let w = weaknesses(&case(), &items, today);
        assert!(w.iter().any(|s| s.contains("fewer than 3")));
        assert!(w.iter().any(|s| s.contains("not yet processed")));
    }

    #[test]
    fn confidence_moves_with_evidence_volume() {
        let c = case();
        let few = vec![item(0.5, EvidenceStatus::Processed)];
        let many = vec![item(0.5, EvidenceStatus::Processed); 5];
        assert!(confidence_level(&c, &many) > confidence_level(&c, &few));
    }

    #[test]
    fn confidence_stays_in_range() {
        let mut c = case();
        c.description = String::new();
        assert!(confidence_level(&c, &[]) >= 1);

        let mut rich = case();
        rich.description = "x".repeat(100);
        rich.incident_date = Some(Utc::now().date_naive());
        let analyzed = vec![item(0.9, EvidenceStatus::Analyzed); 6];
        assert!(confidence_level(&rich, &analyzed) <= 5);
    }

    #[test]
    fn recommendations_mirror_gaps() {
        let today = Utc::now().date_naive();
        let r = recommendations(20.0, &case(), &[], today);
        assert!(r[0].contains("scores low"));
        assert!(r.iter().any(|s| s.contains("additional supporting evidence")));
        assert!(r.iter().any(|s| s.contains("incident date")));
    }
}
