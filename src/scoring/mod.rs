// src/scoring/mod.rs
//! Merit scoring engine: explainable 0–100 assessment of case strength from
//! the case record and its processed evidence set. Deterministic apart from
//! the optional advisory-backed legal-strength sub-score, which silently
//! falls back to a rule-based estimate when the service is unreachable.

pub mod indicators;
pub mod subscores;
pub mod weights;

use chrono::{NaiveDate, Utc};
use metrics::counter;

use crate::advisory::{AdvisoryOutcome, DynAdvisoryClient};
use crate::model::{Case, EvidenceItem, MeritAnalysis, ScoreBreakdown};

pub use crate::scoring::weights::ScoreWeights;

pub struct MeritScorer {
    weights: ScoreWeights,
    advisory: DynAdvisoryClient,
}

impl MeritScorer {
    pub fn new(weights: ScoreWeights, advisory: DynAdvisoryClient) -> Self {
        Self { weights, advisory }
    }

    /// Produce a fresh merit snapshot. Always returns a result: the advisory
    /// call is the only external dependency and its failure is absorbed by
    /// the rule-based fallback.
    pub async fn score(&self, case: &Case, evidence: &[EvidenceItem]) -> MeritAnalysis {
        let today = Utc::now().date_naive();
        self.score_at(case, evidence, today).await
    }

    /// Same as [`score`](Self::score) with an explicit "today" for tests.
    pub async fn score_at(
        &self,
        case: &Case,
        evidence: &[EvidenceItem],
        today: NaiveDate,
    ) -> MeritAnalysis {
        let breakdown = ScoreBreakdown {
            evidence_quality: subscores::evidence_quality(evidence),
            evidence_quantity: subscores::evidence_quantity(evidence),
            case_completeness: subscores::case_completeness(case),
            legal_strength: self.legal_strength(case, evidence, today).await,
            procedural: subscores::procedural(case, today),
        };

        let weighted = breakdown.evidence_quality * self.weights.evidence_quality
            + breakdown.evidence_quantity * self.weights.evidence_quantity
            + breakdown.case_completeness * self.weights.case_completeness
            + breakdown.legal_strength * self.weights.legal_strength
            + breakdown.procedural * self.weights.procedural;

        let multiplier = case.category.complexity_multiplier();
        let overall = round1((weighted * multiplier).clamp(0.0, 100.0));

        counter!("merit_scored_total").increment(1);
        tracing::info!(case = case.id, overall, "merit score computed");

        MeritAnalysis {
            overall_score: overall,
            breakdown,
            complexity_multiplier: multiplier,
            strengths: indicators::strengths(case, evidence, today),
            weaknesses: indicators::weaknesses(case, evidence, today),
            confidence_level: indicators::confidence_level(case, evidence),
            recommendations: indicators::recommendations(overall, case, evidence, today),
            generated_at: Utc::now(),
        }
    }

    async fn legal_strength(
        &self,
        case: &Case,
        evidence: &[EvidenceItem],
        today: NaiveDate,
    ) -> f64 {
        let seed = advisory_seed(case, evidence);
        match self.advisory.advise(&seed).await {
            AdvisoryOutcome::Advice(advice) => {
                // Confidence 1–5 maps onto a multiplier in [0.6, 1.0].
                let confidence = advice.confidence.clamp(1, 5);
                let multiplier = 0.6 + 0.1 * f64::from(confidence - 1);
                (advice.score * multiplier).clamp(0.0, 100.0)
            }
            AdvisoryOutcome::Unavailable => {
                counter!("advisory_fallback_total").increment(1);
                tracing::debug!(case = case.id, "advisory unavailable, rule-based fallback");
                subscores::legal_strength_fallback(case, evidence, today)
            }
        }
    }
}

/// Serialized case+evidence summary that seeds the advisory call.
fn advisory_seed(case: &Case, evidence: &[EvidenceItem]) -> String {
    let mut seed = format!(
        "Category: {:?}\nProvince: {}\nDescription: {}\n",
        case.category, case.province, case.description
    );
    for item in evidence.iter().take(10) {
        seed.push_str(&format!(
            "Evidence ({:?}, relevance {:.2}): {}\n",
            item.kind,
            item.relevance_score,
            item.summary.as_deref().unwrap_or("no summary")
        ));
    }
    seed
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
    }
}
