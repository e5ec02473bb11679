// src/scoring/weights.rs
//! Sub-score combination weights, optionally overridden from
//! `config/scoring.toml`.

use std::{fs, io, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoreWeights {
    pub evidence_quality: f64,
    pub evidence_quantity: f64,
    pub case_completeness: f64,
    pub legal_strength: f64,
    pub procedural: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            evidence_quality: 0.30,
            evidence_quantity: 0.15,
            case_completeness: 0.20,
            legal_strength: 0.25,
            procedural: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.evidence_quality
            + self.evidence_quantity
            + self.case_completeness
            + self.legal_strength
            + self.procedural
    }
}

pub fn load_weights_file(path: &Path) -> io::Result<ScoreWeights> {
    let raw = fs::read_to_string(path)?;
    #[derive(Deserialize)]
    struct Root {
        weights: ScoreWeights,
    }
    let root: Root =
        toml::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(root.weights)
}

/// `config/scoring.toml` if present, defaults otherwise.
pub fn load_default() -> ScoreWeights {
    let path = Path::new("config/scoring.toml");
    match load_weights_file(path) {
        Ok(w) => w,
        Err(_) => ScoreWeights::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_weights_sum_to_one() {
        assert!((ScoreWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn loads_from_toml() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "scoring_weights_{}.toml",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut f = fs::File::create(&path).unwrap();
        write!(
            f,
            "[weights]\nevidence_quality = 0.4\nevidence_quantity = 0.1\ncase_completeness = 0.2\nlegal_strength = 0.2\nprocedural = 0.1\n"
        )
        .unwrap();

        let w = load_weights_file(&path).unwrap();
        assert!((w.evidence_quality - 0.4).abs() < 1e-9);
        assert!((w.sum() - 1.0).abs() < 1e-9);

        let _ = fs::remove_file(&path);
    }
}
