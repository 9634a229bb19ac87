use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::AnalysisError;

/// Which face encoder a recognizer uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderKind {
    /// Hue/saturation histogram. Needs no model file.
    #[default]
    Histogram,
    /// ArcFace ONNX embedding.
    Arcface,
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncoderKind::Histogram => "histogram",
            EncoderKind::Arcface => "arcface",
        })
    }
}

impl FromStr for EncoderKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "histogram" | "hist" => Ok(EncoderKind::Histogram),
            "arcface" | "embedding" => Ok(EncoderKind::Arcface),
            other => Err(AnalysisError::Configuration(format!(
                "unknown face encoder '{other}' (expected histogram or arcface)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("arcface".parse::<EncoderKind>().unwrap(), EncoderKind::Arcface);
        assert_eq!("Histogram".parse::<EncoderKind>().unwrap(), EncoderKind::Histogram);
        assert!(matches!(
            "dlib".parse::<EncoderKind>(),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [EncoderKind::Histogram, EncoderKind::Arcface] {
            assert_eq!(kind.to_string().parse::<EncoderKind>().unwrap(), kind);
        }
    }
}
