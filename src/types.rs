use std::fmt;

use serde::{Deserialize, Serialize};

/// Property areas a claim photograph can depict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Roof,
    Siding,
    Garage,
    Windows,
    Doors,
    Fences,
    Gutters,
    SolarPanels,
    Chimney,
    Porch,
    Deck,
    PoolArea,
    Landscape,
    Other,
}

impl Area {
    pub const ALL: [Area; 14] = [
        Area::Roof,
        Area::Siding,
        Area::Garage,
        Area::Windows,
        Area::Doors,
        Area::Fences,
        Area::Gutters,
        Area::SolarPanels,
        Area::Chimney,
        Area::Porch,
        Area::Deck,
        Area::PoolArea,
        Area::Landscape,
        Area::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Roof => "roof",
            Area::Siding => "siding",
            Area::Garage => "garage",
            Area::Windows => "windows",
            Area::Doors => "doors",
            Area::Fences => "fences",
            Area::Gutters => "gutters",
            Area::SolarPanels => "solar_panels",
            Area::Chimney => "chimney",
            Area::Porch => "porch",
            Area::Deck => "deck",
            Area::PoolArea => "pool_area",
            Area::Landscape => "landscape",
            Area::Other => "other",
        }
    }

    /// Resolve a classifier-provided label; anything unrecognized maps to `Other`.
    pub fn resolve(raw: &str) -> Area {
        Area::ALL
            .into_iter()
            .find(|area| area.as_str() == raw)
            .unwrap_or(Area::Other)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryPeril {
    #[serde(rename = "wind")]
    Wind,
    #[serde(rename = "no wind")]
    NoWind,
}

/// One successfully fetched and analyzed claim photograph. Immutable once
/// built; discarded at the end of the invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub dhash: String,
    pub phash: String,
    pub content_digest: String,
    pub quality: f64,
    pub likely_unrelated: bool,
    pub quality_notes: Vec<String>,
}

/// Verdict from the external damage classifier for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_wind_damage: bool,
    pub area: Area,
    pub severity: u8,
    pub quality: f64,
    pub unrelated_or_low_quality: bool,
    pub notes: String,
    pub confidence: f64,
}

impl Classification {
    /// Neutral fallback used whenever the external classifier cannot answer.
    /// Built fresh per call; never shared between calls.
    pub fn neutral() -> Self {
        Self {
            is_wind_damage: false,
            area: Area::Other,
            severity: 0,
            quality: 0.5,
            unrelated_or_low_quality: false,
            notes: String::new(),
            confidence: 0.5,
        }
    }

    pub fn is_related(&self) -> bool {
        !self.unrelated_or_low_quality
    }
}

/// Aggregated per-area damage record, recomputed fresh each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEntry {
    pub area: Area,
    pub damage_confirmed: bool,
    pub primary_peril: PrimaryPeril,
    pub count: usize,
    pub avg_severity: f64,
    pub representative_images: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImagesMeta {
    pub total: usize,
    pub analyzed: usize,
    pub discarded_low_quality: usize,
    pub clusters: usize,
}

/// Top-level assessment for one claim invocation. Always fully populated,
/// even when no image survived analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub source_images: SourceImagesMeta,
    pub areas: Vec<AreaEntry>,
    pub overall_damage_severity: f64,
    pub data_gaps: Vec<String>,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_resolve_accepts_all_known_labels() {
        for area in Area::ALL {
            assert_eq!(Area::resolve(area.as_str()), area);
        }
    }

    #[test]
    fn area_resolve_maps_unknown_to_other() {
        assert_eq!(Area::resolve("driveway"), Area::Other);
        assert_eq!(Area::resolve(""), Area::Other);
        assert_eq!(Area::resolve("ROOF"), Area::Other);
    }

    #[test]
    fn area_serializes_snake_case() {
        let json = serde_json::to_string(&Area::SolarPanels).unwrap();
        assert_eq!(json, "\"solar_panels\"");
    }

    #[test]
    fn primary_peril_serializes_with_space() {
        let json = serde_json::to_string(&PrimaryPeril::NoWind).unwrap();
        assert_eq!(json, "\"no wind\"");
    }

    #[test]
    fn neutral_classification_matches_contract() {
        let neutral = Classification::neutral();
        assert!(!neutral.is_wind_damage);
        assert_eq!(neutral.area, Area::Other);
        assert_eq!(neutral.severity, 0);
        assert_eq!(neutral.quality, 0.5);
        assert!(neutral.is_related());
        assert_eq!(neutral.confidence, 0.5);
    }
}
