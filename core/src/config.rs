use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const GAP_MM_DEFAULT: f32 = 1.0;
pub const GAP_MM_MIN: f32 = 0.0;
pub const GAP_MM_MAX: f32 = 6.0;

pub const WRIST_SIZE_CM_DEFAULT: f32 = 15.0;
pub const WRIST_SIZE_CM_MIN: f32 = 10.0;
pub const WRIST_SIZE_CM_MAX: f32 = 25.0;

pub const WRIST_TOLERANCE_MM_DEFAULT: f32 = 20.0;
pub const WRIST_TOLERANCE_MM_MIN: f32 = 0.0;
pub const WRIST_TOLERANCE_MM_MAX: f32 = 40.0;

pub const RAIL_LEFT_PX_DEFAULT: f32 = 64.0;
pub const RAIL_RIGHT_PX_DEFAULT: f32 = 64.0;
pub const STAGE_MIN_PX_DEFAULT: f32 = 220.0;
pub const STAGE_MAX_PX_DEFAULT: f32 = 420.0;
pub const STAGE_OVERSCAN_DEFAULT: f32 = 1.08;
pub const STAGE_TOP_PX_DEFAULT: f32 = 72.0;
pub const GUIDE_RADIUS_RATIO_DEFAULT: f32 = 0.40;
pub const GUIDE_RADIUS_MIN_PX_DEFAULT: f32 = 90.0;
pub const GUIDE_RADIUS_MAX_PX_DEFAULT: f32 = 180.0;
pub const REFERENCE_STAGE_PX_DEFAULT: f32 = 320.0;

pub const BEAD_VISUAL_SHRINK_DEFAULT: f32 = 0.85;
pub const BEAD_MIN_PX_DEFAULT: f32 = 12.0;
pub const BEAD_MAX_PX_DEFAULT: f32 = 56.0;

pub const LONG_PRESS_MS_DEFAULT: u32 = 280;
pub const JITTER_PX_DEFAULT: f32 = 6.0;
pub const SWAP_THRESHOLD_RAD_DEFAULT: f32 = 0.45;
pub const DELETE_ZONE_FRACTION_DEFAULT: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read rules from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rules: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{low_field} ({low}) must not exceed {high_field} ({high})")]
    Inverted {
        low_field: &'static str,
        low: f32,
        high_field: &'static str,
        high: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageRules {
    pub rail_left_px: f32,
    pub rail_right_px: f32,
    pub stage_min_px: f32,
    pub stage_max_px: f32,
    pub stage_overscan: f32,
    pub stage_top_px: f32,
    pub guide_radius_ratio: f32,
    pub guide_radius_min_px: f32,
    pub guide_radius_max_px: f32,
    pub reference_stage_px: f32,
}

impl Default for StageRules {
    fn default() -> Self {
        Self {
            rail_left_px: RAIL_LEFT_PX_DEFAULT,
            rail_right_px: RAIL_RIGHT_PX_DEFAULT,
            stage_min_px: STAGE_MIN_PX_DEFAULT,
            stage_max_px: STAGE_MAX_PX_DEFAULT,
            stage_overscan: STAGE_OVERSCAN_DEFAULT,
            stage_top_px: STAGE_TOP_PX_DEFAULT,
            guide_radius_ratio: GUIDE_RADIUS_RATIO_DEFAULT,
            guide_radius_min_px: GUIDE_RADIUS_MIN_PX_DEFAULT,
            guide_radius_max_px: GUIDE_RADIUS_MAX_PX_DEFAULT,
            reference_stage_px: REFERENCE_STAGE_PX_DEFAULT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeadRules {
    /// Fraction of a bead's arc length used for its rendered diameter.
    pub visual_shrink: f32,
    pub min_px: f32,
    pub max_px: f32,
}

impl Default for BeadRules {
    fn default() -> Self {
        Self {
            visual_shrink: BEAD_VISUAL_SHRINK_DEFAULT,
            min_px: BEAD_MIN_PX_DEFAULT,
            max_px: BEAD_MAX_PX_DEFAULT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureRules {
    pub long_press_ms: u32,
    pub jitter_px: f32,
    pub swap_threshold_rad: f32,
    pub delete_zone_fraction: f32,
}

impl Default for GestureRules {
    fn default() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS_DEFAULT,
            jitter_px: JITTER_PX_DEFAULT,
            swap_threshold_rad: SWAP_THRESHOLD_RAD_DEFAULT,
            delete_zone_fraction: DELETE_ZONE_FRACTION_DEFAULT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerRules {
    pub gap_mm: f32,
    pub wrist_size_cm: f32,
    pub wrist_tolerance_mm: f32,
    pub stage: StageRules,
    pub bead: BeadRules,
    pub gesture: GestureRules,
}

impl Default for DesignerRules {
    fn default() -> Self {
        Self {
            gap_mm: GAP_MM_DEFAULT,
            wrist_size_cm: WRIST_SIZE_CM_DEFAULT,
            wrist_tolerance_mm: WRIST_TOLERANCE_MM_DEFAULT,
            stage: StageRules::default(),
            bead: BeadRules::default(),
            gesture: GestureRules::default(),
        }
    }
}

impl DesignerRules {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let rules: Self = toml::from_str(raw)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        in_range("gap_mm", self.gap_mm, GAP_MM_MIN, GAP_MM_MAX)?;
        in_range(
            "wrist_size_cm",
            self.wrist_size_cm,
            WRIST_SIZE_CM_MIN,
            WRIST_SIZE_CM_MAX,
        )?;
        in_range(
            "wrist_tolerance_mm",
            self.wrist_tolerance_mm,
            WRIST_TOLERANCE_MM_MIN,
            WRIST_TOLERANCE_MM_MAX,
        )?;

        let stage = &self.stage;
        in_range("stage.rail_left_px", stage.rail_left_px, 0.0, 1024.0)?;
        in_range("stage.rail_right_px", stage.rail_right_px, 0.0, 1024.0)?;
        in_range("stage.stage_min_px", stage.stage_min_px, 1.0, 4096.0)?;
        in_range("stage.stage_max_px", stage.stage_max_px, 1.0, 4096.0)?;
        ordered(
            "stage.stage_min_px",
            stage.stage_min_px,
            "stage.stage_max_px",
            stage.stage_max_px,
        )?;
        in_range("stage.stage_overscan", stage.stage_overscan, 1.0, 1.5)?;
        in_range("stage.stage_top_px", stage.stage_top_px, 0.0, 4096.0)?;
        in_range(
            "stage.guide_radius_ratio",
            stage.guide_radius_ratio,
            0.05,
            0.5,
        )?;
        in_range(
            "stage.guide_radius_min_px",
            stage.guide_radius_min_px,
            1.0,
            2048.0,
        )?;
        in_range(
            "stage.guide_radius_max_px",
            stage.guide_radius_max_px,
            1.0,
            2048.0,
        )?;
        ordered(
            "stage.guide_radius_min_px",
            stage.guide_radius_min_px,
            "stage.guide_radius_max_px",
            stage.guide_radius_max_px,
        )?;
        in_range(
            "stage.reference_stage_px",
            stage.reference_stage_px,
            1.0,
            4096.0,
        )?;

        let bead = &self.bead;
        in_range("bead.visual_shrink", bead.visual_shrink, 0.1, 1.0)?;
        in_range("bead.min_px", bead.min_px, 1.0, 512.0)?;
        in_range("bead.max_px", bead.max_px, 1.0, 512.0)?;
        ordered("bead.min_px", bead.min_px, "bead.max_px", bead.max_px)?;

        let gesture = &self.gesture;
        in_range(
            "gesture.long_press_ms",
            gesture.long_press_ms as f32,
            1.0,
            5000.0,
        )?;
        in_range("gesture.jitter_px", gesture.jitter_px, 0.0, 64.0)?;
        in_range(
            "gesture.swap_threshold_rad",
            gesture.swap_threshold_rad,
            0.01,
            PI,
        )?;
        in_range(
            "gesture.delete_zone_fraction",
            gesture.delete_zone_fraction,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

pub fn clamp_gap_mm(value: f32) -> f32 {
    clamp_or(value, GAP_MM_MIN, GAP_MM_MAX, GAP_MM_DEFAULT)
}

pub fn clamp_wrist_size_cm(value: f32) -> f32 {
    clamp_or(value, WRIST_SIZE_CM_MIN, WRIST_SIZE_CM_MAX, WRIST_SIZE_CM_DEFAULT)
}

pub fn clamp_wrist_tolerance_mm(value: f32) -> f32 {
    clamp_or(
        value,
        WRIST_TOLERANCE_MM_MIN,
        WRIST_TOLERANCE_MM_MAX,
        WRIST_TOLERANCE_MM_DEFAULT,
    )
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn ordered(
    low_field: &'static str,
    low: f32,
    high_field: &'static str,
    high: f32,
) -> Result<(), ConfigError> {
    if low <= high {
        Ok(())
    } else {
        Err(ConfigError::Inverted {
            low_field,
            low,
            high_field,
            high,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(DesignerRules::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let rules = DesignerRules::from_toml_str(
            r#"
            gap_mm = 2.0

            [gesture]
            long_press_ms = 400
            "#,
        )
        .expect("rules parse");
        assert_eq!(rules.gap_mm, 2.0);
        assert_eq!(rules.gesture.long_press_ms, 400);
        assert_eq!(rules.gesture.jitter_px, JITTER_PX_DEFAULT);
        assert_eq!(rules.stage, StageRules::default());
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = DesignerRules::from_toml_str("wrist_size_cm = 80.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "wrist_size_cm",
                ..
            }
        ));
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = DesignerRules::from_toml_str(
            r#"
            [bead]
            min_px = 40.0
            max_px = 20.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Inverted { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = DesignerRules::from_toml_str("gap_mm = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn clamps_fall_back_on_nan() {
        assert_eq!(clamp_gap_mm(f32::NAN), GAP_MM_DEFAULT);
        assert_eq!(clamp_gap_mm(-3.0), GAP_MM_MIN);
        assert_eq!(clamp_wrist_size_cm(100.0), WRIST_SIZE_CM_MAX);
    }
}
