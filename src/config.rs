use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CLASSIC_PROFILE: &str = "classic";
pub const VINTAGE_PROFILE: &str = "vintage";

/// Margin ratios relative to the source width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutParams {
    pub side_ratio: f32,
    pub top_ratio: f32,
    pub bottom_ratio: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            side_ratio: 0.06,
            top_ratio: 0.06,
            bottom_ratio: 0.18,
        }
    }
}

/// Bounds checked before processing and the downsampling cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LimitsParams {
    pub min_size: u32,
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Longest side allowed into the pipeline; larger inputs are downsampled.
    pub max_input_side: u32,
}

impl Default for LimitsParams {
    fn default() -> Self {
        Self {
            min_size: 50,
            min_aspect: 0.3,
            max_aspect: 3.0,
            max_input_side: 4000,
        }
    }
}

/// Per-channel tone curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChemistryParams {
    pub red_floor: u8,
    /// Multiplier applied to red values below `shadow-threshold`.
    pub red_shadow_scale: f32,
    pub shadow_threshold: u8,
    pub green_floor: u8,
    pub blue_floor: u8,
    pub blue_gain: f32,
}

impl Default for ChemistryParams {
    fn default() -> Self {
        Self {
            red_floor: 20,
            red_shadow_scale: 0.9,
            shadow_threshold: 128,
            green_floor: 25,
            blue_floor: 30,
            blue_gain: 1.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SoftFocusMode {
    Off,
    Global,
    #[default]
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OpticsParams {
    pub soft_focus: SoftFocusMode,
    pub blur_radius: f32,
    /// Fraction of the corner distance that stays sharp.
    pub sharp_area: f32,
    /// Magnification offset of the red channel (0.004 = 0.4% larger).
    pub aberration_offset: f32,
    pub vignette_radius: f32,
    pub vignette_strength: f32,
    /// Radial masks are built at `1 / mask_downscale` resolution.
    pub mask_downscale: u32,
}

impl Default for OpticsParams {
    fn default() -> Self {
        Self {
            soft_focus: SoftFocusMode::Radial,
            blur_radius: 1.5,
            sharp_area: 0.5,
            aberration_offset: 0.004,
            vignette_radius: 0.45,
            vignette_strength: 0.45,
            mask_downscale: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GrainParams {
    pub intensity: f32,
    /// Noise is generated at `size / scale` and upsampled.
    pub scale: f32,
    pub cutoff: u8,
}

impl Default for GrainParams {
    fn default() -> Self {
        Self {
            intensity: 0.06,
            scale: 2.0,
            cutoff: 255,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChassisParams {
    pub paper_color: [u8; 3],
    pub paper_noise: f32,
    pub grip_color: [u8; 3],
    pub grip_noise: f32,
    /// Share of the bottom margin occupied by the grip band.
    pub grip_ratio: f32,
    /// How much darker the bottom of the grip gradient gets.
    pub grip_shade: f32,
    pub seam_height: f32,
    pub seam_color: [u8; 3],
    pub seam_opacity: f32,
    pub seam_blur: f32,
    pub corner_radius_top: f32,
    pub corner_radius_bottom: f32,
    pub photo_corner_radius: f32,
}

impl Default for ChassisParams {
    fn default() -> Self {
        Self {
            paper_color: [246, 242, 235],
            paper_noise: 0.04,
            grip_color: [250, 250, 250],
            grip_noise: 0.02,
            grip_ratio: 0.8,
            grip_shade: 0.12,
            seam_height: 0.004,
            seam_color: [0, 0, 0],
            seam_opacity: 0.35,
            seam_blur: 2.0,
            corner_radius_top: 0.01,
            corner_radius_bottom: 0.03,
            photo_corner_radius: 0.006,
        }
    }
}

/// Inner shadow ring along the photo edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ShadowParams {
    /// Ring width as a fraction of the source width.
    pub depth: f32,
    pub blur: f32,
    pub opacity: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            depth: 0.012,
            blur: 3.0,
            opacity: 0.45,
        }
    }
}

/// Tinted light-leak ring; skipped when `opacity` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FringeParams {
    pub depth: f32,
    pub blur: f32,
    pub opacity: f32,
    pub color: [u8; 3],
}

impl Default for FringeParams {
    fn default() -> Self {
        Self {
            depth: 0.006,
            blur: 2.0,
            opacity: 0.25,
            color: [255, 140, 90],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PhotoParams {
    pub max_rotation_degrees: f32,
    pub oversize_factor: f32,
    pub shadow: ShadowParams,
    pub fringe: FringeParams,
}

impl Default for PhotoParams {
    fn default() -> Self {
        Self {
            max_rotation_degrees: 0.8,
            oversize_factor: 0.03,
            shadow: ShadowParams::default(),
            fringe: FringeParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NormalMapParams {
    pub scale: f32,
    pub frame_roughness: f32,
    pub photo_roughness: f32,
    pub smoothing: f32,
    pub intensity: f32,
}

impl Default for NormalMapParams {
    fn default() -> Self {
        Self {
            scale: 0.5,
            frame_roughness: 20.0,
            photo_roughness: 5.0,
            smoothing: 1.0,
            intensity: 2.0,
        }
    }
}

/// Immutable bundle of style constants consumed by every stage.
///
/// `Default` is the classic profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StyleParameters {
    pub layout: LayoutParams,
    pub limits: LimitsParams,
    pub chemistry: ChemistryParams,
    pub optics: OpticsParams,
    pub grain: GrainParams,
    pub chassis: ChassisParams,
    pub photo: PhotoParams,
    pub normal_map: NormalMapParams,
}

impl StyleParameters {
    pub fn classic() -> Self {
        Self::default()
    }

    /// Heavier fade, darker corners, more grain and a sloppier die cut.
    pub fn vintage() -> Self {
        let mut params = Self::default();
        params.chemistry.red_floor = 32;
        params.chemistry.red_shadow_scale = 0.85;
        params.chemistry.green_floor = 30;
        params.chemistry.blue_floor = 26;
        params.chemistry.blue_gain = 0.98;
        params.optics.vignette_radius = 0.35;
        params.optics.vignette_strength = 0.6;
        params.optics.blur_radius = 2.0;
        params.grain.intensity = 0.1;
        params.chassis.paper_color = [240, 232, 216];
        params.chassis.paper_noise = 0.06;
        params.photo.max_rotation_degrees = 1.2;
        params.photo.oversize_factor = 0.045;
        params.photo.fringe.opacity = 0.35;
        params
    }

    /// Resolve a built-in profile by name.
    pub fn profile(name: &str) -> Result<Self> {
        match name {
            CLASSIC_PROFILE => Ok(Self::classic()),
            VINTAGE_PROFILE => Ok(Self::vintage()),
            other => Err(Error::UnknownProfile(other.to_string())),
        }
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        for (name, value) in [
            ("side-ratio", layout.side_ratio),
            ("top-ratio", layout.top_ratio),
            ("bottom-ratio", layout.bottom_ratio),
        ] {
            ensure_unit("layout", name, value)?;
        }

        let limits = &self.limits;
        if limits.min_size == 0 {
            return Err(Error::configuration("limits", "min-size must be positive"));
        }
        if !(limits.min_aspect > 0.0 && limits.min_aspect <= limits.max_aspect) {
            return Err(Error::configuration(
                "limits",
                format!(
                    "aspect bounds [{}, {}] must be positive and ordered",
                    limits.min_aspect, limits.max_aspect
                ),
            ));
        }
        if limits.max_input_side < limits.min_size {
            return Err(Error::configuration(
                "limits",
                "max-input-side must not be smaller than min-size",
            ));
        }

        ensure_non_negative("chemistry", "red-shadow-scale", self.chemistry.red_shadow_scale)?;
        ensure_non_negative("chemistry", "blue-gain", self.chemistry.blue_gain)?;

        let optics = &self.optics;
        ensure_non_negative("optics", "blur-radius", optics.blur_radius)?;
        ensure_unit("optics", "sharp-area", optics.sharp_area)?;
        ensure_unit("optics", "vignette-radius", optics.vignette_radius)?;
        ensure_unit("optics", "vignette-strength", optics.vignette_strength)?;
        ensure_non_negative("optics", "aberration-offset", optics.aberration_offset)?;
        if optics.mask_downscale == 0 {
            return Err(Error::configuration("optics", "mask-downscale must be positive"));
        }

        ensure_unit("grain", "intensity", self.grain.intensity.max(0.0))?;
        if !(self.grain.scale.is_finite() && self.grain.scale >= 1.0) {
            return Err(Error::configuration("grain", "scale must be at least 1"));
        }

        let chassis = &self.chassis;
        ensure_unit("chassis", "paper-noise", chassis.paper_noise.max(0.0))?;
        ensure_unit("chassis", "grip-noise", chassis.grip_noise.max(0.0))?;
        ensure_unit("chassis", "grip-ratio", chassis.grip_ratio)?;
        ensure_unit("chassis", "grip-shade", chassis.grip_shade)?;
        ensure_unit("chassis", "seam-opacity", chassis.seam_opacity)?;
        for (name, value) in [
            ("seam-height", chassis.seam_height),
            ("seam-blur", chassis.seam_blur),
            ("corner-radius-top", chassis.corner_radius_top),
            ("corner-radius-bottom", chassis.corner_radius_bottom),
            ("photo-corner-radius", chassis.photo_corner_radius),
        ] {
            ensure_non_negative("chassis", name, value)?;
        }

        let photo = &self.photo;
        ensure_non_negative("photo", "max-rotation-degrees", photo.max_rotation_degrees)?;
        ensure_unit("photo", "oversize-factor", photo.oversize_factor)?;
        for (name, depth, blur, opacity) in [
            ("shadow", photo.shadow.depth, photo.shadow.blur, photo.shadow.opacity),
            ("fringe", photo.fringe.depth, photo.fringe.blur, photo.fringe.opacity.max(0.0)),
        ] {
            // Depths are fractions of the photo width.
            ensure_unit("photo", name, depth)?;
            ensure_non_negative("photo", name, blur)?;
            ensure_unit("photo", name, opacity)?;
        }

        let normal = &self.normal_map;
        if !(normal.scale > 0.0 && normal.scale <= 1.0) {
            return Err(Error::configuration(
                "normal-map",
                format!("scale {} must be in (0, 1]", normal.scale),
            ));
        }
        ensure_non_negative("normal-map", "frame-roughness", normal.frame_roughness)?;
        ensure_non_negative("normal-map", "photo-roughness", normal.photo_roughness)?;
        ensure_non_negative("normal-map", "smoothing", normal.smoothing)?;
        ensure_non_negative("normal-map", "intensity", normal.intensity)?;
        Ok(())
    }
}

fn ensure_non_negative(stage: &'static str, name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::configuration(
            stage,
            format!("{name} must be a finite non-negative number, got {value}"),
        ))
    }
}

fn ensure_unit(stage: &'static str, name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::configuration(
            stage,
            format!("{name} must be within [0, 1], got {value}"),
        ))
    }
}

/// Built-in profiles plus any loaded from a YAML file.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: BTreeMap<String, StyleParameters>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct ProfileFile {
    profiles: BTreeMap<String, StyleParameters>,
}

impl Default for ProfileSet {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(CLASSIC_PROFILE.to_string(), StyleParameters::classic());
        profiles.insert(VINTAGE_PROFILE.to_string(), StyleParameters::vintage());
        Self { profiles }
    }
}

impl ProfileSet {
    /// Parse user profiles from YAML; entries shadow built-ins of the same name.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ProfileFile = serde_yaml::from_str(yaml)?;
        let mut set = Self::default();
        for (name, params) in file.profiles {
            params.validate()?;
            set.profiles.insert(name, params);
        }
        Ok(set)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn get(&self, name: &str) -> Result<&StyleParameters> {
        self.profiles
            .get(name)
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_validate() {
        StyleParameters::classic().validate().unwrap();
        StyleParameters::vintage().validate().unwrap();
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let err = StyleParameters::profile("sepia").unwrap_err();
        assert!(matches!(err, Error::UnknownProfile(name) if name == "sepia"));
    }

    #[test]
    fn negative_oversize_factor_is_a_configuration_error() {
        let mut params = StyleParameters::classic();
        params.photo.oversize_factor = -0.1;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration { stage: "photo", .. }));
    }

    #[test]
    fn opacity_above_one_is_rejected() {
        let mut params = StyleParameters::classic();
        params.chassis.seam_opacity = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn width_relative_lengths_above_one_are_rejected() {
        let mut params = StyleParameters::classic();
        params.photo.shadow.depth = 1e7;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration { stage: "photo", .. }));

        let mut params = StyleParameters::classic();
        params.layout.side_ratio = 1e9;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration { stage: "layout", .. }));
    }
}
