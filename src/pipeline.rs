//! End-to-end print generation.

use std::path::PathBuf;

use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{CLASSIC_PROFILE, StyleParameters};
use crate::debug::{DEFAULT_DEBUG_DIR, DebugSink, DirectorySink, NullSink};
use crate::error::Result;
use crate::processing::chassis::{ChassisSeeds, build_chassis};
use crate::processing::chemistry::develop;
use crate::processing::composite::composite;
use crate::processing::grain::apply_grain;
use crate::processing::layout::compute_layout;
use crate::processing::normal_map::{NormalSeeds, combined_normal_map};
use crate::processing::optics::apply_optics;
use crate::processing::photo_block::{assemble_photo_block, plan_block};
use crate::processing::resample::cap_longest_side;
use crate::result::{ResultBundle, StyleInfo};
use crate::validation::validate_dimensions;

/// Per-call replacements for profile values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_intensity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_angle: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub profile: String,
    /// Dump intermediate frames into `debug_dir`.
    pub debug: bool,
    pub debug_dir: PathBuf,
    pub generate_normal: bool,
    pub overrides: Overrides,
}

impl Default for ProcessRequest {
    fn default() -> Self {
        Self {
            profile: CLASSIC_PROFILE.to_string(),
            debug: false,
            debug_dir: PathBuf::from(DEFAULT_DEBUG_DIR),
            generate_normal: true,
            overrides: Overrides::default(),
        }
    }
}

impl ProcessRequest {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Self::default()
        }
    }
}

/// Turn `image` into a print using a built-in profile.
///
/// A debug request without an explicit sink writes frames to
/// `request.debug_dir`.
pub fn process(image: &DynamicImage, request: &ProcessRequest) -> Result<ResultBundle> {
    let params = StyleParameters::profile(&request.profile)?;
    if request.debug {
        let mut sink = DirectorySink::new(&request.debug_dir);
        process_with(image, request, &params, &mut sink)
    } else {
        process_with(image, request, &params, &mut NullSink)
    }
}

/// Seeds for every random consumer, derived from one generator so a single
/// seed replays the whole print.
#[derive(Debug, Clone, Copy)]
struct StageSeeds {
    photo_grain: u64,
    paper: u64,
    grip: u64,
    normal_coarse: u64,
    normal_fine: u64,
}

/// Turn `image` into a print with explicit parameters and debug sink.
///
/// `request.profile` is only recorded in the metadata here; `params` is what
/// drives the stages. Dimension checks run before any pixel work.
#[instrument(
    skip_all,
    fields(profile = %request.profile, width = image.width(), height = image.height())
)]
pub fn process_with(
    image: &DynamicImage,
    request: &ProcessRequest,
    params: &StyleParameters,
    sink: &mut dyn DebugSink,
) -> Result<ResultBundle> {
    validate_dimensions(image.width(), image.height(), &params.limits)?;
    params.validate()?;

    let source = cap_longest_side(image.to_rgb8(), params.limits.max_input_side)?;
    sink.record(&DynamicImage::ImageRgb8(source.clone()), "source");
    let (width, height) = source.dimensions();
    let layout = compute_layout(width, height, &params.layout);

    let overrides = &request.overrides;
    let seed = overrides
        .seed
        .unwrap_or_else(|| StdRng::from_os_rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let max_rotation = params.photo.max_rotation_degrees;
    let drawn_angle = if max_rotation > 0.0 {
        rng.random_range(-max_rotation..=max_rotation)
    } else {
        0.0
    };
    let angle = overrides.rotation_angle.unwrap_or(drawn_angle);
    let seeds = StageSeeds {
        photo_grain: rng.random(),
        paper: rng.random(),
        grip: rng.random(),
        normal_coarse: rng.random(),
        normal_fine: rng.random(),
    };
    debug!(seed, angle, ?layout, "resolved layout and randomness");

    // Reject impossible block geometry before spending time on pixels.
    plan_block(
        (width, height),
        angle,
        params.chassis.photo_corner_radius,
        &params.photo,
    )?;

    let developed = develop(&source, &params.chemistry);
    sink.record(&DynamicImage::ImageRgb8(developed.clone()), "chemistry");

    let optical = apply_optics(&developed, &params.optics)?;
    sink.record(&DynamicImage::ImageRgb8(optical.clone()), "optics");

    let grain_intensity = overrides
        .grain_intensity
        .unwrap_or(params.grain.intensity);
    let grained = apply_grain(
        &optical,
        grain_intensity,
        Some(seeds.photo_grain),
        &params.grain,
    )?;
    sink.record(&DynamicImage::ImageRgb8(grained.clone()), "grain");

    let chassis = build_chassis(
        &layout,
        (width, height),
        &params.chassis,
        &params.grain,
        Some(angle),
        ChassisSeeds {
            paper: Some(seeds.paper),
            grip: Some(seeds.grip),
        },
    )?;
    sink.record(&DynamicImage::ImageRgba8(chassis.clone()), "chassis");

    let block = assemble_photo_block(
        &grained,
        angle,
        params.chassis.photo_corner_radius,
        &params.photo,
    )?;
    sink.record(&DynamicImage::ImageRgba8(block.clone()), "photo_block");

    let composed = composite(&layout, &block, &chassis);
    sink.record(&DynamicImage::ImageRgba8(composed.image.clone()), "final");
    sink.record(&DynamicImage::ImageLuma8(composed.photo_mask.clone()), "photo_mask");

    let photo_rect = layout.photo_rect(width, height);
    let normal_map = request.generate_normal.then(|| {
        combined_normal_map(
            layout.total_size,
            photo_rect,
            &params.normal_map,
            NormalSeeds {
                coarse: Some(seeds.normal_coarse),
                fine: Some(seeds.normal_fine),
            },
        )
    });
    if let Some(normal) = &normal_map {
        sink.record(&DynamicImage::ImageRgb8(normal.clone()), "normal_map");
    }

    Ok(ResultBundle {
        image: composed.image,
        photo_mask: composed.photo_mask,
        photo_rect,
        border_rect: layout.border_rect(),
        style_info: StyleInfo {
            profile: request.profile.clone(),
            seed,
            rotation_angle: angle,
            overrides: overrides.clone(),
        },
        normal_map,
    })
}
