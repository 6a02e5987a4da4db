use image::{DynamicImage, Rgb, RgbImage};
use instant_print::processing::mask::bounding_box;
use instant_print::processing::photo_block::oversize_buffer;
use instant_print::{
    NullSink, Overrides, ProcessRequest, Rect, StyleParameters, process, process_with,
};

fn solid(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 140, 200])))
}

fn seeded(seed: u64) -> ProcessRequest {
    ProcessRequest {
        overrides: Overrides {
            seed: Some(seed),
            ..Overrides::default()
        },
        ..ProcessRequest::default()
    }
}

#[test]
fn classic_thousand_square_end_to_end() {
    let result = process(&solid(1000, 1000), &seeded(2024)).unwrap();

    assert_eq!(result.size(), (1120, 1240));
    assert_eq!(result.border_rect, Rect::new(0, 0, 1120, 1240));
    assert_eq!(result.photo_rect, Rect::new(60, 60, 1000, 1000));
    assert_eq!(result.photo_mask.dimensions(), (1120, 1240));

    let bbox = bounding_box(&result.photo_mask).expect("mask must not be empty");
    let border = result.border_rect;
    assert!(bbox.x > border.x && bbox.y > border.y);
    assert!(bbox.x + bbox.width < border.width);
    assert!(bbox.y + bbox.height < border.height);

    let buffer = oversize_buffer(1000, 1000, StyleParameters::classic().photo.oversize_factor);
    assert!(bbox.x >= 60 && bbox.x - 60 <= buffer);
    assert!(bbox.y >= 60 && bbox.y - 60 <= buffer);
    assert!(result.photo_rect.contains(&bbox));

    let normal = result.normal_map.as_ref().expect("normal map requested by default");
    assert_eq!(normal.dimensions(), (560, 620));
    assert!(result.style_info.rotation_angle.abs() <= 0.8);
    assert_eq!(result.style_info.profile, "classic");
}

#[test]
fn visible_photo_pixels_match_mask() {
    let result = process(&solid(300, 200), &seeded(5)).unwrap();
    for (x, y, m) in result.photo_mask.enumerate_pixels() {
        if m.0[0] == 255 {
            let p = result.image.get_pixel(x, y).0;
            assert_eq!(p[3], 255, "masked pixel ({x}, {y}) must be opaque");
        }
    }
    // Frame paper is opaque away from the corners and the window.
    assert_eq!(result.image.get_pixel(150, 3).0[3], 255);
}

#[test]
fn same_seed_reproduces_everything() {
    let img = solid(240, 180);
    let a = process(&img, &seeded(77)).unwrap();
    let b = process(&img, &seeded(77)).unwrap();
    assert_eq!(a.image, b.image);
    assert_eq!(a.photo_mask, b.photo_mask);
    assert_eq!(a.normal_map, b.normal_map);
    assert_eq!(a.style_info, b.style_info);
}

#[test]
fn different_seeds_change_the_print() {
    let img = solid(240, 180);
    let a = process(&img, &seeded(1)).unwrap();
    let b = process(&img, &seeded(2)).unwrap();
    assert_ne!(a.image, b.image);
}

#[test]
fn unseeded_runs_record_their_seed() {
    let img = solid(160, 120);
    let first = process(&img, &ProcessRequest::default()).unwrap();
    let replay = process(&img, &seeded(first.style_info.seed)).unwrap();
    assert_eq!(first.image, replay.image);
    assert_eq!(first.style_info.rotation_angle, replay.style_info.rotation_angle);
}

#[test]
fn zero_rotation_keeps_mask_axis_aligned() {
    let mut request = seeded(3);
    request.overrides.rotation_angle = Some(0.0);
    let result = process(&solid(400, 300), &request).unwrap();
    let bbox = bounding_box(&result.photo_mask).unwrap();
    assert_eq!(bbox, result.photo_rect);
}

#[test]
fn zero_grain_override_is_recorded() {
    let mut request = seeded(9);
    request.overrides.grain_intensity = Some(0.0);
    let result = process(&solid(200, 200), &request).unwrap();
    assert_eq!(result.style_info.overrides.grain_intensity, Some(0.0));
}

#[test]
fn impossible_rotation_is_a_configuration_error() {
    let mut request = seeded(4);
    request.overrides.rotation_angle = Some(25.0);
    let err = process(&solid(300, 300), &request).unwrap_err();
    assert!(matches!(err, instant_print::Error::Configuration { .. }));
}

#[test]
fn non_finite_rotation_is_a_configuration_error() {
    for angle in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let mut request = seeded(4);
        request.overrides.rotation_angle = Some(angle);
        let err = process(&solid(200, 200), &request).unwrap_err();
        assert!(
            matches!(err, instant_print::Error::Configuration { .. }),
            "angle {angle} gave {err:?}"
        );
    }
}

#[test]
fn extreme_aspects_render_under_every_profile() {
    for profile in ["classic", "vintage"] {
        for (w, h) in [(50, 166), (166, 50)] {
            for seed in [0, 11, 12345] {
                let mut request = ProcessRequest::with_profile(profile);
                request.overrides.seed = Some(seed);
                let result = process(&solid(w, h), &request)
                    .unwrap_or_else(|err| panic!("{profile} {w}x{h} seed {seed}: {err}"));
                assert_eq!(result.style_info.profile, profile);
                let bbox = bounding_box(&result.photo_mask).expect("photo window visible");
                assert!(result.photo_rect.contains(&bbox));
            }
        }
    }
}

#[test]
fn debug_request_writes_frames() {
    let tmp = tempfile::tempdir().unwrap();
    let mut request = seeded(6);
    request.debug = true;
    request.debug_dir = tmp.path().join("frames");
    process(&solid(120, 100), &request).unwrap();
    assert!(request.debug_dir.join("00_source.png").exists());
    assert!(request.debug_dir.join("06_final.png").exists());
}

#[test]
fn explicit_params_drive_the_layout() {
    let mut params = StyleParameters::classic();
    params.layout.bottom_ratio = 0.3;
    let result = process_with(&solid(200, 200), &seeded(1), &params, &mut NullSink).unwrap();
    assert_eq!(result.size(), (224, 272));
}
