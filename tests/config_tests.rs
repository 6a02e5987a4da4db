use instant_print::config::{
    CLASSIC_PROFILE, ProfileSet, SoftFocusMode, StyleParameters, VINTAGE_PROFILE,
};
use instant_print::Error;

#[test]
fn parse_kebab_case_partial_profile() {
    let yaml = r#"
layout:
  bottom-ratio: 0.25
optics:
  soft-focus: global
  vignette-strength: 0.3
"#;
    let params: StyleParameters = serde_yaml::from_str(yaml).unwrap();
    assert!((params.layout.bottom_ratio - 0.25).abs() < f32::EPSILON);
    assert!((params.layout.side_ratio - 0.06).abs() < f32::EPSILON);
    assert_eq!(params.optics.soft_focus, SoftFocusMode::Global);
    assert!((params.optics.vignette_strength - 0.3).abs() < f32::EPSILON);
    assert!((params.optics.vignette_radius - 0.45).abs() < f32::EPSILON);
}

#[test]
fn empty_document_is_classic() {
    let params: StyleParameters = serde_yaml::from_str("{}").unwrap();
    assert_eq!(params, StyleParameters::classic());
}

#[test]
fn partial_fringe_keeps_fringe_defaults() {
    let yaml = r#"
photo:
  fringe:
    opacity: 0.0
"#;
    let params: StyleParameters = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(params.photo.fringe.opacity, 0.0);
    assert_eq!(params.photo.fringe.color, [255, 140, 90]);
    assert!((params.photo.fringe.depth - 0.006).abs() < f32::EPSILON);
    assert!((params.photo.shadow.depth - 0.012).abs() < f32::EPSILON);
}

#[test]
fn profile_file_adds_to_builtins() {
    let yaml = r#"
profiles:
  faded:
    chemistry:
      red-floor: 40
      green-floor: 40
      blue-floor: 40
    grain:
      intensity: 0.2
"#;
    let set = ProfileSet::from_yaml_str(yaml).unwrap();
    let names: Vec<_> = set.names().collect();
    assert_eq!(names, [CLASSIC_PROFILE, "faded", VINTAGE_PROFILE]);

    let faded = set.get("faded").unwrap();
    assert_eq!(faded.chemistry.red_floor, 40);
    assert!((faded.grain.intensity - 0.2).abs() < f32::EPSILON);
    assert_eq!(faded.chassis, StyleParameters::classic().chassis);
}

#[test]
fn profile_file_can_replace_classic() {
    let yaml = r#"
profiles:
  classic:
    photo:
      max-rotation-degrees: 0.0
"#;
    let set = ProfileSet::from_yaml_str(yaml).unwrap();
    assert_eq!(set.get(CLASSIC_PROFILE).unwrap().photo.max_rotation_degrees, 0.0);
}

#[test]
fn invalid_profile_in_file_is_rejected() {
    let yaml = r#"
profiles:
  broken:
    optics:
      vignette-strength: 2.0
"#;
    let err = ProfileSet::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::Configuration { stage: "optics", .. }));
}

#[test]
fn malformed_yaml_is_a_yaml_error() {
    let err = ProfileSet::from_yaml_str("profiles: [1, 2").unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));
}

#[test]
fn missing_profile_lookup() {
    let set = ProfileSet::default();
    assert!(matches!(set.get("polachrome"), Err(Error::UnknownProfile(_))));
}

#[test]
fn vintage_differs_from_classic() {
    let classic = StyleParameters::profile(CLASSIC_PROFILE).unwrap();
    let vintage = StyleParameters::profile(VINTAGE_PROFILE).unwrap();
    assert_ne!(classic, vintage);
    assert_eq!(classic.layout, vintage.layout);
    assert!(vintage.grain.intensity > classic.grain.intensity);
}
