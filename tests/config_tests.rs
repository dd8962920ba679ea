use std::io::Write;

use room_preview::config::{Configuration, Rgb, from_yaml_file};
use room_preview::dimensions::parse_dimensions;

#[test]
fn full_config_round_trips_from_yaml() {
    let yaml = r##"
artwork-image: art/piece.png
chair-image: art/chair.png
dimensions: "96 × 80 cm"
wall-colors:
  top: "#f8f7f6"
  bottom: "#f2f0ed"
floor-colors:
  top: "#b8b5b0"
  bottom: "#9a9792"
show-chair: true
debug-overlay: true
artwork-anchor:
  center-x: 760
chair-anchor:
  floor-offset: 120
"##;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    cfg.validate().unwrap();
    assert_eq!(
        cfg.artwork_image.as_deref(),
        Some(std::path::Path::new("art/piece.png"))
    );
    let dims = cfg.dimensions_cm().unwrap();
    assert_eq!((dims.width_cm, dims.height_cm), (96.0, 80.0));
    assert_eq!(cfg.wall_colors.unwrap().top, Rgb([0xf8, 0xf7, 0xf6]));
    assert!(cfg.debug_overlay);
    assert_eq!(cfg.artwork_anchor.center_x, Some(760.0));
    assert_eq!(cfg.chair_anchor.floor_offset, Some(120.0));
}

#[test]
fn empty_config_is_the_default_room() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    cfg.validate().unwrap();
    assert!(cfg.artwork_image.is_none());
    assert!(cfg.show_chair);
    assert!(!cfg.debug_overlay);
    assert!(cfg.dimensions_cm().is_none());
}

#[test]
fn unparseable_dimensions_degrade_to_none() {
    let cfg: Configuration = serde_yaml::from_str(r#"dimensions: "huge""#).unwrap();
    // validate only warns; the scene falls back to the reference anchors
    cfg.validate().unwrap();
    assert!(cfg.dimensions_cm().is_none());
}

#[test]
fn dimension_string_grammar() {
    for ok in ["96 × 80 cm", "96x80cm", "120 X 100 cm", "30.5 x 24 cm"] {
        assert!(parse_dimensions(ok).is_some(), "rejected {ok:?}");
    }
    for bad in ["abc", "96 cm", "96 × 80", "", "0 x 10 cm", "-5 x 10 cm"] {
        assert!(parse_dimensions(bad).is_none(), "accepted {bad:?}");
    }
}

#[test]
fn bad_hex_color_is_a_parse_error() {
    let err = serde_yaml::from_str::<Configuration>(
        r##"
wall-colors:
  top: "#f8f7f6"
  bottom: "not-a-color"
"##,
    )
    .unwrap_err();
    assert!(err.to_string().contains("rrggbb"), "{err}");
}

#[test]
fn loads_from_a_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "dimensions: \"200 x 140 cm\"").unwrap();
    writeln!(f, "show-chair: false").unwrap();

    let cfg = from_yaml_file(&path).unwrap();
    assert!(!cfg.show_chair);
    let dims = cfg.dimensions_cm().unwrap();
    assert_eq!((dims.width_cm, dims.height_cm), (200.0, 140.0));
}

#[test]
fn missing_file_surfaces_an_io_error() {
    let err = from_yaml_file(std::path::Path::new("/no/such/config.yaml")).unwrap_err();
    assert!(matches!(err, room_preview::error::Error::Io(_)));
}
