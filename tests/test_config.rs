mod common;

use common::*;

#[test]
fn presets_carry_documented_defaults() {
    let circular = HoleCountConfig::default();
    assert_eq!(circular, HoleCountConfig::circular());
    assert_eq!(circular.grayscale, GrayscaleMode::Luminance);
    assert!(circular.invert);
    assert_eq!(circular.threshold, ThresholdPolicy::Otsu);
    assert_eq!(
        circular.noise,
        NoiseReduction::Morphological { open_radius: 3, close_radius: 1 }
    );
    assert_eq!(
        circular.predicate,
        HolePredicate::ShapeAndSize { min_circularity: 0.8, min_area: 100 }
    );

    let median = HoleCountConfig::from_preset(Preset::Median);
    assert_eq!(median.grayscale, GrayscaleMode::ChannelMean);
    assert_eq!(median.threshold, ThresholdPolicy::MeanFraction { fraction: 0.5 });
    assert_eq!(median.noise, NoiseReduction::Median { window_size: 20 });
    assert_eq!(median.predicate, HolePredicate::SizeOnly { min_area: 20 });

    let selective = HoleCountConfig::from_preset(Preset::MedianSelective);
    assert_eq!(selective.threshold, ThresholdPolicy::MeanFraction { fraction: 0.3 });
    assert_eq!(selective.noise, NoiseReduction::Median { window_size: 30 });
    assert_eq!(selective.predicate, HolePredicate::SizeOnly { min_area: 25 });
}

#[test]
fn json_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    for preset in [Preset::Circular, Preset::Median, Preset::MedianSelective] {
        let path = dir.path().join(format!("{:?}.json", preset));
        let config = HoleCountConfig::from_preset(preset);
        config.save_json(&path)?;
        assert_eq!(HoleCountConfig::from_json_file(&path)?, config);
    }
    Ok(())
}

#[test]
fn hand_written_json_is_accepted() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "grayscale": "channel_mean",
            "invert": false,
            "threshold": { "kind": "mean_fraction", "fraction": 0.4 },
            "noise": { "kind": "none" },
            "predicate": { "kind": "size_only", "min_area": 5 }
        }"#,
    )?;

    let config = HoleCountConfig::from_json_file(&path)?;
    assert_eq!(config.noise, NoiseReduction::None);
    assert_eq!(config.threshold, ThresholdPolicy::MeanFraction { fraction: 0.4 });
    Ok(())
}

#[test]
fn invalid_values_are_rejected() {
    let mut config = HoleCountConfig::median();
    config.threshold = ThresholdPolicy::MeanFraction { fraction: -0.5 };
    assert!(config.validate().is_err());

    let mut config = HoleCountConfig::median();
    config.noise = NoiseReduction::Median { window_size: 0 };
    assert!(config.validate().is_err());

    let mut config = HoleCountConfig::circular();
    config.predicate = HolePredicate::ShapeAndSize { min_circularity: f64::NAN, min_area: 100 };
    assert!(config.validate().is_err());

    assert!(HoleCountConfig::circular().validate().is_ok());
}

#[test]
fn oversized_radius_is_rejected() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("radius.json");
    std::fs::write(
        &path,
        r#"{
            "grayscale": "luminance",
            "invert": true,
            "threshold": { "kind": "otsu" },
            "noise": { "kind": "morphological", "open_radius": 300, "close_radius": 1 },
            "predicate": { "kind": "shape_and_size", "min_circularity": 0.8, "min_area": 100 }
        }"#,
    )
    .expect("write file");
    assert!(HoleCountConfig::from_json_file(&path).is_err());

    let largest = r#"{ "kind": "morphological", "open_radius": 255, "close_radius": 0 }"#;
    let noise: NoiseReduction = serde_json::from_str(largest).expect("255 fits");
    assert_eq!(noise, NoiseReduction::Morphological { open_radius: 255, close_radius: 0 });
}

#[test]
fn missing_or_malformed_file_is_an_error() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    assert!(HoleCountConfig::from_json_file(&dir.path().join("absent.json")).is_err());

    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").expect("write file");
    assert!(HoleCountConfig::from_json_file(&path).is_err());
}
