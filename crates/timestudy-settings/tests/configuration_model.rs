use proptest::prelude::*;
use timestudy_settings::{ConfigField, ConfigurationModel, FieldKind};

fn numeric_fields() -> Vec<ConfigField> {
    ConfigField::ALL
        .iter()
        .copied()
        .filter(|f| f.kind().is_numeric())
        .collect()
}

proptest! {
    #[test]
    fn prop_positive_numbers_always_validate(value in 0.001f64..1.0e6) {
        let mut model = ConfigurationModel::new();
        for field in numeric_fields() {
            model.set(field, &value.to_string()).unwrap();
        }
        let config = model.validate().unwrap();
        prop_assert_eq!(config.rapid_accel_g, value);
        prop_assert_eq!(config.lifter_time, value);
    }

    #[test]
    fn prop_non_numeric_text_is_always_invalid(raw in "[a-zA-Z ,]{1,12}") {
        // Words that f64 parsing accepts are not interesting here
        prop_assume!(raw.trim().parse::<f64>().is_err());

        let mut model = ConfigurationModel::new();
        prop_assert!(model.set(ConfigField::CutAccelG, &raw).is_err());
        let err = model.validate().unwrap_err();
        prop_assert_eq!(err.field_names(), vec!["cut_accel_g"]);
    }

    #[test]
    fn prop_negative_numbers_never_validate(value in -1.0e6f64..-0.0001) {
        for field in numeric_fields() {
            let mut model = ConfigurationModel::new();
            model.set(field, &value.to_string()).unwrap();
            let err = model.validate().unwrap_err();
            prop_assert_eq!(err.field_names(), vec![field.name()]);
        }
    }
}

#[test]
fn test_zero_allowed_only_for_times() {
    for field in numeric_fields() {
        let mut model = ConfigurationModel::new();
        model.set(field, "0").unwrap();
        let ok = model.validate().is_ok();
        assert_eq!(ok, field.kind() == FieldKind::NonNegativeReal, "{}", field);
    }
}

#[test]
fn test_every_failure_reported_together() {
    let mut model = ConfigurationModel::new();
    let _ = model.set(ConfigField::RapidAccelG, "fast");
    model.set(ConfigField::BeamOnCode, "").unwrap();
    let _ = model.set(ConfigField::FollowProgramArcs, "sometimes");

    let err = model.validate().unwrap_err();
    assert_eq!(
        err.field_names(),
        vec!["rapid_accel_g", "beam_on_code", "followProgramArcs"]
    );
}
