use fsi_config::*;
use fsi_coupling::ModelSpec;

fn sample() -> FsiProperties {
    FsiProperties {
        version: CURRENT_VERSION,
        name: "Round trip".to_string(),
        interface: InterfaceDef {
            fluid_zone: "wetted".to_string(),
            ..Default::default()
        },
        coupling: CouplingDef {
            scheme: "iqn_ils".to_string(),
            coupling_reuse: 3,
            residual_scale: ResidualScaleDef::Fixed { length_m: 2.5e-3 },
            force_coupling: ForceCouplingDef::Weak,
            ..Default::default()
        },
        interpolation: InterpolationDef {
            method: "projection".to_string(),
            update_frequency: 4,
            ..Default::default()
        },
        flow: ModelSpec::new(
            "compliant_chamber",
            serde_yaml::from_str("pressure: 250.0\ndepth: 0.2\n").unwrap(),
        ),
        stress: ModelSpec::new("elastic_foundation", serde_yaml::Value::Null),
        run: RunDef {
            dt_s: 5e-4,
            t_end_s: 0.02,
            max_steps: 1000,
        },
        probe: Some(ProbeDef {
            location_m: [0.25, 0.75, 0.0],
            write_velocity: true,
        }),
    }
}

#[test]
fn roundtrip_yaml() {
    let props = sample();
    let path = std::env::temp_dir().join("fsi_config_roundtrip.yaml");
    save_yaml(&path, &props).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(props, loaded);
}

#[test]
fn roundtrip_json() {
    let props = sample();
    let path = std::env::temp_dir().join("fsi_config_roundtrip.json");
    save_json(&path, &props).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(props.coupling, loaded.coupling);
    assert_eq!(props.probe, loaded.probe);
    let params: serde_yaml::Value = loaded.flow.params;
    assert_eq!(params["pressure"].as_f64(), Some(250.0));
}

#[test]
fn minimal_file_takes_defaults() {
    let props = from_yaml_str(
        "version: 1\nname: minimal\nflow:\n  type: compliant_chamber\nstress:\n  type: elastic_foundation\n",
    )
    .unwrap();
    assert_eq!(props.interface, InterfaceDef::default());
    assert_eq!(props.coupling, CouplingDef::default());
    assert_eq!(props.interpolation, InterpolationDef::default());
    assert_eq!(props.run, RunDef::default());
    assert!(props.probe.is_none());
    assert!(props.flow.params.is_null());
}

#[test]
fn invalid_properties_are_not_saved() {
    let mut props = sample();
    props.run.dt_s = 0.0;
    let path = std::env::temp_dir().join("fsi_config_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &props),
        Err(ConfigError::Validation(_))
    ));
}
