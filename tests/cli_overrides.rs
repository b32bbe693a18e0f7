//! Generated command-line parser tests

mod fixtures;

use cfgtree::{
    build_parser, merge_namespace, Array, CfgError, ConfigOrigin, EffectiveConfig,
    NamespacePolicy, OptionKind, Value,
};
use fixtures::{argv, image_tree, svm_report};

#[test]
fn test_array_override_round_trips_through_namespace() {
    let mut cfg = image_tree();
    let spec = build_parser(&cfg).unwrap();

    let ns = spec
        .parse_from(argv(&["--IMG_SIZE", "256", "256", "1"]))
        .unwrap();
    merge_namespace(&ns, &mut cfg, NamespacePolicy::Strict).unwrap();

    assert_eq!(
        cfg.lookup("IMG_SIZE"),
        Some(&Value::from(Array::from(vec![256_i64, 256, 1])))
    );
    assert_eq!(cfg.lookup("AUGMENT"), Some(&Value::Bool(true)));
}

#[test]
fn test_option_kinds_follow_leaves() {
    let spec = build_parser(&image_tree()).unwrap();
    let kinds: Vec<String> = spec.options().iter().map(|o| o.kind.to_string()).collect();
    assert_eq!(
        kinds,
        vec![
            "array<int; 3>",
            "array<float; 3>",
            "bool",
            "tuple<int; 2>",
            "float",
            "str"
        ]
    );
    assert!(matches!(
        spec.option("MEAN").map(|o| o.kind),
        Some(OptionKind::Array { len: 3, .. })
    ));
}

#[test]
fn test_float_array_accepts_integer_tokens() {
    let mut cfg = image_tree();
    let ns = build_parser(&cfg)
        .unwrap()
        .parse_from(argv(&["--MEAN", "1", "-2.5", "0.25"]))
        .unwrap();
    merge_namespace(&ns, &mut cfg, NamespacePolicy::Strict).unwrap();
    assert_eq!(
        cfg.lookup("MEAN"),
        Some(&Value::from(Array::from(vec![1.0, -2.5, 0.25])))
    );
}

#[test]
fn test_last_occurrence_wins() {
    let ns = build_parser(&image_tree())
        .unwrap()
        .parse_from(argv(&["--SVM.IMPL", "a", "--SVM.IMPL", "b"]))
        .unwrap();
    assert_eq!(ns.get("SVM.IMPL"), Some(&Value::from("b")));
}

#[test]
fn test_bad_boolean_token_is_rejected() {
    let spec = build_parser(&image_tree()).unwrap();
    let err = spec.parse_from(argv(&["--AUGMENT", "sometimes"])).unwrap_err();
    assert!(matches!(err, CfgError::Cli(_)));
    assert!(err.to_string().contains("sometimes"));

    let ns = spec.parse_from(argv(&["--AUGMENT", "no"])).unwrap();
    assert_eq!(ns.get("AUGMENT"), Some(&Value::Bool(false)));
}

#[test]
fn test_report_records_cli_source() {
    let mut report = svm_report();
    let written = report
        .merge_cli(
            argv(&["--SVM.KERNEL.TYPE", "linear", "--SEEDS", "9"]),
            NamespacePolicy::Strict,
        )
        .unwrap();

    assert_eq!(written, 8);
    assert_eq!(report.get("SVM.KERNEL.TYPE"), Some(&Value::from("linear")));
    assert_eq!(report.get("SEEDS"), Some(&Value::List(vec![Value::Int(9)])));
    assert_eq!(report.get("SVM.C"), Some(&Value::Float(100.0)));

    let last = report.sources.last().unwrap();
    assert_eq!(last.origin, ConfigOrigin::Cli);
    assert!(last.path.is_none());
}

#[test]
fn test_partial_namespace_from_schema_leaves() {
    let mut cfg = EffectiveConfig::from_tree(image_tree()).config;
    let ns: cfgtree::Namespace = [("SVM.C", Value::Int(5))].into_iter().collect();

    assert!(matches!(
        merge_namespace(&ns, &mut cfg, NamespacePolicy::Strict),
        Err(CfgError::MissingNamespaceKey { .. })
    ));

    let written = merge_namespace(&ns, &mut cfg, NamespacePolicy::Partial).unwrap();
    assert_eq!(written, 1);
    assert_eq!(cfg.lookup_path("SVM.C"), Some(&Value::Float(5.0)));
}

#[test]
fn test_overrides_after_document_merge_use_merged_defaults() {
    let mut report = svm_report();
    report
        .merge_file(&fixtures::svm_path("overlay.yaml"))
        .unwrap();
    report
        .merge_cli(argv(&["--RNG_SEED", "-1"]), NamespacePolicy::Strict)
        .unwrap();

    assert_eq!(report.get("RNG_SEED"), Some(&Value::Int(-1)));
    assert_eq!(report.get("SVM.IMPL"), Some(&Value::from("generic")));
}
