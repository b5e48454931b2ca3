mod common;

use std::collections::HashMap;

use entitlement_engine as ee;
use ee::domain::types::{AuthorizationConfig, ExtensionSet};

fn set(pairs: &[(&str, &str)]) -> ExtensionSet {
    pairs.iter().copied().collect()
}

#[test]
fn granted_when_url_is_prefix_of_destination() {
    let ext = set(&[(common::DOWNLOAD_URL_OID, "/content/repo/rhel")]);
    assert!(ee::is_authorized(common::RHEL_DESTINATION, &ext));
}

#[test]
fn denied_when_url_not_in_destination() {
    let ext = set(&[(common::DOWNLOAD_URL_OID, "/other/path")]);
    assert!(!ee::is_authorized(common::RHEL_DESTINATION, &ext));
}

#[test]
fn unrecognized_oid_never_grants() {
    let ext = set(&[("2.9.9.9", "/content")]);
    assert!(!ee::is_authorized("/content/repo", &ext));
}

#[test]
fn empty_extension_set_denies() {
    assert!(!ee::is_authorized("/content/repo", &ExtensionSet::new()));
    assert!(!ee::is_authorized(common::RHEL_DESTINATION, &ExtensionSet::new()));
}

#[test]
fn empty_destination_denies() {
    let ext = set(&[(common::DOWNLOAD_URL_OID, "/content")]);
    assert!(!ee::is_authorized("", &ext));
}

#[test]
fn prefix_only_or_suffix_only_oid_never_grants() {
    let auth = ee::Authorizer::default();
    // prefix holds, suffix does not
    let prefix_only = set(&[("1.3.6.1.4.1.2312.9.2.5.1.7", "/content")]);
    // suffix holds, prefix does not
    let suffix_only = set(&[("1.3.6.1.4.1.9999.9.2.5.1.6", "/content")]);
    // matches the content namespace but is the name field
    let name_field = set(&[("1.3.6.1.4.1.2312.9.2.5.1", "/content")]);
    for ext in [prefix_only, suffix_only, name_field] {
        assert!(!auth.is_authorized("/content/repo", &ext));
    }
}

#[test]
fn substring_match_is_not_anchored() {
    // Containment anywhere in the destination counts.
    let ext = set(&[(common::DOWNLOAD_URL_OID, "rhel/6")]);
    assert!(ee::is_authorized(common::RHEL_DESTINATION, &ext));
    let ext = set(&[(common::DOWNLOAD_URL_OID, "/content")]);
    assert!(ee::is_authorized("/mirror/content/repo", &ext));
}

#[test]
fn order_of_extensions_does_not_matter() {
    let pairs = vec![
        ("2.9.9.9", "/content"),
        ("1.3.6.1.4.1.2312.9.2.7.1.6", "/other/path"),
        (common::DOWNLOAD_URL_OID, "/content/repo/rhel"),
        ("1.3.6.1.4.1.2312.9.2.5.1", "RHEL"),
    ];
    let auth = ee::Authorizer::default();
    let forward = auth.authorize_pairs(common::RHEL_DESTINATION, pairs.iter().copied());
    let reverse = auth.authorize_pairs(common::RHEL_DESTINATION, pairs.iter().rev().copied());
    let rotated = auth.authorize_pairs(
        common::RHEL_DESTINATION,
        pairs.iter().cycle().skip(2).take(pairs.len()).copied(),
    );
    assert!(forward && reverse && rotated);

    let denied_forward = auth.authorize_pairs("/content/repo/fedora", pairs.iter().copied());
    let denied_reverse = auth.authorize_pairs("/content/repo/fedora", pairs.iter().rev().copied());
    assert!(!denied_forward && !denied_reverse);
}

#[test]
fn hash_map_and_extension_set_agree() {
    let mut map = HashMap::new();
    map.insert(common::DOWNLOAD_URL_OID.to_string(), "/content/repo/rhel".to_string());
    map.insert("2.9.9.9".to_string(), "/content".to_string());
    let ext: ExtensionSet = map.clone().into_iter().collect();

    let auth = ee::Authorizer::default();
    for dest in [common::RHEL_DESTINATION, "/content/repo", "/elsewhere"] {
        assert_eq!(auth.authorize_pairs(dest, &map), auth.is_authorized(dest, &ext));
    }
}

#[test]
fn first_grant_is_reported() {
    let ext = set(&[
        ("1.3.6.1.4.1.2312.9.2.5.1.6", "/content/repo/rhel"),
        ("1.3.6.1.4.1.2312.9.2.6.1.6", "/content/repo"),
    ]);
    let d = ee::decide(common::RHEL_DESTINATION, &ext);
    assert!(d.allowed);
    // ExtensionSet iterates in OID order, so the content set 5 URL wins.
    assert_eq!(d.matched_oid.as_deref(), Some("1.3.6.1.4.1.2312.9.2.5.1.6"));
    assert_eq!(d.matched_value.as_deref(), Some("/content/repo/rhel"));

    let denied = ee::decide("/nope", &ext);
    assert_eq!(denied, ee::domain::types::Decision::denied());
}

#[test]
fn decision_serializes_without_empty_fields() {
    let denied = serde_json::to_value(ee::domain::types::Decision::denied()).unwrap();
    assert_eq!(denied, serde_json::json!({ "allowed": false }));

    let ext = set(&[(common::DOWNLOAD_URL_OID, "/content")]);
    let granted = serde_json::to_value(ee::decide("/content/x", &ext)).unwrap();
    assert_eq!(granted["matched_oid"], common::DOWNLOAD_URL_OID);
}

#[test]
fn custom_patterns_change_recognized_class() {
    let cfg = AuthorizationConfig {
        download_url_oid_prefix: "1.3.6.1.4.1.59817.".into(),
        download_url_oid_suffix: ".*.2".into(),
        ..AuthorizationConfig::secure_default()
    };
    let auth = ee::Authorizer::new(&cfg).unwrap();
    let ext = set(&[("1.3.6.1.4.1.59817.7.2", "/content")]);
    assert!(auth.is_authorized("/content/repo", &ext));
    // The built-in class is no longer recognized.
    let builtin = set(&[(common::DOWNLOAD_URL_OID, "/content")]);
    assert!(!auth.is_authorized("/content/repo", &builtin));
}

#[test]
fn invalid_patterns_rejected_at_construction() {
    let cfg = AuthorizationConfig {
        download_url_oid_suffix: "1.6.x".into(),
        ..AuthorizationConfig::secure_default()
    };
    let err = ee::Authorizer::new(&cfg).unwrap_err();
    assert!(matches!(err, ee::EngineError::Config(_)));
}

#[test]
fn logging_under_caller_span_does_not_change_decision() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let span = tracing::info_span!("request", peer = "10.0.0.1");
        let auth = ee::Authorizer::with_span(&AuthorizationConfig::secure_default(), span).unwrap();
        let ext = set(&[(common::DOWNLOAD_URL_OID, "/content/repo/rhel")]);
        assert!(auth.is_authorized(common::RHEL_DESTINATION, &ext));
        assert!(!auth.is_authorized("/content/repo/fedora", &ext));
    });
}

#[test]
fn authorizer_is_shareable_across_threads() {
    let auth = std::sync::Arc::new(ee::Authorizer::default());
    let ext = std::sync::Arc::new(set(&[(common::DOWNLOAD_URL_OID, "/content/repo/rhel")]));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let (auth, ext) = (auth.clone(), ext.clone());
            std::thread::spawn(move || {
                let dest = if i % 2 == 0 { common::RHEL_DESTINATION } else { "/other" };
                auth.is_authorized(dest, &ext) == (i % 2 == 0)
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}
