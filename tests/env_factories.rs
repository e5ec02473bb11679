// tests/env_factories.rs
//
// Environment-driven wiring: reader selection and advisory client factory.
// Serialized because env vars are process-global.

use case_merit_engine::advisory::{build_client_from_config, AdvisoryConfig};
use case_merit_engine::extract::readers::readers_from_env;
use serial_test::serial;

#[test]
#[serial]
fn readers_default_to_disabled() {
    std::env::remove_var("EXTRACT_TEST_MODE");
    let (pdf, ocr) = readers_from_env();
    assert_eq!(pdf.name(), "disabled");
    assert_eq!(ocr.name(), "disabled");
}

#[test]
#[serial]
fn fixture_readers_selected_by_env() {
    std::env::set_var("EXTRACT_TEST_MODE", "fixture");
    let (pdf, ocr) = readers_from_env();
    assert_eq!(pdf.name(), "fixture");
    assert_eq!(ocr.name(), "fixture");
    std::env::remove_var("EXTRACT_TEST_MODE");
}

#[tokio::test]
#[serial]
async fn advisory_factory_honors_test_mode() {
    std::env::set_var("ADVISORY_TEST_MODE", "mock");
    let client = build_client_from_config(&AdvisoryConfig::default());
    assert_eq!(client.provider_name(), "mock");
    assert!(client.advise("any case").await.is_available());
    std::env::remove_var("ADVISORY_TEST_MODE");
}

#[tokio::test]
#[serial]
async fn advisory_factory_defaults_to_disabled() {
    std::env::remove_var("ADVISORY_TEST_MODE");
    let client = build_client_from_config(&AdvisoryConfig::default());
    assert_eq!(client.provider_name(), "disabled");
    assert!(!client.advise("any case").await.is_available());
}
