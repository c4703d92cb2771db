//! Tests for [`Credentials`] and [`SecretValue`].

use super::*;
use serial_test::serial;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| values.get(name).cloned()
}

#[test]
fn test_secret_value_debug_is_redacted() {
    let secret = SecretValue::from_string("hunter2".to_string());
    let debug = format!("{:?}", secret);

    assert!(!debug.contains("hunter2"), "secret leaked: {debug}");
    assert!(debug.contains("REDACTED"));
    assert!(debug.contains("length: 7"));
}

#[test]
fn test_credentials_debug_is_redacted() {
    let credentials = Credentials::new("api-key-value", "secret-value");
    let debug = format!("{:?}", credentials);

    assert!(!debug.contains("api-key-value"));
    assert!(!debug.contains("secret-value"));
}

#[test]
fn test_from_lookup_reads_both_values() {
    let credentials = Credentials::from_lookup(lookup_from(&[
        (API_KEY_VAR, "key"),
        (SIGNATURE_SECRET_VAR, "secret"),
    ]));

    assert_eq!(credentials.api_key().expose_secret(), "key");
    assert_eq!(credentials.signature_secret().expose_secret(), "secret");
    assert!(credentials.is_complete());
}

#[test]
fn test_from_lookup_missing_values_are_empty() {
    let credentials = Credentials::from_lookup(lookup_from(&[]));

    assert!(credentials.api_key().is_empty());
    assert!(credentials.signature_secret().is_empty());
    assert!(!credentials.is_complete());
}

#[test]
fn test_incomplete_when_only_api_key_missing() {
    let credentials = Credentials::new("", "secret");
    assert!(!credentials.is_complete());
}

#[test]
fn test_incomplete_when_only_secret_missing() {
    let credentials = Credentials::new("key", "");
    assert!(!credentials.is_complete());
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    std::env::set_var(API_KEY_VAR, "env-key");
    std::env::set_var(SIGNATURE_SECRET_VAR, "env-secret");

    let credentials = Credentials::from_env();

    std::env::remove_var(API_KEY_VAR);
    std::env::remove_var(SIGNATURE_SECRET_VAR);

    assert_eq!(credentials.api_key().expose_secret(), "env-key");
    assert_eq!(credentials.signature_secret().expose_bytes(), b"env-secret");
}

#[test]
#[serial]
fn test_from_env_with_unset_variables() {
    std::env::remove_var(API_KEY_VAR);
    std::env::remove_var(SIGNATURE_SECRET_VAR);

    let credentials = Credentials::from_env();

    assert!(!credentials.is_complete());
}
