use crate::loader::*;
use crate::settings::Config;
use serial_test::serial;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.token_ttl(), Duration::from_secs(86_400));
    assert_eq!(config.batch.max_concurrent, 5);
    assert_eq!(config.dispatch_interval(), Duration::from_millis(100));
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.super_admin_role().get(), 1);
    assert!(config
        .access
        .public_operations
        .contains(&"/api/system/user/login".to_string()));
    assert!(config.validate().is_ok());
}

#[test]
fn file_values_override_defaults() {
    let file = write_config(&format!(
        r#"{{"security": {{"signing_key": "{SEED}", "password_salt": "s"}},
            "batch": {{"max_concurrent": 2}}}}"#
    ));
    let config = ConfigLoader::new().file(file.path()).without_env().load().unwrap();

    assert_eq!(config.batch.max_concurrent, 2);
    assert_eq!(config.batch.dispatch_interval_ms, 100);
    assert_eq!(config.security.signing_key.as_deref(), Some(SEED));
}

#[test]
fn unknown_fields_and_bad_json_are_errors() {
    let typo = write_config(r#"{"sesion": {}}"#);
    assert!(ConfigLoader::new().file(typo.path()).without_env().load().is_err());

    let broken = write_config("{ not json");
    let err = ConfigLoader::new().file(broken.path()).without_env().load().unwrap_err();
    assert_eq!(err.code(), "configuration_error");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(ConfigLoader::new().file(missing).without_env().load().is_err());
}

#[test]
fn validation_rejects_bad_values() {
    let mut config = Config::default();
    config.batch.max_concurrent = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.session.token_ttl_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.security.signing_key = Some("abc".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn token_ttl_is_capped() {
    let mut config = Config::default();
    config.session.token_ttl_secs = u64::MAX;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("session.token_ttl_secs"));

    config.session.token_ttl_secs = 30 * 24 * 60 * 60;
    assert!(config.validate().is_ok());
    config.session.token_ttl_secs += 1;
    assert!(config.validate().is_err());
}

#[test]
fn overrides_from_lookup() {
    let vars: HashMap<&str, &str> = HashMap::from([
        (ENV_TOKEN_TTL_SECS, "60"),
        (ENV_BATCH_MAX_CONCURRENT, " 3 "),
        (ENV_PUBLIC_OPERATIONS, "/a, /b,,"),
        (ENV_PASSWORD_SALT, "pepper"),
    ]);
    let mut config = Config::default();
    apply_env_overrides(&mut config, |k| vars.get(k).map(|v| (*v).to_string())).unwrap();

    assert_eq!(config.session.token_ttl_secs, 60);
    assert_eq!(config.batch.max_concurrent, 3);
    assert_eq!(config.access.public_operations, vec!["/a", "/b"]);
    assert_eq!(config.security.password_salt, "pepper");
}

#[test]
fn unparsable_override_names_the_variable() {
    let mut config = Config::default();
    let err = apply_env_overrides(&mut config, |k| {
        (k == ENV_BATCH_MAX_CONCURRENT).then(|| "many".to_string())
    })
    .unwrap_err();
    assert!(err.to_string().contains(ENV_BATCH_MAX_CONCURRENT));
}

#[test]
#[serial]
fn environment_beats_file() {
    let file = write_config(r#"{"session": {"token_ttl_secs": 100}}"#);
    std::env::set_var(ENV_TOKEN_TTL_SECS, "200");
    let loaded = ConfigLoader::new().file(file.path()).load();
    std::env::remove_var(ENV_TOKEN_TTL_SECS);

    assert_eq!(loaded.unwrap().session.token_ttl_secs, 200);
}

#[test]
#[serial]
fn invalid_environment_value_fails_validation() {
    std::env::set_var(ENV_BATCH_MAX_CONCURRENT, "0");
    let loaded = ConfigLoader::new().load();
    std::env::remove_var(ENV_BATCH_MAX_CONCURRENT);

    assert!(loaded.is_err());
}

#[test]
fn redaction_hides_secrets() {
    let mut config = Config::default();
    config.security.signing_key = Some(SEED.to_string());
    config.security.password_salt = "pepper".to_string();

    let printed = serde_json::to_string(&config.redacted()).unwrap();
    assert!(!printed.contains(SEED));
    assert!(!printed.contains("pepper"));
    assert!(config.redacted().security.signing_key.is_some());
}
