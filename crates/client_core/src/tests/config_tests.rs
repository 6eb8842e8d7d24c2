use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings =
        load_settings_from(&dir.path().join(CONFIG_FILE_NAME), env_from(&[])).expect("settings");
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.base_url(), "http://localhost:3000");
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &path,
        "api_url = \"https://pdf.example.com/\"\nrequest_timeout_secs = 30\ndownload_dir = \"out\"\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, env_from(&[])).expect("settings");
    assert_eq!(settings.api_url, "https://pdf.example.com/");
    assert_eq!(settings.base_url(), "https://pdf.example.com");
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.connect_timeout_secs, 10);
    assert_eq!(settings.download_dir, PathBuf::from("out"));
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "api_url = \"http://from-file:1\"\n").expect("write config");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("PDF_MASTER_API_URL", "http://from-env:2"),
            ("APP__API_URL", "http://from-app-env:3"),
            ("APP__REQUEST_TIMEOUT_SECS", "5"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.api_url, "http://from-app-env:3");
    assert_eq!(settings.request_timeout_secs, 5);
}

#[test]
fn rejects_zero_or_garbage_timeouts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);

    let err = load_settings_from(&path, env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]))
        .expect_err("zero timeout");
    assert!(matches!(
        err,
        ConfigError::InvalidNumber {
            key: "APP__REQUEST_TIMEOUT_SECS",
            ..
        }
    ));

    let err = load_settings_from(&path, env_from(&[("APP__CONNECT_TIMEOUT_SECS", "soon")]))
        .expect_err("non numeric timeout");
    assert!(matches!(err, ConfigError::InvalidNumber { .. }));
}

#[test]
fn zero_timeouts_in_file_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);

    fs::write(&path, "request_timeout_secs = 0\n").expect("write config");
    let err = load_settings_from(&path, env_from(&[])).expect_err("zero request timeout");
    assert!(matches!(
        err,
        ConfigError::InvalidNumber {
            key: "request_timeout_secs",
            ..
        }
    ));

    fs::write(&path, "connect_timeout_secs = 0\n").expect("write config");
    let err = load_settings_from(&path, env_from(&[])).expect_err("zero connect timeout");
    assert!(matches!(
        err,
        ConfigError::InvalidNumber {
            key: "connect_timeout_secs",
            ..
        }
    ));
}

#[test]
fn rejects_non_http_api_urls() {
    assert!(validate_api_url("http://localhost:3000").is_ok());
    assert!(validate_api_url("https://pdf.example.com").is_ok());
    assert!(matches!(
        validate_api_url("ftp://pdf.example.com"),
        Err(ConfigError::ApiUrlScheme(_))
    ));
    assert!(matches!(
        validate_api_url("not a url"),
        Err(ConfigError::ApiUrl { .. })
    ));
}

#[test]
fn unknown_keys_in_file_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "database_url = \"sqlite://x\"\n").expect("write config");

    let err = load_settings_from(&path, env_from(&[])).expect_err("unknown key");
    assert!(matches!(err, ConfigError::Parse { .. }));
}
