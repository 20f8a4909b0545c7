use std::time::Duration;

use tempfile::TempDir;

use rollout_core::config::{
    ConfigError, ConfigStore, JamfOverrides, JamfSettings, RolloutConfig, config_path_in,
};

const CONFIG: &str = r#"
[jamf]
server = "acme.jamfcloud.com"
user = "file-user"
password = "file-pass"
timeout_secs = 10

[MAIL_CONFIG]
SENDER_EMAIL = "ops@example.com"
SENDER_PASSWD = "app-password"
RECIPIENT_EMAIL = "it@example.com"
"#;

fn write_config(temp: &TempDir, content: &str) -> ConfigStore {
    let path = config_path_in(temp.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    ConfigStore::from_path(path)
}

#[test]
fn load_missing_returns_default_config() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_path(temp.path().join("missing.toml"));

    let config = store.load().unwrap();

    assert_eq!(config, RolloutConfig::default());
}

#[test]
fn load_reads_both_sections() {
    let temp = TempDir::new().unwrap();
    let store = write_config(&temp, CONFIG);

    let config = store.load().unwrap();

    assert_eq!(config.jamf.server.as_deref(), Some("acme.jamfcloud.com"));
    assert_eq!(config.jamf.timeout_secs, Some(10));
    assert_eq!(config.mail.recipient_email.as_deref(), Some("it@example.com"));
    assert!(config.mail.missing_keys().is_empty());
}

#[test]
fn load_reports_syntax_errors_with_line() {
    let temp = TempDir::new().unwrap();
    let store = write_config(&temp, "[jamf]\nserver = \"x\"\nuser = \n");

    let err = store.load().unwrap_err();

    assert!(format!("{err:#}").contains("line 3"));
}

#[test]
fn flags_win_over_env_and_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, CONFIG).load().unwrap();
    let overrides = JamfOverrides {
        server: Some("https://flag.example.com".to_string()),
        user: None,
        password: None,
    };

    let settings = JamfSettings::resolve_with_env(&overrides, &config.jamf, |key| match key {
        "JAMF_SERVER" => Some("https://env.example.com".to_string()),
        "JAMF_USER" => Some("env-user".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(settings.credentials.server().host_str(), Some("flag.example.com"));
    assert_eq!(settings.credentials.user(), "env-user");
    assert_eq!(settings.timeout, Duration::from_secs(10));
}

#[test]
fn file_values_fill_the_gaps() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, CONFIG).load().unwrap();

    let settings =
        JamfSettings::resolve_with_env(&JamfOverrides::default(), &config.jamf, |_| None).unwrap();

    assert_eq!(settings.credentials.server().scheme(), "https");
    assert_eq!(settings.credentials.server().host_str(), Some("acme.jamfcloud.com"));
    assert_eq!(settings.credentials.user(), "file-user");
}

#[test]
fn missing_password_names_every_source() {
    let config = RolloutConfig::default();
    let overrides = JamfOverrides {
        server: Some("acme.jamfcloud.com".to_string()),
        user: Some("api".to_string()),
        password: None,
    };

    let err = JamfSettings::resolve_with_env(&overrides, &config.jamf, |_| None).unwrap_err();

    assert!(matches!(err, ConfigError::Missing { setting: "password", .. }));
    let message = err.to_string();
    assert!(message.contains("--jamfpass"));
    assert!(message.contains("JAMF_PASSWORD"));
}
