use std::time::Duration;

use pipeline::ConfigurationError;

use super::*;

const COMPLETE: &str = r#"
[provider]
workspace = "company"
repository = "repo"
username = "user"
password = "app-password"
request_timeout_secs = 10

[decoration]
summary_comment = true
file_comments = true
delete_old_comments = false
"#;

#[test]
fn test_complete_file_parses() {
    let config = parse_provider_config(COMPLETE, None).unwrap();
    assert_eq!(config.workspace, "company");
    assert_eq!(config.credentials.password(), "app-password");
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert!(!config.toggles.delete_stale_comments);
    assert!(config.base_url.is_none());
}

#[test]
fn test_password_falls_back_to_environment_value() {
    let text = COMPLETE.replace("password = \"app-password\"\n", "");
    let config = parse_provider_config(&text, Some("from-env".to_string())).unwrap();
    assert_eq!(config.credentials.password(), "from-env");
}

#[test]
fn test_file_password_wins_over_environment() {
    let config = parse_provider_config(COMPLETE, Some("from-env".to_string())).unwrap();
    assert_eq!(config.credentials.password(), "app-password");
}

#[test]
fn test_missing_toggle_is_a_configuration_error() {
    let text = COMPLETE.replace("file_comments = true\n", "");
    let err = parse_provider_config(&text, None).unwrap_err();
    let config_err = err.downcast_ref::<ConfigurationError>().unwrap();
    assert_eq!(
        config_err,
        &ConfigurationError::MissingSetting {
            setting: "decoration.file_comments".to_string()
        }
    );
}

#[test]
fn test_missing_password_without_environment() {
    let text = COMPLETE.replace("password = \"app-password\"\n", "");
    let err = parse_provider_config(&text, None).unwrap_err();
    assert!(err.downcast_ref::<ConfigurationError>().is_some());
    assert!(err.to_string().contains("provider.password"));
}

#[test]
fn test_malformed_toml_is_not_a_configuration_error() {
    let err = parse_provider_config("[provider\nworkspace = ", None).unwrap_err();
    assert!(err.downcast_ref::<ConfigurationError>().is_none());
}
