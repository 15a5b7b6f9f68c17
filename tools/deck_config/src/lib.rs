pub mod schema;
pub mod validation;

use schema::Config;
use serde_yaml::Error as YamlError;
use thiserror::Error;

pub use validation::{Location, Severity, ValidationIssue, validate_config};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] YamlError),
}

pub fn parse_config_str(src: &str) -> Result<Config, ConfigError> {
    let config = serde_yaml::from_str::<Config>(src)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_section_defaults() {
        let yaml = "version: 1\nmenus: {}\n";
        let cfg = parse_config_str(yaml).expect("parse");
        assert_eq!(cfg.key_delay_ms(), schema::DEFAULT_KEY_DELAY_MS);
        assert_eq!(cfg.enqueue_timeout_ms(), schema::DEFAULT_ENQUEUE_TIMEOUT_MS);

        let yaml = "version: 1\ngeneral:\n  key_delay_ms: 15\n";
        let cfg = parse_config_str(yaml).expect("parse");
        assert_eq!(cfg.key_delay_ms(), 15);
        assert_eq!(cfg.enqueue_timeout_ms(), 100);
    }

    #[test]
    fn button_definitions_stay_raw() {
        let yaml = r#"version: 1
menus:
  home:
    buttons:
      - label: text
        actions: "Hello{RETURN}"
      - label: number
        actions: 42
      - label: missing
"#;
        let cfg = parse_config_str(yaml).expect("parse");
        let buttons = &cfg.menus["home"].buttons;
        assert_eq!(buttons[0].actions.as_str(), Some("Hello{RETURN}"));
        assert_eq!(buttons[1].actions, serde_json::json!(42));
        assert!(buttons[2].actions.is_null());
    }
}
