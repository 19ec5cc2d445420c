/// Prefix of environment variables overriding file configuration, e.g. `BILLING_GATEWAY__LOG__CONSOLE__LEVEL`
pub const ENV_PREFIX: &str = "BILLING_GATEWAY";

/// Environment variable selecting the configuration file
pub const RUN_ENV: &str = "RUN_ENV";

/// Replacement for masked values in logs
pub const MASKED_VALUE_PLACEHOLDER: &str = "*** masked ***";

/// Replacement for card security codes in logged request bodies
pub const CARD_SECURITY_CODE_PLACEHOLDER: &str = "***";

/// Number of leading and trailing digits of a card number left readable in logs
pub const CARD_NUMBER_VISIBLE_PREFIX: usize = 6;
pub const CARD_NUMBER_VISIBLE_SUFFIX: usize = 4;

/// Processor limits on merchant order item fields, in characters
pub const ITEM_NAME_MAX_LENGTH: usize = 50;
pub const ITEM_DESCRIPTION_MAX_LENGTH: usize = 200;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Env {
    #[default]
    Development,
    Sandbox,
    Production,
}

impl Env {
    /// Environment selected through `RUN_ENV`, development when unset or unknown.
    pub fn current_env() -> Self {
        std::env::var(RUN_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub const fn config_path(self) -> &'static str {
        match self {
            Self::Development => "development.toml",
            Self::Sandbox => "sandbox.toml",
            Self::Production => "production.toml",
        }
    }
}
