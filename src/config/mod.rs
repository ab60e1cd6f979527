mod core;
mod loader;

pub use self::core::{
    ArchmapConfig, IntegrationConfig, ModulesConfig, RecommendationConfig, RiskConfig,
    ScoringConfig,
};
pub use loader::{
    default_config_toml, directory_ancestors, load_config, load_config_file,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
