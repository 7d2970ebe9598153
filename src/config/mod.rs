mod settings;
mod wiring;

pub use settings::{
    Config, ConfigError, StoreConfig, StoreKind, TomlConfig, TomlMapperConfig, TomlStoreConfig,
    ENV_CAPTURE_REPLAY_MODE,
};
pub use wiring::{build_store, wire};
