mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AskSettings, EngineSettings, LlmSettings, LoggingSettings, SchemaSettings, ServerSettings,
    Settings, SettingsError,
};
