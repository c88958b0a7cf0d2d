pub mod settings;

pub use settings::{HttpSettings, ProviderSettings, ServerSettings, SessionSettings, Settings};
