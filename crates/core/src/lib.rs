pub mod config;
pub mod naming;
pub mod types;

// Re-export commonly used types
pub use config::{ProcessorConfig, StageConfig, DEFAULT_SCOPED_PATTERN};
pub use naming::ScopedNaming;
pub use types::{ClassNameMap, MessageKind, StageMessage};
