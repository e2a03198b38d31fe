//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flag overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → SenderConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The private key never lives in a config file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{LogFormat, NetworkConfig, ObservabilityConfig, SenderConfig, TransferConfig};
pub use validation::{validate_config, ValidationError};
