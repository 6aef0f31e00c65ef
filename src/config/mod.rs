//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing sections)
//!     → CLI overrides (--destination)
//!     → validation.rs (semantic checks)
//!     → SweeperConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - The built-in network registry is the default `networks` list
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{AccountSource, AccountsConfig, ObservabilityConfig, ReportConfig, SweepConfig, SweeperConfig};
pub use validation::{validate_config, validate_for_sweep, ValidationError};
