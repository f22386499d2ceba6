//! Default values for Strata configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Audit Defaults
// ============================================================================

/// Maximum number of edges a single transitive-chain search may follow.
///
/// Zero disables the bound.
pub const DEFAULT_MAX_CHAIN_BRANCHES: usize = 10_000;

/// Default output format for rendered reports.
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

// ============================================================================
// Snapshot Defaults
// ============================================================================

/// Default snapshot storage root, relative to the project.
pub const DEFAULT_SNAPSHOT_DIR: &str = ".strata/audit-snapshots";

/// Default number of snapshots kept by retention (0 keeps everything).
pub const DEFAULT_MAX_SNAPSHOTS: usize = 20;

/// File suffix for full snapshot reports.
pub const SNAPSHOT_REPORT_SUFFIX: &str = ".json";

/// File suffix for snapshot metadata summaries.
pub const SNAPSHOT_META_SUFFIX: &str = ".meta.json";

/// chrono format string used to derive snapshot ids from timestamps.
pub const SNAPSHOT_ID_FORMAT: &str = "%Y%m%d-%H%M%S";

// ============================================================================
// Config Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "strata.toml";

/// Directory under the user config dir holding `config.toml`.
pub const USER_CONFIG_DIR: &str = "strata";
