//! Command-line interface for BLE radiator thermostats.
//!
//! The `radiator` binary logs in to one thermostat, then either prints its
//! state or changes its temperature and/or calibration offset.
//!
//! # Usage
//!
//! | Invocation | Effect |
//! |------------|--------|
//! | `radiator -d ADDR -p PIN --get` | print current, set and offset temperatures |
//! | `radiator -d ADDR -p PIN --set 21.5` | set the manual and both auto setpoints |
//! | `radiator -d ADDR -p PIN --offset -1` | set the calibration offset only |
//! | `radiator completions <SHELL>` | generate shell completions |
//! | `radiator config path\|show` | inspect the configuration file |
//!
//! # Output Formats
//!
//! - **Text** (default): three labelled lines
//! - **Terse** (`--terse` or `--format terse`): `current set offset`
//! - **JSON**: the decoded record
//!
//! # Configuration
//!
//! The CLI reads `~/.config/radiator/config.toml` (or platform equivalent):
//!
//! ```toml
//! device = "E0:E5:CF:00:11:22"
//! pin = 123456
//! timeout = 20
//! format = "text"
//!
//! # Only needed for firmware with different characteristic handles
//! [profile]
//! login_handle = 70
//! control_handle = 62
//! ```
//!
//! # Environment Variables
//!
//! - `RADIATOR_DEVICE`: device address (overridden by `--device`)
//! - `RADIATOR_PIN`: login PIN (overridden by `--pin`)
//! - `RUST_LOG`: log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | connection failed, or any non-protocol error |
//! | 2 | characteristic lookup failed |
//! | 3 | characteristic not found |
//! | 4 | login failed |
//! | 5 | read failed |
//! | 6 | write failed |
//! | 7 | invalid request |

// Re-export core dependencies for convenience
pub use radiator_core;
pub use radiator_types;
