//! Kitchen Display - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables
//! - **kitchen**: Kitchen protocol, channel, order board and auth API (re-exported from workspace)
//! - **realtime**: Reconnecting WebSocket client (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use kitchen_display::bin_common::{load_config_from_env, ConfigType};
//! use kitchen_display::kitchen::KitchenChannel;
//! ```

// Re-export workspace libraries for convenience
pub use kitchen;
pub use realtime;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, load_kitchen_config, ConfigType};
}
