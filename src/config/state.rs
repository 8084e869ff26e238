// Application state module
// Read-only state shared by every connection

use std::path::PathBuf;

use super::types::Config;

/// Application state, fixed at startup
///
/// Requests are independent transactions; the only shared state is this
/// read-only snapshot, so no locks appear on the request path.
pub struct AppState {
    pub config: Config,
    /// Canonical document root every served path must resolve under
    pub root: PathBuf,
}

impl AppState {
    pub const fn new(config: Config, root: PathBuf) -> Self {
        Self { config, root }
    }
}
