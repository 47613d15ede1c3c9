//! Core domain logic for the scored roadmap board.
//! This crate is the single source of truth for board invariants.

pub mod board;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use board::color::{shade, CardPalette, ColorParseError, HexColor, DEFAULT_CARD_COLOR};
pub use board::geometry::{card_position, score_from_pixel_y, LayoutMetrics, PixelPoint};
pub use board::session::{BoardSession, CardFrame, ModalKind, PositionCommit, SessionError};
pub use board::zoom::{CardMetrics, ZoomLevel};
pub use config::{ConfigError, GitHubConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::initiative::{Initiative, InitiativeDraft, InitiativeId, ValidationError};
pub use model::product::{AppData, Product};
pub use repo::kv_store::{
    InMemoryKeyValueStore, KeyValueStore, KvError, KvResult, SqliteKeyValueStore,
};
pub use service::board_store::{
    BoardStore, SelectOutcome, SelectSource, StoreError, StoreResult, SyncReport,
};
pub use sync::error::{RemoteError, RemoteResult};
pub use sync::github::GitHubContentClient;
pub use sync::remote::{ProductRemote, PushReceipt, PushRequest};
pub use sync::transport::{HttpTransport, ReqwestTransport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
