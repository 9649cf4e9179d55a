// =============================================================================
// Central Application State — Meridian Market Desk
// =============================================================================
//
// Everything the request handlers share: configuration behind a RwLock, the
// immutable bar store, the quote client, the optional chat client, and a
// small ring buffer of recent boundary errors for the health surface.
//
// Thread safety:
//   - parking_lot::RwLock for mutable shared collections.
//   - Arc wrappers for subsystems that are immutable after startup.
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::chat::ChatClient;
use crate::market_data::QuoteClient;
use crate::runtime_config::RuntimeConfig;
use crate::store::BarStore;

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// A recorded error event from a collaborator boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Central application state shared across handlers via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Collaborators ───────────────────────────────────────────────────
    pub bar_store: Arc<BarStore>,
    pub quotes: Arc<QuoteClient>,
    /// `None` when no chat credential was configured at startup; the chat
    /// endpoint answers 503 in that case.
    pub chat: Option<Arc<ChatClient>>,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the desk was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Tie the subsystems together. The returned value is wrapped in `Arc`
    /// immediately by the caller.
    pub fn new(
        config: RuntimeConfig,
        bar_store: BarStore,
        quotes: QuoteClient,
        chat: Option<ChatClient>,
    ) -> Self {
        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            bar_store: Arc::new(bar_store),
            quotes: Arc::new(quotes),
            chat: chat.map(Arc::new),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    pub fn push_error(&self, message: String) {
        let record = ErrorRecord {
            message,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }

    /// Seconds since startup.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
