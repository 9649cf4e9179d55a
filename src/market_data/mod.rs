pub mod quotes;
pub mod snapshot;

// Re-export the types handlers reach for most often.
pub use quotes::{DailyQuote, QuoteClient};
pub use snapshot::{build_snapshot, MarketSnapshot, SnapshotError, TickerDelta};
