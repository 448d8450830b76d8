//! Domain layer: business records, dedup/merge store, search targets, and
//! progress events. No I/O lives here.

pub mod business;
pub mod events;
pub mod record_store;
pub mod search;

pub use business::{BusinessKey, BusinessRecord, FieldPatch};
pub use events::{LogProgressSink, NullProgressSink, PageOutcome, ProgressSink};
pub use record_store::RecordStore;
pub use search::{SearchTarget, generate_search_targets, split_city_state};
