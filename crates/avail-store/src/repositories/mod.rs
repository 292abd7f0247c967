//! Repository implementations over the tabular store

mod error;
mod poll;
mod record;

pub use error::map_store_error;
pub use poll::SheetPollRepository;
pub use record::SheetRecordRepository;
