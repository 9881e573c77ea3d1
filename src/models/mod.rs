pub mod entry;

pub use entry::{Snapshot, UrlEntry, UrlStatus};
