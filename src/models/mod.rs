pub mod aggregate;
pub mod record;

pub use aggregate::AggregateResult;
pub use record::{FieldMap, FieldValue, NormalizedRecord, RawFieldSet, WorkItem};
