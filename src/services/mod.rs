pub mod exporter;
pub mod normalizer;
pub mod partitioner;

pub use exporter::export_csv;
pub use normalizer::normalize;
pub use partitioner::{partition, PartitionPlan, PartitionSpec};
