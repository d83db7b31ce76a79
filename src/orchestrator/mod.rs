//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! pool::Coordinator (全部地区 → 按进程切分)
//!     ↓
//! workers (每个进程一个工作者：子进程 / 线程)
//!     ↓
//! tab_runner (一个浏览会话，按标签页切分，单线程并发)
//!     ↓
//! workflow::ItemExtractor (单个地区)
//!     ↓
//! services (规范化) / infrastructure (页面能力)
//! ```
//!
//! 只有编排层持有浏览会话；记录通过 `sink` 逐条上交

pub mod pool;
pub mod sink;
pub mod tab_runner;
pub mod workers;

pub use pool::{Coordinator, RunReport, RunStats};
pub use sink::{LineSink, RecordSink, ResultSink};
pub use tab_runner::{run_tabs, RunnerSettings, TabRunReport};
pub use workers::{ProcessWorkers, ThreadWorkers, WorkerAssignment, WorkerPool, WORKER_ARG};
