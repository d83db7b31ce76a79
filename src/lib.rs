//! # Region Stats Scraper
//!
//! 驱动浏览器抓取地区统计数据：把地区列表分给多个进程，每个进程再分给多个标签页，
//! 最后合并、排序并导出为表格
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 页面能力接口（`PageCapability` / `BrowserSession` / `SessionLauncher`）
//! - `JsExecutor` - 持有 page，提供 eval() 和条件等待能力
//! - `browser/` - chromiumoxide 实现、地区发现
//!
//! ### ② 业务能力层（Services）
//! - `normalizer` - 文本 → 数值
//! - `partitioner` - 列表切分（按块数轮询 / 按块大小连续）
//! - `exporter` - CSV 导出
//!
//! ### ③ 流程层（Workflow）
//! - `ItemExtractor` - 一个地区：聚焦 → 读两个徽章组 → 规范化 → 合并
//!
//! ### ④ 编排层（Orchestration）
//! - `tab_runner` - 单进程多标签页
//! - `workers` - 子进程 / 线程后端
//! - `pool` - 多进程协调、统计
//!
//! ## 模块结构

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{BadgeGroup, Config, Selectors};
pub use error::{AppError, AppResult};
pub use infrastructure::{BrowserSession, JsExecutor, PageCapability, SessionLauncher};
pub use models::{AggregateResult, FieldValue, NormalizedRecord, RawFieldSet, WorkItem};
pub use orchestrator::{Coordinator, RunStats};
pub use workflow::{ItemCtx, ItemExtractor};
