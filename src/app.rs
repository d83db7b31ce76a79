//! 应用入口 - 编排层之上
//!
//! 1. 校验配置
//! 2. 发现全部地区
//! 3. 交给协调者并行抽取
//! 4. 排序、导出、输出统计

use std::sync::Arc;

use tracing::{info, warn};

use crate::browser::{discover_work_items, ChromeLauncher};
use crate::config::Config;
use crate::error::{AppError, AppResult, WorkerError};
use crate::infrastructure::SessionLauncher;
use crate::models::{NormalizedRecord, WorkItem};
use crate::orchestrator::{Coordinator, ProcessWorkers, RunReport, RunStats, ThreadWorkers, WorkerPool};
use crate::services::export_csv;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// 初始化应用；配置错误在任何工作开始前返回
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunStats> {
        let launcher = ChromeLauncher::new(self.config.clone());
        let items = discover_work_items(launcher.launch().await?).await?;
        info!("📋 待处理地区总数: {}", items.len());

        let report = if self.config.in_process {
            self.collect(ThreadWorkers::new(launcher), items).await?
        } else {
            let workers = ProcessWorkers::current_exe()
                .map_err(|source| WorkerError::Spawn { index: 0, source })?;
            self.collect(workers, items).await?
        };

        let stats = report.stats.clone();
        self.export(report)?;
        Ok(stats)
    }

    /// 用指定的工作者后端处理全部地区
    pub async fn collect<W: WorkerPool>(&self, pool: W, items: Vec<WorkItem>) -> AppResult<RunReport> {
        Coordinator::new(pool, self.config.clone()).run(items).await
    }

    /// 输出统计，排序并导出；一条记录都没有时不写文件
    pub fn export(&self, report: RunReport) -> AppResult<Vec<NormalizedRecord>> {
        logging::print_final_stats(&report.stats);

        if report.aggregate.is_empty() {
            warn!("⚠️ 没有抽取到任何数据，跳过导出");
            return Err(AppError::NothingExtracted {
                attempted: report.stats.attempted,
            });
        }

        let records = report.aggregate.finalize();
        export_csv(&records, &self.config.label_column, &self.config.output_path)?;
        Ok(records)
    }
}
