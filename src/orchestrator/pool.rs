//! 多进程协调者 - 编排层
//!
//! ## 职责
//!
//! 1. 按进程数轮询切分全部地区
//! 2. 每个非空子列表启动一个工作者，等待全部结束
//! 3. 从共享结果列表中取出记录，组成汇总结果
//! 4. 计算耗时统计
//!
//! 单个工作者崩溃只记录日志，不影响其他工作者；崩溃前已写入的记录保留

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AggregateResult, WorkItem};
use crate::orchestrator::sink::ResultSink;
use crate::orchestrator::workers::{WorkerAssignment, WorkerPool};
use crate::services::{partition, PartitionSpec};

/// 一次运行的耗时统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// 总耗时
    pub total: Duration,
    /// 总耗时 / 进程数
    pub per_process: Duration,
    /// 总耗时 / 尝试的地区数（含失败的）
    pub per_item: Duration,
    pub processes: usize,
    pub attempted: usize,
    pub extracted: usize,
    pub crashed_workers: usize,
}

impl RunStats {
    pub fn compute(
        total: Duration,
        processes: usize,
        attempted: usize,
        extracted: usize,
        crashed_workers: usize,
    ) -> Self {
        Self {
            total,
            per_process: average(total, processes),
            per_item: average(total, attempted),
            processes,
            attempted,
            extracted,
            crashed_workers,
        }
    }
}

fn average(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => total.div_f64(count as f64),
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "总耗时 {:.2}s | 平均每进程 {:.2}s | 平均每地区 {:.2}s | 成功 {}/{}",
            self.total.as_secs_f64(),
            self.per_process.as_secs_f64(),
            self.per_item.as_secs_f64(),
            self.extracted,
            self.attempted
        )
    }
}

/// 协调者的输出
#[derive(Debug)]
pub struct RunReport {
    pub aggregate: AggregateResult,
    pub stats: RunStats,
}

/// 多进程协调者
pub struct Coordinator<W> {
    pool: W,
    config: Arc<Config>,
}

impl<W: WorkerPool> Coordinator<W> {
    pub fn new(pool: W, config: Arc<Config>) -> Self {
        Self { pool, config }
    }

    /// 运行全部地区，阻塞直到所有工作者结束
    pub async fn run(&self, items: Vec<WorkItem>) -> Result<RunReport, AppError> {
        let processes = self.config.num_processes;
        let plan = partition(&items, PartitionSpec::by_count(processes)?)?;
        let sink = Arc::new(ResultSink::new());

        info!(
            "📊 {} 个地区 → {} 个进程 × {} 个标签页",
            items.len(),
            processes,
            self.config.tabs_per_process
        );

        let start = Instant::now();
        let workers = plan.non_empty().map(|(i, chunk)| {
            let assignment = WorkerAssignment {
                worker_index: i + 1,
                items: chunk,
                tabs: self.config.tabs_per_process,
                config: self.config.as_ref().clone(),
            };
            info!("[进程 {}] 分配 {} 个地区", i + 1, assignment.items.len());
            let sink = sink.clone();
            async move { (i + 1, self.pool.run_worker(assignment, sink).await) }
        });
        let results = join_all(workers).await;

        let mut crashed_workers = 0;
        for (index, result) in results {
            if let Err(e) = result {
                error!("[进程 {}] ❌ {}", index, e);
                crashed_workers += 1;
            }
        }
        let elapsed = start.elapsed();

        let aggregate = AggregateResult::from(sink.take());
        let stats = RunStats::compute(
            elapsed,
            processes,
            items.len(),
            aggregate.len(),
            crashed_workers,
        );
        Ok(RunReport { aggregate, stats })
    }
}
