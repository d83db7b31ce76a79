//! 单进程多标签页执行器 - 编排层
//!
//! ## 状态
//!
//! ```text
//! Idle → Launching（启动共享会话）→ Dispatching（每个子列表一个标签页任务）
//!      → Draining（等待所有任务结束）→ Closed（无条件释放会话）
//! ```
//!
//! 所有标签页任务在同一个线程上轮询，只在 `.await` 处交替执行。
//! 结果按任务完成顺序汇总；只保证同一标签页内部的顺序。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::infrastructure::{BrowserSession, PageCapability, SessionLauncher};
use crate::models::{NormalizedRecord, WorkItem};
use crate::orchestrator::sink::RecordSink;
use crate::services::{partition, PartitionSpec};
use crate::utils::logging::truncate_text;
use crate::workflow::{ItemCtx, ItemExtractor};

/// 执行器状态，仅用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Launching,
    Dispatching,
    Draining,
    Closed,
}

/// 单个进程的运行参数
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// 进程编号（从 1 开始，仅用于日志）
    pub worker_index: usize,
    /// 标签页数
    pub tabs: usize,
    /// 两个条目之间的停顿
    pub think_time: Duration,
}

/// 单个标签页任务的结果
#[derive(Debug)]
pub struct TabOutcome {
    pub tab_index: usize,
    pub records: Vec<NormalizedRecord>,
    pub attempted: usize,
    /// 任务中途终止的原因
    pub error: Option<String>,
}

/// 整个进程的结果
#[derive(Debug, Default)]
pub struct TabRunReport {
    /// 按任务完成顺序排列的记录
    pub records: Vec<NormalizedRecord>,
    /// 完成顺序（标签页编号）
    pub completion_order: Vec<usize>,
    pub attempted: usize,
    pub failed_tabs: usize,
}

impl TabOutcome {
    /// 标签页任务 panic：已写入结果列表的记录保留在那里，这里不再重复计入
    fn panicked(tab_index: usize, payload: &(dyn Any + Send)) -> Self {
        Self {
            tab_index,
            records: Vec::new(),
            attempted: 0,
            error: Some(panic_reason(payload)),
        }
    }
}

/// 把 panic 载荷转成可读的原因
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic".to_string()
    }
}

impl TabRunReport {
    fn absorb(&mut self, outcome: TabOutcome) {
        self.completion_order.push(outcome.tab_index);
        self.attempted += outcome.attempted;
        if outcome.error.is_some() {
            self.failed_tabs += 1;
        }
        self.records.extend(outcome.records);
    }
}

/// 在一个浏览会话中用多个标签页处理 `items`
///
/// 单个条目失败只会被跳过；标签页失败（包括 panic）只会终止该标签页；会话总会被释放
pub async fn run_tabs<L>(
    launcher: &L,
    extractor: &ItemExtractor,
    settings: &RunnerSettings,
    items: &[WorkItem],
    sink: &dyn RecordSink,
) -> Result<TabRunReport, AppError>
where
    L: SessionLauncher + ?Sized,
{
    let worker = settings.worker_index;
    let mut state = RunnerState::Idle;
    let plan = partition(items, PartitionSpec::by_count(settings.tabs)?)?;

    transition(worker, &mut state, RunnerState::Launching);
    let session = launcher.launch().await?;

    transition(worker, &mut state, RunnerState::Dispatching);
    let mut tasks: FuturesUnordered<_> = plan
        .non_empty()
        .map(|(i, ids)| {
            let tab_index = i + 1;
            AssertUnwindSafe(run_tab(&session, extractor, settings, tab_index, ids, sink))
                .catch_unwind()
                .map(move |result| {
                    result.unwrap_or_else(|payload| TabOutcome::panicked(tab_index, payload.as_ref()))
                })
        })
        .collect();
    info!(
        "[进程 {}] 📦 {} 个地区分配到 {} 个标签页",
        worker,
        items.len(),
        tasks.len()
    );

    transition(worker, &mut state, RunnerState::Draining);
    let mut report = TabRunReport::default();
    while let Some(outcome) = tasks.next().await {
        log_tab_complete(worker, &outcome);
        report.absorb(outcome);
    }
    drop(tasks);

    transition(worker, &mut state, RunnerState::Closed);
    if let Err(e) = session.close().await {
        warn!("[进程 {}] 关闭浏览器失败: {}", worker, e);
    }

    info!(
        "[进程 {}] ✓ 完成: 成功 {}/{}",
        worker,
        report.records.len(),
        items.len()
    );
    Ok(report)
}

/// 一个标签页按顺序处理自己的子列表
async fn run_tab<S>(
    session: &S,
    extractor: &ItemExtractor,
    settings: &RunnerSettings,
    tab_index: usize,
    ids: Vec<WorkItem>,
    sink: &dyn RecordSink,
) -> TabOutcome
where
    S: BrowserSession,
{
    let mut outcome = TabOutcome {
        tab_index,
        records: Vec::with_capacity(ids.len()),
        attempted: 0,
        error: None,
    };

    let tab = match session.open_tab().await {
        Ok(tab) => tab,
        Err(e) => {
            let ids_text = ids.iter().map(WorkItem::id).collect::<Vec<_>>().join(", ");
            error!(
                "[进程 {} 标签页 {}] ❌ 打开标签页失败 (ids: {}): {}",
                settings.worker_index,
                tab_index,
                truncate_text(&ids_text, 80),
                e
            );
            outcome.error = Some(e.to_string());
            return outcome;
        }
    };

    let total = ids.len();
    for (i, item) in ids.iter().enumerate() {
        if i > 0 && !settings.think_time.is_zero() {
            sleep(settings.think_time).await;
        }

        let ctx = ItemCtx::new(settings.worker_index, tab_index, i + 1, total);
        outcome.attempted += 1;
        let Some(record) = extractor.extract_or_skip(&tab, item, &ctx).await else {
            continue;
        };

        if let Err(e) = sink.push(&record) {
            error!("{} ❌ 写入结果失败，标签页停止: {}", ctx, e);
            outcome.error = Some(e.to_string());
            break;
        }
        outcome.records.push(record);
    }

    if let Err(e) = tab.close().await {
        debug!(
            "[进程 {} 标签页 {}] 关闭标签页失败: {}",
            settings.worker_index, tab_index, e
        );
    }
    outcome
}

fn transition(worker: usize, state: &mut RunnerState, next: RunnerState) {
    debug!("[进程 {}] {:?} → {:?}", worker, state, next);
    *state = next;
}

fn log_tab_complete(worker: usize, outcome: &TabOutcome) {
    match &outcome.error {
        None => info!(
            "[进程 {} 标签页 {}] ✓ 完成: 成功 {}/{}",
            worker,
            outcome.tab_index,
            outcome.records.len(),
            outcome.attempted
        ),
        Some(reason) => warn!(
            "[进程 {} 标签页 {}] ⚠️ 提前结束 (已保留 {} 条): {}",
            worker,
            outcome.tab_index,
            outcome.records.len(),
            reason
        ),
    }
}
