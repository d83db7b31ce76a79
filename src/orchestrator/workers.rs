//! 工作进程 - 编排层
//!
//! 两种后端，约定相同：每个工作者拿到一个子列表，在自己的单线程运行时里跑
//! `tab_runner`，每成功一条记录就立即写入协调者的结果列表。
//!
//! - `ProcessWorkers`：重新执行当前程序（`worker` 参数），stdin 传入任务，stdout 逐行返回记录
//! - `ThreadWorkers`：在当前进程的独立线程中运行，崩溃（panic）同样只影响自身

use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::error::{AppError, WorkerError};
use crate::infrastructure::SessionLauncher;
use crate::models::WorkItem;
use crate::orchestrator::sink::{parse_record_line, LineSink, RecordSink, ResultSink};
use crate::orchestrator::tab_runner::{panic_reason, run_tabs, RunnerSettings, TabRunReport};
use crate::workflow::ItemExtractor;

/// 子进程角色参数
pub const WORKER_ARG: &str = "worker";

/// 交给一个工作者的任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerAssignment {
    /// 进程编号（从 1 开始）
    pub worker_index: usize,
    pub items: Vec<WorkItem>,
    pub tabs: usize,
    pub config: Config,
}

/// 工作者后端
#[async_trait]
pub trait WorkerPool: Send + Sync {
    /// 运行一个工作者直到结束；记录逐条写入 `sink`
    async fn run_worker(
        &self,
        assignment: WorkerAssignment,
        sink: Arc<ResultSink>,
    ) -> Result<(), WorkerError>;
}

/// 在一个工作者内部执行任务
pub async fn run_assignment<L>(
    launcher: &L,
    assignment: &WorkerAssignment,
    sink: &dyn RecordSink,
) -> Result<TabRunReport, AppError>
where
    L: SessionLauncher + ?Sized,
{
    let config = &assignment.config;
    let extractor = ItemExtractor::new(Arc::new(config.selectors.clone()), config.wait_timeout_ms);
    let settings = RunnerSettings {
        worker_index: assignment.worker_index,
        tabs: assignment.tabs,
        think_time: config.think_time(),
    };
    run_tabs(launcher, &extractor, &settings, &assignment.items, sink).await
}

// ========== 子进程后端 ==========

/// 每个工作者一个操作系统进程
pub struct ProcessWorkers {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ProcessWorkers {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// 在 `worker` 参数之前附加参数（例如通过解释器启动脚本）
    pub fn with_leading_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// 使用当前可执行文件作为子进程
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

#[async_trait]
impl WorkerPool for ProcessWorkers {
    async fn run_worker(
        &self,
        assignment: WorkerAssignment,
        sink: Arc<ResultSink>,
    ) -> Result<(), WorkerError> {
        let index = assignment.worker_index;
        let crashed = |reason: String| WorkerError::Crashed { index, reason };

        let mut child = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(WORKER_ARG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| WorkerError::Spawn { index, source })?;
        debug!("[进程 {}] 子进程已启动 (pid: {:?})", index, child.id());

        let payload = serde_json::to_vec(&assignment).map_err(|e| WorkerError::Protocol {
            index,
            reason: e.to_string(),
        })?;
        let mut stdin = child.stdin.take().ok_or_else(|| crashed("stdin 不可用".to_string()))?;
        stdin
            .write_all(&payload)
            .await
            .map_err(|e| crashed(format!("写入任务失败: {e}")))?;
        drop(stdin);

        let stdout = child.stdout.take().ok_or_else(|| crashed("stdout 不可用".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();
        let mut received = 0usize;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| crashed(format!("读取输出失败: {e}")))?
        {
            match parse_record_line(&line) {
                Ok(Some(record)) => {
                    sink.append(record);
                    received += 1;
                }
                Ok(None) => {}
                Err(e) => warn!("[进程 {}] 忽略无法解析的输出: {}", index, e),
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| crashed(format!("等待子进程失败: {e}")))?;
        if !status.success() {
            return Err(crashed(format!("退出状态 {status}，崩溃前已接收 {received} 条记录")));
        }
        info!("[进程 {}] 子进程正常退出，共接收 {} 条记录", index, received);
        Ok(())
    }
}

/// 子进程入口：从 stdin 读取任务，在单线程运行时中执行，记录逐行写到 stdout
pub fn worker_main() -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let assignment: WorkerAssignment = serde_json::from_str(&input)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let launcher = ChromeLauncher::new(Arc::new(assignment.config.clone()));
    let sink = LineSink::new(std::io::stdout());

    runtime.block_on(run_assignment(&launcher, &assignment, &sink))?;
    Ok(())
}

// ========== 线程后端 ==========

/// 每个工作者一个线程，各自拥有单线程运行时
pub struct ThreadWorkers<L> {
    launcher: L,
}

impl<L> ThreadWorkers<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }
}

#[async_trait]
impl<L> WorkerPool for ThreadWorkers<L>
where
    L: SessionLauncher + Clone + 'static,
{
    async fn run_worker(
        &self,
        assignment: WorkerAssignment,
        sink: Arc<ResultSink>,
    ) -> Result<(), WorkerError> {
        let index = assignment.worker_index;
        let launcher = self.launcher.clone();

        let joined = tokio::task::spawn_blocking(move || -> Result<TabRunReport, String> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| e.to_string())?;
            runtime
                .block_on(run_assignment(&launcher, &assignment, sink.as_ref()))
                .map_err(|e| e.to_string())
        })
        .await;

        match joined {
            Ok(Ok(report)) => {
                info!("[进程 {}] 线程正常结束，共 {} 条记录", index, report.records.len());
                Ok(())
            }
            Ok(Err(reason)) => Err(WorkerError::Crashed { index, reason }),
            Err(join_error) => Err(WorkerError::Crashed {
                index,
                reason: panic_message(join_error),
            }),
        }
    }
}

fn panic_message(error: tokio::task::JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    panic_reason(error.into_panic().as_ref())
}
