//! 子进程后端的通信约定：任务从 stdin 进入，记录逐行从 stdout 返回

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use region_stats_scraper::error::WorkerError;
use region_stats_scraper::orchestrator::{
    ProcessWorkers, ResultSink, WorkerAssignment, WorkerPool,
};
use region_stats_scraper::{Config, FieldValue, WorkItem};

/// 通过 /bin/sh 运行脚本，脚本收到的第一个参数是 `worker`
fn script_workers(dir: &Path, body: &str) -> ProcessWorkers {
    let path: PathBuf = dir.join("fake-worker.sh");
    std::fs::write(&path, format!("{body}\n")).unwrap();
    ProcessWorkers::new("/bin/sh").with_leading_args([path])
}

fn assignment() -> WorkerAssignment {
    WorkerAssignment {
        worker_index: 1,
        items: vec![WorkItem::new("r0"), WorkItem::new("r1")],
        tabs: 1,
        config: Config::default(),
    }
}

#[tokio::test]
async fn records_streamed_before_a_crash_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let workers = script_workers(
        dir.path(),
        r#"[ "$1" = "worker" ] || exit 64
cat > /dev/null
echo '{"label":"Москва","fields":{"Вакансии":1024,"Доля %":12.5}}'
echo 'not a record'
echo ''
echo '{"label":"Тверь","fields":{}}'
exit 3"#,
    );

    let sink = Arc::new(ResultSink::new());
    let err = workers
        .run_worker(assignment(), sink.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::Crashed { index: 1, .. }));
    let records = sink.take();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].label, "Москва");
    assert_eq!(records[0].get("Доля %"), Some(FieldValue::Float(12.5)));
    assert_eq!(records[1].label, "Тверь");
}

#[tokio::test]
async fn clean_exit_is_success_and_assignment_reaches_stdin() {
    let dir = tempfile::tempdir().unwrap();
    // 只有收到完整任务时才返回一条记录
    let workers = script_workers(
        dir.path(),
        r#"input=$(cat)
case "$input" in
  *'"items":["r0","r1"]'*) echo '{"label":"got-assignment","fields":{}}' ;;
esac
exit 0"#,
    );

    let sink = Arc::new(ResultSink::new());
    workers
        .run_worker(assignment(), sink.clone())
        .await
        .unwrap();

    let records = sink.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label, "got-assignment");
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let sink = Arc::new(ResultSink::new());
    let err = ProcessWorkers::new("/nonexistent/region-worker")
        .run_worker(assignment(), sink)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Spawn { index: 1, .. }));
}
