use anyhow::Result;
use region_stats_scraper::orchestrator::workers::{worker_main, WORKER_ARG};
use region_stats_scraper::utils::logging;
use region_stats_scraper::{App, AppResult, Config, RunStats};

fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 子进程角色
    if std::env::args().nth(1).as_deref() == Some(WORKER_ARG) {
        return worker_main();
    }

    // 加载配置
    let config = Config::load()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))?;

    Ok(())
}

async fn run(config: Config) -> AppResult<RunStats> {
    App::initialize(config)?.run().await
}
