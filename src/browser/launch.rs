use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use chromiumoxide::handler::Handler;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::BrowserError;

static PROFILE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// 启动浏览器，并在后台处理浏览器事件
///
/// 每次启动使用独立的用户目录，多个进程可以同时运行
pub async fn launch_browser(config: &Config) -> Result<(Browser, JoinHandle<()>), BrowserError> {
    info!("🚀 启动浏览器 (headless: {})...", config.headless);

    let browser_config = build_browser_config(config).map_err(|e| {
        error!("配置浏览器失败: {}", e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e)
    })?;
    debug!("浏览器启动成功");

    Ok((browser, spawn_handler(handler)))
}

fn build_browser_config(config: &Config) -> Result<BrowserConfig, String> {
    let mut builder = BrowserConfig::builder();
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(PathBuf::from(executable));
    }

    builder
        .user_data_dir(profile_dir())
        .request_timeout(config.wait_timeout())
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ])
        .build()
}

fn profile_dir() -> PathBuf {
    let seq = PROFILE_SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "region-stats-scraper-{}-{}",
        std::process::id(),
        seq
    ))
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    })
}
