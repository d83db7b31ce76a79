use tracing::{debug, info, warn};

use crate::browser::session::{js_string, ChromeSession};
use crate::error::{BrowserError, ExtractError};
use crate::infrastructure::{BrowserSession, JsExecutor};
use crate::models::WorkItem;

/// 打开目标页面，收集所有地区元素的 id
///
/// 没有 id 的元素会被忽略；返回顺序即页面顺序
pub async fn discover_work_items(session: ChromeSession) -> Result<Vec<WorkItem>, BrowserError> {
    let result = collect_ids(&session).await;
    if let Err(e) = session.close().await {
        warn!("关闭发现阶段的浏览器失败: {}", e);
    }
    result
}

async fn collect_ids(session: &ChromeSession) -> Result<Vec<WorkItem>, BrowserError> {
    let config = session.config();
    let url = config.target_url.as_str();
    info!("📁 正在获取待处理的地区: {}", url);

    let page = session
        .browser()
        .new_page(url)
        .await
        .map_err(|source| BrowserError::NavigationFailed {
            url: url.to_string(),
            source,
        })?;
    let executor = JsExecutor::new(page);

    let wrap_cls = js_string(&config.selectors.regions_wrap)?;
    let ready = format!("document.getElementsByClassName({wrap_cls}).length > 0");
    if !executor
        .wait_until(&ready, config.wait_timeout(), config.poll_interval())
        .await
    {
        return Err(ExtractError::Timeout {
            group: config.selectors.regions_wrap.clone(),
            timeout_ms: config.wait_timeout_ms,
        }
        .into());
    }

    let js = format!(
        "Array.from(document.getElementsByClassName({wrap_cls})[0]\
         .getElementsByClassName({region_cls})).map(el => el.getAttribute('id'))",
        region_cls = js_string(&config.selectors.region)?,
    );
    let ids: Vec<Option<String>> = executor.eval_as(js).await?;
    debug!("页面上共有 {} 个地区元素", ids.len());

    let items: Vec<WorkItem> = ids
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .map(WorkItem::from)
        .collect();
    info!("✓ 找到 {} 个待处理的地区", items.len());
    Ok(items)
}
