//! chromiumoxide 实现的浏览会话与标签页

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::launch::launch_browser;
use crate::config::{BadgeGroup, Config};
use crate::error::{BrowserError, ExtractError};
use crate::infrastructure::{BrowserSession, JsExecutor, PageCapability, SessionLauncher};
use crate::models::{RawFieldSet, WorkItem};

/// 按配置启动 Chromium
#[derive(Clone)]
pub struct ChromeLauncher {
    config: Arc<Config>,
}

impl ChromeLauncher {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, BrowserError> {
        let (browser, handler) = launch_browser(&self.config).await?;
        Ok(ChromeSession {
            browser,
            handler,
            config: self.config.clone(),
        })
    }
}

/// 一个浏览器实例，进程内所有标签页共享
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    config: Arc<Config>,
}

impl ChromeSession {
    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Tab = ChromeTab;

    /// 新建标签页，导航到目标页面并等待地区列表出现
    async fn open_tab(&self) -> Result<ChromeTab, ExtractError> {
        let page = self.browser.new_page(self.config.target_url.as_str()).await?;
        let tab = ChromeTab {
            executor: JsExecutor::new(page),
            config: self.config.clone(),
        };

        let region_cls = js_string(&self.config.selectors.region)?;
        let ready = format!("document.getElementsByClassName({region_cls}).length > 0");
        if !tab.wait(&ready).await {
            let _ = tab.close().await;
            return Err(ExtractError::Timeout {
                group: self.config.selectors.region.clone(),
                timeout_ms: self.config.wait_timeout_ms,
            });
        }
        Ok(tab)
    }

    async fn close(mut self) -> Result<(), BrowserError> {
        let result = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
        result.map(|_| ()).map_err(BrowserError::CloseFailed)
    }
}

/// 一个标签页
pub struct ChromeTab {
    executor: JsExecutor,
    config: Arc<Config>,
}

impl ChromeTab {
    async fn wait(&self, condition_js: &str) -> bool {
        self.executor
            .wait_until(
                condition_js,
                self.config.wait_timeout(),
                self.config.poll_interval(),
            )
            .await
    }

    /// 给一次浏览器调用加上时间上限
    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T, ExtractError>
    where
        F: Future<Output = Result<T, ExtractError>>,
    {
        tokio::time::timeout(self.config.wait_timeout(), fut)
            .await
            .map_err(|_| ExtractError::Timeout {
                group: what.to_string(),
                timeout_ms: self.config.wait_timeout_ms,
            })?
    }
}

#[async_trait]
impl PageCapability for ChromeTab {
    async fn bring_into_focus(&self, item: &WorkItem) -> Result<String, ExtractError> {
        let selector = format!("[id={}]", js_string(item.id())?);
        self.bounded(&selector, async {
            let element = self
                .executor
                .page()
                .find_element(selector.as_str())
                .await
                .map_err(|_| ExtractError::not_found(&selector))?;
            let label = element.inner_text().await?.unwrap_or_default();
            element.scroll_into_view().await?;
            element.click().await?;
            Ok::<_, ExtractError>(label.trim().to_string())
        })
        .await
    }

    /// 先等待数值离开占位状态（超时后仍继续读取），再一次性读出整个徽章组
    async fn read_group(&self, group: &BadgeGroup) -> Result<RawFieldSet, ExtractError> {
        let value_cls = js_string(&group.value)?;
        let placeholder = js_string(&self.config.selectors.placeholder)?;
        let rendered = format!(
            "(() => {{ const el = document.getElementsByClassName({value_cls})[0]; \
             return !!el && el.innerText.trim() !== {placeholder}; }})()"
        );
        if !self.wait(&rendered).await {
            debug!("徽章组 {} 等待渲染超时，仍尝试读取", group.name);
        }

        let js = format!(
            r#"(() => {{
                const wrap = document.getElementsByClassName({wrapper})[0];
                if (!wrap) return null;
                const data = {{}};
                for (const badge of wrap.getElementsByClassName({item})) {{
                    const title = badge.getElementsByClassName({title})[0];
                    const value = badge.getElementsByClassName({value_cls})[0];
                    if (!title || !value) return null;
                    data[title.innerText.trim()] = value.innerText;
                }}
                return data;
            }})()"#,
            wrapper = js_string(&group.wrapper)?,
            item = js_string(&group.item)?,
            title = js_string(&group.title)?,
        );

        let data: Option<RawFieldSet> = self.bounded(&group.name, self.executor.eval_as(js)).await?;
        data.ok_or_else(|| ExtractError::not_found(format!(".{}", group.wrapper)))
    }

    async fn close(&self) -> Result<(), ExtractError> {
        if let Err(e) = self.executor.page().clone().close().await {
            warn!("关闭标签页失败: {}", e);
            return Err(e.into());
        }
        Ok(())
    }
}

/// 把字符串编码成 JS 字面量
pub(crate) fn js_string(value: &str) -> Result<String, ExtractError> {
    Ok(serde_json::to_string(value)?)
}
