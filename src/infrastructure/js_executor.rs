//! JS 执行器 - 基础设施层
//!
//! 持有一个标签页，暴露"执行 JS"和"等待页面条件"的能力

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout, Instant};

use crate::error::ExtractError;

/// JS 执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 暴露 eval() 能力
/// - 不认识地区 / 徽章组
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于点击、导航等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 表达式并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, ExtractError> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 表达式并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, ExtractError> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 轮询布尔表达式直到为真或超时
    ///
    /// # 返回
    /// 条件在期限内成立返回 `true`，超时返回 `false`；脚本执行失败视为条件未成立
    pub async fn wait_until(&self, condition_js: &str, limit: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let probe = timeout(remaining.max(poll), self.eval_as::<bool>(condition_js));
            if let Ok(Ok(true)) = probe.await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(poll).await;
        }
    }
}
