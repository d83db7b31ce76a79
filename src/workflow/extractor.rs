//! 单个地区抽取流程 - 流程层
//!
//! 流程顺序：
//! 1. 聚焦地区（滚动 + 点击），得到地区名称
//! 2. 读取侧边栏徽章组 → 规范化
//! 3. 读取底部徽章组 → 规范化
//! 4. 合并为一条记录
//!
//! 任何一步失败都只影响当前地区：记录日志并跳过

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{BadgeGroup, Selectors};
use crate::error::ExtractError;
use crate::infrastructure::PageCapability;
use crate::models::{NormalizedRecord, RawFieldSet, WorkItem};
use crate::services::normalizer;
use crate::workflow::item_ctx::ItemCtx;

/// 单个地区的抽取器
///
/// 不持有任何页面资源，页面由调用方传入
#[derive(Debug, Clone)]
pub struct ItemExtractor {
    selectors: Arc<Selectors>,
    wait_timeout_ms: u64,
}

impl ItemExtractor {
    pub fn new(selectors: Arc<Selectors>, wait_timeout_ms: u64) -> Self {
        Self {
            selectors,
            wait_timeout_ms,
        }
    }

    /// 抽取一个地区，失败时返回错误
    pub async fn extract<P>(&self, page: &P, item: &WorkItem) -> Result<NormalizedRecord, ExtractError>
    where
        P: PageCapability + ?Sized,
    {
        let label = page.bring_into_focus(item).await?;
        let mut record = NormalizedRecord::new(label);

        for group in self.selectors.groups() {
            let raw = page.read_group(group).await?;
            self.ensure_rendered(group, &raw)?;
            record = record.with_fields(normalizer::normalize(&raw)?);
        }

        Ok(record)
    }

    /// 抽取一个地区，失败时记录日志并返回 `None`
    pub async fn extract_or_skip<P>(&self, page: &P, item: &WorkItem, ctx: &ItemCtx) -> Option<NormalizedRecord>
    where
        P: PageCapability + ?Sized,
    {
        match self.extract(page, item).await {
            Ok(record) => {
                info!("{} ✓ 成功解析 {}", ctx, record.label);
                Some(record)
            }
            Err(e) => {
                warn!("{} ⚠️ 跳过地区 {}: {}", ctx, item, e);
                None
            }
        }
    }

    /// 读取时仍为占位文本，说明等待已超时而页面还没渲染完
    fn ensure_rendered(&self, group: &BadgeGroup, raw: &RawFieldSet) -> Result<(), ExtractError> {
        let placeholder = self.selectors.placeholder.as_str();
        if raw.values().any(|value| value.trim() == placeholder) {
            return Err(ExtractError::Timeout {
                group: group.name.clone(),
                timeout_ms: self.wait_timeout_ms,
            });
        }
        Ok(())
    }
}
