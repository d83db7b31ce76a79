//! 页面能力接口 - 基础设施层
//!
//! 抽取流程只通过这里的 trait 接触浏览器。chromiumoxide 的实现在 `browser` 模块，
//! 测试使用脚本化的假页面。

use async_trait::async_trait;

use crate::config::BadgeGroup;
use crate::error::{BrowserError, ExtractError};
use crate::models::{RawFieldSet, WorkItem};

/// 单个标签页暴露给抽取器的能力
///
/// 每个方法内部自带有限等待，超时后返回错误而不是挂起
#[async_trait]
pub trait PageCapability: Send + Sync {
    /// 滚动到条目并点击，返回条目的显示名称
    async fn bring_into_focus(&self, item: &WorkItem) -> Result<String, ExtractError>;

    /// 读取一个徽章组（标题 → 文本）
    async fn read_group(&self, group: &BadgeGroup) -> Result<RawFieldSet, ExtractError>;

    /// 关闭标签页
    async fn close(&self) -> Result<(), ExtractError>;
}

/// 一个进程内共享的浏览会话
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Tab: PageCapability;

    /// 打开新标签页并进入可读取状态
    async fn open_tab(&self) -> Result<Self::Tab, ExtractError>;

    /// 释放会话
    async fn close(self) -> Result<(), BrowserError>
    where
        Self: Sized;
}

/// 创建浏览会话
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session, BrowserError>;
}
