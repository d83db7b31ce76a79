//! 条目处理上下文
//!
//! 封装"我正在哪个进程、哪个标签页处理第几个地区"这一信息

use std::fmt::Display;

/// 条目处理上下文，仅用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCtx {
    /// 进程编号（从 1 开始）
    pub worker_index: usize,
    /// 标签页编号（从 1 开始）
    pub tab_index: usize,
    /// 条目在本标签页中的序号（从 1 开始）
    pub item_index: usize,
    /// 本标签页的条目总数
    pub item_total: usize,
}

impl ItemCtx {
    pub fn new(worker_index: usize, tab_index: usize, item_index: usize, item_total: usize) -> Self {
        Self {
            worker_index,
            tab_index,
            item_index,
            item_total,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[进程 {} 标签页 {} 条目 {}/{}]",
            self.worker_index, self.tab_index, self.item_index, self.item_total
        )
    }
}
