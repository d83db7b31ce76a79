//! 汇总结果

use crate::models::record::NormalizedRecord;

/// 所有进程的记录汇总
///
/// 运行期间只追加；结束时排序一次后交给导出
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregateResult {
    records: Vec<NormalizedRecord>,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = NormalizedRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按地区名称稳定排序，不去重
    pub fn finalize(mut self) -> Vec<NormalizedRecord> {
        self.records.sort_by(|a, b| a.label.cmp(&b.label));
        self.records
    }
}

impl From<Vec<NormalizedRecord>> for AggregateResult {
    fn from(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }
}
