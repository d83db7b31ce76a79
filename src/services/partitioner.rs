//! 列表切分服务 - 业务能力层
//!
//! 外层按进程数切分，内层按标签页数切分，两层都使用同一实现

use crate::error::PartitionError;

/// 切分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionSpec {
    /// 连续窗口，每块 `n` 个，最后一块可能更短
    BySize(usize),
    /// 轮询分配到 `n` 块，第 i 个元素进入第 `i % n` 块
    ByCount(usize),
}

impl PartitionSpec {
    /// 两个参数必须且只能给一个，且必须为正数
    pub fn from_options(
        chunk_size: Option<usize>,
        num_chunks: Option<usize>,
    ) -> Result<Self, PartitionError> {
        match (chunk_size, num_chunks) {
            (Some(_), Some(_)) => Err(PartitionError::BothGiven),
            (None, None) => Err(PartitionError::NeitherGiven),
            (Some(0), None) => Err(PartitionError::NotPositive { name: "chunk_size" }),
            (None, Some(0)) => Err(PartitionError::NotPositive { name: "num_chunks" }),
            (Some(size), None) => Ok(PartitionSpec::BySize(size)),
            (None, Some(count)) => Ok(PartitionSpec::ByCount(count)),
        }
    }

    pub fn by_count(count: usize) -> Result<Self, PartitionError> {
        Self::from_options(None, Some(count))
    }

    pub fn by_size(size: usize) -> Result<Self, PartitionError> {
        Self::from_options(Some(size), None)
    }
}

/// 切分结果：每个元素恰好出现一次，块内保持原顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan<T> {
    chunks: Vec<Vec<T>>,
}

impl<T> PartitionPlan<T> {
    pub fn chunks(&self) -> &[Vec<T>] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<Vec<T>> {
        self.chunks
    }

    /// 块数（包括 `ByCount` 产生的空块）
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// 所有块中的元素总数
    pub fn item_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// 丢弃空块，保留原下标
    pub fn non_empty(self) -> impl Iterator<Item = (usize, Vec<T>)> {
        self.chunks
            .into_iter()
            .enumerate()
            .filter(|(_, chunk)| !chunk.is_empty())
    }
}

/// 按给定方式切分列表
///
/// `spec` 中的数值为 0 时返回错误；请优先通过 `PartitionSpec::from_options` 构造
pub fn partition<T: Clone>(items: &[T], spec: PartitionSpec) -> Result<PartitionPlan<T>, PartitionError> {
    let chunks = match spec {
        PartitionSpec::BySize(0) => return Err(PartitionError::NotPositive { name: "chunk_size" }),
        PartitionSpec::ByCount(0) => return Err(PartitionError::NotPositive { name: "num_chunks" }),
        PartitionSpec::BySize(size) => items.chunks(size).map(<[T]>::to_vec).collect(),
        PartitionSpec::ByCount(count) => {
            let mut chunks: Vec<Vec<T>> = (0..count)
                .map(|_| Vec::with_capacity(items.len() / count + 1))
                .collect();
            for (i, item) in items.iter().enumerate() {
                chunks[i % count].push(item.clone());
            }
            chunks
        }
    };
    Ok(PartitionPlan { chunks })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_to_nine() -> Vec<u32> {
        (0..10).collect()
    }

    #[test]
    fn by_count_round_robin_sizes() {
        let plan = partition(&zero_to_nine(), PartitionSpec::by_count(3).unwrap()).unwrap();
        let sizes: Vec<_> = plan.chunks().iter().map(Vec::len).collect();
        assert_eq!(sizes, [4, 3, 3]);
        assert_eq!(plan.item_count(), 10);
        assert_eq!(plan.chunks()[0], [0, 3, 6, 9]);
        assert_eq!(plan.chunks()[1], [1, 4, 7]);
        assert_eq!(plan.chunks()[2], [2, 5, 8]);
    }

    #[test]
    fn by_count_original_index_is_recoverable() {
        let items: Vec<u32> = (0..23).collect();
        let count = 4;
        let plan = partition(&items, PartitionSpec::ByCount(count)).unwrap();
        let mut seen = Vec::new();
        for (chunk_index, chunk) in plan.chunks().iter().enumerate() {
            for (pos, value) in chunk.iter().enumerate() {
                // 第 chunk_index 块第 pos 个元素的原下标为 pos * count + chunk_index
                assert_eq!(items[pos * count + chunk_index], *value);
                seen.push(*value);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, items);
    }

    #[test]
    fn by_count_larger_than_input_leaves_empty_chunks() {
        let plan = partition(&[1, 2], PartitionSpec::ByCount(4)).unwrap();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.item_count(), 2);
        let non_empty: Vec<_> = plan.non_empty().collect();
        assert_eq!(non_empty, [(0, vec![1]), (1, vec![2])]);
    }

    #[test]
    fn by_size_contiguous_windows() {
        let plan = partition(&zero_to_nine(), PartitionSpec::by_size(4).unwrap()).unwrap();
        assert_eq!(
            plan.into_chunks(),
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]
        );
    }

    #[test]
    fn by_size_on_empty_input_has_no_chunks() {
        let plan = partition::<u32>(&[], PartitionSpec::BySize(3)).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn both_or_neither_option_is_rejected() {
        assert_eq!(
            PartitionSpec::from_options(Some(4), Some(3)),
            Err(PartitionError::BothGiven)
        );
        assert_eq!(
            PartitionSpec::from_options(None, None),
            Err(PartitionError::NeitherGiven)
        );
    }

    #[test]
    fn zero_is_rejected() {
        assert!(PartitionSpec::by_size(0).is_err());
        assert!(PartitionSpec::by_count(0).is_err());
        assert!(partition(&[1], PartitionSpec::ByCount(0)).is_err());
    }
}
