//! 结果汇聚点
//!
//! 每条记录成功后立即写入，进程崩溃前已写入的记录不会丢失

use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use crate::error::SinkError;
use crate::models::NormalizedRecord;

/// 逐条接收记录
pub trait RecordSink: Send + Sync {
    fn push(&self, record: &NormalizedRecord) -> Result<(), SinkError>;
}

/// 协调者持有的共享结果列表，只追加，每条记录加锁一次
#[derive(Debug, Default)]
pub struct ResultSink {
    records: Mutex<Vec<NormalizedRecord>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: NormalizedRecord) {
        self.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 所有工作进程结束后取出全部记录
    pub fn take(&self) -> Vec<NormalizedRecord> {
        std::mem::take(&mut *self.lock())
    }

    // 写入方崩溃时锁会中毒，已写入的记录仍然有效
    fn lock(&self) -> MutexGuard<'_, Vec<NormalizedRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordSink for ResultSink {
    fn push(&self, record: &NormalizedRecord) -> Result<(), SinkError> {
        self.append(record.clone());
        Ok(())
    }
}

/// 子进程一侧：每条记录写成一行 JSON 并立即 flush
pub struct LineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> RecordSink for LineSink<W> {
    fn push(&self, record: &NormalizedRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

/// 解析子进程输出的一行；空行返回 `None`
pub fn parse_record_line(line: &str) -> Result<Option<NormalizedRecord>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use std::sync::Arc;

    #[test]
    fn line_sink_output_parses_back() {
        let sink = LineSink::new(Vec::new());
        let a = NormalizedRecord::new("Москва")
            .with_fields([("Доля %".to_string(), FieldValue::Float(3.5))].into());
        let b = NormalizedRecord::new("Тверь");
        sink.push(&a).unwrap();
        sink.push(&b).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Vec<_> = text
            .lines()
            .map(|line| parse_record_line(line).unwrap().unwrap())
            .collect();
        assert_eq!(parsed, [a, b]);
    }

    #[test]
    fn blank_line_is_ignored_and_garbage_is_an_error() {
        assert_eq!(parse_record_line("  ").unwrap(), None);
        assert!(parse_record_line("{not json").is_err());
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let sink = Arc::new(ResultSink::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.append(NormalizedRecord::new(format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.len(), 200);
        assert_eq!(sink.take().len(), 200);
        assert!(sink.is_empty());
    }
}
