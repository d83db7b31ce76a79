//! 导出服务 - 业务能力层
//!
//! 只负责"把排好序的记录写成表格"，不关心记录来自哪里

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::models::NormalizedRecord;

/// 表头：地区列在最前，其后是所有记录字段的并集（按首次出现顺序）
pub fn columns(records: &[NormalizedRecord], label_column: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::from([label_column]);
    let mut columns = vec![label_column.to_string()];
    for record in records {
        for key in record.fields.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// 写出 CSV，每条记录一行，缺失的字段留空
pub fn export_csv(
    records: &[NormalizedRecord],
    label_column: &str,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let csv_err = |source| ExportError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    write_rows(&mut writer, records, label_column).map_err(csv_err)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!("💾 数据已保存至 {} ({} 行)", path.display(), records.len());
    Ok(())
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    records: &[NormalizedRecord],
    label_column: &str,
) -> Result<(), csv::Error> {
    let columns = columns(records, label_column);
    writer.write_record(&columns)?;

    for record in records {
        let row = columns.iter().enumerate().map(|(i, column)| {
            if i == 0 {
                record.label.clone()
            } else {
                record
                    .get(column)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            }
        });
        writer.write_record(row)?;
    }
    Ok(())
}
