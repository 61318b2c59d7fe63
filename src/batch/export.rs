use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::jobs::JobOutcome;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    reports: &'a [JobOutcome],
}

/// 导出为 JSON 文档
pub fn export_to_json(outcomes: &[JobOutcome], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    write_json(outcomes, BufWriter::new(file))
}

pub fn write_json<W: Write>(outcomes: &[JobOutcome], mut writer: W) -> Result<()> {
    let document = ReportDocument {
        generated_at: Utc::now(),
        reports: outcomes,
    };
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;
    Ok(())
}

/// 导出为 CSV，每个计费元素一行
pub fn export_to_csv(outcomes: &[JobOutcome], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    write_csv(outcomes, file)
}

pub fn write_csv<W: Write>(outcomes: &[JobOutcome], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "licence_ref",
        "charge_element_id",
        "actual_return_quantity",
        "error",
        "batch_error",
    ])?;

    for outcome in outcomes {
        match outcome {
            JobOutcome::Matched { licence_ref, report } => {
                let batch_error = report.error.map(|e| e.code()).unwrap_or_default();
                for result in &report.data {
                    let quantity = result
                        .actual_return_quantity
                        .as_ref()
                        .map(|q| q.to_string())
                        .unwrap_or_default();
                    writer.write_record([
                        licence_ref.as_str(),
                        result.charge_element_id.as_str(),
                        quantity.as_str(),
                        result.error.map(|e| e.code()).unwrap_or_default(),
                        batch_error,
                    ])?;
                }
            }
            // 失败任务没有元素级结果
            JobOutcome::Failed { licence_ref, reason } => {
                writer.write_record([licence_ref.as_str(), "", "", "", reason.as_str()])?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
