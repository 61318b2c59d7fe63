use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::Result;
use crate::models::{ChargeVersion, MatchReport, Return};
use crate::service::VolumeMatcher;

/// 单个计费版本及其退回
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchJob {
    pub charge_version: ChargeVersion,
    #[serde(default)]
    pub returns: Vec<Return>,
}

/// 每个任务的处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Matched {
        licence_ref: String,
        report: MatchReport,
    },
    Failed {
        licence_ref: String,
        reason: String,
    },
}

impl JobOutcome {
    pub fn licence_ref(&self) -> &str {
        match self {
            JobOutcome::Matched { licence_ref, .. } | JobOutcome::Failed { licence_ref, .. } => {
                licence_ref
            }
        }
    }
}

/// 从 JSON 文件读取任务列表
pub fn load_jobs(path: &Path) -> Result<Vec<MatchJob>> {
    let file = File::open(path)?;
    read_jobs(BufReader::new(file))
}

pub fn read_jobs<R: Read>(reader: R) -> Result<Vec<MatchJob>> {
    Ok(serde_json::from_reader(reader)?)
}

/// 按计费版本并行匹配，输出顺序与输入一致
///
/// 单个任务输入非法只影响该任务。
pub fn run_jobs(jobs: &[MatchJob]) -> Vec<JobOutcome> {
    let matcher = VolumeMatcher::new();
    jobs.par_iter()
        .map(|job| {
            let licence_ref = job.charge_version.licence_ref.clone();
            match matcher.match_charge_version(&job.charge_version, &job.returns) {
                Ok(report) => JobOutcome::Matched { licence_ref, report },
                Err(e) => {
                    tracing::error!("Licence {} matching failed: {}", licence_ref, e);
                    JobOutcome::Failed {
                        licence_ref,
                        reason: e.to_string(),
                    }
                }
            }
        })
        .collect()
}
