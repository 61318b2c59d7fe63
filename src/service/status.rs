use indexmap::IndexMap;

use super::purpose::return_covers;
use crate::models::{BatchError, ChargeVersion, Return, ReturnStatus};

/// 退回完整度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    Ready,
    Incomplete(BatchError),
}

impl Completeness {
    pub fn batch_error(&self) -> Option<BatchError> {
        match self {
            Completeness::Ready => None,
            Completeness::Incomplete(code) => Some(*code),
        }
    }
}

/// 分类统计，用于日志和批处理输出
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub relevant: usize,
    pub due: usize,
    pub submitted: usize,
    pub nil: usize,
}

/// 与任一两部制计费元素用途相符的退回，按ID去重、保序
pub fn relevant_returns<'a>(
    version: &ChargeVersion,
    returns: &'a [Return],
) -> IndexMap<&'a str, &'a Return> {
    let tpt_purposes: Vec<_> = version
        .charge_elements
        .iter()
        .filter(|e| e.two_part_tariff)
        .map(|e| &e.purpose)
        .collect();

    let mut relevant = IndexMap::new();
    for ret in returns {
        if tpt_purposes.iter().any(|purpose| return_covers(ret, purpose)) {
            relevant.entry(ret.id.as_str()).or_insert(ret);
        }
    }
    relevant
}

/// 按优先级判定整个计费版本的退回完整度
///
/// 1. 全部 due (或没有相关退回) -> NO_RETURNS_SUBMITTED
/// 2. 部分已提交、仍有 due -> SOME_RETURNS_DUE
/// 3. 全部已提交 (含 nil) -> Ready
pub fn classify(version: &ChargeVersion, returns: &[Return]) -> (Completeness, ClassificationSummary) {
    let relevant = relevant_returns(version, returns);

    let mut summary = ClassificationSummary {
        relevant: relevant.len(),
        ..Default::default()
    };
    for ret in relevant.values() {
        match ret.status {
            ReturnStatus::Due => summary.due += 1,
            ReturnStatus::Nil => {
                summary.nil += 1;
                summary.submitted += 1;
            }
            ReturnStatus::Received | ReturnStatus::Completed => summary.submitted += 1,
        }
    }

    if !version.has_two_part_tariff() {
        return (Completeness::Ready, summary);
    }

    let completeness = if summary.submitted == 0 {
        Completeness::Incomplete(BatchError::NoReturnsSubmitted)
    } else if summary.due > 0 {
        Completeness::Incomplete(BatchError::SomeReturnsDue)
    } else {
        Completeness::Ready
    };

    (completeness, summary)
}
