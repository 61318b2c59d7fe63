use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexSet;

use super::decimal::{decimal_max, DecimalAccumulator};
use super::period::{line_overlap, share_line, LineOverlap};
use super::purpose::return_covers;
use super::status::classify;
use crate::error::{MatchError, Result};
use crate::models::{
    ChargeElement, ChargeVersion, DateRange, ElementError, MatchReport, MatchResult, Return,
};

/// 退回-计费元素取水量匹配与分摊
///
/// 纯计算：无 I/O、无共享可变状态，不同计费版本之间可以任意并行。
#[derive(Debug, Default, Clone, Copy)]
pub struct VolumeMatcher;

impl VolumeMatcher {
    pub fn new() -> Self {
        Self
    }

    /// 对单个计费版本执行匹配
    pub fn match_charge_version(
        &self,
        version: &ChargeVersion,
        returns: &[Return],
    ) -> Result<MatchReport> {
        // 1. 输入校验，失败时不产生任何结果
        validate_input(version, returns)?;

        // 2. 完整度判定 (整个计费版本只做一次)
        let (completeness, summary) = classify(version, returns);
        if let Some(code) = completeness.batch_error() {
            tracing::warn!(
                "Licence {}: {} (relevant: {}, due: {}, submitted: {}, nil: {})",
                version.licence_ref,
                code,
                summary.relevant,
                summary.due,
                summary.submitted,
                summary.nil
            );
            return Ok(MatchReport {
                error: Some(code),
                data: version
                    .charge_elements
                    .iter()
                    .map(|e| MatchResult::empty(&e.id))
                    .collect(),
            });
        }

        // 3. 逐行分摊
        let elements = &version.charge_elements;
        let bounds: Vec<Option<DateRange>> =
            elements.iter().map(|e| element_bounds(version, e)).collect();
        let mut accumulators = vec![DecimalAccumulator::new(); elements.len()];
        let mut under_query = vec![false; elements.len()];

        for ret in returns {
            let covering: Vec<usize> = elements
                .iter()
                .enumerate()
                .filter(|(_, e)| return_covers(ret, &e.purpose))
                .map(|(idx, _)| idx)
                .collect();
            if covering.is_empty() {
                continue;
            }
            if ret.under_query {
                for &idx in &covering {
                    under_query[idx] = true;
                }
            }
            if !ret.contributes() {
                continue;
            }

            for line in &ret.lines {
                let Some(quantity) = line.quantity_m3() else {
                    continue;
                };
                let range = line.range();

                let overlaps: Vec<(usize, LineOverlap)> = covering
                    .iter()
                    .filter_map(|&idx| {
                        let bound = bounds[idx].as_ref()?;
                        let overlap = line_overlap(&elements[idx].abstraction_period, &range, bound);
                        (!overlap.is_empty()).then_some((idx, overlap))
                    })
                    .collect();

                // 多个元素争用同一明细行时逐日平分，合计不超过 100%
                for (idx, weight) in share_line(&range, &overlaps) {
                    accumulators[idx].add(&quantity, weight);
                }
            }
        }

        // 4. 舍入并生成结果
        let zero = BigDecimal::zero();
        let data: Vec<MatchResult> = elements
            .iter()
            .zip(accumulators)
            .zip(under_query)
            .map(|((element, acc), queried)| {
                let lines = acc.line_count();
                let quantity = acc.finish();
                let authorised = element.effective_authorised_quantity();
                let excess = decimal_max(&(&quantity - authorised), &zero).clone();
                let error = if queried {
                    Some(ElementError::UnderQuery)
                } else if excess > zero {
                    Some(ElementError::OverAbstraction)
                } else {
                    None
                };

                tracing::debug!(
                    "Licence {} element {}: {} lines, actual {} (authorised {}, excess {})",
                    version.licence_ref,
                    element.id,
                    lines,
                    quantity,
                    authorised,
                    excess
                );

                MatchResult {
                    charge_element_id: element.id.clone(),
                    actual_return_quantity: Some(quantity),
                    error,
                }
            })
            .collect();

        tracing::info!(
            "Licence {} matched: {} elements, {} relevant returns ({} nil)",
            version.licence_ref,
            data.len(),
            summary.relevant,
            summary.nil
        );

        Ok(MatchReport { error: None, data })
    }
}

/// 单次匹配入口
pub fn match_volumes(version: &ChargeVersion, returns: &[Return]) -> Result<MatchReport> {
    VolumeMatcher::new().match_charge_version(version, returns)
}

/// 计费版本有效期与限时区间的交集，为空时该元素不分摊任何数量
fn element_bounds(version: &ChargeVersion, element: &ChargeElement) -> Option<DateRange> {
    let validity = version.validity();
    match &element.time_limited {
        Some(limit) => validity.intersect(limit),
        None => Some(validity),
    }
}

fn validate_input(version: &ChargeVersion, returns: &[Return]) -> Result<()> {
    version.validate()?;

    let mut seen: IndexSet<&str> = IndexSet::new();
    for ret in returns {
        ret.validate()?;
        if ret.licence_ref != version.licence_ref {
            return Err(MatchError::invalid(format!(
                "return {} belongs to licence {}, expected {}",
                ret.id, ret.licence_ref, version.licence_ref
            )));
        }
        if !seen.insert(ret.id.as_str()) {
            return Err(MatchError::invalid(format!("duplicate return id {}", ret.id)));
        }
    }
    Ok(())
}
