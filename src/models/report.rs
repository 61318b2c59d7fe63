use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 批次级状态码，表示退回数据不完整，不是异常
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchError {
    NoReturnsSubmitted,
    SomeReturnsDue,
}

impl BatchError {
    pub fn code(&self) -> &'static str {
        match self {
            BatchError::NoReturnsSubmitted => "NO_RETURNS_SUBMITTED",
            BatchError::SomeReturnsDue => "SOME_RETURNS_DUE",
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 元素级提示，不清空数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementError {
    OverAbstraction,
    UnderQuery,
}

impl ElementError {
    pub fn code(&self) -> &'static str {
        match self {
            ElementError::OverAbstraction => "OVER_ABSTRACTION",
            ElementError::UnderQuery => "UNDER_QUERY",
        }
    }
}

/// 单个计费元素的匹配结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub charge_element_id: String,
    pub actual_return_quantity: Option<BigDecimal>,
    pub error: Option<ElementError>,
}

impl MatchResult {
    pub fn empty(charge_element_id: &str) -> Self {
        Self {
            charge_element_id: charge_element_id.to_string(),
            actual_return_quantity: None,
            error: None,
        }
    }
}

/// 引擎唯一输出，data 与计费元素顺序一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub error: Option<BatchError>,
    pub data: Vec<MatchResult>,
}

impl MatchReport {
    pub fn is_ready(&self) -> bool {
        self.error.is_none()
    }

    /// 按计费元素ID查找
    pub fn result_for(&self, charge_element_id: &str) -> Option<&MatchResult> {
        self.data
            .iter()
            .find(|r| r.charge_element_id == charge_element_id)
    }
}
