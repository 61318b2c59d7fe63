use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::charge::Purpose;
use super::period::DateRange;
use crate::error::{MatchError, Result};

/// 退回提交状态，封闭集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    Due,
    Received,
    Completed,
    Nil,
}

impl ReturnStatus {
    /// received / completed / nil 都算已提交
    pub fn is_submitted(&self) -> bool {
        match self {
            ReturnStatus::Due => false,
            ReturnStatus::Received | ReturnStatus::Completed | ReturnStatus::Nil => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Due => "due",
            ReturnStatus::Received => "received",
            ReturnStatus::Completed => "completed",
            ReturnStatus::Nil => "nil",
        }
    }
}

impl FromStr for ReturnStatus {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "due" => Ok(ReturnStatus::Due),
            "received" => Ok(ReturnStatus::Received),
            "completed" => Ok(ReturnStatus::Completed),
            "nil" => Ok(ReturnStatus::Nil),
            other => Err(MatchError::invalid(format!("unknown return status '{}'", other))),
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// 计量单位，累加前统一换算为立方米
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuantityUnit {
    #[default]
    #[serde(rename = "m3")]
    CubicMetres,
    #[serde(rename = "l")]
    Litres,
    #[serde(rename = "Ml")]
    Megalitres,
    #[serde(rename = "gal")]
    Gallons,
}

impl QuantityUnit {
    pub fn to_cubic_metres(&self, quantity: &BigDecimal) -> BigDecimal {
        match self {
            QuantityUnit::CubicMetres => quantity.clone(),
            QuantityUnit::Litres => quantity * &BigDecimal::new(1.into(), 3),
            QuantityUnit::Megalitres => quantity * &BigDecimal::from(1000),
            // 英制加仑
            QuantityUnit::Gallons => quantity * &BigDecimal::new(454_609.into(), 8),
        }
    }
}

/// 退回明细行 (ReturnLine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLine {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 未计量时为空
    #[serde(default)]
    pub quantity: Option<BigDecimal>,
    #[serde(default)]
    pub unit: QuantityUnit,
}

impl ReturnLine {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// 换算后的立方米数量
    pub fn quantity_m3(&self) -> Option<BigDecimal> {
        self.quantity.as_ref().map(|q| self.unit.to_cubic_metres(q))
    }
}

/// 取水退回 (Return)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Return {
    pub id: String,
    pub licence_ref: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: Frequency,
    pub status: ReturnStatus,
    #[serde(default)]
    pub under_query: bool,
    pub purposes: Vec<Purpose>,
    #[serde(default)]
    pub lines: Vec<ReturnLine>,
}

impl Return {
    pub fn period(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// 是否有可分摊的数量，nil 退回不贡献
    pub fn contributes(&self) -> bool {
        matches!(self.status, ReturnStatus::Received | ReturnStatus::Completed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatchError::invalid("return id is empty"));
        }
        if self.licence_ref.trim().is_empty() {
            return Err(MatchError::invalid(format!("return {}: licence reference is empty", self.id)));
        }
        self.period().validate(&format!("return {}", self.id))?;

        for (idx, line) in self.lines.iter().enumerate() {
            line.range()
                .validate(&format!("return {} line {}", self.id, idx))?;
            if let Some(quantity) = &line.quantity {
                if *quantity < BigDecimal::zero() {
                    return Err(MatchError::invalid(format!(
                        "return {} line {}: negative quantity {}",
                        self.id, idx, quantity
                    )));
                }
            }
        }
        Ok(())
    }
}
