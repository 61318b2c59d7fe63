use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::period::{AbstractionPeriod, DateRange};
use crate::error::{MatchError, Result};

/// 用途三元组 (primary/secondary/tertiary)，精确匹配，大小写敏感
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Purpose {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl Purpose {
    pub fn new(primary: &str, secondary: &str, tertiary: &str) -> Self {
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            tertiary: tertiary.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
    AllYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    High,
    Medium,
    Low,
    VeryLow,
}

/// 计费元素 (ChargeElement)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeElement {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub abstraction_period: AbstractionPeriod,
    pub purpose: Purpose,
    pub authorised_annual_quantity: BigDecimal,
    #[serde(default)]
    pub billable_annual_quantity: Option<BigDecimal>,
    pub season: Season,
    pub loss: Loss,
    /// 限时许可的有效区间
    #[serde(default)]
    pub time_limited: Option<DateRange>,
    /// 是否按实测取水量计费 (two-part tariff)
    #[serde(default)]
    pub two_part_tariff: bool,
}

impl ChargeElement {
    /// 可计费量优先，否则取授权量
    pub fn effective_authorised_quantity(&self) -> &BigDecimal {
        self.billable_annual_quantity
            .as_ref()
            .unwrap_or(&self.authorised_annual_quantity)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatchError::invalid("charge element id is empty"));
        }
        self.abstraction_period
            .validate()
            .map_err(|e| e.context(format_args!("charge element {}", self.id)))?;
        if self.authorised_annual_quantity < BigDecimal::zero() {
            return Err(MatchError::invalid(format!(
                "charge element {}: negative authorised quantity",
                self.id
            )));
        }
        if let Some(billable) = &self.billable_annual_quantity {
            if *billable < BigDecimal::zero() {
                return Err(MatchError::invalid(format!(
                    "charge element {}: negative billable quantity",
                    self.id
                )));
            }
        }
        if let Some(range) = &self.time_limited {
            range.validate(&format!("charge element {} time limit", self.id))?;
        }
        Ok(())
    }
}

/// 计费版本 (ChargeVersion)，单次调用内不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeVersion {
    pub licence_ref: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub charge_elements: Vec<ChargeElement>,
}

impl ChargeVersion {
    /// 有效期，无结束日期时视为无限延续
    pub fn validity(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date.unwrap_or(NaiveDate::MAX))
    }

    pub fn has_two_part_tariff(&self) -> bool {
        self.charge_elements.iter().any(|e| e.two_part_tariff)
    }

    pub fn validate(&self) -> Result<()> {
        if self.licence_ref.trim().is_empty() {
            return Err(MatchError::invalid("charge version licence reference is empty"));
        }
        self.validity()
            .validate(&format!("charge version {}", self.licence_ref))?;

        let mut seen: IndexSet<&str> = IndexSet::new();
        for element in &self.charge_elements {
            element.validate()?;
            if !seen.insert(element.id.as_str()) {
                return Err(MatchError::invalid(format!(
                    "duplicate charge element id {}",
                    element.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn element(id: &str) -> ChargeElement {
        ChargeElement {
            id: id.to_string(),
            description: None,
            abstraction_period: AbstractionPeriod::all_year(),
            purpose: Purpose::new("A", "AGR", "400"),
            authorised_annual_quantity: BigDecimal::from(10),
            billable_annual_quantity: None,
            season: Season::AllYear,
            loss: Loss::Medium,
            time_limited: None,
            two_part_tariff: true,
        }
    }

    fn version(elements: Vec<ChargeElement>) -> ChargeVersion {
        ChargeVersion {
            licence_ref: "01/123".to_string(),
            start_date: date(2020, 4, 1),
            end_date: None,
            charge_elements: elements,
        }
    }

    #[test]
    fn duplicate_element_ids_are_rejected() {
        let cv = version(vec![element("e1"), element("e2"), element("e1")]);
        let err = cv.validate().unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("duplicate charge element id e1"));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut cv = version(vec![element("e1")]);
        cv.end_date = Some(date(2020, 3, 31));
        assert!(cv.validate().unwrap_err().is_invalid_input());

        cv.end_date = Some(date(2020, 4, 1));
        assert!(cv.validate().is_ok());
    }

    #[test]
    fn billable_quantity_overrides_authorised() {
        let mut e = element("e1");
        assert_eq!(e.effective_authorised_quantity(), &BigDecimal::from(10));
        e.billable_annual_quantity = Some(BigDecimal::from(7));
        assert_eq!(e.effective_authorised_quantity(), &BigDecimal::from(7));
    }
}
