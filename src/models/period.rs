use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// 闭区间日期范围 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 包含首尾的天数，单日区间为 1
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// 交集，不相交时返回 None
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateRange { start, end })
    }

    pub fn validate(&self, what: &str) -> Result<()> {
        if self.end < self.start {
            return Err(MatchError::invalid(format!(
                "{}: end {} is before start {}",
                what, self.end, self.start
            )));
        }
        Ok(())
    }
}

/// 年度取水期 (日/月)，允许跨年，如 11-01 ~ 02-28
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractionPeriod {
    pub start_day: u32,
    pub start_month: u32,
    pub end_day: u32,
    pub end_month: u32,
}

impl AbstractionPeriod {
    pub fn new(start_day: u32, start_month: u32, end_day: u32, end_month: u32) -> Self {
        Self {
            start_day,
            start_month,
            end_day,
            end_month,
        }
    }

    /// 整年 01-01 ~ 12-31
    pub fn all_year() -> Self {
        Self::new(1, 1, 31, 12)
    }

    /// 结束日早于开始日即视为跨年
    pub fn wraps_year_end(&self) -> bool {
        (self.end_month, self.end_day) < (self.start_month, self.start_day)
    }

    pub fn validate(&self) -> Result<()> {
        check_day_month(self.start_day, self.start_month, "abstraction period start")?;
        check_day_month(self.end_day, self.end_month, "abstraction period end")
    }
}

/// 闰年校验，2 月 29 日合法
fn check_day_month(day: u32, month: u32, what: &str) -> Result<()> {
    let valid = (1..=12).contains(&month) && day >= 1 && day <= days_in_month(2000, month);
    if !valid {
        return Err(MatchError::invalid(format!(
            "{}: {:02}-{:02} is not a valid day/month",
            what, day, month
        )));
    }
    Ok(())
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
