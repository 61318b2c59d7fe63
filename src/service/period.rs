use chrono::{Datelike, NaiveDate};

use super::decimal::{lcm, Fraction};
use crate::models::period::days_in_month;
use crate::models::{AbstractionPeriod, DateRange};

/// 某年的具体日期，不存在的日子 (非闰年 2-29) 落到当月最后一天
fn anchor(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

/// 将年度取水期展开为 [from_year, to_year] 各年起始的具体区间
///
/// 跨年窗口在 Y 年开始、Y+1 年结束。
pub fn expand_window(period: &AbstractionPeriod, from_year: i32, to_year: i32) -> Vec<DateRange> {
    let wraps = period.wraps_year_end();
    (from_year..=to_year)
        .filter_map(|year| {
            let start = anchor(year, period.start_month, period.start_day)?;
            let end_year = if wraps { year + 1 } else { year };
            let end = anchor(end_year, period.end_month, period.end_day)?;
            Some(DateRange::new(start, end))
        })
        .collect()
}

/// 明细行与取水期的重叠
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOverlap {
    pub days: i64,
    pub line_days: i64,
    /// 合并后的重叠区间，按开始日期排序、互不相交
    pub pieces: Vec<DateRange>,
}

impl LineOverlap {
    pub fn is_empty(&self) -> bool {
        self.days == 0
    }

    /// 重叠比例，限定在 [0, 1]
    pub fn fraction(&self) -> Fraction {
        Fraction::new(self.days, self.line_days).clamp_unit()
    }

    fn owns(&self, day: NaiveDate) -> bool {
        self.pieces.iter().any(|p| p.start <= day && day <= p.end)
    }
}

/// 计算明细行落在取水期 (且在 bounds 之内) 的天数
///
/// 区间先裁剪到明细行和 bounds，再合并，避免同一天被计两次。
pub fn line_overlap(period: &AbstractionPeriod, line: &DateRange, bounds: &DateRange) -> LineOverlap {
    let line_days = line.days();

    let mut clipped: Vec<DateRange> = expand_window(period, line.start.year() - 1, line.end.year())
        .iter()
        .filter_map(|window| window.intersect(line))
        .filter_map(|piece| piece.intersect(bounds))
        .collect();
    clipped.sort_by_key(|piece| piece.start);

    let mut pieces: Vec<DateRange> = Vec::with_capacity(clipped.len());
    for piece in clipped {
        match pieces.last_mut() {
            Some(last) if last.end.succ_opt().map_or(true, |next| piece.start <= next) => {
                last.end = last.end.max(piece.end);
            }
            _ => pieces.push(piece),
        }
    }

    let days: i64 = pieces.iter().map(DateRange::days).sum();
    LineOverlap {
        days: days.min(line_days),
        line_days,
        pieces,
    }
}

/// 多个元素争用同一明细行时逐日分配
///
/// 每一天的份额 (1 / line_days) 由当天认领它的元素平分，不属于任何元素的天不分配。
/// 单个元素独占时结果等于其重叠比例，合计永不超过 100%。
pub fn share_line(line: &DateRange, claims: &[(usize, LineOverlap)]) -> Vec<(usize, Fraction)> {
    let line_days = line.days();
    if line_days <= 0 || claims.is_empty() {
        return Vec::new();
    }

    // 以距 line.start 的天数表示的半开切分点
    let mut cuts: Vec<i64> = claims
        .iter()
        .flat_map(|(_, overlap)| overlap.pieces.iter())
        .flat_map(|piece| {
            [
                (piece.start - line.start).num_days(),
                (piece.end - line.start).num_days() + 1,
            ]
        })
        .map(|offset| offset.clamp(0, line_days))
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let spans: Vec<(i64, Vec<usize>)> = cuts
        .windows(2)
        .filter_map(|w| {
            let day = line.start + chrono::Duration::days(w[0]);
            let owners: Vec<usize> = claims
                .iter()
                .enumerate()
                .filter(|(_, (_, overlap))| overlap.owns(day))
                .map(|(pos, _)| pos)
                .collect();
            (!owners.is_empty()).then_some((w[1] - w[0], owners))
        })
        .collect();

    let common = spans
        .iter()
        .fold(1i64, |acc, (_, owners)| lcm(acc, owners.len() as i64));

    let mut numerators = vec![0i64; claims.len()];
    for (days, owners) in &spans {
        let share = days * (common / owners.len() as i64);
        for &pos in owners {
            numerators[pos] += share;
        }
    }

    claims
        .iter()
        .zip(numerators)
        .map(|((idx, _), numerator)| (*idx, Fraction::new(numerator, line_days * common)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn unbounded() -> DateRange {
        DateRange::new(NaiveDate::MIN, NaiveDate::MAX)
    }

    #[test]
    fn wrapping_window_expands_across_year_boundary() {
        let winter = AbstractionPeriod::new(1, 11, 28, 2);
        let windows = expand_window(&winter, 2020, 2021);
        assert_eq!(
            windows,
            vec![
                DateRange::new(date(2020, 11, 1), date(2021, 2, 28)),
                DateRange::new(date(2021, 11, 1), date(2022, 2, 28)),
            ]
        );
    }

    #[test]
    fn feb_29_end_falls_back_in_non_leap_year() {
        let period = AbstractionPeriod::new(1, 11, 29, 2);
        let windows = expand_window(&period, 2022, 2023);
        assert_eq!(windows[0].end, date(2023, 2, 28));
        assert_eq!(windows[1].end, date(2024, 2, 29));
    }

    #[test]
    fn line_fully_inside_window() {
        let summer = AbstractionPeriod::new(1, 4, 31, 10);
        let line = DateRange::new(date(2020, 5, 1), date(2020, 5, 31));
        assert_eq!(line_overlap(&summer, &line, &unbounded()).fraction(), Fraction::one());
    }

    #[test]
    fn line_straddling_window_start() {
        // 3-16 ~ 4-15: 31 天中 15 天在取水期内
        let summer = AbstractionPeriod::new(1, 4, 31, 10);
        let line = DateRange::new(date(2021, 3, 16), date(2021, 4, 15));
        let overlap = line_overlap(&summer, &line, &unbounded());
        assert_eq!(overlap.days, 15);
        assert_eq!(overlap.line_days, 31);
        assert_eq!(overlap.pieces, vec![DateRange::new(date(2021, 4, 1), date(2021, 4, 15))]);
    }

    #[test]
    fn wrapping_window_counts_both_year_pieces() {
        let winter = AbstractionPeriod::new(1, 11, 28, 2);
        // 2020-04-01 ~ 2021-03-31: 2020-11-01..2021-02-28 共 120 天
        let line = DateRange::new(date(2020, 4, 1), date(2021, 3, 31));
        let overlap = line_overlap(&winter, &line, &unbounded());
        assert_eq!(overlap.days, 120);
        assert_eq!(overlap.line_days, 365);
    }

    #[test]
    fn multi_year_line_never_double_counts() {
        let all_year = AbstractionPeriod::all_year();
        let line = DateRange::new(date(2019, 6, 1), date(2022, 6, 1));
        let overlap = line_overlap(&all_year, &line, &unbounded());
        assert_eq!(overlap.days, overlap.line_days);
        assert_eq!(overlap.pieces.len(), 1);
        assert_eq!(overlap.fraction(), Fraction::one());
    }

    #[test]
    fn single_day_line_is_all_or_nothing() {
        let summer = AbstractionPeriod::new(1, 4, 31, 10);
        let inside = DateRange::new(date(2021, 4, 1), date(2021, 4, 1));
        let outside = DateRange::new(date(2021, 3, 31), date(2021, 3, 31));
        assert_eq!(line_overlap(&summer, &inside, &unbounded()).fraction(), Fraction::one());
        assert!(line_overlap(&summer, &outside, &unbounded()).is_empty());
    }

    #[test]
    fn bounds_clip_the_overlap() {
        let summer = AbstractionPeriod::new(1, 4, 31, 10);
        let line = DateRange::new(date(2021, 4, 1), date(2021, 4, 10));
        let bounds = DateRange::new(date(2021, 4, 6), date(2022, 3, 31));
        assert_eq!(line_overlap(&summer, &line, &bounds).fraction(), Fraction::new(1, 2));
    }

    #[test]
    fn sole_claim_keeps_its_plain_fraction() {
        let period = AbstractionPeriod::new(16, 6, 31, 10);
        let line = DateRange::new(date(2020, 6, 1), date(2020, 6, 30));
        let overlap = line_overlap(&period, &line, &unbounded());
        let shares = share_line(&line, &[(3, overlap)]);
        assert_eq!(shares, vec![(3, Fraction::new(1, 2))]);
    }

    #[test]
    fn identical_claims_split_evenly() {
        let line = DateRange::new(date(2020, 6, 1), date(2020, 6, 30));
        let overlap = line_overlap(&AbstractionPeriod::all_year(), &line, &unbounded());
        let shares = share_line(&line, &[(0, overlap.clone()), (1, overlap)]);
        assert_eq!(shares, vec![(0, Fraction::new(1, 2)), (1, Fraction::new(1, 2))]);
    }

    #[test]
    fn overlapping_claims_split_only_shared_days() {
        // 30 天：e1 占 1~20 日，e2 占 11~25 日，26~30 日无人认领
        let line = DateRange::new(date(2020, 6, 1), date(2020, 6, 30));
        let e1 = line_overlap(&AbstractionPeriod::new(1, 6, 20, 6), &line, &unbounded());
        let e2 = line_overlap(&AbstractionPeriod::new(11, 6, 25, 6), &line, &unbounded());

        let shares = share_line(&line, &[(0, e1), (1, e2)]);
        // e1 = 10 + 10/2 = 15 天，e2 = 10/2 + 5 = 10 天
        assert_eq!(shares, vec![(0, Fraction::new(15, 30)), (1, Fraction::new(10, 30))]);
    }

    #[test]
    fn disjoint_claims_keep_full_days() {
        let line = DateRange::new(date(2020, 6, 1), date(2020, 6, 30));
        let e1 = line_overlap(&AbstractionPeriod::new(1, 6, 10, 6), &line, &unbounded());
        let e2 = line_overlap(&AbstractionPeriod::new(21, 6, 30, 6), &line, &unbounded());
        let shares = share_line(&line, &[(0, e1), (1, e2)]);
        assert_eq!(shares, vec![(0, Fraction::new(1, 3)), (1, Fraction::new(1, 3))]);
    }
}
