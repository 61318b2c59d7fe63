use bigdecimal::{BigDecimal, Zero};
use std::collections::BTreeMap;

/// 输出保留小数位
pub const QUANTITY_SCALE: i64 = 3;

pub(crate) fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.abs()
}

pub(crate) fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b) * b).abs()
}

/// 精确分数权重 numerator / denominator，分母恒为正
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    /// 约分；分母为 0 时视为 0
    pub fn new(numerator: i64, denominator: i64) -> Self {
        if denominator == 0 || numerator == 0 {
            return Self::zero();
        }
        let sign = if denominator < 0 { -1 } else { 1 };
        let g = gcd(numerator, denominator);
        Self {
            numerator: sign * numerator / g,
            denominator: sign * denominator / g,
        }
    }

    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
        }
    }

    pub fn one() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// 限定到 [0, 1]
    pub fn clamp_unit(self) -> Self {
        if self.numerator <= 0 {
            Self::zero()
        } else if self.numerator >= self.denominator {
            Self::one()
        } else {
            self
        }
    }
}

/// numerator / denominator 精确四舍五入 (half-up，远离零)
///
/// 近似商只用来定位，最终由精确乘法校正，结果与除法精度无关。
pub fn divide_half_up(numerator: &BigDecimal, denominator: &BigDecimal, scale: i64) -> BigDecimal {
    if denominator.is_zero() || numerator.is_zero() {
        return BigDecimal::zero().with_scale(scale);
    }
    let negative = (*numerator < BigDecimal::zero()) != (*denominator < BigDecimal::zero());
    let shift = BigDecimal::new(1.into(), -scale);
    let n = &numerator.abs() * &shift;
    let d = denominator.abs();
    let one = BigDecimal::from(1);

    let mut q = (&n / &d).with_scale(0);
    while &q * &d > n {
        q -= &one;
    }
    while (&q + &one) * &d <= n {
        q += &one;
    }
    let remainder = &n - &q * &d;
    if &remainder * &BigDecimal::from(2) >= d {
        q += &one;
    }

    let (digits, _) = q.with_scale(0).into_bigint_and_exponent();
    let result = BigDecimal::new(digits, scale);
    if negative {
        -result
    } else {
        result
    }
}

/// 四舍五入 (half-up，远离零)
pub fn round_half_up(value: &BigDecimal, scale: i64) -> BigDecimal {
    divide_half_up(value, &BigDecimal::from(1), scale)
}

pub fn decimal_min<'a>(a: &'a BigDecimal, b: &'a BigDecimal) -> &'a BigDecimal {
    if b < a {
        b
    } else {
        a
    }
}

pub fn decimal_max<'a>(a: &'a BigDecimal, b: &'a BigDecimal) -> &'a BigDecimal {
    if b > a {
        b
    } else {
        a
    }
}

/// 精确累加器
///
/// 按分母分组保存分子，只在 `finish` 时做一次除法和舍入，结果与累加顺序无关。
#[derive(Debug, Clone, Default)]
pub struct DecimalAccumulator {
    numerators: BTreeMap<i64, BigDecimal>,
    lines: usize,
}

impl DecimalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// total += quantity × weight
    pub fn add(&mut self, quantity: &BigDecimal, weight: Fraction) {
        if weight.is_zero() || quantity.is_zero() {
            return;
        }
        *self
            .numerators
            .entry(weight.denominator)
            .or_insert_with(BigDecimal::zero) += quantity * &BigDecimal::from(weight.numerator);
        self.lines += 1;
    }

    /// 未舍入的精确总量 (分子, 分母)
    pub fn exact_total(&self) -> (BigDecimal, BigDecimal) {
        let mut denominator: i64 = 1;
        for &den in self.numerators.keys() {
            denominator = match denominator.checked_mul(den / gcd(denominator, den)) {
                Some(common) => common,
                None => return self.cross_multiplied_total(),
            };
        }
        let numerator = self
            .numerators
            .iter()
            .fold(BigDecimal::zero(), |acc, (&den, num)| {
                acc + num * &BigDecimal::from(denominator / den)
            });
        (numerator, BigDecimal::from(denominator))
    }

    /// 公分母溢出 i64 时退回逐项通分
    fn cross_multiplied_total(&self) -> (BigDecimal, BigDecimal) {
        self.numerators.iter().fold(
            (BigDecimal::zero(), BigDecimal::from(1)),
            |(acc_num, acc_den), (&den, num)| {
                let den = BigDecimal::from(den);
                (&acc_num * &den + num * &acc_den, &acc_den * &den)
            },
        )
    }

    /// 实际参与累加的行数
    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn finish(self) -> BigDecimal {
        let (numerator, denominator) = self.exact_total();
        divide_half_up(&numerator, &denominator, QUANTITY_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn rounds_half_up_at_three_places() {
        assert_eq!(round_half_up(&dec("1.2345"), 3), dec("1.235"));
        assert_eq!(round_half_up(&dec("1.2344999"), 3), dec("1.234"));
        assert_eq!(round_half_up(&dec("0.0005"), 3), dec("0.001"));
        assert_eq!(round_half_up(&dec("-1.2345"), 3), dec("-1.235"));
        assert_eq!(round_half_up(&dec("7"), 3).to_string(), "7.000");
    }

    #[test]
    fn non_terminating_weight_hits_exact_half() {
        // 3.0015 × 1/3 = 1.0005，必须进位
        let mut acc = DecimalAccumulator::new();
        acc.add(&dec("3.0015"), Fraction::new(10, 30));
        assert_eq!(acc.finish(), dec("1.001"));

        assert_eq!(divide_half_up(&dec("2"), &dec("3"), 3), dec("0.667"));
        assert_eq!(divide_half_up(&dec("1"), &dec("3"), 3), dec("0.333"));
    }

    #[test]
    fn thirds_sum_back_to_whole() {
        let mut acc = DecimalAccumulator::new();
        for _ in 0..3 {
            acc.add(&dec("0.001"), Fraction::new(1, 3));
        }
        assert_eq!(acc.finish(), dec("0.001"));
    }

    #[test]
    fn sum_is_independent_of_order() {
        let items = vec![
            (dec("0.1"), Fraction::one()),
            (dec("0.2"), Fraction::new(1, 3)),
            (dec("1234.5675"), Fraction::new(1, 2)),
            (dec("0.0001"), Fraction::new(15, 31)),
        ];

        let mut forward = DecimalAccumulator::new();
        for (q, w) in &items {
            forward.add(q, *w);
        }
        let mut backward = DecimalAccumulator::new();
        for (q, w) in items.iter().rev() {
            backward.add(q, *w);
        }

        assert_eq!(forward.exact_total(), backward.exact_total());
        assert_eq!(forward.finish(), backward.finish());
    }

    #[test]
    fn zero_weight_lines_are_not_counted() {
        let mut acc = DecimalAccumulator::new();
        acc.add(&dec("5"), Fraction::zero());
        acc.add(&dec("2.5"), Fraction::new(1, 2));
        assert_eq!(acc.line_count(), 1);
        assert_eq!(acc.finish(), dec("1.25"));
    }

    #[test]
    fn fraction_reduces_and_clamps() {
        assert_eq!(Fraction::new(15, 30), Fraction::new(1, 2));
        assert_eq!(Fraction::new(45, 30).clamp_unit(), Fraction::one());
        assert_eq!(Fraction::new(-1, 30).clamp_unit(), Fraction::zero());
        assert_eq!(Fraction::new(3, -6), Fraction::new(-1, 2));
    }

    #[test]
    fn min_max_compare_by_value() {
        assert_eq!(decimal_min(&dec("0.10"), &dec("0.1")), &dec("0.1"));
        assert_eq!(decimal_max(&dec("2"), &dec("10")), &dec("10"));
    }
}
