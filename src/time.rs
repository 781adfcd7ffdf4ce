//! 精确的有理数时间表示。
//!
//! 所有时间解析都在有理数域内进行：帧率是 30000/1001 这样的分数时，
//! 浮点会在显著时间点比较上产生毫秒级误差，而有理数加减和比较都是
//! 精确的。两个时间点相等当且仅当其有理数值相等，没有容差。

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use num_rational::Rational64;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// 相对文档时间轴零点的时间偏移，单位为秒。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TimeOffset(Rational64);

impl TimeOffset {
    /// 时间轴零点。
    pub const ZERO: Self = Self(Rational64::new_raw(0, 1));

    /// 以分数形式（`numer / denom` 秒）创建时间偏移。
    ///
    /// # Panics
    ///
    /// `denom` 为零时 panic。
    #[must_use]
    pub fn new(numer: i64, denom: i64) -> Self {
        Self(Rational64::new(numer, denom))
    }

    /// 以整数秒创建时间偏移。
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        Self(Rational64::from_integer(seconds))
    }

    /// 以整数毫秒创建时间偏移。
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(Rational64::new(millis, 1000))
    }

    /// 以帧号和分数帧率（`rate_numer / rate_denom` 帧每秒）创建时间偏移。
    ///
    /// # Panics
    ///
    /// `rate_numer` 为零时 panic。
    #[must_use]
    pub fn from_frames(frames: i64, rate_numer: i64, rate_denom: i64) -> Self {
        Self(Rational64::new(frames * rate_denom, rate_numer))
    }

    /// 转换为浮点秒数。仅用于展示和写出，内部比较永远用有理数值。
    #[must_use]
    pub fn as_seconds_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl Add for TimeOffset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for TimeOffset {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for TimeOffset {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_seconds_f64())
    }
}

/// 半开时间区间 `[begin, end)`。`end` 为 `None` 表示开放区间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    /// 区间起点（包含）。
    pub begin: TimeOffset,
    /// 区间终点（不包含）。`None` 表示延伸到时间轴末尾。
    pub end: Option<TimeOffset>,
}

impl TimeInterval {
    /// 创建区间。
    #[must_use]
    pub const fn new(begin: TimeOffset, end: Option<TimeOffset>) -> Self {
        Self { begin, end }
    }

    /// 时间点是否落在区间内。起点包含，终点不包含。
    #[must_use]
    pub fn contains(&self, offset: TimeOffset) -> bool {
        offset >= self.begin && self.end.is_none_or(|end| offset < end)
    }

    /// 区间是否为空（终点不晚于起点）。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end.is_some_and(|end| end <= self.begin)
    }

    /// 求两个区间的交集。交集为空时返回 `None`。
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let begin = self.begin.max(other.begin);
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        };
        let result = Self::new(begin, end);
        if result.is_empty() { None } else { Some(result) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_addition_is_exact() {
        let third = TimeOffset::new(1, 3);
        assert_eq!(third + third + third, TimeOffset::from_seconds(1));
    }

    #[test]
    fn test_ntsc_frame_times_are_exact() {
        // 30000/1001 帧率下第 30000 帧恰好是 1001 秒
        let t = TimeOffset::from_frames(30000, 30000, 1001);
        assert_eq!(t, TimeOffset::from_seconds(1001));
        assert_ne!(
            TimeOffset::from_frames(1, 30000, 1001),
            TimeOffset::from_millis(33)
        );
    }

    #[test]
    fn test_interval_is_half_open() {
        let interval = TimeInterval::new(
            TimeOffset::from_seconds(1),
            Some(TimeOffset::from_seconds(4)),
        );
        assert!(interval.contains(TimeOffset::from_seconds(1)));
        assert!(interval.contains(TimeOffset::from_millis(3999)));
        assert!(!interval.contains(TimeOffset::from_seconds(4)));
        assert!(!interval.contains(TimeOffset::ZERO));
    }

    #[test]
    fn test_open_interval_contains_everything_after_begin() {
        let interval = TimeInterval::new(TimeOffset::from_seconds(2), None);
        assert!(interval.contains(TimeOffset::from_seconds(1_000_000)));
        assert!(!interval.contains(TimeOffset::ZERO));
        assert!(!interval.is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = TimeInterval::new(
            TimeOffset::from_seconds(0),
            Some(TimeOffset::from_seconds(5)),
        );
        let b = TimeInterval::new(TimeOffset::from_seconds(3), None);
        assert_eq!(
            a.intersect(&b),
            Some(TimeInterval::new(
                TimeOffset::from_seconds(3),
                Some(TimeOffset::from_seconds(5)),
            ))
        );

        let c = TimeInterval::new(TimeOffset::from_seconds(5), None);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_empty_interval() {
        let backwards = TimeInterval::new(
            TimeOffset::from_seconds(4),
            Some(TimeOffset::from_seconds(1)),
        );
        assert!(backwards.is_empty());
        let degenerate = TimeInterval::new(
            TimeOffset::from_seconds(4),
            Some(TimeOffset::from_seconds(4)),
        );
        assert!(degenerate.is_empty());
    }
}
