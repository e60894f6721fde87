//! 日期工具
//!
//! 表单校验只关心年份：建造年份必须落在 `[1900, 当前年份]`。

use chrono::{Datelike, Utc};
use std::ops::RangeInclusive;

pub const MIN_CONSTRUCTION_YEAR: i32 = 1900;

/// 当前公历年份（UTC）
#[inline]
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// 给定当前年份时允许的建造年份区间
#[inline]
pub fn construction_years(current_year: i32) -> RangeInclusive<i32> {
    MIN_CONSTRUCTION_YEAR..=current_year
}
