//! 活动列表的时间窗口解析。
//!
//! 把 `(year, startMonth, endMonth, groupedByMonth)` 转换为闭区间 `[from, to]`
//! 以及是否按月分组。所有时间按 UTC 计算，与存储约定一致。

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowQuery {
    pub year: Option<i32>,
    pub start_month: Option<u32>,
    pub end_month: Option<u32>,
    pub grouped_by_month: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalWindow {
    pub from: DateTime<Utc>,
    /// 包含在内的最后一毫秒
    pub to: DateTime<Utc>,
    pub is_grouped: bool,
}

impl WindowQuery {
    /// 仅当起止月份都给出时才算提供了月份范围
    fn month_range(&self) -> Result<Option<(u32, u32)>, AppError> {
        match (self.start_month, self.end_month) {
            (Some(start), Some(end)) if end < start => Err(AppError::InvalidRange),
            (Some(start), Some(end)) => Ok(Some((start, end))),
            _ => Ok(None),
        }
    }
}

pub fn resolve(query: &WindowQuery, now: DateTime<Utc>) -> Result<TemporalWindow, AppError> {
    let year = query.year.unwrap_or_else(|| now.year());
    let range = query.month_range()?;

    let grouped_by_default = match range {
        None => true,
        Some((start, end)) => start != end,
    };
    let is_grouped = query.grouped_by_month.unwrap_or(grouped_by_default);

    let (first, last) = range.unwrap_or((1, 12));
    let from = month_start(year, first)?;
    let to = next_month_start(year, last)? - Duration::milliseconds(1);

    Ok(TemporalWindow { from, to, is_grouped })
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, AppError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Validation(format!("Invalid month {} for year {}", month, year)))
}

fn next_month_start(year: i32, month: u32) -> Result<DateTime<Utc>, AppError> {
    if month == 12 {
        month_start(year + 1, 1)
    } else {
        month_start(year, month + 1)
    }
}
