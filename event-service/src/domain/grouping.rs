use chrono::{Datelike, Month};
use indexmap::IndexMap;

use crate::domain::models::event::Event;

/// 日历月份键，与展示用的月份名称分开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(event: &Event) -> Self {
        Self {
            year: event.datetime.year(),
            month: event.datetime.month(),
        }
    }

    /// 英文月份全称，如 "January"
    pub fn label(&self) -> String {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| self.month.to_string())
    }
}

/// 按月份分桶。输入须按时间升序；桶内保持输入顺序，桶按首次出现的顺序排列。
pub fn group_by_month(events: Vec<Event>) -> IndexMap<String, Vec<Event>> {
    let mut buckets: IndexMap<MonthKey, Vec<Event>> = IndexMap::new();
    for event in events {
        buckets.entry(MonthKey::of(&event)).or_default().push(event);
    }

    let mut grouped: IndexMap<String, Vec<Event>> = IndexMap::with_capacity(buckets.len());
    for (key, bucket) in buckets {
        grouped.entry(key.label()).or_default().extend(bucket);
    }

    grouped
}
