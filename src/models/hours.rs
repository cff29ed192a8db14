use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Canonical day order used for storage, serialization and display.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Accepts full or abbreviated names in any case ("Monday", "mon", "MON").
pub fn parse_day(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

// ── Time of day ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay {
        hours: 0,
        minutes: 0,
    };

    pub fn new(hours: u8, minutes: u8) -> Option<Self> {
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self { hours, minutes })
    }

    /// Strict "HH:MM" parse. A trailing ":SS" is tolerated and dropped.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(':');
        let hours = digits(parts.next()?)?;
        let minutes = digits(parts.next()?)?;
        if let Some(seconds) = parts.next() {
            if digits(seconds)? > 59 {
                return None;
            }
        }
        if parts.next().is_some() {
            return None;
        }
        Self::new(hours, minutes)
    }

    /// Never fails: null, empty or malformed input becomes 00:00.
    pub fn parse_lenient(s: Option<&str>) -> Self {
        s.and_then(Self::parse).unwrap_or(Self::MIDNIGHT)
    }

    pub fn minutes_since_midnight(self) -> u16 {
        u16::from(self.hours) * 60 + u16::from(self.minutes)
    }

    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            hours: dt.hour() as u8,
            minutes: dt.minute() as u8,
        }
    }
}

/// Minutes-since-midnight bounds of `from..till`. A `till` of 00:00 means the
/// end of the day unless `from` is also 00:00, so "18:00-00:00" closes at
/// midnight while "00:00-00:00" stays empty.
fn span(from: TimeOfDay, till: TimeOfDay) -> (u16, u16) {
    let start = from.minutes_since_midnight();
    let end = if till == TimeOfDay::MIDNIGHT && from != TimeOfDay::MIDNIGHT {
        24 * 60
    } else {
        till.minutes_since_midnight()
    };
    (start, end)
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

fn digits(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ── In-memory schedule ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakInterval {
    pub from_hours: u8,
    pub from_minutes: u8,
    pub till_hours: u8,
    pub till_minutes: u8,
}

impl BreakInterval {
    pub fn new(from: TimeOfDay, till: TimeOfDay) -> Self {
        Self {
            from_hours: from.hours,
            from_minutes: from.minutes,
            till_hours: till.hours,
            till_minutes: till.minutes,
        }
    }

    pub fn from(&self) -> TimeOfDay {
        TimeOfDay {
            hours: self.from_hours,
            minutes: self.from_minutes,
        }
    }

    pub fn till(&self) -> TimeOfDay {
        TimeOfDay {
            hours: self.till_hours,
            minutes: self.till_minutes,
        }
    }

    fn span(&self) -> (u16, u16) {
        span(self.from(), self.till())
    }

    fn contains(&self, t: TimeOfDay) -> bool {
        let (start, end) = self.span();
        let t = t.minutes_since_midnight();
        start <= t && t < end
    }
}

/// One day's hours. `Default` is a closed day with every field zeroed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    pub is_open: bool,
    pub from_hours: u8,
    pub from_minutes: u8,
    pub till_hours: u8,
    pub till_minutes: u8,
    pub breaks: Vec<BreakInterval>,
}

impl DaySchedule {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn open(from: TimeOfDay, till: TimeOfDay) -> Self {
        Self {
            is_open: true,
            from_hours: from.hours,
            from_minutes: from.minutes,
            till_hours: till.hours,
            till_minutes: till.minutes,
            breaks: Vec::new(),
        }
    }

    pub fn with_break(mut self, from: TimeOfDay, till: TimeOfDay) -> Self {
        self.breaks.push(BreakInterval::new(from, till));
        self
    }

    pub fn opens(&self) -> TimeOfDay {
        TimeOfDay {
            hours: self.from_hours,
            minutes: self.from_minutes,
        }
    }

    pub fn closes(&self) -> TimeOfDay {
        TimeOfDay {
            hours: self.till_hours,
            minutes: self.till_minutes,
        }
    }

    fn span(&self) -> (u16, u16) {
        span(self.opens(), self.closes())
    }

    pub fn is_open_at(&self, t: TimeOfDay) -> bool {
        let (opens, closes) = self.span();
        let minute = t.minutes_since_midnight();
        self.is_open
            && opens <= minute
            && minute < closes
            && !self.breaks.iter().any(|b| b.contains(t))
    }

    fn from_record(record: &DayRecord) -> Self {
        if record.is_closed {
            return Self::closed();
        }
        let mut day = Self::open(
            TimeOfDay::parse_lenient(record.opening_time.as_deref()),
            TimeOfDay::parse_lenient(record.closing_time.as_deref()),
        );
        day.breaks = record
            .break_times
            .iter()
            .map(|b| {
                BreakInterval::new(
                    TimeOfDay::parse_lenient(b.start_time.as_deref()),
                    TimeOfDay::parse_lenient(b.end_time.as_deref()),
                )
            })
            .collect();
        day
    }

    fn to_record(&self, day: Weekday) -> DayRecord {
        if !self.is_open {
            return DayRecord {
                id: None,
                day: day_name(day).to_string(),
                is_closed: true,
                opening_time: None,
                closing_time: None,
                break_times: Vec::new(),
            };
        }
        DayRecord {
            id: None,
            day: day_name(day).to_string(),
            is_closed: false,
            opening_time: Some(self.opens().to_string()),
            closing_time: Some(self.closes().to_string()),
            break_times: self
                .breaks
                .iter()
                .map(|b| BreakRecord {
                    start_time: Some(b.from().to_string()),
                    end_time: Some(b.till().to_string()),
                })
                .collect(),
        }
    }

    fn validate(&self, day: Weekday) -> Result<(), ScheduleError> {
        if !self.is_open {
            return Ok(());
        }
        let name = day_name(day);
        let (opens, closes) = self.span();
        if opens >= closes {
            return Err(ScheduleError::EmptyRange {
                day: name,
                from: self.opens(),
                till: self.closes(),
            });
        }

        let mut breaks = self.breaks.clone();
        breaks.sort_by_key(|b| b.from());
        for b in &breaks {
            let (start, end) = b.span();
            if start >= end {
                return Err(ScheduleError::EmptyBreak {
                    day: name,
                    from: b.from(),
                    till: b.till(),
                });
            }
            if start < opens || end > closes {
                return Err(ScheduleError::BreakOutsideHours {
                    day: name,
                    from: b.from(),
                    till: b.till(),
                });
            }
        }
        for pair in breaks.windows(2) {
            if pair[0].span().1 > pair[1].span().0 {
                return Err(ScheduleError::OverlappingBreaks { day: name });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{day}: opening time {from} must be before closing time {till}")]
    EmptyRange {
        day: &'static str,
        from: TimeOfDay,
        till: TimeOfDay,
    },

    #[error("{day}: break {from}-{till} must start before it ends")]
    EmptyBreak {
        day: &'static str,
        from: TimeOfDay,
        till: TimeOfDay,
    },

    #[error("{day}: break {from}-{till} falls outside opening hours")]
    BreakOutsideHours {
        day: &'static str,
        from: TimeOfDay,
        till: TimeOfDay,
    },

    #[error("{day}: breaks overlap")]
    OverlappingBreaks { day: &'static str },
}

/// All seven days, indexed Monday first. A missing day cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [DaySchedule; 7],
}

impl WeekSchedule {
    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day_index(day)]
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut DaySchedule {
        &mut self.days[day_index(day)]
    }

    pub fn set_day(&mut self, day: Weekday, schedule: DaySchedule) {
        self.days[day_index(day)] = schedule;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        WEEK.iter().copied().zip(self.days.iter())
    }

    /// Apply one day's hours to other days, as the editor's "copy to" action does.
    pub fn copy_day(&mut self, source: Weekday, targets: &[Weekday]) {
        let template = self.day(source).clone();
        for &target in targets {
            if target != source {
                self.set_day(target, template.clone());
            }
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        self.iter().try_for_each(|(day, schedule)| schedule.validate(day))
    }

    pub fn is_open_at(&self, dt: &NaiveDateTime) -> bool {
        self.day(dt.weekday())
            .is_open_at(TimeOfDay::from_datetime(dt))
    }

    pub fn summary(&self) -> String {
        self.iter()
            .map(|(day, s)| {
                if !s.is_open {
                    return format!("{day}: closed");
                }
                let mut line = format!("{day}: {}-{}", s.opens(), s.closes());
                if !s.breaks.is_empty() {
                    let breaks = s
                        .breaks
                        .iter()
                        .map(|b| format!("{}-{}", b.from(), b.till()))
                        .collect::<Vec<_>>()
                        .join(", ");
                    line.push_str(&format!(" (breaks {breaks})"));
                }
                line
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ── API wire shape ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRecord {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub day: String,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
    #[serde(default)]
    pub break_times: Vec<BreakRecord>,
}

/// Build a full week from a sparse, possibly duplicated list of day records.
///
/// Days absent from `records` stay closed. When a day appears more than once
/// the record with the highest `id` is used; records without an id lose to any
/// record with one, and ties go to the later record.
pub fn parse_week(records: &[DayRecord]) -> WeekSchedule {
    let mut chosen: [Option<&DayRecord>; 7] = [None; 7];

    for record in records {
        let Some(day) = parse_day(&record.day) else {
            tracing::warn!(day = %record.day, "skipping hours record with unknown day name");
            continue;
        };
        let slot = &mut chosen[day_index(day)];
        match *slot {
            Some(current) if current.id > record.id => {}
            _ => *slot = Some(record),
        }
    }

    let mut week = WeekSchedule::default();
    for (day, record) in WEEK.iter().zip(chosen) {
        if let Some(record) = record {
            week.set_day(*day, DaySchedule::from_record(record));
        }
    }
    week
}

/// One record per day, Monday first. Closed days carry null times.
pub fn serialize_week(week: &WeekSchedule) -> Vec<DayRecord> {
    week.iter()
        .map(|(day, schedule)| schedule.to_record(day))
        .collect()
}
