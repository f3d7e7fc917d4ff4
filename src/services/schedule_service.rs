//! Deterministic time normalization for generated itineraries.
//!
//! Activities keep their list order. Each one is floored to a minimum duration and
//! pushed later (never earlier) so that a travel buffer separates it from the
//! previous activity. No travel-time API is consulted; the buffer depends only on
//! the travel mode.

use crate::models::itinerary::TripPlan;

pub const MIN_ACTIVITY_MINUTES: u32 = 30;
pub const DEFAULT_BUFFER_MINUTES: u32 = 20;
/// 23:59, the latest time a rewritten range may reach.
const LAST_MINUTE_OF_DAY: u32 = 23 * 60 + 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Walking,
    Cycling,
    Motorbike,
    Car,
    PublicTransit,
}

impl TravelMode {
    /// Recognize a free-text travel mode in Vietnamese (with or without diacritics) or English.
    pub fn from_label(label: &str) -> Option<Self> {
        let mode = label.trim().to_lowercase();
        if mode.is_empty() {
            return None;
        }

        let has = |keys: &[&str]| keys.iter().any(|k| mode.contains(k));

        // motorbike before cycling: "motorbike" contains "bike"
        if has(&["đi bộ", "di bo", "walk", "on foot"]) {
            Some(TravelMode::Walking)
        } else if has(&["xe máy", "xe may", "motorbike", "motorcycle", "scooter"]) {
            Some(TravelMode::Motorbike)
        } else if has(&["xe đạp", "xe dap", "bicycle", "cycling", "bike"]) {
            Some(TravelMode::Cycling)
        } else if has(&["ô tô", "oto", "o to", "car", "taxi", "drive", "driving"]) {
            Some(TravelMode::Car)
        } else if has(&["công cộng", "cong cong", "public", "transit", "bus", "metro", "train"]) {
            Some(TravelMode::PublicTransit)
        } else {
            None
        }
    }

    pub fn buffer_minutes(&self) -> u32 {
        match self {
            TravelMode::Walking => 15,
            TravelMode::Cycling => 20,
            TravelMode::Motorbike => 25,
            TravelMode::Car => 30,
            TravelMode::PublicTransit => 30,
        }
    }
}

/// Buffer for an optional free-text travel mode, 20 minutes when unknown.
pub fn buffer_minutes_for(travel_mode: Option<&str>) -> u32 {
    travel_mode
        .and_then(TravelMode::from_label)
        .map_or(DEFAULT_BUFFER_MINUTES, |mode| mode.buffer_minutes())
}

/// A parsed "HH:MM - HH:MM" range in minutes since midnight, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: u32,
    pub end: u32,
}

impl TimeRange {
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }
}

fn parse_hhmm(text: &str) -> Option<u32> {
    let (hh, mm) = text.trim().split_once(':')?;
    let h: u32 = hh.trim().parse().ok()?;
    let m: u32 = mm.trim().parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

/// Parse "08:00 - 10:00", "08:00-10:00" or en/em-dash variants. Reversed ranges are swapped.
pub fn parse_time_range(text: &str) -> Option<TimeRange> {
    let normalized = text.trim().replace(['–', '—'], "-");
    let mut parts = normalized.split('-').map(str::trim).filter(|p| !p.is_empty());

    let start = parse_hhmm(parts.next()?)?;
    let end = parse_hhmm(parts.next()?)?;

    Some(if end < start {
        TimeRange { start: end, end: start }
    } else {
        TimeRange { start, end }
    })
}

pub fn format_time_range(start: u32, end: u32) -> String {
    format!(
        "{:02}:{:02} - {:02}:{:02}",
        start / 60,
        start % 60,
        end / 60,
        end % 60
    )
}

/// Rewrite every parseable activity time so consecutive activities are separated by
/// the travel-mode buffer and last at least [`MIN_ACTIVITY_MINUTES`].
///
/// `active_start` floors the first activity of each day; `active_end` soft-caps end
/// times without redistributing earlier activities, which can leave a zero-length
/// final activity on overfull days. Hours outside 0..=23 are ignored. Ranges never run
/// past 23:59, so every rewritten time stays parseable.
pub fn apply_buffers(
    plan: &mut TripPlan,
    active_start: Option<u8>,
    active_end: Option<u8>,
    travel_mode: Option<&str>,
) {
    let buffer = buffer_minutes_for(travel_mode);
    let start_floor = active_start.filter(|h| *h <= 23).map(|h| u32::from(h) * 60);
    let end_cap = active_end.filter(|h| *h <= 23).map(|h| u32::from(h) * 60);

    for day in &mut plan.days {
        let mut current_end: Option<u32> = None;

        for activity in &mut day.activities {
            let Some(range) = parse_time_range(&activity.time) else {
                continue;
            };

            let duration = range.duration().max(MIN_ACTIVITY_MINUTES);

            let mut start = match current_end {
                None => start_floor.map_or(range.start, |floor| range.start.max(floor)),
                Some(prev_end) => range.start.max(prev_end + buffer),
            };
            let mut end = (start + duration).min(LAST_MINUTE_OF_DAY);
            if let Some(cap) = end_cap {
                end = end.min(cap);
            }
            start = start.min(end);

            activity.time = format_time_range(start, end);
            current_end = Some(end);
        }
    }
}
