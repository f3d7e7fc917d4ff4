use log::debug;

use crate::models::itinerary::TripPlan;

pub const DEFAULT_MAX_ACTIVITIES_PER_DAY: usize = 8;

/// Transit-only rows the model inserts between real places. Matched as a prefix
/// ("Di chuyển đến chợ").
const TRANSIT_PREFIXES: &[&str] = &["di chuyển", "di chuyen", "đi lại"];

/// English transit words double as venue names ("Transit Café"), so they only match
/// bare, before a colon, or as "<term> to ...".
const TRANSIT_TERMS: &[&str] = &["travel", "transit", "transfer", "commute"];

fn normalize_place(place: &str) -> String {
    place
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True for empty names and for transit rows such as "Di chuyển", "Di chuyển đến chợ",
/// "Transfer: airport" or "Travel to Hội An".
pub fn is_placeholder(place: &str) -> bool {
    let normalized = normalize_place(place);
    if normalized.is_empty() {
        return true;
    }

    let prefixed = TRANSIT_PREFIXES.iter().any(|term| {
        normalized
            .strip_prefix(term)
            .is_some_and(|rest| rest.chars().next().map_or(true, |c| !c.is_alphanumeric()))
    });

    prefixed
        || TRANSIT_TERMS.iter().any(|term| {
            normalized.strip_prefix(term).is_some_and(|rest| {
                rest.is_empty()
                    || rest.starts_with(':')
                    || rest == " to"
                    || rest.starts_with(" to ")
            })
        })
}

/// Drop placeholder activities, keeping the order of the rest. Idempotent.
pub fn remove_placeholders(plan: &mut TripPlan) -> usize {
    let mut removed = 0;
    for day in &mut plan.days {
        let before = day.activities.len();
        day.activities.retain(|activity| !is_placeholder(&activity.place));
        removed += before - day.activities.len();
    }
    if removed > 0 {
        debug!("Removed {} placeholder activities", removed);
    }
    removed
}

/// Keep only the first `max_per_day` activities of every day. Idempotent.
pub fn cap_activities(plan: &mut TripPlan, max_per_day: usize) -> usize {
    let mut dropped = 0;
    for day in &mut plan.days {
        if day.activities.len() > max_per_day {
            dropped += day.activities.len() - max_per_day;
            day.activities.truncate(max_per_day);
        }
    }
    if dropped > 0 {
        debug!("Capped itinerary at {} activities per day, dropped {}", max_per_day, dropped);
    }
    dropped
}

/// Make `DayPlan::day` equal to the 1-based position of the day.
pub fn renumber_days(plan: &mut TripPlan) {
    for (index, day) in plan.days.iter_mut().enumerate() {
        day.day = u32::try_from(index + 1).unwrap_or(u32::MAX);
    }
}
