//! Pulls the single JSON object out of a free-text model response.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::PlanError;
use crate::models::itinerary::TripPlan;

// Opening fence up to and including the first brace of its body.
static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?\s*\{").expect("valid json fence regex"));

/// Locate and parse the JSON object in `raw`.
///
/// A fenced code block wins over a bare `{...}` span. Exactly one parse attempt is made;
/// no repair of truncated or trailing-comma JSON is tried.
///
/// # Errors
///
/// - [`PlanError::MalformedResponse`] when no object-like span exists.
/// - [`PlanError::JsonDecode`] when the span is found but is not valid JSON.
pub fn extract_json(raw: &str) -> Result<Value, PlanError> {
    let span = find_object_span(raw).ok_or_else(|| PlanError::MalformedResponse {
        raw: raw.to_string(),
    })?;

    serde_json::from_str(span).map_err(|source| PlanError::JsonDecode {
        source,
        raw: raw.to_string(),
    })
}

/// [`extract_json`] followed by decoding into a [`TripPlan`].
pub fn parse_trip_plan(raw: &str) -> Result<TripPlan, PlanError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|source| PlanError::JsonDecode {
        source,
        raw: raw.to_string(),
    })
}

fn find_object_span(text: &str) -> Option<&str> {
    // The fence body is scanned like bare text so braces and fences inside strings
    // cannot end the object early.
    if let Some(open) = FENCE_OPEN_RE.find(text) {
        if let Some(span) = bare_object_span(&text[open.end() - 1..]) {
            return Some(span);
        }
    }
    bare_object_span(text)
}

// First balanced `{...}` span, string-aware. An unbalanced span still counts as a
// match when some `}` follows the opening brace, so truncated output surfaces as a
// decode error rather than "no JSON".
fn bare_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let tail = &text[start..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in tail.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&tail[..=offset]);
                }
            }
            _ => {}
        }
    }

    tail.rfind('}').map(|end| &tail[..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::{Activity, DayPlan};
    use crate::models::place::{PlaceReview, ResolvedPlace};
    use serde_json::json;

    #[test]
    fn test_fenced_block_with_prose() {
        let raw = "Đây là kế hoạch của bạn:\n```json\n{\"trip_name\": \"Hà Nội\", \"days\": []}\n```\nChúc vui!";
        let value = extract_json(raw).unwrap();
        assert_eq!(value, json!({"trip_name": "Hà Nội", "days": []}));
    }

    #[test]
    fn test_bare_object_with_nested_braces() {
        let raw = "Sure! {\"a\": {\"b\": \"}\"}, \"c\": [1, {\"d\": 2}]} Hope this helps.";
        let value = extract_json(raw).unwrap();
        assert_eq!(value, json!({"a": {"b": "}"}, "c": [1, {"d": 2}]}));
    }

    #[test]
    fn test_fenced_plan_survives_round_trip() {
        let mut lake = Activity::new("08:00 - 10:00", "Hồ Xuân Hương");
        lake.description = "Mở cửa } ``` sớm".to_string();
        lake.estimated_cost = "50000".to_string();
        lake.place_details = Some(ResolvedPlace {
            name: "Hồ Xuân Hương".to_string(),
            address: "Phường 1, Đà Lạt".to_string(),
            lat: 11.9419,
            lng: 108.4442,
            rating: 4.6,
            total_ratings: 1200,
            types: vec!["tourist_attraction".to_string()],
            opening_hours: vec!["Thứ Hai: Mở cửa cả ngày".to_string()],
            reviews: vec![PlaceReview {
                author: "An".to_string(),
                rating: 5.0,
                text: "Đẹp {nhất} buổi sáng".to_string(),
                time: "1 tuần trước".to_string(),
            }],
            ..Default::default()
        });
        let plan = TripPlan {
            trip_name: "Đà Lạt".to_string(),
            overview: "Hai ngày \"phố núi\"".to_string(),
            total_estimated_cost: "3500000".to_string(),
            days: vec![
                DayPlan { day: 1, title: "Ngày 1".to_string(), activities: vec![lake] },
                DayPlan {
                    day: 2,
                    title: "Ngày 2".to_string(),
                    activities: vec![Activity::new("09:00 - 10:00", "Chợ Đà Lạt")],
                },
            ],
            packing_list: vec!["Áo khoác".to_string()],
            travel_tips: vec!["Mang theo ô".to_string()],
            ..Default::default()
        };

        let raw = format!(
            "Đây là kế hoạch:\n```json\n{}\n```\nChúc vui!",
            serde_json::to_string_pretty(&plan).unwrap()
        );

        assert_eq!(parse_trip_plan(&raw).unwrap(), plan);
    }

    #[test]
    fn test_fenced_form_preferred_over_bare() {
        let raw = "Template: {\"placeholder\": true}\n```json\n{\"real\": 1}\n```";
        assert_eq!(extract_json(raw).unwrap(), json!({"real": 1}));
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"x\": 1}\n```";
        assert_eq!(extract_json(raw).unwrap(), json!({"x": 1}));
    }

    #[test]
    fn test_no_object_is_malformed() {
        let err = extract_json("Xin lỗi, tôi không thể giúp.").unwrap_err();
        assert!(matches!(err, PlanError::MalformedResponse { .. }));

        let err = extract_json("{ never closed").unwrap_err();
        assert!(matches!(err, PlanError::MalformedResponse { .. }));
    }

    #[test]
    fn test_broken_json_is_decode_error() {
        let err = extract_json("```json\n{\"a\": 1,}\n```").unwrap_err();
        assert!(matches!(err, PlanError::JsonDecode { .. }));

        // truncated mid-object
        let err = extract_json("{\"days\": [{\"day\": 1}").unwrap_err();
        assert!(matches!(err, PlanError::JsonDecode { .. }));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let err = parse_trip_plan("{\"days\": \"none\"}").unwrap_err();
        assert!(matches!(err, PlanError::JsonDecode { .. }));
    }
}
