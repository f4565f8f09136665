//! Study-habit analysis helpers.

use std::collections::BTreeMap;

use serde_json::Value;

/// Shift quiz difficulty based on the previous score percentage: 90+ steps
/// up (capped at 5), 70+ holds, anything lower steps down (floored at 1).
pub fn adjust_quiz_difficulty(previous_performance: f64, current_difficulty: u8) -> u8 {
    if previous_performance >= 90.0 {
        (current_difficulty + 1).min(5)
    } else if previous_performance >= 70.0 {
        current_difficulty
    } else {
        current_difficulty.saturating_sub(1).max(1)
    }
}

/// Render the per-topic minutes line for the analysis prompt. `BTreeMap`
/// keeps the rendering deterministic for a given input.
pub fn render_study_stats(
    topic_minutes: &BTreeMap<String, u32>,
    quiz_scores: &[u32],
    mastery_fraction: f64,
) -> String {
    let topics_data = topic_minutes
        .iter()
        .map(|(topic, minutes)| format!("{}: {} minutes", topic, minutes))
        .collect::<Vec<_>>()
        .join(", ");

    let avg_quiz_score = if quiz_scores.is_empty() {
        0.0
    } else {
        quiz_scores.iter().map(|s| f64::from(*s)).sum::<f64>() / quiz_scores.len() as f64
    };

    format!(
        "Time spent on topics: {}\nAverage quiz score: {:.1}%\nFlashcard mastery: {:.1}%",
        topics_data,
        avg_quiz_score,
        mastery_fraction * 100.0
    )
}

/// Pull the recommendation list out of a parsed analysis payload.
///
/// Accepts a top-level array, a `recommendations` key, or the first array
/// value found in the object.
pub fn extract_recommendations(payload: &Value) -> Option<Vec<String>> {
    if let Some(list) = payload.as_array() {
        return collect_strings(list);
    }
    if let Some(list) = payload.get("recommendations").and_then(Value::as_array) {
        return collect_strings(list);
    }
    if let Some(object) = payload.as_object() {
        for value in object.values() {
            if let Some(list) = value.as_array() {
                return collect_strings(list);
            }
        }
    }
    None
}

fn collect_strings(list: &[Value]) -> Option<Vec<String>> {
    let strings: Vec<String> = list
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect();
    if strings.is_empty() {
        None
    } else {
        Some(strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn difficulty_steps_up_at_ninety() {
        assert_eq!(adjust_quiz_difficulty(90.0, 3), 4);
        assert_eq!(adjust_quiz_difficulty(95.0, 5), 5);
    }

    #[test]
    fn difficulty_holds_between_seventy_and_ninety() {
        assert_eq!(adjust_quiz_difficulty(70.0, 3), 3);
        assert_eq!(adjust_quiz_difficulty(89.9, 2), 2);
    }

    #[test]
    fn difficulty_steps_down_below_seventy() {
        assert_eq!(adjust_quiz_difficulty(69.9, 3), 2);
        assert_eq!(adjust_quiz_difficulty(0.0, 1), 1);
    }

    #[test]
    fn stats_render_deterministically() {
        let mut minutes = BTreeMap::new();
        minutes.insert("algebra".to_string(), 120);
        minutes.insert("biology".to_string(), 45);
        let stats = render_study_stats(&minutes, &[80, 90], 0.5);
        assert!(stats.contains("algebra: 120 minutes, biology: 45 minutes"));
        assert!(stats.contains("Average quiz score: 85.0%"));
        assert!(stats.contains("Flashcard mastery: 50.0%"));
    }

    #[test]
    fn stats_with_no_scores_average_zero() {
        let stats = render_study_stats(&BTreeMap::new(), &[], 0.0);
        assert!(stats.contains("Average quiz score: 0.0%"));
    }

    #[test]
    fn recommendations_under_key() {
        let payload = json!({"recommendations": ["study more", "sleep well"]});
        assert_eq!(
            extract_recommendations(&payload).unwrap(),
            vec!["study more", "sleep well"]
        );
    }

    #[test]
    fn recommendations_from_sole_array_value() {
        let payload = json!({"tips": ["take breaks"]});
        assert_eq!(extract_recommendations(&payload).unwrap(), vec!["take breaks"]);
    }

    #[test]
    fn recommendations_from_top_level_array() {
        let payload = json!(["one", "two"]);
        assert_eq!(extract_recommendations(&payload).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn no_recommendations_found() {
        assert!(extract_recommendations(&json!({"score": 10})).is_none());
        assert!(extract_recommendations(&json!({"items": [1, 2]})).is_none());
    }
}
