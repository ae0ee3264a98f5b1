//! Activity type detection
//!
//! Classifies a parsed file from the sport / sub-sport of its first session,
//! falling back to the sports list when the session carries no sport.

use crate::schema::{text, ParsedFile};
use crate::types::ActivityType;
use tracing::debug;

/// Detector for the activity type of a parsed file
pub struct ActivityDetector;

impl ActivityDetector {
    /// Detect the activity type. Absent fields are treated as empty strings.
    pub fn detect(file: &ParsedFile) -> ActivityType {
        let session = file.first_of(&["sessions", "session"]);
        let mut sport = text(session.and_then(|s| s.get("sport"))).to_lowercase();
        let mut sub_sport = text(session.and_then(|s| s.get("sub_sport"))).to_lowercase();

        if sport.is_empty() {
            if let Some(entry) = file.first_of(&["sports", "sport"]) {
                sport = text(entry.get("sport")).to_lowercase();
                sub_sport = text(entry.get("sub_sport")).to_lowercase();
            }
        }

        let activity = Self::classify(&sport, &sub_sport);
        debug!(%sport, %sub_sport, %activity, "activity detection");
        activity
    }

    /// Classify lower-cased sport and sub-sport strings
    pub fn classify(sport: &str, sub_sport: &str) -> ActivityType {
        if matches!(sport, "running" | "run") || sub_sport.contains("running") {
            return ActivityType::Running;
        }

        if matches!(sport, "cycling" | "bike" | "biking")
            || sub_sport.contains("cycling")
            || sub_sport.contains("bike")
            || matches!(sub_sport, "road" | "indoor_cycling")
        {
            return ActivityType::Cycling;
        }

        if matches!(sport, "swimming" | "swim") || sub_sport.contains("swimming") {
            return ActivityType::Swimming;
        }

        if matches!(sport, "walking" | "walk") || sub_sport.contains("walking") {
            return ActivityType::Walking;
        }

        ActivityType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(json: &str) -> ActivityType {
        ActivityDetector::detect(&ParsedFile::from_json(json).unwrap())
    }

    #[test]
    fn test_session_sport_is_case_insensitive() {
        let activity = detect(r#"{"sessions": [{"sport": "Running", "sub_sport": ""}]}"#);
        assert_eq!(activity, ActivityType::Running);
    }

    #[test]
    fn test_sub_sport_indoor_cycling() {
        let activity = detect(r#"{"sessions": [{"sport": "", "sub_sport": "indoor_cycling"}]}"#);
        assert_eq!(activity, ActivityType::Cycling);
    }

    #[test]
    fn test_empty_session_is_unknown() {
        assert_eq!(
            detect(r#"{"sessions": [{"sport": "", "sub_sport": ""}]}"#),
            ActivityType::Unknown
        );
        assert_eq!(detect("{}"), ActivityType::Unknown);
    }

    #[test]
    fn test_sports_list_fallback() {
        let activity = detect(
            r#"{
                "sessions": [{"total_distance": 1500.0}],
                "sports": [{"sport": "swimming", "sub_sport": "lap_swimming"}]
            }"#,
        );
        assert_eq!(activity, ActivityType::Swimming);
    }

    #[test]
    fn test_session_sport_wins_over_sports_list() {
        let activity = detect(
            r#"{
                "sessions": [{"sport": "walking"}],
                "sports": [{"sport": "cycling"}]
            }"#,
        );
        assert_eq!(activity, ActivityType::Walking);
    }

    #[test]
    fn test_category_order() {
        assert_eq!(ActivityDetector::classify("bike", "trail_running"), ActivityType::Running);
        assert_eq!(ActivityDetector::classify("", "road"), ActivityType::Cycling);
        assert_eq!(ActivityDetector::classify("", "mountain_bike"), ActivityType::Cycling);
        assert_eq!(ActivityDetector::classify("walk", ""), ActivityType::Walking);
        assert_eq!(ActivityDetector::classify("rowing", "indoor_rowing"), ActivityType::Unknown);
    }
}
