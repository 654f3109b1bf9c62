//! Shared extraction patterns for answer validation.
//!
//! These regexes are shared between the normalizer and the detector: the
//! charset gate additionally guards both question admission and raw generator
//! output. Pattern definition is kept separate from pattern usage so both
//! sides stay in sync on what counts as a calorie, duration, or rating claim.

use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    /// Characters a question (or raw answer) may contain: letters, digits,
    /// whitespace, and a fixed punctuation set. Anything else is treated as
    /// non-target-script input.
    pub static ref ALLOWED_CHARSET: Regex = Regex::new(
        r"^[a-zA-Z0-9\s.,!?()'\-°/:&+%]+$"
    ).unwrap();

    /// A calorie claim: "<number> calories".
    pub static ref CALORIE_FIGURE: Regex = Regex::new(
        r"(?i)(\d+\.?\d*)\s*calories"
    ).unwrap();

    /// A duration claim: "<integer> hour|hr|minute|min".
    pub static ref DURATION_FIGURE: Regex = Regex::new(
        r"(?i)(\d+)\s*(hour|hr|minute|min)"
    ).unwrap();

    /// A rating claim: "<number> based on" or "<number> out of".
    pub static ref RATING_FIGURE: Regex = Regex::new(
        r"(?i)(\d+\.?\d*)\s*(?:based on|out of)"
    ).unwrap();
}

/// Check that text contains only allowed characters. Empty text fails.
pub fn is_allowed_charset(text: &str) -> bool {
    ALLOWED_CHARSET.is_match(text)
}

/// First calorie claim in the text: the numeric value and the byte span of
/// the whole matched phrase.
pub fn find_calories(text: &str) -> Option<(f64, Range<usize>)> {
    let caps = CALORIE_FIGURE.captures(text)?;
    let whole = caps.get(0)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some((value, whole.start()..whole.end()))
}

/// A duration claim extracted from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationFigure {
    /// Numeric value as written.
    pub value: u64,
    /// Unit token as written, lower-cased ("hour", "hr", "minute", "min").
    pub unit: String,
    /// Byte span of the whole matched phrase.
    pub span: Range<usize>,
}

impl DurationFigure {
    /// Whether the unit is hour-like ("hour" or "hr").
    pub fn is_hour_like(&self) -> bool {
        self.unit.starts_with('h')
    }
}

/// First duration claim in the text.
pub fn find_duration(text: &str) -> Option<DurationFigure> {
    let caps = DURATION_FIGURE.captures(text)?;
    let whole = caps.get(0)?;
    let value: u64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    Some(DurationFigure {
        value,
        unit,
        span: whole.start()..whole.end(),
    })
}

/// First rating claim in the text.
pub fn find_rating(text: &str) -> Option<f64> {
    let caps = RATING_FIGURE.captures(text)?;
    caps.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_accepts_recipe_questions() {
        assert!(is_allowed_charset("How long does chicken soup take to cook?"));
        assert!(is_allowed_charset("Bake at 350°F for 20-25 minutes, serves 4!"));
        assert!(is_allowed_charset("What's the rating (out of 5)?"));
    }

    #[test]
    fn test_charset_rejects_non_target_script() {
        assert!(!is_allowed_charset("Как приготовить суп?"));
        assert!(!is_allowed_charset("寿司の作り方"));
        assert!(!is_allowed_charset("soup; DROP TABLE recipes"));
        assert!(!is_allowed_charset(""));
    }

    #[test]
    fn test_find_calories() {
        let (value, span) = find_calories("This soup has 150 calories per serving.").unwrap();
        assert_eq!(value, 150.0);
        assert_eq!(&"This soup has 150 calories per serving."[span], "150 calories");

        let (value, _) = find_calories("about 99.5 Calories total").unwrap();
        assert_eq!(value, 99.5);

        assert!(find_calories("no figures here").is_none());
    }

    #[test]
    fn test_find_calories_first_occurrence_wins() {
        let (value, _) = find_calories("300 calories, later 900 calories").unwrap();
        assert_eq!(value, 300.0);
    }

    #[test]
    fn test_find_duration() {
        let fig = find_duration("Simmer for 45 minutes then rest.").unwrap();
        assert_eq!(fig.value, 45);
        assert_eq!(fig.unit, "minute");
        assert!(!fig.is_hour_like());

        let fig = find_duration("Roast 2 hours at 350").unwrap();
        assert_eq!(fig.value, 2);
        assert_eq!(fig.unit, "hour");
        assert!(fig.is_hour_like());

        let fig = find_duration("about 3 hrs").unwrap();
        assert_eq!(fig.unit, "hr");
    }

    #[test]
    fn test_find_rating() {
        assert_eq!(find_rating("Rated 4.5 out of 5 stars."), Some(4.5));
        assert_eq!(find_rating("4 based on 120 reviews"), Some(4.0));
        assert_eq!(find_rating("a five-star dish"), None);
    }
}
