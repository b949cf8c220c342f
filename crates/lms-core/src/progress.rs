/// Percentage of a course completed, rounded to the nearest integer.
///
/// Returns 0 when the course has no lessons.
pub fn percent(completed: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    (f64::from(completed) / f64::from(total) * 100.0).round() as i32
}

/// A course counts as completed once every lesson is done.
pub fn is_complete(completed: i32, total: i32) -> bool {
    total > 0 && completed >= total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_percent_of_empty_course_is_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
    }

    #[test]
    fn test_is_complete_needs_lessons() {
        assert!(!is_complete(0, 0));
        assert!(!is_complete(1, 2));
        assert!(is_complete(2, 2));
    }
}
