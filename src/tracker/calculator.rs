//! Derived values computed from the food log and water intake

use super::food::FoodItem;

/// Sum of item calories
pub fn total_calories(items: &[FoodItem]) -> u64 {
    items.iter().map(|item| u64::from(item.calories)).sum()
}

/// Percentage of `goal` reached, capped at 100
///
/// A goal of zero always yields 0.
///
/// # Examples
///
/// ```
/// use fitbot::tracker::calculator::progress_percentage;
///
/// assert_eq!(progress_percentage(230, 2000), 11.5);
/// assert_eq!(progress_percentage(5000, 2000), 100.0);
/// assert_eq!(progress_percentage(10, 0), 0.0);
/// ```
pub fn progress_percentage(total: u64, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (total as f64 / f64::from(goal) * 100.0).min(100.0)
}

/// Whether `total` strictly exceeds `goal`
pub fn is_over_goal(total: u64, goal: u32) -> bool {
    total > u64::from(goal)
}

/// Detects the total moving from below the goal to at-or-above it
///
/// The first observation only records the total. Every later observation
/// fires when the previous total was below the goal and the new one is not.
#[derive(Debug, Default, Clone)]
pub struct GoalCrossingDetector {
    previous: Option<u64>,
}

impl GoalCrossingDetector {
    /// Detector that has already seen `total`
    pub fn seeded(total: u64) -> Self {
        Self {
            previous: Some(total),
        }
    }

    /// Record `total` and report whether it crossed `goal`
    pub fn observe(&mut self, total: u64, goal: u32) -> bool {
        let goal = u64::from(goal);
        let crossed = matches!(self.previous, Some(prev) if prev < goal && total >= goal);
        self.previous = Some(total);
        crossed
    }

    /// Last observed total
    pub fn previous(&self) -> Option<u64> {
        self.previous
    }
}
