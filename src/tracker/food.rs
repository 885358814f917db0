//! Food log entries

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// One logged food item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Millisecond timestamp of creation, unique within the log
    pub id: i64,
    pub name: String,
    pub calories: u32,
}

/// A food item as estimated by the vision model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEstimate {
    pub name: String,
    pub calories: f64,
}

impl FoodEstimate {
    /// Create an estimate
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: name.into(),
            calories,
        }
    }

    /// Calories rounded to the nearest non-negative integer
    ///
    /// # Examples
    ///
    /// ```
    /// use fitbot::tracker::FoodEstimate;
    ///
    /// assert_eq!(FoodEstimate::new("Toast", 79.6).rounded_calories(), 80);
    /// assert_eq!(FoodEstimate::new("Water", -3.0).rounded_calories(), 0);
    /// ```
    pub fn rounded_calories(&self) -> u32 {
        if !self.calories.is_finite() || self.calories <= 0.0 {
            return 0;
        }
        self.calories.round().min(f64::from(u32::MAX)) as u32
    }

    /// Convert into a log entry with `id`
    pub fn into_item(self, id: i64) -> FoodItem {
        let calories = self.rounded_calories();
        FoodItem {
            id,
            name: self.name.trim().to_string(),
            calories,
        }
    }
}

/// Timestamp-derived id source
///
/// Ids follow the wall clock in milliseconds but are bumped when two items
/// are created within the same millisecond, so they stay unique and
/// strictly increasing.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Start after `last`, usually the largest id already in the log
    pub fn starting_after(last: i64) -> Self {
        Self {
            last: AtomicI64::new(last),
        }
    }

    /// Next id
    pub fn next_id(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}
