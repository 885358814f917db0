//! Persistent key space
//!
//! Key names are part of the on-disk format; changing one orphans the data
//! stored under the old name.

/// Logged food items (list of `FoodItem`)
pub const FOOD_ITEMS: &str = "calorieTrackerFoodItems";

/// Daily calorie goal (integer kcal)
pub const CALORIE_GOAL: &str = "calorieTrackerGoal";

/// Daily hydration goal (integer ml)
pub const HYDRATION_GOAL: &str = "hydrationTrackerGoal";

/// Water consumed today (integer ml)
pub const WATER_INTAKE: &str = "hydrationTrackerIntake";

/// Whether hydration reminders are enabled (boolean)
pub const REMINDERS_ENABLED: &str = "hydrationRemindersEnabled";

/// Minutes between hydration reminders (integer)
pub const REMINDER_FREQUENCY: &str = "hydrationReminderFrequency";

/// Completed exercise identifiers (list of integers)
pub const COMPLETED_EXERCISES: &str = "completedExercises";

/// Colour theme (`"light"` or `"dark"`)
pub const THEME: &str = "theme";

/// Gender mode used for exercise media (`"boys"` or `"girls"`)
pub const GENDER_MODE: &str = "genderMode";

/// Notification permission decided by the user (`"default"`, `"granted"`, `"denied"`)
pub const NOTIFICATION_PERMISSION: &str = "notificationPermission";
