//! Daily calorie and hydration tracker
//!
//! [`Tracker`] owns the food log, both daily goals, the water intake and the
//! hydration reminder preferences. Every value lives in a [`Persisted`] cell
//! so it survives restarts. Totals and percentages are always derived from
//! the current log rather than stored.
//!
//! Adding food feeds a [`GoalCrossingDetector`]; crossing the calorie goal
//! triggers the [`Celebration`]. Changes to anything the hydration reminder
//! depends on are republished on a `watch` channel consumed by
//! [`HydrationReminder`](crate::reminder::HydrationReminder).

pub mod calculator;
pub mod celebration;
pub mod food;

pub use calculator::GoalCrossingDetector;
pub use celebration::Celebration;
pub use food::{FoodEstimate, FoodItem, IdGenerator};

use crate::config::TrackerConfig;
use crate::error::{FitbotError, Result};
use crate::reminder::{NotificationSink, Permission, ReminderSettings};
use crate::state::Persisted;
use crate::storage::{keys, KeyValueStore};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Shown when a scan succeeds but the model finds nothing edible
pub const NO_FOOD_IDENTIFIED: &str = "Could not identify any food in the image. Please try again.";

/// Snapshot of the derived tracker values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSummary {
    pub items: usize,
    pub total_calories: u64,
    pub calorie_goal: u32,
    pub calorie_progress: f64,
    pub over_calorie_goal: bool,
    pub water_intake: u32,
    pub hydration_goal: u32,
    pub hydration_progress: f64,
    pub reminders_enabled: bool,
    pub reminder_frequency_minutes: u32,
}

/// Calorie and hydration state for the day
pub struct Tracker {
    items: Persisted<Vec<FoodItem>>,
    calorie_goal: Persisted<u32>,
    hydration_goal: Persisted<u32>,
    water_intake: Persisted<u32>,
    reminders_enabled: Persisted<bool>,
    reminder_frequency: Persisted<u32>,
    ids: IdGenerator,
    crossing: Mutex<GoalCrossingDetector>,
    celebration: Celebration,
    scan_error: Mutex<Option<String>>,
    reminder_tx: watch::Sender<ReminderSettings>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("summary", &self.summary())
            .finish()
    }
}

/// Clamp a user-entered number into a non-negative `u32`
fn clamp_non_negative(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

impl Tracker {
    /// Load the tracker from `store`, using `defaults` for absent values
    pub fn load(store: Arc<dyn KeyValueStore>, defaults: &TrackerConfig) -> Self {
        let items = Persisted::load(store.clone(), keys::FOOD_ITEMS, Vec::<FoodItem>::new());
        let calorie_goal =
            Persisted::load(store.clone(), keys::CALORIE_GOAL, defaults.calorie_goal);
        let hydration_goal =
            Persisted::load(store.clone(), keys::HYDRATION_GOAL, defaults.hydration_goal);
        let water_intake = Persisted::load(store.clone(), keys::WATER_INTAKE, 0u32);
        let reminders_enabled = Persisted::load(store.clone(), keys::REMINDERS_ENABLED, false);
        let reminder_frequency = Persisted::load(
            store,
            keys::REMINDER_FREQUENCY,
            defaults.reminder_frequency_minutes,
        );

        let last_id = items.get().iter().map(|i| i.id).max().unwrap_or(0);
        let total = calculator::total_calories(&items.get());

        let settings = ReminderSettings {
            enabled: reminders_enabled.get(),
            frequency_minutes: reminder_frequency.get(),
            intake: water_intake.get(),
            goal: hydration_goal.get(),
        };
        let (reminder_tx, _rx) = watch::channel(settings);

        tracing::debug!(items = items.get().len(), total, "Loaded tracker state");

        Self {
            items,
            calorie_goal,
            hydration_goal,
            water_intake,
            reminders_enabled,
            reminder_frequency,
            ids: IdGenerator::starting_after(last_id),
            crossing: Mutex::new(GoalCrossingDetector::seeded(total)),
            celebration: Celebration::new(Duration::from_millis(defaults.celebration_millis)),
            scan_error: Mutex::new(None),
            reminder_tx,
        }
    }

    // ---- food log ----

    /// Current food log, oldest first
    pub fn items(&self) -> Vec<FoodItem> {
        self.items.get()
    }

    /// Log a food item
    ///
    /// Ignored (returns `None`) unless the trimmed name is non-empty and
    /// `calories` is positive.
    pub fn add_item(&self, name: &str, calories: i64) -> Option<FoodItem> {
        let name = name.trim();
        if name.is_empty() || calories <= 0 {
            tracing::debug!(name, calories, "Ignoring invalid food item");
            return None;
        }

        let item = FoodItem {
            id: self.ids.next_id(),
            name: name.to_string(),
            calories: clamp_non_negative(calories),
        };
        self.items.update(|items| items.push(item.clone()));
        tracing::info!(name = %item.name, calories = item.calories, "Logged food item");
        self.after_items_changed();
        Some(item)
    }

    /// Log every estimate returned by an image analysis
    pub fn add_estimates(&self, estimates: Vec<FoodEstimate>) -> Vec<FoodItem> {
        if estimates.is_empty() {
            return Vec::new();
        }

        let added: Vec<FoodItem> = estimates
            .into_iter()
            .map(|estimate| estimate.into_item(self.ids.next_id()))
            .collect();
        self.items.update(|items| items.extend(added.iter().cloned()));
        tracing::info!(count = added.len(), "Logged food items from image analysis");
        self.after_items_changed();
        added
    }

    /// Remove the item with `id`; returns whether anything was removed
    pub fn remove_item(&self, id: i64) -> bool {
        let removed = self.items.update(|items| items.retain(|item| item.id != id));
        if removed {
            self.after_items_changed();
        }
        removed
    }

    /// Empty the food log and reset water intake
    pub fn clear_day(&self) {
        self.items.set(Vec::new());
        self.water_intake.set(0);
        tracing::info!("Cleared the day");
        self.after_items_changed();
        self.publish_reminder_settings();
    }

    fn after_items_changed(&self) {
        let total = self.total_calories();
        let goal = self.calorie_goal.get();
        let crossed = self
            .crossing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(total, goal);
        if crossed {
            self.celebration.trigger();
        }
    }

    // ---- derived values ----

    pub fn total_calories(&self) -> u64 {
        calculator::total_calories(&self.items.get())
    }

    pub fn calorie_goal(&self) -> u32 {
        self.calorie_goal.get()
    }

    pub fn calorie_progress(&self) -> f64 {
        calculator::progress_percentage(self.total_calories(), self.calorie_goal())
    }

    pub fn is_over_calorie_goal(&self) -> bool {
        calculator::is_over_goal(self.total_calories(), self.calorie_goal())
    }

    pub fn water_intake(&self) -> u32 {
        self.water_intake.get()
    }

    pub fn hydration_goal(&self) -> u32 {
        self.hydration_goal.get()
    }

    pub fn hydration_progress(&self) -> f64 {
        calculator::progress_percentage(u64::from(self.water_intake()), self.hydration_goal())
    }

    /// All derived values at once
    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            items: self.items.get().len(),
            total_calories: self.total_calories(),
            calorie_goal: self.calorie_goal(),
            calorie_progress: self.calorie_progress(),
            over_calorie_goal: self.is_over_calorie_goal(),
            water_intake: self.water_intake(),
            hydration_goal: self.hydration_goal(),
            hydration_progress: self.hydration_progress(),
            reminders_enabled: self.reminders_enabled(),
            reminder_frequency_minutes: self.reminder_frequency(),
        }
    }

    // ---- goals and water ----

    /// Set the calorie goal; negative input becomes 0
    pub fn set_calorie_goal(&self, goal: i64) -> u32 {
        let goal = clamp_non_negative(goal);
        self.calorie_goal.set(goal);
        goal
    }

    /// Set the hydration goal; negative input becomes 0
    pub fn set_hydration_goal(&self, goal: i64) -> u32 {
        let goal = clamp_non_negative(goal);
        if self.hydration_goal.set(goal) {
            self.publish_reminder_settings();
        }
        goal
    }

    /// Add (or with a negative `delta`, remove) water; intake never drops below 0
    pub fn add_water(&self, delta: i64) -> u32 {
        let mut result = 0;
        let changed = self.water_intake.update(|intake| {
            *intake = clamp_non_negative(i64::from(*intake).saturating_add(delta));
            result = *intake;
        });
        if changed {
            self.publish_reminder_settings();
        }
        result
    }

    // ---- celebration ----

    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    // ---- camera scan results ----

    /// Apply the outcome of a camera scan
    ///
    /// Identified items are logged and any previous scan error is cleared.
    /// An empty result sets [`NO_FOOD_IDENTIFIED`]; a failure stores its
    /// message. Returns the items that were added.
    pub fn record_scan(
        &self,
        outcome: std::result::Result<Vec<FoodEstimate>, String>,
    ) -> Vec<FoodItem> {
        let mut scan_error = self.scan_error.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(estimates) if estimates.is_empty() => {
                *scan_error = Some(NO_FOOD_IDENTIFIED.to_string());
                Vec::new()
            }
            Ok(estimates) => {
                *scan_error = None;
                drop(scan_error);
                self.add_estimates(estimates)
            }
            Err(message) => {
                *scan_error = Some(message);
                Vec::new()
            }
        }
    }

    /// Message from the last unsuccessful scan
    pub fn scan_error(&self) -> Option<String> {
        self.scan_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ---- hydration reminders ----

    pub fn reminders_enabled(&self) -> bool {
        self.reminders_enabled.get()
    }

    pub fn reminder_frequency(&self) -> u32 {
        self.reminder_frequency.get()
    }

    /// Set minutes between reminders
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::Config` for a zero frequency
    pub fn set_reminder_frequency(&self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            return Err(FitbotError::Config(
                "Reminder frequency must be at least one minute".to_string(),
            )
            .into());
        }
        if self.reminder_frequency.set(minutes) {
            self.publish_reminder_settings();
        }
        Ok(())
    }

    /// Turn reminders on, asking for permission if needed
    ///
    /// Returns whether reminders are enabled afterwards.
    pub async fn enable_reminders(&self, sink: &dyn NotificationSink) -> bool {
        if self.reminders_enabled() {
            return true;
        }

        let mut permission = sink.permission();
        if permission != Permission::Granted {
            permission = sink.request_permission().await;
        }

        if permission != Permission::Granted {
            tracing::info!(%permission, "Notification permission not granted, reminders stay off");
            return false;
        }

        self.reminders_enabled.set(true);
        self.publish_reminder_settings();
        tracing::info!("Hydration reminders enabled");
        true
    }

    /// Turn reminders off
    pub fn disable_reminders(&self) {
        if self.reminders_enabled.set(false) {
            self.publish_reminder_settings();
            tracing::info!("Hydration reminders disabled");
        }
    }

    /// Flip reminders; returns the new state
    pub async fn toggle_reminders(&self, sink: &dyn NotificationSink) -> bool {
        if self.reminders_enabled() {
            self.disable_reminders();
            false
        } else {
            self.enable_reminders(sink).await
        }
    }

    /// Current reminder inputs
    pub fn reminder_settings(&self) -> ReminderSettings {
        *self.reminder_tx.borrow()
    }

    /// Receiver that observes every change to the reminder inputs
    pub fn subscribe_reminder_settings(&self) -> watch::Receiver<ReminderSettings> {
        self.reminder_tx.subscribe()
    }

    fn publish_reminder_settings(&self) {
        let next = ReminderSettings {
            enabled: self.reminders_enabled.get(),
            frequency_minutes: self.reminder_frequency.get(),
            intake: self.water_intake.get(),
            goal: self.hydration_goal.get(),
        };
        self.reminder_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
