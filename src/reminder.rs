//! Hydration reminder timer
//!
//! While reminders are enabled, the day's intake is below the goal and the
//! user has granted notification permission, a background task fires every
//! `frequency_minutes`. Each firing re-reads the latest settings and only
//! notifies if the goal is still unmet. Any change to the settings restarts
//! the schedule from scratch.
//!
//! A [`SettingsRefresh`] task keeps the settings channel current when the
//! intake is logged by another process sharing the same store.

use crate::config::TrackerConfig;
use crate::error::{FitbotError, Result};
use crate::storage::{self, keys, KeyValueStore, StoreLocation};
use crate::tracker::Tracker;
use async_trait::async_trait;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Title of every hydration notification
pub const REMINDER_TITLE: &str = "Time to Hydrate!";

/// Body of the hydration notification for `goal` millilitres
pub fn reminder_body(goal: u32) -> String {
    format!("Don't forget to drink some water to reach your goal of {}ml.", goal)
}

/// Notification permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// The user has not decided yet
    #[default]
    Default,
    /// Notifications may be shown
    Granted,
    /// The user refused notifications
    Denied,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Default => write!(f, "default"),
            Permission::Granted => write!(f, "granted"),
            Permission::Denied => write!(f, "denied"),
        }
    }
}

impl FromStr for Permission {
    type Err = FitbotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Permission::Default),
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            other => Err(FitbotError::Notification(format!(
                "Unknown permission '{}'",
                other
            ))),
        }
    }
}

/// Destination for hydration notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Current permission without prompting
    fn permission(&self) -> Permission;

    /// Ask the user for permission and return the outcome
    async fn request_permission(&self) -> Permission;

    /// Show a notification
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Inputs the reminder schedule depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub frequency_minutes: u32,
    pub intake: u32,
    pub goal: u32,
}

impl ReminderSettings {
    /// Whether the goal is still unmet
    pub fn goal_unmet(&self) -> bool {
        self.intake < self.goal
    }

    /// Whether a timer should run under `permission`
    pub fn should_schedule(&self, permission: Permission) -> bool {
        self.enabled
            && self.goal_unmet()
            && self.frequency_minutes > 0
            && permission == Permission::Granted
    }

    /// Time between firings
    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.frequency_minutes) * 60)
    }
}

/// Handle to the background reminder task
///
/// The task ends when [`stop`](Self::stop) is called, when the handle is
/// dropped, or when the settings sender goes away.
#[derive(Debug)]
pub struct HydrationReminder {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl HydrationReminder {
    /// Spawn the reminder task on the current Tokio runtime
    pub fn spawn(
        settings: watch::Receiver<ReminderSettings>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_reminder(settings, sink, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel the timer
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the task has finished
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel the timer and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Reminder task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for HydrationReminder {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_reminder(
    mut settings: watch::Receiver<ReminderSettings>,
    sink: Arc<dyn NotificationSink>,
    cancel: CancellationToken,
) {
    loop {
        let current = *settings.borrow_and_update();

        if !current.should_schedule(sink.permission()) {
            tracing::debug!(?current, "Hydration reminder idle");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                changed = settings.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
            continue;
        }

        let period = current.period();
        tracing::info!(
            minutes = current.frequency_minutes,
            "Hydration reminder scheduled"
        );
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Hydration reminder cancelled");
                    return;
                }
                changed = settings.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                _ = ticker.tick() => {
                    let latest = *settings.borrow();
                    if !latest.goal_unmet() {
                        tracing::debug!("Hydration goal reached, skipping reminder");
                        continue;
                    }
                    match sink.notify(REMINDER_TITLE, &reminder_body(latest.goal)) {
                        Ok(()) => crate::telemetry::record_reminder_sent(),
                        Err(e) => tracing::warn!("Failed to deliver hydration reminder: {}", e),
                    }
                }
            }
        }
    }
}

/// Handle to the background task that re-reads reminder settings
///
/// Each tick reopens the store, reloads the tracker state and publishes
/// the settings if they changed. A store that cannot be opened (another
/// process holding it) skips the tick.
#[derive(Debug)]
pub struct SettingsRefresh {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SettingsRefresh {
    /// Spawn the refresh task on the current Tokio runtime
    pub fn spawn(
        location: StoreLocation,
        defaults: TrackerConfig,
        every: Duration,
        settings: watch::Sender<ReminderSettings>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_refresh(
            location,
            defaults,
            every,
            settings,
            cancel.clone(),
        ));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel the task and wait for it to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Settings refresh task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SettingsRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Current reminder settings as stored at `location`
///
/// The store is released before this returns.
pub fn read_settings(
    location: &StoreLocation,
    defaults: &TrackerConfig,
) -> Result<ReminderSettings> {
    let store = location.open()?;
    Ok(Tracker::load(store, defaults).reminder_settings())
}

async fn run_refresh(
    location: StoreLocation,
    defaults: TrackerConfig,
    every: Duration,
    settings: watch::Sender<ReminderSettings>,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = settings.closed() => return,
            _ = ticker.tick() => {
                let latest = match read_settings(&location, &defaults) {
                    Ok(latest) => latest,
                    Err(e) => {
                        tracing::debug!("Skipping settings refresh: {}", e);
                        continue;
                    }
                };
                let changed = settings.send_if_modified(|current| {
                    if *current == latest {
                        return false;
                    }
                    *current = latest;
                    true
                });
                if changed {
                    tracing::debug!(?latest, "Reminder settings changed in store");
                }
            }
        }
    }
}

/// Terminal notification sink
///
/// Prints reminders to stdout. Permission comes from configuration when set
/// there, otherwise from the persisted answer to an interactive prompt.
pub struct ConsoleNotifier {
    store: Option<Arc<dyn KeyValueStore>>,
    configured: Permission,
}

impl ConsoleNotifier {
    /// Create a notifier; `configured` other than `Default` overrides the store
    pub fn new(store: Arc<dyn KeyValueStore>, configured: Permission) -> Self {
        Self {
            store: Some(store),
            configured,
        }
    }

    /// Notifier with a permission already resolved, holding no store
    pub fn fixed(permission: Permission) -> Self {
        Self {
            store: None,
            configured: permission,
        }
    }
}

#[async_trait]
impl NotificationSink for ConsoleNotifier {
    fn permission(&self) -> Permission {
        match &self.store {
            Some(store) if self.configured == Permission::Default => storage::load(
                store.as_ref(),
                keys::NOTIFICATION_PERMISSION,
                Permission::Default,
            ),
            _ => self.configured,
        }
    }

    async fn request_permission(&self) -> Permission {
        let current = self.permission();
        if current != Permission::Default {
            return current;
        }

        let answer = tokio::task::spawn_blocking(|| {
            use std::io::Write;
            print!("Allow FitBot to show hydration reminders? [y/N] ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok::<_, std::io::Error>(line)
        })
        .await;

        let permission = match answer {
            Ok(Ok(line)) if line.trim().eq_ignore_ascii_case("y") => Permission::Granted,
            Ok(Ok(line)) if line.trim().is_empty() => Permission::Default,
            Ok(Ok(_)) => Permission::Denied,
            Ok(Err(e)) => {
                tracing::warn!("Failed to read permission answer: {}", e);
                Permission::Default
            }
            Err(e) => {
                tracing::warn!("Permission prompt task failed: {}", e);
                Permission::Default
            }
        };

        match &self.store {
            Some(store) if permission != Permission::Default => {
                storage::save(store.as_ref(), keys::NOTIFICATION_PERMISSION, &permission);
            }
            _ => {}
        }
        permission
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        println!("{} {}", title.bold().cyan(), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_utils::RecordingNotifier;

    fn settings(enabled: bool, intake: u32) -> ReminderSettings {
        ReminderSettings {
            enabled,
            frequency_minutes: 1,
            intake,
            goal: 2500,
        }
    }

    #[test]
    fn test_reminder_body() {
        assert_eq!(
            reminder_body(2500),
            "Don't forget to drink some water to reach your goal of 2500ml."
        );
    }

    #[test]
    fn test_permission_parse_and_display() {
        assert_eq!("Granted".parse::<Permission>().unwrap(), Permission::Granted);
        assert_eq!(Permission::Denied.to_string(), "denied");
        assert!("maybe".parse::<Permission>().is_err());
    }

    #[test]
    fn test_should_schedule() {
        assert!(settings(true, 0).should_schedule(Permission::Granted));
        assert!(!settings(true, 0).should_schedule(Permission::Default));
        assert!(!settings(false, 0).should_schedule(Permission::Granted));
        assert!(!settings(true, 2500).should_schedule(Permission::Granted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_every_period_while_goal_unmet() {
        let (_tx, rx) = watch::channel(settings(true, 500));
        let sink = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminder = HydrationReminder::spawn(rx, sink.clone());

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(sink.sent().len(), 0);

        tokio::time::sleep(Duration::from_secs(62)).await;
        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, REMINDER_TITLE);
        assert_eq!(sent[0].1, reminder_body(2500));

        reminder.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_fires_after_goal_reached() {
        let (tx, rx) = watch::channel(settings(true, 0));
        let sink = Arc::new(RecordingNotifier::new(Permission::Granted));
        let _reminder = HydrationReminder::spawn(rx, sink.clone());

        tokio::time::sleep(Duration::from_secs(30)).await;
        tx.send_modify(|s| s.intake = 2500);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(sink.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_permission_nothing_fires() {
        let (_tx, rx) = watch::channel(settings(true, 0));
        let sink = Arc::new(RecordingNotifier::new(Permission::Denied));
        let _reminder = HydrationReminder::spawn(rx, sink.clone());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(sink.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_change_restarts_schedule() {
        let (tx, rx) = watch::channel(settings(true, 0));
        let sink = Arc::new(RecordingNotifier::new(Permission::Granted));
        let _reminder = HydrationReminder::spawn(rx, sink.clone());

        tokio::time::sleep(Duration::from_secs(30)).await;
        tx.send_modify(|s| s.frequency_minutes = 2);

        // Old schedule would have fired at 60s; new one fires at 150s
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert!(sink.sent().is_empty());

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_and_stop_cancel_timer() {
        let (tx, rx) = watch::channel(settings(true, 0));
        let sink = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminder = HydrationReminder::spawn(rx, sink.clone());

        tx.send_modify(|s| s.enabled = false);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(sink.sent().is_empty());

        reminder.stop();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(reminder.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_ends_when_settings_sender_dropped() {
        let (tx, rx) = watch::channel(settings(false, 0));
        let sink = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminder = HydrationReminder::spawn(rx, sink);

        drop(tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(reminder.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_failure_is_not_fatal() {
        let mut sink = MockNotificationSink::new();
        sink.expect_permission().return_const(Permission::Granted);
        sink.expect_notify()
            .times(2)
            .returning(|_, _| Err(FitbotError::Notification("blocked".into()).into()));

        let (_tx, rx) = watch::channel(settings(true, 0));
        let reminder = HydrationReminder::spawn(rx, Arc::new(sink));

        tokio::time::sleep(Duration::from_secs(121)).await;
        reminder.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_water_logged_through_second_handle_silences_reminder() {
        let dir = tempfile::tempdir().unwrap();
        let location = StoreLocation::from_path(Some(dir.path().join("store")));
        let defaults = TrackerConfig::default();
        {
            let tracker = Tracker::load(location.open().unwrap(), &defaults);
            tracker.set_reminder_frequency(1).unwrap();
            let granted = RecordingNotifier::new(Permission::Granted);
            assert!(tracker.enable_reminders(&granted).await);
        }

        let initial = read_settings(&location, &defaults).unwrap();
        assert!(initial.should_schedule(Permission::Granted));

        let (tx, rx) = watch::channel(initial);
        let sink = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminder = HydrationReminder::spawn(rx.clone(), sink.clone());
        let refresh = SettingsRefresh::spawn(
            location.clone(),
            defaults.clone(),
            Duration::from_secs(10),
            tx,
        );

        tokio::time::sleep(Duration::from_secs(25)).await;
        {
            let other = Tracker::load(location.open().unwrap(), &defaults);
            assert_eq!(other.add_water(2500), 2500);
        }

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(rx.borrow().intake, 2500);
        assert!(sink.sent().is_empty());

        refresh.shutdown().await;
        reminder.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_publishes_only_changes() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let defaults = TrackerConfig::default();
        let location = StoreLocation::Shared(store.clone());

        let (tx, mut rx) = watch::channel(read_settings(&location, &defaults).unwrap());
        let refresh =
            SettingsRefresh::spawn(location, defaults.clone(), Duration::from_secs(5), tx);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(!rx.has_changed().unwrap());

        Tracker::load(store, &defaults).add_water(300);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().intake, 300);

        refresh.shutdown().await;
    }

    #[tokio::test]
    async fn test_fixed_notifier_never_prompts() {
        let notifier = ConsoleNotifier::fixed(Permission::Granted);
        assert_eq!(notifier.permission(), Permission::Granted);
        assert_eq!(notifier.request_permission().await, Permission::Granted);
    }

    #[tokio::test]
    async fn test_console_notifier_prefers_configured_permission() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        storage::save(store.as_ref(), keys::NOTIFICATION_PERMISSION, &Permission::Denied);

        let configured = ConsoleNotifier::new(store.clone(), Permission::Granted);
        assert_eq!(configured.permission(), Permission::Granted);
        assert_eq!(configured.request_permission().await, Permission::Granted);

        let persisted = ConsoleNotifier::new(store, Permission::Default);
        assert_eq!(persisted.permission(), Permission::Denied);
        assert!(persisted.notify("t", "b").is_ok());
    }
}
