//! Exercise library and weekly schedule
//!
//! The catalog is static data embedded in the binary (`catalog.yaml`) and
//! parsed once at startup. Lookups never mutate it.

pub mod completion;

pub use completion::CompletionTracker;

use crate::error::{FitbotError, Result};
use crate::preferences::GenderMode;
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

/// Difficulty tier of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

/// Difficulty selection for [`Catalog::filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    pub fn matches(&self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(wanted) => *wanted == difficulty,
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = FitbotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DifficultyFilter::All),
            "beginner" => Ok(DifficultyFilter::Only(Difficulty::Beginner)),
            "intermediate" => Ok(DifficultyFilter::Only(Difficulty::Intermediate)),
            "advanced" => Ok(DifficultyFilter::Only(Difficulty::Advanced)),
            other => Err(FitbotError::Catalog(format!(
                "Unknown difficulty '{}'. Expected all, beginner, intermediate or advanced",
                other
            ))),
        }
    }
}

/// One exercise in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub description: String,
    pub image_url: String,
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url_female: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url_female: Option<String>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    pub equipment: String,
    #[serde(default)]
    pub form_tips: Vec<String>,
    pub difficulty: Difficulty,
}

/// Image and video links chosen for a gender mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Media<'a> {
    pub image_url: &'a str,
    pub video_url: &'a str,
}

impl Exercise {
    /// Media for `gender`; female variants are used only in girls mode and
    /// only when present
    pub fn media(&self, gender: GenderMode) -> Media<'_> {
        let female = gender == GenderMode::Girls;
        Media {
            image_url: pick_variant(female, &self.image_url_female, &self.image_url),
            video_url: pick_variant(female, &self.video_url_female, &self.video_url),
        }
    }
}

fn pick_variant<'a>(female: bool, variant: &'a Option<String>, default: &'a str) -> &'a str {
    match variant {
        Some(url) if female => url.as_str(),
        _ => default,
    }
}

/// The plan for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: Weekday,
    pub focus: String,
    #[serde(default)]
    pub exercise_ids: Vec<u32>,
    #[serde(default)]
    pub rest_day: bool,
}

impl DayPlan {
    /// Full English weekday name, e.g. `Monday`
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day)
    }
}

/// Full English name of `day`
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// A motivational quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    exercises: Vec<Exercise>,
    schedule: Vec<DayPlan>,
    #[serde(default)]
    quotes: Vec<Quote>,
}

/// Exercises, weekly schedule and quotes
#[derive(Debug, Clone)]
pub struct Catalog {
    exercises: Vec<Exercise>,
    schedule: Vec<DayPlan>,
    quotes: Vec<Quote>,
}

impl Catalog {
    /// The catalog compiled into the binary
    ///
    /// # Examples
    ///
    /// ```
    /// use fitbot::catalog::Catalog;
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// assert_eq!(catalog.weekly_schedule().len(), 7);
    /// ```
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::Yaml` for malformed documents and
    /// `FitbotError::Catalog` for duplicate exercise ids or weekdays
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: CatalogDocument = serde_yaml::from_str(yaml).map_err(FitbotError::from)?;

        let mut ids = HashSet::new();
        for exercise in &document.exercises {
            if !ids.insert(exercise.id) {
                return Err(FitbotError::Catalog(format!(
                    "Duplicate exercise id {}",
                    exercise.id
                ))
                .into());
            }
        }

        let mut days = HashSet::new();
        for plan in &document.schedule {
            if !days.insert(plan.day) {
                return Err(FitbotError::Catalog(format!(
                    "Duplicate schedule entry for {}",
                    plan.day_name()
                ))
                .into());
            }
            for id in &plan.exercise_ids {
                if !ids.contains(id) {
                    tracing::warn!(
                        day = plan.day_name(),
                        id,
                        "Schedule references unknown exercise"
                    );
                }
            }
        }

        tracing::debug!(
            exercises = document.exercises.len(),
            days = document.schedule.len(),
            quotes = document.quotes.len(),
            "Loaded exercise catalog"
        );

        Ok(Self {
            exercises: document.exercises,
            schedule: document.schedule,
            quotes: document.quotes,
        })
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self, id: u32) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Exercises matching `difficulty` whose name contains `search`
    ///
    /// Difficulty is applied first; a blank search keeps everything. Name
    /// matching is case-insensitive.
    pub fn filter(&self, search: &str, difficulty: DifficultyFilter) -> Vec<&Exercise> {
        let needle = search.trim().to_lowercase();
        self.exercises
            .iter()
            .filter(|e| difficulty.matches(e.difficulty))
            .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Schedule ordered Monday through Sunday
    pub fn weekly_schedule(&self) -> Vec<&DayPlan> {
        let mut plans: Vec<&DayPlan> = self.schedule.iter().collect();
        plans.sort_by_key(|plan| plan.day.num_days_from_monday());
        plans
    }

    pub fn plan_for(&self, day: Weekday) -> Option<&DayPlan> {
        self.schedule.iter().find(|plan| plan.day == day)
    }

    /// Plan for the local current weekday
    pub fn today(&self) -> Option<&DayPlan> {
        self.plan_for(chrono::Local::now().weekday())
    }

    /// Exercises of `plan` in order, skipping unknown ids
    pub fn exercises_for(&self, plan: &DayPlan) -> Vec<&Exercise> {
        plan.exercise_ids
            .iter()
            .filter_map(|id| self.exercise(*id))
            .collect()
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }
}
