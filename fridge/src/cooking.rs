//! Guided cooking: stepping through instructions with a per-step timer,
//! illustration and narration.
//!
//! This module only holds the state and its transitions. Whoever drives it is
//! responsible for fetching the illustration described by a [`StepEntry`],
//! calling [`CookingSequencer::tick`] once per second, and playing speech.
use crate::basic_models::Recipe;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STEP_DURATION: Regex =
        Regex::new(r"(?i)([0-9]+)\s*(?:minutes?|menit)").expect("Invalid step duration regex");
}

/// Countdown seconds for a step that mentions "<n> minute(s)" or "<n> menit".
pub fn timer_seconds(step_text: &str) -> Option<u32> {
    let caps = STEP_DURATION.captures(step_text)?;
    let minutes: u32 = caps[1].parse().unwrap_or(u32::MAX);
    Some(minutes.saturating_mul(60))
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// The cache key of a step's illustration.
pub fn step_id(recipe_id: &str, index: usize) -> String {
    format!("{}-step-{}", recipe_id, index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// The step has no duration.
    Unarmed,
    /// Armed and waiting for the user to start it.
    Paused { remaining: u32 },
    /// Counting down. `remaining` is never zero.
    Running { remaining: u32 },
}

impl Timer {
    fn for_step(step_text: &str) -> Self {
        match timer_seconds(step_text) {
            Some(remaining) => Timer::Paused { remaining },
            None => Timer::Unarmed,
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match *self {
            Timer::Unarmed => None,
            Timer::Paused { remaining } | Timer::Running { remaining } => Some(remaining),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Timer::Running { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVisual {
    Loading,
    Ready(String),
    Unavailable,
}

/// What has to happen after a step is entered: its illustration must be requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    pub index: usize,
    pub step_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CookingSequencer {
    recipe_id: String,
    steps: Vec<String>,
    index: usize,
    timer: Timer,
    visual: StepVisual,
    reading: bool,
}

impl CookingSequencer {
    /// Open cooking mode on the first step.
    ///
    /// A recipe without steps yields a sequencer with nothing to show and no entry.
    pub fn start(recipe: &Recipe) -> (Self, Option<StepEntry>) {
        let mut sequencer = Self {
            recipe_id: recipe.id.clone(),
            steps: recipe.steps.clone(),
            index: 0,
            timer: Timer::Unarmed,
            visual: StepVisual::Unavailable,
            reading: false,
        };
        let entry = sequencer.enter(0);
        (sequencer, entry)
    }

    fn enter(&mut self, index: usize) -> Option<StepEntry> {
        self.index = index;
        let Some(text) = self.steps.get(index).cloned() else {
            self.timer = Timer::Unarmed;
            self.visual = StepVisual::Unavailable;
            return None;
        };
        self.timer = Timer::for_step(&text);
        self.visual = StepVisual::Loading;
        Some(StepEntry {
            index,
            step_id: step_id(&self.recipe_id, index),
            text,
        })
    }

    /// Advance one step. No-op on the last step.
    pub fn next(&mut self) -> Option<StepEntry> {
        if self.index + 1 < self.steps.len() {
            self.enter(self.index + 1)
        } else {
            None
        }
    }

    /// Go back one step. No-op on the first step.
    pub fn back(&mut self) -> Option<StepEntry> {
        if self.index > 0 {
            self.enter(self.index - 1)
        } else {
            None
        }
    }

    /// Start or pause the countdown. A finished or missing timer stays as it is.
    pub fn toggle_timer(&mut self) -> Timer {
        self.timer = match self.timer {
            Timer::Paused { remaining } if remaining > 0 => Timer::Running { remaining },
            Timer::Running { remaining } => Timer::Paused { remaining },
            other => other,
        };
        self.timer
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        match self.timer {
            Timer::Running { remaining } if remaining > 1 => {
                self.timer = Timer::Running {
                    remaining: remaining - 1,
                };
                None
            }
            Timer::Running { .. } => {
                self.timer = Timer::Paused { remaining: 0 };
                Some(TimerEvent::Done)
            }
            _ => None,
        }
    }

    /// Record the illustration for `index`. Results for a step that is no longer shown are dropped.
    pub fn apply_visual(&mut self, index: usize, url: Option<String>) -> bool {
        if index != self.index || self.steps.get(index).is_none() {
            return false;
        }
        self.visual = match url {
            Some(url) => StepVisual::Ready(url),
            None => StepVisual::Unavailable,
        };
        true
    }

    /// Claim the narration slot for the current step, returning its text.
    ///
    /// Returns `None` while a previous narration is still in flight.
    pub fn begin_reading(&mut self) -> Option<String> {
        if self.reading {
            return None;
        }
        let text = self.current_step()?.to_string();
        self.reading = true;
        Some(text)
    }

    pub fn finish_reading(&mut self) {
        self.reading = false;
    }

    pub fn is_reading(&self) -> bool {
        self.reading
    }

    pub fn recipe_id(&self) -> &str {
        &self.recipe_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> Option<&str> {
        self.steps.get(self.index).map(String::as_str)
    }

    pub fn timer(&self) -> Timer {
        self.timer
    }

    pub fn visual(&self) -> &StepVisual {
        &self.visual
    }

    pub fn is_last_step(&self) -> bool {
        self.index + 1 >= self.steps.len()
    }
}
