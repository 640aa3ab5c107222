//! Goal progress type definitions.

use crate::exercises::types::Exercise;
use serde::{Deserialize, Serialize};

/// Period a goal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    /// A single local calendar day
    Daily,
    /// An ISO week, Monday to Sunday
    Weekly,
}

impl GoalPeriod {
    /// The exercise's target for this period, 0 when unset.
    pub fn target_of(&self, exercise: &Exercise) -> u32 {
        match self {
            GoalPeriod::Daily => exercise.daily_goal,
            GoalPeriod::Weekly => exercise.weekly_goal,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GoalPeriod::Daily => "Daily",
            GoalPeriod::Weekly => "Weekly",
        }
    }
}

impl std::fmt::Display for GoalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Completion state of a goal within one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    /// No target configured
    NoGoal,
    /// Below target (including nothing logged yet)
    InProgress,
    /// Target reached or exceeded
    Met,
}

impl GoalState {
    /// Classify a period total against a target.
    pub fn classify(total: i64, goal: u32) -> Self {
        if goal == 0 {
            GoalState::NoGoal
        } else if total >= i64::from(goal) {
            GoalState::Met
        } else {
            GoalState::InProgress
        }
    }

    pub fn is_met(&self) -> bool {
        matches!(self, GoalState::Met)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GoalState::NoGoal => "No goal",
            GoalState::InProgress => "In progress",
            GoalState::Met => "Met",
        }
    }
}

impl std::fmt::Display for GoalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Progress of one exercise toward its goal for a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub exercise: Exercise,
    pub period: GoalPeriod,
    pub target: u32,
    pub total: i64,
    pub state: GoalState,
}

impl GoalProgress {
    pub fn new(exercise: Exercise, period: GoalPeriod, total: i64) -> Self {
        let target = period.target_of(&exercise);
        Self {
            state: GoalState::classify(total, target),
            exercise,
            period,
            target,
            total,
        }
    }

    /// Units still needed to meet the target, never negative.
    pub fn remaining(&self) -> i64 {
        (i64::from(self.target) - self.total).max(0)
    }

    /// Completion percentage, capped at 100.
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        (self.total as f64 / f64::from(self.target) * 100.0).min(100.0)
    }
}
