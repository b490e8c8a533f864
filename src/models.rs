use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort rank used for display ordering, higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Cycles Low -> Medium -> High -> Low for the priority selector.
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        };
        f.write_str(name)
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            other => bail!("unknown priority '{}', expected low, medium or high", other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const VARIANTS: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Filter::All => 0,
            Filter::Active => 1,
            Filter::Completed => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::VARIANTS[(self.index() + 1) % Self::VARIANTS.len()]
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        };
        f.write_str(name)
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "all" => Filter::All,
            "active" => Filter::Active,
            "completed" | "done" => Filter::Completed,
            other => bail!("unknown filter '{}', expected all, active or completed", other),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    /// `YYYY-MM-DD` or empty.
    pub due_date: String,
    pub priority: Priority,
}

impl Task {
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        due_date: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Task {
            id,
            text: text.into(),
            completed: false,
            due_date: due_date.into(),
            priority,
        }
    }

    /// True when the task is still open and its due date lies before `today`.
    /// Unparseable dates are never overdue.
    pub fn is_overdue(&self, today: chrono::NaiveDate) -> bool {
        if self.completed || self.due_date.is_empty() {
            return false;
        }
        match chrono::NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d") {
            Ok(due) => due < today,
            Err(_) => false,
        }
    }
}

/// Values typed into the input row before `Add` commits them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub text: String,
    pub due_date: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Text,
    DueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Draft(DraftField),
    EditText(TaskId),
    EditDueDate(TaskId),
    Help,
}
