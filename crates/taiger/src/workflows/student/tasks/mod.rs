mod banners;
mod board;
mod rules;

pub use banners::{unread_banners, Banner};
pub use board::TaskBoard;

use super::domain::Student;
use serde::{Deserialize, Serialize};

/// Externally supplied feature switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFlags {
    pub vpd_enable: bool,
    pub meeting_enable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub const fn rank(self) -> u8 {
        match self {
            TaskPriority::High => 0,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

/// One outstanding action on the student dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub key: String,
    pub priority: TaskPriority,
    pub title: String,
    pub description: String,
    pub link: String,
    pub link_text: String,
}

/// Prioritised task list plus completion counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub tasks: Vec<TaskItem>,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// Stateless aggregator turning a student snapshot into a [`TaskSummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskAggregator {
    flags: TaskFlags,
}

impl TaskAggregator {
    pub fn new(flags: TaskFlags) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> TaskFlags {
        self.flags
    }

    pub fn build(&self, student: &Student) -> TaskSummary {
        let tally = rules::collect(student, &self.flags);
        let percentage = completion_percentage(tally.completed, tally.total);

        let mut tasks = tally.tasks;
        // sort_by_key is stable, so equal priorities keep evaluation order.
        tasks.sort_by_key(|task| task.priority.rank());

        TaskSummary {
            tasks,
            completed: tally.completed,
            total: tally.total,
            percentage,
        }
    }
}

pub fn build_student_tasks(student: &Student, flags: TaskFlags) -> TaskSummary {
    TaskAggregator::new(flags).build(student)
}

pub(crate) fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}
