use std::fmt;

use crate::plan::{Task, TaskSummary};

/// Failure of one emitted task, reported by whatever executes the plan.
#[derive(Debug, Clone)]
pub struct TaskError {
    pub task: TaskSummary,
    pub reason: String,
}

impl TaskError {
    pub fn new(task: &Task, reason: impl Into<String>) -> Self {
        Self {
            task: task.summary(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Run(\"{}\"): {}", self.task.command, self.reason)
    }
}

impl std::error::Error for TaskError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::TaskInputKind;

    #[test]
    fn display_names_command_and_reason() {
        let err = TaskError {
            task: TaskSummary {
                command: "uptime".to_string(),
                endpoints: vec!["web1".to_string()],
                tty: true,
                input: TaskInputKind::None,
            },
            reason: "exit status 1".to_string(),
        };
        assert_eq!(err.to_string(), "Run(\"uptime\"): exit status 1");
    }
}
