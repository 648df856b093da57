//! Task-related domain events.
//!
//! The push layer does not forward these; they travel on the same bus as
//! notifications and are filtered out by kind.

use serde::{Deserialize, Serialize};

/// Events related to task operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskEvent {
    /// A task was updated.
    Updated {
        /// The task ID.
        task_id: i64,
        /// The owning project.
        project_id: i64,
    },
}
