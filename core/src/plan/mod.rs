//! Task planning: expands one directive against a list of endpoints into an
//! ordered sequence of endpoint-bound tasks.
//!
//! # Architecture
//!
//! ```text
//! Directive + [SharedEndpoint] + Environment
//!   ↓
//! TaskBuilder::build()
//!   ├─ Upload: resolve src per endpoint → group by path → archive per group
//!   ├─ Script: read file → command body
//!   ├─ Local:  synthetic localhost endpoint
//!   └─ Run:    inline command body
//!   ↓
//! group_for(GroupMode, endpoints) → make_batch_task() per group
//!   ↓
//! Vec<Task> (serial batches are sequential phases, in order)
//! ```

mod builder;
mod directive;
mod grouping;
mod task;

pub use builder::{BuilderConfig, TaskBuilder, DEBUG_PREFIX, LOCAL_ADDRESS};
pub use directive::{Action, Directive, Upload};
pub use grouping::{group_for, GroupMode};
pub use task::{
    make_batch_task, ArchiveSpec, InputSource, Task, TaskInput, TaskInputKind, TaskParts,
    TaskSummary, TaskTemplate, DIR_ROOT,
};
