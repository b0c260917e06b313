//! Taskify: a local task list with categories, completion progress, and a
//! terminal front end.

pub mod app;
pub mod config;
pub mod error;
pub mod progress;
pub mod storage;
pub mod task;
pub mod task_store;
pub mod ui;

pub use config::{Config, Theme};
pub use error::{Result, TaskifyError};
pub use progress::compute_progress;
pub use storage::{FileSlots, MemorySlots, Persistence, SlotStore};
pub use task::{Category, Task, TaskId};
pub use task_store::{TaskList, TaskStore};
