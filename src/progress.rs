use crate::task_store::TaskList;

/// Percentage of completed tasks, rounded half up. An empty list is 0 %.
pub fn compute_progress(tasks: &TaskList) -> u8 {
    let total = tasks.len();
    if total == 0 {
        return 0;
    }
    let done = tasks.completed_count();
    // (100 * done / total) rounded half up, in integers
    ((200 * done + total) / (2 * total)) as u8
}
