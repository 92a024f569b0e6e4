//! Reconciliation of a local and a remote task snapshot.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::id::TaskId;
use crate::task::Task;

/// Result of merging two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeResult {
    /// Unified task set, local ids first then remote-only ids, each in source order.
    pub tasks: Vec<Task>,
    /// Ids present on both sides whose copies disagreed.
    pub conflicts_resolved: usize,
}

/// Which copy of a task present on both sides is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The local copy is strictly newer.
    Local,
    /// The remote copy is newer or equally old.
    Remote,
}

/// Pick the surviving copy of a task known to both sides.
///
/// Remote wins whenever `remote.created_at >= local.created_at`.
#[must_use]
pub fn pick_winner(local: &Task, remote: &Task) -> Winner {
    if remote.created_at() >= local.created_at() {
        Winner::Remote
    } else {
        Winner::Local
    }
}

/// Merge `local` and `remote` into one set covering the union of their ids.
///
/// A task deleted locally but still present remotely cannot be told apart from
/// a task created remotely, so it comes back.
#[must_use]
pub fn merge(local: &[Task], remote: &[Task]) -> MergeResult {
    let local = first_by_id(local, "local");
    let remote = first_by_id(remote, "remote");
    let remote_index: HashMap<&TaskId, &Task> = remote.iter().map(|task| (task.id(), *task)).collect();
    let local_ids: HashSet<&TaskId> = local.iter().map(|task| task.id()).collect();

    let mut result = MergeResult {
        tasks: Vec::with_capacity(local.len() + remote.len()),
        conflicts_resolved: 0,
    };

    for local_task in &local {
        let merged = match remote_index.get(local_task.id()) {
            Some(remote_task) => {
                if local_task.conflicts_with(remote_task) {
                    result.conflicts_resolved += 1;
                }
                match pick_winner(local_task, remote_task) {
                    Winner::Remote => *remote_task,
                    Winner::Local => *local_task,
                }
            }
            None => *local_task,
        };
        result.tasks.push(merged.clone());
    }

    result.tasks.extend(
        remote
            .iter()
            .filter(|task| !local_ids.contains(task.id()))
            .map(|task| (*task).clone()),
    );

    result
}

fn first_by_id<'a>(tasks: &'a [Task], side: &str) -> Vec<&'a Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .iter()
        .filter(|task| {
            let fresh = seen.insert(task.id());
            if !fresh {
                warn!(side, id = %task.id(), "Dropping duplicate task id");
            }
            fresh
        })
        .collect()
}
