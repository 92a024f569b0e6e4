//! Local task commands.

use std::io::Write;

use anyhow::Result;
use todo_gist_app::{Clock, TaskOpError, TaskService, TaskStore};
use todo_gist_core::{IdGenerator, Task};
use tracing::debug;

/// Print a rejected input for the user and yield `None`; storage failures propagate.
fn settle<T>(result: Result<T, TaskOpError>, out: &mut impl Write) -> Result<Option<T>> {
    let err = match result {
        Ok(value) => return Ok(Some(value)),
        Err(err) => err,
    };
    match err.kind() {
        Some(kind) => {
            debug!(%kind, %err, "Command rejected");
            writeln!(out, "Error: {err}")?;
            Ok(None)
        }
        None => Err(err.into()),
    }
}

pub fn add<S: TaskStore, G: IdGenerator, C: Clock>(
    service: &TaskService<S, G, C>,
    description: &str,
    out: &mut impl Write,
) -> Result<bool> {
    let Some(task) = settle(service.add(description), out)? else {
        return Ok(false);
    };
    writeln!(
        out,
        "Task added successfully: [{}] {}",
        task.id().short(),
        task.description()
    )?;
    Ok(true)
}

pub fn list<S: TaskStore, G: IdGenerator, C: Clock>(service: &TaskService<S, G, C>, out: &mut impl Write) -> Result<bool> {
    let Some(mut tasks) = settle(service.list(), out)? else {
        return Ok(false);
    };
    if tasks.is_empty() {
        writeln!(out, "No tasks found. Use 'todo add \"task\"' to create your first task.")?;
        return Ok(true);
    }
    tasks.sort_by_key(Task::created_at);
    writeln!(out, "You have {} task(s):", tasks.len())?;
    writeln!(out)?;
    for task in &tasks {
        let mark = if task.is_completed() { "[X]" } else { "[ ]" };
        writeln!(out, "{} {mark} {}", task.id().short(), task.description())?;
    }
    Ok(true)
}

pub fn done<S: TaskStore, G: IdGenerator, C: Clock>(
    service: &TaskService<S, G, C>,
    prefix: &str,
    out: &mut impl Write,
) -> Result<bool> {
    let Some(task) = settle(service.complete(prefix), out)? else {
        return Ok(false);
    };
    writeln!(out, "Task completed successfully: [{}]", task.id().short())?;
    Ok(true)
}

pub fn done_all<S: TaskStore, G: IdGenerator, C: Clock>(
    service: &TaskService<S, G, C>,
    out: &mut impl Write,
) -> Result<bool> {
    match settle(service.complete_all(), out)? {
        None => return Ok(false),
        Some(0) => writeln!(out, "No pending tasks to complete.")?,
        Some(count) => writeln!(out, "Completed {count} task(s).")?,
    }
    Ok(true)
}

pub fn remove<S: TaskStore, G: IdGenerator, C: Clock>(
    service: &TaskService<S, G, C>,
    prefix: &str,
    out: &mut impl Write,
) -> Result<bool> {
    let Some(task) = settle(service.remove(prefix), out)? else {
        return Ok(false);
    };
    writeln!(out, "Task removed successfully: [{}]", task.id().short())?;
    Ok(true)
}

pub fn remove_all<S: TaskStore, G: IdGenerator, C: Clock>(
    service: &TaskService<S, G, C>,
    out: &mut impl Write,
) -> Result<bool> {
    match settle(service.remove_all(), out)? {
        None => return Ok(false),
        Some(0) => writeln!(out, "No tasks to remove.")?,
        Some(count) => writeln!(out, "Removed {count} task(s).")?,
    }
    Ok(true)
}
