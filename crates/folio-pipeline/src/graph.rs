//! Named build tasks organized as a dependency graph.
//!
//! Tasks are registered with the names of their prerequisites. Running a
//! task resolves the transitive closure, orders it into stages, and
//! executes each stage; tasks within a stage have no ordering between them
//! and run in parallel. The first failure aborts the run and no dependent
//! task is started.

use std::collections::{HashMap, HashSet};
use std::error::Error;

use rayon::prelude::*;

/// Result type returned by task actions.
pub type TaskResult = Result<(), Box<dyn Error + Send + Sync>>;

type TaskAction = Box<dyn Fn() -> TaskResult + Send + Sync>;

struct Task {
    name: String,
    deps: Vec<String>,
    action: TaskAction,
}

/// Errors that can occur when resolving or running the graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Dependency cycle involving task '{0}'")]
    Cycle(String),

    #[error("Task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },
}

/// A directed acyclic graph of named tasks.
#[derive(Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. Re-registering a name replaces the previous task.
    pub fn register<F>(&mut self, name: &str, deps: &[&str], action: F)
    where
        F: Fn() -> TaskResult + Send + Sync + 'static,
    {
        let task = Task {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action: Box::new(action),
        };

        match self.index.get(name) {
            Some(&i) => self.tasks[i] = task,
            None => {
                self.index.insert(name.to_string(), self.tasks.len());
                self.tasks.push(task);
            }
        }
    }

    /// Registered task names, in registration order.
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Resolve the transitive closure of `name` into execution stages.
    ///
    /// Every task in a stage has all its prerequisites in earlier stages.
    pub fn stages(&self, name: &str) -> Result<Vec<Vec<&str>>, GraphError> {
        let closure = self.closure(name)?;

        let mut done: HashSet<usize> = HashSet::new();
        let mut stages = Vec::new();

        while done.len() < closure.len() {
            let mut stage: Vec<usize> = Vec::new();

            for &i in &closure {
                if done.contains(&i) {
                    continue;
                }
                let ready = self.tasks[i]
                    .deps
                    .iter()
                    .all(|d| done.contains(&self.index[d]));
                if ready {
                    stage.push(i);
                }
            }

            // A cycle would already have been rejected by closure()
            debug_assert!(!stage.is_empty());
            done.extend(stage.iter().copied());
            stages.push(stage.iter().map(|&i| self.tasks[i].name.as_str()).collect());
        }

        Ok(stages)
    }

    /// Run `name` and everything it depends on.
    ///
    /// Returns the names of tasks that completed, in execution order.
    pub fn run(&self, name: &str) -> Result<Vec<String>, GraphError> {
        let stages = self.stages(name)?;

        let mut executed = Vec::new();

        for stage in stages {
            let results: Vec<(String, TaskResult)> = stage
                .par_iter()
                .map(|task_name| {
                    let i = self.index[*task_name];
                    tracing::info!("Starting '{}'", task_name);
                    let result = (self.tasks[i].action)();
                    (task_name.to_string(), result)
                })
                .collect();

            for (task_name, result) in results {
                match result {
                    Ok(()) => {
                        tracing::info!("Finished '{}'", task_name);
                        executed.push(task_name);
                    }
                    Err(e) => {
                        tracing::error!("Task '{}' failed: {}", task_name, e);
                        return Err(GraphError::TaskFailed {
                            task: task_name,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(executed)
    }

    /// Transitive closure of `name` in registration order, rejecting
    /// unknown names and cycles.
    fn closure(&self, name: &str) -> Result<Vec<usize>, GraphError> {
        let &start = self
            .index
            .get(name)
            .ok_or_else(|| GraphError::UnknownTask(name.to_string()))?;

        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.tasks.len()];
        let mut closure = HashSet::new();
        self.visit(start, &mut state, &mut closure)?;

        let mut ordered: Vec<usize> = (0..self.tasks.len())
            .filter(|i| closure.contains(i))
            .collect();
        ordered.sort_unstable();
        Ok(ordered)
    }

    fn visit(
        &self,
        i: usize,
        state: &mut [u8],
        closure: &mut HashSet<usize>,
    ) -> Result<(), GraphError> {
        match state[i] {
            1 => return Err(GraphError::Cycle(self.tasks[i].name.clone())),
            2 => return Ok(()),
            _ => {}
        }

        state[i] = 1;
        closure.insert(i);

        for dep in &self.tasks[i].deps {
            let &j = self
                .index
                .get(dep)
                .ok_or_else(|| GraphError::UnknownDependency {
                    task: self.tasks[i].name.clone(),
                    dependency: dep.clone(),
                })?;
            self.visit(j, state, closure)?;
        }

        state[i] = 2;
        Ok(())
    }
}

impl std::fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.task_names())
            .finish()
    }
}
