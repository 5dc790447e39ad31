#![allow(dead_code)]

use plandag::plan::{Plan, Task};

/// Builder for `Plan` to simplify test setup.
pub struct PlanBuilder {
    plan: Plan,
}

impl PlanBuilder {
    pub fn new(goal: &str) -> Self {
        Self {
            plan: Plan::new(goal, Vec::new()),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.plan.tasks.push(task);
        self
    }

    /// Shorthand for a task with default instructions and the given inputs.
    pub fn task(self, id: &str, inputs: &[&str]) -> Self {
        let mut builder = TaskBuilder::new(id);
        for dep in inputs {
            builder = builder.input(dep);
        }
        self.with_task(builder.build())
    }

    pub fn build(self) -> Plan {
        self.plan
    }
}

/// Builder for `Task`.
///
/// Default instructions are `run <id>`, which is what
/// [`ScriptedWorker`](crate::fake_worker::ScriptedWorker) uses to tell
/// payloads apart.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Task::new(id, format!("run {id}"), format!("{id} is done")),
        }
    }

    pub fn instructions(mut self, text: &str) -> Self {
        self.task.instructions = text.to_string();
        self
    }

    pub fn success_criteria(mut self, text: &str) -> Self {
        self.task.success_criteria = text.to_string();
        self
    }

    pub fn input(mut self, dep: &str) -> Self {
        self.task.inputs.push(dep.to_string());
        self
    }

    pub fn notes(mut self, text: &str) -> Self {
        self.task.notes = Some(text.to_string());
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Chain of `n` tasks, each depending on the previous one.
pub fn chain_plan(n: usize) -> Plan {
    let mut builder = PlanBuilder::new("chain");
    for i in 1..=n {
        let id = format!("task-{i:03}");
        if i == 1 {
            builder = builder.task(&id, &[]);
        } else {
            let prev = format!("task-{:03}", i - 1);
            builder = builder.task(&id, &[&prev]);
        }
    }
    builder.build()
}
