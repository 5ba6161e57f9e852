//! Step and task list data model.

use super::TaskContext;
use crate::error::Result;
use crate::process::Invocation;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Deferred async work; receives the context of the step it belongs to
pub type BoxedTask =
    Box<dyn FnOnce(TaskContext) -> futures_lite::future::Boxed<Result<()>> + Send>;

/// Evaluated right before a step runs; `Some(reason)` skips it
pub type SkipPredicate = Box<dyn FnOnce() -> Option<String> + Send>;

/// What a step does when it runs
pub enum Action {
    /// Run a command and stream its output lines
    Exec(Invocation),
    /// Run arbitrary async work
    Task(BoxedTask),
    /// Run a nested list of steps
    Sequence(TaskList),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Exec(invocation) => f.debug_tuple("Exec").field(invocation).finish(),
            Action::Task(_) => f.write_str("Task(..)"),
            Action::Sequence(list) => f.debug_tuple("Sequence").field(list).finish(),
        }
    }
}

/// One named unit of work
pub struct Step {
    title: String,
    skip: Option<SkipPredicate>,
    action: Action,
}

impl Step {
    /// Create a step from an action
    pub fn new(title: impl Into<String>, action: Action) -> Self {
        Self {
            title: title.into(),
            skip: None,
            action,
        }
    }

    /// Step that runs a command
    pub fn exec(title: impl Into<String>, invocation: Invocation) -> Self {
        Self::new(title, Action::Exec(invocation))
    }

    /// Step that runs async work
    pub fn task<F, Fut>(title: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let task: BoxedTask = Box::new(
            move |ctx| -> futures_lite::future::Boxed<Result<()>> { Box::pin(task(ctx)) },
        );
        Self::new(title, Action::Task(task))
    }

    /// Step that expands into nested steps
    pub fn sequence(title: impl Into<String>, steps: TaskList) -> Self {
        Self::new(title, Action::Sequence(steps))
    }

    /// Attach a skip predicate, evaluated when the step is reached
    pub fn skip_if<F>(mut self, predicate: F) -> Self
    where
        F: FnOnce() -> Option<String> + Send + 'static,
    {
        self.skip = Some(Box::new(predicate));
        self
    }

    /// Step title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Step action
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Whether a skip predicate is attached
    pub fn is_conditional(&self) -> bool {
        self.skip.is_some()
    }

    pub(super) fn into_parts(self) -> (String, Option<SkipPredicate>, Action) {
        (self.title, self.skip, self.action)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("title", &self.title)
            .field("conditional", &self.is_conditional())
            .field("action", &self.action)
            .finish()
    }
}

/// A line of [`TaskList::outline`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Nesting level, 0 for top-level steps
    pub depth: usize,
    /// Step title
    pub title: String,
    /// Command line for exec steps
    pub command: Option<String>,
    /// Whether the step may skip itself at run time
    pub conditional: bool,
}

/// Ordered steps, run once
#[derive(Debug, Default)]
pub struct TaskList {
    steps: Vec<Step>,
}

impl TaskList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn add(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Number of top-level steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the list has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Top-level steps
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Titles of the top-level steps, in run order
    pub fn titles(&self) -> Vec<&str> {
        self.steps.iter().map(Step::title).collect()
    }

    /// Flattened, depth-annotated view of the whole tree
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        self.collect_outline(0, &mut entries);
        entries
    }

    fn collect_outline(&self, depth: usize, entries: &mut Vec<OutlineEntry>) {
        for step in &self.steps {
            entries.push(OutlineEntry {
                depth,
                title: step.title.clone(),
                command: match &step.action {
                    Action::Exec(invocation) => Some(invocation.command_line()),
                    _ => None,
                },
                conditional: step.is_conditional(),
            });
            if let Action::Sequence(nested) = &step.action {
                nested.collect_outline(depth + 1, entries);
            }
        }
    }
}

impl Extend<Step> for TaskList {
    fn extend<I: IntoIterator<Item = Step>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}

impl FromIterator<Step> for TaskList {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TaskList {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_order() {
        let mut list = TaskList::new();
        list.add(Step::exec("first", Invocation::new("true")))
            .add(Step::exec("second", Invocation::new("true")));
        list.extend([Step::task("third", |_| async { Ok(()) })]);

        assert_eq!(list.titles(), vec!["first", "second", "third"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_outline_descends_into_sequences() {
        let nested: TaskList = [
            Step::exec("inner", Invocation::new("npm").arg("publish")),
            Step::task("work", |_| async { Ok(()) }),
        ]
        .into_iter()
        .collect();

        let mut list = TaskList::new();
        list.add(Step::sequence("outer", nested).skip_if(|| None));

        let outline = list.outline();
        assert_eq!(outline.len(), 3);
        assert_eq!(outline[0].depth, 0);
        assert!(outline[0].conditional);
        assert_eq!(outline[1].depth, 1);
        assert_eq!(outline[1].command.as_deref(), Some("npm publish"));
        assert_eq!(outline[2].command, None);
    }
}
