//! Sequential, fail-fast execution of task lists.

use super::step::Action;
use super::{ProgressEvent, ProgressSender, StepState, Step, TaskList};
use crate::error::Result;
use crate::process::{CommandRunner, Invocation};
use futures_lite::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ListFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Handed to [`Action::Task`] work so it can shell out and report output
#[derive(Clone)]
pub struct TaskContext {
    runner: Arc<dyn CommandRunner>,
    progress: ProgressSender,
    title: String,
    depth: usize,
}

impl TaskContext {
    /// Runner used for every subprocess of this run
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Report a line of output for the current step
    pub fn output(&self, line: impl Into<String>) {
        self.progress.emit(ProgressEvent::new(
            self.title.clone(),
            self.depth,
            StepState::Output(line.into()),
        ));
    }
}

/// Runs task lists one step at a time
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    progress: ProgressSender,
}

impl Executor {
    /// Create an executor
    pub fn new(runner: Arc<dyn CommandRunner>, progress: ProgressSender) -> Self {
        Self { runner, progress }
    }

    /// Run every step in order, stopping at the first error.
    ///
    /// A step's action starts only after all previous steps succeeded or were
    /// skipped. Nothing is retried.
    pub async fn run(&self, list: TaskList) -> Result<()> {
        self.run_list(list, 0).await
    }

    fn run_list(&self, list: TaskList, depth: usize) -> ListFuture<'_> {
        Box::pin(async move {
            for step in list {
                self.run_step(step, depth).await?;
            }
            Ok(())
        })
    }

    async fn run_step(&self, step: Step, depth: usize) -> Result<()> {
        let (title, skip, action) = step.into_parts();

        if let Some(reason) = skip.and_then(|predicate| predicate()) {
            log::info!("Skipping '{}': {}", title, reason);
            self.emit(&title, depth, StepState::Skipped(reason));
            return Ok(());
        }

        self.emit(&title, depth, StepState::Running);

        let result = match action {
            Action::Exec(invocation) => self.stream(&title, depth, &invocation).await,
            Action::Task(task) => {
                let ctx = TaskContext {
                    runner: Arc::clone(&self.runner),
                    progress: self.progress.clone(),
                    title: title.clone(),
                    depth,
                };
                task(ctx).await
            }
            Action::Sequence(nested) => self.run_list(nested, depth + 1).await,
        };

        match &result {
            Ok(()) => self.emit(&title, depth, StepState::Succeeded),
            Err(e) => {
                log::debug!("Step '{}' failed: {}", title, e);
                self.emit(&title, depth, StepState::Failed(e.to_string()));
            }
        }

        result
    }

    async fn stream(&self, title: &str, depth: usize, invocation: &Invocation) -> Result<()> {
        let mut lines = self.runner.exec(invocation)?;
        while let Some(line) = lines.next().await {
            self.emit(title, depth, StepState::Output(line?));
        }
        Ok(())
    }

    fn emit(&self, title: &str, depth: usize, state: StepState) {
        self.progress.emit(ProgressEvent::new(title, depth, state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FileSystemError, ReleaseError};
    use crate::process::LineStream;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoRunner;

    impl CommandRunner for EchoRunner {
        fn exec(&self, invocation: &Invocation) -> Result<LineStream> {
            let lines: Vec<Result<String>> = invocation.args.iter().cloned().map(Ok).collect();
            Ok(futures_lite::stream::iter(lines).boxed())
        }
    }

    fn executor() -> (Executor, tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) {
        let (progress, rx) = ProgressSender::channel();
        (Executor::new(Arc::new(EchoRunner), progress), rx)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_exec_output_is_reported() {
        let (executor, mut rx) = executor();
        let mut list = TaskList::new();
        list.add(Step::exec("echo", Invocation::new("echo").args(["a", "b"])));

        executor.run(list).await.expect("run succeeds");

        let states: Vec<StepState> = drain(&mut rx).into_iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                StepState::Running,
                StepState::Output("a".to_string()),
                StepState::Output("b".to_string()),
                StepState::Succeeded,
            ]
        );
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_list() {
        let (executor, mut rx) = executor();
        let later = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later);

        let mut list = TaskList::new();
        list.add(Step::task("boom", |_| async {
            Err(FileSystemError::MissingDirectory {
                path: PathBuf::from("dist"),
            }
            .into())
        }))
        .add(Step::task("after", move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        let err = executor.run(list).await.unwrap_err();
        assert!(matches!(err, ReleaseError::FileSystem(_)));
        assert_eq!(later.load(Ordering::SeqCst), 0);

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.title == "boom"));
        assert!(matches!(events.last().map(|e| &e.state), Some(StepState::Failed(_))));
    }

    #[tokio::test]
    async fn test_skip_predicate_is_lazy_and_reported() {
        let (executor, mut rx) = executor();
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&ran);

        let mut list = TaskList::new();
        list.add(
            Step::task("skipped", move |_| async move {
                flag.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .skip_if(|| Some("not today".to_string())),
        );

        executor.run(list).await.expect("run succeeds");
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(
            drain(&mut rx),
            vec![ProgressEvent::new(
                "skipped",
                0,
                StepState::Skipped("not today".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_sequences_run_nested_with_depth() {
        let (executor, mut rx) = executor();
        let nested: TaskList = [
            Step::exec("one", Invocation::new("echo").arg("1")),
            Step::task("two", |ctx| async move {
                ctx.output("from task");
                Ok(())
            }),
        ]
        .into_iter()
        .collect();
        let mut list = TaskList::new();
        list.add(Step::sequence("parent", nested));

        executor.run(list).await.expect("run succeeds");

        let events = drain(&mut rx);
        let first = events.first().expect("events");
        assert_eq!((first.title.as_str(), first.depth), ("parent", 0));
        let last = events.last().expect("events");
        assert_eq!(last, &ProgressEvent::new("parent", 0, StepState::Succeeded));
        assert!(events.contains(&ProgressEvent::new(
            "two",
            1,
            StepState::Output("from task".to_string())
        )));
    }
}
