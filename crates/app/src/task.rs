//! Lifecycle of one outstanding inference request.

use agrointel_core::{ErrorKind, TaskId};
use thiserror::Error;

/// Identifies one `start` of one task instance.
///
/// A response is applied only if its token is the task's current one: a later
/// `start`, a `reset`, or a different task instance all make it stale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken {
    task: TaskId,
    seq: u64,
}

impl RequestToken {
    pub fn task_id(&self) -> TaskId {
        self.task
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl core::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.task, self.seq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(ErrorKind),
}

impl<T> TaskState<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded(_) | TaskState::Failed(_))
    }
}

/// Whether a completion changed the task.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// Superseded, reset, or addressed to another task instance; dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("a request is already in flight")]
    AlreadyPending,

    #[error("the task already holds a result; reset it first")]
    AlreadySucceeded,

    #[error("there is no failed request to retry")]
    NothingToRetry,
}

/// `Idle → Pending → Succeeded | Failed`, with `reset` back to `Idle`.
///
/// At most one request is in flight per instance. The input of the latest
/// `start` is kept so a failed request can be retried without asking the user
/// for it again.
#[derive(Debug)]
pub struct AsyncTask<I, T> {
    id: TaskId,
    seq: u64,
    state: TaskState<T>,
    input: Option<I>,
}

impl<I: Clone, T> AsyncTask<I, T> {
    pub fn new() -> Self {
        Self {
            id: TaskId::new(),
            seq: 0,
            state: TaskState::Idle,
            input: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn state(&self) -> &TaskState<T> {
        &self.state
    }

    pub fn input(&self) -> Option<&I> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&T> {
        match &self.state {
            TaskState::Succeeded(output) => Some(output),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TaskState::Pending)
    }

    /// Begin a request. Valid from `Idle` or `Failed`.
    pub fn start(&mut self, input: I) -> Result<RequestToken, TaskError> {
        match self.state {
            TaskState::Pending => return Err(TaskError::AlreadyPending),
            TaskState::Succeeded(_) => return Err(TaskError::AlreadySucceeded),
            TaskState::Idle | TaskState::Failed(_) => {}
        }
        self.seq += 1;
        self.state = TaskState::Pending;
        self.input = Some(input);
        tracing::debug!(task = %self.id, seq = self.seq, "task started");
        Ok(self.current_token())
    }

    /// Start again with the stored input after a failure.
    pub fn retry(&mut self) -> Result<(RequestToken, I), TaskError> {
        let input = match (&self.state, &self.input) {
            (TaskState::Failed(_), Some(input)) => input.clone(),
            (TaskState::Pending, _) => return Err(TaskError::AlreadyPending),
            _ => return Err(TaskError::NothingToRetry),
        };
        let token = self.start(input.clone())?;
        Ok((token, input))
    }

    pub fn resolve(&mut self, token: RequestToken, output: T) -> Delivery {
        self.complete(token, Ok(output))
    }

    pub fn reject(&mut self, token: RequestToken, error: ErrorKind) -> Delivery {
        self.complete(token, Err(error))
    }

    /// Apply the outcome of the request identified by `token`.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<T, ErrorKind>) -> Delivery {
        if !self.is_current(token) {
            tracing::debug!(task = %self.id, %token, "dropping stale completion");
            return Delivery::Stale;
        }
        self.state = match outcome {
            Ok(output) => TaskState::Succeeded(output),
            Err(kind) => TaskState::Failed(kind),
        };
        Delivery::Applied
    }

    /// Back to `Idle`, discarding input and output.
    ///
    /// Accepted from any state; from `Pending` it invalidates the in-flight
    /// request so its response is dropped when it arrives.
    pub fn reset(&mut self) {
        if self.is_pending() {
            tracing::debug!(task = %self.id, seq = self.seq, "in-flight request abandoned");
        }
        self.seq += 1;
        self.state = TaskState::Idle;
        self.input = None;
    }

    fn current_token(&self) -> RequestToken {
        RequestToken {
            task: self.id,
            seq: self.seq,
        }
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.is_pending() && token == self.current_token()
    }
}

impl<I: Clone, T> Default for AsyncTask<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Task = AsyncTask<&'static str, String>;

    #[test]
    fn happy_path() {
        let mut task = Task::new();
        let token = task.start("leaf.jpg").unwrap();
        assert!(task.is_pending());
        assert_eq!(task.resolve(token, "Leaf Spot".into()), Delivery::Applied);
        assert_eq!(task.state(), &TaskState::Succeeded("Leaf Spot".to_string()));
        assert_eq!(task.input(), Some(&"leaf.jpg"));
    }

    #[test]
    fn second_start_while_pending_is_rejected() {
        let mut task = Task::new();
        let token = task.start("a").unwrap();
        assert_eq!(task.start("b"), Err(TaskError::AlreadyPending));
        assert_eq!(task.input(), Some(&"a"));

        assert_eq!(task.resolve(token, "A".into()), Delivery::Applied);
        assert_eq!(task.output(), Some(&"A".to_string()));
    }

    #[test]
    fn start_after_success_requires_reset() {
        let mut task = Task::new();
        let token = task.start("a").unwrap();
        task.resolve(token, "A".into());
        assert_eq!(task.start("b"), Err(TaskError::AlreadySucceeded));
    }

    #[test]
    fn superseded_response_is_dropped_regardless_of_arrival_order() {
        let mut task = Task::new();
        let a = task.start("a").unwrap();
        task.reset();
        let b = task.start("b").unwrap();

        assert_eq!(task.resolve(a, "A".into()), Delivery::Stale);
        assert!(task.is_pending());
        assert_eq!(task.resolve(b, "B".into()), Delivery::Applied);
        assert_eq!(task.output(), Some(&"B".to_string()));
    }

    #[test]
    fn late_response_after_timeout_and_retry_is_dropped() {
        let mut task = Task::new();
        let a = task.start("a").unwrap();
        assert_eq!(task.reject(a, ErrorKind::Timeout), Delivery::Applied);

        let (b, input) = task.retry().unwrap();
        assert_eq!(input, "a");
        assert_eq!(task.resolve(a, "late".into()), Delivery::Stale);
        assert_eq!(task.resolve(b, "fresh".into()), Delivery::Applied);
        assert_eq!(task.output(), Some(&"fresh".to_string()));
    }

    #[test]
    fn reset_from_terminal_states_leaves_nothing_behind() {
        let mut task = Task::new();
        let t = task.start("a").unwrap();
        task.resolve(t, "A".into());
        task.reset();
        assert_eq!(task.state(), &TaskState::Idle);
        assert_eq!(task.input(), None);
        assert_eq!(task.output(), None);

        let t = task.start("b").unwrap();
        task.reject(t, ErrorKind::NetworkFailure);
        task.reset();
        assert_eq!(task.state(), &TaskState::Idle);
        assert_eq!(task.input(), None);
        assert_eq!(task.retry(), Err(TaskError::NothingToRetry));
    }

    #[test]
    fn tokens_from_another_instance_never_apply() {
        let mut old = Task::new();
        let mut fresh = Task::new();
        let old_token = old.start("a").unwrap();
        let _ = fresh.start("b").unwrap();

        assert_eq!(fresh.resolve(old_token, "A".into()), Delivery::Stale);
        assert!(fresh.is_pending());
    }

    #[test]
    fn completion_without_pending_request_is_stale() {
        let mut task = Task::new();
        let t = task.start("a").unwrap();
        task.resolve(t, "A".into());
        assert_eq!(task.resolve(t, "again".into()), Delivery::Stale);
        assert_eq!(task.output(), Some(&"A".to_string()));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start,
        Reset,
        Retry,
        Resolve(usize),
        Reject(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Start),
            Just(Op::Reset),
            Just(Op::Retry),
            (0usize..16).prop_map(Op::Resolve),
            (0usize..16).prop_map(Op::Reject),
        ]
    }

    proptest! {
        /// Only the response to the most recent start is ever observable.
        #[test]
        fn only_the_latest_request_is_observable(ops in proptest::collection::vec(op(), 1..60)) {
            let mut task: AsyncTask<u32, u32> = AsyncTask::new();
            let mut issued: Vec<RequestToken> = Vec::new();
            let mut next_input = 0u32;

            for op in ops {
                match op {
                    Op::Start => {
                        next_input += 1;
                        if let Ok(token) = task.start(next_input) {
                            issued.push(token);
                        }
                    }
                    Op::Reset => task.reset(),
                    Op::Retry => {
                        if let Ok((token, _)) = task.retry() {
                            issued.push(token);
                        }
                    }
                    Op::Resolve(i) if !issued.is_empty() => {
                        let token = issued[i % issued.len()];
                        let input = task.input().copied().unwrap_or_default();
                        let applied = task.resolve(token, input * 10) == Delivery::Applied;
                        prop_assert!(!applied || Some(&token) == issued.last());
                    }
                    Op::Reject(i) if !issued.is_empty() => {
                        let token = issued[i % issued.len()];
                        task.reject(token, ErrorKind::NetworkFailure);
                    }
                    _ => {}
                }

                if let TaskState::Succeeded(output) = task.state() {
                    prop_assert_eq!(*output, task.input().copied().unwrap_or_default() * 10);
                }
            }
        }
    }
}
