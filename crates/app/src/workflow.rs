//! Capture → analyze → review flow shared by disease detection and crop
//! recommendation.

use agrointel_ai::ImagePayload;
use agrointel_core::{CropRecommendation, CropRecommendationInput, DiagnosisResult, ErrorKind};
use thiserror::Error;

use crate::task::{AsyncTask, Delivery, RequestToken, TaskError, TaskState};

/// Where a workflow is, derived from the held input and the task state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing captured yet.
    Capturing,
    /// Input held, not analyzed (or the last analysis failed).
    Previewing,
    Analyzing,
    Reviewing,
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Stage::Capturing => "capturing",
            Stage::Previewing => "previewing",
            Stage::Analyzing => "analyzing",
            Stage::Reviewing => "reviewing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("cannot {action} while {stage}")]
    InvalidTransition { action: &'static str, stage: Stage },

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// A request ready to hand to the inference runner.
#[derive(Debug, Clone)]
pub struct Submission<I> {
    pub token: RequestToken,
    pub input: I,
}

/// One capture → analyze → review flow over a single [`AsyncTask`].
#[derive(Debug)]
pub struct Workflow<I, T> {
    input: Option<I>,
    task: AsyncTask<I, T>,
    last_error: Option<ErrorKind>,
}

pub type DetectionWorkflow = Workflow<ImagePayload, DiagnosisResult>;
pub type RecommendationWorkflow = Workflow<CropRecommendationInput, CropRecommendation>;

impl<I: Clone, T> Workflow<I, T> {
    pub fn new() -> Self {
        Self {
            input: None,
            task: AsyncTask::new(),
            last_error: None,
        }
    }

    pub fn stage(&self) -> Stage {
        match (&self.input, self.task.state()) {
            (None, _) => Stage::Capturing,
            (Some(_), TaskState::Pending) => Stage::Analyzing,
            (Some(_), TaskState::Succeeded(_)) => Stage::Reviewing,
            (Some(_), TaskState::Idle | TaskState::Failed(_)) => Stage::Previewing,
        }
    }

    /// The captured input, kept through failures so retry needs no re-entry.
    pub fn input(&self) -> Option<&I> {
        self.input.as_ref()
    }

    pub fn result(&self) -> Option<&T> {
        self.task.output()
    }

    /// Failure of the latest analysis, shown inline until the next attempt.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn task(&self) -> &AsyncTask<I, T> {
        &self.task
    }

    /// `Capturing → Previewing`.
    pub fn capture(&mut self, input: I) -> Result<(), WorkflowError> {
        self.expect_stage("capture", Stage::Capturing)?;
        self.input = Some(input);
        Ok(())
    }

    /// `Previewing → Capturing`, discarding the held input.
    pub fn retake(&mut self) -> Result<(), WorkflowError> {
        self.expect_stage("retake", Stage::Previewing)?;
        self.input = None;
        self.last_error = None;
        self.task.reset();
        Ok(())
    }

    /// `Previewing → Analyzing`. Also serves as retry after a failure.
    pub fn analyze(&mut self) -> Result<Submission<I>, WorkflowError> {
        self.expect_stage("analyze", Stage::Previewing)?;
        let input = match &self.input {
            Some(input) => input.clone(),
            None => {
                return Err(WorkflowError::InvalidTransition {
                    action: "analyze",
                    stage: Stage::Capturing,
                })
            }
        };
        let token = self.task.start(input.clone())?;
        self.last_error = None;
        Ok(Submission { token, input })
    }

    /// `Analyzing → Reviewing` on success, `Analyzing → Previewing` on failure.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<T, ErrorKind>) -> Delivery {
        let error = outcome.as_ref().err().copied();
        let delivery = self.task.complete(token, outcome);
        if delivery == Delivery::Applied {
            self.last_error = error;
        }
        delivery
    }

    /// `Reviewing → Capturing`.
    pub fn scan_another(&mut self) -> Result<(), WorkflowError> {
        self.expect_stage("scan another", Stage::Reviewing)?;
        self.input = None;
        self.last_error = None;
        self.task.reset();
        Ok(())
    }

    fn expect_stage(&self, action: &'static str, expected: Stage) -> Result<(), WorkflowError> {
        let stage = self.stage();
        if stage == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition { action, stage })
        }
    }
}

impl<I: Clone, T> Default for Workflow<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Flow = Workflow<&'static str, String>;

    #[test]
    fn capture_retake_capture_analyze_retry_reviews_second_image() {
        let mut flow = Flow::new();
        assert_eq!(flow.stage(), Stage::Capturing);

        flow.capture("first.jpg").unwrap();
        assert_eq!(flow.stage(), Stage::Previewing);
        flow.retake().unwrap();
        assert_eq!(flow.stage(), Stage::Capturing);
        assert_eq!(flow.input(), None);

        flow.capture("second.jpg").unwrap();
        let first = flow.analyze().unwrap();
        assert_eq!(first.input, "second.jpg");
        assert_eq!(flow.stage(), Stage::Analyzing);

        assert_eq!(flow.complete(first.token, Err(ErrorKind::NetworkFailure)), Delivery::Applied);
        assert_eq!(flow.stage(), Stage::Previewing);
        assert_eq!(flow.input(), Some(&"second.jpg"));
        assert_eq!(flow.last_error(), Some(ErrorKind::NetworkFailure));

        let retry = flow.analyze().unwrap();
        assert_eq!(retry.input, "second.jpg");
        assert_eq!(flow.last_error(), None);
        flow.complete(retry.token, Ok("diagnosis of second.jpg".into()));

        assert_eq!(flow.stage(), Stage::Reviewing);
        assert_eq!(flow.result().map(String::as_str), Some("diagnosis of second.jpg"));
    }

    #[test]
    fn analyze_twice_is_rejected_while_analyzing() {
        let mut flow = Flow::new();
        flow.capture("a.jpg").unwrap();
        flow.analyze().unwrap();
        assert_eq!(
            flow.analyze().unwrap_err(),
            WorkflowError::InvalidTransition {
                action: "analyze",
                stage: Stage::Analyzing
            }
        );
    }

    #[test]
    fn cannot_analyze_before_capture() {
        let mut flow = Flow::new();
        assert!(matches!(
            flow.analyze(),
            Err(WorkflowError::InvalidTransition { stage: Stage::Capturing, .. })
        ));
    }

    #[test]
    fn capture_is_only_valid_from_capturing() {
        let mut flow = Flow::new();
        flow.capture("a.jpg").unwrap();
        assert!(flow.capture("b.jpg").is_err());
        assert_eq!(flow.input(), Some(&"a.jpg"));
    }

    #[test]
    fn scan_another_clears_everything() {
        let mut flow = Flow::new();
        flow.capture("a.jpg").unwrap();
        let sub = flow.analyze().unwrap();
        flow.complete(sub.token, Ok("ok".into()));

        assert!(flow.retake().is_err());
        flow.scan_another().unwrap();
        assert_eq!(flow.stage(), Stage::Capturing);
        assert_eq!(flow.result(), None);
        assert_eq!(flow.input(), None);
    }

    #[test]
    fn stale_completion_leaves_error_untouched() {
        let mut flow = Flow::new();
        flow.capture("a.jpg").unwrap();
        let sub = flow.analyze().unwrap();
        flow.complete(sub.token, Err(ErrorKind::Timeout));
        let retry = flow.analyze().unwrap();

        assert_eq!(flow.complete(sub.token, Err(ErrorKind::NetworkFailure)), Delivery::Stale);
        assert_eq!(flow.last_error(), None);
        assert_eq!(flow.stage(), Stage::Analyzing);

        flow.complete(retry.token, Ok("ok".into()));
        assert_eq!(flow.stage(), Stage::Reviewing);
    }
}
