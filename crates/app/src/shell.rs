//! The app shell: router, preferences and the active view's session.

use std::sync::Arc;

use agrointel_ai::{ImagePayload, InferenceService};
use agrointel_core::FarmId;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::catalog::{Farm, FarmDirectory, StaticCatalog};
use crate::chat::{ChatError, ChatSession};
use crate::config::AppConfig;
use crate::crop_form::{CropDoctorSession, CropForm, SessionError};
use crate::preferences::PreferencesHandle;
use crate::router::{ViewRouter, ViewState};
use crate::runner::{Completion, InferenceRunner};
use crate::task::{Delivery, RequestToken};
use crate::workflow::{DetectionWorkflow, WorkflowError};

/// Per-view state. Owned by the shell and replaced on navigation.
#[derive(Debug)]
pub enum Session {
    None,
    Detection(DetectionWorkflow),
    CropDoctor(CropDoctorSession),
    Chat(ChatSession),
}

impl Session {
    fn for_view(view: ViewState) -> Self {
        match view {
            ViewState::Detect => Session::Detection(DetectionWorkflow::new()),
            ViewState::CropDoctor => Session::CropDoctor(CropDoctorSession::new()),
            ViewState::Chat => Session::Chat(ChatSession::new()),
            _ => Session::None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{action} is not available on the {view:?} view")]
    NoSession { action: &'static str, view: ViewState },

    #[error("unknown farm {0}")]
    UnknownFarm(FarmId),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    CropDoctor(#[from] SessionError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Owns everything a UI layer needs to drive the app.
///
/// User actions are synchronous calls that may hand a request to the
/// [`InferenceRunner`]; results come back through [`AppShell::settle`] (or
/// [`AppShell::next_completion`] + [`AppShell::apply`]) and land only if the
/// session that asked is still the live one.
pub struct AppShell {
    router: ViewRouter,
    preferences: PreferencesHandle,
    catalog: Arc<dyn FarmDirectory>,
    runner: InferenceRunner,
    completions: mpsc::UnboundedReceiver<Completion>,
    session: Session,
}

impl AppShell {
    pub fn new(config: &AppConfig, service: Arc<dyn InferenceService>) -> Self {
        let (runner, completions) = InferenceRunner::new(service, config.request_timeout);
        Self {
            router: ViewRouter::new(),
            preferences: PreferencesHandle::new(config.preferences()),
            catalog: Arc::new(StaticCatalog::sample()),
            runner,
            completions,
            session: Session::None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn FarmDirectory>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn current_view(&self) -> ViewState {
        self.router.current_view()
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn preferences(&self) -> &PreferencesHandle {
        &self.preferences
    }

    pub fn catalog(&self) -> &dyn FarmDirectory {
        self.catalog.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn detection(&self) -> Option<&DetectionWorkflow> {
        match &self.session {
            Session::Detection(workflow) => Some(workflow),
            _ => None,
        }
    }

    pub fn crop_doctor(&self) -> Option<&CropDoctorSession> {
        match &self.session {
            Session::CropDoctor(session) => Some(session),
            _ => None,
        }
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        match &self.session {
            Session::Chat(session) => Some(session),
            _ => None,
        }
    }

    /// Switch views. Leaving a view drops its session, so anything it still
    /// has in flight is discarded on arrival.
    pub fn navigate(&mut self, target: ViewState) {
        let previous = self.router.current_view();
        self.router.navigate(target);
        if previous != target {
            self.session = Session::for_view(target);
        }
    }

    pub fn back(&mut self) -> ViewState {
        let target = self.router.current_view().back_target();
        self.navigate(target);
        target
    }

    pub fn open_farm(&mut self, id: FarmId) -> Result<&Farm, ShellError> {
        if self.catalog.farm(id).is_none() {
            return Err(ShellError::UnknownFarm(id));
        }
        self.router.open_farm(id);
        self.session = Session::None;
        self.catalog.farm(id).ok_or(ShellError::UnknownFarm(id))
    }

    pub fn selected_farm(&self) -> Option<&Farm> {
        self.router.selected_farm().and_then(|id| self.catalog.farm(id))
    }

    // Disease detection

    pub fn capture_image(&mut self, image: ImagePayload) -> Result<(), ShellError> {
        Ok(self.detection_mut("capture an image")?.capture(image)?)
    }

    pub fn retake_image(&mut self) -> Result<(), ShellError> {
        Ok(self.detection_mut("retake")?.retake()?)
    }

    /// Start (or, after a failure, restart) analysis of the held image.
    pub fn analyze_image(&mut self) -> Result<RequestToken, ShellError> {
        let submission = self.detection_mut("analyze")?.analyze()?;
        self.runner.detect(submission.token, submission.input);
        Ok(submission.token)
    }

    pub fn scan_another(&mut self) -> Result<(), ShellError> {
        Ok(self.detection_mut("scan another")?.scan_another()?)
    }

    // Crop recommendation

    pub fn crop_form_mut(&mut self) -> Result<&mut CropForm, ShellError> {
        Ok(self.crop_doctor_mut("edit the form")?.form_mut())
    }

    /// Next wizard step; past the last one this sends the request.
    pub fn advance_crop_form(&mut self) -> Result<Option<RequestToken>, ShellError> {
        let submission = self.crop_doctor_mut("advance the form")?.advance()?;
        Ok(submission.map(|submission| {
            self.runner.recommend(submission.token, submission.input);
            submission.token
        }))
    }

    pub fn submit_crop_form(&mut self) -> Result<RequestToken, ShellError> {
        let submission = self.crop_doctor_mut("submit the form")?.submit()?;
        self.runner.recommend(submission.token, submission.input);
        Ok(submission.token)
    }

    pub fn retry_recommendation(&mut self) -> Result<RequestToken, ShellError> {
        let submission = self.crop_doctor_mut("retry")?.retry()?;
        self.runner.recommend(submission.token, submission.input);
        Ok(submission.token)
    }

    pub fn edit_crop_form(&mut self) -> Result<(), ShellError> {
        Ok(self.crop_doctor_mut("edit the form")?.edit()?)
    }

    // Chat

    pub fn send_chat(&mut self, text: &str) -> Result<RequestToken, ShellError> {
        let view = self.router.current_view();
        let Session::Chat(session) = &mut self.session else {
            return Err(ShellError::NoSession { action: "send a message", view });
        };
        let turn = session.send(text)?;
        self.runner.chat(turn.token, turn.history, turn.text);
        Ok(turn.token)
    }

    // Completions

    /// Route a completion to the live session.
    pub fn apply(&mut self, completion: Completion) -> Delivery {
        let token = completion.token();
        let delivery = match (&mut self.session, completion) {
            (Session::Detection(workflow), Completion::Detection { token, outcome }) => {
                workflow.complete(token, outcome)
            }
            (Session::CropDoctor(session), Completion::Recommendation { token, outcome }) => {
                session.complete(token, outcome)
            }
            (Session::Chat(session), Completion::Chat { token, outcome }) => {
                session.complete(token, outcome)
            }
            _ => Delivery::Stale,
        };
        match delivery {
            Delivery::Applied => tracing::debug!(%token, "completion applied"),
            Delivery::Stale => tracing::warn!(%token, view = ?self.router.current_view(), "stale completion discarded"),
        }
        delivery
    }

    /// Wait for the next completion without applying it.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions.recv().await
    }

    /// Wait for the next completion and apply it.
    pub async fn settle(&mut self) -> Option<Delivery> {
        let completion = self.completions.recv().await?;
        Some(self.apply(completion))
    }

    fn detection_mut(&mut self, action: &'static str) -> Result<&mut DetectionWorkflow, ShellError> {
        let view = self.router.current_view();
        match &mut self.session {
            Session::Detection(workflow) => Ok(workflow),
            _ => Err(ShellError::NoSession { action, view }),
        }
    }

    fn crop_doctor_mut(&mut self, action: &'static str) -> Result<&mut CropDoctorSession, ShellError> {
        let view = self.router.current_view();
        match &mut self.session {
            Session::CropDoctor(session) => Ok(session),
            _ => Err(ShellError::NoSession { action, view }),
        }
    }
}

impl core::fmt::Debug for AppShell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppShell")
            .field("router", &self.router)
            .field("preferences", &self.preferences.snapshot())
            .field("runner", &self.runner)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
