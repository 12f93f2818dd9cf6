//! Four-step crop-recommendation wizard.

use agrointel_core::{CropRecommendation, CropRecommendationInput, DomainError, ErrorKind, Reading};
use thiserror::Error;

use crate::task::{Delivery, RequestToken};
use crate::workflow::{RecommendationWorkflow, Stage, Submission, WorkflowError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormStep {
    Nutrients,
    Acidity,
    Rainfall,
    Location,
}

impl FormStep {
    /// 1-based position shown in the progress indicator.
    pub fn number(&self) -> u8 {
        match self {
            FormStep::Nutrients => 1,
            FormStep::Acidity => 2,
            FormStep::Rainfall => 3,
            FormStep::Location => 4,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self {
            FormStep::Nutrients => &[Field::Nitrogen, Field::Phosphorus, Field::Potassium],
            FormStep::Acidity => &[Field::Ph],
            FormStep::Rainfall => &[Field::Rainfall],
            FormStep::Location => &[Field::Location],
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            FormStep::Nutrients => Some(FormStep::Acidity),
            FormStep::Acidity => Some(FormStep::Rainfall),
            FormStep::Rainfall => Some(FormStep::Location),
            FormStep::Location => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            FormStep::Nutrients => None,
            FormStep::Acidity => Some(FormStep::Nutrients),
            FormStep::Rainfall => Some(FormStep::Acidity),
            FormStep::Location => Some(FormStep::Rainfall),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Nitrogen,
    Phosphorus,
    Potassium,
    Ph,
    Rainfall,
    Location,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Nitrogen => "nitrogen",
            Field::Phosphorus => "phosphorus",
            Field::Potassium => "potassium",
            Field::Ph => "ph",
            Field::Rainfall => "rainfall",
            Field::Location => "location",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("step {} is incomplete: {source}", .step.number())]
    Incomplete { step: FormStep, source: DomainError },

    #[error("already at the first step")]
    AtFirstStep,

    #[error("the form can only be submitted from the last step")]
    NotOnLastStep,
}

/// Result of [`CropForm::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Step(FormStep),
    /// Advanced past the last step with every field valid.
    Submit(CropRecommendationInput),
}

/// Raw field text plus the current step.
///
/// Values are kept exactly as typed; they are parsed when a step is left and
/// again, all together, on submit.
#[derive(Debug, Clone, Default)]
pub struct CropForm {
    step: Option<FormStep>,
    nitrogen: String,
    phosphorus: String,
    potassium: String,
    ph: String,
    rainfall: String,
    location: String,
}

impl CropForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        self.step.unwrap_or(FormStep::Nutrients)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Nitrogen => &self.nitrogen,
            Field::Phosphorus => &self.phosphorus,
            Field::Potassium => &self.potassium,
            Field::Ph => &self.ph,
            Field::Rainfall => &self.rainfall,
            Field::Location => &self.location,
        }
    }

    /// Leave the current step if its fields are valid. From the last step this
    /// submits.
    pub fn advance(&mut self) -> Result<Advance, FormError> {
        let step = self.step();
        self.validate_step(step)?;
        match step.next() {
            Some(next) => {
                self.step = Some(next);
                Ok(Advance::Step(next))
            }
            None => self.submit().map(Advance::Submit),
        }
    }

    pub fn back(&mut self) -> Result<FormStep, FormError> {
        let previous = self.step().previous().ok_or(FormError::AtFirstStep)?;
        self.step = Some(previous);
        Ok(previous)
    }

    /// Build the request from every field. The form stays on the last step
    /// when anything is missing or invalid.
    pub fn submit(&self) -> Result<CropRecommendationInput, FormError> {
        if self.step() != FormStep::Location {
            return Err(FormError::NotOnLastStep);
        }
        for step in [FormStep::Nutrients, FormStep::Acidity, FormStep::Rainfall, FormStep::Location] {
            self.validate_step(step)?;
        }

        let incomplete = |source| FormError::Incomplete {
            step: FormStep::Location,
            source,
        };
        CropRecommendationInput::new(
            self.reading(Field::Nitrogen).map_err(incomplete)?,
            self.reading(Field::Phosphorus).map_err(incomplete)?,
            self.reading(Field::Potassium).map_err(incomplete)?,
            self.reading(Field::Ph).map_err(incomplete)?,
            self.reading(Field::Rainfall).map_err(incomplete)?,
            self.location.as_str(),
        )
        .map_err(incomplete)
    }

    fn validate_step(&self, step: FormStep) -> Result<(), FormError> {
        let incomplete = |source| FormError::Incomplete { step, source };
        match step {
            FormStep::Nutrients => {
                for field in [Field::Nitrogen, Field::Phosphorus, Field::Potassium] {
                    let reading = self.reading(field).map_err(incomplete)?;
                    CropRecommendationInput::check_nutrient(field.name(), &reading).map_err(incomplete)?;
                }
            }
            FormStep::Acidity => {
                let ph = self.reading(Field::Ph).map_err(incomplete)?;
                CropRecommendationInput::check_ph(&ph).map_err(incomplete)?;
            }
            FormStep::Rainfall => {
                let rainfall = self.reading(Field::Rainfall).map_err(incomplete)?;
                CropRecommendationInput::check_rainfall(&rainfall).map_err(incomplete)?;
            }
            FormStep::Location => {
                CropRecommendationInput::check_location(&self.location).map_err(incomplete)?;
            }
        }
        Ok(())
    }

    fn reading(&self, field: Field) -> Result<Reading, DomainError> {
        Reading::parse(field.name(), self.value(field))
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Nitrogen => &mut self.nitrogen,
            Field::Phosphorus => &mut self.phosphorus,
            Field::Potassium => &mut self.potassium,
            Field::Ph => &mut self.ph,
            Field::Rainfall => &mut self.rainfall,
            Field::Location => &mut self.location,
        }
    }
}

/// The crop-doctor screen: the wizard in front of a recommendation workflow.
#[derive(Debug, Default)]
pub struct CropDoctorSession {
    form: CropForm,
    workflow: RecommendationWorkflow,
}

impl CropDoctorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &CropForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CropForm {
        &mut self.form
    }

    pub fn workflow(&self) -> &RecommendationWorkflow {
        &self.workflow
    }

    /// Advance the wizard; past the last step this captures the input and
    /// starts the recommendation request.
    pub fn advance(&mut self) -> Result<Option<Submission<CropRecommendationInput>>, SessionError> {
        match self.form.advance()? {
            Advance::Step(_) => Ok(None),
            Advance::Submit(input) => self.start(input).map(Some),
        }
    }

    pub fn submit(&mut self) -> Result<Submission<CropRecommendationInput>, SessionError> {
        let input = self.form.submit()?;
        self.start(input)
    }

    /// Re-send the held input after a failure; the form is not re-read.
    pub fn retry(&mut self) -> Result<Submission<CropRecommendationInput>, SessionError> {
        Ok(self.workflow.analyze()?)
    }

    /// Drop the held input and return to the form with its fields intact.
    pub fn edit(&mut self) -> Result<(), SessionError> {
        match self.workflow.stage() {
            Stage::Previewing => self.workflow.retake()?,
            Stage::Reviewing => self.workflow.scan_another()?,
            Stage::Capturing => {}
            stage => {
                return Err(WorkflowError::InvalidTransition { action: "edit", stage }.into());
            }
        }
        Ok(())
    }

    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<CropRecommendation, ErrorKind>,
    ) -> Delivery {
        self.workflow.complete(token, outcome)
    }

    fn start(&mut self, input: CropRecommendationInput) -> Result<Submission<CropRecommendationInput>, SessionError> {
        if self.workflow.stage() != Stage::Capturing {
            self.edit()?;
        }
        self.workflow.capture(input)?;
        Ok(self.workflow.analyze()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}
