// src/views/wizard.rs
//! Five-step job creation form. Publishing goes through checkout first;
//! the job is only created once the plan is paid.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::api::JobsApi;
use crate::error::{ApiError, ValidationErrors};
use crate::payment::{PaymentError, PaymentGateway};
use crate::types::job::{Job, JobDraft, JobStatus};
use crate::types::payment::{CardDetails, SubscriptionInfo, SubscriptionPlan};

pub const CONTRACT_TYPES: &[&str] = &["CDI", "CDD", "Extra", "Saisonnier", "Stage", "Apprentissage"];
pub const SALARY_PERIODS: &[&str] = &["heure", "jour", "mois", "an"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    GeneralInfo,
    ContractDetails,
    LocationSalary,
    SkillsSchedule,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::GeneralInfo,
        WizardStep::ContractDetails,
        WizardStep::LocationSalary,
        WizardStep::SkillsSchedule,
        WizardStep::Review,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::GeneralInfo => "Informations générales",
            WizardStep::ContractDetails => "Détails du contrat",
            WizardStep::LocationSalary => "Lieu et salaire",
            WizardStep::SkillsSchedule => "Compétences et horaires",
            WizardStep::Review => "Récapitulatif",
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("step {step:?} is incomplete: {errors}")]
    Invalid {
        step: WizardStep,
        errors: ValidationErrors,
    },

    #[error("the offer can only be published from the review step")]
    NotOnReview,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Validity predicate of one step over the draft.
pub fn validate_step(step: WizardStep, draft: &JobDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match step {
        WizardStep::GeneralInfo => {
            if draft.title.trim().is_empty() {
                errors.add("title", "Le titre est requis");
            }
            if draft.description.trim().is_empty() {
                errors.add("description", "La description est requise");
            }
            if draft.sector.trim().is_empty() {
                errors.add("sector", "Le secteur est requis");
            }
        }
        WizardStep::ContractDetails => {
            let contract = draft.contract_type.trim();
            if contract.is_empty() {
                errors.add("contractType", "Le type de contrat est requis");
            } else if !CONTRACT_TYPES.contains(&contract) {
                errors.add("contractType", "Type de contrat inconnu");
            }
            if matches!(contract, "CDD" | "Saisonnier")
                && draft.duration.as_deref().map_or(true, |d| d.trim().is_empty())
            {
                errors.add("duration", "La durée est requise pour ce contrat");
            }
            if let Some(start) = &draft.start_date {
                if NaiveDate::parse_from_str(start, "%Y-%m-%d").is_err() {
                    errors.add("startDate", "Date de début invalide (AAAA-MM-JJ)");
                }
            }
        }
        WizardStep::LocationSalary => {
            if draft.location.trim().is_empty() {
                errors.add("location", "Le lieu est requis");
            }
            if let Some(salary) = &draft.salary {
                if salary.amount.is_nan() || salary.amount <= 0.0 {
                    errors.add("salary", "Le salaire doit être positif");
                }
                if !SALARY_PERIODS.contains(&salary.period.as_str()) {
                    errors.add("salaryPeriod", "Période de salaire inconnue");
                }
            }
        }
        WizardStep::SkillsSchedule => {
            if draft.required_skills.iter().all(|s| s.trim().is_empty()) {
                errors.add("requiredSkills", "Indiquez au moins une compétence");
            }
            if draft.working_days.is_empty() {
                errors.add("workingDays", "Indiquez les jours travaillés");
            }
        }
        WizardStep::Review => {}
    }
    errors.into_result()
}

pub struct JobWizard {
    step: WizardStep,
    pub draft: JobDraft,
    pub errors: ValidationErrors,
    /// Plan id and subscription from the last approved checkout.
    paid: Option<(String, SubscriptionInfo)>,
}

impl Default for JobWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl JobWizard {
    pub fn new() -> Self {
        Self::with_draft(JobDraft::default())
    }

    pub fn with_draft(draft: JobDraft) -> Self {
        Self {
            step: WizardStep::GeneralInfo,
            draft,
            errors: ValidationErrors::new(),
            paid: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    fn check(&mut self, step: WizardStep) -> Result<(), WizardError> {
        match validate_step(step, &self.draft) {
            Ok(()) => {
                self.errors = ValidationErrors::new();
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(WizardError::Invalid { step, errors })
            }
        }
    }

    /// Advance once the current step is valid.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.check(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.errors = ValidationErrors::new();
        self.step
    }

    /// Stepper navigation: backwards always, forwards only over valid steps.
    pub fn go_to(&mut self, target: WizardStep) -> Result<WizardStep, WizardError> {
        if target > self.step {
            for step in WizardStep::ALL.into_iter().filter(|s| *s < target) {
                self.check(step)?;
            }
        }
        self.step = target;
        Ok(self.step)
    }

    pub fn validate_all(&mut self) -> Result<(), WizardError> {
        for step in WizardStep::ALL {
            self.check(step)?;
        }
        Ok(())
    }

    /// Pay for `plan`, then create the job with the subscription attached.
    /// A checkout already approved for the same plan is reused, so a retry
    /// after a failed create is not charged twice.
    pub async fn submit(
        &mut self,
        gateway: &dyn PaymentGateway,
        plan: &SubscriptionPlan,
        card: &CardDetails,
        jobs: &JobsApi<'_>,
    ) -> Result<Job, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotOnReview);
        }
        self.validate_all()?;

        let subscription = match &self.paid {
            Some((plan_id, subscription)) if *plan_id == plan.id => subscription.clone(),
            _ => {
                let receipt = gateway.checkout(plan, card).await?;
                info!(
                    "Plan {} paid (transaction {})",
                    receipt.plan_id, receipt.transaction_id
                );
                let subscription = SubscriptionInfo::from_receipt(&receipt, plan);
                self.paid = Some((plan.id.clone(), subscription.clone()));
                subscription
            }
        };

        let mut payload = self.draft.clone();
        payload.subscription = Some(subscription);
        payload.status = JobStatus::Active;

        let job = jobs.create(&payload).await?;
        info!("Job offer {} published", job.id);
        Ok(job)
    }
}
