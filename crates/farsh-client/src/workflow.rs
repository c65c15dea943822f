//! # Invoice Workflow
//!
//! Save Draft and Finalize, run against an [`InvoiceBackend`].
//!
//! ## Finalize Saga
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Finalize Saga                                   │
//! │                                                                         │
//! │  draft.validate_for_submit()  ── Err ──► abort, zero requests          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  1. Persist   server_id unset? ── POST invoices/ ── Err ──► abort      │
//! │      │                          └─ mark_saved(id)                       │
//! │      ▼                                                                  │
//! │  2. Finalize  POST invoices/{id}/finalize ── Err ──► abort             │
//! │      │        (stock decremented server-side)      finalized stays false│
//! │      ▼                                                                  │
//! │     mark_finalized()                                                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  3. Checks    for each effective check, sequentially:                   │
//! │               POST checks/ ── Err ──► record failure, continue          │
//! │                                                                         │
//! │  NO ROLLBACK: a failed check never undoes step 2 or earlier checks.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! If step 1 succeeds and step 2 fails, the draft keeps its `server_id`, so a
//! retry finalizes the same backend record instead of creating a second one.

use std::time::Duration;

use async_trait::async_trait;
use farsh_core::{CheckRecord, InvoiceDraft, Money, FINALIZE_REDIRECT_DELAY_MS};
use tracing::{debug, error, info, warn};

use crate::error::{fallback, ClientResult};
use crate::wire::{InvoicePayload, NewCheck};

// =============================================================================
// Backend Seam
// =============================================================================

/// The four backend calls the workflow needs.
#[async_trait]
pub trait InvoiceBackend: Send + Sync {
    /// Creates the invoice and returns its backend id.
    async fn create_invoice(&self, payload: &InvoicePayload) -> ClientResult<i64>;

    async fn update_invoice(&self, id: i64, payload: &InvoicePayload) -> ClientResult<()>;

    async fn finalize_invoice(&self, id: i64) -> ClientResult<()>;

    async fn create_check(&self, check: &NewCheck) -> ClientResult<CheckRecord>;
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a successful Save Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(i64),
    Updated(i64),
}

impl SaveOutcome {
    pub fn server_id(&self) -> i64 {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => *id,
        }
    }
}

/// The saga's steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStep {
    Persist,
    Finalize,
    RegisterChecks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    /// Nothing to do (already persisted, or no checks to register).
    Skipped,
    /// Completed with `failed` of `attempted` items failing.
    Partial { attempted: usize, failed: usize },
}

/// One check whose registration failed after the invoice was finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFailure {
    pub check_number: String,
    pub amount: Money,
    pub message: String,
}

/// Outcome of a Finalize that got past the finalize endpoint.
#[derive(Debug, Clone)]
pub struct FinalizeReport {
    pub invoice_id: i64,
    pub steps: Vec<(FinalizeStep, StepStatus)>,
    pub created_checks: Vec<CheckRecord>,
    pub check_failures: Vec<CheckFailure>,
    /// How long the success notice stays up before returning to the list.
    pub redirect_after: Duration,
}

impl FinalizeReport {
    /// True when every check was registered.
    pub fn is_complete(&self) -> bool {
        self.check_failures.is_empty()
    }

    pub fn status_of(&self, step: FinalizeStep) -> Option<&StepStatus> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, st)| st)
    }
}

// =============================================================================
// Workflow
// =============================================================================

/// Drives Save Draft and Finalize for one draft at a time.
pub struct InvoiceWorkflow<B> {
    backend: B,
}

impl<B: InvoiceBackend> InvoiceWorkflow<B> {
    pub fn new(backend: B) -> Self {
        InvoiceWorkflow { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Upserts the draft: create on first save, update afterwards.
    ///
    /// On failure the draft is left untouched.
    pub async fn save_draft(&self, draft: &mut InvoiceDraft) -> ClientResult<SaveOutcome> {
        draft.validate_for_submit()?;
        let payload = InvoicePayload::from(&*draft);

        let outcome = match draft.server_id() {
            Some(id) => {
                debug!(invoice_id = id, "Updating invoice draft");
                self.backend.update_invoice(id, &payload).await?;
                SaveOutcome::Updated(id)
            }
            None => {
                debug!(customer = %payload.customer_name, "Creating invoice draft");
                SaveOutcome::Created(self.backend.create_invoice(&payload).await?)
            }
        };

        draft.mark_saved(outcome.server_id())?;
        info!(invoice_id = outcome.server_id(), ?outcome, "Invoice draft saved");
        Ok(outcome)
    }

    /// Runs the finalize saga. See the module docs for the step order.
    ///
    /// Returns `Err` only when the invoice could not be finalized; per-check
    /// failures after that point are collected in the report.
    pub async fn finalize(&self, draft: &mut InvoiceDraft) -> ClientResult<FinalizeReport> {
        draft.validate_for_submit()?;
        let mut steps = Vec::with_capacity(3);

        // Step 1: persist
        let invoice_id = match draft.server_id() {
            Some(id) => {
                steps.push((FinalizeStep::Persist, StepStatus::Skipped));
                id
            }
            None => {
                let payload = InvoicePayload::from(&*draft);
                let id = self.backend.create_invoice(&payload).await.map_err(|e| {
                    error!(error = %e, "Finalize aborted: invoice could not be created");
                    e
                })?;
                draft.mark_saved(id)?;
                steps.push((FinalizeStep::Persist, StepStatus::Done));
                id
            }
        };

        // Step 2: finalize
        if let Err(e) = self.backend.finalize_invoice(invoice_id).await {
            error!(
                invoice_id,
                error = %e.user_message(fallback::FINALIZE),
                "Finalize aborted: finalize endpoint failed"
            );
            return Err(e);
        }
        draft.mark_finalized()?;
        steps.push((FinalizeStep::Finalize, StepStatus::Done));
        info!(invoice_id, "Invoice finalized");

        // Step 3: register checks
        let mut created_checks = Vec::new();
        let mut check_failures = Vec::new();
        let draft: &InvoiceDraft = draft;
        let checks = draft.checks();

        for check in checks {
            let request = NewCheck::for_invoice(draft, check, invoice_id);
            match self.backend.create_check(&request).await {
                Ok(record) => {
                    debug!(invoice_id, check_id = record.id, "Check registered");
                    created_checks.push(record);
                }
                Err(e) => {
                    let message = e.user_message(fallback::CHECK_CREATE);
                    warn!(
                        invoice_id,
                        check_number = %request.check_number,
                        error = %message,
                        "Check registration failed"
                    );
                    check_failures.push(CheckFailure {
                        check_number: request.check_number,
                        amount: request.amount,
                        message,
                    });
                }
            }
        }

        let checks_status = if checks.is_empty() {
            StepStatus::Skipped
        } else if check_failures.is_empty() {
            StepStatus::Done
        } else {
            StepStatus::Partial {
                attempted: checks.len(),
                failed: check_failures.len(),
            }
        };
        steps.push((FinalizeStep::RegisterChecks, checks_status));

        Ok(FinalizeReport {
            invoice_id,
            steps,
            created_checks,
            check_failures,
            redirect_after: Duration::from_millis(FINALIZE_REDIRECT_DELAY_MS),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use chrono::{NaiveDate, Utc};
    use farsh_core::{
        CheckDirection, CheckDraft, CheckStatus, CoreError, LineItem, PaymentMethod,
    };
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create,
        Update(i64),
        Finalize(i64),
        Check(String),
    }

    /// Records every call; fails the ones it is told to.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        fail_create: bool,
        fail_finalize: bool,
        failing_checks: Vec<String>,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn backend_error(status: u16) -> ClientError {
        ClientError::Backend {
            status,
            message: "boom".to_string(),
        }
    }

    #[async_trait]
    impl InvoiceBackend for RecordingBackend {
        async fn create_invoice(&self, _payload: &InvoicePayload) -> ClientResult<i64> {
            self.record(Call::Create);
            if self.fail_create {
                return Err(backend_error(500));
            }
            Ok(42)
        }

        async fn update_invoice(&self, id: i64, _payload: &InvoicePayload) -> ClientResult<()> {
            self.record(Call::Update(id));
            Ok(())
        }

        async fn finalize_invoice(&self, id: i64) -> ClientResult<()> {
            self.record(Call::Finalize(id));
            if self.fail_finalize {
                return Err(backend_error(404));
            }
            Ok(())
        }

        async fn create_check(&self, check: &NewCheck) -> ClientResult<CheckRecord> {
            self.record(Call::Check(check.check_number.clone()));
            if self.failing_checks.contains(&check.check_number) {
                return Err(backend_error(422));
            }
            let now = Utc::now().naive_utc();
            Ok(CheckRecord {
                id: 100,
                check_number: check.check_number.clone(),
                amount: check.amount,
                payee: check.payee.clone(),
                check_date: check.check_date.and_hms_opt(0, 0, 0).unwrap(),
                check_type: check.check_type,
                status: CheckStatus::NotRegistered,
                description: None,
                invoice_id: check.invoice_id,
                carpet_id: None,
                notification_sent: None,
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn ready_draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(today());
        draft.set_customer_name("Sara").unwrap();
        draft
            .add_line(LineItem::freeform("Tabriz", 2, Money::from_units(100_000)))
            .unwrap();
        draft
    }

    fn with_checks(numbers: &[&str]) -> InvoiceDraft {
        let mut draft = ready_draft();
        draft.set_payment_method(PaymentMethod::Check).unwrap();
        for n in numbers {
            draft
                .add_check(CheckDraft::new(*n, Money::from_units(50_000), today()))
                .unwrap();
        }
        draft
    }

    #[tokio::test]
    async fn test_save_draft_twice_updates_same_record() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = ready_draft();

        let first = workflow.save_draft(&mut draft).await.unwrap();
        let second = workflow.save_draft(&mut draft).await.unwrap();

        assert_eq!(first, SaveOutcome::Created(42));
        assert_eq!(second, SaveOutcome::Updated(42));
        assert_eq!(workflow.backend().calls(), vec![Call::Create, Call::Update(42)]);
        assert!(!draft.is_finalized());
    }

    #[tokio::test]
    async fn test_save_draft_without_customer_sends_nothing() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = InvoiceDraft::new(today());
        draft
            .add_line(LineItem::freeform("Tabriz", 1, Money::from_units(10)))
            .unwrap();

        let err = workflow.save_draft(&mut draft).await.unwrap_err();

        assert!(err.is_validation());
        assert!(workflow.backend().calls().is_empty());
        assert_eq!(draft.server_id(), None);
    }

    #[tokio::test]
    async fn test_save_draft_without_lines_sends_nothing() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = InvoiceDraft::new(today());
        draft.set_customer_name("Sara").unwrap();

        assert!(workflow.save_draft(&mut draft).await.unwrap_err().is_validation());
        assert!(workflow.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_leaves_draft_unsaved() {
        let backend = RecordingBackend {
            fail_create: true,
            ..Default::default()
        };
        let workflow = InvoiceWorkflow::new(backend);
        let mut draft = ready_draft();

        assert!(workflow.save_draft(&mut draft).await.is_err());
        assert_eq!(draft.server_id(), None);
    }

    #[tokio::test]
    async fn test_finalize_creates_then_finalizes_then_registers_checks() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = with_checks(&["A1", "A2"]);

        let report = workflow.finalize(&mut draft).await.unwrap();

        assert_eq!(
            workflow.backend().calls(),
            vec![
                Call::Create,
                Call::Finalize(42),
                Call::Check("A1".into()),
                Call::Check("A2".into()),
            ]
        );
        assert!(draft.is_finalized());
        assert!(report.is_complete());
        assert_eq!(report.created_checks.len(), 2);
        assert!(report
            .created_checks
            .iter()
            .all(|c| c.check_type == CheckDirection::Incoming && c.invoice_id == Some(42)));
        assert_eq!(report.status_of(FinalizeStep::Persist), Some(&StepStatus::Done));
        assert_eq!(report.redirect_after, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_finalize_reuses_saved_id() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = ready_draft();
        draft.mark_saved(7).unwrap();

        let report = workflow.finalize(&mut draft).await.unwrap();

        assert_eq!(workflow.backend().calls(), vec![Call::Finalize(7)]);
        assert_eq!(report.invoice_id, 7);
        assert_eq!(report.status_of(FinalizeStep::Persist), Some(&StepStatus::Skipped));
        assert_eq!(
            report.status_of(FinalizeStep::RegisterChecks),
            Some(&StepStatus::Skipped)
        );
    }

    #[tokio::test]
    async fn test_second_finalize_is_rejected_without_request() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = ready_draft();
        workflow.finalize(&mut draft).await.unwrap();
        let calls_before = workflow.backend().calls().len();

        let err = workflow.finalize(&mut draft).await.unwrap_err();

        assert!(matches!(err, ClientError::Core(CoreError::DraftFinalized)));
        assert_eq!(workflow.backend().calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_finalize_failure_issues_no_checks() {
        let backend = RecordingBackend {
            fail_finalize: true,
            ..Default::default()
        };
        let workflow = InvoiceWorkflow::new(backend);
        let mut draft = with_checks(&["A1"]);

        assert!(workflow.finalize(&mut draft).await.is_err());

        assert_eq!(workflow.backend().calls(), vec![Call::Create, Call::Finalize(42)]);
        assert!(!draft.is_finalized());
        // Kept so a retry does not create a duplicate invoice.
        assert_eq!(draft.server_id(), Some(42));
    }

    #[tokio::test]
    async fn test_single_check_failure_is_reported_after_finalize() {
        let backend = RecordingBackend {
            failing_checks: vec!["A1".into()],
            ..Default::default()
        };
        let workflow = InvoiceWorkflow::new(backend);
        let mut draft = with_checks(&["A1"]);

        let report = workflow.finalize(&mut draft).await.unwrap();

        assert!(draft.is_finalized());
        assert_eq!(report.check_failures.len(), 1);
        assert_eq!(report.check_failures[0].check_number, "A1");
        assert_eq!(report.check_failures[0].message, "boom");
        assert_eq!(
            report.status_of(FinalizeStep::RegisterChecks),
            Some(&StepStatus::Partial {
                attempted: 1,
                failed: 1
            })
        );
    }

    #[tokio::test]
    async fn test_check_failure_does_not_stop_later_checks() {
        let backend = RecordingBackend {
            failing_checks: vec!["A2".into()],
            ..Default::default()
        };
        let workflow = InvoiceWorkflow::new(backend);
        let mut draft = with_checks(&["A1", "A2", "A3"]);

        let report = workflow.finalize(&mut draft).await.unwrap();

        assert_eq!(report.created_checks.len(), 2);
        assert_eq!(report.check_failures.len(), 1);
        assert_eq!(workflow.backend().calls().len(), 5);
    }

    #[tokio::test]
    async fn test_checks_under_cash_payment_are_refused_before_any_request() {
        let workflow = InvoiceWorkflow::new(RecordingBackend::default());
        let mut draft = with_checks(&["A1"]);
        draft.set_payment_method(PaymentMethod::Cash).unwrap();

        let err = workflow.finalize(&mut draft).await.unwrap_err();

        assert!(err.is_validation());
        assert!(!draft.is_finalized());
        assert!(workflow.backend().calls().is_empty());
    }
}
