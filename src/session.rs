//! Asynchronous driver around [`CertificateForm`].
//!
//! Validations run as independent tasks, one per field. Editing a field
//! again aborts its in-flight task and the ticket check in the form drops
//! anything that still slips through. The record subscription for the
//! current domain is owned here and released on domain change or drop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::chain::{subscribe_certificate, ChainQuery, Snapshot};
use crate::form::{CertificateForm, FieldStatus, FormMode, ValidationTicket};
use crate::tx::{follow, TransactionStatus, TransactionSubmitter};
use crate::validator::{CertField, Validator};

/// Timing knobs of a form session
#[derive(Clone, Debug)]
pub struct SessionSetting {
    /// Quiet period after an edit before the validator is called
    pub debounce: Duration,
    /// Record subscription poll interval
    pub poll_interval: Duration,
    pub include_email: bool,
}

impl Default for SessionSetting {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(crate::config::default::DEFAULT_DEBOUNCE_MS),
            poll_interval: Duration::from_millis(crate::config::default::DEFAULT_POLL_INTERVAL_MS),
            include_email: false,
        }
    }
}

/// Change notifications emitted by a session.
#[derive(Clone, Debug, PartialEq)]
pub enum FormEvent {
    Validated(CertField, FieldStatus),
    ModeChanged(FormMode),
    QueryFailed(String),
    Transaction(TransactionStatus),
}

pub struct FormSession {
    form: Arc<Mutex<CertificateForm>>,
    validator: Arc<dyn Validator>,
    query: Arc<dyn ChainQuery>,
    setting: SessionSetting,
    pending: HashMap<CertField, JoinHandle<()>>,
    watcher: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<FormEvent>,
    mode_tx: watch::Sender<FormMode>,
}

impl FormSession {
    pub fn new(
        validator: Arc<dyn Validator>,
        query: Arc<dyn ChainQuery>,
        setting: SessionSetting,
    ) -> (Self, mpsc::UnboundedReceiver<FormEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let (mode_tx, _) = watch::channel(FormMode::Lookup);
        let session = Self {
            form: Arc::new(Mutex::new(CertificateForm::new(setting.include_email))),
            validator,
            query,
            setting,
            pending: HashMap::new(),
            watcher: None,
            events,
            mode_tx,
        };
        (session, rx)
    }

    /// Run `f` against the current form state.
    pub fn with_form<R>(&self, f: impl FnOnce(&CertificateForm) -> R) -> R {
        f(&self.form.lock())
    }

    pub fn mode(&self) -> FormMode {
        self.form.lock().mode()
    }

    /// Enter a domain: validate it and (re)subscribe to its record.
    pub fn set_domain(&mut self, domain: &str) {
        // mode updates happen under the form lock so they stay ordered with apply_record
        let (query_ticket, ticket) = {
            let mut form = self.form.lock();
            let tickets = form.set_domain(domain);
            self.mode_tx.send_replace(FormMode::Lookup);
            tickets
        };

        // dropping the old watcher drops its subscription, which stops polling
        if let Some(old) = self.watcher.take() {
            old.abort();
        }
        let mut subscription = subscribe_certificate(
            self.query.clone(),
            query_ticket.domain.clone(),
            self.setting.poll_interval,
        );
        let form = self.form.clone();
        let events = self.events.clone();
        let mode_tx = self.mode_tx.clone();
        self.watcher = Some(tokio::spawn(async move {
            while let Some(snapshot) = subscription.recv().await {
                match snapshot {
                    Snapshot::Record(record) => {
                        let mode = {
                            let mut form = form.lock();
                            if !form.apply_record(&query_ticket, record) {
                                continue;
                            }
                            let mode = form.mode();
                            mode_tx.send_replace(mode);
                            mode
                        };
                        tracing::debug!("{} is now in {:?} mode", query_ticket.domain, mode);
                        let _ = events.send(FormEvent::ModeChanged(mode));
                    }
                    Snapshot::Failed(reason) => {
                        let _ = events.send(FormEvent::QueryFailed(reason));
                    }
                }
            }
        }));

        self.dispatch(ticket);
    }

    /// Edit a field and schedule its validation.
    pub fn edit(&mut self, field: CertField, value: &str) {
        if field == CertField::Domain {
            self.set_domain(value);
            return;
        }
        let ticket = self.form.lock().edit(field, value);
        self.dispatch(ticket);
    }

    fn dispatch(&mut self, ticket: ValidationTicket) {
        if let Some(previous) = self.pending.remove(&ticket.field) {
            previous.abort();
        }
        let field = ticket.field;
        let form = self.form.clone();
        let validator = self.validator.clone();
        let events = self.events.clone();
        let debounce = self.setting.debounce;
        let handle = tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            let result = validator.validate(ticket.field, &ticket.value).await;
            if let Err(e) = &result {
                tracing::warn!("validation of {} failed: {}", ticket.field, e);
            }
            let status = {
                let mut form = form.lock();
                if !form.apply_validation(&ticket, result) {
                    return;
                }
                form.status(ticket.field).clone()
            };
            let _ = events.send(FormEvent::Validated(ticket.field, status));
        });
        self.pending.insert(field, handle);
    }

    /// Wait until every scheduled validation finished and the record of the
    /// current domain arrived, or `timeout` elapsed.
    pub async fn settle(&mut self, timeout: Duration) -> Result<()> {
        let pending: Vec<_> = self.pending.drain().map(|(_, h)| h).collect();
        let mut mode_rx = self.mode_tx.subscribe();
        let has_domain = self.watcher.is_some();
        let wait = async move {
            for handle in pending {
                // a cancelled task was superseded by a newer one that is also awaited
                let _ = handle.await;
            }
            if has_domain {
                // the channel mirrors form.mode(): both only change under the form lock
                mode_rx.wait_for(|mode| *mode != FormMode::Lookup).await?;
            }
            anyhow::Ok(())
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| anyhow::anyhow!("timed out waiting for validator and chain responses"))??;
        Ok(())
    }

    /// Submit `action` through `submitter` and follow it to a terminal status.
    pub async fn submit(
        &mut self,
        action: FormMode,
        submitter: &dyn TransactionSubmitter,
        signer: &str,
    ) -> Result<TransactionStatus> {
        let call = self.form.lock().begin_submit(action)?;
        tracing::info!("submitting {}", call);

        let rx = match submitter.submit(call, signer).await {
            Ok(rx) => rx,
            Err(e) => {
                let failed = TransactionStatus::Failed(e.to_string());
                self.form.lock().on_tx_status(failed.clone());
                let _ = self.events.send(FormEvent::Transaction(failed.clone()));
                return Ok(failed);
            }
        };

        let form = self.form.clone();
        let events = self.events.clone();
        let last = follow(rx, |status| {
            form.lock().on_tx_status(status.clone());
            let _ = events.send(FormEvent::Transaction(status.clone()));
        })
        .await;
        Ok(last)
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::{record, MemoryChain};
    use crate::rpc::RpcError;
    use crate::tx::{Call, DryRunSubmitter, SubmitError};
    use crate::validator::{ValidationError, ValidationReport};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Validator whose latency depends on the value: values starting with
    /// "slow" take a second. "down" fails like an unreachable endpoint.
    #[derive(Default)]
    struct ScriptedValidator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Validator for ScriptedValidator {
        async fn validate(&self, field: CertField, value: &str) -> Result<ValidationReport, ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if value.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(1)).await;
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            if value == "down" {
                return Err(ValidationError::Rpc(RpcError::MissingResult(field.method().into())));
            }
            if value.contains("bad") {
                Ok(ValidationReport::parse(&format!("Err: {} is invalid", field.label())))
            } else {
                Ok(ValidationReport::parse(&format!("Ok: {} looks good", field.label())))
            }
        }
    }

    struct RejectingSubmitter;

    #[async_trait]
    impl TransactionSubmitter for RejectingSubmitter {
        async fn submit(&self, _call: Call, _signer: &str) -> Result<mpsc::Receiver<TransactionStatus>, SubmitError> {
            Err(SubmitError::Rejected("1010: Invalid Transaction".into()))
        }
    }

    fn setting() -> SessionSetting {
        SessionSetting {
            debounce: Duration::from_millis(50),
            poll_interval: Duration::from_millis(100),
            include_email: false,
        }
    }

    fn session(chain: Arc<MemoryChain>) -> (FormSession, Arc<ScriptedValidator>) {
        let validator = Arc::new(ScriptedValidator::default());
        let (session, _events) = FormSession::new(validator.clone(), chain, setting());
        (session, validator)
    }

    fn fill(session: &mut FormSession, domain: &str) {
        session.set_domain(domain);
        session.edit(CertField::OwnerName, "John Smith");
        session.edit(CertField::IpAddr, "192.168.0.1");
        session.edit(CertField::Info, "{}");
        session.edit(CertField::PublicKey, "04:EB:9A:AF");
    }

    #[tokio::test(start_paused = true)]
    async fn register_flow_reaches_finalized() {
        let chain = Arc::new(MemoryChain::default());
        let (mut session, _) = session(chain);
        fill(&mut session, "website.com");
        session.settle(Duration::from_secs(5)).await.unwrap();

        assert_eq!(session.mode(), FormMode::Register);
        assert!(session.with_form(|f| f.can_submit(FormMode::Register)));

        let status = session
            .submit(FormMode::Register, &DryRunSubmitter, "//Alice")
            .await
            .unwrap();
        assert!(matches!(status, TransactionStatus::Finalized(_)));
        assert_eq!(session.with_form(|f| f.tx_status().clone()), status);
    }

    #[tokio::test(start_paused = true)]
    async fn existing_record_switches_to_modify() {
        let chain = Arc::new(MemoryChain::default());
        chain.insert(record("website.com", "10.0.0.1"));
        let (mut session, _) = session(chain);
        fill(&mut session, "WEBSITE.com");
        session.settle(Duration::from_secs(5)).await.unwrap();

        assert_eq!(session.mode(), FormMode::Modify);
        assert!(!session.with_form(|f| f.can_submit(FormMode::Register)));
        assert!(session.with_form(|f| f.can_submit(FormMode::Delete)));
        assert_eq!(
            session.with_form(|f| f.display_value(CertField::IpAddr).to_string()),
            "10.0.0.1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn later_edit_wins_over_slow_earlier_validation() {
        let chain = Arc::new(MemoryChain::default());
        let (mut session, validator) = session(chain);
        session.edit(CertField::OwnerName, "slow bad name");
        // let the first request reach the validator before superseding it
        tokio::time::sleep(Duration::from_millis(60)).await;
        session.edit(CertField::OwnerName, "John Smith");
        session.settle(Duration::from_secs(5)).await.unwrap();
        // give the aborted request's deadline time to pass
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(validator.calls.load(Ordering::SeqCst), 2);
        session.with_form(|f| {
            assert_eq!(f.value(CertField::OwnerName), "John Smith");
            assert!(f.status(CertField::OwnerName).is_ok());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn edits_within_debounce_window_validate_once() {
        let chain = Arc::new(MemoryChain::default());
        let (mut session, validator) = session(chain);
        for prefix in ["J", "Jo", "Joh", "John"] {
            session.edit(CertField::OwnerName, prefix);
        }
        session.settle(Duration::from_secs(5)).await.unwrap();
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_validator_is_visible() {
        let chain = Arc::new(MemoryChain::default());
        let validator = Arc::new(ScriptedValidator::default());
        let (mut session, mut events) = FormSession::new(validator, chain, setting());
        fill(&mut session, "website.com");
        session.edit(CertField::Info, "down");
        session.settle(Duration::from_secs(5)).await.unwrap();

        session.with_form(|f| {
            assert!(matches!(f.status(CertField::Info), FieldStatus::Unknown(_)));
            assert_eq!(f.blocking_fields(FormMode::Register), vec![CertField::Info]);
        });
        let mut saw_unknown = false;
        while let Ok(event) = events.try_recv() {
            if let FormEvent::Validated(CertField::Info, FieldStatus::Unknown(_)) = event {
                saw_unknown = true;
            }
        }
        assert!(saw_unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn changing_domain_ignores_previous_record() {
        let chain = Arc::new(MemoryChain::default());
        chain.insert(record("taken.com", "10.0.0.1"));
        let (mut session, _) = session(chain.clone());
        session.set_domain("taken.com");
        session.set_domain("free.com");
        session.settle(Duration::from_secs(5)).await.unwrap();
        assert_eq!(session.mode(), FormMode::Register);

        // registration appearing on chain later flips the mode
        chain.insert(record("free.com", "10.0.0.2"));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(session.mode(), FormMode::Modify);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_mode_matches_form_after_domain_change() {
        let chain = Arc::new(MemoryChain::default());
        chain.insert(record("taken.com", "10.0.0.1"));
        let (mut session, _) = session(chain);
        session.set_domain("taken.com");
        session.settle(Duration::from_secs(5)).await.unwrap();
        assert_eq!(*session.mode_tx.borrow(), FormMode::Modify);

        session.set_domain("free.com");
        assert_eq!(*session.mode_tx.borrow(), FormMode::Lookup);
        assert_eq!(session.mode(), FormMode::Lookup);
        session.settle(Duration::from_secs(5)).await.unwrap();
        assert_eq!(session.mode(), FormMode::Register);
        assert_eq!(*session.mode_tx.borrow(), session.mode());
    }

    #[tokio::test(start_paused = true)]
    async fn domain_change_and_drop_release_the_poller() {
        let chain = Arc::new(MemoryChain::default());
        let (mut session, _) = session(chain.clone());
        session.set_domain("old.com");
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(chain.reads_of("old.com") > 0);

        session.set_domain("new.com");
        tokio::task::yield_now().await;
        let old_reads = chain.reads_of("old.com");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(chain.reads_of("old.com"), old_reads);
        assert!(chain.reads_of("new.com") > 0);

        drop(session);
        tokio::task::yield_now().await;
        let new_reads = chain.reads_of("new.com");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(chain.reads_of("new.com"), new_reads);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_reports_each_transition_once() {
        let chain = Arc::new(MemoryChain::default());
        let validator = Arc::new(ScriptedValidator::default());
        let (mut session, mut events) = FormSession::new(validator, chain, setting());
        fill(&mut session, "website.com");
        session.settle(Duration::from_secs(5)).await.unwrap();
        session
            .submit(FormMode::Register, &DryRunSubmitter, "//Alice")
            .await
            .unwrap();

        let mut transitions = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let FormEvent::Transaction(status) = event {
                transitions.push(status);
            }
        }
        assert_eq!(transitions.len(), 3);
        assert_eq!(transitions[0], TransactionStatus::Sending);
        assert!(matches!(transitions[1], TransactionStatus::InBlock(_)));
        assert!(matches!(transitions[2], TransactionStatus::Finalized(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submission_is_reported() {
        let chain = Arc::new(MemoryChain::default());
        let (mut session, _) = session(chain);
        fill(&mut session, "website.com");
        session.settle(Duration::from_secs(5)).await.unwrap();
        let status = session
            .submit(FormMode::Register, &RejectingSubmitter, "//Alice")
            .await
            .unwrap();
        assert!(matches!(status, TransactionStatus::Failed(_)));
        // a failed attempt may be retried
        assert!(session.with_form(|f| f.can_submit(FormMode::Register)));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_field_blocks_submission() {
        let chain = Arc::new(MemoryChain::default());
        let (mut session, _) = session(chain);
        fill(&mut session, "website.com");
        session.edit(CertField::PublicKey, "bad key");
        session.settle(Duration::from_secs(5)).await.unwrap();
        let err = session
            .submit(FormMode::Register, &DryRunSubmitter, "//Alice")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Public Key"));
    }
}
