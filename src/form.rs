//! Certificate form controller.
//!
//! Holds the per-field input state, the latest record snapshot for the
//! entered domain and the transaction status. Every asynchronous result is
//! applied through a ticket so that responses to superseded requests are
//! dropped instead of overwriting newer state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::certificate::CertificateRecord;
use crate::tx::{Call, TransactionStatus};
use crate::validator::{CertField, ValidationError, ValidationReport};

pub const PALLET: &str = "siipModule";

/// Form mode, derived from the record snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormMode {
    /// Waiting for the first record snapshot of the current domain
    Lookup,
    Register,
    Modify,
    Delete,
}

impl FormMode {
    /// Extrinsic called when submitting in this mode.
    pub fn callable(self) -> Option<&'static str> {
        match self {
            FormMode::Lookup => None,
            FormMode::Register => Some("registerCertificate"),
            FormMode::Modify => Some("modifyCertificate"),
            FormMode::Delete => Some("removeCertificate"),
        }
    }
}

/// Validation state of a single field
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStatus {
    #[default]
    Unchecked,
    Pending,
    Checked(ValidationReport),
    /// The validator could not be asked.
    Unknown(String),
}

impl FieldStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FieldStatus::Checked(report) if report.ok())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub seq: u64,
    pub status: FieldStatus,
}

/// Identifies one validation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationTicket {
    pub field: CertField,
    pub seq: u64,
    pub value: String,
}

/// Identifies one record lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTicket {
    pub generation: u64,
    /// Storage key domain: trimmed and lowercased like the pallet stores it.
    pub domain: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum RecordView {
    #[default]
    Unknown,
    Absent,
    Present(CertificateRecord),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("{0:?} is not available while the form is in {1:?} mode")]
    ModeUnavailable(FormMode, FormMode),

    #[error("a transaction is already in flight")]
    InFlight,

    #[error("fields not validated: {}", .0.iter().map(|f| f.label()).collect::<Vec<_>>().join(", "))]
    Invalid(Vec<CertField>),
}

#[derive(Clone, Debug)]
pub struct CertificateForm {
    fields: BTreeMap<CertField, FieldState>,
    include_email: bool,
    generation: u64,
    record: RecordView,
    tx_status: TransactionStatus,
}

impl CertificateForm {
    /// `include_email` selects the call signature with a trailing email.
    pub fn new(include_email: bool) -> Self {
        Self {
            fields: CertField::ALL.iter().map(|f| (*f, FieldState::default())).collect(),
            include_email,
            generation: 0,
            record: RecordView::Unknown,
            tx_status: TransactionStatus::Idle,
        }
    }

    fn field_mut(&mut self, field: CertField) -> &mut FieldState {
        self.fields.entry(field).or_default()
    }

    fn next_ticket(&mut self, field: CertField, value: &str) -> ValidationTicket {
        let state = self.field_mut(field);
        state.value = value.to_string();
        state.seq += 1;
        state.status = FieldStatus::Pending;
        ValidationTicket {
            field,
            seq: state.seq,
            value: value.to_string(),
        }
    }

    /// Enter a new domain. The record snapshot is cleared until the returned
    /// query delivers.
    pub fn set_domain(&mut self, value: &str) -> (QueryTicket, ValidationTicket) {
        let ticket = self.next_ticket(CertField::Domain, value);
        self.generation += 1;
        self.record = RecordView::Unknown;
        let query = QueryTicket {
            generation: self.generation,
            domain: value.trim().to_lowercase(),
        };
        (query, ticket)
    }

    /// Edit a field. Editing the domain goes through [`set_domain`](Self::set_domain).
    pub fn edit(&mut self, field: CertField, value: &str) -> ValidationTicket {
        if field == CertField::Domain {
            return self.set_domain(value).1;
        }
        self.next_ticket(field, value)
    }

    /// Apply a validator response. Returns false when the ticket is stale.
    pub fn apply_validation(
        &mut self,
        ticket: &ValidationTicket,
        result: Result<ValidationReport, ValidationError>,
    ) -> bool {
        let state = self.field_mut(ticket.field);
        if state.seq != ticket.seq {
            tracing::debug!(
                "dropping stale validation of {} (seq {} < {})",
                ticket.field.method(),
                ticket.seq,
                state.seq
            );
            return false;
        }
        state.status = match result {
            Ok(report) => FieldStatus::Checked(report),
            Err(e) => FieldStatus::Unknown(e.to_string()),
        };
        true
    }

    /// Apply a record snapshot. Returns false when the ticket is stale or the
    /// snapshot repeats the current one.
    pub fn apply_record(&mut self, ticket: &QueryTicket, record: Option<CertificateRecord>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("dropping record for superseded domain {}", ticket.domain);
            return false;
        }
        let view = match record {
            Some(r) if r.exists() => RecordView::Present(r),
            _ => RecordView::Absent,
        };
        if view == self.record {
            return false;
        }
        self.record = view;
        true
    }

    pub fn mode(&self) -> FormMode {
        match self.record {
            RecordView::Unknown => FormMode::Lookup,
            RecordView::Absent => FormMode::Register,
            RecordView::Present(_) => FormMode::Modify,
        }
    }

    /// Submit modes offered in the current mode.
    pub fn available_actions(&self) -> Vec<FormMode> {
        match self.mode() {
            FormMode::Register => vec![FormMode::Register],
            FormMode::Modify => vec![FormMode::Modify, FormMode::Delete],
            FormMode::Lookup | FormMode::Delete => Vec::new(),
        }
    }

    /// Existing registration, if any.
    pub fn record(&self) -> Option<&CertificateRecord> {
        match &self.record {
            RecordView::Present(r) => Some(r),
            _ => None,
        }
    }

    pub fn value(&self, field: CertField) -> &str {
        self.fields.get(&field).map(|s| s.value.as_str()).unwrap_or("")
    }

    /// Registered value when a record exists, otherwise the entered value.
    pub fn display_value(&self, field: CertField) -> &str {
        match (field, self.record()) {
            (CertField::Domain, _) | (_, None) => self.value(field),
            (_, Some(record)) => record.field(field),
        }
    }

    pub fn status(&self, field: CertField) -> &FieldStatus {
        static UNCHECKED: FieldStatus = FieldStatus::Unchecked;
        self.fields.get(&field).map(|s| &s.status).unwrap_or(&UNCHECKED)
    }

    pub fn tx_status(&self) -> &TransactionStatus {
        &self.tx_status
    }

    pub fn required_fields(&self, action: FormMode) -> Vec<CertField> {
        match action {
            FormMode::Register | FormMode::Modify => {
                let mut fields = vec![
                    CertField::Domain,
                    CertField::OwnerName,
                    CertField::IpAddr,
                    CertField::Info,
                    CertField::PublicKey,
                ];
                if self.include_email {
                    fields.push(CertField::Email);
                }
                fields
            }
            FormMode::Delete => vec![CertField::Domain],
            FormMode::Lookup => Vec::new(),
        }
    }

    /// Required fields of `action` that do not report ok.
    pub fn blocking_fields(&self, action: FormMode) -> Vec<CertField> {
        self.required_fields(action)
            .into_iter()
            .filter(|f| !self.status(*f).is_ok())
            .collect()
    }

    fn check_submit(&self, action: FormMode) -> Result<(), FormError> {
        if !self.available_actions().contains(&action) {
            return Err(FormError::ModeUnavailable(action, self.mode()));
        }
        if self.tx_status.is_in_flight() {
            return Err(FormError::InFlight);
        }
        let blocking = self.blocking_fields(action);
        if !blocking.is_empty() {
            return Err(FormError::Invalid(blocking));
        }
        Ok(())
    }

    pub fn can_submit(&self, action: FormMode) -> bool {
        self.check_submit(action).is_ok()
    }

    /// Map the field values onto the positional arguments of `action`'s call.
    pub fn build_call(&self, action: FormMode) -> Result<Call, FormError> {
        let callable = action
            .callable()
            .ok_or(FormError::ModeUnavailable(action, self.mode()))?;
        let call = Call::new(PALLET, callable);
        let call = match action {
            FormMode::Register | FormMode::Modify => {
                let call = call
                    .arg("name", self.value(CertField::OwnerName))
                    .arg("domain", self.value(CertField::Domain))
                    .arg("ip_addr", self.value(CertField::IpAddr))
                    .arg("info", self.value(CertField::Info))
                    .arg("key", self.value(CertField::PublicKey));
                if self.include_email {
                    call.arg("email", self.value(CertField::Email))
                } else {
                    call
                }
            }
            _ => call.arg("domain", self.value(CertField::Domain)),
        };
        Ok(call)
    }

    /// Check that `action` may be submitted, mark the form as sending and
    /// return the call to hand to the submitter.
    pub fn begin_submit(&mut self, action: FormMode) -> Result<Call, FormError> {
        self.check_submit(action)?;
        let call = self.build_call(action)?;
        self.tx_status = TransactionStatus::Sending;
        Ok(call)
    }

    pub fn on_tx_status(&mut self, status: TransactionStatus) {
        self.tx_status = status;
    }
}
