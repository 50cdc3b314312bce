use serde::{Deserialize, Serialize};
use termtree::Tree;

use crate::form::{CertificateForm, FieldStatus, FormMode};
use crate::output::tree_label;
use crate::output::validation::status_node;
use crate::tx::{Call, TransactionStatus};

/// Input value reported alongside a submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldReport {
    pub name: String,
    pub value: String,
    pub status: FieldStatus,
}

impl FieldReport {
    pub fn new(name: &str, value: &str, status: FieldStatus) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            status,
        }
    }
}

/// Outcome of a submission attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// Composed call, absent when the input could not form one
    pub call: Option<Call>,
    pub signer: String,
    pub fields: Vec<FieldReport>,
    pub status: TransactionStatus,
}

impl SubmissionReport {
    /// Report on `action` from the current state of a certificate form.
    pub fn from_form(form: &CertificateForm, action: FormMode, signer: &str) -> Self {
        let fields = form
            .required_fields(action)
            .into_iter()
            .map(|field| FieldReport::new(field.label(), form.value(field), form.status(field).clone()))
            .collect();
        Self {
            call: form.build_call(action).ok(),
            signer: signer.to_string(),
            fields,
            status: form.tx_status().clone(),
        }
    }

    pub fn fields_ok(&self) -> bool {
        self.fields.iter().all(|f| f.status.is_ok())
    }
}

/// Print a submission report in a tree structure.
pub fn print_submission_tree(report: &SubmissionReport) {
    let title = match &report.call {
        Some(call) => call.to_string(),
        None => tree_label("(no call)"),
    };
    let mut root = Tree::new(title);

    if !report.fields.is_empty() {
        let mut inputs = Tree::new(tree_label("Inputs"));
        for field in &report.fields {
            inputs.push(status_node(&field.name, &field.value, &field.status));
        }
        root.push(inputs);
    }
    root.push(Tree::new(format!("Signer: {}", report.signer)));
    root.push(Tree::new(format!("Status: {}", report.status)));

    println!("{}", root);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{CertField, ValidationReport};

    #[test]
    fn report_lists_required_fields_of_action() {
        let mut form = CertificateForm::new(false);
        let (_, ticket) = form.set_domain("example.com");
        form.apply_validation(&ticket, Ok(ValidationReport::parse("Ok: fine")));

        let report = SubmissionReport::from_form(&form, FormMode::Delete, "//Alice");
        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].name, CertField::Domain.label());
        assert!(report.fields_ok());
        assert_eq!(report.call.map(|c| c.to_string()).as_deref(), Some("siipModule.removeCertificate(domain)"));

        let report = SubmissionReport::from_form(&form, FormMode::Register, "//Alice");
        assert_eq!(report.fields.len(), 5);
        assert!(!report.fields_ok());
    }
}
