use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use super::Context;
use crate::chain::ChainQuery;
use crate::cli::{CertificateArgs, RemoveArgs};
use crate::form::{FieldStatus, FormMode};
use crate::output::progress::get_spinner_style;
use crate::output::tx::{print_submission_tree, SubmissionReport};
use crate::session::{FormEvent, FormSession};
use crate::tx::{DryRunSubmitter, TransactionStatus};
use crate::validator::{CertField, Validator};

pub async fn register(ctx: &Context, args: CertificateArgs) -> Result<()> {
    submit_form(ctx, FormMode::Register, &args.domain, Some(&args)).await
}

pub async fn modify(ctx: &Context, args: CertificateArgs) -> Result<()> {
    submit_form(ctx, FormMode::Modify, &args.domain, Some(&args)).await
}

pub async fn remove(ctx: &Context, args: RemoveArgs) -> Result<()> {
    submit_form(ctx, FormMode::Delete, &args.domain, None).await
}

fn log_events(events: &mut UnboundedReceiver<FormEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            FormEvent::Validated(field, FieldStatus::Unknown(reason)) => {
                tracing::warn!("{} could not be validated: {}", field, reason)
            }
            FormEvent::Validated(field, FieldStatus::Checked(report)) if !report.ok() => {
                for criterion in report.failures() {
                    tracing::warn!("{}: {}", field, criterion.message);
                }
            }
            FormEvent::Validated(field, status) => {
                tracing::debug!("{} validated: ok={}", field, status.is_ok())
            }
            FormEvent::ModeChanged(mode) => tracing::debug!("form mode: {:?}", mode),
            FormEvent::QueryFailed(reason) => tracing::error!("Certificate query failed: {}", reason),
            FormEvent::Transaction(status) => tracing::info!("{}", status),
        }
    }
}

/// Drive a form session through entry, validation and submission of `action`.
async fn submit_form(
    ctx: &Context,
    action: FormMode,
    domain: &str,
    values: Option<&CertificateArgs>,
) -> Result<()> {
    let validator: Arc<dyn Validator> = ctx.validator()?;
    let query: Arc<dyn ChainQuery> = ctx.chain()?;
    let (mut session, mut events) = FormSession::new(validator, query, ctx.config.session_setting());

    session.set_domain(domain);
    if let Some(args) = values {
        session.edit(CertField::OwnerName, &args.name);
        session.edit(CertField::IpAddr, &args.ip);
        session.edit(CertField::Info, &args.info);
        session.edit(CertField::PublicKey, &args.key);
        if ctx.config.include_email {
            session.edit(CertField::Email, args.email.as_deref().unwrap_or_default());
        } else if args.email.is_some() {
            tracing::warn!("--email is ignored unless --with-email is set");
        }
    }

    let header_span = tracing::info_span!("certificate_form");
    header_span.pb_set_style(&get_spinner_style());
    header_span.pb_set_message(&format!("Checking {}", domain));
    header_span.pb_start();
    let settled = session.settle(ctx.config.settle_timeout()).await;
    drop(header_span);
    log_events(&mut events);
    settled?;

    if action == FormMode::Modify {
        session.with_form(|form| {
            for field in form.required_fields(action) {
                let (current, entered) = (form.display_value(field), form.value(field));
                if current != entered {
                    tracing::info!("{}: {} -> {}", field, current, entered);
                }
            }
        });
    }

    let signer = ctx.config.signer.clone();
    let submitted = session.submit(action, &DryRunSubmitter, &signer).await;
    log_events(&mut events);

    let report = session.with_form(|form| SubmissionReport::from_form(form, action, &signer));
    ctx.output.emit(&report, print_submission_tree)?;

    match submitted? {
        TransactionStatus::Failed(reason) => anyhow::bail!("transaction failed: {}", reason),
        _ => Ok(()),
    }
}
