use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::Context;
use crate::cli::ValidateArgs;
use crate::output::validation::print_validation_tree;
use crate::validator::{CertField, ValidationReport, Validator};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    pub field: CertField,
    pub value: String,
    pub ok: bool,
    pub report: ValidationReport,
}

/// Ask the validator about one field value.
pub async fn run(ctx: &Context, args: ValidateArgs) -> Result<()> {
    let validator = ctx.validator()?;
    let report = validator.validate(args.field, &args.value).await?;
    let result = ValidationResult {
        field: args.field,
        value: args.value,
        ok: report.ok(),
        report,
    };
    ctx.output
        .emit(&result, |r| print_validation_tree(r.field, &r.value, &r.report))
}
