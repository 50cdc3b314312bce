use termtree::Tree;

use crate::form::FieldStatus;
use crate::output::tree_label;
use crate::validator::{CertField, ValidationReport};

fn criteria_nodes(node: &mut Tree<String>, report: &ValidationReport) {
    for criterion in &report.criteria {
        let mark = if criterion.ok { "ok" } else { "failed" };
        node.push(Tree::new(format!("[{}] {}", mark, criterion.message)));
    }
}

/// Tree node for one input value and its validation state.
pub fn status_node(name: &str, value: &str, status: &FieldStatus) -> Tree<String> {
    let state = match status {
        FieldStatus::Unchecked => "unchecked".to_string(),
        FieldStatus::Pending => "pending".to_string(),
        FieldStatus::Checked(report) if report.ok() => "ok".to_string(),
        FieldStatus::Checked(_) => "invalid".to_string(),
        FieldStatus::Unknown(reason) => format!("unknown ({})", reason),
    };
    let mut node = Tree::new(format!("{}: {} [{}]", name, value, state));
    if let FieldStatus::Checked(report) = status {
        criteria_nodes(&mut node, report);
    }
    node
}

/// Print the validator's verdict for a single field.
pub fn print_validation_tree(field: CertField, value: &str, report: &ValidationReport) {
    let verdict = if report.ok() { "valid" } else { "invalid" };
    let mut root = Tree::new(format!("{} \"{}\" is {}", field.label(), value, verdict));
    if report.criteria.is_empty() {
        root.push(Tree::new(tree_label("no criteria reported")));
    }
    criteria_nodes(&mut root, report);
    println!("{}", root);
}
