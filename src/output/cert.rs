use termtree::Tree;

use crate::certificate::CertificateRecord;
use crate::output::tree_label;

fn record_node(record: &CertificateRecord) -> Tree<String> {
    let mut node = Tree::new(tree_label(&record.domain));
    node.push(Tree::new(format!("Owner: {}", record.owner_name)));
    node.push(Tree::new(format!("IP: {}", record.ip_addr)));
    node.push(Tree::new(format!("Info: {}", record.info)));
    node.push(Tree::new(format!("Public Key: {}", record.public_key)));
    if let Some(email) = &record.email {
        node.push(Tree::new(format!("Email: {}", email)));
    }
    node.push(Tree::new(format!("Version: {}", record.version_number)));
    if let Some(owner_id) = &record.owner_id {
        node.push(Tree::new(format!("Owner ID: {}", owner_id)));
    }
    node
}

fn certificate_tree(domain: &str, record: Option<&CertificateRecord>) -> Tree<String> {
    let mut root = Tree::new(format!("Certificate of {}", domain));
    match record {
        Some(record) => {
            root.push(record_node(record));
        }
        None => {
            root.push(Tree::new(tree_label("not registered")));
        }
    }
    root
}

/// Print the lookup result for a single domain.
pub fn print_certificate_tree(domain: &str, record: Option<&CertificateRecord>) {
    println!("{}", certificate_tree(domain, record));
}

/// Print a list of certificates under `title`.
pub fn print_certificate_list(title: &str, records: &[CertificateRecord]) {
    let mut root = Tree::new(format!("{} - found: {}", title, records.len()));
    for record in records {
        root.push(record_node(record));
    }
    println!("{}", root);
}
