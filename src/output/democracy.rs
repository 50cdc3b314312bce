use termtree::Tree;

use crate::chain::democracy::{DemocracyOverview, Proposal, Referendum};
use crate::output::tree_label;

fn referendum_node(referendum: &Referendum) -> Tree<String> {
    let mut node = Tree::new(format!("#{} {}", referendum.index, referendum.image_hash));
    node.push(Tree::new(format!("Ends at block {}", referendum.end)));
    node.push(Tree::new(format!("Threshold: {:?}", referendum.threshold)));
    node.push(Tree::new(format!("Aye: {}", referendum.ayes)));
    node.push(Tree::new(format!("Nay: {}", referendum.nays)));
    node.push(Tree::new(format!("Turnout: {}", referendum.turnout)));
    node
}

fn proposal_node(proposal: &Proposal) -> Tree<String> {
    let mut node = Tree::new(format!("#{} {}", proposal.index, proposal.image_hash));
    node.push(Tree::new(format!("Proposer: {}", proposal.proposer)));
    match proposal.deposit {
        Some(deposit) => {
            node.push(Tree::new(format!("Locked: {}", deposit)));
        }
        None => {
            node.push(Tree::new(tree_label("Locked: unknown")));
        }
    }
    node.push(Tree::new(format!("Seconds: {}", proposal.seconds)));
    node
}

fn democracy_tree(overview: &DemocracyOverview) -> Tree<String> {
    let mut root = Tree::new(tree_label("Democracy"));

    let mut referendums = Tree::new(format!("Referendums - found: {}", overview.referendums.len()));
    for referendum in &overview.referendums {
        referendums.push(referendum_node(referendum));
    }
    root.push(referendums);

    let mut proposals = Tree::new(format!("Proposals - found: {}", overview.proposals.len()));
    for proposal in &overview.proposals {
        proposals.push(proposal_node(proposal));
    }
    root.push(proposals);
    root
}

/// Print ongoing referendums and public proposals.
pub fn print_democracy_tree(overview: &DemocracyOverview) {
    println!("{}", democracy_tree(overview));
}
