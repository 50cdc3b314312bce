use termtree::Tree;

use crate::chain::node::{BlockHeader, NodeInfo};

/// Print node information in a tree structure.
pub fn print_node_tree(info: &NodeInfo) {
    let mut root = Tree::new(format!("{} ({})", info.endpoint, info.chain));
    root.push(Tree::new(format!("Name: {}", info.name)));
    root.push(Tree::new(format!("Version: {}", info.version)));

    let mut health = Tree::new("Health".to_string());
    health.push(Tree::new(format!("Peers: {}", info.health.peers)));
    health.push(Tree::new(format!("Syncing: {}", info.health.is_syncing)));
    health.push(Tree::new(format!("Should have peers: {}", info.health.should_have_peers)));
    root.push(health);

    let mut best = Tree::new(format!("Best block #{}", info.best_number));
    best.push(Tree::new(format!("Hash: {}", info.best_hash)));
    best.push(Tree::new(format!("Parent: {}", info.parent_hash)));
    best.push(Tree::new(format!("State root: {}", info.state_root)));
    root.push(best);

    if let Some(genesis) = &info.genesis_hash {
        root.push(Tree::new(format!("Genesis: {}", genesis)));
    }

    println!("{}", root);
}

/// Print a block header looked up by number.
pub fn print_block_tree(header: &BlockHeader) {
    let mut root = Tree::new(format!("Block #{}", header.number));
    root.push(Tree::new(format!("Hash: {}", header.hash)));
    root.push(Tree::new(format!("Parent: {}", header.parent_hash)));
    root.push(Tree::new(format!("State root: {}", header.state_root)));
    root.push(Tree::new(format!("Extrinsics root: {}", header.extrinsics_root)));
    root.push(Tree::new(format!("Digest logs: {}", header.digest_logs)));
    root.push(Tree::new(format!("Extrinsics: {}", header.extrinsics)));
    println!("{}", root);
}
