use termtree::Tree;

use crate::chain::account::AccountBalance;

/// Print the balances of one account.
pub fn print_balance_tree(balance: &AccountBalance) {
    let mut root = Tree::new(balance.address.clone());
    root.push(Tree::new(format!("Account ID: {}", balance.account_id)));
    root.push(Tree::new(format!("Nonce: {}", balance.nonce)));
    root.push(Tree::new(format!("Free: {}", balance.free)));
    root.push(Tree::new(format!("Reserved: {}", balance.reserved)));
    println!("{}", root);
}
