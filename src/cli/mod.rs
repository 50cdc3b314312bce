use std::path::PathBuf;

use clap::{value_parser, ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::tx::calls::Conviction;
use crate::validator::CertField;

/// siip - SIIP certificate registry client
#[derive(Parser, Debug)]
#[command(author, version, about = "siip - SIIP certificate registry client", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.siip/config.toml)
    #[arg(long, value_name = "FILE", value_parser = value_parser!(PathBuf))]
    pub config: Option<PathBuf>,

    /// Node JSON-RPC endpoint
    #[arg(long, value_name = "URL")]
    pub node_url: Option<String>,

    /// Validator JSON-RPC endpoint
    #[arg(long, value_name = "URL")]
    pub validator_url: Option<String>,

    /// Per-request timeout in ms
    #[arg(long, value_parser = value_parser!(u64).range(1..=600_000))]
    pub timeout_ms: Option<u64>,

    /// Signer identity handed to the transaction submitter
    #[arg(long)]
    pub signer: Option<String>,

    /// Certificate calls take a trailing email argument
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub with_email: bool,

    /// Global log level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Log to file (in addition to stdout)
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub log_file: bool,

    /// Log file path (default: ~/.siip/siip.log)
    #[arg(long, value_name = "FILE", value_parser = value_parser!(PathBuf))]
    pub log_file_path: Option<PathBuf>,

    /// Suppress non-error logs
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub quiet: bool,

    /// Print results as JSON instead of a tree
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub json: bool,

    /// Save result to a JSON file
    #[arg(short, long, value_name = "FILE", value_parser = value_parser!(PathBuf))]
    pub output: Option<PathBuf>,

    /// Suppress stdout output (use with --output)
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub no_stdout: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Command,
}

/// Log level
#[derive(Copy, Clone, Debug, ValueEnum, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    pub fn to_level_filter(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the certificate registered for a domain
    Lookup(LookupArgs),

    /// Register a certificate for an unregistered domain
    Register(CertificateArgs),

    /// Modify the certificate of a registered domain
    Modify(CertificateArgs),

    /// Remove the certificate of a registered domain
    Remove(RemoveArgs),

    /// Ask the validator about a single field value
    Validate(ValidateArgs),

    /// Dump every registered certificate as JSON
    Dump(DumpArgs),

    /// List certificates registered for an IP address
    Reverse(ReverseArgs),

    /// Transfer balance to another account
    Transfer(TransferArgs),

    /// Show the free balance of an account
    Balance(BalanceArgs),

    /// Democracy proposals, seconds, votes and preimages
    Democracy(DemocracyArgs),

    /// Show information about the connected node or one of its blocks
    Node(NodeArgs),
}

/// Lookup arguments
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Domain name
    #[arg(required = true)]
    pub domain: String,

    /// Keep following the record until interrupted
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub watch: bool,
}

/// Register/modify arguments
#[derive(Args, Debug)]
pub struct CertificateArgs {
    /// Domain name
    #[arg(required = true)]
    pub domain: String,

    /// Owner name
    #[arg(long)]
    pub name: String,

    /// IP address the domain is served from
    #[arg(long)]
    pub ip: String,

    /// Free-form certificate information
    #[arg(long)]
    pub info: String,

    /// Public key
    #[arg(long)]
    pub key: String,

    /// Contact email (only sent with --with-email)
    #[arg(long)]
    pub email: Option<String>,
}

/// Remove arguments
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Domain name
    #[arg(required = true)]
    pub domain: String,
}

/// Validate arguments
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Field to validate
    #[arg(value_enum)]
    pub field: CertField,

    /// Value to validate
    pub value: String,
}

/// Dump arguments
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Emit one-line JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub compact: bool,

    /// Concurrent storage reads
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Reverse lookup arguments
#[derive(Args, Debug)]
pub struct ReverseArgs {
    /// IP address
    #[arg(required = true)]
    pub ip: String,
}

/// Transfer arguments
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Destination account
    #[arg(required = true)]
    pub dest: String,

    /// Amount in chain units
    #[arg(required = true, allow_hyphen_values = true)]
    pub amount: String,
}

/// Balance arguments
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// SS58 address or 0x-prefixed account id
    #[arg(required = true)]
    pub account: String,
}

/// Node arguments
#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Show the header of this block instead of the node summary
    #[arg(long, value_name = "NUMBER")]
    pub block: Option<u64>,
}

/// Democracy arguments
#[derive(Args, Debug)]
pub struct DemocracyArgs {
    #[command(subcommand)]
    pub command: DemocracyCommand,
}

#[derive(Subcommand, Debug)]
pub enum DemocracyCommand {
    /// List ongoing referendums and public proposals
    List,

    /// Propose a preimage hash with a deposit
    Propose {
        /// Preimage hash (0x + 64 hex digits)
        proposal_hash: String,
        /// Deposit in chain units
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Second a public proposal
    Second {
        proposal: u32,
        /// Upper bound on the current number of seconds
        #[arg(long, default_value_t = 0)]
        seconds_upper_bound: u32,
    },

    /// Vote on a referendum
    Vote {
        ref_index: u32,
        /// Vote against instead of for
        #[arg(long, action = ArgAction::SetTrue)]
        nay: bool,
        #[arg(long, value_enum, default_value_t = Conviction::None)]
        conviction: Conviction,
        /// Voting balance in chain units
        #[arg(allow_hyphen_values = true)]
        balance: String,
    },

    /// Note a preimage for an encoded proposal
    Preimage {
        /// Hex encoded proposal
        encoded_proposal: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_arguments() {
        let cli = Cli::parse_from([
            "siip", "register", "example.com", "--name", "Alice", "--ip", "10.0.0.1", "--info",
            "test", "--key", "pk",
        ]);
        match cli.command {
            Command::Register(args) => {
                assert_eq!(args.domain, "example.com");
                assert_eq!(args.ip, "10.0.0.1");
                assert!(args.email.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn validate_takes_field_names() {
        let cli = Cli::parse_from(["siip", "validate", "ip", "10.0.0.1"]);
        match cli.command {
            Command::Validate(args) => assert_eq!(args.field, CertField::IpAddr),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn vote_defaults() {
        let cli = Cli::parse_from(["siip", "democracy", "vote", "4", "100"]);
        match cli.command {
            Command::Democracy(DemocracyArgs {
                command: DemocracyCommand::Vote { ref_index, nay, conviction, balance },
            }) => {
                assert_eq!(ref_index, 4);
                assert!(!nay);
                assert_eq!(conviction, Conviction::None);
                assert_eq!(balance, "100");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn node_block_is_optional() {
        let cli = Cli::parse_from(["siip", "node"]);
        assert!(matches!(cli.command, Command::Node(NodeArgs { block: None })));
        let cli = Cli::parse_from(["siip", "node", "--block", "12"]);
        assert!(matches!(cli.command, Command::Node(NodeArgs { block: Some(12) })));
    }

    #[test]
    fn balance_and_democracy_list() {
        let cli = Cli::parse_from(["siip", "balance", "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"]);
        assert!(matches!(cli.command, Command::Balance(_)));
        let cli = Cli::parse_from(["siip", "democracy", "list"]);
        assert!(matches!(
            cli.command,
            Command::Democracy(DemocracyArgs { command: DemocracyCommand::List })
        ));
    }
}
