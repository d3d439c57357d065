//! Subcommands and their handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use subnet_client::{
    AddSubnetValidatorOptions, AddValidatorOptions, Client, ClientConfig, ClientError,
    CreateBlockchainOptions, CreateSubnetOptions, PollOptions,
};
use subnet_confirmation::{BlockchainWait, PollContext};
use subnet_crypto::{parse_address, sha256};
use subnet_rpc::PlatformApi;
use subnet_types::{format_units, BlockchainStatus, Id, NodeId, ShortId, Timestamp};
use subnet_utils::format_duration;
use subnet_wallet_core::{load_key, save_key, SoftKey};

use crate::wizard::{Wizard, WizardPlan};

const VALIDATOR_START_DELAY: Duration = Duration::from_secs(30);
const VALIDATOR_DURATION: Duration = Duration::from_secs(300 * 24 * 3600);
const SUBNET_VALIDATOR_START_DELAY: Duration = Duration::from_secs(60);
const SUBNET_VALIDATOR_DURATION: Duration = Duration::from_secs(2 * 24 * 3600);
const DEFAULT_REWARD_FEE_PERCENT: u32 = 2;
const DEFAULT_SUBNET_VALIDATOR_WEIGHT: u64 = 1_000;
/// Length of a VM ID in bytes.
const VM_ID_LEN: usize = 32;

#[derive(clap::Subcommand)]
pub enum Command {
    /// Create keys, subnets and blockchains.
    Create {
        #[command(subcommand)]
        what: CreateCommand,
    },
    /// Add validators.
    Add {
        #[command(subcommand)]
        what: AddCommand,
    },
    /// Remove validators.
    Remove {
        #[command(subcommand)]
        what: RemoveCommand,
    },
    /// Wait for platform-chain state.
    Status {
        #[command(subcommand)]
        what: StatusCommand,
    },
    /// Show the balance of the key's first address.
    Balance,
    /// Stake the nodes, create a subnet with them as validators and
    /// launch a blockchain on it.
    Wizard {
        #[arg(long, value_delimiter = ',', required = true)]
        node_ids: Vec<NodeId>,
        /// Nano-AVAX to stake per new validator (network default when unset).
        #[arg(long)]
        stake_amount: Option<u64>,
        /// Unix seconds (default: 300 days from now).
        #[arg(long)]
        validate_end: Option<u64>,
        #[arg(long, default_value_t = DEFAULT_SUBNET_VALIDATOR_WEIGHT)]
        validate_weight: u64,
        #[arg(long)]
        chain_name: String,
        #[arg(long)]
        vm_id: Id,
        #[arg(long)]
        vm_genesis_path: PathBuf,
        /// Go ahead without stopping at the cost summary.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
pub enum CreateCommand {
    /// Generate a private key and write it to --private-key-path.
    Key,
    /// Derive a VM ID from a name.
    #[command(name = "VMID", alias = "vmid")]
    VmId {
        identifier: String,
        /// Hash the name instead of zero-padding it.
        #[arg(long)]
        hash: bool,
    },
    #[command(flatten)]
    Chain(ChainCommand),
}

#[derive(clap::Subcommand)]
pub enum ChainCommand {
    /// Create a subnet owned by the key.
    Subnet {
        /// Print the subnet ID without issuing.
        #[arg(long)]
        dry_run: bool,
        /// Return once issued instead of waiting for the subnet.
        #[arg(long)]
        no_poll: bool,
    },
    /// Create a blockchain on a subnet.
    Blockchain {
        #[arg(long)]
        subnet_id: Id,
        #[arg(long)]
        vm_id: Id,
        #[arg(long)]
        chain_name: String,
        #[arg(long)]
        vm_genesis_path: PathBuf,
        #[arg(long)]
        no_poll: bool,
    },
}

#[derive(clap::Subcommand)]
pub enum AddCommand {
    /// Add nodes as primary-network validators.
    Validator {
        /// Comma-separated "NodeID-..." list.
        #[arg(long, value_delimiter = ',', required = true)]
        node_ids: Vec<NodeId>,
        /// Nano-AVAX to stake (network default when unset).
        #[arg(long)]
        stake_amount: Option<u64>,
        /// Unix seconds (default: 30 seconds from now).
        #[arg(long)]
        validate_start: Option<u64>,
        /// Unix seconds (default: 300 days after start).
        #[arg(long)]
        validate_end: Option<u64>,
        /// Percentage of delegator rewards the validator keeps.
        #[arg(long, default_value_t = DEFAULT_REWARD_FEE_PERCENT)]
        validate_reward_fee_percent: u32,
        /// "P-..." address for rewards (default: key owner).
        #[arg(long)]
        reward_address: Option<String>,
        /// "P-..." address for change (default: key owner).
        #[arg(long)]
        change_address: Option<String>,
        #[arg(long)]
        no_poll: bool,
    },
    /// Add primary-network validators to a subnet.
    SubnetValidator {
        #[arg(long)]
        subnet_id: Id,
        #[arg(long, value_delimiter = ',', required = true)]
        node_ids: Vec<NodeId>,
        /// Unix seconds (default: one minute from now).
        #[arg(long)]
        validate_start: Option<u64>,
        /// Unix seconds (default: two days after start).
        #[arg(long)]
        validate_end: Option<u64>,
        #[arg(long, default_value_t = DEFAULT_SUBNET_VALIDATOR_WEIGHT)]
        validate_weight: u64,
        #[arg(long)]
        no_poll: bool,
    },
}

#[derive(clap::Subcommand)]
pub enum RemoveCommand {
    /// Remove nodes from a subnet's validator set.
    SubnetValidator {
        #[arg(long)]
        subnet_id: Id,
        #[arg(long, value_delimiter = ',', required = true)]
        node_ids: Vec<NodeId>,
        #[arg(long)]
        no_poll: bool,
    },
}

#[derive(clap::Subcommand)]
pub enum StatusCommand {
    /// Wait for a blockchain to start validating.
    Blockchain {
        /// Found through --subnet-id when unset.
        #[arg(long)]
        blockchain_id: Option<Id>,
        #[arg(long)]
        subnet_id: Option<Id>,
        /// Also wait for the node to bootstrap the chain.
        #[arg(long)]
        check_bootstrapped: bool,
    },
}

/// Commands that run without a node, and those that need one.
pub enum Dispatch {
    Local(LocalCommand),
    Node(NodeCommand),
}

pub enum LocalCommand {
    Key,
    VmId { identifier: String, hash: bool },
}

pub enum NodeCommand {
    Create(ChainCommand),
    Add(AddCommand),
    Remove(RemoveCommand),
    Status(StatusCommand),
    Balance,
    Wizard {
        plan: WizardPlan,
        yes: bool,
    },
}

impl Command {
    /// Sort the command by what it needs, reading any input files.
    pub fn dispatch(self) -> anyhow::Result<Dispatch> {
        let node = match self {
            Command::Create { what } => match what {
                CreateCommand::Key => return Ok(Dispatch::Local(LocalCommand::Key)),
                CreateCommand::VmId { identifier, hash } => {
                    return Ok(Dispatch::Local(LocalCommand::VmId { identifier, hash }))
                }
                CreateCommand::Chain(what) => NodeCommand::Create(what),
            },
            Command::Add { what } => NodeCommand::Add(what),
            Command::Remove { what } => NodeCommand::Remove(what),
            Command::Status { what } => NodeCommand::Status(what),
            Command::Balance => NodeCommand::Balance,
            Command::Wizard {
                node_ids,
                stake_amount,
                validate_end,
                validate_weight,
                chain_name,
                vm_id,
                vm_genesis_path,
                yes,
            } => {
                let genesis = std::fs::read(&vm_genesis_path)
                    .with_context(|| format!("reading {}", vm_genesis_path.display()))?;
                let (_, validate_end) = period(None, validate_end, VALIDATOR_START_DELAY, VALIDATOR_DURATION);
                NodeCommand::Wizard {
                    plan: WizardPlan {
                        node_ids,
                        stake_amount,
                        validate_end,
                        validate_weight,
                        chain_name,
                        vm_id,
                        genesis,
                    },
                    yes,
                }
            }
        };
        Ok(Dispatch::Node(node))
    }
}

/// Run a command that needs no node.
pub fn run_local(command: LocalCommand, key_path: &Path) -> anyhow::Result<()> {
    match command {
        LocalCommand::Key => create_key(key_path),
        LocalCommand::VmId { identifier, hash } => {
            let vm_id = vm_id_from_name(&identifier, hash)?;
            println!("created VMID {vm_id} from {identifier}");
            Ok(())
        }
    }
}

/// A 32-byte VM ID from `name`: the name zero-padded, or its sha256 with
/// `hash`.
pub fn vm_id_from_name(name: &str, hash: bool) -> anyhow::Result<Id> {
    let bytes = name.as_bytes();
    if hash {
        return Ok(Id::new(sha256(bytes)));
    }
    if bytes.len() > VM_ID_LEN {
        bail!("non-hashed name must be at most {VM_ID_LEN} bytes, found {}", bytes.len());
    }
    let mut id = [0u8; VM_ID_LEN];
    id[..bytes.len()].copy_from_slice(bytes);
    Ok(Id::new(id))
}

/// Write a fresh key to `path`.
fn create_key(path: &Path) -> anyhow::Result<()> {
    let key = SoftKey::generate()?;
    save_key(path, &key).with_context(|| format!("writing {}", path.display()))?;
    println!("created key {} at {}", key.address(), path.display());
    Ok(())
}

/// A connected client, the loaded key and the wait context.
pub struct Session {
    client: Client,
    key: SoftKey,
    ctx: PollContext,
}

impl Session {
    pub async fn open(config: &ClientConfig, key_path: &Path, ctx: PollContext) -> anyhow::Result<Self> {
        let key = load_key(key_path).with_context(|| format!("loading {}", key_path.display()))?;
        let client = Client::connect(config).await?;
        Ok(Self { client, key, ctx })
    }

    pub async fn run(&self, command: NodeCommand) -> anyhow::Result<()> {
        match command {
            NodeCommand::Create(what) => self.create(what).await,
            NodeCommand::Add(what) => self.add(what).await,
            NodeCommand::Remove(what) => self.remove(what).await,
            NodeCommand::Status(what) => self.status(what).await,
            NodeCommand::Balance => self.balance().await,
            NodeCommand::Wizard { plan, yes } => self.wizard(plan, yes).await,
        }
    }

    async fn wizard(&self, plan: WizardPlan, yes: bool) -> anyhow::Result<()> {
        let wizard = Wizard::new(&self.client, &self.key, &self.ctx);
        let cost = wizard.estimate(&plan).await?;
        println!("new primary validators: {:?}", cost.new_validators);
        println!("subnet validators:      {:?}", plan.node_ids);
        println!(
            "stake: {} AVAX each, fees: {} AVAX, balance: {} AVAX",
            format_units(cost.stake_amount),
            format_units(cost.fees),
            format_units(cost.balance)
        );
        println!("chain: {} (VM {})", plan.chain_name, plan.vm_id);
        if !yes {
            println!("rerun with --yes to create");
            return Ok(());
        }
        let outcome = wizard.run(&plan, &cost).await?;
        println!(
            "created subnet {} and blockchain {}",
            outcome.subnet_id, outcome.blockchain_id
        );
        Ok(())
    }

    async fn balance(&self) -> anyhow::Result<()> {
        let balance = self.client.balance(&self.key).await?;
        println!(
            "{}: {} AVAX",
            self.client.p_address(&self.key.address())?,
            format_units(balance.balance)
        );
        if let Some(locked) = balance.locked_stakeable {
            println!("locked stakeable: {} AVAX", format_units(locked));
        }
        Ok(())
    }

    async fn create(&self, what: ChainCommand) -> anyhow::Result<()> {
        match what {
            ChainCommand::Subnet { dry_run, no_poll } => {
                let opts = CreateSubnetOptions {
                    dry_run,
                    poll: !no_poll,
                };
                let (subnet_id, took) = self.client.create_subnet(&self.ctx, &self.key, opts).await?;
                if dry_run {
                    println!("subnet ID (dry run): {subnet_id}");
                } else {
                    println!("created subnet {subnet_id} (took {})", format_duration(took));
                }
            }
            ChainCommand::Blockchain {
                subnet_id,
                vm_id,
                chain_name,
                vm_genesis_path,
                no_poll,
            } => {
                let genesis = std::fs::read(&vm_genesis_path)
                    .with_context(|| format!("reading {}", vm_genesis_path.display()))?;
                let mut opts = CreateBlockchainOptions::new(chain_name, genesis);
                opts.poll = !no_poll;
                let (blockchain_id, took) = self
                    .client
                    .create_blockchain(&self.ctx, &self.key, subnet_id, vm_id, opts)
                    .await?;
                println!("created blockchain {blockchain_id} (took {})", format_duration(took));
            }
        }
        Ok(())
    }

    async fn add(&self, what: AddCommand) -> anyhow::Result<()> {
        match what {
            AddCommand::Validator {
                node_ids,
                stake_amount,
                validate_start,
                validate_end,
                validate_reward_fee_percent,
                reward_address,
                change_address,
                no_poll,
            } => {
                if validate_reward_fee_percent > 100 {
                    bail!("invalid validate reward fee percent {validate_reward_fee_percent}");
                }
                let (start, end) = period(
                    validate_start,
                    validate_end,
                    VALIDATOR_START_DELAY,
                    VALIDATOR_DURATION,
                );
                let mut opts = AddValidatorOptions::new(start, end);
                opts.stake_amount = stake_amount;
                opts.reward_shares = validate_reward_fee_percent * 10_000;
                opts.reward_address = reward_address.as_deref().map(address).transpose()?;
                opts.change_address = change_address.as_deref().map(address).transpose()?;
                opts.poll = !no_poll;

                for node_id in node_ids {
                    match self.client.add_validator(&self.ctx, &self.key, node_id, opts).await {
                        Ok(took) => {
                            println!("added validator {node_id} (took {})", format_duration(took))
                        }
                        Err(ClientError::AlreadyValidator(_)) => {
                            tracing::warn!(node_id = %node_id, "already a validator, skipping");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            AddCommand::SubnetValidator {
                subnet_id,
                node_ids,
                validate_start,
                validate_end,
                validate_weight,
                no_poll,
            } => {
                let (start, end) = period(
                    validate_start,
                    validate_end,
                    SUBNET_VALIDATOR_START_DELAY,
                    SUBNET_VALIDATOR_DURATION,
                );
                let mut opts = AddSubnetValidatorOptions::new(start, end, validate_weight);
                opts.poll = !no_poll;

                for node_id in node_ids {
                    match self
                        .client
                        .add_subnet_validator(&self.ctx, &self.key, subnet_id, node_id, opts)
                        .await
                    {
                        Ok(took) => println!(
                            "added {node_id} to subnet {subnet_id} (took {})",
                            format_duration(took)
                        ),
                        Err(ClientError::AlreadySubnetValidator { .. }) => {
                            tracing::warn!(node_id = %node_id, "already a subnet validator, skipping");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
        Ok(())
    }

    async fn remove(&self, what: RemoveCommand) -> anyhow::Result<()> {
        let RemoveCommand::SubnetValidator {
            subnet_id,
            node_ids,
            no_poll,
        } = what;
        let opts = PollOptions { poll: !no_poll };
        for node_id in node_ids {
            let took = self
                .client
                .remove_subnet_validator(&self.ctx, &self.key, subnet_id, node_id, opts)
                .await?;
            println!(
                "removed {node_id} from subnet {subnet_id} (took {})",
                format_duration(took)
            );
        }
        Ok(())
    }

    async fn status(&self, what: StatusCommand) -> anyhow::Result<()> {
        let StatusCommand::Blockchain {
            blockchain_id,
            subnet_id,
            check_bootstrapped,
        } = what;
        let wait = BlockchainWait {
            subnet_id,
            blockchain_id,
            status: BlockchainStatus::Validating,
            check_bootstrapped,
        };
        let (blockchain_id, took) = self.client.checker().poll_blockchain(&self.ctx, wait).await?;
        let chain = self
            .blockchain_name(blockchain_id)
            .await?
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();
        println!(
            "blockchain {blockchain_id}{chain} is validating (took {})",
            format_duration(took)
        );
        Ok(())
    }

    async fn blockchain_name(&self, blockchain_id: Id) -> anyhow::Result<Option<String>> {
        let chains = self.client.platform().get_blockchains().await?;
        Ok(chains
            .into_iter()
            .find(|c| c.id == blockchain_id)
            .map(|c| c.name))
    }
}

/// Validation window from optional Unix seconds, defaulting relative to
/// now.
fn period(
    start: Option<u64>,
    end: Option<u64>,
    start_delay: Duration,
    duration: Duration,
) -> (Timestamp, Timestamp) {
    let start = start
        .map(Timestamp::new)
        .unwrap_or_else(|| Timestamp::now().plus(start_delay));
    let end = end.map(Timestamp::new).unwrap_or_else(|| start.plus(duration));
    (start, end)
}

fn address(s: &str) -> anyhow::Result<ShortId> {
    let (_, _, address) = parse_address(s).with_context(|| format!("parsing address {s}"))?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_defaults_follow_start() {
        let (start, end) = period(Some(1_000), None, VALIDATOR_START_DELAY, VALIDATOR_DURATION);
        assert_eq!(start, Timestamp::new(1_000));
        assert_eq!(end, Timestamp::new(1_000 + VALIDATOR_DURATION.as_secs()));
    }

    #[test]
    fn period_explicit_bounds_kept() {
        let (start, end) = period(Some(5), Some(9), SUBNET_VALIDATOR_START_DELAY, SUBNET_VALIDATOR_DURATION);
        assert_eq!((start.as_secs(), end.as_secs()), (5, 9));
    }

    #[test]
    fn cli_parses_subcommands() {
        use clap::Parser;

        let cli = crate::Cli::try_parse_from([
            "subnet-cli",
            "--uri",
            "http://127.0.0.1:9650",
            "add",
            "validator",
            "--node-ids",
            &format!("{},{}", NodeId::new([1; 20]), NodeId::new([2; 20])),
        ])
        .unwrap();
        match cli.command {
            Command::Add {
                what: AddCommand::Validator {
                    node_ids,
                    validate_reward_fee_percent,
                    ..
                },
            } => {
                assert_eq!(node_ids.len(), 2);
                assert_eq!(validate_reward_fee_percent, DEFAULT_REWARD_FEE_PERCENT);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn vm_id_zero_pads_short_names() {
        let id = vm_id_from_name("subnetevm", false).unwrap();
        assert_eq!(&id.as_bytes()[..9], b"subnetevm");
        assert!(id.as_bytes()[9..].iter().all(|b| *b == 0));
        assert_eq!(id.to_string(), "srEXiWaHuhNyGwPUi444Tu47ZEDwxTWrbQiuD7FmgSAQ6X7Dy");
    }

    #[test]
    fn vm_id_hash_uses_sha256() {
        let long = "a".repeat(40);
        assert_eq!(
            vm_id_from_name(&long, true).unwrap(),
            Id::new(sha256(long.as_bytes()))
        );
        assert_ne!(
            vm_id_from_name("subnetevm", true).unwrap(),
            vm_id_from_name("subnetevm", false).unwrap()
        );
    }

    #[test]
    fn vm_id_rejects_long_unhashed_names() {
        assert!(vm_id_from_name(&"a".repeat(VM_ID_LEN), false).is_ok());
        assert!(vm_id_from_name(&"a".repeat(VM_ID_LEN + 1), false).is_err());
    }

    #[test]
    fn local_commands_skip_the_node() {
        use clap::Parser;

        let cli = crate::Cli::try_parse_from(["subnet-cli", "create", "VMID", "subnetevm", "--hash"]).unwrap();
        match cli.command.dispatch().unwrap() {
            Dispatch::Local(LocalCommand::VmId { identifier, hash }) => {
                assert_eq!(identifier, "subnetevm");
                assert!(hash);
            }
            _ => panic!("expected a local command"),
        }

        let cli = crate::Cli::try_parse_from(["subnet-cli", "create", "subnet", "--dry-run"]).unwrap();
        assert!(matches!(
            cli.command.dispatch().unwrap(),
            Dispatch::Node(NodeCommand::Create(ChainCommand::Subnet { dry_run: true, .. }))
        ));
    }
}
