use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use subnet_client::{
    AddSubnetValidatorOptions, AddValidatorOptions, Client, ClientConfig, ClientError,
    CreateBlockchainOptions, CreateSubnetOptions, PollOptions,
};
use subnet_confirmation::PollContext;
use subnet_nullables::{NullClock, NullPlatform};
use subnet_rpc::{PlatformApi, TxFee, ValidatorInfo};
use subnet_types::{Id, NodeId, ShortId, Signature, Timestamp, AVAX};
use subnet_wallet_core::{KeyManager, SoftKey, WalletError};
use tokio::sync::oneshot;

const NETWORK: u32 = 1337;
const NOW: u64 = 1_700_000_000;
const TX_FEE: u64 = 1_000_000;
const CREATE_FEE: u64 = 100_000_000;

struct Env {
    ledger: Arc<NullPlatform>,
    client: Client,
    key: SoftKey,
}

async fn env(funds: u64) -> Env {
    let ledger = Arc::new(NullPlatform::new(NETWORK));
    ledger.set_fees(TxFee {
        tx_fee: TX_FEE,
        create_subnet_tx_fee: CREATE_FEE,
        create_blockchain_tx_fee: CREATE_FEE,
    });
    let key = SoftKey::generate().unwrap();
    if funds > 0 {
        ledger.fund(key.address(), funds);
    }
    let mut cfg = ClientConfig::new("http://127.0.0.1:9650");
    cfg.poll_interval = Duration::from_millis(5);
    let client = Client::with_apis(&cfg, ledger.clone(), ledger.clone(), Arc::new(NullClock::new(NOW)))
        .await
        .unwrap();
    Env { ledger, client, key }
}

fn ctx() -> PollContext {
    PollContext::new().with_timeout(Duration::from_secs(5))
}

fn node() -> NodeId {
    NodeId::new([7; 20])
}

fn primary_validator(start: u64, end: u64) -> ValidatorInfo {
    ValidatorInfo {
        node_id: node(),
        start_time: start,
        end_time: end,
        weight: None,
        stake_amount: Some(AVAX),
    }
}

async fn subnet(env: &Env) -> Id {
    let (id, _) = env
        .client
        .create_subnet(&ctx(), &env.key, CreateSubnetOptions::default())
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn network_and_asset_fetched_from_node() {
    let env = env(0).await;
    assert_eq!(env.client.network_id(), NETWORK);
    assert_eq!(env.client.asset_id(), env.ledger.asset_id());
}

#[tokio::test]
async fn invalid_config_rejected_before_any_call() {
    let ledger = Arc::new(NullPlatform::new(NETWORK));
    ledger.fail_next(10);
    let mut cfg = ClientConfig::new("http://127.0.0.1:9650");
    cfg.poll_interval = Duration::ZERO;
    let result = Client::with_apis(&cfg, ledger.clone(), ledger.clone(), Arc::new(NullClock::new(NOW))).await;
    assert!(matches!(result, Err(ClientError::InvalidInterval)));
}

#[tokio::test]
async fn balance_of_first_address() {
    let env = env(3 * AVAX).await;
    env.ledger.fund(env.key.address(), 2 * AVAX);
    let balance = env.client.balance(&env.key).await.unwrap();
    assert_eq!(balance.balance, 5 * AVAX);
}

#[tokio::test]
async fn dry_run_predicts_the_issued_id() {
    let env = env(10 * AVAX).await;
    let dry = CreateSubnetOptions {
        dry_run: true,
        poll: false,
    };
    let (predicted, _) = env.client.create_subnet(&ctx(), &env.key, dry).await.unwrap();
    assert!(env.ledger.issued().is_empty());

    let (issued, _) = env
        .client
        .create_subnet(&ctx(), &env.key, CreateSubnetOptions::default())
        .await
        .unwrap();
    assert_eq!(predicted, issued);
    assert_eq!(env.ledger.issued(), vec![issued]);
}

#[tokio::test]
async fn node_answering_with_another_id_is_surfaced() {
    let env = env(10 * AVAX).await;
    let dry = CreateSubnetOptions {
        dry_run: true,
        poll: false,
    };
    let (expected, _) = env.client.create_subnet(&ctx(), &env.key, dry).await.unwrap();

    let bogus = Id::new([0xab; 32]);
    env.ledger.misreport_next_id(bogus);
    let err = env
        .client
        .create_subnet(&ctx(), &env.key, CreateSubnetOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedSubnetId { expected: e, actual } if e == expected && actual == bogus
    ));
}

#[tokio::test]
async fn create_subnet_burns_fee_and_lists_subnet() {
    let env = env(10 * AVAX).await;
    let subnet_id = subnet(&env).await;

    let listed = env.ledger.get_subnets(&[subnet_id]).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].threshold, Some(1));
    assert_eq!(env.ledger.balance_of(&env.key.address()), 10 * AVAX - CREATE_FEE);
}

#[tokio::test]
async fn insufficient_balance_checked_before_building() {
    let env = env(CREATE_FEE - 1).await;
    let err = env
        .client
        .create_subnet(&ctx(), &env.key, CreateSubnetOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::InsufficientBalance {
            required: CREATE_FEE,
            available
        } if available == CREATE_FEE - 1
    ));
    assert!(env.ledger.issued().is_empty());
}

#[tokio::test]
async fn add_validator_stakes_network_default() {
    let env = env(3 * AVAX).await;
    let opts = AddValidatorOptions::new(Timestamp::new(NOW + 30), Timestamp::new(NOW + 86_400));
    env.client
        .add_validator(&ctx(), &env.key, node(), opts)
        .await
        .unwrap();

    let validator = env.client.get_validator(Id::EMPTY, node()).await.unwrap();
    assert_eq!(validator.stake_amount, Some(AVAX));
    assert_eq!(validator.start_time, NOW + 30);
    assert_eq!(env.ledger.balance_of(&env.key.address()), 2 * AVAX);
}

#[tokio::test]
async fn add_validator_twice_is_rejected() {
    let env = env(3 * AVAX).await;
    let opts = AddValidatorOptions::new(Timestamp::new(NOW + 30), Timestamp::new(NOW + 86_400));
    env.client
        .add_validator(&ctx(), &env.key, node(), opts)
        .await
        .unwrap();
    let err = env
        .client
        .add_validator(&ctx(), &env.key, node(), opts)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AlreadyValidator(n) if n == node()));
}

#[tokio::test]
async fn add_validator_short_of_stake() {
    let env = env(AVAX / 2).await;
    let mut opts = AddValidatorOptions::new(Timestamp::new(NOW + 30), Timestamp::new(NOW + 86_400));
    opts.stake_amount = Some(AVAX);
    let err = env
        .client
        .add_validator(&ctx(), &env.key, node(), opts)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InsufficientBalance { required, .. } if required == AVAX));
}

#[tokio::test]
async fn subnet_validator_lifecycle() {
    let env = env(10 * AVAX).await;
    let subnet_id = subnet(&env).await;
    env.ledger.add_validator(Id::EMPTY, primary_validator(NOW, NOW + 10_000));

    let opts = AddSubnetValidatorOptions::new(Timestamp::new(NOW + 60), Timestamp::new(NOW + 5_000), 100);
    env.client
        .add_subnet_validator(&ctx(), &env.key, subnet_id, node(), opts)
        .await
        .unwrap();
    let validator = env.client.get_validator(subnet_id, node()).await.unwrap();
    assert_eq!(validator.weight, Some(100));

    let err = env
        .client
        .add_subnet_validator(&ctx(), &env.key, subnet_id, node(), opts)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AlreadySubnetValidator { .. }));

    env.client
        .remove_subnet_validator(&ctx(), &env.key, subnet_id, node(), PollOptions::default())
        .await
        .unwrap();
    assert!(matches!(
        env.client.get_validator(subnet_id, node()).await,
        Err(ClientError::ValidatorNotFound { .. })
    ));
    assert_eq!(
        env.ledger.balance_of(&env.key.address()),
        10 * AVAX - CREATE_FEE - 2 * TX_FEE
    );
}

#[tokio::test]
async fn subnet_validator_needs_primary_window() {
    let env = env(10 * AVAX).await;
    let subnet_id = subnet(&env).await;

    let opts = AddSubnetValidatorOptions::new(Timestamp::new(NOW + 60), Timestamp::new(NOW + 5_000), 100);
    let err = env
        .client
        .add_subnet_validator(&ctx(), &env.key, subnet_id, node(), opts)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotValidatingPrimaryNetwork(n) if n == node()));

    env.ledger.add_validator(Id::EMPTY, primary_validator(NOW, NOW + 1_000));
    let err = env
        .client
        .add_subnet_validator(&ctx(), &env.key, subnet_id, node(), opts)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::InvalidSubnetValidatePeriod {
            primary_end,
            ..
        } if primary_end == NOW + 1_000
    ));
}

#[tokio::test]
async fn subnet_validator_argument_checks() {
    let env = env(10 * AVAX).await;
    let start = Timestamp::new(NOW + 60);
    let end = Timestamp::new(NOW + 120);

    let err = env
        .client
        .add_subnet_validator(&ctx(), &env.key, Id::EMPTY, node(), AddSubnetValidatorOptions::new(start, end, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EmptyId("subnet ID")));

    let subnet_id = Id::new([3; 32]);
    let err = env
        .client
        .add_subnet_validator(&ctx(), &env.key, subnet_id, node(), AddSubnetValidatorOptions::new(start, end, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ZeroWeight));

    let err = env
        .client
        .add_subnet_validator(&ctx(), &env.key, subnet_id, node(), AddSubnetValidatorOptions::new(end, start, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidPeriod { .. }));
}

#[tokio::test]
async fn remove_requires_current_subnet_validator() {
    let env = env(10 * AVAX).await;
    let subnet_id = subnet(&env).await;
    let err = env
        .client
        .remove_subnet_validator(&ctx(), &env.key, subnet_id, node(), PollOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ValidatorNotFound { .. }));
}

#[tokio::test]
async fn create_blockchain_waits_until_validating() {
    let env = env(10 * AVAX).await;
    let subnet_id = subnet(&env).await;
    let vm_id = Id::new([9; 32]);

    let (blockchain_id, _) = env
        .client
        .create_blockchain(
            &ctx(),
            &env.key,
            subnet_id,
            vm_id,
            CreateBlockchainOptions::new("my chain", b"{}".to_vec()),
        )
        .await
        .unwrap();

    let chains = env.ledger.get_blockchains().await.unwrap();
    let chain = chains.iter().find(|c| c.id == blockchain_id).unwrap();
    assert_eq!(chain.subnet_id, subnet_id);
    assert_eq!(chain.vm_id, vm_id);
    assert_eq!(chain.name, "my chain");
}

#[tokio::test]
async fn foreign_key_cannot_authorize_subnet() {
    let env = env(10 * AVAX).await;
    let subnet_id = subnet(&env).await;

    let stranger = SoftKey::generate().unwrap();
    env.ledger.fund(stranger.address(), 10 * AVAX);
    let err = env
        .client
        .create_blockchain(
            &ctx(),
            &stranger,
            subnet_id,
            Id::new([9; 32]),
            CreateBlockchainOptions::new("my chain", vec![]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Wallet(WalletError::CantSign {
            threshold: 1,
            matched: 0
        })
    ));
}

/// A key that, like a hardware wallet, blocks in `sign_hash` until someone
/// confirms from elsewhere.
struct ConfirmingKey {
    inner: SoftKey,
    waiting: Mutex<Option<oneshot::Sender<()>>>,
    confirmed: Mutex<mpsc::Receiver<()>>,
}

impl KeyManager for ConfirmingKey {
    fn addresses(&self) -> &[ShortId] {
        self.inner.addresses()
    }

    fn sign_hash(&self, hash: &[u8; 32], signers: &[ShortId]) -> Result<Vec<Signature>, WalletError> {
        if let Some(waiting) = self.waiting.lock().unwrap().take() {
            let _ = waiting.send(());
        }
        self.confirmed
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| WalletError::Device("not confirmed".into()))?;
        self.inner.sign_hash(hash, signers)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn device_wait_leaves_runtime_free() {
    let Env { client, key, .. } = env(10 * AVAX).await;
    let (waiting_tx, waiting_rx) = oneshot::channel();
    let (confirm_tx, confirm_rx) = mpsc::channel();
    let key = ConfirmingKey {
        inner: key,
        waiting: Mutex::new(Some(waiting_tx)),
        confirmed: Mutex::new(confirm_rx),
    };

    // Runs on the only worker, so it can confirm only if signing gives
    // the worker up.
    let operation = tokio::spawn(async move {
        let dry = CreateSubnetOptions {
            dry_run: true,
            poll: false,
        };
        client.create_subnet(&ctx(), &key, dry).await
    });
    let confirmer = tokio::spawn(async move {
        waiting_rx.await.unwrap();
        confirm_tx.send(()).unwrap();
    });

    let (subnet_id, _) = operation.await.unwrap().unwrap();
    confirmer.await.unwrap();
    assert!(!subnet_id.is_empty());
}
