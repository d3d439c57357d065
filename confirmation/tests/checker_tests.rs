use std::time::Duration;

use subnet_confirmation::{BlockchainWait, CancelController, Checker, CheckerError, PollContext};
use subnet_nullables::NullPlatform;
use subnet_transactions::{
    ChainSpec, Codec, Credential, OutputOwners, Payload, SubnetAuth, Tx, TxBuilder,
};
use subnet_types::{BlockchainStatus, Id, TxStatus};

const TICK: Duration = Duration::from_millis(5);

fn ctx() -> PollContext {
    PollContext::new().with_timeout(Duration::from_secs(5))
}

/// Issue an owner-less subnet, which needs no signatures.
fn open_subnet(ledger: &NullPlatform, codec: &Codec) -> Id {
    let unsigned = TxBuilder::new(codec, 1337)
        .build(
            vec![],
            vec![],
            Payload::CreateSubnet {
                owner: OutputOwners::default(),
            },
        )
        .unwrap();
    let tx = Tx::new(codec, unsigned, vec![]).unwrap();
    ledger.issue_raw(tx.bytes()).unwrap()
}

fn create_chain(ledger: &NullPlatform, codec: &Codec, subnet_id: Id) -> Id {
    let unsigned = TxBuilder::new(codec, 1337)
        .build(
            vec![],
            vec![],
            Payload::CreateChain {
                chain: ChainSpec {
                    subnet_id,
                    chain_name: "test chain".into(),
                    vm_id: Id::new([9; 32]),
                    fx_ids: vec![],
                    genesis_data: b"{}".to_vec(),
                },
                subnet_auth: SubnetAuth { sig_indices: vec![] },
            },
        )
        .unwrap();
    let tx = Tx::new(codec, unsigned, vec![Credential { signatures: vec![] }]).unwrap();
    ledger.issue_raw(tx.bytes()).unwrap()
}

#[tokio::test]
async fn aborted_fails_on_first_fetch() {
    let ledger = NullPlatform::new(1337);
    let tx_id = Id::new([1; 32]);
    ledger.set_tx_status(tx_id, TxStatus::Aborted);
    let checker = Checker::new(&ledger, &ledger, Duration::from_secs(60));

    let started = std::time::Instant::now();
    let err = checker
        .poll_tx(&ctx(), tx_id, TxStatus::Committed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckerError::AbortedOrDropped {
            status: TxStatus::Aborted,
            ..
        }
    ));
    // A retry would have waited a full minute.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn dropped_is_fine_when_asked_for() {
    let ledger = NullPlatform::new(1337);
    let tx_id = Id::new([1; 32]);
    ledger.set_tx_status(tx_id, TxStatus::Dropped);
    let checker = Checker::new(&ledger, &ledger, TICK);
    checker.poll_tx(&ctx(), tx_id, TxStatus::Dropped).await.unwrap();
}

#[tokio::test]
async fn processing_then_committed() {
    let ledger = NullPlatform::new(1337);
    let codec = Codec::platform();
    ledger.delay_commit(3);
    ledger.fail_next(2);
    let subnet_id = open_subnet(&ledger, &codec);
    let checker = Checker::new(&ledger, &ledger, TICK);
    checker.poll_subnet(&ctx(), subnet_id).await.unwrap();
}

#[tokio::test]
async fn unknown_tx_times_out() {
    let ledger = NullPlatform::new(1337);
    let checker = Checker::new(&ledger, &ledger, TICK);
    let ctx = PollContext::new().with_timeout(Duration::from_millis(40));
    let err = checker
        .poll_tx(&ctx, Id::new([2; 32]), TxStatus::Committed)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::DeadlineExceeded));
}

#[tokio::test]
async fn cancelled_before_start() {
    let ledger = NullPlatform::new(1337);
    let checker = Checker::new(&ledger, &ledger, TICK);
    let controller = CancelController::new();
    controller.cancel();
    let ctx = PollContext::new().with_cancel(controller.token());
    let err = checker
        .poll_tx(&ctx, Id::new([2; 32]), TxStatus::Committed)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::Cancelled));
}

#[tokio::test]
async fn empty_ids_rejected() {
    let ledger = NullPlatform::new(1337);
    let checker = Checker::new(&ledger, &ledger, TICK);
    assert!(matches!(
        checker.poll_tx(&ctx(), Id::EMPTY, TxStatus::Committed).await,
        Err(CheckerError::EmptyId(_))
    ));
    assert!(matches!(
        checker.poll_subnet(&ctx(), Id::EMPTY).await,
        Err(CheckerError::EmptyId(_))
    ));
    assert!(matches!(
        checker.poll_blockchain(&ctx(), BlockchainWait::default()).await,
        Err(CheckerError::EmptyId(_))
    ));
}

#[tokio::test]
async fn blockchain_discovered_from_subnet() {
    let ledger = NullPlatform::new(1337);
    let codec = Codec::platform();
    let subnet_id = open_subnet(&ledger, &codec);
    let chain_id = create_chain(&ledger, &codec, subnet_id);
    let checker = Checker::new(&ledger, &ledger, TICK);

    let (found, _) = checker
        .poll_blockchain(
            &ctx(),
            BlockchainWait {
                subnet_id: Some(subnet_id),
                check_bootstrapped: true,
                ..BlockchainWait::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(found, chain_id);
}

#[tokio::test]
async fn waits_for_bootstrap() {
    let ledger = NullPlatform::new(1337);
    let codec = Codec::platform();
    let subnet_id = open_subnet(&ledger, &codec);
    let chain_id = create_chain(&ledger, &codec, subnet_id);
    ledger.set_bootstrapped(false);
    let checker = Checker::new(&ledger, &ledger, TICK);

    let wait = BlockchainWait {
        blockchain_id: Some(chain_id),
        check_bootstrapped: true,
        ..BlockchainWait::default()
    };
    let short = PollContext::new().with_timeout(Duration::from_millis(40));
    assert!(matches!(
        checker.poll_blockchain(&short, wait).await,
        Err(CheckerError::DeadlineExceeded)
    ));

    ledger.set_bootstrapped(true);
    let (found, _) = checker.poll_blockchain(&ctx(), wait).await.unwrap();
    assert_eq!(found, chain_id);
}

#[tokio::test]
async fn status_mismatch_keeps_waiting() {
    let ledger = NullPlatform::new(1337);
    let codec = Codec::platform();
    let subnet_id = open_subnet(&ledger, &codec);
    let chain_id = create_chain(&ledger, &codec, subnet_id);
    ledger.set_blockchain_status(chain_id, BlockchainStatus::Syncing);
    let checker = Checker::new(&ledger, &ledger, TICK);
    let short = PollContext::new().with_timeout(Duration::from_millis(40));
    let err = checker
        .poll_blockchain(
            &short,
            BlockchainWait {
                blockchain_id: Some(chain_id),
                ..BlockchainWait::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckerError::DeadlineExceeded));
}
