//! # Worker Round Trip
//!
//! A ledger and a running decision worker wired together: requests go in,
//! decisions come back out through the event log.

use std::sync::Arc;
use std::time::Duration;

use lending_ledger::prelude::*;
use lending_oracle::prelude::*;
use tokio::sync::watch;
use tokio::time::timeout;

const ORACLE: Address = Address::new([0x0A; 20]);
const ALICE: Address = Address::new([0xA1; 20]);
const BOB: Address = Address::new([0xB0; 20]);
const RESOLVER: Address = Address::new([0x5E; 20]);

type Ledger = LendingService<InMemoryNameService, InMemoryAccounts>;

fn ledger(debug_entrypoints: bool) -> Arc<Ledger> {
    Arc::new(create_test_service(LedgerConfig {
        oracle: ORACLE,
        debug_entrypoints,
    }))
}

fn signal_worker(ledger: &Arc<Ledger>) -> OracleWorker<Ledger, SignalDecider<InMemoryNameService, InMemoryAccounts>> {
    let decider = SignalDecider::new(
        Arc::clone(ledger.names()),
        Arc::clone(ledger.accounts()),
        DEFAULT_RATE_BPS,
    );
    OracleWorker::new(Arc::clone(ledger), decider, WorkerConfig::new(ORACLE))
}

/// Wait for the `Processed` event of `request_id`.
async fn processed(ledger: &Ledger, request_id: RequestId) -> LedgerEvent {
    let mut sub = ledger.subscribe(0, EventFilter::kinds(vec![EventKind::Processed]));
    loop {
        let entry = timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("timed out waiting for Processed")
            .expect("log closed");
        if entry.event.request_id() == Some(request_id) {
            return entry.event;
        }
    }
}

#[tokio::test]
async fn test_worker_approves_linked_wealthy_borrower() {
    let ledger = ledger(false);
    let node = ledger.names().register("alice.eth", RESOLVER, ALICE);
    ledger.names().set_text(RESOLVER, node, "com.github", "alice");
    ledger.accounts().set_balance(ALICE, U256::exp10(19));

    let worker = Arc::new(signal_worker(&ledger));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = {
        let worker = Arc::clone(&worker);
        let sub = ledger.subscribe(0, EventFilter::new_requests());
        tokio::spawn(async move { worker.run(sub, shutdown_rx).await })
    };

    let id = ledger
        .request_loan(ALICE, "alice.eth", U256::exp10(18))
        .await
        .unwrap();

    // 600 + 50 social + 50 balance; 1 ETH falls in the 1100 bps tier.
    assert_eq!(
        processed(&ledger, id).await,
        LedgerEvent::Processed {
            request_id: id,
            borrower: ALICE,
            credit_score: 700,
            approved: true,
            interest_rate_bps: 1_100,
        }
    );

    shutdown_tx.send(true).unwrap();
    let cursor = timeout(Duration::from_secs(2), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(cursor >= 1);
    assert_eq!(worker.stats().approved, 1);
}

#[tokio::test]
async fn test_worker_rejects_unlinked_borrower() {
    let ledger = ledger(false);
    ledger.accounts().set_balance(BOB, U256::exp10(17));

    let worker = Arc::new(signal_worker(&ledger));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = {
        let worker = Arc::clone(&worker);
        let sub = ledger.subscribe(0, EventFilter::new_requests());
        tokio::spawn(async move { worker.run(sub, shutdown_rx).await })
    };

    let id = ledger.request_loan(BOB, "", U256::from(5)).await.unwrap();
    assert_eq!(
        processed(&ledger, id).await,
        LedgerEvent::Processed {
            request_id: id,
            borrower: BOB,
            credit_score: 600,
            approved: false,
            interest_rate_bps: DEFAULT_RATE_BPS,
        }
    );

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // Rejected loans never get an Executed event.
    let executed = ledger
        .events()
        .poll(0, usize::MAX)
        .into_iter()
        .filter(|e| e.event.kind() == EventKind::Executed)
        .count();
    assert_eq!(executed, 0);
}

#[tokio::test]
async fn test_worker_scores_debug_request_with_simulated_balance() {
    let ledger = ledger(true);
    let node = ledger.names().register("bob.eth", RESOLVER, BOB);
    ledger.names().set_text(RESOLVER, node, "com.twitter", "@bob");

    let worker = Arc::new(signal_worker(&ledger));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = {
        let worker = Arc::clone(&worker);
        let sub = ledger.subscribe(0, EventFilter::new_requests());
        tokio::spawn(async move { worker.run(sub, shutdown_rx).await })
    };

    // BOB holds nothing; the simulated 2 ETH passes the gate and earns the
    // balance bonus.
    let id = ledger
        .debug_request_loan_with_balance(
            ORACLE,
            BOB,
            "bob.eth",
            U256::from(5),
            U256::exp10(18) * U256::from(2),
        )
        .await
        .unwrap();

    match processed(&ledger, id).await {
        LedgerEvent::Processed {
            credit_score,
            approved,
            ..
        } => {
            assert_eq!(credit_score, 700);
            assert!(approved);
        }
        other => panic!("unexpected event {other:?}"),
    }

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_worker_resumes_from_cursor() {
    let ledger = ledger(false);
    ledger.accounts().set_balance(BOB, U256::exp10(18));

    // Two requests land before any worker runs.
    let first = ledger.request_loan(BOB, "", U256::from(5)).await.unwrap();
    let second = ledger.request_loan(BOB, "", U256::from(7)).await.unwrap();

    // A worker starting at cursor 1 only sees the second one.
    let worker = Arc::new(OracleWorker::new(
        Arc::clone(&ledger),
        FixedDecider(CreditAssessment {
            score: 720,
            rate_bps: 300,
        }),
        WorkerConfig::new(ORACLE),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = {
        let worker = Arc::clone(&worker);
        let sub = ledger.subscribe(1, EventFilter::new_requests());
        tokio::spawn(async move { worker.run(sub, shutdown_rx).await })
    };

    processed(&ledger, second).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert!(ledger.get_loan_request(first).await.unwrap().is_pending());
    assert!(ledger.get_loan_request(second).await.unwrap().processed);
    assert_eq!(worker.stats().requests_seen, 1);
}
