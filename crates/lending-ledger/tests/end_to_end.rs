//! # End-to-End Ledger Scenarios
//!
//! Drives the ledger through its public API with in-memory collaborators:
//! request creation under the identity and eligibility checks, oracle
//! fulfilment, and the resulting event stream.

use std::sync::Arc;
use std::time::Duration;

use lending_ledger::prelude::*;
use tokio::time::timeout;

const ORACLE: Address = Address::new([0x0A; 20]);
const BORROWER: Address = Address::new([0xB0; 20]);
const OTHER: Address = Address::new([0xC0; 20]);
const RESOLVER: Address = Address::new([0x5E; 20]);

type Service = LendingService<InMemoryNameService, InMemoryAccounts>;

/// alice.eth resolves to BORROWER, who holds 1 ETH.
fn setup() -> Service {
    let service = create_test_service(LedgerConfig::new(ORACLE));
    service.names().register("alice.eth", RESOLVER, BORROWER);
    service.accounts().set_balance(BORROWER, U256::exp10(18));
    service
}

fn events(service: &Service) -> Vec<LedgerEvent> {
    service
        .events()
        .poll(0, usize::MAX)
        .into_iter()
        .map(|entry| entry.event)
        .collect()
}

#[tokio::test]
async fn test_approved_loan_emits_requested_processed_executed() {
    let service = setup();

    let id = service
        .request_loan(BORROWER, "alice.eth", U256::from(5))
        .await
        .unwrap();
    service
        .fulfill_loan_request(ORACLE, id, 780, 450, true)
        .await
        .unwrap();

    assert_eq!(
        events(&service),
        vec![
            LedgerEvent::Requested {
                request_id: id,
                borrower: BORROWER,
                amount: U256::from(5),
                ens_name: "alice.eth".into(),
            },
            LedgerEvent::Processed {
                request_id: id,
                borrower: BORROWER,
                credit_score: 780,
                approved: true,
                interest_rate_bps: 450,
            },
            // 5 + floor(5 * 450 / 10000) = 5
            LedgerEvent::Executed {
                borrower: BORROWER,
                principal: U256::from(5),
                total_repayment: U256::from(5),
                interest_rate_bps: 450,
            },
        ]
    );

    let stored = service.get_loan_request(id).await.unwrap();
    assert!(stored.processed);
    assert!(stored.approved);
    assert_eq!(stored.credit_score, 780);
    assert_eq!(stored.interest_rate_bps, 450);
}

#[tokio::test]
async fn test_rejected_loan_emits_no_executed() {
    let service = setup();
    let id = service
        .request_loan(BORROWER, "alice.eth", U256::from(5))
        .await
        .unwrap();
    service
        .fulfill_loan_request(ORACLE, id, 400, 0, false)
        .await
        .unwrap();

    let log = events(&service);
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[1],
        LedgerEvent::Processed {
            request_id: id,
            borrower: BORROWER,
            credit_score: 400,
            approved: false,
            interest_rate_bps: 0,
        }
    );
}

#[tokio::test]
async fn test_name_owned_by_someone_else() {
    let service = setup();
    service.accounts().set_balance(OTHER, U256::exp10(18));

    assert_eq!(
        service.request_loan(OTHER, "alice.eth", U256::from(5)).await,
        Err(LendingError::NotOwner)
    );
    assert_eq!(service.request_count(), 0);
    assert!(events(&service).is_empty());
}

#[tokio::test]
async fn test_unregistered_name() {
    let service = setup();
    assert_eq!(
        service.request_loan(BORROWER, "ghost.eth", U256::from(5)).await,
        Err(LendingError::NotRegistered)
    );
    assert!(events(&service).is_empty());
}

#[tokio::test]
async fn test_balance_threshold() {
    let service = setup();

    service.accounts().set_balance(OTHER, min_balance() - U256::one());
    assert_eq!(
        service.request_loan(OTHER, "", U256::from(5)).await,
        Err(LendingError::InsufficientBalance)
    );

    service.accounts().set_balance(OTHER, min_balance());
    assert!(service.request_loan(OTHER, "", U256::from(5)).await.is_ok());
}

#[tokio::test]
async fn test_second_fulfilment_is_rejected() {
    let service = setup();
    let id = service.request_loan(BORROWER, "", U256::from(5)).await.unwrap();
    service
        .fulfill_loan_request(ORACLE, id, 780, 450, true)
        .await
        .unwrap();
    let before = service.get_loan_request(id).await.unwrap();
    let log_len = service.events().len();

    assert_eq!(
        service.fulfill_loan_request(ORACLE, id, 500, 100, false).await,
        Err(LendingError::AlreadyProcessed)
    );
    assert_eq!(service.get_loan_request(id).await.unwrap(), before);
    assert_eq!(service.events().len(), log_len);
}

#[tokio::test]
async fn test_range_boundaries() {
    let service = setup();

    for (score, rate, expected) in [
        (299, 0, Err(LendingError::ScoreOutOfRange)),
        (851, 0, Err(LendingError::ScoreOutOfRange)),
        (700, 10_001, Err(LendingError::RateTooHigh)),
        (300, 0, Ok(())),
        (850, 10_000, Ok(())),
    ] {
        let id = service.request_loan(BORROWER, "", U256::from(5)).await.unwrap();
        assert_eq!(
            service
                .fulfill_loan_request(ORACLE, id, score, rate, true)
                .await,
            expected,
            "score {score} rate {rate}"
        );
    }
}

#[tokio::test]
async fn test_unauthorized_fulfilment_then_oracle_succeeds() {
    let service = setup();
    let id = service.request_loan(BORROWER, "", U256::from(5)).await.unwrap();

    assert_eq!(
        service.fulfill_loan_request(BORROWER, id, 780, 450, true).await,
        Err(LendingError::Unauthorized)
    );
    assert!(service.get_loan_request(id).await.unwrap().is_pending());

    assert!(service
        .fulfill_loan_request(ORACLE, id, 780, 450, true)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_request() {
    let service = setup();
    let id = RequestId::new([0x42; 32]);
    assert_eq!(service.get_loan_request(id).await, Err(LendingError::NotFound));
    assert_eq!(
        service.fulfill_loan_request(ORACLE, id, 700, 100, true).await,
        Err(LendingError::NotFound)
    );
}

#[tokio::test]
async fn test_name_rebinding_is_seen_by_later_requests() {
    let service = setup();
    assert!(service
        .request_loan(BORROWER, "alice.eth", U256::from(5))
        .await
        .is_ok());

    // The registry moves the name; earlier requests are untouched, later
    // ones see the new owner.
    service.names().register("alice.eth", RESOLVER, OTHER);
    assert_eq!(
        service.request_loan(BORROWER, "alice.eth", U256::from(5)).await,
        Err(LendingError::NotOwner)
    );
    assert_eq!(service.request_count(), 1);
}

#[tokio::test]
async fn test_subscriber_sees_per_request_order() {
    let service = Arc::new(setup());
    let mut sub = service.subscribe(0, EventFilter::all());

    let id = service.request_loan(BORROWER, "", U256::from(5)).await.unwrap();
    service
        .fulfill_loan_request(ORACLE, id, 780, 450, true)
        .await
        .unwrap();

    let mut kinds = Vec::new();
    for _ in 0..3 {
        let entry = timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("timeout")
            .expect("log closed");
        kinds.push(entry.event.kind());
    }
    assert_eq!(
        kinds,
        vec![EventKind::Requested, EventKind::Processed, EventKind::Executed]
    );
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_ids() {
    let service = Arc::new(setup());
    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .request_loan(BORROWER, "alice.eth", U256::from(5))
                .await
                .unwrap()
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(service.request_count(), 16);
    assert_eq!(service.events().len(), 16);
}
