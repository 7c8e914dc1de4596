use paydelegate::domain::identity::{Address, ProjectId};
use paydelegate::domain::ports::{AuthorizationSourceRef, EntropySourceBox, PaymentSinkBox, RegistryStoreBox};
use paydelegate::domain::registry::Registry;
use paydelegate::infrastructure::entropy::{OsEntropy, SeededEntropy};
use paydelegate::infrastructure::in_memory::{
    InMemoryDirectory, InMemoryPaymentSink, InMemoryRegistryStore,
};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;

mod common;

use common::{Harness, OPERATOR, payment, terminal_of};

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let store: RegistryStoreBox = Box::new(InMemoryRegistryStore::new());
    let directory = InMemoryDirectory::new();
    directory
        .approve_operator(ProjectId::new(1), Address::from(OPERATOR))
        .await;
    let authorization: AuthorizationSourceRef = Arc::new(directory);
    let _sink: PaymentSinkBox = Box::new(InMemoryPaymentSink::new());
    let entropy: EntropySourceBox = Box::new(OsEntropy);

    let registry = Arc::new(Registry::new(store));
    registry.initialize(ProjectId::new(1), authorization).await.unwrap();

    // Verify Send + Sync by spawning tasks
    let handle = {
        let registry = registry.clone();
        tokio::spawn(async move {
            registry
                .add_candidate(&Address::from(OPERATOR), ProjectId::new(2))
                .await
                .unwrap();
            registry.pick_random_candidate(entropy.as_ref()).await.unwrap()
        })
    };

    assert_eq!(handle.await.unwrap(), ProjectId::new(2));
}

#[tokio::test]
async fn test_concurrent_appends_are_never_torn() {
    let harness = Harness::new(1, &[]).await;
    let registry = harness.registry.clone();

    let mut handles = Vec::new();
    for task in 0..8u64 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let entropy = SeededEntropy::new(task);
            for i in 0..25u64 {
                let candidate = ProjectId::new(task * 100 + i + 1);
                registry
                    .add_candidate(&Address::from(OPERATOR), candidate)
                    .await
                    .unwrap();
                let picked = registry.pick_random_candidate(&entropy).await.unwrap();
                assert!(registry.candidates().await.contains(&picked));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let candidates = registry.candidates().await;
    assert_eq!(candidates.len(), 200);
    let unique: HashSet<ProjectId> = candidates.into_iter().collect();
    assert_eq!(unique.len(), 200);
}

#[tokio::test]
async fn test_concurrent_payments_each_forward_once() {
    let harness = Harness::new(42, &[7, 9, 11]).await;
    let router = Arc::new(harness.router(Box::new(SeededEntropy::new(99))));

    let mut handles = Vec::new();
    for _ in 0..50 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            router
                .on_payment_received(&terminal_of(42), payment(42, dec!(2)))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        let receipt = handle.await.unwrap();
        assert!([7, 9, 11].contains(&receipt.recipient.value()));
    }

    let delivered = harness.sink.delivered().await;
    assert_eq!(delivered.len(), 50);
    let total: rust_decimal::Decimal = delivered.iter().map(|r| r.amount.value()).sum();
    assert_eq!(total, dec!(100));
}
