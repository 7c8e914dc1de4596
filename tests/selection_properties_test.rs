use paydelegate::domain::identity::ProjectId;
use paydelegate::domain::registry::select_index;
use paydelegate::error::DelegateError;
use paydelegate::infrastructure::entropy::{FixedEntropy, SequenceEntropy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod common;

use common::Harness;

#[tokio::test]
async fn test_selection_never_leaves_the_pool() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..20 {
        let pool: Vec<u64> = (0..rng.gen_range(1..12))
            .map(|_| rng.gen_range(1..6))
            .collect();
        let harness = Harness::new(1, &pool).await;

        for _ in 0..30 {
            let value: u64 = rng.r#gen();
            let picked = harness
                .registry
                .pick_random_candidate(&FixedEntropy::new(value))
                .await
                .unwrap();

            assert!(pool.contains(&picked.value()));
            assert_eq!(picked.value(), pool[(value % pool.len() as u64) as usize]);
        }
    }
}

#[tokio::test]
async fn test_selection_is_reproducible_for_a_fixed_script() {
    let harness = Harness::new(1, &[10, 20, 30]).await;
    let script = vec![7, 0, 2, u64::MAX, 4];

    let mut runs = Vec::new();
    for _ in 0..2 {
        let entropy = SequenceEntropy::new(script.clone());
        let mut picks = Vec::new();
        for _ in 0..script.len() {
            picks.push(harness.registry.pick_random_candidate(&entropy).await.unwrap());
        }
        runs.push(picks);
    }

    assert_eq!(runs[0], runs[1]);
    // u64::MAX mod 3 = 0
    assert_eq!(runs[0][3], ProjectId::new(10));
}

#[tokio::test]
async fn test_duplicate_entries_weigh_more() {
    let harness = Harness::new(1, &[5, 5, 5, 6]).await;

    let mut fives = 0;
    for value in 0..400u64 {
        let picked = harness
            .registry
            .pick_random_candidate(&FixedEntropy::new(value))
            .await
            .unwrap();
        if picked == ProjectId::new(5) {
            fives += 1;
        }
    }

    assert_eq!(fives, 300);
}

#[tokio::test]
async fn test_empty_pool_never_yields_a_default() {
    let harness = Harness::new(1, &[]).await;

    for value in [0, 1, u64::MAX] {
        let result = harness
            .registry
            .pick_random_candidate(&FixedEntropy::new(value))
            .await;
        assert!(matches!(result, Err(DelegateError::EmptyCandidateSet)));
    }
    assert_eq!(select_index(0, 0), None);
}
