//! End-to-end: `bucket put` followed by `bucket get` and `bucket ls`
//! `ValidatedCommand`s through `presentation::dispatch`.

use sluice::presentation::dispatch;
use sluice_bootstrap::cli::{BucketAction, ValidatedCommand};

#[tokio::test]
async fn put_then_get_round_trips_through_the_local_bucket() {
    let bucket_root = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source = source_dir.path().join("payload.txt");
    std::fs::write(&source, b"round trip payload").unwrap();

    dispatch(ValidatedCommand::Bucket {
        action: BucketAction::Put { source, key: "data/payload.txt".to_string() },
        bucket_root: bucket_root.path().to_path_buf(),
    })
    .await
    .unwrap();

    dispatch(ValidatedCommand::Bucket {
        action: BucketAction::Ls { prefix: "data/".to_string() },
        bucket_root: bucket_root.path().to_path_buf(),
    })
    .await
    .unwrap();

    let destination = source_dir.path().join("restored.txt");
    dispatch(ValidatedCommand::Bucket {
        action: BucketAction::Get { key: "data/payload.txt".to_string(), destination: destination.clone() },
        bucket_root: bucket_root.path().to_path_buf(),
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read(&destination).unwrap(), b"round trip payload");
}
