//! Shards a CSV file by hash, then sorts each shard independently and
//! re-merges the results — confirming the shard and sort use cases compose:
//! the union of every shard's sorted output equals the full input sorted.

use sluice::application::use_cases::shard_file::{ShardFileConfig, ShardFileUseCase};
use sluice::application::use_cases::sort_file::{SortFileConfig, SortFileUseCase};
use sluice_bootstrap::cli::ShardStrategyArg;

#[test]
fn every_shard_sorted_and_merged_equals_the_whole_input_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    crate::common::write_lines(&input, &["5,e", "3,c", "1,a", "4,d", "2,b", "3,c2"]);
    let shards_dir = dir.path().join("shards");

    let report = ShardFileUseCase::new()
        .execute(ShardFileConfig {
            input,
            output: shards_dir.clone(),
            strategy: ShardStrategyArg::ByHash,
            shard_count: 3,
            key_column: 0,
        })
        .unwrap();
    assert_eq!(report.total(), 6);

    let mut all_sorted_lines = Vec::new();
    for shard_id in report.shard_ids() {
        let shard_path = shards_dir.join(shard_id);
        let sorted_path = dir.path().join(format!("{shard_id}.sorted"));
        SortFileUseCase::new()
            .execute(SortFileConfig {
                inputs: vec![shard_path],
                output: sorted_path.clone(),
                memory_limit_mb: 4,
                unique: false,
                reverse: false,
            })
            .unwrap();
        all_sorted_lines.extend(crate::common::read_lines(&sorted_path));
    }
    all_sorted_lines.sort();

    let mut expected = vec!["5,e".to_string(), "3,c".to_string(), "1,a".to_string(), "4,d".to_string(), "2,b".to_string(), "3,c2".to_string()];
    expected.sort();
    assert_eq!(all_sorted_lines, expected);
}
