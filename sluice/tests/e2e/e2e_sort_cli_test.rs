//! End-to-end: a `sort` `ValidatedCommand` through `presentation::dispatch`,
//! the same path `main` takes after CLI parsing.

use sluice::presentation::dispatch;
use sluice_bootstrap::cli::ValidatedCommand;

#[tokio::test]
async fn sort_command_writes_a_sorted_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, "delta\nalpha\ncharlie\nbravo\n").unwrap();
    let output = dir.path().join("out.txt");

    let command = ValidatedCommand::Sort {
        inputs: vec![input],
        output: output.clone(),
        memory_limit_mb: 16,
        unique: false,
        reverse: false,
    };

    dispatch(command).await.unwrap();

    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["alpha", "bravo", "charlie", "delta"]);
}
