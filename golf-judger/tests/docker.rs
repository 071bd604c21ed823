mod common;

use golf_judger::docker::DockerProvider;
use golf_judger::hole;
use golf_judger::{Config, Judger};

use std::fs;
use std::path::Path;
use std::sync::Arc;

const FIZZBUZZ: &str = "<?php for($i=1;$i<=NUM;$i++)echo$i%15?$i%5?$i%3?$i:Fizz:Buzz:FizzBuzz,\"\n\";";

const UCWORDS: &str = "<?=ucwords(STR);";

fn judger(workspace: &Path) -> Judger {
    let mut config = Config::default();
    config.judge.workspace_root = workspace.join("builds");
    config.docker.languages_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../languages");
    Judger::new(&config, Arc::new(DockerProvider::new(&config.docker)))
}

#[tokio::test]
#[ignore = "needs a docker daemon"]
async fn fizzbuzz_on_php() {
    common::init();
    let workspace = tempfile::tempdir().unwrap();
    let script = workspace.path().join("fizzbuzz.php");
    fs::write(&script, FIZZBUZZ).unwrap();

    let judger = judger(workspace.path());
    let verdict = judger
        .judge(&hole::load("fizzbuzz").unwrap(), "php-5.5", &script)
        .await
        .unwrap();
    assert!(verdict.passed, "{:#?}", verdict);
}

#[tokio::test]
#[ignore = "needs a docker daemon"]
async fn disabled_ucwords_fails_at_runtime() {
    common::init();
    let workspace = tempfile::tempdir().unwrap();
    let script = workspace.path().join("ucwords.php");
    fs::write(&script, UCWORDS).unwrap();

    let judger = judger(workspace.path());
    let verdict = judger
        .judge(&hole::load("ucwords").unwrap(), "php-5.4", &script)
        .await
        .unwrap();
    assert!(!verdict.passed, "{:#?}", verdict);
}
