use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stdout};

const NOW: &str = "2024-06-01T00:00:00Z";

fn snapshots() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_snapshot("0.F", false, "2020-01-01T00:00:00Z")?;
    test.write_snapshot("exp-recent", true, "2024-05-31T10:00:00Z")?;
    test.write_snapshot("exp-ancient", true, "2022-01-01T00:00:00Z")?;
    test.write_file("data/latest/all.json", "not a snapshot")?;
    Ok(test)
}

#[test]
fn test_prune_deletes_expired_prereleases() -> Result<()> {
    let test = snapshots()?;

    assert_cmd_snapshot!(test.prune_command().args(["--now", NOW]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
         Deleted exp-ancient (882 days old)
    ✓ deleted 1 snapshot, 2 kept
    Index written to data/builds.json

    ----- stderr -----
    ");
    assert!(!test.exists("data/exp-ancient"));
    assert!(test.exists("data/exp-recent/all.json"));
    assert!(test.exists("data/0.F/all.json"));
    assert!(test.exists("data/latest/all.json"));

    Ok(())
}

#[test]
fn test_prune_writes_index_newest_first() -> Result<()> {
    let test = snapshots()?;
    test.write_file("data/exp-recent/lang/zh_CN.json", r#"{"":{}}"#)?;
    test.write_file("data/exp-recent/lang/zh_CN_pinyin.json", r#"{"":{}}"#)?;

    test.prune_command().args(["--now", NOW]).output()?;

    assert_eq!(
        test.read_json("data/builds.json")?,
        json!([
            {
                "build_number": "exp-recent",
                "prerelease": true,
                "created_at": "2024-05-31T10:00:00Z",
                "langs": ["de", "zh_CN"]
            },
            {
                "build_number": "0.F",
                "prerelease": false,
                "created_at": "2020-01-01T00:00:00Z",
                "langs": ["de"]
            }
        ])
    );

    Ok(())
}

#[test]
fn test_prune_dry_run_changes_nothing() -> Result<()> {
    let test = snapshots()?;

    assert_cmd_snapshot!(test.prune_command().args(["--now", NOW, "--dry-run"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Would delete exp-ancient (882 days old)
    ✓ would delete 1 snapshot, 2 kept

    ----- stderr -----
    ");
    assert!(test.exists("data/exp-ancient/all.json"));
    assert!(!test.exists("data/builds.json"));

    Ok(())
}

#[test]
fn test_prune_leaves_unreadable_snapshots_alone() -> Result<()> {
    let test = snapshots()?;
    test.write_file("data/mystery/all.json", r#"{"data":[]}"#)?;

    let output = test.prune_command().args(["--now", NOW]).output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Unreadable mystery"));
    assert!(test.exists("data/mystery/all.json"));
    let index = test.read_json("data/builds.json")?;
    assert_eq!(index.as_array().map(Vec::len), Some(2));

    Ok(())
}

#[test]
fn test_prune_uses_configured_tiers() -> Result<()> {
    let test = snapshots()?;
    test.write_file(".harvestrc.json", r#"{ "retentionTiers": [1, 1, 1, 1] }"#)?;
    test.write_snapshot("exp-last-week", true, "2024-05-25T00:00:00Z")?;

    let output = test.prune_command().args(["--now", NOW]).output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(!test.exists("data/exp-last-week"));
    assert!(test.exists("data/exp-recent"));

    Ok(())
}

#[test]
fn test_prune_missing_data_dir_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.prune_command().args(["--data", "nowhere"]).output()?;

    assert_eq!(output.status.code(), Some(2));

    Ok(())
}
