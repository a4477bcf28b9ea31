use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stdout};

fn snapshot_without_index(test: &CliTest) -> Result<()> {
    test.write_file(
        "data/exp-1/all.json",
        r#"{"build_number":"exp-1","release":{"tag_name":"exp-1","prerelease":true,"created_at":"2024-01-01T00:00:00Z"},"data":[{"id":"rock","name":"rock"},{"id":"gun","name":{"str":"rifle"}}]}"#,
    )?;
    test.write_file(
        "data/exp-1/lang/zh_CN.json",
        r#"{"":{"language":"zh_CN"},"rock":"石头","rifle":["步枪"]}"#,
    )?;
    test.write_file("data/exp-1/lang/de.json", r#"{"":{"language":"de"},"rock":"Stein"}"#)
}

#[test]
fn test_backfill_writes_missing_indexes() -> Result<()> {
    let test = CliTest::new()?;
    snapshot_without_index(&test)?;

    assert_cmd_snapshot!(test.backfill_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
      Indexed exp-1 zh_CN
    ✓ Backfilled 1 phonetic index, 0 failed

    ----- stderr -----
    ");
    assert_eq!(
        test.read_json("data/exp-1/lang/zh_CN_pinyin.json")?,
        json!({"": {"language": "zh_CN"}, "rock": "shi tou", "rifle": ["bu qiang"]})
    );
    assert!(!test.exists("data/exp-1/lang/de_pinyin.json"));

    Ok(())
}

#[test]
fn test_backfill_keeps_existing_indexes() -> Result<()> {
    let test = CliTest::new()?;
    snapshot_without_index(&test)?;
    test.write_file("data/exp-1/lang/zh_CN_pinyin.json", "{}")?;

    let output = test.backfill_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Backfilled 0 phonetic indexes, 0 failed"));
    assert_eq!(test.read_file("data/exp-1/lang/zh_CN_pinyin.json")?, "{}");

    Ok(())
}

#[test]
fn test_backfill_reports_broken_translation() -> Result<()> {
    let test = CliTest::new()?;
    snapshot_without_index(&test)?;
    test.write_file("data/exp-1/lang/zh_TW.json", "not json")?;

    let output = test.backfill_command().output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Failed exp-1 zh_TW"));
    assert!(test.exists("data/exp-1/lang/zh_CN_pinyin.json"));

    Ok(())
}
