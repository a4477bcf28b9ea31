use std::fs;

use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, mo_bytes, stderr, stdout};

#[test]
fn test_build_writes_snapshot_layout() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;

    assert_cmd_snapshot!(
        test.build_command()
            .args(["releases/0.G", "--created-at", "2023-03-01T12:00:00Z"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
        Built 0.G (2 objects, 1 mod, 2 locales)
    ✓ 1 built, 0 skipped, 0 failed

    ----- stderr -----
    "
    );

    for path in [
        "data/0.G/all.json",
        "data/0.G/all_mods.json",
        "data/0.G/lang/de.json",
        "data/0.G/lang/zh_CN.json",
        "data/0.G/lang/zh_CN_pinyin.json",
    ] {
        assert!(test.exists(path), "{path} should exist");
    }
    assert!(!test.exists("data/0.G/lang/de_pinyin.json"));
    assert!(!test.exists("data/.0.G.partial"));

    Ok(())
}

#[test]
fn test_build_base_document() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;

    test.build_command()
        .args(["releases/0.G", "--created-at", "2023-03-01T12:00:00Z"])
        .output()?;

    let all = test.read_json("data/0.G/all.json")?;
    assert_eq!(all["build_number"], "0.G");
    assert_eq!(all["release"]["tag_name"], "0.G");
    assert_eq!(all["release"]["prerelease"], false);
    assert_eq!(all["release"]["created_at"], "2023-03-01T12:00:00Z");
    assert_eq!(all["modlist"], json!(["magiclysm"]));
    assert_eq!(
        all["data"][0],
        json!({
            "type": "GENERIC",
            "id": "rock",
            "name": "rock",
            "__filename": "data/json/items/tools.json#L2-L6"
        })
    );
    assert_eq!(
        all["data"][1]["__filename"],
        "data/json/items/tools.json#L7-L11"
    );

    Ok(())
}

#[test]
fn test_build_mods_document_drops_obsolete_mods() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;

    test.build_command().arg("releases/0.G").output()?;

    let mods = test.read_json("data/0.G/all_mods.json")?;
    assert_eq!(
        mods,
        json!({
            "magiclysm": {
                "info": {
                    "type": "MOD_INFO",
                    "id": "magiclysm",
                    "name": "Magiclysm",
                    "__filename": "data/mods/magiclysm/modinfo.json#L1-L1",
                    "__mod": "magiclysm"
                },
                "data": [{
                    "type": "GENERIC",
                    "id": "wand",
                    "__filename": "data/mods/magiclysm/items.json#L1-L1",
                    "__mod": "magiclysm"
                }]
            }
        })
    );

    Ok(())
}

#[test]
fn test_build_translation_documents() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;

    test.build_command().arg("releases/0.G").output()?;

    assert_eq!(
        test.read_json("data/0.G/lang/zh_CN.json")?,
        json!({
            "": {"language": "zh_CN", "plural-forms": "nplurals=1; plural=0;"},
            "rock": "石头",
            "stick": "木棍"
        })
    );
    assert_eq!(
        test.read_json("data/0.G/lang/zh_CN_pinyin.json")?,
        json!({
            "": {"language": "zh_CN", "plural-forms": "nplurals=1; plural=0;"},
            "rock": "shi tou",
            "stick": "mu gun"
        })
    );

    Ok(())
}

#[test]
fn test_build_skips_existing_snapshot_unless_forced() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;
    test.write_file("data/0.G/all.json", "{}")?;

    assert_cmd_snapshot!(test.build_command().arg("releases/0.G"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
      Skipped 0.G (already built)
    ✓ 0 built, 1 skipped, 0 failed

    ----- stderr -----
    ");
    assert_eq!(test.read_file("data/0.G/all.json")?, "{}");

    let output = test
        .build_command()
        .args(["releases/0.G", "--force"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(test.read_json("data/0.G/all.json")?["build_number"], "0.G");

    Ok(())
}

#[test]
fn test_build_skips_forbidden_tags() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("cdda-experimental-2021-07-09-1837")?;

    assert_cmd_snapshot!(
        test.build_command()
            .arg("releases/cdda-experimental-2021-07-09-1837"),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
      Skipped cdda-experimental-2021-07-09-1837 (forbidden tag)
    ✓ 0 built, 1 skipped, 0 failed

    ----- stderr -----
    "
    );
    assert!(!test.exists("data/cdda-experimental-2021-07-09-1837"));

    Ok(())
}

#[test]
fn test_failing_release_does_not_stop_the_others() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("good")?;
    test.write_release("broken")?;
    test.write_file(
        "releases/broken/data/json/items/tools.json",
        "[{\"id\": \"rock\"},\n{\"id\": ",
    )?;

    let output = test
        .build_command()
        .args(["releases/broken", "releases/good"])
        .env("RUST_LOG", "info")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Failed broken"));
    assert!(stderr(&output).contains("Error while processing broken"));
    assert!(!test.exists("data/broken"));
    assert!(test.exists("data/good/all.json"));

    Ok(())
}

#[test]
fn test_build_with_release_metadata_file() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.H")?;
    test.write_file(
        "release.json",
        r#"{"tag_name":"0.H","prerelease":true,"created_at":"2024-05-01T00:00:00Z","name":"0.H Herbert"}"#,
    )?;

    let output = test
        .build_command()
        .args(["releases/0.H", "--release", "release.json", "--out", "snapshots"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let all = test.read_json("snapshots/0.H/all.json")?;
    assert_eq!(all["release"]["prerelease"], true);
    assert_eq!(all["release"]["name"], "0.H Herbert");

    Ok(())
}

#[test]
fn test_build_uses_config_patterns() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;
    test.write_file(
        ".harvestrc.json",
        r#"{ "phoneticLocalePattern": "^de$", "outputRoot": "out" }"#,
    )?;

    let output = test.build_command().arg("releases/0.G").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert!(test.exists("out/0.G/lang/de_pinyin.json"));
    assert!(!test.exists("out/0.G/lang/zh_CN_pinyin.json"));

    Ok(())
}

#[test]
fn test_build_missing_source_fails() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.build_command().arg("releases/nope"), @r"
    success: false
    exit_code: 1
    ----- stdout -----
       Failed nope: Source directory releases/nope does not exist
    ✘ 0 built, 0 skipped, 1 failed

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_build_falls_back_to_compiled_catalogs() -> Result<()> {
    let test = CliTest::new()?;
    test.write_release("0.G")?;
    fs::remove_dir_all(test.root().join("releases/0.G/lang/po"))?;
    test.write_bytes(
        "releases/0.G/lang/mo/zh_CN/LC_MESSAGES/cataclysm-dda.mo",
        &mo_bytes(&[("", "Language: zh_CN\n"), ("rock", "石头")]),
    )?;

    let output = test.build_command().arg("releases/0.G").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_eq!(
        test.read_json("data/0.G/lang/zh_CN.json")?,
        json!({"": {"language": "zh_CN"}, "rock": "石头"})
    );
    assert_eq!(
        test.read_json("data/0.G/lang/zh_CN_pinyin.json")?,
        json!({"": {"language": "zh_CN"}, "rock": "shi tou"})
    );
    assert!(!test.exists("data/0.G/lang/de.json"));

    Ok(())
}
