use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../cfxml/tests/fixtures/valid");

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cfxml() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("cfxml")?)
}

/// Copy a fixture into a fresh temp dir so the test can modify it
fn copy_fixture(name: &str) -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join(name);
    fs::copy(Path::new(FIXTURES).join(name), &target)?;
    Ok((dir, target))
}

#[test]
fn test_check_dump_fixture() -> TestResult {
    let path = Path::new(FIXTURES).join("Catalog.xml");
    cfxml()?.arg("check").arg(&path).assert().success();
    Ok(())
}

#[test]
fn test_check_rejects_malformed_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Broken.xml");
    fs::write(&path, "<a><b></a>")?;
    cfxml()?
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatched closing tag"));
    Ok(())
}

#[test]
fn test_child_add_form() -> TestResult {
    let (_dir, path) = copy_fixture("DataProcessor.xml")?;
    cfxml()?
        .args(["child", "add"])
        .arg(&path)
        .args(["--kind", "form", "--name", "Main"])
        .assert()
        .success();

    let written = fs::read_to_string(&path)?;
    assert!(written.contains("\t\t<ChildObjects>\r\n\t\t\t<Form>Main</Form>\r\n\t\t</ChildObjects>\r\n"));
    assert!(written.contains("<DefaultForm>DataProcessor.PriceUpdate.Form.Main</DefaultForm>"));
    Ok(())
}

#[test]
fn test_child_add_duplicate_fails_without_writing() -> TestResult {
    let (_dir, path) = copy_fixture("Catalog.xml")?;
    let before = fs::read(&path)?;
    cfxml()?
        .args(["child", "add"])
        .arg(&path)
        .args(["--kind", "Form", "--name", "ItemForm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[test]
fn test_child_remove_restores_file() -> TestResult {
    let (_dir, path) = copy_fixture("Catalog.xml")?;
    let before = fs::read(&path)?;
    for action in ["add", "remove"] {
        cfxml()?
            .args(["child", action])
            .arg(&path)
            .args(["--kind", "Template", "--name", "Label"])
            .assert()
            .success();
    }
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[test]
fn test_interface_create_if_missing() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("CommandInterface.xml");
    cfxml()?
        .arg("interface")
        .arg(&path)
        .args(["--operation", "hide", "--value", "Catalog.Goods.StandardCommand.Create"])
        .arg("--create-if-missing")
        .assert()
        .success();

    let written = fs::read_to_string(&path)?;
    assert!(written.starts_with("\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n"));
    assert!(written.contains(
        "\t\t<Command name=\"Catalog.Goods.StandardCommand.Create\">\r\n\t\t\t<Visibility>\r\n\t\t\t\t<xr:Common>false</xr:Common>"
    ));
    Ok(())
}

#[test]
fn test_interface_create_if_missing_in_new_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir
        .path()
        .join("Subsystems/Sales/Ext")
        .join("CommandInterface.xml");
    cfxml()?
        .arg("interface")
        .arg(&path)
        .args(["--operation", "hide", "--value", "Catalog.Goods.Command.Print"])
        .arg("--create-if-missing")
        .assert()
        .success();

    let written = fs::read_to_string(&path)?;
    assert!(written.contains("<Command name=\"Catalog.Goods.Command.Print\">"));
    Ok(())
}

#[test]
fn test_interface_missing_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("CommandInterface.xml");
    cfxml()?
        .arg("interface")
        .arg(&path)
        .args(["--operation", "hide", "--value", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_interface_definition_file() -> TestResult {
    let (dir, path) = copy_fixture("CommandInterface.xml")?;
    let definition = dir.path().join("ops.json");
    fs::write(
        &definition,
        r#"[
            {"operation": "show", "value": "Catalog.Goods.Command.Print"},
            {"operation": "place", "value": {"command": "Catalog.Goods.Command.Print", "group": "ActionsPanelTools"}},
            {"operation": "subsystem-order", "value": ["Subsystem.Sales", "Subsystem.Stock"]}
        ]"#,
    )?;
    cfxml()?
        .arg("interface")
        .arg(&path)
        .arg("--definition")
        .arg(&definition)
        .assert()
        .success();

    let written = fs::read_to_string(&path)?;
    let visibility = written.find("<CommandsVisibility>").ok_or("no visibility")?;
    let placement = written.find("<CommandsPlacement>").ok_or("no placement")?;
    let subsystems = written.find("<SubsystemsOrder>").ok_or("no subsystem order")?;
    let groups = written.find("<GroupsOrder>").ok_or("no group order")?;
    assert!(visibility < placement && placement < subsystems && subsystems < groups);
    assert!(written.contains("\t\t<Subsystem>Subsystem.Sales</Subsystem>\r\n\t\t<Subsystem>Subsystem.Stock</Subsystem>\r\n"));
    Ok(())
}

#[test]
fn test_unknown_interface_operation() -> TestResult {
    let (_dir, path) = copy_fixture("CommandInterface.xml")?;
    cfxml()?
        .arg("interface")
        .arg(&path)
        .args(["--operation", "rename", "--value", "[]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid operation: rename"));
    Ok(())
}

#[test]
fn test_subsystem_add_content() -> TestResult {
    let (_dir, path) = copy_fixture("Subsystem.xml")?;
    cfxml()?
        .arg("subsystem")
        .arg(&path)
        .args(["add-content", "Document.Invoice", "Catalog.Goods"])
        .assert()
        .success();

    let written = fs::read_to_string(&path)?;
    assert!(written.contains(
        "Document.SalesOrder</xr:Item>\r\n\t\t\t\t<xr:Item xsi:type=\"xr:MDObjectRef\">Document.Invoice</xr:Item>\r\n\t\t\t</Content>"
    ));
    assert_eq!(written.matches("Catalog.Goods</xr:Item>").count(), 1);
    Ok(())
}

#[test]
fn test_property_no_write_prints_document() -> TestResult {
    let (_dir, path) = copy_fixture("Catalog.xml")?;
    let before = fs::read(&path)?;
    cfxml()?
        .arg("--no-write")
        .arg("property")
        .arg(&path)
        .args(["--name", "Comment", "--value", "Goods and services"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\t\t\t<Comment>Goods and services</Comment>\r\n"));
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[test]
fn test_info_paging() -> TestResult {
    let path = Path::new(FIXTURES).join("Subsystem.xml");
    cfxml()?
        .arg("info")
        .arg(&path)
        .args(["--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("MetaDataObject\n  Subsystem\n    Properties\n"))
        .stdout(predicate::str::contains("[TRUNCATED] Shown 3 of"));

    cfxml()?
        .arg("info")
        .arg(&path)
        .args(["--offset", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO] Offset 1000 exceeds total lines"));
    Ok(())
}
