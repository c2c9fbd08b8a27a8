use std::fs;
use std::path::Path;

use cfxml::ops::{self, CommandInterface};
use cfxml::{from_str, to_string, ChildObjectKind, Document, EditSummary, FormPurpose};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn fixture(name: &str) -> Result<(String, Document), Box<dyn std::error::Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/valid")
        .join(name);
    let source = fs::read_to_string(path)?;
    let doc = from_str(&source)?;
    Ok((source, doc))
}

fn values(items: &[&str]) -> Vec<String> {
    items.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_untouched_document_is_byte_identical() -> TestResult {
    for name in ["Catalog.xml", "DataProcessor.xml", "Subsystem.xml"] {
        let (source, doc) = fixture(name)?;
        assert_eq!(to_string(&doc), source, "{name}");
    }
    Ok(())
}

#[test]
fn test_form_in_empty_child_objects() -> TestResult {
    let (source, mut doc) = fixture("DataProcessor.xml")?;
    ops::register_child(&mut doc, ChildObjectKind::Form, "Main")?;
    assert_eq!(
        to_string(&doc),
        source.replace(
            "\t\t<ChildObjects/>\r\n",
            "\t\t<ChildObjects>\r\n\t\t\t<Form>Main</Form>\r\n\t\t</ChildObjects>\r\n"
        )
    );
    Ok(())
}

#[test]
fn test_add_form_then_remove_restores_file() -> TestResult {
    let (source, mut doc) = fixture("DataProcessor.xml")?;
    let added = ops::add_form(&mut doc, "Main", FormPurpose::Object, false)?;
    assert_eq!(added, EditSummary { added: 1, removed: 0, modified: 1 });
    assert!(to_string(&doc)
        .contains("\t\t\t<DefaultForm>DataProcessor.PriceUpdate.Form.Main</DefaultForm>\r\n"));

    let removed = ops::unregister_child(&mut doc, ChildObjectKind::Form, "Main")?;
    assert_eq!(removed, EditSummary { added: 0, removed: 1, modified: 1 });
    assert_eq!(to_string(&doc), source);
    Ok(())
}

#[test]
fn test_form_lands_after_existing_forms() -> TestResult {
    let (source, mut doc) = fixture("Catalog.xml")?;
    ops::register_child(&mut doc, ChildObjectKind::Form, "ListForm")?;
    assert_eq!(
        to_string(&doc),
        source.replace(
            "\t\t\t<Form>ItemForm</Form>\r\n",
            "\t\t\t<Form>ItemForm</Form>\r\n\t\t\t<Form>ListForm</Form>\r\n"
        )
    );
    Ok(())
}

#[test]
fn test_failed_edit_leaves_document_unchanged() -> TestResult {
    let (source, mut doc) = fixture("Catalog.xml")?;
    let err = ops::register_child(&mut doc, ChildObjectKind::Form, "ItemForm").err();
    assert!(err.is_some_and(|e| e.is_conflict()));
    let err = ops::set_property(&mut doc, "NoSuchProperty", "1").err();
    assert!(err.is_some_and(|e| e.is_not_found()));
    assert_eq!(to_string(&doc), source);
    Ok(())
}

#[test]
fn test_synonym_edits() -> TestResult {
    let (source, mut doc) = fixture("Catalog.xml")?;
    assert!(ops::set_property(&mut doc, "Synonym", "Товары")?.is_empty());
    assert_eq!(to_string(&doc), source);

    assert_eq!(ops::set_property(&mut doc, "Synonym", "Номенклатура")?.modified, 1);
    assert_eq!(
        to_string(&doc),
        source.replace(
            "<v8:content>Товары</v8:content>",
            "<v8:content>Номенклатура</v8:content>"
        )
    );
    Ok(())
}

#[test]
fn test_owners_list_roundtrip() -> TestResult {
    let (source, mut doc) = fixture("Catalog.xml")?;
    let owners = values(&["Catalog.Suppliers"]);
    ops::add_list_items(&mut doc, "Owners", &owners)?;
    assert_eq!(
        to_string(&doc),
        source.replace(
            "\t\t\t<Owners/>\r\n",
            "\t\t\t<Owners>\r\n\t\t\t\t<xr:Item xsi:type=\"xr:MDObjectRef\">Catalog.Suppliers</xr:Item>\r\n\t\t\t</Owners>\r\n"
        )
    );
    ops::remove_list_items(&mut doc, "Owners", &owners)?;
    assert_eq!(to_string(&doc), source);
    Ok(())
}

#[test]
fn test_remove_last_field_then_add_back() -> TestResult {
    let (source, mut doc) = fixture("Catalog.xml")?;
    let code = values(&["Catalog.Goods.StandardAttribute.Code"]);
    assert_eq!(ops::remove_list_items(&mut doc, "InputByString", &code)?.removed, 1);
    assert!(to_string(&doc).contains(
        "<xr:Field>Catalog.Goods.StandardAttribute.Description</xr:Field>\r\n\t\t\t</InputByString>"
    ));
    assert_eq!(ops::add_list_items(&mut doc, "InputByString", &code)?.added, 1);
    assert_eq!(to_string(&doc), source);
    Ok(())
}

#[test]
fn test_subsystem_content_and_children() -> TestResult {
    let (source, mut doc) = fixture("Subsystem.xml")?;
    let invoice = values(&["Document.Invoice"]);
    ops::add_content(&mut doc, &invoice)?;
    assert_eq!(
        to_string(&doc),
        source.replace(
            "Document.SalesOrder</xr:Item>\r\n",
            "Document.SalesOrder</xr:Item>\r\n\t\t\t\t<xr:Item xsi:type=\"xr:MDObjectRef\">Document.Invoice</xr:Item>\r\n"
        )
    );
    ops::add_child_subsystem(&mut doc, "Returns")?;
    ops::remove_content(&mut doc, &invoice)?;
    ops::remove_child_subsystem(&mut doc, "Returns")?;
    assert_eq!(to_string(&doc), source);
    Ok(())
}

#[test]
fn test_command_interface_fixture() -> TestResult {
    let (source, mut doc) = fixture("CommandInterface.xml")?;
    let mut ci = CommandInterface::new(&mut doc)?;
    let open_list = values(&["Catalog.Goods.StandardCommand.OpenList"]);

    assert!(ci.show(&open_list)?.is_empty());
    assert_eq!(ci.hide(&open_list)?.modified, 1);
    ci.place("Catalog.Goods.Command.Print", "ActionsPanelTools")?;

    let expected = source
        .replace("<xr:Common>true</xr:Common>", "<xr:Common>false</xr:Common>")
        .replace(
            "\t</CommandsVisibility>\r\n",
            "\t</CommandsVisibility>\r\n\t<CommandsPlacement>\r\n\t\t<Command name=\"Catalog.Goods.Command.Print\">\r\n\t\t\t<CommandGroup>ActionsPanelTools</CommandGroup>\r\n\t\t\t<Placement>Auto</Placement>\r\n\t\t</Command>\r\n\t</CommandsPlacement>\r\n",
        );
    assert_eq!(to_string(&doc), expected);
    Ok(())
}

#[test]
fn test_new_command_interface_gets_written_in_dump_conventions() -> TestResult {
    let mut doc = from_str(&ops::command_interface::empty_document_source())?;
    CommandInterface::new(&mut doc)?.group_order(&values(&["NavigationPanelImportant"]))?;
    let out = to_string(&doc);
    assert!(out.starts_with("\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<CommandInterface"));
    assert!(out.ends_with(
        "\t<GroupsOrder>\r\n\t\t<Group>NavigationPanelImportant</Group>\r\n\t</GroupsOrder>\r\n</CommandInterface>"
    ));
    Ok(())
}

#[test]
fn test_edit_saved_file_on_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Subsystem.xml");
    let (source, _) = fixture("Subsystem.xml")?;
    fs::write(&path, &source)?;

    let mut doc = cfxml::load(&path)?;
    ops::add_child_subsystem(&mut doc, "Returns")?;
    cfxml::save(&doc, &path)?;

    let written = fs::read_to_string(&path)?;
    assert_eq!(
        written,
        source.replace(
            "\t\t<ChildObjects/>\r\n",
            "\t\t<ChildObjects>\r\n\t\t\t<Subsystem>Returns</Subsystem>\r\n\t\t</ChildObjects>\r\n"
        )
    );
    Ok(())
}
