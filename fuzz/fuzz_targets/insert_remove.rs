#![no_main]
use cfxml::{from_str, to_string_with, Matcher, NewElement, Position, WriteConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(mut doc) = from_str(s) {
            let before = to_string_with(&doc, &WriteConfig::verbatim());
            let root = doc.root();
            let new = NewElement::new("FuzzInserted").text("x");
            if doc.insert_child(root, new, Position::AtEnd).is_ok() {
                let removed = doc.remove_child(root, &Matcher::local("FuzzInserted"));
                if matches!(removed, Ok(Some(_))) && !before.contains("FuzzInserted") {
                    assert_eq!(to_string_with(&doc, &WriteConfig::verbatim()), before);
                }
            }
        }
    }
});
