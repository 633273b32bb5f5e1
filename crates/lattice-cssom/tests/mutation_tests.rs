//! Tests for mutating a live rule tree and observing the change signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lattice_cssom::prelude::*;
use parking_lot::Mutex;

/// Record every mutation the sheet reports.
fn record(sheet: &CssStyleSheet) -> Arc<Mutex<Vec<Mutation>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    sheet.connect_changed(move |change| sink.lock().push(change.mutation));
    log
}

#[test]
fn test_insert_then_delete_restores_list() {
    let sheet = CssStyleSheet::from_css("a { color: red } b { color: blue }");
    let before = sheet.css_text();
    let originals = sheet.css_rules().to_vec();

    sheet.insert_rule("i { top: 0 }", 1).unwrap();
    assert_eq!(sheet.css_rules().len(), 3);
    sheet.delete_rule(1).unwrap();

    assert_eq!(sheet.css_text(), before);
    let after = sheet.css_rules().to_vec();
    assert_eq!(after.len(), originals.len());
    assert!(after.iter().zip(&originals).all(|(a, b)| a.ptr_eq(b)));
}

#[test]
fn test_namespace_after_style_is_rejected() {
    let sheet = CssStyleSheet::from_css("a { color: red }");
    let err = sheet
        .insert_rule("@namespace svg url(http://www.w3.org/2000/svg);", 0)
        .unwrap_err();
    assert!(err.is_hierarchy());
    assert_eq!(sheet.css_text(), "a { color: red; }");
}

#[test]
fn test_invalid_css_text_leaves_rule_untouched() {
    let sheet = CssStyleSheet::from_css(".x > .y { color: red; margin: 0 !important }");
    let rule = sheet.css_rules().item(0).unwrap();
    let before = rule.css_text();
    let log = record(&sheet);

    assert!(rule.set_css_text("not valid {{").unwrap_err().is_syntax());
    assert!(rule.set_css_text("@media print { }").unwrap_err().is_hierarchy());

    assert_eq!(rule.css_text(), before);
    assert_eq!(rule.as_style().unwrap().selector_text(), ".x > .y");
    assert!(log.lock().is_empty());
}

#[test]
fn test_css_text_replaces_in_place() {
    let sheet = CssStyleSheet::from_css("a { color: red } b { }");
    let rule = sheet.css_rules().item(0).unwrap();

    rule.set_css_text("p.note { color: green }").unwrap();
    assert!(sheet.css_rules().item(0).unwrap().ptr_eq(&rule));
    assert_eq!(sheet.css_text(), "p.note { color: green; }\nb { }");
}

#[test]
fn test_declaration_editing() {
    let sheet = CssStyleSheet::from_css("a { color: red }");
    let rule = sheet.css_rules().item(0).unwrap();
    let style = rule.as_style().unwrap().style();

    style.set_property("Margin-Top", "4px", "").unwrap();
    assert_eq!(style.get_property_value("margin-top"), "4px");
    assert_eq!(style.get_property_priority("margin-top"), "");

    style.set_property("color", "blue", "important").unwrap();
    assert_eq!(style.get_property_value("color"), "blue");
    assert_eq!(style.get_property_priority("color"), "important");
    // Overwriting keeps the original position.
    assert_eq!(style.item(0).as_deref(), Some("color"));

    assert!(style.set_property("color", "red", "urgent").unwrap_err().is_syntax());
    assert!(style.set_property("color", "red;", "").unwrap_err().is_syntax());
    assert_eq!(style.get_property_value("color"), "blue");

    assert_eq!(style.remove_property("color"), "blue");
    assert_eq!(style.get_property_value("color"), "");
    assert_eq!(style.remove_property("color"), "");

    style.set_property("margin-top", "", "").unwrap();
    assert_eq!(style.length(), 0);
    assert_eq!(sheet.css_text(), "a { }");
}

#[test]
fn test_property_values_keep_their_spelling() {
    let style = CssStyleDeclaration::new();
    let values = [
        "0.1234567px",
        "123456789",
        "16777217",
        "1e3",
        "33.3333333%",
        "U+4E00-9FFF",
        "'quoted'",
        "calc(100% / 3)",
    ];
    for value in values {
        style.set_property("x", value, "").unwrap();
        assert_eq!(style.get_property_value("x"), value);
    }
}

#[test]
fn test_deeply_nested_text_is_rejected() {
    let sheet = CssStyleSheet::from_css("a { top: 0 }");
    let log = record(&sheet);
    let depth = 100_000;

    let unclosed = format!("a {{ b: {} }}", "[".repeat(depth));
    assert!(sheet.insert_rule(&unclosed, 0).unwrap_err().is_syntax());
    let balanced = format!("a {{ b: {}{} }}", "(".repeat(depth), ")".repeat(depth));
    assert!(sheet.insert_rule(&balanced, 0).unwrap_err().is_syntax());
    let groups = format!("{}{}", "@media x {".repeat(depth), "}".repeat(depth));
    assert!(sheet.insert_rule(&groups, 0).unwrap_err().is_syntax());

    let style = sheet.css_rules().item(0).unwrap();
    let style = style.as_style().unwrap().style();
    assert!(style.set_property("b", &"(".repeat(depth), "").unwrap_err().is_syntax());

    assert_eq!(sheet.css_text(), "a { top: 0; }");
    assert!(log.lock().is_empty());
}

#[test]
fn test_custom_properties_are_case_sensitive() {
    let style = CssStyleDeclaration::new();
    style.set_property("--Gap", "1px", "").unwrap();
    style.set_property("--gap", "2px", "").unwrap();

    assert_eq!(style.length(), 2);
    assert_eq!(style.get_property_value("--Gap"), "1px");
    assert_eq!(style.get_property_value("--gap"), "2px");
}

#[test]
fn test_medium_editing() {
    let sheet = CssStyleSheet::from_css("@media screen { a { } }");
    let rule = sheet.css_rules().item(0).unwrap();
    let media = rule.as_media().unwrap().media();

    media.append_medium("print").unwrap();
    media.append_medium("print").unwrap();
    assert_eq!(media.to_vec(), vec!["screen".to_owned(), "print".to_owned()]);

    assert!(media.delete_medium("tv").unwrap_err().is_not_found());
    media.delete_medium("screen").unwrap();
    assert_eq!(media.media_text(), "print");

    assert!(media.append_medium("").unwrap_err().is_syntax());
    assert!(media.append_medium("a, b").unwrap_err().is_syntax());
    assert_eq!(rule.css_text(), "@media print {\n  a { }\n}");
}

#[test]
fn test_notifications() {
    let sheet = CssStyleSheet::from_css("@media screen { a { color: red } }");
    let log = record(&sheet);

    let media_rule = sheet.css_rules().item(0).unwrap();
    let nested = media_rule.css_rules().unwrap();
    let media = media_rule.as_media().unwrap();

    sheet.insert_rule("b { }", 1).unwrap();
    media.insert_rule("c { }", 0).unwrap();
    nested
        .item(1)
        .unwrap()
        .as_style()
        .unwrap()
        .style()
        .set_property("color", "blue", "")
        .unwrap();
    media.media().append_medium("print").unwrap();
    media.media().append_medium("print").unwrap();
    sheet.media().set_media_text("all");
    media.delete_rule(0).unwrap();
    sheet.delete_rule(1).unwrap();
    sheet.set_disabled(true);
    sheet.set_disabled(true);

    assert_eq!(
        *log.lock(),
        vec![
            Mutation::RuleInserted { index: 1 },
            Mutation::RuleInserted { index: 0 },
            Mutation::DeclarationsChanged,
            Mutation::MediaChanged,
            Mutation::MediaChanged,
            Mutation::RuleDeleted { index: 0 },
            Mutation::RuleDeleted { index: 1 },
            Mutation::DisabledChanged,
        ]
    );
}

#[test]
fn test_failed_mutations_do_not_notify() {
    let sheet = CssStyleSheet::from_css("a { }");
    let log = record(&sheet);

    assert!(sheet.insert_rule("b { }", 9).is_err());
    assert!(sheet.insert_rule("b {", 0).is_err());
    assert!(sheet.delete_rule(4).is_err());
    assert!(sheet.media().delete_medium("print").is_err());

    assert!(log.lock().is_empty());
}

#[test]
fn test_slots_may_read_the_sheet() {
    let sheet = CssStyleSheet::from_css("a { }");
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    sheet.connect_changed(move |change| {
        counter.store(change.sheet.css_rules().len(), Ordering::SeqCst);
    });

    sheet.insert_rule("b { }", 1).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_rule_identity_survives_index_shifts() {
    let sheet = CssStyleSheet::from_css("a { } b { } c { }");
    let held = sheet.css_rules().item(2).unwrap();

    sheet.delete_rule(0).unwrap();
    assert_eq!(sheet.css_rules().index_of(&held), Some(1));
    sheet.insert_rule("z { }", 0).unwrap();
    assert_eq!(sheet.css_rules().index_of(&held), Some(2));

    sheet.delete_rule(2).unwrap();
    assert_eq!(sheet.css_rules().index_of(&held), None);
    assert!(held.parent_style_sheet().is_none());
    assert_eq!(held.css_text(), "c { }");
}

#[test]
fn test_detached_rule_mutations_are_silent() {
    let sheet = CssStyleSheet::from_css("@media print { a { } }");
    let media_rule = sheet.css_rules().item(0).unwrap();
    let inner = media_rule.css_rules().unwrap().item(0).unwrap();
    sheet.delete_rule(0).unwrap();

    let log = record(&sheet);
    inner
        .as_style()
        .unwrap()
        .style()
        .set_property("color", "red", "")
        .unwrap();

    assert!(log.lock().is_empty());
    assert_eq!(inner.parent_rule().map(|r| r.rule_type()), Some(CssRuleType::Media));
    assert!(inner.parent_style_sheet().is_none());
}

#[test]
fn test_parent_links() {
    let sheet = CssStyleSheet::from_css("@supports (display: grid) { @media print { a { } } }");
    let supports = sheet.css_rules().item(0).unwrap();
    let media = supports.css_rules().unwrap().item(0).unwrap();
    let style = media.css_rules().unwrap().item(0).unwrap();

    assert!(supports.parent_rule().is_none());
    assert!(style.parent_rule().unwrap().ptr_eq(&media));
    assert!(media.parent_rule().unwrap().ptr_eq(&supports));
    assert!(style.parent_style_sheet().unwrap().ptr_eq(&sheet));

    let declarations = style.as_style().unwrap().style();
    assert!(declarations.parent_rule().unwrap().ptr_eq(&style));
}

#[test]
fn test_group_hierarchy() {
    let sheet = CssStyleSheet::from_css("@media print { } @page { }");
    let media = sheet.css_rules().item(0).unwrap();
    let page = sheet.css_rules().item(1).unwrap();

    let group = media.as_grouping().unwrap();
    assert!(group.insert_rule("@import url(a.css);", 0).unwrap_err().is_hierarchy());
    assert!(group.insert_rule("@namespace url(x);", 0).unwrap_err().is_hierarchy());
    group.insert_rule("@font-face { font-family: x }", 0).unwrap();

    let page = page.as_grouping().unwrap();
    assert!(page.insert_rule("a { }", 0).unwrap_err().is_hierarchy());
    page.insert_rule("@bottom-right { content: counter(page) }", 0).unwrap();
    assert_eq!(
        sheet.css_rules().item(1).unwrap().css_text(),
        "@page { @bottom-right { content: counter(page); } }"
    );
}

#[test]
fn test_replace_sync() {
    let sheet = CssStyleSheet::from_css("a { }");
    let old = sheet.css_rules().item(0).unwrap();
    let log = record(&sheet);

    let errors = sheet.replace_sync("@import url(x.css); b { top: 0 }");
    assert_eq!(errors.len(), 1);
    assert_eq!(sheet.css_text(), "b { top: 0; }");
    assert!(old.parent_style_sheet().is_none());
    assert_eq!(*log.lock(), vec![Mutation::RulesReplaced]);
}

#[test]
fn test_import_resolution() {
    let sheet = CssStyleSheet::from_css("@import url(base.css) print;");
    let rule = sheet.css_rules().item(0).unwrap();
    let import = rule.as_import().unwrap();
    assert!(import.style_sheet().is_none());
    let log = record(&sheet);

    let imported = CssStyleSheet::from_css("p { }");
    import.set_style_sheet(imported.clone()).unwrap();
    assert!(imported.owner_rule().unwrap().ptr_eq(&rule));
    assert!(import.style_sheet().unwrap().ptr_eq(&imported));

    // A sheet may not import itself.
    assert!(import.set_style_sheet(sheet.clone()).unwrap_err().is_hierarchy());
    assert_eq!(*log.lock(), vec![Mutation::ImportResolved]);
}

#[test]
fn test_standalone_declaration_does_not_notify() {
    let style = CssStyleDeclaration::parse("color: red; width: 1px !important");
    assert!(style.parent_rule().is_none());
    assert_eq!(style.length(), 2);

    style.set_property("color", "blue", "").unwrap();
    style.set_css_text("top: 0");
    assert_eq!(style.css_text(), "top: 0;");
}
