//! Live stylesheet editing example.
//!
//! Parses a small stylesheet, reports recovered parse errors, edits the rule
//! tree through the object model and prints each change as it happens.
//!
//! Run with: cargo run -p lattice-cssom --example live_edit

use lattice_cssom::prelude::*;

const CSS: &str = r#"
@import url("base.css") screen;
h1 { font-size: 2em; color: navy }
p { margin: 0 0 1em; line-height: }
@media (max-width: 600px) { h1 { font-size: 1.5em } }
"#;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("Live edit example");
    println!("=================");
    println!();

    let (sheet, errors) = StyleSheetBuilder::new()
        .href("demo.css")
        .build_with_diagnostics(CSS);
    for error in &errors {
        println!("recovered: {}", error);
    }

    sheet.connect_changed(|change| {
        println!("changed: {:?} ({} rules)", change.mutation, change.sheet.css_rules().len());
    });

    let heading = sheet.css_rules().item(1).expect("sample has a style rule");
    let style = heading.as_style().expect("rule 1 is a style rule").style();
    style
        .set_property("color", "rebeccapurple", "important")
        .expect("valid declaration");

    sheet
        .insert_rule("footer { border-top: 1px solid #ccc }", sheet.css_rules().len())
        .expect("valid rule");

    match sheet.insert_rule("@namespace svg url(http://www.w3.org/2000/svg);", 1) {
        Ok(_) => println!("namespace inserted"),
        Err(e) => println!("rejected: {}", e),
    }

    let media = sheet.css_rules().item(3).expect("sample has a media rule");
    if let Some(media) = media.as_media() {
        media.media().append_medium("print").expect("valid medium");
    }

    println!();
    println!("{}", sheet.css_text());
    println!();
    println!("escaped id: #{}", escape("1st-heading"));
}
