use folio_babel::dialects::markdown;
use folio_babel::ir::nodes::{Align, Block, Inline, Table};
use folio_babel::WarningKind;

fn cell(s: &str) -> Vec<Inline> {
    vec![Inline::text(s)]
}

#[test]
fn test_table_alignment_import() {
    let md = "| Left | Center | Right | Plain |
|:---|:---:|---:|---|
| L | C | R | P |
";
    let parsed = markdown().parse(md);
    assert!(parsed.warnings.is_empty());

    let Block::Table(table) = &parsed.document.blocks()[0] else {
        panic!("Should have table");
    };
    assert_eq!(
        table.aligns,
        vec![Align::Left, Align::Center, Align::Right, Align::None]
    );
    assert_eq!(
        table.header,
        Some(vec![cell("Left"), cell("Center"), cell("Right"), cell("Plain")])
    );
    assert_eq!(table.rows, vec![vec![cell("L"), cell("C"), cell("R"), cell("P")]]);
}

#[test]
fn test_table_pipes_in_cells() {
    let md = "| Name | Link |
|---|---|
| a \\| b | [[Projects:Plan|plan]] |
";
    let parsed = markdown().parse(md);
    assert!(parsed.warnings.is_empty());

    let Block::Table(table) = &parsed.document.blocks()[0] else {
        panic!("Should have table");
    };
    assert_eq!(
        table.rows,
        vec![vec![
            cell("a | b"),
            vec![Inline::link("Projects:Plan", Some("plan"))],
        ]]
    );
}

#[test]
fn test_short_and_long_rows_follow_header() {
    let md = "| A | B |
|---|---|
| only |
| 1 | 2 | 3 |
";
    let parsed = markdown().parse(md);

    let Block::Table(table) = &parsed.document.blocks()[0] else {
        panic!("Should have table");
    };
    assert_eq!(
        table.rows,
        vec![vec![cell("only"), vec![]], vec![cell("1"), cell("2")]]
    );

    let lines: Vec<_> = parsed.warnings.iter().map(|w| w.line).collect();
    assert_eq!(lines, vec![Some(3), Some(4)]);
    assert!(parsed
        .warnings
        .iter()
        .all(|w| w.kind == WarningKind::ParseRecovery));
}

#[test]
fn test_separator_without_header_is_recovered() {
    let parsed = markdown().parse("|---|---|\n");

    assert_eq!(
        parsed.document.blocks(),
        vec![Block::paragraph(vec![Inline::text("|---|---|")])]
    );
    assert_eq!(parsed.warnings.len(), 1);
}

#[test]
fn test_table_round_trip() {
    let table = Block::Table(Table {
        header: Some(vec![cell("a|b"), cell("c")]),
        aligns: vec![Align::Left, Align::None],
        rows: vec![vec![cell("1"), cell("2")]],
    });
    let doc = folio_babel::Document::new(vec![table]);

    let dialect = markdown();
    let output = dialect.serialize(&doc);
    assert_eq!(output, "| a\\|b | c |\n|:--|---|\n| 1 | 2 |\n");

    let parsed = dialect.parse(&output);
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.document, doc);
}
