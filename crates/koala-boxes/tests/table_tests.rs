//! Integration tests for anonymous table objects and the table grid.
//!
//! [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)

mod common;

use common::{block_line, body, body_children, build, first_table, page, parent, text};
use koala_boxes::{Border, BorderGrids, BoxKind, LayoutBox};
use koala_css::{AutoLength, BorderStyle, ColorValue, LengthValue, Side};
use serde_json::{Value, json};

/// An element with `display` set, for tag names without UA styles.
fn x(tag: &str, display: &str, children: &Value) -> Value {
    json!({"tag": tag, "style": {"display": display}, "children": children})
}

fn cell(tag: &str, content: &str) -> Value {
    parent(tag, "TableCell", vec![parent(tag, "Line", vec![text(tag, content)])])
}

/// `(grid_x, colspan, rowspan)` of the cells, row by row.
fn spans(group: &LayoutBox) -> Vec<Vec<(usize, usize, usize)>> {
    group
        .children
        .iter()
        .map(|row| {
            row.children
                .iter()
                .map(|cell| (cell.grid_x, cell.colspan, cell.rowspan))
                .collect()
        })
        .collect()
}

fn td(attrs: &Value) -> Value {
    json!({"tag": "td", "attrs": attrs})
}

fn tr(cells: Vec<Value>) -> Value {
    json!({"tag": "tr", "children": cells})
}

#[test]
fn test_table_model_and_whitespace() {
    let ws = "\n        ";
    let structure = build(page(json!([x("x-table", "table", &json!([
        ws,
        x("x-tr", "table-row", &json!([
            ws, x("x-th", "table-cell", &json!(["foo"])),
            ws, x("x-th", "table-cell", &json!(["bar"])), ws
        ])),
        ws,
        x("x-tfoot", "table-footer-group", &json!([])),
        ws,
        x("x-thead", "table-header-group", &json!([x("x-th", "table-cell", &json!([]))])),
        ws,
        {"tag": "x-caption", "style": {"display": "table-caption", "caption-side": "bottom"}},
        ws,
        x("x-thead", "table-header-group", &json!([])),
        ws,
        x("x-col", "table-column", &json!([])),
        ws,
        x("x-caption", "table-caption", &json!(["top caption"])),
        ws,
        x("x-tr", "table-row", &json!([ws, x("x-td", "table-cell", &json!(["baz"])), ws])),
        ws
    ]))])));

    assert_eq!(
        body_children(&structure),
        json!([parent(
            "x-table",
            "Block",
            vec![
                parent("x-caption", "TableCaption", vec![parent("x-caption", "Line", vec![text("x-caption", "top caption")])]),
                parent(
                    "x-table",
                    "Table",
                    vec![
                        parent("x-table", "TableColumnGroup", vec![parent("x-col", "TableColumn", vec![])]),
                        parent(
                            "x-thead",
                            "TableRowGroup",
                            vec![parent("x-thead", "TableRow", vec![parent("x-th", "TableCell", vec![])])]
                        ),
                        parent(
                            "x-table",
                            "TableRowGroup",
                            vec![parent("x-tr", "TableRow", vec![cell("x-th", "foo"), cell("x-th", "bar")])]
                        ),
                        parent("x-thead", "TableRowGroup", vec![]),
                        parent(
                            "x-table",
                            "TableRowGroup",
                            vec![parent("x-tr", "TableRow", vec![cell("x-td", "baz")])]
                        ),
                        parent("x-tfoot", "TableRowGroup", vec![]),
                    ]
                ),
                parent("x-caption", "TableCaption", vec![]),
            ]
        )])
    );

    let table = first_table(&structure);
    assert!(table.children[0].is_header);
    assert!(!table.children[3].is_header);
    assert!(table.children[5].is_footer);
}

#[test]
fn test_misparented_cells_get_a_table() {
    let structure = build(page(json!([
        "\n      ",
        {"tag": "span", "style": {"display": "table-cell"}, "children": ["foo"]},
        "\n      ",
        {"tag": "span", "style": {"display": "table-cell"}, "children": ["bar"]},
        "\n   "
    ])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "body",
            "Block",
            vec![parent(
                "body",
                "Table",
                vec![parent(
                    "body",
                    "TableRowGroup",
                    vec![parent("body", "TableRow", vec![cell("span", "foo"), cell("span", "bar")])]
                )]
            )]
        )])
    );
}

#[test]
fn test_column_groups_keep_only_columns() {
    let structure = build(page(json!([
        x("span", "table-column-group", &json!([
            "1",
            x("em", "table-column", &json!(["2", {"tag": "strong", "children": ["3"]}])),
            {"tag": "strong", "children": ["4"]}
        ])),
        x("ins", "table-column-group", &json!([]))
    ])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "body",
            "Block",
            vec![parent(
                "body",
                "Table",
                vec![
                    parent("span", "TableColumnGroup", vec![parent("em", "TableColumn", vec![])]),
                    parent("ins", "TableColumnGroup", vec![parent("ins", "TableColumn", vec![])]),
                ]
            )]
        )])
    );
}

#[test]
fn test_table_content_gets_rows_and_cells() {
    let structure = build(page(json!([x("x-table", "table", &json!(["foo ", {"tag": "div"}]))])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "x-table",
            "Block",
            vec![parent(
                "x-table",
                "Table",
                vec![parent(
                    "x-table",
                    "TableRowGroup",
                    vec![parent(
                        "x-table",
                        "TableRow",
                        vec![parent(
                            "x-table",
                            "TableCell",
                            vec![
                                block_line("x-table", vec![text("x-table", "foo ")]),
                                parent("div", "Block", vec![]),
                            ]
                        )]
                    )]
                )]
            )]
        )])
    );
}

#[test]
fn test_row_group_content_gets_rows() {
    let structure = build(page(json!([x(
        "x-thead",
        "table-header-group",
        &json!([{"tag": "div"}, x("x-td", "table-cell", &json!([]))])
    )])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "body",
            "Block",
            vec![parent(
                "body",
                "Table",
                vec![parent(
                    "x-thead",
                    "TableRowGroup",
                    vec![parent(
                        "x-thead",
                        "TableRow",
                        vec![
                            parent("x-thead", "TableCell", vec![parent("div", "Block", vec![])]),
                            parent("x-td", "TableCell", vec![]),
                        ]
                    )]
                )]
            )]
        )])
    );
}

#[test]
fn test_rows_in_an_inline_get_an_inline_table() {
    let structure = build(page(json!([
        {"tag": "span", "children": [x("x-tr", "table-row", &json!([]))]}
    ])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "body",
            "Line",
            vec![parent(
                "span",
                "Inline",
                vec![parent(
                    "span",
                    "InlineBlock",
                    vec![parent(
                        "span",
                        "InlineTable",
                        vec![parent("span", "TableRowGroup", vec![parent("x-tr", "TableRow", vec![])])]
                    )]
                )]
            )]
        )])
    );
}

#[test]
fn test_whitespace_around_an_inline_table_is_kept() {
    let structure = build(page(json!([
        {"tag": "span", "children": [
            "\n  ",
            x("em", "table-cell", &json!([])),
            "\n  ",
            x("em", "table-cell", &json!([])),
            "\n"
        ]}
    ])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "body",
            "Line",
            vec![parent(
                "span",
                "Inline",
                vec![
                    text("span", " "),
                    parent(
                        "span",
                        "InlineBlock",
                        vec![parent(
                            "span",
                            "InlineTable",
                            vec![parent(
                                "span",
                                "TableRowGroup",
                                vec![parent(
                                    "span",
                                    "TableRow",
                                    vec![parent("em", "TableCell", vec![]), parent("em", "TableCell", vec![])]
                                )]
                            )]
                        )]
                    ),
                    text("span", " "),
                ]
            )]
        )])
    );
}

#[test]
fn test_consecutive_rows_share_a_table() {
    let structure = build(page(json!([
        x("x-tr", "table-row", &json!([])),
        "\t",
        x("x-tr", "table-row", &json!([]))
    ])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "body",
            "Block",
            vec![parent(
                "body",
                "Table",
                vec![parent(
                    "body",
                    "TableRowGroup",
                    vec![parent("x-tr", "TableRow", vec![]), parent("x-tr", "TableRow", vec![])]
                )]
            )]
        )])
    );
}

#[test]
fn test_wrapper_takes_the_outer_properties() {
    let structure = build(page(json!([
        {"tag": "table", "style": {"margin": "1px", "padding": "2px"}}
    ])));
    let wrapper = &body(&structure).children[0];
    let table = first_table(&structure);
    assert_eq!(wrapper.kind, BoxKind::Block);
    assert_eq!(table.kind, BoxKind::Table);
    assert_eq!(wrapper.style.margin_top(), AutoLength::Length(LengthValue::Px(1.0)));
    assert_eq!(wrapper.style.padding_top(), LengthValue::ZERO);
    assert_eq!(table.style.margin_top(), AutoLength::Length(LengthValue::ZERO));
    assert_eq!(table.style.padding_top(), LengthValue::Px(2.0));
}

// ---------------------------------------------------------------------------
// Grid positions
//
// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
// ---------------------------------------------------------------------------

#[test]
fn test_spanning_columns_are_copied() {
    let structure = build(page(json!([
        {"tag": "table", "children": [
            {"tag": "col", "attrs": {"span": "3"}, "style": {"width": "10px"}},
            {"tag": "col", "attrs": {"span": "2"}}
        ]}
    ])));
    let table = first_table(&structure);
    assert_eq!(table.column_groups.len(), 1);
    let columns = &table.column_groups[0].children;
    let widths: Vec<AutoLength> = columns.iter().map(|column| column.style.width()).collect();
    let ten = AutoLength::Length(LengthValue::Px(10.0));
    assert_eq!(widths, [ten, ten, ten, AutoLength::Auto, AutoLength::Auto]);
    let grid_x: Vec<usize> = columns.iter().map(|column| column.grid_x).collect();
    assert_eq!(grid_x, [0, 1, 2, 3, 4]);
    assert_ne!(columns[0].id, columns[1].id);
}

#[test]
fn test_nested_column_positions() {
    let structure = build(page(json!([
        {"tag": "table", "children": [
            {"tag": "col", "attrs": {"span": "2"}},
            {"tag": "colgroup", "attrs": {"span": "2"}},
            {"tag": "colgroup", "children": [
                {"tag": "col"},
                {"tag": "col", "attrs": {"span": "2"}}
            ]},
            {"tag": "col"}
        ]}
    ])));
    let table = first_table(&structure);
    let positions: Vec<(usize, Vec<usize>)> = table
        .column_groups
        .iter()
        .map(|group| (group.grid_x, group.children.iter().map(|column| column.grid_x).collect()))
        .collect();
    assert_eq!(
        positions,
        [(0, vec![0, 1]), (2, vec![2, 3]), (4, vec![4, 5, 6]), (7, vec![7])]
    );
}

#[test]
fn test_colspan_and_rowspan() {
    // +---+---+---+
    // | A | B | C | X
    // +---+---+---+
    // | D |     E | X
    // +---+---+   +---+
    // |  F ...|   |   |   <-- overlap
    // +---+---+---+   +
    // | H | X   X | G |
    // +---+---+   +   +
    // | I | J | X |   |
    // +---+---+   +---+
    let structure = build(page(json!([
        {"tag": "table", "children": [
            tr(vec![td(&json!({})), td(&json!({})), td(&json!({}))]),
            tr(vec![td(&json!({})), td(&json!({"colspan": "2", "rowspan": "2"}))]),
            tr(vec![td(&json!({"colspan": "2"})), td(&json!({"rowspan": "0"}))]),
            tr(vec![td(&json!({}))]),
            tr(vec![td(&json!({})), td(&json!({}))])
        ]}
    ])));
    let table = first_table(&structure);
    assert_eq!(
        spans(&table.children[0]),
        [
            vec![(0, 1, 1), (1, 1, 1), (2, 1, 1)],
            vec![(0, 1, 1), (1, 2, 2)],
            vec![(0, 2, 1), (3, 1, 3)],
            vec![(0, 1, 1)],
            vec![(0, 1, 1), (1, 1, 1)],
        ]
    );
}

#[test]
fn test_rowspan_is_clamped_to_the_row_group() {
    let structure = build(page(json!([
        {"tag": "table", "children": [
            {"tag": "tbody", "children": [
                tr(vec![td(&json!({"rowspan": "5"})), td(&json!({}))]),
                tr(vec![td(&json!({}))])
            ]},
            {"tag": "tbody", "children": [tr(vec![td(&json!({})), td(&json!({}))])]}
        ]}
    ])));
    let table = first_table(&structure);
    assert_eq!(
        spans(&table.children[0]),
        [vec![(0, 1, 2), (1, 1, 1)], vec![(1, 1, 1)]]
    );
    assert_eq!(spans(&table.children[1]), [vec![(0, 1, 1), (1, 1, 1)]]);
}

#[test]
fn test_only_the_first_header_and_footer_move() {
    let group = |tag: &str, id: &str| json!({"tag": tag, "attrs": {"id": id}});
    let structure = build(page(json!([
        {"tag": "table", "children": [
            group("tbody", "b1"),
            group("tfoot", "f1"),
            group("thead", "h1"),
            group("tfoot", "f2"),
            group("thead", "h2")
        ]}
    ])));
    let table = first_table(&structure);
    let dom_ids: Vec<(String, bool, bool)> = table
        .children
        .iter()
        .map(|group| (group.element_tag.clone(), group.is_header, group.is_footer))
        .collect();
    assert_eq!(
        dom_ids,
        [
            ("thead".to_string(), true, false),
            ("tbody".to_string(), false, false),
            ("tfoot".to_string(), false, false),
            ("thead".to_string(), false, false),
            ("tfoot".to_string(), false, true),
        ]
    );
}

// ---------------------------------------------------------------------------
// Collapsed borders
//
// [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
// ---------------------------------------------------------------------------

type Segment = Option<(BorderStyle, f64, ColorValue)>;

/// A drawn segment, or `None` when nothing is drawn.
fn segment(border: &Border) -> Segment {
    (border.width != 0.0).then_some((border.style, border.width, border.color))
}

/// The `(vertical, horizontal)` segments of the first table.
fn segments(table: &LayoutBox) -> (Vec<Vec<Segment>>, Vec<Vec<Segment>>) {
    let grids = table.collapsed_border_grid.as_ref().expect("collapsed borders");
    let map = |grid: &Vec<Vec<Border>>| -> Vec<Vec<Segment>> {
        grid.iter().map(|row| row.iter().map(segment).collect()).collect()
    };
    (map(&grids.vertical), map(&grids.horizontal))
}

fn solid(width: f64, color: ColorValue) -> Segment {
    Some((BorderStyle::Solid, width, color))
}

fn styled_td(style: &Value) -> Value {
    json!({"tag": "td", "style": style})
}

fn collapsed_table(style: &Value, children: Vec<Value>) -> Value {
    let mut style = style.clone();
    style["border-collapse"] = json!("collapse");
    page(json!([{"tag": "table", "style": style, "children": children}]))
}

#[test]
fn test_border_grid_only_for_collapsed_tables() {
    let structure = build(page(json!([{"tag": "table", "children": [tr(vec![td(&json!({}))])]}])));
    assert!(first_table(&structure).collapsed_border_grid.is_none());

    let structure = build(collapsed_table(&json!({}), Vec::new()));
    assert_eq!(
        first_table(&structure).collapsed_border_grid,
        Some(BorderGrids::default())
    );
}

#[test]
fn test_wider_borders_win() {
    let red_td = || styled_td(&json!({"border": "1px solid red"}));
    let structure = build(collapsed_table(
        &json!({"border": "3px solid black"}),
        vec![tr(vec![red_td(), red_td()]), tr(vec![red_td(), red_td()])],
    ));
    let table = first_table(&structure);
    let black = solid(3.0, ColorValue::BLACK);
    let red = solid(1.0, ColorValue::rgb(255, 0, 0));
    let (vertical, horizontal) = segments(table);
    assert_eq!(vertical, [vec![black, red, black], vec![black, red, black]]);
    assert_eq!(horizontal, [vec![black, black], vec![red, red], vec![black, black]]);

    // Each side of a border belongs half to each neighbour.
    assert_eq!(table.dimensions.border.get(Side::Top), 1.5);
    let cell_a = &table.children[0].children[0].children[0];
    assert_eq!(cell_a.dimensions.border.get(Side::Right), 0.5);
    assert_eq!(cell_a.dimensions.border.get(Side::Left), 1.5);
}

#[test]
fn test_hidden_borders_win_and_none_loses() {
    let td_style = |extra: Option<&str>| {
        let mut style = json!({"border": "3px solid"});
        if let Some(border_style) = extra {
            style["border-style"] = json!(border_style);
        }
        styled_td(&style)
    };
    let structure = build(collapsed_table(
        &json!({"border": "3px solid"}),
        vec![
            tr(vec![td_style(None), td_style(Some("hidden"))]),
            tr(vec![td_style(None), td_style(Some("none"))]),
        ],
    ));
    let black = solid(3.0, ColorValue::BLACK);
    let (vertical, horizontal) = segments(first_table(&structure));
    assert_eq!(vertical, [vec![black, None, None], vec![black, black, black]]);
    assert_eq!(horizontal, [vec![black, None], vec![black, None], vec![black, black]]);
}

#[test]
fn test_cells_beat_columns_and_the_table() {
    let red_td = || styled_td(&json!({"border": "1px solid red"}));
    let row = || tr(vec![red_td(), red_td(), red_td()]);
    let structure = build(collapsed_table(
        &json!({"border": "5px solid yellow"}),
        vec![
            json!({"tag": "col", "style": {"border": "3px solid black"}}),
            row(),
            tr(vec![
                red_td(),
                styled_td(&json!({"border": "5px dashed blue"})),
                styled_td(&json!({"border": "5px solid lime"})),
            ]),
            row(),
            row(),
        ],
    ));
    let yellow = solid(5.0, ColorValue::rgb(255, 255, 0));
    let black = solid(3.0, ColorValue::BLACK);
    let red = solid(1.0, ColorValue::rgb(255, 0, 0));
    let blue = Some((BorderStyle::Dashed, 5.0, ColorValue::rgb(0, 0, 255)));
    let lime = solid(5.0, ColorValue::rgb(0, 255, 0));
    let (vertical, horizontal) = segments(first_table(&structure));
    assert_eq!(
        vertical,
        [
            vec![yellow, black, red, yellow],
            vec![yellow, blue, lime, lime],
            vec![yellow, black, red, yellow],
            vec![yellow, black, red, yellow],
        ]
    );
    assert_eq!(
        horizontal,
        [
            vec![yellow, yellow, yellow],
            vec![red, blue, lime],
            vec![red, blue, lime],
            vec![red, red, red],
            vec![yellow, yellow, yellow],
        ]
    );
}

#[test]
fn test_no_border_inside_spanning_cells() {
    let col = || json!({"tag": "col", "style": {"border": "3px solid"}});
    let row = |cells: Vec<Value>| json!({"tag": "tr", "style": {"border": "3px solid"}, "children": cells});
    let structure = build(collapsed_table(
        &json!({}),
        vec![
            col(),
            col(),
            col(),
            row(vec![td(&json!({"rowspan": "2"})), td(&json!({})), td(&json!({}))]),
            row(vec![td(&json!({"colspan": "2"}))]),
        ],
    ));
    let black = solid(3.0, ColorValue::BLACK);
    let (vertical, horizontal) = segments(first_table(&structure));
    assert_eq!(
        vertical,
        [vec![black, black, black, black], vec![black, black, None, black]]
    );
    assert_eq!(
        horizontal,
        [vec![black, black, black], vec![None, black, black], vec![black, black, black]]
    );
}
