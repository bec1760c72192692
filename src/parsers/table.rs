use crate::dom::{SnapshotElement, extract_text};
use crate::notation::repair_text;
use crate::utils::clean_text;

/// Parsed table: header cells plus body rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// `el` itself when it is a table, or the table at the end of a chain of single-child wrappers
pub fn table_container(el: &SnapshotElement) -> Option<&SnapshotElement> {
    let mut current = el;
    loop {
        if current.is("table") {
            return Some(current);
        }
        let mut children = current.child_elements();
        let only = children.next()?;
        if children.next().is_some() || !current.own_text_is_blank() {
            return None;
        }
        current = only;
    }
}

/// Headers come from `thead`, else from the first row; body rows from `tbody`, else the
/// remaining rows. Parsers insert an implicit `tbody`, so a table without `thead` has its
/// header row inside it.
pub fn parse_table(table: &SnapshotElement, parse_math: bool) -> Option<ParsedTable> {
    let mut head_rows = Vec::new();
    let mut body_rows = Vec::new();

    for child in table.child_elements() {
        match child.name.as_str() {
            "thead" => head_rows.extend(child.child_elements().filter(|e| e.is("tr"))),
            "tbody" | "tfoot" => body_rows.extend(child.child_elements().filter(|e| e.is("tr"))),
            "tr" => body_rows.push(child),
            _ => {}
        }
    }

    let (headers, rows) = match head_rows.first() {
        Some(head) => (row_cells(head, parse_math), body_rows),
        None => {
            let (first, rest) = body_rows.split_first()?;
            (row_cells(first, parse_math), rest.to_vec())
        }
    };

    let rows = rows.into_iter().map(|row| row_cells(row, parse_math)).filter(|cells| !cells.is_empty()).collect();
    Some(ParsedTable { headers, rows })
}

fn row_cells(row: &SnapshotElement, parse_math: bool) -> Vec<String> {
    row.child_elements().filter(|e| e.is("td") || e.is("th")).map(|cell| cell_text(cell, parse_math)).collect()
}

fn cell_text(cell: &SnapshotElement, parse_math: bool) -> String {
    let raw = extract_text(cell);
    let repaired = if parse_math { repair_text(&raw) } else { raw };
    clean_text(&repaired).lines().filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}
