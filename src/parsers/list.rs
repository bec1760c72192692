use crate::dom::{SnapshotElement, SnapshotNode, extract_text};

pub fn is_list(el: &SnapshotElement) -> bool {
    el.is("ol") || el.is("ul")
}

/// Flatten a list into prefixed lines, one per item.
///
/// Ordered items are numbered from the list's `start` attribute (default 1), unordered items
/// get a bullet. Nested lists follow their parent item on their own lines. Math inside each
/// item is reconstructed before the text is taken.
pub fn flatten_list(list: &SnapshotElement) -> String {
    let mut lines = Vec::new();
    push_list_lines(list, &mut lines);
    lines.join("\n")
}

fn push_list_lines(list: &SnapshotElement, lines: &mut Vec<String>) {
    let ordered = list.is("ol");
    let mut number = list.attr("start").and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(1);

    for item in list.child_elements().filter(|e| e.is("li")) {
        let (body, nested) = split_nested_lists(item);
        let text = single_line(&extract_text(&body));

        if !text.is_empty() {
            let prefix = if ordered { format!("{}. ", number) } else { "• ".to_string() };
            lines.push(format!("{}{}", prefix, text));
        }
        if ordered {
            number += 1;
        }

        for nested_list in nested {
            push_list_lines(&nested_list, lines);
        }
    }
}

/// Copy of `item` without its direct child lists, plus those lists
fn split_nested_lists(item: &SnapshotElement) -> (SnapshotElement, Vec<SnapshotElement>) {
    let mut body = item.clone();
    let mut nested = Vec::new();
    body.children.retain(|child| match child {
        SnapshotNode::Element(el) if is_list(el) => {
            nested.push(el.clone());
            false
        }
        _ => true,
    });
    (body, nested)
}

fn single_line(text: &str) -> String {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}
