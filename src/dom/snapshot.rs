use scraper::{ElementRef, Node};

/// Owned deep copy of a DOM subtree.
///
/// The parsed page is never modified; any structural rewrite happens on a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotNode {
    Element(SnapshotElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<SnapshotNode>,
}

impl SnapshotElement {
    /// Deep-copy `element` and everything below it. Comments and processing instructions
    /// are dropped.
    pub fn capture(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let attrs = value.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect();

        let mut children = Vec::new();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => children.push(SnapshotNode::Text(text.to_string())),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        children.push(SnapshotNode::Element(Self::capture(child_element)));
                    }
                }
                _ => {}
            }
        }

        Self { name: value.name().to_ascii_lowercase(), attrs, children }
    }

    /// Synthetic container, used to hold a single node while rewriting it
    pub fn fragment(children: Vec<SnapshotNode>) -> Self {
        Self { name: "#fragment".to_string(), attrs: Vec::new(), children }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Case-insensitive substring match against the raw class attribute
    pub fn class_contains(&self, needle: &str) -> bool {
        self.attr("class").is_some_and(|c| c.to_ascii_lowercase().contains(needle))
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &SnapshotElement> {
        self.children.iter().filter_map(|child| match child {
            SnapshotNode::Element(el) => Some(el),
            SnapshotNode::Text(_) => None,
        })
    }

    pub fn has_element_children(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// True when every direct text child is whitespace
    pub fn own_text_is_blank(&self) -> bool {
        self.children.iter().all(|child| match child {
            SnapshotNode::Text(text) => text.trim().is_empty(),
            SnapshotNode::Element(_) => true,
        })
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                SnapshotNode::Text(text) => out.push_str(text),
                SnapshotNode::Element(el) => el.collect_text(out),
            }
        }
    }

    /// First descendant (depth-first, document order) matching `pred`, excluding `self`
    pub fn find_descendant(&self, pred: &dyn Fn(&SnapshotElement) -> bool) -> Option<&SnapshotElement> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants matching `pred` in document order, excluding `self`
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&SnapshotElement) -> bool, out: &mut Vec<&'a SnapshotElement>) {
        for child in self.child_elements() {
            if pred(child) {
                out.push(child);
            }
            child.find_all(pred, out);
        }
    }
}
