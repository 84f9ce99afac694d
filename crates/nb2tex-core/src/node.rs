//! Content node tree
//!
//! A small element tree built from HTML fragments (markdown cells rendered to
//! HTML, or HTML outputs). Text is stored the way lxml stores it: `text` is
//! the text before an element's first child, and each child's `tail` is the
//! text between it and the next sibling element.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Element kinds the renderers dispatch on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Div,
    /// `h1` through `h6`
    Heading(u8),
    Paragraph,
    Pre,
    UnorderedList,
    OrderedList,
    ListItem,
    Blockquote,
    Table,
    TableRow,
    HeaderCell,
    DataCell,
    Image,
    Iframe,
    Style,
    Script,
    Break,
    Emphasis,
    Italic,
    Bold,
    Strong,
    Code,
    Font,
    Anchor,
    /// Any tag without a dedicated variant
    Other(String),
}

impl Tag {
    /// Classify an HTML tag name
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "h6" => Tag::Heading(6),
            "p" => Tag::Paragraph,
            "pre" => Tag::Pre,
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "blockquote" => Tag::Blockquote,
            "table" => Tag::Table,
            "tr" => Tag::TableRow,
            "th" => Tag::HeaderCell,
            "td" => Tag::DataCell,
            "img" => Tag::Image,
            "iframe" => Tag::Iframe,
            "style" => Tag::Style,
            "script" => Tag::Script,
            "br" => Tag::Break,
            "em" => Tag::Emphasis,
            "i" => Tag::Italic,
            "b" => Tag::Bold,
            "strong" => Tag::Strong,
            "code" => Tag::Code,
            "font" => Tag::Font,
            "a" => Tag::Anchor,
            other => Tag::Other(other.to_string()),
        }
    }

    /// HTML name of the tag, for messages
    pub fn name(&self) -> String {
        match self {
            Tag::Heading(level) => format!("h{level}"),
            Tag::Other(name) => name.clone(),
            other => other.static_name().to_string(),
        }
    }

    fn static_name(&self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Paragraph => "p",
            Tag::Pre => "pre",
            Tag::UnorderedList => "ul",
            Tag::OrderedList => "ol",
            Tag::ListItem => "li",
            Tag::Blockquote => "blockquote",
            Tag::Table => "table",
            Tag::TableRow => "tr",
            Tag::HeaderCell => "th",
            Tag::DataCell => "td",
            Tag::Image => "img",
            Tag::Iframe => "iframe",
            Tag::Style => "style",
            Tag::Script => "script",
            Tag::Break => "br",
            Tag::Emphasis => "em",
            Tag::Italic => "i",
            Tag::Bold => "b",
            Tag::Strong => "strong",
            Tag::Code => "code",
            Tag::Font => "font",
            Tag::Anchor => "a",
            Tag::Heading(_) | Tag::Other(_) => "",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Tag::UnorderedList | Tag::OrderedList)
    }

    pub fn is_table_cell(&self) -> bool {
        matches!(self, Tag::HeaderCell | Tag::DataCell)
    }

    /// Inline markup that flows inside running text
    pub fn is_phrasing(&self) -> bool {
        matches!(
            self,
            Tag::Emphasis | Tag::Italic | Tag::Bold | Tag::Strong | Tag::Code | Tag::Font | Tag::Anchor
        )
    }
}

/// One element of the content tree
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub tag: Tag,
    /// Text before the first child element
    pub text: String,
    /// Text after this element, before the next sibling element
    pub tail: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            text: String::new(),
            tail: String::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All text inside this element, excluding its own tail
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Children with the given tag
    pub fn children_with<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a ContentNode> {
        self.children.iter().filter(move |c| &c.tag == tag)
    }
}

/// Parse an HTML fragment into a `div` rooted content tree
///
/// The fragment is parsed as an HTML5 document body, so unclosed tags and
/// entity references are handled the way a browser would. Table section
/// wrappers (`thead`, `tbody`, `tfoot`) are dissolved, leaving rows directly
/// under their table.
pub fn parse_html(html: &str) -> ContentNode {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let mut root = ContentNode::new(Tag::Div);
    if let Some(body) = find_element(&dom.document, "body") {
        append_children(&mut root, &body);
    }
    root
}

fn find_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: qual, .. } = &handle.data {
        if &*qual.local == name {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, name))
}

fn append_children(parent: &mut ContentNode, handle: &Handle) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => append_text(parent, &contents.borrow()),
            NodeData::Element { name, attrs, .. } => {
                let local: &str = &name.local;
                if parent.tag == Tag::Table && matches!(local, "thead" | "tbody" | "tfoot") {
                    append_children(parent, child);
                    continue;
                }

                let mut node = ContentNode::new(Tag::from_name(local));
                node.attrs = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                append_children(&mut node, child);
                parent.children.push(node);
            }
            // Comments, doctypes and processing instructions carry no content
            _ => {}
        }
    }
}

fn append_text(parent: &mut ContentNode, text: &str) {
    match parent.children.last_mut() {
        Some(last) => last.tail.push_str(text),
        None => parent.text.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_tail() {
        let root = parse_html("<p>Hello <em>big</em> world</p>");
        assert_eq!(root.children.len(), 1);

        let p = &root.children[0];
        assert_eq!(p.tag, Tag::Paragraph);
        assert_eq!(p.text, "Hello ");
        assert_eq!(p.children[0].tag, Tag::Emphasis);
        assert_eq!(p.children[0].text, "big");
        assert_eq!(p.children[0].tail, " world");
        assert_eq!(p.text_content(), "Hello big world");
    }

    #[test]
    fn test_entities_decoded() {
        let root = parse_html("<p>a &amp; b &lt; c</p>");
        assert_eq!(root.children[0].text, "a & b < c");
    }

    #[test]
    fn test_table_sections_flattened() {
        let root = parse_html(
            "<table><thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>",
        );
        let table = &root.children[0];
        assert_eq!(table.tag, Tag::Table);
        let rows: Vec<_> = table.children_with(&Tag::TableRow).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].children[0].tag, Tag::HeaderCell);
        assert_eq!(rows[1].children[0].text_content(), "1");
    }

    #[test]
    fn test_attributes() {
        let root = parse_html(r#"<p><a href="http://example.com/foo">link</a></p>"#);
        let a = &root.children[0].children[0];
        assert_eq!(a.tag, Tag::Anchor);
        assert_eq!(a.attr("href"), Some("http://example.com/foo"));
        assert_eq!(a.attr("title"), None);
    }

    #[test]
    fn test_comments_dropped() {
        let root = parse_html("<p>a<!-- note -->b</p>");
        assert_eq!(root.children[0].text, "ab");
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(Tag::from_name("H3"), Tag::Heading(3));
        assert_eq!(Tag::Heading(3).name(), "h3");
        assert_eq!(Tag::from_name("span").name(), "span");
        assert_eq!(Tag::Anchor.name(), "a");
    }
}
