//! Structured HTML document tree.
//!
//! Receipts and print-ready reports are built as a tree of [`Node`]s and rendered in one
//! place, so escaping and inline styling live here instead of in string templates. Output
//! never references an external stylesheet: print and PDF rasterizers receive it as-is.

/// Inline style fragments shared by every printable document
pub mod styles {
    pub const BODY: &str = concat!(
        "margin:0;padding:24px;font-family:'Segoe UI',Arial,sans-serif;color:#1f2933;",
        "background:#ffffff;",
    );
    pub const SHEET: &str = concat!(
        "max-width:760px;margin:0 auto;border:1px solid #d9e2ec;border-radius:8px;",
        "padding:28px;",
    );
    pub const HEADER: &str = concat!(
        "text-align:center;border-bottom:2px solid #1f4e79;padding-bottom:12px;",
        "margin-bottom:20px;",
    );
    pub const TITLE: &str = "margin:0;font-size:22px;color:#1f4e79;letter-spacing:0.5px;";
    pub const SUBTITLE: &str = "margin:4px 0 0;font-size:12px;color:#52606d;";
    pub const SECTION_TITLE: &str = concat!(
        "margin:20px 0 8px;font-size:15px;color:#1f4e79;border-bottom:1px solid #d9e2ec;",
        "padding-bottom:4px;",
    );
    pub const TABLE: &str = "width:100%;border-collapse:collapse;font-size:13px;";
    pub const TH: &str = concat!(
        "text-align:left;padding:6px 8px;background:#f0f4f8;border:1px solid #d9e2ec;",
        "font-weight:600;",
    );
    pub const TD: &str = "padding:6px 8px;border:1px solid #d9e2ec;";
    pub const TD_NUMERIC: &str = "padding:6px 8px;border:1px solid #d9e2ec;text-align:right;";
    pub const LABEL: &str =
        "padding:6px 8px;color:#52606d;width:40%;border-bottom:1px solid #f0f4f8;";
    pub const VALUE: &str = "padding:6px 8px;font-weight:600;border-bottom:1px solid #f0f4f8;";
    pub const NOTE: &str = concat!(
        "margin-top:16px;padding:10px 12px;background:#fffbea;",
        "border-left:3px solid #f0b429;font-size:13px;",
    );
    pub const STAMP: &str = concat!(
        "display:inline-block;margin-top:16px;padding:6px 14px;border:2px solid #2f8132;",
        "color:#2f8132;font-weight:700;border-radius:4px;",
    );
    pub const MUTED: &str = "color:#7b8794;font-size:12px;";
    pub const FOOTER: &str = concat!(
        "margin-top:28px;padding-top:10px;border-top:1px solid #d9e2ec;text-align:center;",
        "color:#7b8794;font-size:11px;",
    );
    pub const PLACEHOLDER: &str = concat!(
        "padding:16px;border:1px dashed #9fb3c8;color:#7b8794;text-align:center;",
        "font-size:12px;",
    );
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An HTML element with inline style, attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    style: Option<String>,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

/// Start a new element
pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        style: None,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

/// A text node; escaped on render
pub fn text(value: impl Into<String>) -> Node {
    Node::Text(value.into())
}

impl Element {
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(text(value))
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    fn is_void(&self) -> bool {
        matches!(self.tag, "meta" | "br" | "hr")
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if let Some(style) = &self.style {
            out.push_str(&format!(" style=\"{}\"", escape(style)));
        }
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        out.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.render_into(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    fn render_into(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.render_into(out),
            Node::Text(value) => out.push_str(&escape(value)),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }
}

/// A complete, self-contained HTML page
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    title: String,
    body: Vec<Node>,
}

impl HtmlDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Vec::new(),
        }
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.body.push(node.into());
    }

    pub fn render(&self) -> String {
        let page = el("html").attr("lang", "en").child(
            el("head")
                .child(el("meta").attr("charset", "utf-8"))
                .child(el("title").text(self.title.clone())),
        );
        let body = el("body").style(styles::BODY).children(self.body.iter().cloned());

        let mut out = String::from("<!DOCTYPE html>");
        Node::from(page.child(body)).render_into(&mut out);
        out
    }
}

/// Two-column label/value table used by receipts and filter summaries
pub fn key_value_table<'a, I>(rows: I) -> Element
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    el("table").style(styles::TABLE).children(rows.into_iter().map(|(label, value)| {
        el("tr")
            .child(el("td").style(styles::LABEL).text(label))
            .child(el("td").style(styles::VALUE).text(value))
    }))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
