/// A framework-neutral description of something to draw.
///
/// The controller builds these for footers and tags item nodes with bookkeeping attributes;
/// a [`crate::RenderSurface`] turns them into live elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Attributes in insertion order. Setting an existing name replaces its value in place.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(Element {
            tag: tag.into(),
            ..Element::default()
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Sets an attribute. No-op on text nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element(el) = &mut self {
            el.set_attr(name.into(), value.into());
        }
        self
    }

    /// Appends a class to the `class` attribute. Empty class names are ignored.
    pub fn class(mut self, class: &str) -> Self {
        if let Self::Element(el) = &mut self {
            el.add_class(class);
        }
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        if let Self::Element(el) = &mut self {
            el.children.push(child);
        }
        self
    }

    pub fn text_child(self, text: impl Into<String>) -> Self {
        self.child(Node::text(text))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element(el) => el.get_attr(name),
            Self::Text(_) => None,
        }
    }

    /// Concatenated text content, depth first.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }
}

impl Element {
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: String, value: String) {
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() {
            return;
        }
        let next = match self.get_attr("class") {
            Some(existing) if existing.split_whitespace().any(|c| c == class) => return,
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attr("class".to_owned(), next);
    }
}
