use crate::{ListClasses, Node};

/// What sits below the last item. Exactly one state is shown at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Footer {
    /// Nothing: a load is in progress (the loading indicator covers it) or the list is empty
    /// without empty-state content.
    None,
    /// Zero items and empty-state content configured.
    Empty(String),
    /// More pages exist. Rendered as the load-more sentinel.
    LoadMore(String),
    /// Every item has been loaded.
    End(String),
    /// The last attempt failed; `retry` labels the retry affordance.
    Error { message: String, retry: String },
}

/// Inputs for [`Footer::compute`], with labels already resolved.
#[derive(Clone, Copy, Debug)]
pub struct FooterInputs<'a> {
    pub item_count: usize,
    pub loading: bool,
    pub has_more: bool,
    pub error: Option<&'a str>,
    pub empty: Option<&'a str>,
    pub load_more: &'a str,
    pub end: &'a str,
    pub retry: &'a str,
}

impl Footer {
    pub fn compute(inputs: FooterInputs<'_>) -> Self {
        if let Some(message) = inputs.error {
            return Self::Error {
                message: message.to_owned(),
                retry: inputs.retry.to_owned(),
            };
        }
        if inputs.loading {
            return Self::None;
        }
        match (inputs.item_count, inputs.has_more) {
            (0, _) => inputs
                .empty
                .map_or(Self::None, |content| Self::Empty(content.to_owned())),
            (_, true) => Self::LoadMore(inputs.load_more.to_owned()),
            (_, false) => Self::End(inputs.end.to_owned()),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::LoadMore(_))
    }

    /// A default node rendering, for surfaces that draw [`Node`] trees.
    pub fn to_node(&self, classes: &ListClasses) -> Option<Node> {
        let footer = |class: &str| Node::element("div").class(&classes.footer).class(class);
        let node = match self {
            Self::None => return None,
            Self::Empty(content) => footer(&classes.empty).text_child(content.clone()),
            Self::LoadMore(label) => footer(&classes.trigger)
                .attr("data-sentinel", "true")
                .child(
                    Node::element("button")
                        .attr("type", "button")
                        .attr("data-action", "load-more")
                        .text_child(label.clone()),
                ),
            Self::End(label) => footer(&classes.end).text_child(label.clone()),
            Self::Error { message, retry } => footer(&classes.error)
                .child(Node::element("span").text_child(message.clone()))
                .child(
                    Node::element("button")
                        .attr("type", "button")
                        .attr("data-action", "retry")
                        .text_child(retry.clone()),
                ),
        };
        Some(node)
    }
}
