//! Style, class and content helpers
//!
//! Getters read the first element. `css`, the class mutators, `hide` and
//! `show` touch every element. The other setters only touch the first.

use fos_dom::{DOMTokenList, NodeId};

use crate::host::{DomHost, HostError};
use crate::wrapper::Wrapper;

impl<H: DomHost + ?Sized> Wrapper<'_, H> {
    /// Copy each property/value pair onto every element's inline style
    pub fn css<I, K, V>(&self, styles: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let styles: Vec<(K, V)> = styles.into_iter().collect();
        for node in self.iter() {
            for (property, value) in &styles {
                report(node, self.host.set_style(node, property.as_ref(), value.as_ref()));
            }
        }
        self
    }

    /// Inner markup of the first element
    pub fn html(&self) -> Option<String> {
        self.first().and_then(|node| self.host.inner_html(node))
    }

    /// Replace the first element's children with parsed `markup`
    pub fn set_html(&self, markup: &str) -> &Self {
        if let Some(node) = self.first() {
            report(node, self.host.set_inner_html(node, markup));
        }
        self
    }

    /// Text content of the first element
    pub fn text(&self) -> Option<String> {
        self.first().and_then(|node| self.host.text_content(node))
    }

    pub fn set_text(&self, text: &str) -> &Self {
        if let Some(node) = self.first() {
            report(node, self.host.set_text_content(node, text));
        }
        self
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.first().and_then(|node| self.host.attribute(node, name))
    }

    pub fn set_attr(&self, name: &str, value: &str) -> &Self {
        if let Some(node) = self.first() {
            report(node, self.host.set_attribute(node, name, value));
        }
        self
    }

    /// Whether the first element carries the class token `name`
    pub fn has_class(&self, name: &str) -> bool {
        self.attr("class")
            .is_some_and(|class| DOMTokenList::from_string(&class).contains(name))
    }

    /// Append `name` to every element's class list unless already present
    pub fn add_class(&self, name: &str) -> &Self {
        for node in self.iter() {
            let class = self.host.attribute(node, "class").unwrap_or_default();
            if DOMTokenList::from_string(&class).contains(name) {
                continue;
            }
            let updated = if class.is_empty() {
                name.to_string()
            } else {
                format!("{} {}", class, name)
            };
            report(node, self.host.set_attribute(node, "class", &updated));
        }
        self
    }

    /// Drop every class token equal to `name`
    pub fn remove_class(&self, name: &str) -> &Self {
        for node in self.iter() {
            let Some(class) = self.host.attribute(node, "class") else {
                continue;
            };
            let mut tokens = DOMTokenList::from_string(&class);
            tokens.remove(&[name]);
            report(node, self.host.set_attribute(node, "class", &tokens.value()));
        }
        self
    }

    /// Flip `name` on every element independently
    pub fn toggle_class(&self, name: &str) -> &Self {
        for node in self.iter() {
            let class = self.host.attribute(node, "class").unwrap_or_default();
            let mut tokens = DOMTokenList::from_string(&class);
            tokens.toggle(name);
            report(node, self.host.set_attribute(node, "class", &tokens.value()));
        }
        self
    }

    pub fn hide(&self) -> &Self {
        self.css([("display", "none")])
    }

    pub fn show(&self) -> &Self {
        self.css([("display", "inherit")])
    }
}

fn report(node: NodeId, result: Result<(), HostError>) {
    if let Err(e) = result {
        tracing::debug!("skipping {:?}: {}", node, e);
    }
}
