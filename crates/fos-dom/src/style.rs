//! Inline style declarations (`element.style`)

/// Ordered list of inline `property: value` declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute. Malformed declarations are skipped.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::new();
        for decl in css_text.split(';') {
            if let Some((property, value)) = decl.split_once(':') {
                style.set_property(property, value);
            }
        }
        style
    }

    /// Set a property. An empty value removes it.
    pub fn set_property(&mut self, property: &str, value: &str) {
        let property = normalize_property(property);
        let value = value.trim();
        if property.is_empty() {
            return;
        }
        if value.is_empty() {
            self.remove_property(&property);
            return;
        }
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some((_, v)) => *v = value.to_string(),
            None => self.declarations.push((property, value.to_string())),
        }
    }

    /// Get a property value
    pub fn get_property(&self, property: &str) -> Option<&str> {
        let property = normalize_property(property);
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a property, returning its value
    pub fn remove_property(&mut self, property: &str) -> Option<String> {
        let property = normalize_property(property);
        let index = self.declarations.iter().position(|(p, _)| *p == property)?;
        Some(self.declarations.remove(index).1)
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize back to attribute text
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Accepts both `background-color` and `backgroundColor` spellings
fn normalize_property(property: &str) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let style = InlineStyle::parse("color: red; ; bogus; margin:0 auto");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get_property("margin"), Some("0 auto"));
        assert_eq!(style.css_text(), "color: red; margin: 0 auto;");
    }

    #[test]
    fn test_camel_case_property() {
        let mut style = InlineStyle::new();
        style.set_property("backgroundColor", "blue");
        assert_eq!(style.get_property("background-color"), Some("blue"));
    }

    #[test]
    fn test_overwrite_and_remove() {
        let mut style = InlineStyle::new();
        style.set_property("display", "none");
        style.set_property("display", "inherit");
        assert_eq!(style.get_property("display"), Some("inherit"));
        style.set_property("display", "");
        assert!(style.is_empty());
    }

    #[test]
    fn test_custom_property_kept_verbatim() {
        let mut style = InlineStyle::new();
        style.set_property("--mainColor", "teal");
        assert_eq!(style.get_property("--mainColor"), Some("teal"));
    }
}
