//! Inline style declarations (`element.style`).
//!
//! Declarations keep insertion order so `css_text()` reads back the way a
//! script wrote them. Values are stored verbatim; nothing here validates CSS.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse a `style` attribute / `cssText` string (`"a: b; c: d"`).
    /// Declarations without a colon are dropped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        style.set_css_text(text);
        style
    }

    /// Replace every declaration, as assigning `style.cssText` does.
    pub fn set_css_text(&mut self, text: &str) {
        self.decls.clear();
        for decl in text.split(';') {
            if let Some((name, value)) = decl.split_once(':') {
                let name = name.trim();
                let value = value.trim();
                if !name.is_empty() && !value.is_empty() {
                    self.set(name, value);
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `style.setProperty`: overwrite in place or append.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        match self.decls.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.decls.push((name, value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.decls.iter().position(|(n, _)| n == name)?;
        Some(self.decls.remove(pos).1)
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.decls.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn css_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_multiline_css_text() {
        let style = InlineStyle::parse(
            "
            position: fixed;
            top: 0;
            background: linear-gradient(90deg, #e94560, #ff6b8a);
            ",
        );
        assert_eq!(style.len(), 3);
        assert_eq!(style.get("position"), Some("fixed"));
        assert_eq!(
            style.get("background"),
            Some("linear-gradient(90deg, #e94560, #ff6b8a)")
        );
    }

    #[test]
    fn set_keeps_declaration_order() {
        let mut style = InlineStyle::default();
        style.set("opacity", "0");
        style.set("transform", "translateY(20px)");
        style.set("opacity", "1");
        assert_eq!(style.css_text(), "opacity: 1; transform: translateY(20px);");
    }

    #[test]
    fn remove_and_garbage_declarations() {
        let mut style = InlineStyle::parse("width: 0%; nonsense; : x; cursor: default");
        assert_eq!(style.len(), 2);
        assert_eq!(style.remove("width").as_deref(), Some("0%"));
        assert_eq!(style.remove("width"), None);
        assert_eq!(style.get("cursor"), Some("default"));
    }
}
