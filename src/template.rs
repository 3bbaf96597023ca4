//! Key/value view over the free-form template sections of an entity document.
//!
//! `TEMPLATE` and `HOST_SHARE` carry arbitrary nested tags whose set is not
//! known up front, so they are exposed as a generic accessor over the subtree
//! instead of a fixed schema.

use crate::xml::Element;

/// Read-only key/value access to one template subtree.
///
/// Keys are tag names of direct children. A key may occur more than once
/// (e.g. repeated `PCI` sections); [`Template::get`] returns the first
/// occurrence and [`Template::get_all`] every occurrence in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    root: Element,
}

impl Template {
    /// Wrap a parsed subtree.
    pub fn new(root: Element) -> Self {
        Template { root }
    }

    /// Text value of the first occurrence of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.root.text_of(key)
    }

    /// Text values of every occurrence of `key`, in document order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> Vec<&'a str> {
        self.root
            .children_named(key)
            .map(|c| c.text.as_str())
            .collect()
    }

    /// Nested section under `key` as another template view.
    pub fn section(&self, key: &str) -> Option<Template> {
        self.root.child(key).cloned().map(Template::new)
    }

    /// Leaf key/value pairs (children without nested elements), in document
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.root
            .children
            .iter()
            .filter(|c| c.children.is_empty())
            .map(|c| (c.name.as_str(), c.text.as_str()))
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.root.children.len()
    }

    /// True when the section carries no entries at all.
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Underlying subtree, for access patterns the view does not cover.
    pub fn element(&self) -> &Element {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    const FIXTURE: &str = r#"
        <TEMPLATE>
            <ARCH>x86_64</ARCH>
            <HYPERVISOR>kvm</HYPERVISOR>
            <PCI><ADDRESS>0000:00:01.0</ADDRESS></PCI>
            <PCI><ADDRESS>0000:00:02.0</ADDRESS></PCI>
            <RESERVED_CPU><![CDATA[100]]></RESERVED_CPU>
        </TEMPLATE>
    "#;

    fn fixture() -> Template {
        Template::new(parse(FIXTURE).unwrap())
    }

    #[test]
    fn get_returns_first_occurrence() {
        let t = fixture();
        assert_eq!(t.get("ARCH"), Some("x86_64"));
        assert_eq!(t.get("RESERVED_CPU"), Some("100"));
        assert_eq!(t.get("NO_SUCH_KEY"), None);
    }

    #[test]
    fn get_all_preserves_document_order() {
        let t = fixture();
        let sections: Vec<Template> = t
            .element()
            .children_named("PCI")
            .cloned()
            .map(Template::new)
            .collect();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].get("ADDRESS"), Some("0000:00:01.0"));
        assert_eq!(sections[1].get("ADDRESS"), Some("0000:00:02.0"));
        assert_eq!(t.get_all("ARCH"), vec!["x86_64"]);
    }

    #[test]
    fn nested_section_access() {
        let t = fixture();
        let pci = t.section("PCI").unwrap();
        assert_eq!(pci.get("ADDRESS"), Some("0000:00:01.0"));
        assert!(t.section("MISSING").is_none());
    }

    #[test]
    fn iter_yields_leaf_pairs_only() {
        let t = fixture();
        let pairs: Vec<(&str, &str)> = t.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("ARCH", "x86_64"),
                ("HYPERVISOR", "kvm"),
                ("RESERVED_CPU", "100"),
            ]
        );
    }

    #[test]
    fn default_view_is_empty() {
        let t = Template::default();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert_eq!(t.get("ANY"), None);
    }
}
