//! Renders barrel modules: the generated files that import every icon in a
//! directory and re-export the lot under derived names.

use crate::component_name::derive_component_name;

/// File name suffix that classifies a directory entry as an icon.
pub const ICON_SUFFIX: &str = ".svg";

/// Query appended to import paths so the host bundler routes the file
/// through its SVG-to-component loader.
const LOADER_QUERY: &str = "?react";

/// Content written when a scanned directory contains no icon files.
pub const EMPTY_BARREL: &str = "// No SVG icons found in this directory.\n";

/// One icon's contribution to a barrel: the identifier it is bound to and
/// the module path it is imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrelEntry {
    component_name: String,
    import_path: String,
}

impl BarrelEntry {
    /// Builds the entry for a directory child if its name marks it as an
    /// icon file. Returns `None` for every other name.
    ///
    /// The import path is always relative to the barrel's own directory,
    /// since barrels never reference icons outside it.
    pub fn from_file_name(file_name: &str, prefix: &str) -> Option<Self> {
        let base_name = file_name.strip_suffix(ICON_SUFFIX)?;

        Some(Self {
            component_name: derive_component_name(base_name, prefix),
            import_path: format!("./{}{}", file_name, LOADER_QUERY),
        })
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }
}

/// Renders the complete barrel module for the given entries, preserving
/// their order.
///
/// With no entries this renders a placeholder instead, so a barrel always
/// exists for every scanned directory and stale icon lists never linger.
/// Output ends in exactly one newline.
pub fn render_barrel(entries: &[BarrelEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_BARREL.to_owned();
    }

    let mut content = String::new();

    for entry in entries {
        content.push_str("import ");
        content.push_str(&entry.component_name);
        content.push_str(" from '");
        content.push_str(&entry.import_path);
        content.push_str("';\n");
    }

    content.push_str("\nexport {\n");

    for (index, entry) in entries.iter().enumerate() {
        content.push_str("  ");
        content.push_str(&entry.component_name);

        if index + 1 < entries.len() {
            content.push(',');
        }

        content.push('\n');
    }

    content.push_str("};\n");

    content
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(file_name: &str) -> BarrelEntry {
        BarrelEntry::from_file_name(file_name, "").unwrap()
    }

    #[test]
    fn classifies_by_suffix() {
        assert!(BarrelEntry::from_file_name("menu.svg", "").is_some());
        assert!(BarrelEntry::from_file_name("menu.png", "").is_none());
        assert!(BarrelEntry::from_file_name("index.ts", "").is_none());
        assert!(BarrelEntry::from_file_name("notes.txt", "").is_none());
    }

    #[test]
    fn suffix_only_file_name_is_still_an_icon() {
        let entry = BarrelEntry::from_file_name(".svg", "Icon").unwrap();
        assert_eq!(entry.component_name(), "Icon");
    }

    #[test]
    fn two_icon_barrel() {
        let entries = vec![entry("close.svg"), entry("menu.svg")];

        assert_eq!(
            render_barrel(&entries),
            "import Close from './close.svg?react';\n\
             import Menu from './menu.svg?react';\n\
             \n\
             export {\n\
             \x20 Close,\n\
             \x20 Menu\n\
             };\n"
        );
    }

    #[test]
    fn single_icon_barrel_has_no_trailing_comma() {
        let entries = vec![entry("arrow-down.svg")];

        assert_eq!(
            render_barrel(&entries),
            "import ArrowDown from './arrow-down.svg?react';\n\
             \n\
             export {\n\
             \x20 ArrowDown\n\
             };\n"
        );
    }

    #[test]
    fn empty_barrel_is_a_placeholder() {
        assert_eq!(render_barrel(&[]), "// No SVG icons found in this directory.\n");
    }

    #[test]
    fn prefix_flows_through_to_imports_and_exports() {
        let entries = vec![BarrelEntry::from_file_name("user-circle.svg", "Icon").unwrap()];
        let content = render_barrel(&entries);

        assert!(content.contains("import IconUserCircle from './user-circle.svg?react';"));
        assert!(content.contains("  IconUserCircle\n"));
    }

    #[test]
    fn colliding_names_are_rendered_as_derived() {
        let entries = vec![entry("arrow-down.svg"), entry("arrow_down.svg")];
        let content = render_barrel(&entries);

        assert_eq!(content.matches("import ArrowDown from").count(), 2);
    }
}
