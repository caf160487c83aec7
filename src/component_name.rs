//! Derives component identifiers from icon file names.

/// Derives the identifier that a barrel module binds an icon file to.
///
/// The file's base name is split on runs of hyphens, underscores, and
/// whitespace. Each piece keeps its spelling except for its first character,
/// which is uppercased, and the pieces are joined without a separator behind
/// the configured prefix: `arrow-down` becomes `ArrowDown`, or `IconArrowDown`
/// with the prefix `Icon`.
///
/// Every input derives *something*: a base name with no usable characters
/// yields the prefix alone. Whether the result is unique among its siblings,
/// or even a legal identifier in the generated module, is the icon author's
/// responsibility.
pub fn derive_component_name(base_name: &str, prefix: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + base_name.len());
    name.push_str(prefix);

    for piece in base_name.split(is_separator) {
        let mut chars = piece.chars();

        if let Some(first) = chars.next() {
            // Uppercasing is done per char::to_uppercase, which may expand
            // a character into several.
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }

    name
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '_' || c.is_whitespace()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_name() {
        assert_eq!(derive_component_name("menu", ""), "Menu");
    }

    #[test]
    fn hyphenated_name() {
        assert_eq!(derive_component_name("arrow-down", ""), "ArrowDown");
    }

    #[test]
    fn underscored_name() {
        assert_eq!(derive_component_name("arrow_down", ""), "ArrowDown");
    }

    #[test]
    fn prefix_is_prepended() {
        assert_eq!(derive_component_name("arrow-down", "Icon"), "IconArrowDown");
    }

    #[test]
    fn separator_runs_collapse() {
        assert_eq!(
            derive_component_name("chevron--double__up", ""),
            "ChevronDoubleUp"
        );
    }

    #[test]
    fn whitespace_is_a_separator() {
        assert_eq!(derive_component_name("user circle", ""), "UserCircle");
    }

    #[test]
    fn interior_case_is_preserved() {
        assert_eq!(derive_component_name("arrowDown-24px", ""), "ArrowDown24px");
    }

    #[test]
    fn empty_base_name_yields_prefix() {
        assert_eq!(derive_component_name("", "Icon"), "Icon");
        assert_eq!(derive_component_name("", ""), "");
    }

    #[test]
    fn leading_and_trailing_separators() {
        assert_eq!(derive_component_name("-menu-", "Icon"), "IconMenu");
    }

    #[test]
    fn derivation_is_stable() {
        let first = derive_component_name("check_circle-outline", "Icon");
        let second = derive_component_name("check_circle-outline", "Icon");
        assert_eq!(first, second);
        assert_eq!(first, "IconCheckCircleOutline");
    }
}
