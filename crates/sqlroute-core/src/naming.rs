//! Identifier and table-name helpers.
//!
//! Table names and aliases are compared case-insensitively everywhere in the
//! engine. [`table_key`] produces the folded form used as a map key; the
//! original spelling is kept alongside for display.

use sqlparser::ast::{Ident, ObjectName, ObjectNamePart};

/// Folded lookup key for a table name or alias.
pub fn table_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Case-insensitive identifier equality.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Extract the identifier value from an ObjectName part.
///
/// Returns the string value for Identifier parts, or the Display representation
/// for anything else.
fn object_name_part_value(part: &ObjectNamePart) -> String {
    part.as_ident()
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| part.to_string())
}

/// Extract the base (unqualified) name from an ObjectName.
///
/// - `dbo.Orders` → `"Orders"`
/// - `sales.dbo.Orders` → `"Orders"`
pub fn base_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(object_name_part_value)
        .unwrap_or_default()
}

/// Join every part of an ObjectName with dots, without quoting.
pub fn dotted_name(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(object_name_part_value)
        .collect::<Vec<_>>()
        .join(".")
}

/// True when an identifier is a T-SQL variable or parameter (`@name`).
pub fn is_variable(ident: &Ident) -> bool {
    ident.quote_style.is_none() && ident.value.starts_with('@')
}

/// Deterministic table alias for the `index`-th table of a path:
/// `a`..`z`, then `aa`, `ab`, ...
pub fn alias_for_index(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'a' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::Ident;

    fn object_name(parts: &[&str]) -> ObjectName {
        ObjectName(
            parts
                .iter()
                .map(|p| ObjectNamePart::Identifier(Ident::new(*p)))
                .collect(),
        )
    }

    #[test]
    fn base_name_takes_last_part() {
        assert_eq!(base_name(&object_name(&["dbo", "Orders"])), "Orders");
        assert_eq!(base_name(&object_name(&["Orders"])), "Orders");
    }

    #[test]
    fn dotted_name_joins_all_parts() {
        assert_eq!(
            dotted_name(&object_name(&["sales", "dbo", "usp_Load"])),
            "sales.dbo.usp_Load"
        );
    }

    #[test]
    fn table_key_folds_case() {
        assert_eq!(table_key(" Orders "), "orders");
        assert!(same_name("ORDERS", "orders"));
    }

    #[test]
    fn variables_are_detected() {
        assert!(is_variable(&Ident::new("@CustomerId")));
        assert!(!is_variable(&Ident::new("CustomerId")));
        assert!(!is_variable(&Ident::with_quote('"', "@quoted")));
    }

    #[test]
    fn aliases_follow_bijective_base26() {
        assert_eq!(alias_for_index(0), "a");
        assert_eq!(alias_for_index(2), "c");
        assert_eq!(alias_for_index(25), "z");
        assert_eq!(alias_for_index(26), "aa");
        assert_eq!(alias_for_index(27), "ab");
        assert_eq!(alias_for_index(52), "ba");
    }
}
