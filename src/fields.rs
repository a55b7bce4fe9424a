//! Static side classification of module descriptor fields.

use crate::side::SideTag;

/// Look up the side tag of a descriptor field by name.
///
/// Fields absent from the table are implicitly `Both` and never removed.
pub fn field_tag(name: &str) -> SideTag {
    match name {
        "name" | "version" | "imports" | "exports" => SideTag::Both,
        "providers" | "services" => SideTag::DeclarationDefined,
        "controllers" | "sockets" | "middlewares" | "migrations" => SideTag::Server,
        "components" | "views" | "styles" => SideTag::Client,
        // Build-time-only metadata, stripped from every output.
        "disabled" | "debugHooks" => SideTag::Neither,
        _ => SideTag::Both,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_default_to_both() {
        assert_eq!(field_tag("somethingCustom"), SideTag::Both);
    }

    #[test]
    fn identity_fields_are_never_sided() {
        assert_eq!(field_tag("name"), SideTag::Both);
        assert_eq!(field_tag("version"), SideTag::Both);
    }

    #[test]
    fn provider_fields_need_declaration_crawls() {
        assert_eq!(field_tag("providers"), SideTag::DeclarationDefined);
    }
}
