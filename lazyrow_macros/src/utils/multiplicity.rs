use syn::Type;

/// `Option<T>` → `(T, true)`, anything else → `(ty, false)`.
pub fn optional(ty: &Type) -> (&Type, bool) {
    super::syn::parse_path_segments_from_type(ty)
        .and_then(super::syn::parse_type_single_arg_from_path_segments)
        .filter(|(ident, _)| *ident == "Option")
        .map_or((ty, false), |(_, inner)| (inner, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_option() {
        let ty: Type = syn::parse_quote!(Option<String>);
        let (inner, is_optional) = optional(&ty);
        assert!(is_optional);
        let string: Type = syn::parse_quote!(String);
        assert_eq!(inner, &string);

        let ty: Type = syn::parse_quote!(Vec<String>);
        assert!(!optional(&ty).1);
    }
}
