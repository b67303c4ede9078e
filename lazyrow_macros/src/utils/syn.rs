use syn::{
    GenericArgument, Ident, Path, PathSegment, Token, Type, TypePath, punctuated::Punctuated,
    spanned::Spanned,
};

const EXPECTED_TYPE_PATH: &str = "expected type path";

fn parse_exactly_one_punctuated<T, P>(punctuated: &Punctuated<T, P>) -> Option<&T> {
    match punctuated.first() {
        Some(first) if punctuated.len() == 1 => Some(first),
        _ => None,
    }
}

pub fn parse_path_segments_from_type(ty: &Type) -> Option<&Punctuated<PathSegment, Token![::]>> {
    if let Type::Path(TypePath {
        path: Path { segments, .. },
        qself: None,
    }) = ty
    {
        Some(segments)
    } else {
        None
    }
}

/// `Wrapper<T>` written as a single segment.
pub fn parse_type_single_arg_from_path_segments(
    path_segments: &Punctuated<PathSegment, Token![::]>,
) -> Option<(&Ident, &Type)> {
    let Some(PathSegment {
        ident,
        arguments: syn::PathArguments::AngleBracketed(args),
    }) = parse_exactly_one_punctuated(path_segments)
    else {
        return None;
    };
    let Some(GenericArgument::Type(ty)) = parse_exactly_one_punctuated(&args.args) else {
        return None;
    };
    Some((ident, ty))
}

/// `serde_json::Value` → `Value`, `chrono::DateTime<Utc>` → `DateTime`.
pub fn parse_last_ident_from_type(ty: &Type) -> Result<&Ident, syn::Error> {
    parse_path_segments_from_type(ty)
        .and_then(Punctuated::last)
        .map(|segment| &segment.ident)
        .ok_or_else(|| syn::Error::new(ty.span(), EXPECTED_TYPE_PATH))
}
