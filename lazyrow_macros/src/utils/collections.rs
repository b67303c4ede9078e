/// Collects every `Ok`, or every `Err` combined into one, so a single
/// expansion reports all bad columns at once.
pub trait TryCollectAll<T>: Iterator<Item = Result<T, syn::Error>> + Sized {
    fn try_collect_all(self) -> Result<Vec<T>, syn::Error> {
        let mut oks = Vec::new();
        let mut errors: Option<syn::Error> = None;
        for value in self {
            match (value, &mut errors) {
                (Ok(t), None) => oks.push(t),
                (Ok(_), Some(_)) => {}
                (Err(e), Some(errors)) => errors.combine(e),
                (Err(e), errors @ None) => *errors = Some(e),
            }
        }
        match errors {
            Some(errors) => Err(errors),
            None => Ok(oks),
        }
    }
}

impl<I, T> TryCollectAll<T> for I where I: Iterator<Item = Result<T, syn::Error>> + Sized {}
