/// Get optional environment variable.
///
/// Evaluates to `Result<Option<String>>`; a value that is not unicode is a
/// config error rather than a missing variable.
macro_rules! env_var_opt {
    ($env_var:expr) => {
        match ::std::env::var($env_var) {
            ::core::result::Result::Ok(ok) if ok.is_empty() => {
                ::core::result::Result::Ok(::core::option::Option::None)
            }
            ::core::result::Result::Ok(ok) => {
                ::core::result::Result::Ok(::core::option::Option::Some(ok))
            }
            ::core::result::Result::Err(::std::env::VarError::NotPresent) => {
                ::core::result::Result::Ok(::core::option::Option::None)
            }
            ::core::result::Result::Err(::std::env::VarError::NotUnicode(ref s)) => {
                ::core::result::Result::Err($crate::Error::Config(::std::format!(
                    ::core::concat!(
                        "environment variable \"",
                        $env_var,
                        "\" was not valid unicode: {:?}"
                    ),
                    s
                )))
            }
        }
    };
}
pub(crate) use env_var_opt;
/// Get environment variable with default.
///
/// Evaluates to `Result<Cow<'static, str>>`.
macro_rules! env_var_default {
    ($env_var:expr, $default:expr) => {
        $crate::env::env_var_opt!($env_var).map(|value| {
            value
                .map(::std::borrow::Cow::Owned)
                .unwrap_or(::std::borrow::Cow::Borrowed($default))
        })
    };
}

/// The connection URL used for the default data source.
pub fn database_url() -> crate::Result<Option<String>> {
    env_var_opt!("DATABASE_URL")
}

/// Overrides the placeholder style of every configured data source.
pub fn param_marker() -> crate::Result<Option<String>> {
    env_var_opt!("LAZYROW_PARAM_MARKER")
}

/// The source id `DATABASE_URL` is bound to.
pub fn default_source_id() -> crate::Result<std::borrow::Cow<'static, str>> {
    env_var_default!("LAZYROW_SOURCE_ID", crate::schema::DEFAULT_SOURCE_ID)
}

#[cfg(test)]
mod tests {
    #[test]
    fn unset_variable_falls_back() {
        let value = env_var_default!("LAZYROW_UNSET_FOR_TESTS", "fallback").unwrap();
        assert_eq!(value, "fallback");
    }
}
