// src/macros.rs
//! String shorthands used across the parsers.

/// `s!()` is an empty `String`; `s!(x)` is `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate string-like pieces into one `String`, sized up front.
/// Accepts anything `AsRef<str>`, including `&String` and nested references.
#[macro_export]
macro_rules! join {
    ($first:expr $(, $rest:expr)+ $(,)?) => {
        [
            ::std::convert::AsRef::<str>::as_ref(&$first)
            $(, ::std::convert::AsRef::<str>::as_ref(&$rest))+
        ]
        .concat()
    };
}
