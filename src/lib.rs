// Lazily compiled regex behind a `fn() -> &'static Regex` accessor.
macro_rules! cached_regex {
    ($name:ident, $pattern:literal) => {
        fn $name() -> &'static ::regex::Regex {
            static RE: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
            RE.get_or_init(|| ::regex::Regex::new($pattern).unwrap())
        }
    };
}

pub mod accounts;
pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod employees;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod parser;
pub mod permissions;
pub mod session;
pub mod shifts;
pub mod storage;
pub mod tasks;
pub mod ui;
