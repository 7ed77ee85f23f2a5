pub use clap::{App, Arg};
pub use inflector::Inflector;

use ard_bricks::grid::TileId;
use clap::{ArgMatches, Error, ErrorKind};
use std::str::FromStr;

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::args::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use inflector::Inflector;
        $crate::cli::args::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use inflector::Inflector;
        $crate::cli::args::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// The `tile` argument, exiting with a usage error if it
/// does not parse.
pub fn tile_arg(matches: &ArgMatches, name: &str) -> TileId {
    let value = matches.value_of(name).unwrap_or_default();
    crate::utils::parse_tile(value).unwrap_or_else(|e| {
        Error::with_description(&format!("{}: {}", name, e), ErrorKind::InvalidValue).exit()
    })
}

/// An optional argument parsed as `T`, exiting with a
/// usage error if present but malformed.
pub fn optional_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).map(|value| {
        value.parse().unwrap_or_else(|_| {
            Error::with_description(
                &format!("{}: invalid value '{}'", name, value),
                ErrorKind::InvalidValue,
            )
            .exit()
        })
    })
}
