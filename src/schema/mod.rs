mod import;
mod loader;
mod metadata;
mod resolver;

pub use import::parse_json_schema;

pub(crate) use metadata::label_for_key;
