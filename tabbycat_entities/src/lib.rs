pub mod schema;
pub mod domain;
pub mod derived_models;
pub mod preferences;
pub mod images;
pub mod mock;
pub mod prelude;
