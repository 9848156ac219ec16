#[path = "../common/mod.rs"]
mod common;

mod properties;
mod paths;
