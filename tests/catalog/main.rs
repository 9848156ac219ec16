#[path = "../common/mod.rs"]
mod common;

mod header_offsets;
mod readers;
