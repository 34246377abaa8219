#![allow(dead_code)]

pub mod fake_extractor;
#[cfg(unix)]
pub mod script;
