pub mod domain;
pub mod error;
pub mod payload;
pub mod protocol;
