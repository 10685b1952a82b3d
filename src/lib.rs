pub mod convert;
pub mod fetch;
pub mod output;
pub mod rules;
