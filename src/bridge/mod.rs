// Bridge modules implementing search, resolution, calls, and error modeling.
pub mod error;
pub mod library;
pub mod namespace;
pub mod search;
pub mod sys;
