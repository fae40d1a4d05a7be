//! Progress reporting for conversations

pub mod reporter;
