//! Fallback tool-call protocol.
//!
//! Participants that cannot call tools natively embed JSON commands in
//! ` ```tool ` fenced blocks:
//!
//! ````text
//! ```tool
//! {"tool": "markdown.ReplaceSection", "args": {"headingText": "Position", "content": "..."}}
//! ```
//! ````
//!
//! - [`parse_tool_commands`] pulls raw [`ToolCommand`]s out of the text
//! - [`DocumentOperation::from_command`] resolves each into a typed edit
//!
//! Applying the operations to the shared document is the application
//! layer's job.

pub mod command;
pub mod parser;

pub use command::{DocumentOperation, MARKDOWN_NAMESPACE, ToolCommand};
pub use parser::{decode_block, extract_tool_blocks, parse_tool_commands};
