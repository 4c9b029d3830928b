mod gsc_error;
mod mcp_error;
mod tool_error;

pub use gsc_error::GscError;
pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
