//! Tool provider trait for automatic function calling.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::{FunctionCall, FunctionDeclaration};

/// Failure of a single tool execution.
///
/// Tool failures are reported back to the model as a function response, they
/// do not abort generation.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Source of functions the model may call during generation.
///
/// This is the boundary between the generation loop and side effects.
pub trait ToolProvider: Send + Sync {
    /// Functions to advertise to the model.
    fn declarations(&self) -> &[FunctionDeclaration];

    /// Execute one call and return the JSON result.
    fn call(&self, call: &FunctionCall) -> impl Future<Output = Result<Value, ToolError>> + Send;
}

/// A provider with no tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTools;

impl ToolProvider for NoTools {
    fn declarations(&self) -> &[FunctionDeclaration] {
        &[]
    }

    async fn call(&self, call: &FunctionCall) -> Result<Value, ToolError> {
        Err(ToolError::NotFound(call.name.clone()))
    }
}
