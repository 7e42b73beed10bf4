//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type ScoutResult<T> = Result<T, ScoutError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Scout system
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Generation error: {message}")]
    Generation {
        message: String,
        context: ErrorContext,
    },

    #[error("Search error: {message}")]
    Search {
        message: String,
        context: ErrorContext,
    },

    #[error("Browser error: {message}")]
    Browser {
        message: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScoutError {
    /// Create a generation error
    pub fn generation<S: Into<String>>(message: S, component: &str) -> Self {
        Self::Generation {
            message: message.into(),
            context: ErrorContext::new(component),
        }
    }

    /// Create a search error
    pub fn search<S: Into<String>>(message: S, component: &str) -> Self {
        Self::Search {
            message: message.into(),
            context: ErrorContext::new(component),
        }
    }

    /// Create a browser error
    pub fn browser<S: Into<String>>(message: S, component: &str) -> Self {
        Self::Browser {
            message: message.into(),
            context: ErrorContext::new(component)
                .with_suggestion("Check that a Chrome/Chromium binary is installed")
                .with_suggestion("Verify the browser can be launched in headless mode"),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S, component: &str) -> Self {
        Self::Storage {
            message: message.into(),
            context: ErrorContext::new(component),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S, component: &str) -> Self {
        Self::Config {
            message: message.into(),
            context: ErrorContext::new(component)
                .with_suggestion("Check environment variables and configuration values"),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S, field: Option<&str>, component: &str) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(|f| f.to_string()),
            context: ErrorContext::new(component),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S, component: &str) -> Self {
        Self::NotFound {
            resource: resource.into(),
            context: ErrorContext::new(component),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S, component: &str) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ScoutError::Generation { context, .. } => Some(context),
            ScoutError::Search { context, .. } => Some(context),
            ScoutError::Browser { context, .. } => Some(context),
            ScoutError::Storage { context, .. } => Some(context),
            ScoutError::Config { context, .. } => Some(context),
            ScoutError::Validation { context, .. } => Some(context),
            ScoutError::NotFound { context, .. } => Some(context),
            ScoutError::Timeout { context, .. } => Some(context),
            ScoutError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScoutError::Generation { .. }
                | ScoutError::Search { .. }
                | ScoutError::Browser { .. }
                | ScoutError::Timeout { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            ScoutError::Generation { .. } | ScoutError::Search { .. } | ScoutError::Timeout { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Recoverable error occurred"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}
