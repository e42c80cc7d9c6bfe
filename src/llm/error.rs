//! Errors raised by LLM provider clients.

use thiserror::Error;

/// Transport or provider-level failure talking to an LLM backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Network failure, timeout, or unreadable body
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Provider answered 2xx with a body we cannot interpret
    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// Provider reported an error inside an open stream
    #[error("{provider} stream failed: {message}")]
    Stream {
        provider: &'static str,
        message: String,
    },

    /// Backend has no schema-constrained completion API
    #[error("{provider} does not support structured output")]
    Unsupported { provider: &'static str },
}

impl BackendError {
    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        BackendError::Decode {
            provider,
            message: message.into(),
        }
    }

    pub fn stream(provider: &'static str, message: impl Into<String>) -> Self {
        BackendError::Stream {
            provider,
            message: message.into(),
        }
    }
}
