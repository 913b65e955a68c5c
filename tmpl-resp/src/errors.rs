use std::{error::Error as StdError, fmt};

use backtrace::Backtrace;
use http::StatusCode;
use thiserror::Error;

pub trait ErrorCode: StdError + 'static {
    fn code(&self) -> (StatusCode, &'static str);
}

#[derive(Error, Debug)]
pub enum Code {
    /// Whatever the renderer raised, passed through untouched.
    #[error(transparent)]
    Render(#[from] anyhow::Error),
    #[error("No renderer is attached to the response")]
    RendererMissing,
    #[error("The renderer does not provide {0}")]
    RendererIncapable(&'static str),
    #[error("Please recheck the context.see: {0}")]
    Context(#[source] serde_json::Error),
    #[error("Not found. {0}")]
    NotFound(String),
}

impl ErrorCode for Code {
    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "1020001"),
            Self::RendererMissing => {
                (StatusCode::INTERNAL_SERVER_ERROR, "1020002")
            }
            Self::RendererIncapable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "1020003")
            }
            Self::Context(_) => (StatusCode::BAD_REQUEST, "1020004"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "1020005"),
        }
    }
}

pub struct WithBacktrace {
    source: Code,
    backtrace: Backtrace,
}

impl WithBacktrace {
    pub fn code(&self) -> &Code {
        &self.source
    }
}

impl fmt::Debug for WithBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithBacktrace")
            .field("source", &self.source)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl fmt::Display for WithBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl StdError for WithBacktrace {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

impl From<Code> for WithBacktrace {
    fn from(code: Code) -> Self {
        WithBacktrace {
            source: code,
            backtrace: Backtrace::new(),
        }
    }
}

impl From<WithBacktrace> for Code {
    fn from(value: WithBacktrace) -> Self {
        value.source
    }
}

impl PartialEq for WithBacktrace {
    fn eq(&self, other: &Self) -> bool {
        let (_, src_code) = self.source.code();
        let (_, dst_code) = other.source.code();
        src_code == dst_code
    }
}

#[inline]
pub fn render(err: anyhow::Error) -> WithBacktrace {
    Code::Render(err).into()
}

#[inline]
pub fn renderer_missing() -> WithBacktrace {
    Code::RendererMissing.into()
}

#[inline]
pub fn renderer_incapable(capability: &'static str) -> WithBacktrace {
    Code::RendererIncapable(capability).into()
}

#[inline]
pub fn context(err: serde_json::Error) -> WithBacktrace {
    Code::Context(err).into()
}

#[inline]
pub fn not_found<S: ToString + ?Sized>(err: &S) -> WithBacktrace {
    Code::NotFound(err.to_string()).into()
}

#[cfg(feature = "axum-resp")]
mod axum_resp {
    use axum::response::IntoResponse;
    use serde_json::json;

    use super::ErrorCode;

    impl IntoResponse for super::WithBacktrace {
        fn into_response(self) -> axum::response::Response {
            tracing::error!("{:?}", self);

            let (status_code, code) = self.source.code();

            let payload = json!({
                "code": code,
                "message": self.to_string(),
            });

            (status_code, axum::Json(payload)).into_response()
        }
    }
}
