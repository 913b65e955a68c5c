use std::{fmt, sync::Arc};

use http::{
    header::{HeaderName, CONTENT_TYPE},
    HeaderMap, HeaderValue, StatusCode,
};
use tracing::debug;

use crate::{
    errors,
    renderer::{Context, Renderer},
    Result,
};

const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// An HTTP response whose body is a template rendered on first read.
///
/// The body is produced by the first call to [`DeferredResponse::content`]
/// and cached from then on. Replacing the renderer or the context afterwards
/// leaves the cached body as it is.
pub struct DeferredResponse {
    base: http::Response<Option<String>>,
    renderer: Option<Arc<dyn Renderer>>,
    context: Context,
    compiled: bool,
}

impl DeferredResponse {
    pub fn new(
        renderer: Option<Arc<dyn Renderer>>,
        context: Context,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Self {
        let mut base = http::Response::new(None);
        *base.status_mut() = status;
        *base.headers_mut() = headers;
        Self {
            base,
            renderer,
            context,
            compiled: false,
        }
    }

    /// Same as [`DeferredResponse::new`], handy at the head of a call chain.
    pub fn create(
        renderer: Option<Arc<dyn Renderer>>,
        context: Context,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Self {
        Self::new(renderer, context, status, headers)
    }

    /// A 200 response rendering `renderer` with `context`.
    pub fn ok(renderer: Arc<dyn Renderer>, context: Context) -> Self {
        Self::new(Some(renderer), context, StatusCode::OK, HeaderMap::new())
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.set_status(status);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.base.headers_mut().insert(name, value);
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.set_context(context);
        self
    }

    pub fn set_renderer(&mut self, renderer: Option<Arc<dyn Renderer>>) {
        self.renderer = renderer;
    }

    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    pub fn renderer(&self) -> Option<&Arc<dyn Renderer>> {
        self.renderer.as_ref()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Globals of the engine behind the renderer.
    pub fn global_context(&self) -> Result<Context> {
        let renderer =
            self.renderer.as_ref().ok_or_else(errors::renderer_missing)?;
        let env = renderer
            .environment()
            .ok_or_else(|| errors::renderer_incapable("an environment"))?;
        env.globals().map_err(errors::render)
    }

    /// Name of the template the renderer would render.
    pub fn template(&self) -> Result<String> {
        let renderer =
            self.renderer.as_ref().ok_or_else(errors::renderer_missing)?;
        renderer.template_name().map_err(errors::render)
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Rendered body, rendering it first if that has not happened yet.
    pub fn content(&mut self) -> Result<&str> {
        if !self.compiled {
            self.compile()?;
        }
        Ok(self.base.body().as_deref().unwrap_or_default())
    }

    pub fn to_display_string(&mut self) -> Result<String> {
        self.content().map(str::to_owned)
    }

    /// Renders the context and stores the output as the body.
    ///
    /// Unlike [`DeferredResponse::content`] this always renders, replacing
    /// any body stored before.
    pub fn compile(&mut self) -> Result<()> {
        let renderer =
            self.renderer.as_ref().ok_or_else(errors::renderer_missing)?;
        let output = renderer.render(&self.context).map_err(errors::render)?;
        if let Ok(name) = renderer.template_name() {
            debug!(template = %name, bytes = output.len(), "template compiled");
        }
        self.set_content(output);
        self.compiled = true;
        Ok(())
    }

    /// Overwrites the body without touching the compiled flag.
    pub fn set_content(&mut self, content: String) {
        *self.base.body_mut() = Some(content);
    }

    pub fn status(&self) -> StatusCode {
        self.base.status()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        *self.base.status_mut() = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        self.base.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.base.headers_mut()
    }

    /// Renders if needed and hands back a plain response ready to be sent.
    pub fn into_http(mut self) -> Result<http::Response<String>> {
        if !self.compiled {
            self.compile()?;
        }
        let (mut parts, body) = self.base.into_parts();
        parts
            .headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        Ok(http::Response::from_parts(parts, body.unwrap_or_default()))
    }
}

impl Default for DeferredResponse {
    fn default() -> Self {
        Self::new(None, Context::new(), StatusCode::OK, HeaderMap::new())
    }
}

impl fmt::Debug for DeferredResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredResponse")
            .field(
                "template",
                &self
                    .renderer
                    .as_ref()
                    .and_then(|renderer| renderer.template_name().ok()),
            )
            .field("status", &self.base.status())
            .field("headers", self.base.headers())
            .field("compiled", &self.compiled)
            .finish()
    }
}

#[cfg(feature = "axum-resp")]
mod axum_resp {
    use axum::response::{IntoResponse, Response};
    use tracing::error;

    impl IntoResponse for super::DeferredResponse {
        fn into_response(self) -> Response {
            match self.into_http() {
                Ok(resp) => resp.into_response(),
                Err(err) => {
                    error!("render template failed: {}", err);
                    err.into_response()
                }
            }
        }
    }
}
