use std::{ops::Deref, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::info;

use tmpl_resp::{errors, AskamaRenderer, Globals, Renderer};

use crate::{
    controllers::pages::{Hello, Index},
    AppConfig,
};

pub struct App {
    pub config: AppConfig,
    pub renderers: Renderers,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        info!("initializing template renderers...");

        let globals = Arc::new(
            Globals::new()
                .with("site_name", config.site_name.clone())
                .with("version", env!("CARGO_PKG_VERSION")),
        );
        let renderers = Renderers::new(&globals);

        info!("template renderers successfully initialized!");
        Self { config, renderers }
    }
}

/// One renderer per page, shared by every response built from it.
pub struct Renderers {
    pub index: Arc<dyn Renderer>,
    pub hello: Arc<dyn Renderer>,
}

impl Renderers {
    pub fn new(globals: &Arc<Globals>) -> Self {
        let index =
            AskamaRenderer::<Index>::new("index.html", Arc::clone(globals));
        let hello =
            AskamaRenderer::<Hello>::new("hello.html", Arc::clone(globals));
        Self {
            index: Arc::new(index),
            hello: Arc::new(hello),
        }
    }
}

#[derive(Clone)]
pub struct AppState(pub Arc<App>);

// deref so you can still access the inner fields easily
impl Deref for AppState {
    type Target = App;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AppState
where
    Self: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = errors::WithBacktrace;
    async fn from_request_parts(
        _: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renderers_share_site_globals() {
        let app = App::new(AppConfig {
            site_name: String::from("docs"),
            port: 8080,
            ..Default::default()
        });
        assert_eq!(app.config.port, 8080);
        assert_eq!(
            app.renderers.index.template_name().unwrap(),
            "index.html"
        );
        assert_eq!(
            app.renderers.hello.template_name().unwrap(),
            "hello.html"
        );

        let globals = app
            .renderers
            .hello
            .environment()
            .unwrap()
            .globals()
            .unwrap();
        assert_eq!(globals["site_name"], json!("docs"));
        assert_eq!(globals["version"], json!(env!("CARGO_PKG_VERSION")));
    }
}
