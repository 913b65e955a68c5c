//! Askama integration.
//!
//! Askama templates are plain structs, so the context is first merged with
//! the engine globals and then deserialized into the template struct.

use std::{fmt, marker::PhantomData, sync::Arc};

use askama::Template;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::renderer::{Context, Environment, Globals, Renderer};

pub struct AskamaRenderer<T> {
    name: String,
    env: Arc<Globals>,
    _template: PhantomData<fn() -> T>,
}

impl<T> AskamaRenderer<T> {
    pub fn new<S: Into<String>>(name: S, env: Arc<Globals>) -> Self {
        Self {
            name: name.into(),
            env,
            _template: PhantomData,
        }
    }
}

impl<T> Clone for AskamaRenderer<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            env: Arc::clone(&self.env),
            _template: PhantomData,
        }
    }
}

impl<T> fmt::Debug for AskamaRenderer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskamaRenderer")
            .field("name", &self.name)
            .field("env", &self.env)
            .finish()
    }
}

impl<T> Renderer for AskamaRenderer<T>
where
    T: Template + DeserializeOwned,
{
    fn render(&self, context: &Context) -> anyhow::Result<String> {
        // context wins over globals
        let mut vars = self.env.globals()?;
        vars.extend(context.iter().map(|(k, v)| (k.clone(), v.clone())));

        let template: T = serde_json::from_value(Value::Object(vars))?;
        Ok(template.render()?)
    }

    fn template_name(&self) -> anyhow::Result<String> {
        Ok(self.name.clone())
    }

    fn environment(&self) -> Option<Arc<dyn Environment>> {
        Some(Arc::clone(&self.env) as Arc<dyn Environment>)
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::{into_context, DeferredResponse};

    #[derive(Template, Deserialize)]
    #[template(source = "{{ greeting }}, {{ name }}!", ext = "txt")]
    struct Hello {
        greeting: String,
        name: String,
    }

    fn renderer() -> Arc<dyn Renderer> {
        let env = Arc::new(Globals::new().with("greeting", "Hello"));
        Arc::new(AskamaRenderer::<Hello>::new("hello.txt", env))
    }

    #[test]
    fn globals_fill_missing_variables() {
        let body = renderer()
            .render(&into_context(json!({"name": "World"})).unwrap())
            .unwrap();
        assert_eq!(body, "Hello, World!");
    }

    #[test]
    fn context_overrides_globals() {
        let ctx = into_context(json!({"greeting": "Hi", "name": "Moon"}));
        let body = renderer().render(&ctx.unwrap()).unwrap();
        assert_eq!(body, "Hi, Moon!");
    }

    #[test]
    fn missing_variable_is_a_render_error() {
        let err = renderer().render(&Context::new()).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn behind_a_deferred_response() {
        let mut resp = DeferredResponse::ok(
            renderer(),
            into_context(json!({"name": "World"})).unwrap(),
        )
        .with_status(StatusCode::ACCEPTED);
        assert_eq!(resp.template().unwrap(), "hello.txt");
        assert_eq!(
            resp.global_context().unwrap().get("greeting"),
            Some(&json!("Hello"))
        );
        assert_eq!(resp.content().unwrap(), "Hello, World!");
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }
}
