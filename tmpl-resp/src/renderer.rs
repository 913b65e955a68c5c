use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use serde_json::Value;

use crate::{errors, Result};

/// Variables handed to a renderer, keyed by name.
pub type Context = serde_json::Map<String, Value>;

/// Serializes `value` into a [`Context`]. Only values that serialize to a
/// JSON object are accepted.
pub fn into_context<T: Serialize>(value: T) -> Result<Context> {
    match serde_json::to_value(value).map_err(errors::context)? {
        Value::Object(map) => Ok(map),
        other => Err(errors::context(serde::de::Error::custom(format!(
            "expected a map of variables, got {}",
            other
        )))),
    }
}

/// The engine a renderer belongs to.
#[cfg_attr(test, automock)]
pub trait Environment: Send + Sync {
    /// Variables visible to every template of the engine.
    fn globals(&self) -> anyhow::Result<Context>;
}

/// Anything able to turn a [`Context`] into a response body.
#[cfg_attr(test, automock)]
pub trait Renderer: Send + Sync {
    fn render(&self, context: &Context) -> anyhow::Result<String>;

    /// Name of the template `render` would produce.
    fn template_name(&self) -> anyhow::Result<String>;

    /// `None` when the renderer is not backed by an engine with globals.
    fn environment(&self) -> Option<Arc<dyn Environment>> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    vars: Context,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for Globals {
    fn globals(&self) -> anyhow::Result<Context> {
        Ok(self.vars.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Page {
        title: &'static str,
        views: u32,
    }

    #[test]
    fn struct_into_context() {
        let ctx = into_context(Page {
            title: "home",
            views: 3,
        })
        .unwrap();
        assert_eq!(ctx.get("title"), Some(&json!("home")));
        assert_eq!(ctx.get("views"), Some(&json!(3)));
    }

    #[test]
    fn map_into_context() {
        let mut vars = BTreeMap::new();
        vars.insert("name", "World");
        let ctx = into_context(vars).unwrap();
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn scalar_is_not_a_context() {
        let err = into_context(42).unwrap_err();
        assert!(matches!(err.code(), errors::Code::Context(_)));
    }

    #[test]
    fn globals_builder() {
        let globals = Globals::new().with("site", "tmpl").with("year", 2026);
        let vars = globals.globals().unwrap();
        assert_eq!(vars.get("site"), Some(&json!("tmpl")));
        assert_eq!(vars.get("year"), Some(&json!(2026)));
    }
}
