pub mod error;
pub mod templates;

use error::RenderError;
use std::collections::BTreeMap;

/// Parameter map handed to the renderer; keys are template-specific.
pub type TemplateParams = BTreeMap<String, String>;

/// Renders an action kind plus a parameter map into SQL text. The engine
/// never parses the returned text, it only concatenates and executes it.
pub trait SqlRenderer: Send + Sync {
    fn render(&self, template: &str, params: &TemplateParams) -> Result<String, RenderError>;
}

/// Builds a `TemplateParams` map in place.
#[macro_export]
macro_rules! params {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::TemplateParams::new();
        $(map.insert($key.to_string(), $value.to_string());)*
        map
    }};
}
