use serde::{Deserialize, Serialize};

/// One rendered SQL statement and the ordered bind values substituted
/// positionally at execution time. Created by an action, consumed by the
/// runner; immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlCommand {
    pub text: String,
    pub binds: Vec<String>,
}

impl SqlCommand {
    pub fn new(text: impl Into<String>, binds: Vec<String>) -> Self {
        SqlCommand {
            text: text.into(),
            binds,
        }
    }

    pub fn without_binds(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}
