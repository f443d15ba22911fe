use crate::error::ActionError;
use model::{dq::DqTestDescriptor, sql::SqlCommand};
use renderer::{SqlRenderer, params};

/// Read-only data-quality checks declared against a command row. These
/// execute regardless of the process's execute flag and never mutate
/// warehouse state; pass/fail is classified by returned row count.
pub struct DqTestAction {
    pub step_id: i64,
    pub tests: Vec<DqTestDescriptor>,
}

/// One test with its rendered violation query.
pub struct RenderedDqTest {
    pub descriptor: DqTestDescriptor,
    pub sql: String,
}

impl DqTestAction {
    pub fn queries(&self, renderer: &dyn SqlRenderer) -> Result<Vec<RenderedDqTest>, ActionError> {
        let mut rendered = Vec::with_capacity(self.tests.len());
        for test in &self.tests {
            let sql = renderer.render(
                &test.test_name,
                &params! {
                    "target" => test.target,
                    "column" => test.column,
                    "acceptedValues" => test.accepted_values.clone().unwrap_or_default(),
                },
            )?;
            rendered.push(RenderedDqTest {
                descriptor: test.clone(),
                sql,
            });
        }
        Ok(rendered)
    }

    pub fn commands(&self, renderer: &dyn SqlRenderer) -> Result<Vec<SqlCommand>, ActionError> {
        Ok(self
            .queries(renderer)?
            .into_iter()
            .map(|test| SqlCommand::without_binds(test.sql))
            .collect())
    }
}
