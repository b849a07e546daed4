use crate::Result;
use crate::oracle::Oracle;
use abigen_common::{Catalog, Resolution, Statement};

/// Statements of one generator run, together with the oracle they were resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub source: String,
    pub statements: Vec<Statement>,
}

impl Generated {
    pub fn constants(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| !s.is_test_only())
    }

    pub fn layouts(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.is_test_only())
    }
}

/// Resolve every catalog entry through `oracle`. Either every entry resolves or the whole run
/// fails, there is no partial output.
pub fn generate<O: Oracle + ?Sized>(oracle: &O, catalog: &Catalog) -> Result<Generated> {
    catalog.validate()?;

    let source = oracle.describe();
    log::debug!("resolving {} catalog entries from {}", catalog.len(), source);
    let resolution = oracle.resolve(catalog)?;

    Ok(Generated {
        source,
        statements: statements(&resolution, catalog)?,
    })
}

/// Map the catalog, in order, onto the values of `res`.
pub fn statements(res: &Resolution, catalog: &Catalog) -> Result<Vec<Statement>> {
    let mut out = Vec::with_capacity(catalog.len());

    for entry in catalog.constants() {
        out.push(Statement::Constant(res.require_constant(entry)?));
    }
    for entry in catalog.layouts() {
        out.push(Statement::Layout(res.require_layout(entry)?));
    }

    Ok(out)
}
