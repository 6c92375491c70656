use std::collections::BTreeMap;

/// Name prefix of every churned unit.
pub const WORK_UNIT_PREFIX: &str = "work-pod";
/// Label stamped on every churned unit so leftovers can be found and removed.
pub const WORK_UNIT_LABEL: (&str, &str) = ("work", "work-pod");

/// A uniquely named unit submitted to a provisioner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnitSpec {
    pub name: String,
    pub scope: String,
    pub labels: BTreeMap<String, String>,
    pub command: Vec<String>,
}

/// Identifies a created unit for the matching delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkUnitHandle {
    pub name: String,
    pub scope: String,
}

impl WorkUnitHandle {
    #[must_use]
    pub fn for_spec(spec: &WorkUnitSpec) -> Self {
        Self {
            name: spec.name.clone(),
            scope: spec.scope.clone(),
        }
    }
}

/// Stamps out fresh [`WorkUnitSpec`]s for one scope.
#[derive(Debug, Clone)]
pub struct WorkUnitTemplate {
    scope: String,
}

impl WorkUnitTemplate {
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Builds a unit with a new 128-bit random name and an inert `echo` command.
    #[must_use]
    pub fn next_unit(&self) -> WorkUnitSpec {
        let name = unique_unit_name();
        let command = vec!["echo".to_owned(), format!("hello podchurn unit {}", name)];
        let mut labels = BTreeMap::new();
        labels.insert(WORK_UNIT_LABEL.0.to_owned(), WORK_UNIT_LABEL.1.to_owned());
        WorkUnitSpec {
            name,
            scope: self.scope.clone(),
            labels,
            command,
        }
    }
}

fn unique_unit_name() -> String {
    format!("{}-{:032x}", WORK_UNIT_PREFIX, rand::random::<u128>())
}
