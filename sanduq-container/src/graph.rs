//! Dependency graph validation.
//!
//! Walks the dependencies declared by registered classes, factories and
//! alias bindings when a container is built:
//! - Detects circular dependencies
//! - Reports declared dependencies that nothing provides
//!
//! A missing dependency is only a warning unless strict validation is
//! on: the caller may still hand the object in pre-built at resolve
//! time.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::error::{CircularDependencyError, NotRegisteredError, SanduqError};
use crate::identifier::Identifier;

/// What one identifier needs before it can be built.
#[derive(Debug, Clone)]
pub(crate) struct DependencyInfo {
    pub identifier: Identifier,
    pub dependencies: Vec<Identifier>,
}

/// Validates the dependency graph for correctness.
///
/// # Algorithm
/// Depth-first search keeping the current path, so a back edge is
/// reported together with the chain that closes it.
pub(crate) struct GraphValidator {
    dependencies: HashMap<Identifier, DependencyInfo>,
    strict: bool,
    visiting: HashSet<Identifier>,
    validated: HashSet<Identifier>,
    path: Vec<Identifier>,
    missing: Vec<NotRegisteredError>,
}

impl GraphValidator {
    pub fn new(dependencies: HashMap<Identifier, DependencyInfo>, strict: bool) -> Self {
        Self {
            dependencies,
            strict,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// Validates the entire graph.
    ///
    /// # Errors
    /// - [`SanduqError::CircularDependency`] for any cycle
    /// - [`SanduqError::NotRegistered`] for the first missing dependency,
    ///   in strict mode only
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(&mut self) -> Result<(), SanduqError> {
        let mut identifiers: Vec<Identifier> = self.dependencies.keys().cloned().collect();
        identifiers.sort();

        debug!(identifier_count = identifiers.len(), "Starting dependency graph validation");

        for identifier in identifiers {
            self.validate_identifier(&identifier)?;
        }

        if let Some(first) = self.missing.drain(..).next() {
            return Err(SanduqError::NotRegistered(first));
        }

        debug!("Dependency graph validation passed");
        Ok(())
    }

    fn validate_identifier(&mut self, identifier: &Identifier) -> Result<(), SanduqError> {
        if self.validated.contains(identifier) {
            return Ok(());
        }

        if self.visiting.contains(identifier) {
            let cycle_start = self.path.iter().position(|id| id == identifier).unwrap_or(0);
            let mut chain = self.path[cycle_start..].to_vec();
            chain.push(identifier.clone());

            warn!(cycle = ?chain, "Circular dependency detected");
            return Err(SanduqError::CircularDependency(CircularDependencyError { chain }));
        }

        let Some(info) = self.dependencies.get(identifier).cloned() else {
            // Only reachable through an edge, so the path is non-empty.
            let required_by = self.path.last().cloned().unwrap_or_else(|| identifier.clone());
            warn!(
                dependency = %identifier,
                required_by = %required_by,
                "Declared dependency is not registered"
            );
            if self.strict {
                self.missing.push(NotRegisteredError {
                    requested: identifier.clone(),
                    required_by,
                });
            }
            self.validated.insert(identifier.clone());
            return Ok(());
        };

        self.visiting.insert(identifier.clone());
        self.path.push(identifier.clone());

        for dependency in &info.dependencies {
            self.validate_identifier(dependency)?;
        }

        self.path.pop();
        self.visiting.remove(identifier);
        self.validated.insert(identifier.clone());

        Ok(())
    }
}
