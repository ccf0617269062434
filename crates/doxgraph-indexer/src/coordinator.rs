//! Orchestrates a documentation build over a list of input units

use crate::associator::{AssociatedUnit, associate};
use crate::builder::ModelBuilder;
use crate::config::{IndexerConfig, ScopeMode};
use crate::extractor::InputUnit;
use crate::resolver::resolve;
use crate::scope::ScopeTracker;
use doxgraph_core::ResolvedGraph;
use rayon::prelude::*;

pub struct Coordinator {
    config: IndexerConfig,
}

impl Default for Coordinator {
    fn default() -> Self {
        Coordinator::new(IndexerConfig::default())
    }
}

impl Coordinator {
    pub fn new(config: IndexerConfig) -> Self {
        Coordinator { config }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Tokenize and associate every unit. Results keep input order.
    pub fn prepare(&self, units: &[InputUnit]) -> Vec<AssociatedUnit> {
        if self.config.parallel {
            units.par_iter().map(associate).collect()
        } else {
            units.iter().map(associate).collect()
        }
    }

    /// Build using the configured scope mode.
    pub fn run(&self, units: &[InputUnit]) -> ResolvedGraph {
        match self.config.scope_mode {
            ScopeMode::PerUnit => self.run_per_unit(units),
            ScopeMode::Concatenated => self.run_concatenated(units),
        }
    }

    /// Each unit starts with an empty group scope stack.
    pub fn run_per_unit(&self, units: &[InputUnit]) -> ResolvedGraph {
        tracing::info!("Building documentation graph from {} units", units.len());
        let prepared = self.prepare(units);
        let mut builder = ModelBuilder::new(&self.config);
        for unit in &prepared {
            let mut tracker = ScopeTracker::new();
            builder.apply_unit(unit, &mut tracker);
            builder.close_unit(&unit.name, &mut tracker);
        }
        resolve(builder.finish())
    }

    /// Units form one stream sharing a scope stack; a group opened in one
    /// unit may be closed in a later one.
    pub fn run_concatenated(&self, units: &[InputUnit]) -> ResolvedGraph {
        tracing::info!(
            "Building documentation graph from {} concatenated units",
            units.len()
        );
        let prepared = self.prepare(units);
        let mut builder = ModelBuilder::new(&self.config);
        let mut tracker = ScopeTracker::new();
        for unit in &prepared {
            builder.apply_unit(unit, &mut tracker);
        }
        if let Some(last) = prepared.last() {
            builder.close_unit(&last.name, &mut tracker);
        }
        resolve(builder.finish())
    }
}
