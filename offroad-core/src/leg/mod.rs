//! Leg assembly: selection, line merge and metric measurement.

mod to_geojson;

use geo::LineString;
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Deserialize;

use crate::algo::merge_lines;
use crate::projection::{MetricProjector, PlanarProjection, round_km};
use crate::select::select_features;
use crate::{EdgeCollection, EdgeId, Error, SelectionCriterion};

/// Static description of a leg.
#[derive(Debug, Clone, Deserialize)]
pub struct LegSpec {
    pub name: String,
    /// Free-text note stored on every output feature
    #[serde(default)]
    pub note: Option<String>,
    pub criteria: Vec<SelectionCriterion>,
    /// Overrides the assembler's projection for this leg
    #[serde(default, alias = "crs")]
    pub projection: Option<PlanarProjection>,
}

impl LegSpec {
    pub fn new(name: impl Into<String>, criteria: Vec<SelectionCriterion>) -> Self {
        Self {
            name: name.into(),
            note: None,
            criteria,
            projection: None,
        }
    }

    pub fn note(&self) -> String {
        self.note
            .clone()
            .unwrap_or_else(|| format!("Merged lines for {}", self.name))
    }
}

/// Non-fatal signal that a leg did not merge into one connected line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentationWarning {
    pub chain_count: usize,
}

/// One connected chain of a leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegChain {
    /// Geographic coordinates, as read
    pub geometry: LineString<f64>,
    /// Identifiers of the edges joined into this chain, in chain order
    pub osmids: Vec<EdgeId>,
    pub length_m: f64,
}

impl LegChain {
    pub fn length_km(&self) -> f64 {
        round_km(self.length_m)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub name: String,
    pub note: String,
    pub chains: Vec<LegChain>,
    /// Identifiers of all selected edges, in collection order
    pub source_ids: Vec<EdgeId>,
    pub projection: PlanarProjection,
    pub fragmentation: Option<FragmentationWarning>,
}

impl Leg {
    pub fn is_fragmented(&self) -> bool {
        self.fragmentation.is_some()
    }

    pub fn length_m(&self) -> f64 {
        self.chains.iter().map(|chain| chain.length_m).sum()
    }

    pub fn length_km(&self) -> f64 {
        round_km(self.length_m())
    }
}

/// Builds legs from a working edge collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegAssembler {
    projection: PlanarProjection,
}

impl LegAssembler {
    pub fn new(projection: PlanarProjection) -> Self {
        Self { projection }
    }

    /// Selects, merges and measures the edges of one leg.
    ///
    /// # Errors
    ///
    /// - [`Error::NoMatch`] if the criteria select no edge
    /// - [`Error::MalformedInput`] if a selected edge has no linear geometry
    /// - [`Error::Projection`] if a chain cannot be projected
    pub fn assemble(&self, collection: &EdgeCollection, spec: &LegSpec) -> Result<Leg, Error> {
        let selected = select_features(collection, &spec.criteria);
        if selected.is_empty() {
            return Err(Error::NoMatch {
                leg: spec.name.clone(),
            });
        }
        info!("Leg '{}': selected {} edges", spec.name, selected.len());

        let mut lines = Vec::new();
        let mut owners = Vec::new();
        for (owner, edge) in selected.iter().enumerate() {
            for line in edge.lines()? {
                lines.push(line);
                owners.push(owner);
            }
        }

        let merged = merge_lines(&lines);
        let projection = spec.projection.unwrap_or(self.projection);
        let projector = MetricProjector::new(projection);

        let chains = merged
            .chains
            .into_iter()
            .map(|chain| {
                let length_m = projector.length_m(&chain.geometry)?;
                let osmids = chain
                    .members
                    .iter()
                    .filter_map(|&line| selected[owners[line]].id().cloned())
                    .unique()
                    .collect();
                Ok(LegChain {
                    geometry: chain.geometry,
                    osmids,
                    length_m,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let fragmentation = if chains.len() > 1 {
            warn!(
                "Leg '{}': lines do not fully connect end-to-end, {} chains remain",
                spec.name,
                chains.len()
            );
            Some(FragmentationWarning {
                chain_count: chains.len(),
            })
        } else {
            debug!("Leg '{}': merged into a single line", spec.name);
            None
        };

        let source_ids = selected
            .iter()
            .filter_map(|edge| edge.id().cloned())
            .unique()
            .collect();

        let leg = Leg {
            name: spec.name.clone(),
            note: spec.note(),
            chains,
            source_ids,
            projection,
            fragmentation,
        };
        info!(
            "Leg '{}': measured distance ({projection}) {:.2} km",
            leg.name,
            leg.length_m() / 1000.0
        );
        Ok(leg)
    }

    /// Assembles independent legs in parallel. A failing leg does not affect
    /// the others; results keep the order of `specs`.
    pub fn assemble_all(
        &self,
        collection: &EdgeCollection,
        specs: &[LegSpec],
    ) -> Vec<Result<Leg, Error>> {
        specs
            .par_iter()
            .map(|spec| self.assemble(collection, spec))
            .collect()
    }
}
