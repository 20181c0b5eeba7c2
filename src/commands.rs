//! Pipeline steps behind the CLI subcommands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use offroad_core::loading::{merge_county_collections, read_collection, write_geojson};
use offroad_core::select::select_collection;
use offroad_core::waypoints::filter_waypoints;
use offroad_core::{AttributeFilter, EdgeCollection, LegAssembler, LegSpec};
use tracing::{error, info, warn};

use crate::config::{LegConfig, PipelineConfig};

/// Concatenates the configured county exports into the working collection.
pub fn merge_counties(config: &PipelineConfig) -> Result<()> {
    let Some(counties) = &config.counties else {
        bail!("no [counties] section in config");
    };

    let merge = merge_county_collections(&counties.sources)?;
    if merge.loaded.is_empty() {
        bail!("none of the {} county files could be loaded", counties.sources.len());
    }
    write_geojson(&counties.output, &merge.collection.into_geojson())
        .with_context(|| format!("writing {}", counties.output.display()))?;
    info!("Merged GeoJSON written to {}", counties.output.display());
    Ok(())
}

/// Applies an attribute filter to a whole collection.
pub fn filter_edges(input: &Path, output: &Path, filter: AttributeFilter) -> Result<()> {
    let collection = read_collection(input)?;
    let kept = filter.apply(&collection);
    let count = kept.len();
    write_geojson(output, &kept.into_geojson())
        .with_context(|| format!("writing {}", output.display()))?;
    info!("Wrote {count} edges to {}", output.display());
    Ok(())
}

/// Loads each distinct input collection once, filtered if configured.
struct Collections<'a> {
    config: &'a PipelineConfig,
    loaded: HashMap<PathBuf, EdgeCollection>,
}

impl<'a> Collections<'a> {
    fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            loaded: HashMap::new(),
        }
    }

    fn get(&mut self, path: &Path) -> Result<&EdgeCollection> {
        if !self.loaded.contains_key(path) {
            let mut collection = read_collection(path)?;
            info!("Loaded {} edges from {}", collection.len(), path.display());
            if let Some(filter) = self.config.filter {
                collection = filter.apply(&collection);
            }
            self.loaded.insert(path.to_path_buf(), collection);
        }
        Ok(&self.loaded[path])
    }
}

/// Writes the raw selected edges of each leg that has a selection output.
pub fn select_legs(config: &PipelineConfig, names: &[String]) -> Result<()> {
    let mut collections = Collections::new(config);

    for leg in config.selected_legs(names)? {
        let Some(output) = &leg.selection_output else {
            warn!("Leg '{}' has no selection_output, skipping", leg.spec.name);
            continue;
        };
        let collection = collections.get(config.leg_input(leg))?;
        let selected = select_collection(collection, &leg.spec.criteria);
        write_geojson(output, &selected.to_geojson())
            .with_context(|| format!("writing {}", output.display()))?;
        info!(
            "Found {} features for '{}'. Wrote {}",
            selected.len(),
            leg.spec.name,
            output.display()
        );
    }
    Ok(())
}

/// Assembles legs, grouped by input collection, and writes each one.
///
/// Every leg is attempted; the command fails afterwards if any leg failed.
pub fn assemble_legs(config: &PipelineConfig, names: &[String]) -> Result<()> {
    let legs = config.selected_legs(names)?;
    let assembler = LegAssembler::new(config.crs);
    let mut collections = Collections::new(config);
    let mut failed = Vec::new();

    let mut by_input: Vec<(&Path, Vec<&LegConfig>)> = Vec::new();
    for leg in legs {
        let input = config.leg_input(leg);
        match by_input.iter_mut().find(|(path, _)| *path == input) {
            Some((_, group)) => group.push(leg),
            None => by_input.push((input, vec![leg])),
        }
    }

    for (input, group) in by_input {
        let collection = collections.get(input)?;
        let specs: Vec<LegSpec> = group.iter().map(|leg| leg.spec.clone()).collect();

        for (leg, result) in group.iter().zip(assembler.assemble_all(collection, &specs)) {
            let outcome = result
                .map_err(anyhow::Error::from)
                .and_then(|assembled| {
                    if assembled.is_fragmented() {
                        warn!(
                            "Leg '{}' is fragmented into {} chains, flagged for review",
                            assembled.name,
                            assembled.chains.len()
                        );
                    }
                    write_geojson(&leg.output, &assembled.to_geojson()?)?;
                    info!(
                        "Wrote {} with measured distance of ~{:.2} km",
                        leg.output.display(),
                        assembled.length_km()
                    );
                    Ok(())
                });

            if let Err(e) = outcome {
                error!("Leg '{}' failed: {e:#}", leg.spec.name);
                failed.push(leg.spec.name.clone());
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} leg(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

pub fn clean_waypoints(config: &PipelineConfig) -> Result<()> {
    let Some(waypoints) = &config.waypoints else {
        bail!("no [waypoints] section in config");
    };

    let collection = read_collection(&waypoints.input)?;
    let kept = filter_waypoints(&collection, &waypoints.area);
    info!("Final waypoints count: {}", kept.len());
    write_geojson(&waypoints.output, &kept.into_geojson())
        .with_context(|| format!("writing {}", waypoints.output.display()))?;
    Ok(())
}

/// Runs every configured step in order: counties, legs, waypoints.
pub fn run_all(config: &PipelineConfig) -> Result<()> {
    if config.counties.is_some() {
        merge_counties(config)?;
    }
    if !config.legs.is_empty() {
        select_legs_with_output(config)?;
        assemble_legs(config, &[])?;
    }
    if config.waypoints.is_some() {
        clean_waypoints(config)?;
    }
    Ok(())
}

fn select_legs_with_output(config: &PipelineConfig) -> Result<()> {
    let names: Vec<String> = config
        .legs
        .iter()
        .filter(|leg| leg.selection_output.is_some())
        .map(|leg| leg.spec.name.clone())
        .collect();
    if names.is_empty() {
        return Ok(());
    }
    select_legs(config, &names)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn workdir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("offroad-cli-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_edges(path: &Path) {
        let edges = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature",
                  "geometry": { "type": "LineString", "coordinates": [[-109.80, 38.30], [-109.79, 38.30]] },
                  "properties": { "osmid": 10152689, "name": "Lockhart Road", "surface": "gravel" } },
                { "type": "Feature",
                  "geometry": { "type": "LineString", "coordinates": [[-109.79, 38.30], [-109.78, 38.31]] },
                  "properties": { "osmid": 656971497, "surface": "dirt" } },
                { "type": "Feature",
                  "geometry": { "type": "LineString", "coordinates": [[-109.78, 38.31], [-109.77, 38.31]] },
                  "properties": { "osmid": 777, "access": "private", "surface": "dirt" } }
            ]
        });
        std::fs::write(path, edges.to_string()).unwrap();
    }

    fn read(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn assembles_and_selects_configured_legs() {
        let dir = workdir("legs");
        let input = dir.join("edges.geojson");
        write_edges(&input);

        let config = PipelineConfig::from_toml(&format!(
            r#"
input = '{input}'

[filter]
access = true

[[legs]]
name = "Leg 1"
output = '{leg1}'
selection_output = '{leg1_selected}'
criteria = [{{ osmid = 10152689 }}, {{ osmid = 656971497 }}]

[[legs]]
name = "Leg 9"
output = '{leg9}'
criteria = [{{ osmid = 777 }}]
"#,
            input = input.display(),
            leg1 = dir.join("leg1.geojson").display(),
            leg1_selected = dir.join("leg1_selected.geojson").display(),
            leg9 = dir.join("leg9.geojson").display(),
        ))
        .unwrap();

        select_legs(&config, &["Leg 1".to_string()]).unwrap();
        let selected = read(&dir.join("leg1_selected.geojson"));
        assert_eq!(selected["features"].as_array().unwrap().len(), 2);
        assert_eq!(selected["features"][0]["properties"]["name"], json!("Lockhart Road"));

        // Leg 9 only selects a private edge, removed by the filter.
        let result = assemble_legs(&config, &[]);
        assert!(result.is_err());

        let leg1 = read(&dir.join("leg1.geojson"));
        let props = &leg1["features"][0]["properties"];
        assert_eq!(props["osmid_list"], json!([10152689, 656971497]));
        assert_eq!(props["fragmented"], json!(false));
        assert!(props["length_km_utm"].as_f64().unwrap() > 1.0);
        assert!(!dir.join("leg9.geojson").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn filters_collection_file() {
        let dir = workdir("filter");
        let input = dir.join("edges.geojson");
        let output = dir.join("legal.geojson");
        write_edges(&input);

        filter_edges(&input, &output, AttributeFilter::offroad_legal()).unwrap();

        let legal = read(&output);
        assert_eq!(legal["features"].as_array().unwrap().len(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn merges_counties_into_output() {
        let dir = workdir("counties");
        let grand = dir.join("grand.geojson");
        write_edges(&grand);
        let output = dir.join("merged.geojson");

        let config = PipelineConfig::from_toml(&format!(
            r#"
[counties]
output = '{output}'
sources = [
    {{ name = "grand", path = '{grand}' }},
    {{ name = "grand again", path = '{grand}' }},
    {{ name = "emery", path = '{missing}' }},
]
"#,
            output = output.display(),
            grand = grand.display(),
            missing = dir.join("emery.geojson").display(),
        ))
        .unwrap();

        merge_counties(&config).unwrap();

        assert_eq!(read(&output)["features"].as_array().unwrap().len(), 6);
        std::fs::remove_dir_all(&dir).ok();
    }
}
