//! Pipeline configuration read from a TOML file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use offroad_core::loading::CountySource;
use offroad_core::waypoints::WaypointArea;
use offroad_core::{AttributeFilter, LegSpec, PlanarProjection};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    /// Working edge collection used by legs without their own input
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Projection used for measuring; legs may override it
    #[serde(default)]
    pub crs: PlanarProjection,
    /// Applied to input collections before legs are selected
    #[serde(default)]
    pub filter: Option<AttributeFilter>,
    #[serde(default)]
    pub counties: Option<CountiesConfig>,
    #[serde(default)]
    pub legs: Vec<LegConfig>,
    #[serde(default)]
    pub waypoints: Option<WaypointsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CountiesConfig {
    #[serde(default = "default_input")]
    pub output: PathBuf,
    pub sources: Vec<CountySource>,
}

#[derive(Debug, Deserialize)]
pub struct LegConfig {
    #[serde(flatten)]
    pub spec: LegSpec,
    pub output: PathBuf,
    /// Raw selected edges, written before merging
    #[serde(default)]
    pub selection_output: Option<PathBuf>,
    #[serde(default)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct WaypointsConfig {
    pub input: PathBuf,
    #[serde(default = "default_waypoints_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub area: WaypointArea,
}

fn default_input() -> PathBuf {
    PathBuf::from("merged_all_counties.geojson")
}

fn default_waypoints_output() -> PathBuf {
    PathBuf::from("filtered_waypoints.geojson")
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing pipeline config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (idx, leg) in self.legs.iter().enumerate() {
            if leg.spec.criteria.is_empty() {
                bail!("leg '{}' has no criteria", leg.spec.name);
            }
            if self.legs[..idx].iter().any(|other| other.spec.name == leg.spec.name) {
                bail!("leg '{}' is configured twice", leg.spec.name);
            }
        }
        Ok(())
    }

    pub fn leg_input<'a>(&'a self, leg: &'a LegConfig) -> &'a Path {
        leg.input.as_deref().unwrap_or(&self.input)
    }

    /// Legs to run: all of them, or only the named ones.
    pub fn selected_legs(&self, names: &[String]) -> Result<Vec<&LegConfig>> {
        if names.is_empty() {
            return Ok(self.legs.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.legs
                    .iter()
                    .find(|leg| &leg.spec.name == name)
                    .with_context(|| format!("no leg named '{name}' in config"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use offroad_core::{EdgeId, SelectionCriterion};

    use super::*;

    const PIPELINE: &str = r#"
input = "merged_all_counties.geojson"
crs = "EPSG:32612"

[filter]
access = true
motor_vehicle = true

[counties]
sources = [
    { name = "grand", path = "graphs_counties/Grand_County_Utah_USA_merged_offroad_legal.geojson" },
    { name = "emery", path = "graphs_counties/Emery_County_Utah_USA_offroad_legal.geojson" },
]

[[legs]]
name = "Leg 1"
output = "leg1.geojson"
criteria = [{ osmid = 10152689 }, { osmid = 656971497 }]

[[legs]]
name = "Leg 2"
note = "Lockhart Basin"
output = "leg2.geojson"
selection_output = "leg2_selected.geojson"
crs = "EPSG:32613"
criteria = [
    { osmid = 10146993, name = "Lockhart Basin Road" },
    { osmid = 339553881 },
]
"#;

    #[test]
    fn parses_full_pipeline() {
        let config = PipelineConfig::from_toml(PIPELINE).unwrap();

        assert_eq!(config.crs, PlanarProjection::utm(12, false).unwrap());
        let filter = config.filter.unwrap();
        assert!(filter.access && filter.motor_vehicle && !filter.surface);
        assert_eq!(config.counties.as_ref().unwrap().sources.len(), 2);
        assert_eq!(
            config.counties.as_ref().unwrap().output,
            PathBuf::from("merged_all_counties.geojson")
        );

        let leg2 = &config.legs[1];
        assert_eq!(leg2.spec.note.as_deref(), Some("Lockhart Basin"));
        assert_eq!(leg2.spec.projection, Some(PlanarProjection::utm(13, false).unwrap()));
        assert_eq!(
            leg2.spec.criteria,
            vec![
                SelectionCriterion::named(10_146_993, "Lockhart Basin Road"),
                SelectionCriterion::osmid(339_553_881),
            ]
        );
        assert_eq!(leg2.spec.criteria[1].id, EdgeId::Int(339_553_881));
        assert_eq!(config.leg_input(leg2), Path::new("merged_all_counties.geojson"));
    }

    #[test]
    fn defaults_apply_to_minimal_config() {
        let config = PipelineConfig::from_toml("").unwrap();

        assert_eq!(config.input, PathBuf::from("merged_all_counties.geojson"));
        assert_eq!(config.crs, PlanarProjection::default());
        assert!(config.filter.is_none());
        assert!(config.legs.is_empty());
    }

    #[test]
    fn rejects_unsupported_crs() {
        assert!(PipelineConfig::from_toml(r#"crs = "EPSG:3857""#).is_err());
    }

    #[test]
    fn rejects_leg_without_criteria() {
        let text = r#"
[[legs]]
name = "empty"
output = "empty.geojson"
criteria = []
"#;
        assert!(PipelineConfig::from_toml(text).is_err());
    }

    #[test]
    fn selects_legs_by_name() {
        let config = PipelineConfig::from_toml(PIPELINE).unwrap();

        let legs = config.selected_legs(&["Leg 2".to_string()]).unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].spec.name, "Leg 2");

        assert!(config.selected_legs(&["Leg 7".to_string()]).is_err());
        assert_eq!(config.selected_legs(&[]).unwrap().len(), 2);
    }
}
