use std::path::PathBuf;

use log::{info, warn};
use serde::Deserialize;

use super::read_collection;
use crate::{EdgeCollection, Error};

/// One county export to include in the working collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CountySource {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct CountyMerge {
    pub collection: EdgeCollection,
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
}

/// Concatenates county collections in the given order. Edges shared by
/// neighbouring counties are kept twice.
///
/// Missing files and documents that are not feature collections are logged
/// and skipped.
///
/// # Errors
///
/// Any other I/O failure aborts the merge.
pub fn merge_county_collections(sources: &[CountySource]) -> Result<CountyMerge, Error> {
    let mut merge = CountyMerge::default();

    for source in sources {
        match read_collection(&source.path) {
            Ok(collection) => {
                info!(
                    "Loaded {} edges for {} from {}",
                    collection.len(),
                    source.name,
                    source.path.display()
                );
                merge.collection.extend(collection);
                merge.loaded.push(source.name.clone());
            }
            Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("File not found for {}: {}", source.name, source.path.display());
                merge.skipped.push(source.name.clone());
            }
            Err(Error::MalformedInput(msg)) => {
                warn!("Skipping {}: not a valid FeatureCollection ({msg})", source.name);
                merge.skipped.push(source.name.clone());
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Merged {} edges from {} counties ({} skipped)",
        merge.collection.len(),
        merge.loaded.len(),
        merge.skipped.len()
    );
    Ok(merge)
}
