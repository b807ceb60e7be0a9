//! Survey cluster locations from a GeoJSON point layer.

use std::{fs, path::Path};

use geojson::{FeatureCollection, GeoJson, Value};

use crate::error::{Error, Result};

use super::Coordinate;

/// A survey cluster centre. `cluster` is the 1-based cluster number used in
/// the final panel; `dhs_id` is the survey's own identifier string.
#[derive(Debug, Clone)]
pub struct Location {
    pub dhs_id: String,
    pub cluster: u32,
    pub coordinate: Coordinate,
}

impl Location {
    pub fn is_origin(&self) -> bool {
        self.coordinate.is_origin()
    }
}

/// Reads a FeatureCollection of cluster points. Every feature must carry a
/// point geometry and a `DHSID` property; `DHSCLUST` defaults to the 1-based
/// feature position when absent.
pub fn read_locations(path: &Path) -> Result<Vec<Location>> {
    let contents = fs::read_to_string(path)?;
    let geojson: GeoJson = contents
        .parse()
        .map_err(|e| Error::parse(path, 0, format!("invalid GeoJSON: {e}")))?;
    let collection = FeatureCollection::try_from(geojson)
        .map_err(|_| Error::parse(path, 0, "not a GeoJSON FeatureCollection"))?;

    let mut locations = Vec::new();

    for (index, feature) in collection.features.iter().enumerate() {
        let feature_no = index + 1;
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| Error::parse(path, feature_no, "feature has no geometry"))?;
        let Value::Point(ref position) = geometry.value else {
            return Err(Error::parse(path, feature_no, "feature geometry is not a point"));
        };
        if position.len() < 2 {
            return Err(Error::parse(path, feature_no, "point has fewer than 2 ordinates"));
        }

        let dhs_id = feature
            .property("DHSID")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::parse(path, feature_no, "feature has no DHSID property"))?;
        let cluster = feature
            .property("DHSCLUST")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
            .unwrap_or(feature_no as u32);

        locations.push(Location {
            dhs_id,
            cluster,
            coordinate: Coordinate {
                longitude: position[0],
                latitude: position[1],
            },
        });
    }

    if locations.is_empty() {
        return Err(Error::config(format!(
            "`{}` contains no cluster points",
            path.display()
        )));
    }

    Ok(locations)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_geojson(contents: &str) -> tempfile::NamedTempFile {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    const TWO_CLUSTERS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"DHSID": "KE201400000001", "DHSCLUST": 1},
                "geometry": {"type": "Point", "coordinates": [36.75, -1.25]}
            },
            {
                "type": "Feature",
                "properties": {"DHSID": "KE201400000002", "DHSCLUST": 2},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }
        ]
    }"#;

    #[test]
    fn should_read_cluster_points() {
        let file = write_geojson(TWO_CLUSTERS);
        let locations = read_locations(file.path()).unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].dhs_id, "KE201400000001");
        assert_eq!(locations[0].cluster, 1);
        assert_eq!(locations[0].coordinate.longitude, 36.75);
        assert!(!locations[0].is_origin());
        assert!(locations[1].is_origin());
    }

    #[test]
    fn should_default_cluster_to_feature_order() {
        let file = write_geojson(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"DHSID": "KE201400000009"},
                        "geometry": {"type": "Point", "coordinates": [35.0, 1.0]}
                    }
                ]
            }"#,
        );
        let locations = read_locations(file.path()).unwrap();

        assert_eq!(locations[0].cluster, 1);
    }

    #[test]
    fn should_reject_missing_dhs_id() {
        let file = write_geojson(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {},
                        "geometry": {"type": "Point", "coordinates": [35.0, 1.0]}
                    }
                ]
            }"#,
        );

        assert!(read_locations(file.path()).is_err());
    }

    #[test]
    fn should_reject_non_point_geometry() {
        let file = write_geojson(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"DHSID": "KE201400000003"},
                        "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}
                    }
                ]
            }"#,
        );

        assert!(read_locations(file.path()).is_err());
    }
}
