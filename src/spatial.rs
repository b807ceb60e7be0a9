//! Great-circle association of survey clusters to precipitation stations.
//!
//! Every later stage refers to stations by their position in one shared,
//! ordered station sequence, so the matrix and the index sets built here are
//! all positional.

use crate::{
    error::{Error, Result},
    reading::{Coordinate, Location},
};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine great-circle distance between two points, in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Dense row-major matrix of cluster-to-station distances (km). Row index is
/// the location's position, column index the station's.
#[derive(Debug)]
pub struct DistanceMatrix {
    n_locations: usize,
    n_stations: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn compute(locations: &[Location], stations: &[Coordinate]) -> Self {
        let mut values = Vec::with_capacity(locations.len() * stations.len());
        for location in locations {
            for station in stations {
                values.push(haversine_km(location.coordinate, *station));
            }
        }

        DistanceMatrix {
            n_locations: locations.len(),
            n_stations: stations.len(),
            values,
        }
    }

    pub fn n_stations(&self) -> usize {
        self.n_stations
    }

    pub fn n_locations(&self) -> usize {
        self.n_locations
    }

    /// All station distances for one location, in station order.
    pub fn row(&self, location: usize) -> &[f64] {
        let start = location * self.n_stations;
        &self.values[start..start + self.n_stations]
    }

    /// The k-th smallest distance in a location's row (k is 1-based).
    pub fn kth_nearest(&self, location: usize, k: usize) -> f64 {
        let mut distances = self.row(location).to_vec();
        distances.sort_by(|a, b| a.partial_cmp(b).expect("distances are finite"));
        distances[k - 1]
    }
}

/// How the capture radius is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// A caller-supplied radius in km.
    Fixed(f64),
    /// The third quartile, across clusters, of the distance needed to capture
    /// `k` stations.
    KthNearest { k: usize },
}

impl Threshold {
    pub fn resolve(&self, matrix: &DistanceMatrix) -> Result<f64> {
        match *self {
            Threshold::Fixed(km) => Ok(km),
            Threshold::KthNearest { k } => {
                if k == 0 || k > matrix.n_stations() {
                    return Err(Error::config(format!(
                        "cannot capture {} stations: only {} available",
                        k,
                        matrix.n_stations()
                    )));
                }
                let kth: Vec<f64> = (0..matrix.n_locations())
                    .map(|location| matrix.kth_nearest(location, k))
                    .collect();
                Ok(quantile(&kth, 0.75))
            }
        }
    }
}

/// Linear-interpolation quantile of an unsorted sample. `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> f64 {
    assert!(!values.is_empty(), "quantile of an empty sample");
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("sample values are finite"));

    let rank = q * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    if below == above {
        return sorted[below];
    }
    let weight = rank - below as f64;
    sorted[below] * (1.0 - weight) + sorted[above] * weight
}

/// The spatial join's output: per-location station index sets plus the
/// bookkeeping the assembler and the run summary need.
#[derive(Debug)]
pub struct Association {
    /// For each location, the indices of stations within the threshold.
    pub station_sets: Vec<Vec<usize>>,
    /// The radius actually applied, in km.
    pub threshold_km: f64,
    /// Indices of locations sitting exactly at (0, 0), to be dropped by the
    /// panel assembler.
    pub origin_locations: Vec<usize>,
}

impl Association {
    pub fn zero_capture_count(&self) -> usize {
        self.station_sets.iter().filter(|set| set.is_empty()).count()
    }

    pub fn mean_captured(&self) -> f64 {
        let total: usize = self.station_sets.iter().map(|set| set.len()).sum();
        total as f64 / self.station_sets.len() as f64
    }
}

/// Associates every location with its nearby stations. Origin locations are
/// flagged for later removal but still get a full distance row and index
/// set, so positional correspondence is preserved end to end.
pub fn associate(
    locations: &[Location],
    stations: &[Coordinate],
    threshold: Threshold,
) -> Result<Association> {
    if locations.is_empty() {
        return Err(Error::config("no locations to associate"));
    }
    if stations.is_empty() {
        return Err(Error::config("no stations to associate"));
    }

    let matrix = DistanceMatrix::compute(locations, stations);
    let threshold_km = threshold.resolve(&matrix)?;

    let station_sets: Vec<Vec<usize>> = (0..locations.len())
        .map(|location| {
            matrix
                .row(location)
                .iter()
                .enumerate()
                .filter(|(_, &distance)| distance <= threshold_km)
                .map(|(station, _)| station)
                .collect()
        })
        .collect();

    let origin_locations: Vec<usize> = locations
        .iter()
        .enumerate()
        .filter(|(_, location)| location.is_origin())
        .map(|(index, _)| index)
        .collect();

    Ok(Association {
        station_sets,
        threshold_km,
        origin_locations,
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn coord(longitude: f64, latitude: f64) -> Coordinate {
        Coordinate {
            longitude,
            latitude,
        }
    }

    fn location(longitude: f64, latitude: f64, cluster: u32) -> Location {
        Location {
            dhs_id: format!("KE20140000{cluster:04}"),
            cluster,
            coordinate: coord(longitude, latitude),
        }
    }

    #[test]
    fn should_be_symmetric() {
        let a = coord(36.8, -1.3);
        let b = coord(34.75, 0.5);

        assert_relative_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn should_match_known_distance() {
        // Nairobi to Mombasa, roughly 440 km.
        let nairobi = coord(36.8219, -1.2921);
        let mombasa = coord(39.6682, -4.0435);

        let d = haversine_km(nairobi, mombasa);
        assert!((430.0..450.0).contains(&d), "got {d}");
    }

    #[test]
    fn should_capture_stations_within_fixed_threshold() {
        let locations = vec![location(1.0, 1.0, 1)];
        let stations = vec![coord(0.0, 0.0), coord(1.0, 1.0), coord(2.0, 2.0)];

        let association = associate(&locations, &stations, Threshold::Fixed(200.0)).unwrap();

        assert_eq!(association.station_sets[0], vec![0, 1, 2]);
        assert_eq!(association.zero_capture_count(), 0);
    }

    #[test]
    fn should_count_zero_capture_locations() {
        let locations = vec![location(1.0, 1.0, 1), location(100.0, 40.0, 2)];
        let stations = vec![coord(1.0, 1.0)];

        let association = associate(&locations, &stations, Threshold::Fixed(50.0)).unwrap();

        assert!(association.station_sets[1].is_empty());
        assert_eq!(association.zero_capture_count(), 1);
        assert_relative_eq!(association.mean_captured(), 0.5);
    }

    #[test]
    fn should_flag_origin_locations_without_dropping_them() {
        let locations = vec![location(0.0, 0.0, 1), location(1.0, 1.0, 2)];
        let stations = vec![coord(1.0, 1.0)];

        let association = associate(&locations, &stations, Threshold::Fixed(500.0)).unwrap();

        assert_eq!(association.origin_locations, vec![0]);
        assert_eq!(association.station_sets.len(), 2);
    }

    #[test]
    fn should_derive_threshold_from_kth_nearest_quartile() {
        // Two clusters, three stations strung out eastwards. k = 2 means each
        // cluster needs its second-nearest station.
        let locations = vec![location(0.0, 0.0, 1), location(1.0, 0.0, 2)];
        let stations = vec![coord(0.0, 0.0), coord(1.0, 0.0), coord(2.0, 0.0)];
        let matrix = DistanceMatrix::compute(&locations, &stations);

        let resolved = Threshold::KthNearest { k: 2 }.resolve(&matrix).unwrap();

        // Both clusters' 2nd-nearest is one degree of longitude away, so any
        // quantile of those distances equals that distance.
        let one_degree = haversine_km(coord(0.0, 0.0), coord(1.0, 0.0));
        assert_relative_eq!(resolved, one_degree, epsilon = 1e-9);
    }

    #[test]
    fn should_reject_k_larger_than_station_count() {
        let locations = vec![location(0.0, 0.0, 1)];
        let stations = vec![coord(1.0, 0.0)];
        let matrix = DistanceMatrix::compute(&locations, &stations);

        assert!(Threshold::KthNearest { k: 5 }.resolve(&matrix).is_err());
    }

    #[test]
    fn should_interpolate_quantiles() {
        let values = vec![4.0, 1.0, 3.0, 2.0];

        assert_relative_eq!(quantile(&values, 0.0), 1.0);
        assert_relative_eq!(quantile(&values, 0.5), 2.5);
        assert_relative_eq!(quantile(&values, 0.75), 3.25);
        assert_relative_eq!(quantile(&values, 1.0), 4.0);
    }
}
