use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataSourceError;
use super::loader::normalize_zone_code;

/// Feature property holding the zone code.
pub const ZONE_PROPERTY: &str = "ZIP";

/// A closed ring of `[longitude, latitude]` positions.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Exterior ring followed by any holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Outer boundary of every polygon part.
    pub fn exterior_rings(&self) -> Vec<&Ring> {
        match self {
            Geometry::Polygon(rings) => rings.first().into_iter().collect(),
            Geometry::MultiPolygon(parts) => parts.iter().filter_map(|p| p.first()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneBoundary {
    pub zone_code: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub zones: Vec<ZoneBoundary>,
}

impl BoundaryCollection {
    /// Copy of the boundaries whose zone code is in `codes`.
    pub fn restricted_to(&self, codes: &BTreeSet<&str>) -> BoundaryCollection {
        BoundaryCollection {
            zones: self
                .zones
                .iter()
                .filter(|z| codes.contains(z.zone_code.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeatureCollectionJson {
    features: Vec<FeatureJson>,
}

#[derive(Debug, Deserialize)]
struct FeatureJson {
    #[serde(default)]
    properties: Option<serde_json::Map<String, JsonValue>>,
    #[serde(default)]
    geometry: Option<GeometryJson>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryJson {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

fn to_ring(positions: Vec<Vec<f64>>) -> Ring {
    positions
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| [p[0], p[1]])
        .collect()
}

fn zone_code_of(properties: &serde_json::Map<String, JsonValue>) -> Option<String> {
    match properties.get(ZONE_PROPERTY)? {
        JsonValue::String(s) => Some(normalize_zone_code(s)),
        JsonValue::Number(n) => Some(normalize_zone_code(&n.to_string())),
        _ => None,
    }
}

/// Parse a GeoJSON FeatureCollection. Features without a zone code or with
/// a non-polygonal geometry are skipped.
pub fn parse_boundaries(text: &str, origin: &str) -> Result<BoundaryCollection, DataSourceError> {
    let collection: FeatureCollectionJson =
        serde_json::from_str(text).map_err(|source| DataSourceError::Json {
            origin: origin.to_string(),
            source,
        })?;

    let mut zones = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.into_iter().enumerate() {
        let Some(zone_code) = feature.properties.as_ref().and_then(zone_code_of) else {
            log::warn!("{origin}: feature {i} has no `{ZONE_PROPERTY}` property, skipped");
            continue;
        };
        let geometry = match feature.geometry {
            Some(GeometryJson::Polygon { coordinates }) => {
                Geometry::Polygon(coordinates.into_iter().map(to_ring).collect())
            }
            Some(GeometryJson::MultiPolygon { coordinates }) => Geometry::MultiPolygon(
                coordinates
                    .into_iter()
                    .map(|part| part.into_iter().map(to_ring).collect())
                    .collect(),
            ),
            Some(GeometryJson::Unsupported) | None => {
                log::warn!("{origin}: zone {zone_code} has no polygon geometry, skipped");
                continue;
            }
        };
        zones.push(ZoneBoundary {
            zone_code,
            geometry,
        });
    }
    Ok(BoundaryCollection { zones })
}

/// Load boundaries from a local path or an `http(s)://` URI.
pub fn load_boundaries(source: &str, timeout: Duration) -> Result<BoundaryCollection, DataSourceError> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source, timeout)?
    } else {
        std::fs::read_to_string(source).map_err(|e| DataSourceError::Io {
            path: source.to_string(),
            source: e,
        })?
    };
    let boundaries = parse_boundaries(&text, source)?;
    log::info!("Loaded {} zone boundaries from {source}", boundaries.len());
    Ok(boundaries)
}

fn fetch(uri: &str, timeout: Duration) -> Result<String, DataSourceError> {
    let http_err = |source| DataSourceError::Http {
        uri: uri.to_string(),
        source,
    };
    log::debug!("Fetching boundaries from {uri}");
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_err)?;
    client
        .get(uri)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text())
        .map_err(http_err)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn square(zone_code: &str, x: f64, y: f64) -> ZoneBoundary {
        ZoneBoundary {
            zone_code: zone_code.to_string(),
            geometry: Geometry::Polygon(vec![vec![
                [x, y],
                [x + 1.0, y],
                [x + 1.0, y + 1.0],
                [x, y + 1.0],
                [x, y],
            ]]),
        }
    }

    const GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ZIP": 98001, "NAME": "Auburn"},
             "geometry": {"type": "Polygon", "coordinates": [[[-122.3, 47.3, 0.0], [-122.2, 47.3], [-122.2, 47.4], [-122.3, 47.3]]]}},
            {"type": "Feature", "properties": {"ZIP": "98002"},
             "geometry": {"type": "MultiPolygon", "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]], [[[5, 5], [6, 5], [6, 6], [5, 5]]]]}},
            {"type": "Feature", "properties": {"NAME": "no zip"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]}},
            {"type": "Feature", "properties": {"ZIP": "98003"},
             "geometry": {"type": "Point", "coordinates": [0, 0]}},
            {"type": "Feature", "properties": {"ZIP": "98004"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn parses_polygons_and_skips_unusable_features() {
        let boundaries = parse_boundaries(GEOJSON, "test").unwrap();
        let codes: Vec<&str> = boundaries.zones.iter().map(|z| z.zone_code.as_str()).collect();
        assert_eq!(codes, vec!["98001", "98002"]);

        let first = &boundaries.zones[0];
        assert_eq!(first.geometry.exterior_rings()[0][0], [-122.3, 47.3]);
        assert_eq!(boundaries.zones[1].geometry.exterior_rings().len(), 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_boundaries("{\"features\": 3}", "bad.geojson").unwrap_err();
        assert!(matches!(err, DataSourceError::Json { .. }));
    }

    #[test]
    fn restricts_to_known_codes() {
        let all = BoundaryCollection {
            zones: vec![square("A", 0.0, 0.0), square("B", 1.0, 0.0), square("C", 2.0, 0.0)],
        };
        let keep: BTreeSet<&str> = ["A", "C", "Z"].into_iter().collect();
        let restricted = all.restricted_to(&keep);
        assert_eq!(restricted.len(), 2);
        assert_eq!(restricted.zones[1].zone_code, "C");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn loads_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.geojson");
        std::fs::write(&path, GEOJSON).unwrap();

        let boundaries = load_boundaries(path.to_str().unwrap(), Duration::from_secs(1)).unwrap();
        assert_eq!(boundaries.len(), 2);

        let missing = dir.path().join("none.geojson");
        assert!(matches!(
            load_boundaries(missing.to_str().unwrap(), Duration::from_secs(1)),
            Err(DataSourceError::Io { .. })
        ));
    }
}
