//! PostGIS statement templates.
//!
//! Table names come from validated configuration and are formatted into the
//! text. Everything a client sends is a `$n` parameter.

use crate::config::TableName;

pub fn point_in_polygon(table: &TableName) -> String {
    format!(
        r#"
SELECT id,
       COALESCE(name, '') AS name,
       ST_AsGeoJSON(geom)::json AS geom_geojson
FROM {table}
WHERE GeometryType(geom) IN ('POLYGON', 'MULTIPOLYGON')
  AND ST_Covers(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))
LIMIT $3"#
    )
}

pub fn intersects(table: &TableName) -> String {
    format!(
        r#"
WITH q AS (
  SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326) AS g
)
SELECT id,
       COALESCE(name, '') AS name,
       ST_AsGeoJSON(geom)::json AS geom_geojson
FROM {table}, q
WHERE ST_Intersects(geom, q.g)
LIMIT $2"#
    )
}

pub fn within_distance(table: &TableName) -> String {
    format!(
        r#"
WITH p AS (
  SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326) AS pt
)
SELECT id, osmid, element_type, name, tags,
       ST_Distance(geom::geography, p.pt::geography) AS dist_m,
       ST_AsGeoJSON(geom)::json AS geom_geojson
FROM {table}, p
WHERE ST_DWithin(geom::geography, p.pt::geography, $3)
ORDER BY dist_m
LIMIT $4"#
    )
}

pub const BUFFER_POLYGON: &str = r#"
SELECT ST_AsGeoJSON(
         ST_Buffer(ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)::geometry
       )::json AS geom_geojson"#;

pub fn buffer_hits(table: &TableName) -> String {
    format!(
        r#"
WITH buf AS (
  SELECT ST_Buffer(ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)::geometry AS g
)
SELECT id, osmid, element_type, name, tags,
       ST_AsGeoJSON(geom)::json AS geom_geojson
FROM {table}, buf
WHERE ST_Intersects(geom, buf.g)
LIMIT $4"#
    )
}

pub const AREA: &str = r#"
WITH q AS (
  SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326) AS g
)
SELECT ST_Area(q.g::geography) AS area_m2
FROM q"#;

pub const PERIMETER: &str = r#"
WITH q AS (
  SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326) AS g
)
SELECT ST_Perimeter(q.g::geography) AS perimeter_m
FROM q"#;

/// `<->` uses the spatial index for candidate order; `dist_m` is the
/// geodesic distance reported back and used for the final ordering.
pub fn knn(table: &TableName) -> String {
    format!(
        r#"
WITH p AS (
  SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326) AS pt
)
SELECT id, osmid, element_type, name, tags,
       ST_Distance(geom::geography, p.pt::geography) AS dist_m,
       ST_AsGeoJSON(geom)::json AS geom_geojson
FROM {table}, p
ORDER BY geom <-> p.pt
LIMIT $3"#
    )
}

pub fn union_regions(table: &TableName) -> String {
    format!(
        r#"
SELECT ST_AsGeoJSON(ST_Union(geom))::json AS geom_geojson
FROM {table}
WHERE id = ANY($1)"#
    )
}

pub const UNION_GEOMETRIES: &str = r#"
WITH arr AS (
  SELECT ARRAY(
    SELECT ST_SetSRID(ST_GeomFromGeoJSON(x), 4326)
    FROM unnest($1::text[]) AS x
  ) AS gs
)
SELECT ST_AsGeoJSON(ST_Union(gs))::json AS geom_geojson
FROM arr"#;

/// Empty intersections come back as a NULL geometry with zero area.
pub const INTERSECTION: &str = r#"
WITH q AS (
  SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326) AS a,
         ST_SetSRID(ST_GeomFromGeoJSON($2::text), 4326) AS b
),
i AS (
  SELECT ST_Intersection(q.a, q.b) AS g FROM q
)
SELECT CASE WHEN i.g IS NULL OR ST_IsEmpty(i.g) THEN NULL
            ELSE ST_AsGeoJSON(i.g)::json END AS geom_geojson,
       COALESCE(ST_Area(i.g::geography), 0.0) AS area_m2
FROM i"#;

pub const TRANSFORM: &str = r#"
WITH q AS (
  SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326) AS g
)
SELECT ST_AsGeoJSON(q.g)::json AS geom_wgs84,
       ST_AsGeoJSON(ST_Transform(q.g, $2::integer))::json AS geom_transformed
FROM q"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_substituted() {
        let table = TableName::parse("gis.places").unwrap();
        assert!(point_in_polygon(&table).contains("FROM gis.places\n"));
        assert!(knn(&table).contains("FROM gis.places, p"));
        assert!(union_regions(&table).contains("FROM gis.places\n"));
    }

    #[test]
    fn test_feature_queries_alias_geometry_column() {
        let table = TableName::parse("t").unwrap();
        for sql in [
            point_in_polygon(&table),
            intersects(&table),
            within_distance(&table),
            buffer_hits(&table),
            knn(&table),
        ] {
            assert!(sql.contains("AS geom_geojson"));
        }
    }
}
