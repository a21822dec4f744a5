//! Footprint overlay export.
//!
//! Stale overlays are removed first so a destination directory never holds
//! more than one. The new document is built in memory, written to a `.part`
//! sibling and renamed into place, so a rejected footprint never leaves a
//! partial file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use geo_types::{Geometry, LineString};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{debug, info};

use super::error::{OverlayError, OverlayResult};
use super::OVERLAY_PATTERN;
use crate::catalog::CatalogProduct;
use crate::fsutil;

/// Namespace of the documents this module writes.
pub(super) const KML22_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// File name of the overlay written on `date`.
pub fn overlay_file_name(date: NaiveDate) -> String {
    format!("footprints_{}.kml", date.format("%Y%m%d"))
}

/// Export product footprints into `dir`, stamped with today's local date.
pub fn export_footprints(products: &[CatalogProduct], dir: &Path) -> OverlayResult<PathBuf> {
    export_footprints_dated(products, dir, Local::now().date_naive())
}

/// Export product footprints into `dir` as `footprints_<date>.kml`.
///
/// Every footprint must be a polygon; otherwise nothing is written and
/// [`OverlayError::UnsupportedGeometry`] is returned. Existing `*.kml`
/// files in `dir` are deleted in either case.
pub fn export_footprints_dated(
    products: &[CatalogProduct],
    dir: &Path,
    date: NaiveDate,
) -> OverlayResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| OverlayError::io(dir, e))?;
    let removed = remove_stale_overlays(dir)?;
    if removed > 0 {
        debug!(dir = %dir.display(), removed, "Removed stale overlays");
    }

    let rings = products
        .iter()
        .map(|product| match &product.footprint {
            Geometry::Polygon(polygon) => Ok((product, polygon.exterior())),
            other => Err(OverlayError::UnsupportedGeometry {
                id: product.id.clone(),
                kind: geometry_kind(other),
            }),
        })
        .collect::<OverlayResult<Vec<_>>>()?;

    let file_name = overlay_file_name(date);
    let document = render_document(file_name.trim_end_matches(".kml"), &rings)?;

    let path = dir.join(&file_name);
    let part = dir.join(format!("{}.part", file_name));
    let mut file = fs::File::create(&part).map_err(|e| OverlayError::io(&part, e))?;
    file.write_all(&document)
        .and_then(|_| file.sync_all())
        .map_err(|e| OverlayError::io(&part, e))?;
    drop(file);
    fs::rename(&part, &path).map_err(|e| OverlayError::io(&path, e))?;

    info!(path = %path.display(), features = rings.len(), "Wrote footprint overlay");
    Ok(path)
}

fn remove_stale_overlays(dir: &Path) -> OverlayResult<usize> {
    let stale =
        fsutil::matching_files(dir, OVERLAY_PATTERN).map_err(|e| OverlayError::io(dir, e))?;
    for path in &stale {
        fs::remove_file(path).map_err(|e| OverlayError::io(path, e))?;
    }
    Ok(stale.len())
}

fn render_document(
    name: &str,
    rings: &[(&CatalogProduct, &LineString<f64>)],
) -> OverlayResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(
        &mut writer,
        Event::Start(BytesStart::new("kml").with_attributes([("xmlns", KML22_NAMESPACE)])),
    )?;
    write(&mut writer, Event::Start(BytesStart::new("Document")))?;
    write_text_element(&mut writer, "name", name)?;

    for (product, ring) in rings {
        write(&mut writer, Event::Start(BytesStart::new("Placemark")))?;
        write_text_element(&mut writer, "name", &product.id)?;
        write_text_element(&mut writer, "description", &product.file_name)?;
        write(&mut writer, Event::Start(BytesStart::new("Polygon")))?;
        write(&mut writer, Event::Start(BytesStart::new("outerBoundaryIs")))?;
        write(&mut writer, Event::Start(BytesStart::new("LinearRing")))?;
        write_text_element(&mut writer, "coordinates", &format_ring(ring))?;
        write(&mut writer, Event::End(BytesEnd::new("LinearRing")))?;
        write(&mut writer, Event::End(BytesEnd::new("outerBoundaryIs")))?;
        write(&mut writer, Event::End(BytesEnd::new("Polygon")))?;
        write(&mut writer, Event::End(BytesEnd::new("Placemark")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("Document")))?;
    write(&mut writer, Event::End(BytesEnd::new("kml")))?;

    Ok(writer.into_inner())
}

fn write<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> OverlayResult<()> {
    writer
        .write_event(event)
        .map_err(|e| OverlayError::Xml(e.to_string()))
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> OverlayResult<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// `lon,lat,0` tuples separated by spaces.
fn format_ring(ring: &LineString<f64>) -> String {
    ring.coords()
        .map(|c| format!("{},{},0", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, Point};

    fn product(id: &str, footprint: Geometry<f64>) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            footprint,
            expected_bytes: 100,
            file_name: format!("{}.zip", id),
            url: format!("https://example.test/{}.zip", id),
        }
    }

    fn square(id: &str) -> CatalogProduct {
        product(
            id,
            Geometry::Polygon(polygon![
                (x: -78.0, y: -1.0),
                (x: -76.0, y: -1.0),
                (x: -76.0, y: 1.0),
                (x: -78.0, y: 1.0),
                (x: -78.0, y: -1.0),
            ]),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_overlay_file_name() {
        assert_eq!(overlay_file_name(date()), "footprints_20240305.kml");
    }

    #[test]
    fn test_export_writes_one_placemark_per_product() {
        let dir = tempfile::tempdir().unwrap();
        let products = vec![square("A"), square("B")];

        let path = export_footprints_dated(&products, dir.path(), date()).unwrap();
        assert_eq!(path, dir.path().join("footprints_20240305.kml"));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("<Placemark>").count(), 2);
        assert!(content.contains(KML22_NAMESPACE));
        assert!(content.contains("<name>A</name>"));
        assert!(content.contains("-78,-1,0 -76,-1,0 -76,1,0 -78,1,0 -78,-1,0"));
        assert!(!dir.path().join("footprints_20240305.kml.part").exists());
    }

    #[test]
    fn test_export_replaces_stale_overlays() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("footprints_20230101.kml"), "old").unwrap();
        fs::write(dir.path().join("other.kml"), "old").unwrap();
        fs::write(dir.path().join("keep.zip"), "data").unwrap();

        export_footprints_dated(&[square("A")], dir.path(), date()).unwrap();

        let overlays = fsutil::matching_files(dir.path(), OVERLAY_PATTERN).unwrap();
        assert_eq!(overlays, vec![dir.path().join("footprints_20240305.kml")]);
        assert!(dir.path().join("keep.zip").exists());
    }

    #[test]
    fn test_non_polygon_footprint_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale.kml"), "old").unwrap();
        let products = vec![square("A"), product("B", Geometry::Point(Point::new(1.0, 2.0)))];

        let result = export_footprints_dated(&products, dir.path(), date());
        match result {
            Err(OverlayError::UnsupportedGeometry { id, kind }) => {
                assert_eq!(id, "B");
                assert_eq!(kind, "Point");
            }
            other => panic!("expected UnsupportedGeometry, got {:?}", other),
        }

        assert!(fsutil::matching_files(dir.path(), "*").unwrap().is_empty());
    }

    #[test]
    fn test_export_empty_product_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_footprints_dated(&[], dir.path(), date()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(!content.contains("<Placemark>"));
        assert!(content.contains("<Document>"));
    }

    #[test]
    fn test_product_id_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_footprints_dated(&[square("A&B")], dir.path(), date()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("A&amp;B"));
    }
}
