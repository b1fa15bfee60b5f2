#![allow(dead_code)]

use std::path::PathBuf;

use cornerstone_pdk::CornerstonePdk;
use optgeom::bbox::BoundBox;
use optgeom::Point;
use photonics::layout::cell::Cell;
use photonics::layout::context::Library;
use tempfile::TempDir;

pub fn setup_library() -> Library {
    Library::new(CornerstonePdk::new())
}

/// A fresh directory for test outputs, removed when dropped.
pub fn out_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temporary directory")
}

pub fn out_path(dir: &TempDir, file_name: &str) -> PathBuf {
    dir.path().join(file_name)
}

/// The port locations of the grating couplers instantiated in `cell`, sorted by x.
///
/// Grating bodies are symmetric about their axis and extend down from the port.
pub fn grating_ports(cell: &Cell) -> Vec<Point> {
    let mut ports: Vec<Point> = cell
        .insts()
        .filter(|inst| inst.cell().name().starts_with("GC_period_"))
        .map(|inst| {
            let bbox = inst.bbox();
            Point::new(bbox.center().x, bbox.p1.y)
        })
        .collect();
    ports.sort_by(|a, b| a.x.total_cmp(&b.x));
    ports
}
