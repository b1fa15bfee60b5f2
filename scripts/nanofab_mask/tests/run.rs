use float_eq::assert_float_eq;
use nanofab_mask::{run, verify, write_mapping, MaskConfig, TOP_CELL_NAME};
use optgeom::bbox::BoundBox;
use photonics::layout::placement::Mapping;

#[test]
fn test_full_mask() {
    let dir = tempfile::tempdir().unwrap();
    let config = MaskConfig {
        output_dir: dir.path().join("out"),
        ..Default::default()
    };

    let output = run(&config).expect("failed to generate mask");
    assert!(output.path.exists());
    assert_eq!(output.mapping.len(), 66);

    let summary = verify(&output.path).unwrap();
    // 66 devices with four gratings each, the packed grid, and the top cell.
    assert_eq!(summary.num_structs(), 66 * 5 + 2);
    assert_eq!(summary.structs.last().unwrap().0, TOP_CELL_NAME);
    assert_eq!(summary.num_elems(TOP_CELL_NAME), Some(2));
    assert_eq!(
        summary.num_elems(&format!("{TOP_CELL_NAME}_1")),
        Some(66 + 2)
    );

    let mapping_path = dir.path().join("mapping.json");
    write_mapping(&mapping_path, &output.mapping).unwrap();
    let contents = std::fs::read_to_string(&mapping_path).unwrap();
    let mapping: Mapping = serde_json::from_str(&contents).unwrap();
    assert_eq!(mapping, output.mapping);
    assert!(mapping.get("JMO_YTY_DC_sweep_Si_240nm_etch_130nm_10").is_some());
}

#[test]
fn test_strict_default_mask_fits_design_space() {
    let dir = tempfile::tempdir().unwrap();
    let config = MaskConfig {
        output_dir: dir.path().to_path_buf(),
        strict_bounds: true,
        ..Default::default()
    };
    let output = run(&config).expect("default sweep should fit the design space");
    assert!(output.path.exists());

    // The outline sets the top cell's extent when the grid fits inside it.
    let bbox = output.top.bbox();
    assert_float_eq!(bbox.p0.x, 0., abs <= 1e-6);
    assert_float_eq!(bbox.p0.y, 0., abs <= 1e-6);
    assert_float_eq!(bbox.p1.x, 6000., abs <= 1e-6);
    assert_float_eq!(bbox.p1.y, 3000., abs <= 1e-6);

    let grid = output.top.insts().next().unwrap().bbox();
    assert!(grid.width() < 6000.);
    assert!(grid.height() < 3000.);
}
