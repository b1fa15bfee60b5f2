//! Mask layout for the 2024 nanofabrication run: asymmetric spiral MZIs swept over
//! spiral and directional coupler geometry, packed row by row into the design space.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cornerstone_pdk::layers::{CELL_OUTLINE, LABEL};
use cornerstone_pdk::CornerstonePdk;
use log::info;
use optgeom::Point;
use photonics::devices::{asymmetric_spiral_mzi, MziParams};
use photonics::error::{with_err_context, ErrorContext, ErrorSource, Result};
use photonics::layout::cell::Cell;
use photonics::layout::context::Library;
use photonics::layout::convert::gds::{import_summary, GdsSummary};
use photonics::layout::placement::{DesignSpace, GridLayout, Mapping};
use photonics::parts::Text;

pub mod config;

pub use config::{DcSweep, MaskConfig, SweepConfig};

pub const TITLE: &str = "JMO_YTY_Nanofab_2024";
/// Name of the packed design space and of the top cell wrapping it.
pub const TOP_CELL_NAME: &str = "Cell0_JMO_YTY_Nanofab_2024_UoB";

/// The outcome of a mask run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The GDS file written.
    pub path: PathBuf,
    pub top: Arc<Cell>,
    /// Where each device was placed within the packed design space.
    pub mapping: Mapping,
}

/// Creates the empty row layout and a `d_width` x `d_height` design space.
pub fn generate_blank_gds(d_height: f64, d_width: f64) -> Result<(GridLayout, DesignSpace)> {
    let layout = GridLayout::builder()
        .title(TITLE)
        .frame_layer(CELL_OUTLINE)
        .text_layer(LABEL)
        .tight(true)
        .vertical_spacing(10.)
        .vertical_alignment(1.)
        .horizontal_spacing(10.)
        .horizontal_alignment(10.)
        .text_size(cornerstone_pdk::constants::LABEL_HEIGHT)
        .row_text_size(15.)
        .build()
        .map_err(|e| ErrorSource::Internal(e.to_string()))?;
    Ok((layout, DesignSpace::new(d_width, d_height)))
}

/// Generates one MZI at the origin, labels it, and registers it with `lib`.
fn labelled_mzi(lib: &mut Library, mzi: &MziParams, name: &str, text: String) -> Result<Arc<Cell>> {
    let pdk = lib.pdk();
    let label = pdk.label();
    let mut cell = asymmetric_spiral_mzi(lib, &pdk.grating_params(), mzi, Point::zero(), name)?;
    cell.add_to_layer(
        pdk.layers().label,
        Text::new(label.origin, label.height, label.angle, text),
    )?;
    Ok(lib.add_cell(cell))
}

/// Formats a swept label value.
///
/// Starting values print as written. Values reached by stepping always carry a
/// fractional part, so `2` prints as `2.0`.
fn swept_value(value: f64, stepped: bool) -> String {
    if stepped {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

/// Adds the MZI sweeps to `layout`, one row per sweep.
///
/// The caller begins the first row.
pub fn grating_sweep(lib: &mut Library, layout: &mut GridLayout, sweep: &SweepConfig) -> Result<()> {
    sweep.validate()?;

    let mut mzi = MziParams {
        coupling_length: sweep.coupling_length,
        coupling_gap: sweep.coupling_gap,
        upper_spiral_no: sweep.upper_spiral_start,
        lower_spiral_no: sweep.lower_spiral_no,
        spiral_gap: sweep.spiral_gap,
        spiral_inner_gap: sweep.inner_gap_start,
    };

    for i in 0..sweep.devices_per_row {
        let name = format!("JMO_YTY_Spiral_gap_sweep_{i}");
        let text = format!(
            "{name}\nSpiral_Up_Loop_{}Low_Loop_{}",
            swept_value(mzi.upper_spiral_no, i > 0),
            mzi.lower_spiral_no
        );
        layout.add_to_row(labelled_mzi(lib, &mzi, &name, text)?);
        mzi.upper_spiral_no += sweep.upper_spiral_step;
    }

    layout.begin_new_row(None);
    mzi.upper_spiral_no = sweep.inner_gap_upper_spiral_no;
    mzi.spiral_inner_gap = sweep.inner_gap_start;
    for i in 0..sweep.devices_per_row {
        let name = format!("JMO_YTY_Spiral_inner_gap_sweep_{i}");
        let text = format!(
            "{name}\nSpiral_inner_gap_{}um",
            swept_value((mzi.spiral_inner_gap * 1e3).round() / 1e3, i > 0)
        );
        layout.add_to_row(labelled_mzi(lib, &mzi, &name, text)?);
        mzi.spiral_inner_gap += sweep.inner_gap_step;
    }

    mzi.upper_spiral_no = sweep.dc_upper_spiral_no;
    for dc in sweep.dc_sweeps.iter() {
        layout.begin_new_row(None);
        let base = dc.name();
        for (i, (&length, &gap)) in dc.lengths.iter().zip(dc.gaps.iter()).enumerate() {
            mzi.coupling_length = length;
            mzi.coupling_gap = gap;
            let name = format!("{base}_{i}");
            let text = format!("{name}\nDC_Length_{length:?}um Gap_{gap:?}um");
            layout.add_to_row(labelled_mzi(lib, &mzi, &name, text)?);
        }
    }

    info!("generated {} devices", sweep.num_devices());
    Ok(())
}

/// Runs the sweep, packs it, and wraps the packed grid in a top cell
/// that also outlines the design space.
pub fn populate_gds(
    lib: &mut Library,
    layout: &mut GridLayout,
    space: &DesignSpace,
    sweep: &SweepConfig,
    strict: bool,
) -> Result<(Arc<Cell>, Mapping)> {
    layout.begin_new_row(None);
    grating_sweep(lib, layout, sweep)?;

    let (grid, mapping) = layout.generate_layout(lib, TOP_CELL_NAME)?;

    let mut top = Cell::new(TOP_CELL_NAME);
    top.add_cell(grid);
    top.add_element(lib.pdk().layers().outline, space.bounds);

    space.check(&top, strict)?;
    Ok((top.freeze(), mapping))
}

/// Builds the whole mask described by `config` and writes it to disk.
pub fn run(config: &MaskConfig) -> Result<RunOutput> {
    config.validate()?;

    let mut lib = Library::new(CornerstonePdk::new());
    let (mut layout, space) = generate_blank_gds(config.design_height, config.design_width)?;
    let (top, mapping) = populate_gds(
        &mut lib,
        &mut layout,
        &space,
        &config.sweep,
        config.strict_bounds,
    )?;

    let dir = &config.output_dir;
    with_err_context(std::fs::create_dir_all(dir), || {
        ErrorContext::CreateDir(dir.clone())
    })?;
    let path = config.output_path();
    top.save_gds(&path)?;
    info!("wrote {} cells to {:?}", lib.num_cells() + 1, path);

    Ok(RunOutput { path, top, mapping })
}

/// Writes the placement mapping as JSON.
pub fn write_mapping(path: impl AsRef<Path>, mapping: &Mapping) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(mapping)?;
    with_err_context(std::fs::write(path, json), || {
        ErrorContext::CreateFile(path.to_path_buf())
    })
}

/// Reads back a written GDS file and logs what it contains.
pub fn verify(path: impl AsRef<Path>) -> Result<GdsSummary> {
    let summary = import_summary(path)?;
    info!(
        "read back library {} with {} structs",
        summary.name,
        summary.num_structs()
    );
    match summary.num_elems(TOP_CELL_NAME) {
        Some(n) => info!("top cell {} has {} elements", TOP_CELL_NAME, n),
        None => {
            return Err(ErrorSource::Internal(format!(
                "top cell {TOP_CELL_NAME} missing from written GDS"
            ))
            .into())
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use photonics::layout::layers::LayerSpec;

    use super::*;

    fn small_sweep() -> SweepConfig {
        SweepConfig {
            devices_per_row: 2,
            dc_sweeps: vec![DcSweep {
                si_thickness: 220,
                etch_depth: 110,
                lengths: vec![10.3, 10.4],
                gaps: vec![0.29, 0.292],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn blank_layout_matches_design_space() {
        let (layout, space) = generate_blank_gds(3000., 6000.).unwrap();
        assert_eq!(layout.num_rows(), 0);
        assert_eq!(space.width(), 6000.);
        assert_eq!(space.height(), 3000.);
    }

    #[test]
    fn sweep_adds_one_row_per_group() {
        let mut lib = Library::new(CornerstonePdk::new());
        let (mut layout, _) = generate_blank_gds(3000., 6000.).unwrap();
        layout.begin_new_row(None);
        grating_sweep(&mut lib, &mut layout, &small_sweep()).unwrap();
        assert_eq!(layout.num_rows(), 3);
        // Four gratings per device, plus the device itself.
        assert_eq!(lib.num_cells(), 6 * 5);
    }

    #[test]
    fn sweep_labels_devices() {
        let mut lib = Library::new(CornerstonePdk::new());
        let (mut layout, _) = generate_blank_gds(3000., 6000.).unwrap();
        grating_sweep(&mut lib, &mut layout, &small_sweep()).unwrap();

        let label = |name: &str| -> String {
            let cell = lib.cell_named(name).unwrap();
            cell.annotations()
                .find(|t| t.layer == LayerSpec(100, 0))
                .unwrap()
                .string
                .to_string()
        };
        assert_eq!(
            label("JMO_YTY_Spiral_gap_sweep_1"),
            "JMO_YTY_Spiral_gap_sweep_1\nSpiral_Up_Loop_1.5Low_Loop_1"
        );
        assert_eq!(
            label("JMO_YTY_Spiral_inner_gap_sweep_1"),
            "JMO_YTY_Spiral_inner_gap_sweep_1\nSpiral_inner_gap_5.3um"
        );
        assert_eq!(
            label("JMO_YTY_DC_sweep_Si_220nm_etch_110nm_1"),
            "JMO_YTY_DC_sweep_Si_220nm_etch_110nm_1\nDC_Length_10.4um Gap_0.292um"
        );
    }

    #[test]
    fn stepped_labels_keep_fractional_part() {
        let mut lib = Library::new(CornerstonePdk::new());
        let (mut layout, _) = generate_blank_gds(3000., 6000.).unwrap();
        let sweep = SweepConfig {
            dc_sweeps: SweepConfig::default().dc_sweeps[..1].to_vec(),
            ..Default::default()
        };
        grating_sweep(&mut lib, &mut layout, &sweep).unwrap();

        let label = |name: &str| -> String {
            let cell = lib.cell_named(name).unwrap();
            let text = cell
                .annotations()
                .find(|t| t.layer == LayerSpec(100, 0))
                .unwrap()
                .string
                .to_string();
            text.split_once('\n').unwrap().1.to_string()
        };
        assert_eq!(label("JMO_YTY_Spiral_gap_sweep_0"), "Spiral_Up_Loop_1Low_Loop_1");
        assert_eq!(label("JMO_YTY_Spiral_gap_sweep_2"), "Spiral_Up_Loop_2.0Low_Loop_1");
        assert_eq!(label("JMO_YTY_Spiral_inner_gap_sweep_0"), "Spiral_inner_gap_5um");
        assert_eq!(label("JMO_YTY_Spiral_inner_gap_sweep_10"), "Spiral_inner_gap_8.0um");
        assert_eq!(
            label("JMO_YTY_DC_sweep_Si_220nm_etch_110nm_10"),
            "DC_Length_12.0um Gap_0.31um"
        );
        assert_eq!(
            label("JMO_YTY_DC_sweep_Si_220nm_etch_110nm_5"),
            "DC_Length_10.9um Gap_0.3um"
        );
    }

    #[test]
    fn populated_top_outlines_design_space() {
        let mut lib = Library::new(CornerstonePdk::new());
        let (mut layout, space) = generate_blank_gds(3000., 6000.).unwrap();
        let (top, mapping) =
            populate_gds(&mut lib, &mut layout, &space, &small_sweep(), false).unwrap();

        assert_eq!(top.name().as_str(), TOP_CELL_NAME);
        assert_eq!(mapping.len(), 6);
        assert_eq!(top.insts().count(), 1);
        assert!(top
            .elems_on(LayerSpec(99, 0))
            .any(|e| e.inner.as_rect() == Some(space.bounds)));
    }

    #[test]
    fn strict_bounds_reject_overflow() {
        let mut lib = Library::new(CornerstonePdk::new());
        let (mut layout, space) = generate_blank_gds(100., 100.).unwrap();
        let err = populate_gds(&mut lib, &mut layout, &space, &small_sweep(), true).unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::DesignSpaceOverflow { .. }
        ));
    }
}
