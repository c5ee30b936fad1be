//! Building Editor - headless driver for the building generator
//!
//! Builds a box house, runs a scripted sequence of edits against it and
//! prints what each edit did. Useful for eyeballing reconciliation
//! behaviour and for producing preset files.
//!
//! Run with: `cargo run --bin building_editor -- [config.json] [--save <dir>]`
//!
//! Log level comes from `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use building_gen_engine::bounds::Bounds;
use building_gen_engine::game::building::{BuildingContainer, JsonPresetStore, PresetStore, wall_level_name};
use building_gen_engine::game::config::GeneratorConfig;
use building_gen_engine::level::AssetHandle;
use building_gen_engine::math::Axis;
use building_gen_engine::reconcile::{MeshRepresentation, ReconcileReport};

// ============================================================================
// ARGUMENTS
// ============================================================================

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    save_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--save" => {
                let dir = iter.next().ok_or("--save needs a directory")?;
                args.save_dir = Some(PathBuf::from(dir));
            }
            other if other.starts_with("--") => return Err(format!("unknown flag {other}")),
            path => args.config = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

// ============================================================================
// OUTPUT
// ============================================================================

fn print_report(step: &str, report: &ReconcileReport) {
    println!(
        "{step:<28} plan={:<14} levels +{}/-{}  sections +{}/-{} ~{}  failures={}",
        report.plan.map(|plan| format!("{plan:?}")).unwrap_or_default(),
        report.levels_created,
        report.levels_removed,
        report.sections_added,
        report.sections_removed,
        report.sections_reposed,
        report.failures.len(),
    );
    for failure in &report.failures {
        println!("    ! {failure}");
    }
}

fn print_summary(building: &BuildingContainer) {
    let bounds = building.bounds();
    println!(
        "building {}x{}x{}: {} levels, {} sections",
        bounds.width,
        bounds.depth,
        bounds.height,
        building.levels().len(),
        building.registry().len()
    );
    for level in building.levels().iter() {
        let placed = building.registry().get_all_of(level.id()).len();
        println!(
            "  {:<10} {:?} {:>3} placed  skipped={:?}",
            level.name, level.initializer.snap_mode, placed, level.skipped
        );
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let cell = config.wall_resolution.x;

    let mut building = BuildingContainer::new(config, Bounds::new(3, 2, 2));
    print_summary(&building);

    print_report("grow to 3 storeys", &building.set_bounds(Bounds::new(3, 2, 3)));
    print_report("shrink back to 2", &building.set_bounds(Bounds::new(3, 2, 2)));
    print_report("widen to 4", &building.set_bounds(Bounds::new(4, 2, 2)));

    let drag = building.drag_handle(Axis::X, 4.5 * cell);
    println!(
        "{:<28} coefficients={} stretched={}",
        "drag X handle +half cell", drag.coefficients, drag.stretched
    );

    if let Some(wall) = building.level_by_name(&wall_level_name(0)).map(|level| level.id()) {
        let door = building.carve(wall, 1, AssetHandle::new("SM_Door"))?;
        println!("{:<28} {:?}", "carve door", door.kind());
    }

    print_report("instanced meshes", &building.set_representation(MeshRepresentation::Instanced));
    print_summary(&building);

    if let Some(dir) = args.save_dir {
        let mut store = JsonPresetStore::new(dir);
        store.save("house", &building.snapshot())?;
        println!("saved presets: {:?}", store.list()?);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("usage: building_editor [config.json] [--save <dir>]");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "building editor failed");
            ExitCode::FAILURE
        }
    }
}
