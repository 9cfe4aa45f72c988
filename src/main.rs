use clap::Parser;
use optrace::{
    console::{show_intro, Args, PartialArgs},
    error::{OptResult, OptraceError},
    lens_imaging::{ImagingConfig, LensImaging},
    ray_path::{write_passes_csv, RayPath},
    tracer::{TraceOutcome, Tracer},
    Scene,
};
use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};
use uom::si::length::nanometer;

fn read_scene(path: &Path) -> OptResult<Scene> {
    print!("\nReading scene...");
    let _ = io::stdout().flush();
    let scene = Scene::from_file(path)?;
    println!("Success ({} components)", scene.components().len());
    Ok(scene)
}

fn print_outcome(outcome: &TraceOutcome) {
    let s = &outcome.statistics;
    println!(
        "  {} rays seeded, {} traced, {} escaped, {} absorbed, {} dropped",
        s.seeded,
        s.traced,
        s.escaped,
        s.absorbed,
        s.dropped()
    );
    println!(
        "  intensity seeded: {:.6}, escaped: {:.6}",
        s.seeded_intensity, s.escaped_intensity
    );
}

fn export_csv(path: &Path, passes: &[Vec<RayPath>]) -> OptResult<()> {
    print!("Write ray paths to {}...", path.display());
    let _ = io::stdout().flush();
    let file = File::create(path)
        .map_err(|e| OptraceError::Other(format!("csv file creation failed: {e}")))?;
    write_passes_csv(passes.iter().map(Vec::as_slice), file)?;
    println!("Success");
    Ok(())
}

fn main() -> OptResult<()> {
    env_logger::init();
    show_intro();
    //parse CLI arguments
    let args = Args::try_from(PartialArgs::parse())?;

    let scene = read_scene(&args.scene_path)?;
    let tracer = Tracer::new(&scene);

    //trace the scene
    let passes = if args.wavelengths.is_empty() {
        let outcome = tracer.trace();
        println!("Trace pass:");
        print_outcome(&outcome);
        vec![outcome.paths]
    } else {
        let results = tracer.trace_spectrum(&args.wavelengths)?;
        let mut passes = Vec::with_capacity(results.len());
        for (wavelength, outcome) in results {
            println!("Trace pass at {:.2} nm:", wavelength.get::<nanometer>());
            print_outcome(&outcome);
            passes.push(outcome.paths);
        }
        passes
    };
    for (idx, name, count) in scene.fiber_hits() {
        println!("fiber '{name}' (#{idx}): {count} hits");
    }
    if let Some(csv_path) = &args.csv_path {
        export_csv(csv_path, &passes)?;
    }
    if args.imaging {
        let imaging = LensImaging::from_scene(&scene, &ImagingConfig::default())?;
        println!("Lens imaging: {}", imaging.result());
    }
    Ok(())
}
