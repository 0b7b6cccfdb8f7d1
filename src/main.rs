use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    // configuration file to read
    configuration_filename: std::path::PathBuf,

    // project upwind from the start location to find the release point
    #[arg(long, default_value_t = false)]
    reverse: bool,

    // write GeoJSON here instead of the configured output file
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    // log debug messages
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arguments = Cli::parse();

    dropzone::logging::init(if arguments.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    })?;

    let configuration =
        dropzone::configuration::RunConfiguration::from_file(&arguments.configuration_filename)?;

    let mode = if arguments.reverse {
        Some(dropzone::prediction::Direction::Reverse)
    } else {
        None
    };
    let runs = dropzone::run::run(&configuration, mode)?;

    for run in &runs {
        if let (Ok(result), Some(location)) = (&run.result, run.solution()) {
            println!(
                "{:}: {:} {:} ({:} descent, {:} drift)",
                run.name,
                match run.mode {
                    dropzone::prediction::Direction::Forward => "landing",
                    dropzone::prediction::Direction::Reverse => "release",
                },
                dropzone::utilities::coord_string(&location.coord),
                dropzone::utilities::duration_string(result.total_duration()),
                dropzone::utilities::distance_string(result.path.drift()),
            );
        }
    }

    let output = arguments.output.or(configuration
        .output
        .as_ref()
        .map(|output| output.filename.to_owned()));
    if let Some(path) = output {
        dropzone::run::write_geojson(&runs, &path)?;
    }

    if runs.iter().all(|run| run.result.is_err()) {
        return Err("no prediction succeeded".into());
    }

    Ok(())
}
