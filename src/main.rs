use abi2ts::config::DEFAULT_RUNTIME_PATH;
use abi2ts::parser::{self, SourceSelection};
use abi2ts::transpiler::types::UnsupportedTypePolicy;
use abi2ts::{generator, transpiler, GenerateOptions};
use anyhow::{bail, Context, Result};
use clap::{App, Arg};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Settings {
    out_dir: Option<PathBuf>,
    force: bool,
    template: GenerateOptions,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abi2ts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = App::new("abi2ts")
        .version("0.1.0")
        .author("Contract ABI to TypeScript generator")
        .about("Generates typed TypeScript wrappers from contract ABI files")
        .arg(
            Arg::with_name("INPUT")
                .help("Input ABI files")
                .required(true)
                .multiple(true)
                .index(1),
        )
        .arg(
            Arg::with_name("out-dir")
                .short("o")
                .long("out-dir")
                .value_name("DIR")
                .help("Output directory for generated files (defaults to each input's directory)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("runtime-path")
                .long("runtime-path")
                .value_name("MODULE")
                .help("Import path of the runtime shim, relative to the generated files")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("force")
                .long("force")
                .help("Overwrite existing output files"),
        )
        .arg(
            Arg::with_name("single")
                .long("single")
                .conflicts_with("contract")
                .help("Reject combined outputs whose contracts differ"),
        )
        .arg(
            Arg::with_name("contract")
                .long("contract")
                .value_name("NAME")
                .help("Contract to take from a combined output document")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("any-for-unsupported")
                .long("any-for-unsupported")
                .help("Type unsupported ABI types as `any` instead of failing"),
        )
        .get_matches();

    let selection = match matches.value_of("contract") {
        Some(name) => SourceSelection::Named(name.to_string()),
        None if matches.is_present("single") => SourceSelection::Single,
        None => SourceSelection::First,
    };
    let type_policy = if matches.is_present("any-for-unsupported") {
        UnsupportedTypePolicy::Any
    } else {
        UnsupportedTypePolicy::Reject
    };

    let settings = Settings {
        out_dir: matches.value_of("out-dir").map(PathBuf::from),
        force: matches.is_present("force"),
        template: GenerateOptions {
            runtime_path: matches
                .value_of("runtime-path")
                .unwrap_or(DEFAULT_RUNTIME_PATH)
                .to_string(),
            selection,
            type_policy,
            ..Default::default()
        },
    };

    let inputs: Vec<&str> = matches
        .values_of("INPUT")
        .map(|values| values.collect())
        .unwrap_or_default();
    info!("Found {} ABIs", inputs.len());

    // One failing document must not stop the others.
    let mut failures = 0;
    for input in &inputs {
        if let Err(err) = process_file(Path::new(input), &settings) {
            error!("{input}: {err:#}");
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} ABI files failed", failures, inputs.len());
    }
    Ok(())
}

fn process_file(input: &Path, settings: &Settings) -> Result<()> {
    let stem = file_stem_without_extensions(input);
    let output_dir = match &settings.out_dir {
        Some(dir) => dir.clone(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let output_file = output_dir.join(format!("{stem}.ts"));

    if output_file.exists() && !settings.force {
        warn!("{} exists, skipping", output_file.display());
        return Ok(());
    }

    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let entries = parser::extract_with(&source, &settings.template.selection)
        .with_context(|| "Failed to extract ABI")?;
    if entries.is_empty() {
        warn!("{}: ABI is empty, skipping", input.display());
        return Ok(());
    }

    let model = transpiler::convert(entries, settings.template.type_policy)
        .with_context(|| format!("Failed to classify ABI of {stem}"))?;

    let options = GenerateOptions {
        module_name: stem.clone(),
        ..settings.template.clone()
    };
    let typescript = generator::generate(&model, &options)
        .with_context(|| format!("Failed to generate TypeScript for {stem}"))?;

    fs::write(&output_file, typescript)
        .with_context(|| format!("Failed to write output file: {}", output_file.display()))?;

    info!("{} => {}", input.display(), output_file.display());
    Ok(())
}

/// `Token.abi.json` becomes `Token`.
fn file_stem_without_extensions(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.find('.') {
        Some(end) => name[..end].to_string(),
        None => name,
    }
}
