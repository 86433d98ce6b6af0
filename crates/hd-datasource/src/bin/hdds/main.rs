mod cli;

use anyhow::Context;
use hd_datasource::{
    data_source::{to_value, ContainerHandle, DataSource},
    flatten::FlatteningCache,
    scene::Scene,
    scene_path::ScenePath,
    value::Value,
};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HDDS_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Flatten(flatten_cli) => flatten(flatten_cli),
        cli::Command::Dump(dump_cli) => dump(dump_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn flatten(cli: cli::FlattenCommand) -> anyhow::Result<()> {
    let cache = FlatteningCache::with_default_providers(load(&cli.input)?);
    let paths = select(cache.scene(), &cli.prims)?;

    let mut prims = indexmap::IndexMap::new();
    for path in paths {
        let prim = cache
            .prim(&path)
            .with_context(|| format!("No prim at {path}"))?;
        if let Some(value) = to_value(&DataSource::Container(prim), cli.time) {
            prims.insert(path.to_string(), value);
        }
    }

    output(&cli.output, &Value::Dictionary(prims))
}

pub fn dump(cli: cli::DumpCommand) -> anyhow::Result<()> {
    let scene = load(&cli.input)?;
    let paths = select(&scene, &cli.prims)?;
    let cache = cli
        .flattened
        .then(|| FlatteningCache::with_default_providers(scene.clone()));

    for path in paths {
        let prim: Option<ContainerHandle> = match &cache {
            Some(cache) => cache.prim(&path),
            None => scene.prim(&path).cloned(),
        };
        let prim = prim.with_context(|| format!("No prim at {path}"))?;

        println!("{path}");
        for line in hd_datasource::visit::dump(&DataSource::Container(prim), cli.time).lines() {
            println!("  {line}");
        }
    }

    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Scene> {
    let mut scene = Scene::default();

    if input.files.is_empty() && input.directories.is_empty() {
        scene.load_directory(&std::env::current_dir()?)?;
    }

    for file_path in &input.files {
        scene
            .load_file(file_path)
            .with_context(|| format!("Failed to load {}", file_path.display()))?;
    }

    for dir_path in &input.directories {
        scene
            .load_directory(dir_path)
            .with_context(|| format!("Failed to load {}", dir_path.display()))?;
    }

    anyhow::ensure!(!scene.is_empty(), "No prims loaded");

    Ok(scene)
}

/// Requested prims in the order given, or all prims in scene order
fn select(scene: &Scene, prims: &[String]) -> anyhow::Result<Vec<ScenePath>> {
    if prims.is_empty() {
        return Ok(scene.paths().cloned().collect());
    }

    prims
        .iter()
        .map(|prim| ScenePath::new(prim).with_context(|| format!("Invalid prim path {prim:?}")))
        .collect()
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
