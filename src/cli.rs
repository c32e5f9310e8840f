//! CLI: load models → classify roots → (schema | describe | client-names)
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use typemodel::client_name::{ClientNames, simple_name_with_params};
use typemodel::decl::{DeclKind, Declaration, Model, TypeSource};
use typemodel::error::ConfigError;
use typemodel::resolve::{AdapterCache, DeclarationSchema, Registry, Resolver};
use typemodel::{emit, load};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// resolve declared types from model files into JSON-schema types or client type names
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// classify roots and print a JSON-schema-ish definitions document
    Schema(SchemaOut),
    /// classify roots and print their resolved types
    Describe(DescribeOut),
    /// print client (PHP) type names for each root and its members
    ClientNames(ClientNamesOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more model files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// settings file merged over the models' own settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// declared names to classify (every declaration if omitted)
    #[arg(long = "root")]
    roots: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct ClientNamesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// package prefix conversion, e.g. com.acme=Acme
    #[arg(long = "package-conversion", value_parser = parse_conversion)]
    package_conversions: Vec<(String, String)>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_model(&self) -> anyhow::Result<Model> {
        let paths = load::resolve_file_path_patterns(&self.input)?;
        let mut model = load::load_models(&paths).context("failed to load models")?;
        if let Some(path) = &self.settings {
            let settings = load::load_settings(path)?;
            model.settings.merge(settings);
        }
        Ok(model)
    }

    /// Requested roots; names without a declaration stand alone as bare classes.
    fn roots(&self, model: &Model) -> Vec<Declaration> {
        if self.roots.is_empty() {
            return model.declarations.values().cloned().collect();
        }
        self.roots
            .iter()
            .map(|name| match model.declaration(name) {
                Some(decl) => decl.clone(),
                None => {
                    tracing::warn!(name, "root has no declaration");
                    Declaration::new(name.clone(), DeclKind::Class)
                }
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let default = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
            .init();
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                let schemas = classify_roots(&target.input_settings)?;
                let doc = emit::definitions(&schemas);
                let src = serde_json::to_string_pretty(&doc)?;
                write_output(target.out.as_ref(), &src)
            }
            Command::Describe(target) => {
                let schemas = classify_roots(&target.input_settings)?;
                for schema in &schemas {
                    println!("{} {} {}", schema.name.bold(), "→".dimmed(), schema.ty.to_string().cyan());
                    for (member, ty) in &schema.members {
                        println!("    {member}: {}", ty.to_string().green());
                    }
                }
                Ok(())
            }
            Command::ClientNames(target) => {
                let model = target.input_settings.load_model()?;
                let names = ClientNames::new(&model, &model.settings)
                    .with_package_conversions(target.package_conversions.iter().cloned());
                let mut out = String::new();
                for decl in target.input_settings.roots(&model) {
                    out.push_str(&format!(
                        "{} ({})\n",
                        names.declaration_name(&decl),
                        simple_name_with_params(&decl, true)
                    ));
                    for member in &decl.members {
                        let name = names
                            .member_type_name(&decl, member)
                            .with_context(|| format!("{}.{}", decl.name, member.name))?;
                        out.push_str(&format!("    {}: {name}\n", member.name));
                    }
                }
                write_output(target.out.as_ref(), out.trim_end())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Classify every requested root in parallel. A failing root is reported and
/// skipped; the command fails only when no root classifies.
fn classify_roots(input: &InputSettings) -> anyhow::Result<Vec<DeclarationSchema>> {
    let model = input.load_model()?;
    let registry = Registry::for_model(&model);
    let cache = AdapterCache::new();
    let resolver = Resolver::new(&model, &registry, &cache, &model.settings);

    let roots = input.roots(&model);
    let refs: Vec<&Declaration> = roots.iter().collect();
    let results = resolver.classify_all(&refs);
    tracing::debug!(roots = refs.len(), adapter_tables = cache.len(), "classified roots");

    let mut failures: Vec<(String, ConfigError)> = Vec::new();
    let mut schemas = Vec::with_capacity(results.len());
    for (decl, result) in refs.iter().zip(results) {
        match result {
            Ok(schema) => schemas.push(schema),
            Err(error) => failures.push((decl.name.clone(), error)),
        }
    }
    for (name, error) in &failures {
        eprintln!("{} {name}: {error}", "error:".red().bold());
    }
    if !failures.is_empty() {
        if schemas.is_empty() {
            bail!("every root failed to classify");
        }
        tracing::warn!(failed = failures.len(), "some roots were skipped");
    }
    Ok(schemas)
}

fn write_output(out: Option<&PathBuf>, src: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn parse_conversion(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((from, to)) if !from.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => Err(format!("expected FROM=TO, got {raw:?}")),
    }
}
