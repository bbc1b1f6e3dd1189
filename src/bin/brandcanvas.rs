use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use brandcanvas::{
    Attr, BakeOpts, BakeOutcome, BakePipeline, BakeRequest, EditorOpts, EditorSession, FontBook,
    FontBookOpts, SvgTemplateRenderer, TemplateCatalog, validate_brand,
};

#[derive(Parser, Debug)]
#[command(name = "brandcanvas", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the templates in a catalog.
    Templates(TemplatesArgs),
    /// Validate a brand configuration JSON file.
    ValidateBrand(ValidateBrandArgs),
    /// Bake a template, optionally add a text layer, and export a PNG.
    Bake(BakeArgs),
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Template catalog JSON.
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateBrandArgs {
    /// Brand configuration JSON.
    #[arg(long)]
    brand: PathBuf,
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// Template catalog JSON.
    #[arg(long)]
    catalog: PathBuf,

    /// Directory holding `<template-id>.svg` documents.
    #[arg(long)]
    templates_dir: PathBuf,

    /// Brand configuration JSON. The built-in brand is used when omitted.
    #[arg(long)]
    brand: Option<PathBuf>,

    /// Template id to bake.
    #[arg(long)]
    template: String,

    /// Template variable as `name=value`; repeatable.
    #[arg(long = "var", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Add a text layer with this content on top of the background.
    #[arg(long)]
    text: Option<String>,

    /// Extra directory of font files; repeatable.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Skip loading system fonts.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,

    /// Export pixel ratio.
    #[arg(long, default_value_t = 2.0)]
    pixel_ratio: f64,

    /// Output directory for the exported PNG.
    #[arg(long)]
    out_dir: PathBuf,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty variable name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Templates(args) => cmd_templates(args),
        Command::ValidateBrand(args) => cmd_validate_brand(args),
        Command::Bake(args) => cmd_bake(args),
    }
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let catalog = TemplateCatalog::from_path(&args.catalog)?;
    for t in catalog.list() {
        let canvas = t.canvas();
        println!(
            "{}\t{:?}\t{} ({}x{})\t{}",
            t.id,
            t.category,
            t.aspect_ratio.as_str(),
            canvas.width,
            canvas.height,
            t.name
        );
    }
    Ok(())
}

fn read_json(path: &std::path::Path) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read json from '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse json '{}'", path.display()))
}

fn cmd_validate_brand(args: ValidateBrandArgs) -> anyhow::Result<()> {
    let value = read_json(&args.brand)?;
    match validate_brand(&value) {
        Ok(brand) => {
            println!("valid: {}", brand.name);
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("{}: {}", e.path, e.message);
            }
            anyhow::bail!("brand has {} invalid field(s)", errors.len())
        }
    }
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let catalog = TemplateCatalog::from_path(&args.catalog)?;

    let mut font_opts = FontBookOpts::default().with_system_fonts(!args.no_system_fonts);
    for dir in &args.font_dirs {
        font_opts = font_opts.with_dir(dir);
    }
    let fonts = Arc::new(FontBook::load(&font_opts));

    let mut session = EditorSession::new(EditorOpts::default(), Arc::clone(&fonts));
    if let Some(path) = &args.brand {
        let brand = validate_brand(&read_json(path)?).map_err(brandcanvas::EditorError::BrandInvalid)?;
        session.set_brand(brand);
    }

    let renderer = SvgTemplateRenderer::new(&args.templates_dir, fonts);
    let pipeline = BakePipeline::new(renderer, catalog, BakeOpts::default());
    let mut request = BakeRequest::new(&args.template);
    for (name, value) in args.vars {
        request = request.with_variable(name, value);
    }

    let session = RefCell::new(session);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let outcome = runtime.block_on(pipeline.bake(&session, request))?;
    let BakeOutcome::Installed { canvas, .. } = outcome else {
        anyhow::bail!("bake was superseded");
    };
    eprintln!("baked {} at {}x{}", args.template, canvas.width, canvas.height);

    let mut session = session.into_inner();
    if let Some(text) = args.text {
        let id = session.add_text();
        session
            .scene_mut()
            .update_object_attribute(id, Attr::Content(text));
    }

    let exported = brandcanvas::export_png(&session, args.pixel_ratio)?;
    let path = exported.write_to(&args.out_dir)?;
    println!("{}", path.display());
    Ok(())
}
