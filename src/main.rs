use anyhow::Result;
use clap::{Parser, ValueEnum};
use image_describer::app::{report_input_failure, report_setup_failure, App};
use image_describer::input::{ImageSource, InputForm};
use image_describer::models::{Config, ResponseMode, Variant};
use image_describer::render::TerminalSurface;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Stream,
    Single,
}

#[derive(Debug, Parser)]
#[command(name = "image-describer")]
#[command(about = "Describe an image with a hosted multimodal model")]
struct CliArgs {
    /// JPEG or PNG image to upload, or a raw RGBA dump with --canvas.
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Treat IMAGE as a drawn canvas of raw RGBA pixels with this size (WIDTHxHEIGHT).
    #[arg(long, value_name = "WxH", value_parser = parse_canvas_size)]
    canvas: Option<(u32, u32)>,

    /// Extra context or question appended to the instruction.
    #[arg(long)]
    context: Option<String>,

    /// API key; falls back to OPENAI_API_KEY.
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Response delivery; defaults to streaming for uploads and single-shot for canvases.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

fn parse_canvas_size(input: &str) -> std::result::Result<(u32, u32), String> {
    let invalid = || format!("Invalid canvas size '{}'. Expected format: WIDTHxHEIGHT", input);
    let (width, height) = input.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

fn load_image(args: &CliArgs) -> image_describer::Result<Option<ImageSource>> {
    args.image
        .as_deref()
        .map(|path| match args.canvas {
            Some((width, height)) => ImageSource::canvas_from_raw(path, width, height),
            None => ImageSource::from_path(path),
        })
        .transpose()
}

fn build_form(args: &CliArgs, config: &Config, image: Option<ImageSource>) -> InputForm {
    let mut form = InputForm::new();

    if let Some(source) = image {
        form = form.with_image(source);
    }

    if let Some(context) = &args.context {
        form = form.with_context(context.clone());
    }

    if let Some(key) = args.api_key.clone().or_else(|| config.openai_api_key.clone()) {
        form = form.with_credential(key);
    }

    form
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_describer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let mut surface = TerminalSurface::stdio();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            report_setup_failure(&mut surface, &e);
            std::process::exit(1);
        }
    };

    let variant = if args.canvas.is_some() {
        Variant::Canvas
    } else {
        Variant::Upload
    };
    let mode = match args.mode {
        Some(ModeArg::Stream) => ResponseMode::Streaming,
        Some(ModeArg::Single) => ResponseMode::SingleShot,
        None => variant.default_mode(),
    };

    let (image, read_error) = match load_image(&args) {
        Ok(image) => (image, None),
        Err(e) => (None, Some(e)),
    };
    let form = build_form(&args, &config, image);
    if let Some(e) = read_error {
        report_input_failure(&form, &e, &mut surface);
        std::process::exit(1);
    }

    let app = match App::from_config(&config, variant) {
        Ok(app) => app,
        Err(e) => {
            report_setup_failure(&mut surface, &e);
            std::process::exit(1);
        }
    };

    let outcome = app.analyze(&form, &mut surface, mode).await;

    if outcome.is_success() {
        info!("Analysis completed successfully");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
