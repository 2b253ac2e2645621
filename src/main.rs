use std::{fs::create_dir_all, path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser, ValueEnum};
use log::{debug, error, info};
use sobel_sweep::{
    display::{DisplayError, DisplaySink, FileSink, NoDisplay},
    load_image,
    util::image::{ImageY8, InputImage},
    NormalizationScope,
    Sweep,
    SweepBuilder,
    SweepError,
    TimeProfileStatistics,
    UnsharpMask,
    VerticalSupport,
    DEFAULT_THREAD_COUNTS,
};

/// Missing or invalid arguments
const EXIT_USAGE: i32 = -1;
/// Image failed to load or has no pixels
const EXIT_LOAD: i32 = -2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Vertical {
    /// Each row alone (no vertical gradient)
    Row,
    /// Rows of the same band
    Band,
    /// Rows of the whole image
    Image,
}

impl From<Vertical> for VerticalSupport {
    fn from(value: Vertical) -> Self {
        match value {
            Vertical::Row => Self::Row,
            Vertical::Band => Self::Band,
            Vertical::Image => Self::Image,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image to process
    image: PathBuf,
    /// Gradient scale factor
    #[arg(short, long, default_value_t=sobel_sweep::edges::DEFAULT_SENSITIVITY)]
    sensitivity: f32,
    /// Equalize each band's histogram before sharpening
    #[arg(short, long)]
    equalize: bool,
    /// Normalize every band with the image-wide range (removes seams)
    #[arg(short, long)]
    global_normalization: bool,
    /// Vertical neighbourhood for the Sobel operator
    #[arg(long, value_enum, default_value_t=Vertical::Row)]
    vertical: Vertical,
    /// Skip the unsharp mask
    #[arg(long)]
    no_sharpen: bool,
    /// Thread counts to sweep over
    #[arg(short, long, value_delimiter=',', default_values_t=DEFAULT_THREAD_COUNTS)]
    threads: Vec<usize>,
    /// Repeat the whole sweep this many times
    #[arg(short, long, default_value_t=1)]
    iters: usize,
    /// Directory for the original and output images
    #[arg(short, long, default_value=".")]
    output_dir: PathBuf,
    /// Don't wait for Enter before exiting
    #[arg(long)]
    no_wait: bool,
    /// Don't write the original and output images
    #[arg(long)]
    no_display: bool,
    /// Write per-band intermediate images here (slow)
    #[arg(long)]
    debug_path: Option<PathBuf>,
}

fn build_sweep(args: &Args) -> Result<Sweep, SweepError> {
    let mut builder = SweepBuilder::default()
        .with_thread_counts(args.threads.iter().copied());
    builder.set_sensitivity(args.sensitivity);
    builder.set_equalize(args.equalize);
    builder.set_vertical_support(args.vertical.into());
    if args.global_normalization {
        builder.set_normalization(NormalizationScope::Global);
    }
    if args.no_sharpen {
        builder.set_unsharp(None);
    } else {
        builder.set_unsharp(Some(UnsharpMask::default()));
    }

    if let Some(path) = &args.debug_path {
        if let Err(e) = create_dir_all(path) {
            error!("Unable to create debug directory {}: {e}", path.display());
        } else {
            builder.config.edge.debug_path = Some(path.to_owned());
        }
    }

    builder.build()
}

fn start_banner(input: &InputImage, args: &Args) {
    println!("\x1b[38;5;219m== Sobel sweep ==\x1b[0m");
    println!("Image: {} ({}x{}, {} channel(s))", args.image.display(), input.width(), input.height(), input.channels());
}

fn end_banner() {
    println!("\x1b[38;5;86m== Sweep complete ==\x1b[0m");
}

fn show_results(sink: &mut dyn DisplaySink, input: &InputImage, output: ImageY8) -> Result<(), DisplayError> {
    sink.show("Original Image", &input.to_dynamic())?;
    sink.show("Output Image", &InputImage::Gray(output).to_dynamic())?;
    sink.wait_key()
}

fn fail(message: impl std::fmt::Display, code: i32) -> ExitCode {
    println!("\x1b[35mError: {message}. Exit code {code}\x1b[0m");
    // negative codes wrap to 255, 254, ...
    ExitCode::from(code as u8)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        },
        Err(e) => {
            let _ = e.print();
            return fail("invalid arguments", EXIT_USAGE);
        },
    };

    let sweep = match build_sweep(&args) {
        Ok(sweep) => sweep,
        Err(e) => return fail(e, EXIT_USAGE),
    };

    let input = match load_image(&args.image) {
        Ok(input) => input,
        Err(e) => return fail(e, EXIT_LOAD),
    };
    info!("Loaded {} ({}x{})", args.image.display(), input.width(), input.height());

    start_banner(&input, &args);

    let mut output = Sweep::output_for(&input);
    let mut stats = TimeProfileStatistics::default();
    for iter in 0..args.iters.max(1) {
        if args.iters > 1 {
            println!("Iteration {}/{}", iter + 1, args.iters);
        }
        let report = sweep.run(&input, &mut output, |m| {
            println!("Threads: \x1b[38;5;150m{:3}\x1b[0m. Elapsed: \x1b[38;5;205m{:.6}\x1b[0m s.", m.threads, m.elapsed.as_secs_f64());
        });
        match report {
            Ok(report) => {
                debug!("Sweep profile:\n{}", report.profile);
                stats.add(&report.profile);
            },
            Err(e) => return fail(&e, e.exit_code()),
        }
    }

    if args.iters > 1 {
        println!("{stats}");
    }

    end_banner();

    let mut sink: Box<dyn DisplaySink> = if args.no_display {
        Box::new(NoDisplay)
    } else {
        Box::new(FileSink::new(&args.output_dir, !args.no_wait))
    };
    if let Err(e) = show_results(sink.as_mut(), &input, output) {
        error!("Display failed: {e}");
    }

    ExitCode::SUCCESS
}
