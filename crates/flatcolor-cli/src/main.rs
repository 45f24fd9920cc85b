mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flatcolor_pdf::{
    Band, ColorScheme, DocumentConfig, ImageItem, Margins, Rgb, Rotation, ToneMode,
};
use std::path::PathBuf;

use logger::CliLogger;

#[derive(Parser)]
#[command(name = "flatpdf", about = "Two-color image to PDF layout tool", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out images on pages and write a PDF
    Generate {
        /// Input image file(s) - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output PDF file (defaults to a dated name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file name without extension, used when --output is absent
        #[arg(long)]
        name: Option<String>,

        /// Rotate an image clockwise, as INDEX:DEGREES (e.g. 0:90)
        #[arg(long = "rotate", value_parser = parse_rotation)]
        rotations: Vec<(usize, Rotation)>,

        /// Only render the first N pages
        #[arg(long)]
        preview: Option<usize>,

        #[command(flatten)]
        document: DocumentArgs,
    },

    /// Show pagination statistics without rendering
    Plan {
        /// Input image file(s) - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        #[command(flatten)]
        document: DocumentArgs,
    },

    /// List the built-in color presets
    Presets,
}

/// Document settings shared by `generate` and `plan`.
///
/// Every flag is optional and overrides the value from `--config` (or the
/// default configuration) only when given.
#[derive(Args)]
struct DocumentArgs {
    /// JSON configuration file to start from
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the resulting configuration to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Images per page
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Page size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Use landscape orientation
    #[arg(long)]
    landscape: bool,

    /// Ink color as #RRGGBB
    #[arg(long)]
    primary: Option<Rgb>,

    /// Paper color as #RRGGBB
    #[arg(long)]
    secondary: Option<Rgb>,

    /// Named color preset (see `flatpdf presets`)
    #[arg(long, conflicts_with_all = ["primary", "secondary", "black_and_white"])]
    preset: Option<String>,

    /// Plain black on white
    #[arg(long, conflicts_with_all = ["primary", "secondary"])]
    black_and_white: bool,

    /// Margin in mm (uniform on all sides)
    #[arg(long)]
    margin: Option<f32>,

    /// Top margin in mm
    #[arg(long)]
    margin_top: Option<f32>,

    /// Right margin in mm
    #[arg(long)]
    margin_right: Option<f32>,

    /// Bottom margin in mm
    #[arg(long)]
    margin_bottom: Option<f32>,

    /// Left margin in mm
    #[arg(long)]
    margin_left: Option<f32>,

    /// Print each image's file name below it
    #[arg(long)]
    captions: bool,

    /// Don't draw cell borders
    #[arg(long)]
    no_borders: bool,

    /// Header text ({page} and {pages} are replaced)
    #[arg(long)]
    header: Option<String>,

    /// Footer text ({page} and {pages} are replaced)
    #[arg(long)]
    footer: Option<String>,

    /// Tone reduction: auto, dither, or a luminance threshold 0-255
    #[arg(long, value_parser = parse_tone)]
    tone: Option<ToneMode>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Single,
    #[value(name = "2-up")]
    TwoUp,
    #[value(name = "grid-4")]
    Grid4,
    #[value(name = "grid-6")]
    Grid6,
    #[value(name = "grid-9")]
    Grid9,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<LayoutArg> for flatcolor_pdf::LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Single => Self::Single,
            LayoutArg::TwoUp => Self::TwoUp,
            LayoutArg::Grid4 => Self::Grid2x2,
            LayoutArg::Grid6 => Self::Grid3x2,
            LayoutArg::Grid9 => Self::Grid3x3,
        }
    }
}

impl From<PaperArg> for flatcolor_pdf::PageSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

fn parse_tone(s: &str) -> std::result::Result<ToneMode, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(ToneMode::Auto),
        "dither" => Ok(ToneMode::Dither),
        other => other
            .parse::<u8>()
            .map(ToneMode::Threshold)
            .map_err(|_| format!("expected auto, dither or 0-255, got '{}'", s)),
    }
}

fn parse_rotation(s: &str) -> std::result::Result<(usize, Rotation), String> {
    let (index, degrees) = s
        .split_once(':')
        .ok_or_else(|| format!("expected INDEX:DEGREES, got '{}'", s))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid image index '{}': {}", index, e))?;
    let degrees = degrees
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid degrees '{}': {}", degrees, e))?;
    let rotation = Rotation::from_degrees(degrees).map_err(|e| e.to_string())?;
    Ok((index, rotation))
}

impl DocumentArgs {
    /// Build the configuration: file (or defaults), then flag overrides
    async fn resolve(&self) -> Result<DocumentConfig> {
        let mut config = match &self.config {
            Some(path) => DocumentConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DocumentConfig::default(),
        };
        self.apply(&mut config)?;

        if let Some(path) = &self.save_config {
            config
                .save(path)
                .await
                .with_context(|| format!("Failed to save config {}", path.display()))?;
            log::info!("Saved configuration to {}", path.display());
        }

        Ok(config)
    }

    fn apply(&self, config: &mut DocumentConfig) -> Result<()> {
        if let Some(layout) = self.layout {
            config.layout = layout.into();
        }
        if let Some(paper) = self.paper {
            config.page_size = paper.into();
        }
        if self.landscape {
            config.orientation = flatcolor_pdf::Orientation::Landscape;
        }

        if let Some(name) = &self.preset {
            config.colors = match ColorScheme::preset(name) {
                Some(scheme) => scheme,
                None => bail!("Unknown color preset '{}'", name),
            };
        }
        if self.black_and_white {
            config.colors = ColorScheme::black_and_white();
        }
        if let Some(primary) = self.primary {
            config.colors.primary = primary;
        }
        if let Some(secondary) = self.secondary {
            config.colors.secondary = secondary;
        }

        if let Some(margin) = self.margin {
            config.margins = Margins::uniform(margin);
        }
        let margins = &mut config.margins;
        for (value, side) in [
            (self.margin_top, &mut margins.top_mm),
            (self.margin_right, &mut margins.right_mm),
            (self.margin_bottom, &mut margins.bottom_mm),
            (self.margin_left, &mut margins.left_mm),
        ] {
            if let Some(value) = value {
                *side = value;
            }
        }

        if self.captions {
            config.show_captions = true;
        }
        if self.no_borders {
            config.show_borders = false;
        }
        if let Some(text) = &self.header {
            config.header = Band::shown(text.clone());
        }
        if let Some(text) = &self.footer {
            config.footer = Band::shown(text.clone());
        }
        if let Some(tone) = self.tone {
            config.tone = tone;
        }

        Ok(())
    }
}

fn apply_rotations(images: &mut [ImageItem], rotations: &[(usize, Rotation)]) -> Result<()> {
    for &(index, rotation) in rotations {
        let count = images.len();
        let Some(image) = images.get_mut(index) else {
            bail!(
                "--rotate index {} is out of range ({} images given)",
                index,
                count
            );
        };
        image.rotation = rotation;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    CliLogger::new(CliLogger::level_for_verbosity(cli.verbose))
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            name,
            rotations,
            preview,
            document,
        } => {
            let config = document.resolve().await?;
            config.validate()?;

            let mut images = flatcolor_pdf::load_images(&input)
                .await
                .context("Failed to load input images")?;
            apply_rotations(&mut images, &rotations)?;

            let bytes = match preview {
                Some(pages) => flatcolor_pdf::generate_preview(&images, &config, pages).await?,
                None => {
                    flatcolor_pdf::generate_async(
                        images,
                        config.clone(),
                        flatcolor_pdf::CancelToken::new(),
                    )
                    .await?
                }
            };

            let output = output.unwrap_or_else(|| {
                PathBuf::from(flatcolor_pdf::output_filename(
                    name.as_deref(),
                    chrono::Local::now().date_naive(),
                ))
            });
            flatcolor_pdf::save_pdf(&bytes, &output)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!(
                "Generated {} images ({}) → {}",
                input.len(),
                config.layout.name(),
                output.display()
            );
        }

        Commands::Plan { input, document } => {
            let config = document.resolve().await?;
            let stats = flatcolor_pdf::calculate_statistics(input.len(), &config)?;

            println!("Layout Statistics:");
            println!("  Images: {}", stats.images);
            println!("  Layout: {}", config.layout.name());
            println!(
                "  Page: {} ({:.1} x {:.1} mm)",
                config.page_size.name(),
                stats.page_width_mm,
                stats.page_height_mm
            );
            println!("  Pages: {}", stats.pages);
            println!("  Images per page: {}", stats.cells_per_page);
            println!(
                "  Cell size: {:.1} x {:.1} mm",
                stats.cell_width_mm, stats.cell_height_mm
            );
            println!("  Empty cells on last page: {}", stats.empty_cells);
        }

        Commands::Presets => {
            for (name, scheme) in ColorScheme::presets() {
                println!("{:<8} {} on {}", name, scheme.primary, scheme.secondary);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatcolor_pdf::{ImageId, LayoutMode};

    #[test]
    fn test_parse_tone() {
        assert_eq!(parse_tone("auto").unwrap(), ToneMode::Auto);
        assert_eq!(parse_tone("Dither").unwrap(), ToneMode::Dither);
        assert_eq!(parse_tone("140").unwrap(), ToneMode::Threshold(140));
        assert!(parse_tone("300").is_err());
        assert!(parse_tone("sharp").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("0:90").unwrap(), (0, Rotation::Clockwise90));
        assert_eq!(parse_rotation("3:-90").unwrap(), (3, Rotation::Clockwise270));
        assert!(parse_rotation("1:45").is_err());
        assert!(parse_rotation("90").is_err());
        assert!(parse_rotation("x:90").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "flatpdf",
            "plan",
            "-i",
            "a.png",
            "--layout",
            "grid-6",
            "--preset",
            "crimson",
            "--margin",
            "10",
            "--margin-left",
            "20",
            "--no-borders",
            "--footer",
            "{page}",
            "--tone",
            "dither",
        ]);
        let Commands::Plan { document, .. } = cli.command else {
            panic!("expected plan command");
        };

        let mut config = DocumentConfig::default();
        document.apply(&mut config).unwrap();

        assert_eq!(config.layout, LayoutMode::Grid3x2);
        assert_eq!(config.colors, ColorScheme::preset("crimson").unwrap());
        assert_eq!(config.margins.top_mm, 10.0);
        assert_eq!(config.margins.left_mm, 20.0);
        assert!(!config.show_borders);
        assert_eq!(config.footer, Band::shown("{page}"));
        assert_eq!(config.tone, ToneMode::Dither);
    }

    #[test]
    fn test_hex_color_flags() {
        let cli = Cli::parse_from([
            "flatpdf",
            "plan",
            "-i",
            "a.png",
            "--primary",
            "#112233",
        ]);
        let Commands::Plan { document, .. } = cli.command else {
            panic!("expected plan command");
        };

        let mut config = DocumentConfig::default();
        document.apply(&mut config).unwrap();
        assert_eq!(config.colors.primary, Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(config.colors.secondary, ColorScheme::default().secondary);
    }

    #[test]
    fn test_bad_color_rejected() {
        let result = Cli::try_parse_from(["flatpdf", "plan", "-i", "a.png", "--primary", "blue"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rotation_out_of_range() {
        let mut images = vec![ImageItem::new(
            ImageId(0),
            image::DynamicImage::new_rgb8(1, 1),
            "a.png",
        )];
        assert!(apply_rotations(&mut images, &[(0, Rotation::Clockwise180)]).is_ok());
        assert_eq!(images[0].rotation, Rotation::Clockwise180);
        assert!(apply_rotations(&mut images, &[(1, Rotation::Clockwise90)]).is_err());
    }
}
