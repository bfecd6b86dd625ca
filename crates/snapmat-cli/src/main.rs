//! snapmat - Command-Line Entry Point
//!
//! Treats a PNG on disk as the captured viewport and runs it through
//! the whole pipeline: settings, background composition, page-context
//! delegation, and delivery into a download directory.

mod download;
mod embedded;
mod store;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

use snapmat_capture::{
    ensure_defaults, BackgroundKind, CaptureOrchestrator, CompositeSite, CompositionSettings,
    SettingsStore,
};
use snapmat_gradient::Color;

use download::DownloadDir;
use embedded::EmbeddedHost;
use store::JsonFileStore;

const USAGE: &str = "\
snapmat <capture.png> [options]

Composites a captured viewport onto a styled background.

Options:
  --out <dir>          Directory for finished screenshots (default .)
  --settings <file>    JSON settings store, read and updated
  --padding <px>       Margin width around the capture
  --gradient <css>     CSS linear-gradient background
  --solid <hex>        Solid background color, e.g. #ff0080
  --transparent        Keep the background transparent
  --preview <WxH>      Write a bounded preview.png instead of delivering
  --no-page            Never composite in the page context
  --restricted         Report a browser-internal URL for the page
  --url <url>          URL reported for the captured page
  -h, --help           Show this help
";

enum BackgroundChoice {
    Gradient(String),
    Solid(Color),
    Transparent,
}

struct CliOptions {
    capture: PathBuf,
    out_dir: PathBuf,
    settings_file: Option<PathBuf>,
    padding: Option<u32>,
    background: Option<BackgroundChoice>,
    preview: Option<(u32, u32)>,
    allow_page: bool,
    url: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{USAGE}");
        return Ok(());
    }
    let opts = parse_args(args)?;

    let capture = fs::read(&opts.capture)
        .with_context(|| format!("reading capture image {}", opts.capture.display()))?;
    let settings = resolve_settings(&opts)?;

    let sink = Arc::new(DownloadDir::new(&opts.out_dir));
    let host = EmbeddedHost::new(capture, opts.url.clone(), opts.allow_page, sink.clone());
    let orchestrator = CaptureOrchestrator::new(host, sink);

    match opts.preview {
        Some((max_width, max_height)) => {
            let image = smol::block_on(orchestrator.preview(&settings, max_width, max_height))?;
            fs::create_dir_all(&opts.out_dir)
                .with_context(|| format!("creating {}", opts.out_dir.display()))?;
            let path = opts.out_dir.join("preview.png");
            fs::write(&path, &image.bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("wrote {}x{} preview to {}", image.width, image.height, path.display());
        }
        None => {
            let outcome = smol::block_on(orchestrator.run(&settings))?;
            let site = match outcome.site {
                CompositeSite::Page => "page context",
                CompositeSite::Local => "requesting context",
            };
            if outcome.injected {
                tracing::info!("composited in the {} after processor injection", site);
            } else {
                tracing::info!("composited in the {}", site);
            }
        }
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliOptions> {
    let mut capture: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from(".");
    let mut settings_file = None;
    let mut padding = None;
    let mut background = None;
    let mut preview = None;
    let mut allow_page = true;
    let mut url = String::from("https://example.com/");

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => out_dir = PathBuf::from(value(&mut iter, "--out")?),
            "--settings" => settings_file = Some(PathBuf::from(value(&mut iter, "--settings")?)),
            "--padding" => {
                let raw = value(&mut iter, "--padding")?;
                padding = Some(raw.parse().with_context(|| format!("bad padding {raw:?}"))?);
            }
            "--gradient" => {
                background = Some(BackgroundChoice::Gradient(value(&mut iter, "--gradient")?));
            }
            "--solid" => {
                let raw = value(&mut iter, "--solid")?;
                let color =
                    Color::from_hex(&raw).with_context(|| format!("bad color {raw:?}"))?;
                background = Some(BackgroundChoice::Solid(color));
            }
            "--transparent" => background = Some(BackgroundChoice::Transparent),
            "--preview" => preview = Some(parse_size(&value(&mut iter, "--preview")?)?),
            "--no-page" => allow_page = false,
            "--restricted" => url = "chrome://newtab".into(),
            "--url" => url = value(&mut iter, "--url")?,
            flag if flag.starts_with('-') => bail!("unknown option {flag:?}\n\n{USAGE}"),
            path => {
                if capture.is_some() {
                    bail!("more than one capture image given");
                }
                capture = Some(PathBuf::from(path));
            }
        }
    }

    let Some(capture) = capture else {
        bail!("missing capture image\n\n{USAGE}");
    };
    Ok(CliOptions {
        capture,
        out_dir,
        settings_file,
        padding,
        background,
        preview,
        allow_page,
        url,
    })
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    iter.next().with_context(|| format!("{flag} needs a value"))
}

fn parse_size(raw: &str) -> anyhow::Result<(u32, u32)> {
    let Some((w, h)) = raw.split_once('x') else {
        bail!("preview size must look like 800x600, got {raw:?}");
    };
    let width = w.parse().with_context(|| format!("bad preview width {w:?}"))?;
    let height = h.parse().with_context(|| format!("bad preview height {h:?}"))?;
    Ok((width, height))
}

/// Settings come from the store when one is named, with command-line
/// overrides written back so the next run sees them, the way the
/// options page persists its form.
fn resolve_settings(opts: &CliOptions) -> anyhow::Result<CompositionSettings> {
    let mut settings = match &opts.settings_file {
        Some(path) => ensure_defaults(&JsonFileStore::new(path)),
        None => CompositionSettings::default(),
    };

    if apply_overrides(&mut settings, opts) {
        if let Some(path) = &opts.settings_file {
            JsonFileStore::new(path).save(&settings)?;
        }
    }
    Ok(settings)
}

fn apply_overrides(settings: &mut CompositionSettings, opts: &CliOptions) -> bool {
    let mut changed = false;
    if let Some(padding) = opts.padding {
        if settings.padding != padding {
            settings.padding = padding;
            changed = true;
        }
    }
    match &opts.background {
        Some(BackgroundChoice::Gradient(css)) => {
            settings.background = BackgroundKind::Gradient;
            settings.gradient_css = css.clone();
            changed = true;
        }
        Some(BackgroundChoice::Solid(color)) => {
            settings.background = BackgroundKind::Solid;
            settings.solid_color = Some(*color);
            changed = true;
        }
        Some(BackgroundChoice::Transparent) => {
            settings.background = BackgroundKind::Transparent;
            changed = true;
        }
        None => {}
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("800x600").unwrap(), (800, 600));
        assert!(parse_size("800").is_err());
        assert!(parse_size("800xsix").is_err());
    }

    #[test]
    fn test_parse_args_minimal() {
        let opts = parse_args(vec!["shot.png".into()]).unwrap();
        assert_eq!(opts.capture, PathBuf::from("shot.png"));
        assert_eq!(opts.out_dir, PathBuf::from("."));
        assert!(opts.allow_page);
        assert!(opts.preview.is_none());
    }

    #[test]
    fn test_parse_args_full() {
        let opts = parse_args(
            ["shot.png", "--out", "shots", "--padding", "30", "--solid", "#ff0080", "--no-page"]
                .map(String::from)
                .to_vec(),
        )
        .unwrap();
        assert_eq!(opts.out_dir, PathBuf::from("shots"));
        assert_eq!(opts.padding, Some(30));
        assert!(matches!(opts.background, Some(BackgroundChoice::Solid(_))));
        assert!(!opts.allow_page);
    }

    #[test]
    fn test_parse_args_rejects_unknown_flags() {
        assert!(parse_args(vec!["shot.png".into(), "--jpeg".into()]).is_err());
        assert!(parse_args(vec![]).is_err());
    }

    #[test]
    fn test_overrides_replace_background_and_padding() {
        let mut settings = CompositionSettings::default();
        let opts = parse_args(
            ["shot.png", "--transparent", "--padding", "0"].map(String::from).to_vec(),
        )
        .unwrap();

        assert!(apply_overrides(&mut settings, &opts));
        assert_eq!(settings.background, BackgroundKind::Transparent);
        assert_eq!(settings.padding, 0);
    }
}
