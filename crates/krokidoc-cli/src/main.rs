use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use krokidoc::client::KrokiClient;
use krokidoc::{
    Artifact, BlockFailure, HttpMethod, KrokiConfig, OutputFormat, PageContext, Processor,
    TagFormat,
};

/// Config file picked up from the working directory when `--config` is not
/// given.
const DEFAULT_CONFIG_FILE: &str = "krokidoc.yml";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Kroki(krokidoc::Error),
    Client(krokidoc::client::ClientError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Kroki(err) => write!(f, "{err}"),
            CliError::Client(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<krokidoc::Error> for CliError {
    fn from(value: krokidoc::Error) -> Self {
        Self::Kroki(value)
    }
}

impl From<krokidoc::client::ClientError> for CliError {
    fn from(value: krokidoc::client::ClientError) -> Self {
        Self::Client(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Build,
    #[default]
    Page,
    Encode,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config_path: Option<String>,
    docs_dir: Option<String>,
    out_dir: Option<String>,
    server: Option<String>,
    method: Option<HttpMethod>,
    tag: Option<TagFormat>,
    prefix: Option<String>,
    bg_light: Option<String>,
    bg_dark: Option<String>,
    fail_fast: bool,
    diagram_type: Option<String>,
    format: Option<OutputFormat>,
}

fn usage() -> &'static str {
    "krokidoc-cli\n\
\n\
USAGE:\n\
  krokidoc-cli [page] [--docs <dir>] [--out <dir>] [<path>|-]\n\
  krokidoc-cli build --docs <dir> --out <dir>\n\
  krokidoc-cli encode --type <diagram-type> [--format svg|png|jpg|pdf|base64] [<path>|-]\n\
\n\
OPTIONS (override krokidoc.yml and KROKIDOC_SERVER):\n\
  --config <path>         config file (default: ./krokidoc.yml when present)\n\
  --server <url>          rendering service endpoint\n\
  --method get|post       page embed method\n\
  --tag img|object|svg    embed tag shape\n\
  --prefix <prefix>       fence info-string prefix (default kroki-)\n\
  --bg-light <color>      site-wide diagram background, light scheme\n\
  --bg-dark <color>       site-wide diagram background, dark scheme\n\
  --fail-fast             abort on the first failing diagram block\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - page prints transformed Markdown to stdout; post-mode artifacts are\n\
    written under --out (default: the current directory).\n\
  - build processes every .md file under --docs and mirrors all other\n\
    files into --out verbatim.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "build" => args.command = Command::Build,
            "page" => args.command = Command::Page,
            "encode" => args.command = Command::Encode,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config_path = Some(path.clone());
            }
            "--docs" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.docs_dir = Some(dir.clone());
            }
            "--out" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out_dir = Some(dir.clone());
            }
            "--server" => {
                let Some(url) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.server = Some(url.clone());
            }
            "--method" => {
                let Some(method) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.method = Some(
                    method
                        .parse::<HttpMethod>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--tag" => {
                let Some(tag) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.tag = Some(
                    tag.parse::<TagFormat>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--prefix" => {
                let Some(prefix) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.prefix = Some(prefix.clone());
            }
            "--bg-light" => {
                let Some(color) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.bg_light = Some(color.clone());
            }
            "--bg-dark" => {
                let Some(color) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.bg_dark = Some(color.clone());
            }
            "--fail-fast" => args.fail_fast = true,
            "--type" => {
                let Some(diagram_type) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_type = Some(diagram_type.clone());
            }
            "--format" => {
                let Some(format) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = Some(
                    format
                        .parse::<OutputFormat>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(args: &Args) -> Result<KrokiConfig, CliError> {
    let mut config = match &args.config_path {
        Some(path) => KrokiConfig::load(Path::new(path))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                KrokiConfig::load(default_path)?
            } else {
                let mut config = KrokiConfig::default();
                config.apply_env();
                config
            }
        }
    };

    if let Some(server) = &args.server {
        config.server_url = server.clone();
    }
    if let Some(method) = args.method {
        config.http_method = method;
    }
    if let Some(tag) = args.tag {
        config.tag_format = tag;
    }
    if let Some(prefix) = &args.prefix {
        config.fence_prefix = prefix.clone();
    }
    if let Some(color) = &args.bg_light {
        config.diagram_background_color_light = Some(color.clone());
    }
    if let Some(color) = &args.bg_dark {
        config.diagram_background_color_dark = Some(color.clone());
    }
    if args.fail_fast {
        config.fail_fast = true;
    }

    Ok(config)
}

/// Attaches a service client only when the config can actually fetch;
/// `get`-mode URL embeds need no network setup.
fn build_processor(config: KrokiConfig) -> Result<Processor, CliError> {
    let needs_client =
        config.http_method == HttpMethod::Post || config.tag_format == TagFormat::Svg;
    let mut processor = Processor::new();
    if needs_client {
        let client = KrokiClient::from_config(&config)?;
        processor = processor.with_renderer(Arc::new(client));
    }
    Ok(processor.with_config(config))
}

fn page_rel_path(input: Option<&str>, docs: Option<&str>) -> PathBuf {
    let Some(path) = input.filter(|p| *p != "-") else {
        return PathBuf::from("page.md");
    };
    let path = Path::new(path);
    if let Some(docs) = docs {
        if let Ok(rel) = path.strip_prefix(docs) {
            return rel.to_path_buf();
        }
    }
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("page.md"))
}

fn write_artifacts(out_root: &Path, artifacts: &[Artifact]) -> Result<(), CliError> {
    for artifact in artifacts {
        let target = out_root.join(&artifact.rel_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &artifact.bytes)?;
    }
    Ok(())
}

fn report_failures(failures: &[BlockFailure]) {
    for failure in failures {
        eprintln!(
            "warning: {} block at byte {} left untouched: {}",
            failure.diagram_type, failure.offset, failure.error
        );
    }
}

fn run_page(args: &Args, config: KrokiConfig) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let processor = build_processor(config)?;

    let ctx = PageContext {
        rel_path: page_rel_path(args.input.as_deref(), args.docs_dir.as_deref()),
        docs_root: args.docs_dir.as_ref().map(PathBuf::from),
    };
    let page = processor.process_page(&text, &ctx)?;

    let out_root = args.out_dir.as_deref().unwrap_or(".");
    write_artifacts(Path::new(out_root), &page.artifacts)?;
    report_failures(&page.failures);

    print!("{}", page.markdown);
    Ok(())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CliError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn run_build(args: &Args, config: KrokiConfig) -> Result<(), CliError> {
    let Some(docs) = args.docs_dir.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let Some(out) = args.out_dir.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let docs_root = PathBuf::from(docs);
    let out_root = PathBuf::from(out);

    let processor = build_processor(config)?;

    let mut paths = Vec::new();
    collect_files(&docs_root, &mut paths)?;
    paths.sort();

    let mut pages = 0usize;
    let mut skipped_blocks = 0usize;
    for path in paths {
        let rel = path.strip_prefix(&docs_root).unwrap_or(&path).to_path_buf();
        let target = out_root.join(&rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            let text = std::fs::read_to_string(&path)?;
            let ctx = PageContext {
                rel_path: rel,
                docs_root: Some(docs_root.clone()),
            };
            let page = processor.process_page(&text, &ctx)?;
            write_artifacts(&out_root, &page.artifacts)?;
            report_failures(&page.failures);
            skipped_blocks += page.failures.len();
            std::fs::write(&target, page.markdown)?;
            pages += 1;
        } else {
            std::fs::copy(&path, &target)?;
        }
    }

    if skipped_blocks > 0 {
        eprintln!("{skipped_blocks} diagram blocks left untouched");
    }
    println!("Processed {pages} pages into {}", out_root.display());
    Ok(())
}

fn run_encode(args: &Args, config: KrokiConfig) -> Result<(), CliError> {
    let Some(diagram_type) = args.diagram_type.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let source = read_input(args.input.as_deref())?;

    let processor = Processor::new().with_config(config);
    let url = processor.encode_url(diagram_type, args.format, &source)?;
    println!("{url}");
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    match args.command {
        Command::Build => run_build(&args, config),
        Command::Page => run_page(&args, config),
        Command::Encode => run_encode(&args, config),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
