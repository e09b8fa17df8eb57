//! `content-urls` 命令行工具
//!
//! 列出文件（或标准输入）中的 URL，或者把它们重写为绝对 URL。

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::Level;

use content_urls::core::{
    absolutize_callback, detect_media_type_by_file_name, parse_content_type, print_error_message,
};
use content_urls::env::{generate_env_docs, EnvConfig};
use content_urls::parsers::JsScanMode;
use content_urls::registry::ParserRegistry;
use content_urls::utils::{decode_content, is_absolute};
use content_urls::{ContentUrls, UrlOptions};

/// Find and rewrite URLs embedded in HTML, CSS and JavaScript content
#[derive(Parser, Debug)]
#[command(name = "content-urls", version, about, long_about = None)]
struct Cli {
    /// File to read, or "-" for standard input
    target: String,

    /// Media type of the content (guessed from the file extension when omitted)
    #[arg(short = 't', long = "type")]
    media_type: Option<String>,

    /// Resolve URLs against the base declared in the document
    #[arg(short = 'b', long)]
    use_base_url: bool,

    /// Address the content was retrieved from
    #[arg(short = 'u', long)]
    content_url: Option<String>,

    /// Character encoding of the input (default: charset of --type, then UTF-8)
    #[arg(short = 'e', long)]
    encoding: Option<String>,

    /// Rewrite every URL to its absolute form and print the content
    #[arg(short = 'a', long)]
    absolutize: bool,

    /// JavaScript scan mode: literals or plain
    #[arg(long)]
    js_mode: Option<JsScanMode>,

    /// Write output to a file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let matches = Cli::command().after_help(generate_env_docs()).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(error) => error.exit(),
    };

    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            print_error_message(&error.to_string());
            return ExitCode::from(2);
        }
    };

    let level: Level = env_config.log_level.parse().unwrap_or(Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(!env_config.no_color)
        .with_target(false)
        .init();

    match run(&cli, &env_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            print_error_message(&message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, env_config: &EnvConfig) -> Result<(), String> {
    let media_type = match &cli.media_type {
        Some(media_type) => media_type.clone(),
        None => detect_media_type_by_file_name(&cli.target)
            .map(str::to_string)
            .ok_or_else(|| {
                format!(
                    "Cannot guess the media type of '{}', use --type",
                    cli.target
                )
            })?,
    };

    let data = read_target(&cli.target)?;
    let (_, declared_charset) = parse_content_type(&media_type);
    let content = match cli.encoding.as_deref().or(declared_charset.as_deref()) {
        Some(charset) => decode_content(&data, charset),
        None => String::from_utf8_lossy(&data).into_owned(),
    };

    let js_mode = cli.js_mode.unwrap_or(env_config.js_mode);
    let content_urls = ContentUrls::with_registry(ParserRegistry::with_js_mode(js_mode));

    let mut options = env_config.url_options();
    if cli.use_base_url {
        options = options.with_base_url(true);
    }
    if let Some(content_url) = &cli.content_url {
        if !is_absolute(content_url) {
            tracing::warn!("Ignoring content URL '{}': not an absolute URL", content_url);
        }
        options = options.with_content_url(content_url.as_str());
    }

    let output = if cli.absolutize {
        absolutize(&content_urls, &content, &media_type, &options)?
    } else {
        let urls = content_urls
            .try_urls(&content, &media_type, &options)
            .map_err(|error| error.to_string())?;
        urls.iter().map(|url| format!("{}\n", url)).collect()
    };

    write_output(cli.output.as_ref(), &output)
}

fn absolutize(
    content_urls: &ContentUrls,
    content: &str,
    media_type: &str,
    options: &UrlOptions,
) -> Result<String, String> {
    let parser = content_urls
        .registry()
        .require(media_type)
        .map_err(|error| error.to_string())?;
    let base = content_urls
        .effective_base(parser, content, options)
        .ok_or_else(|| {
            "No absolute base URL, use --content-url or --use-base-url".to_string()
        })?;

    let mut callback = absolutize_callback(base);
    content_urls
        .try_rewrite_each_url(content, media_type, &mut callback)
        .map_err(|error| error.to_string())
}

fn read_target(target: &str) -> Result<Vec<u8>, String> {
    if target == "-" {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .map_err(|error| format!("Unable to read standard input: {}", error))?;
        Ok(data)
    } else {
        fs::read(target).map_err(|error| format!("Unable to read '{}': {}", target, error))
    }
}

fn write_output(path: Option<&PathBuf>, output: &str) -> Result<(), String> {
    match path {
        Some(path) => fs::write(path, output)
            .map_err(|error| format!("Unable to write '{}': {}", path.display(), error)),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(output.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|error| format!("Unable to write output: {}", error))
        }
    }
}
