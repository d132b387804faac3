use agelens_core::crawl::{
    execute_audit, execute_clone, AuditOptions, CloneOptions, ClonedPage,
};
use agelens_core::remedy::{RemediationConfig, DEFAULT_FONT_STACK};
use agelens_core::report::{
    generate_json_report, generate_markdown_report, generate_text_report, save_report,
    ReportFormat,
};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// Helper functions for loading seed URLs

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("[!] Skipping invalid URL '{}'", line);
    None
}

// Re-export batch types and functions from agelens-core
pub use agelens_core::crawl::{extract_url_path, AuditProgressCallback};

fn expand_output_dir(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    PathBuf::from(expanded.as_ref())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

pub async fn handle_audit(args: &ArgMatches, quiet: bool) {
    tracing_subscriber::fmt::init();

    let url = args.get_one::<Url>("url");
    let hosts_file = args.get_one::<PathBuf>("hosts-file");
    let urls = match load_urls_from_source(url, hosts_file) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let pages = *args.get_one::<usize>("pages").unwrap_or(&1);
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&20);
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<String>("output");

    let options = AuditOptions {
        urls,
        page_limit: pages,
        timeout_secs: timeout,
        show_progress: !quiet,
    };

    let results = match execute_audit(options, None).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{} Audit failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if results.is_empty() {
        eprintln!(
            "{} No pages audited. Check the URL and try again.",
            "✗".red().bold()
        );
        std::process::exit(1);
    }

    let report = match format {
        ReportFormat::Text => generate_text_report(&results),
        ReportFormat::Json => match generate_json_report(&results) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("{} Failed to serialize report: {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        ReportFormat::Markdown => generate_markdown_report(&results),
    };

    match output {
        Some(raw_path) => {
            let path = expand_output_dir(raw_path);
            if let Err(e) = save_report(&report, &path) {
                eprintln!(
                    "{} Failed to write report to {}: {}",
                    "✗".red().bold(),
                    path.display(),
                    e
                );
                std::process::exit(1);
            }
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{report}"),
    }
}

fn config_from_args(args: &ArgMatches) -> RemediationConfig {
    RemediationConfig {
        text_scale: *args.get_one::<f32>("scale").unwrap_or(&1.25),
        underline_links: !args.get_flag("no-underline"),
        min_touch_targets: !args.get_flag("no-min-targets"),
        focus_outline: !args.get_flag("no-focus-outline"),
        reduced_motion: !args.get_flag("no-reduced-motion"),
        font_stack: args
            .get_one::<String>("font-stack")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FONT_STACK.to_string()),
    }
    .normalized()
}

pub async fn handle_clone(args: &ArgMatches, quiet: bool) {
    tracing_subscriber::fmt::init();

    let url = args.get_one::<Url>("url").unwrap();
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&20);
    let out_dir = expand_output_dir(args.get_one::<String>("output").unwrap());
    let config = config_from_args(args);

    let pb = if quiet {
        None
    } else {
        Some(spinner(&format!("Cloning {}...", url)))
    };

    let options = CloneOptions {
        url: url.as_str().to_string(),
        page_limit: 1,
        timeout_secs: timeout,
        config,
    };

    let cloned = match execute_clone(options).await {
        Ok(pages) => pages,
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            eprintln!("{} Clone failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let Some(page) = cloned.first() else {
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        eprintln!("{} Page could not be fetched.", "✗".red().bold());
        std::process::exit(1);
    };

    if let Err(e) = write_cloned_page(&out_dir, "index_age_friendly.html", page) {
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!(
        "{} Age-friendly copy written to {}",
        "✓".green().bold(),
        out_dir.display().to_string().bright_white()
    );
    println!("\nWhat changed:");
    if page.changes.is_empty() {
        println!("  (no changes needed)");
    }
    for change in &page.changes {
        println!("  • {}", change);
    }
}

fn write_cloned_page(out_dir: &Path, filename: &str, page: &ClonedPage) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|e| format!("Failed to create {}: {}", out_dir.display(), e))?;

    let page_path = out_dir.join(filename);
    fs::write(&page_path, &page.html)
        .map_err(|e| format!("Failed to write {}: {}", page_path.display(), e))?;

    let changelog = if page.changes.is_empty() {
        "No changes".to_string()
    } else {
        page.changes.join("\n")
    };
    let log_path = out_dir.join("CHANGELOG.txt");
    fs::write(&log_path, changelog)
        .map_err(|e| format!("Failed to write {}: {}", log_path.display(), e))?;

    Ok(())
}

pub async fn handle_batch(args: &ArgMatches, quiet: bool) {
    tracing_subscriber::fmt::init();

    let url = args.get_one::<Url>("url").unwrap();
    let pages = *args.get_one::<usize>("pages").unwrap_or(&5);
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&20);
    let out_dir = expand_output_dir(args.get_one::<String>("output").unwrap());

    let config = RemediationConfig {
        text_scale: *args.get_one::<f32>("scale").unwrap_or(&1.25),
        ..RemediationConfig::default()
    }
    .normalized();

    let pb = if quiet {
        None
    } else {
        Some(spinner(&format!("Batch cloning {}...", url)))
    };

    let options = CloneOptions {
        url: url.as_str().to_string(),
        page_limit: pages,
        timeout_secs: timeout,
        config,
    };

    let cloned = match execute_clone(options).await {
        Ok(pages) => pages,
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            eprintln!("{} Batch clone failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if cloned.is_empty() {
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        eprintln!("{} No pages cloned.", "✗".red().bold());
        std::process::exit(1);
    }

    if let Err(e) = write_batch(&out_dir, &cloned) {
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!(
        "{} Cloned {} page(s) into {}",
        "✓".green().bold(),
        cloned.len(),
        out_dir.display().to_string().bright_white()
    );
}

fn write_batch(out_dir: &Path, cloned: &[ClonedPage]) -> Result<(), String> {
    let changelog_dir = out_dir.join("changelogs");
    fs::create_dir_all(&changelog_dir)
        .map_err(|e| format!("Failed to create {}: {}", changelog_dir.display(), e))?;

    let mut index_entries = String::new();
    for (i, page) in cloned.iter().enumerate() {
        let filename = format!("page_{}.html", i + 1);

        let page_path = out_dir.join(&filename);
        fs::write(&page_path, &page.html)
            .map_err(|e| format!("Failed to write {}: {}", page_path.display(), e))?;

        let changelog = if page.changes.is_empty() {
            "No changes".to_string()
        } else {
            page.changes.join("\n")
        };
        let log_path = changelog_dir.join(format!("{filename}.txt"));
        fs::write(&log_path, changelog)
            .map_err(|e| format!("Failed to write {}: {}", log_path.display(), e))?;

        index_entries.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            filename,
            escape_html(&page.url)
        ));
    }

    let index_html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>AgeLens Batch Clone</title></head>\n\
         <body><h1>AgeLens Age-Friendly Batch Clone</h1><ul>\n{index_entries}</ul></body></html>\n"
    );
    let index_path = out_dir.join("index.html");
    fs::write(&index_path, index_html)
        .map_err(|e| format!("Failed to write {}: {}", index_path.display(), e))?;

    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
