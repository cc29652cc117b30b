//! SlateBlock CLI
//!
//! CLI tool for compiling filter lists into backend-ready rule sets and
//! inspecting what a list contains.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;

use sb_compiler::{
    compile_filter_list, install_rules, parse_line, reconcile_rules, LineOutcome, BATCH_SIZE,
    MAX_RULES,
};
use sb_core::cosmetic::CssRuleStore;
use sb_core::domain::is_valid_domain;
use sb_core::types::NetworkRule;
use sb_core::MemoryBackend;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(about = "SlateBlock filter list compiler and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile filter lists into a backend-ready rule set
    Compile {
        /// Input filter list files
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Output rule set file
        #[arg(short, long, default_value = "rules.json")]
        output: String,

        /// Whitelist file, one domain per line
        #[arg(short, long)]
        whitelist: Option<String>,

        /// Ceiling on emitted network rules
        #[arg(long, default_value_t = MAX_RULES)]
        max_rules: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify every line of a filter list and report counts
    Lint {
        /// Filter list file to lint
        #[arg(short, long)]
        input: String,

        /// Print each unparseable line
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the cosmetic selectors that apply to a domain
    Selectors {
        /// Filter list file to compile
        #[arg(short, long)]
        input: String,

        /// Domain to look up
        #[arg(short, long)]
        domain: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            whitelist,
            max_rules,
            verbose,
        } => cmd_compile(&input, &output, whitelist.as_deref(), max_rules, verbose),
        Commands::Lint { input, verbose } => cmd_lint(&input, verbose),
        Commands::Selectors { input, domain } => cmd_selectors(&input, &domain),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// On-disk artifact: network rules for the matching backend plus the
/// cosmetic store for the page-side injector.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RulesArtifact<'a> {
    network_rules: &'a [NetworkRule],
    cosmetic: &'a CssRuleStore,
}

fn cmd_compile(
    inputs: &[String],
    output: &str,
    whitelist_path: Option<&str>,
    max_rules: usize,
    verbose: bool,
) -> Result<(), String> {
    if inputs.is_empty() {
        return Err("No input files specified".to_string());
    }

    let start = Instant::now();
    let mut text = String::new();

    for path in inputs {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;

        if verbose {
            println!(
                "  {} - {} lines",
                Path::new(path).file_name().unwrap_or_default().to_string_lossy(),
                content.lines().count()
            );
        }

        text.push_str(&content);
        text.push('\n');
    }

    let whitelist = match whitelist_path {
        Some(path) => load_whitelist(path)?,
        None => Vec::new(),
    };

    let compile_start = Instant::now();
    let mut compiled = compile_filter_list(&text, max_rules)
        .map_err(|e| format!("Compilation failed: {}", e))?;
    let compile_time = compile_start.elapsed();

    let stats = reconcile_rules(&mut compiled.network_rules, &whitelist);

    // Dry-run the batched install so a rule set the backend would refuse
    // never reaches the artifact.
    let mut backend = MemoryBackend::new();
    install_rules(&mut backend, &compiled.network_rules, BATCH_SIZE)
        .map_err(|e| format!("Generated rule set failed validation: {}", e))?;

    let artifact = RulesArtifact {
        network_rules: &compiled.network_rules,
        cosmetic: &compiled.css_store,
    };
    let json = serde_json::to_vec_pretty(&artifact)
        .map_err(|e| format!("Failed to serialize rule set: {}", e))?;

    let mut file = fs::File::create(output)
        .map_err(|e| format!("Failed to create '{}': {}", output, e))?;
    file.write_all(&json)
        .map_err(|e| format!("Failed to write '{}': {}", output, e))?;

    let total_time = start.elapsed();

    println!("Compiled {} filter lists to '{}'", inputs.len(), output);
    println!("  Lines:     {}", compiled.stats.lines);
    println!(
        "  Network:   {} -> {} (dedupe removed {})",
        stats.before, stats.after, stats.deduped
    );
    println!("  Cosmetic:  {}", compiled.css_store.len());
    println!("  Dropped:   {} unparseable lines", compiled.stats.unparseable);
    if compiled.stats.truncated {
        println!("  Truncated: rule ceiling of {} reached", max_rules);
    }
    if !whitelist.is_empty() {
        println!("  Whitelist: {} excluded initiator domains", whitelist.len());
    }
    println!("  Size:      {} bytes ({:.1} KB)", json.len(), json.len() as f64 / 1024.0);
    println!(
        "  Time:      {:.1}ms (compile: {:.1}ms)",
        total_time.as_secs_f64() * 1000.0,
        compile_time.as_secs_f64() * 1000.0,
    );

    Ok(())
}

fn load_whitelist(path: &str) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read whitelist '{}': {}", path, e))?;

    let mut domains = Vec::new();
    for line in content.lines() {
        let domain = line.trim().to_ascii_lowercase();
        if domain.is_empty() || domain.starts_with('!') {
            continue;
        }
        if !is_valid_domain(&domain) {
            eprintln!("Warning: skipping invalid whitelist domain '{domain}'");
            continue;
        }
        domains.push(domain);
    }

    Ok(domains)
}

fn cmd_lint(input: &str, verbose: bool) -> Result<(), String> {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;

    let mut network = 0usize;
    let mut cosmetic = 0usize;
    let mut skipped = 0usize;
    let mut unparseable = 0usize;

    for (number, line) in content.lines().enumerate() {
        match parse_line(line, (network + 1) as u32) {
            LineOutcome::Network(_) => network += 1,
            LineOutcome::Cosmetic(_) => cosmetic += 1,
            LineOutcome::Skip => skipped += 1,
            LineOutcome::Unparseable => {
                unparseable += 1;
                if verbose {
                    println!("  line {}: unparseable: {}", number + 1, line);
                }
            }
        }
    }

    println!("Linted '{}'", input);
    println!("  Network:     {}", network);
    println!("  Cosmetic:    {}", cosmetic);
    println!("  Skipped:     {}", skipped);
    println!("  Unparseable: {}", unparseable);

    Ok(())
}

fn cmd_selectors(input: &str, domain: &str) -> Result<(), String> {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;

    let compiled = compile_filter_list(&content, MAX_RULES)
        .map_err(|e| format!("Compilation failed: {}", e))?;

    let selectors = compiled.css_store.applicable_selectors(domain);
    if selectors.is_empty() {
        println!("No selectors apply to '{}'", domain);
        return Ok(());
    }

    println!("{} selectors apply to '{}':", selectors.len(), domain);
    for selector in selectors {
        println!("  {selector}");
    }

    Ok(())
}
