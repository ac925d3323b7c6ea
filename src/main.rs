use anyhow::Context;
use clap::{Arg, Command};
use log::LevelFilter;
use spam_words_guard::{Catalog, Config, Decision, SpamGuard, Submission, Verdict};
use std::io::Read;
use std::process;
use std::sync::Arc;

fn main() {
    let matches = Command::new("spam-words-guard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Weighted spam word and link filter for contact form submissions")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/spam-words-guard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .value_name("FILE")
                .help("Check a message file against the configuration ('-' reads stdin)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("field")
                .long("field")
                .value_name("NAME=VALUE")
                .help("Additional form field to submit with --check")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("ip")
                .long("ip")
                .value_name("ADDR")
                .help("Client IP address recorded in the debug log")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .value_name("LANG")
                .help("Language of rejection messages")
                .value_parser(["en", "de"])
                .default_value("en"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/spam-words-guard.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        test_config(config);
        return;
    }

    if let Some(message_file) = matches.get_one::<String>("check") {
        let fields: Vec<&String> = matches
            .get_many::<String>("field")
            .map(|values| values.collect())
            .unwrap_or_default();
        let lang = matches
            .get_one::<String>("lang")
            .map(String::as_str)
            .unwrap_or("en");
        let ip = matches.get_one::<String>("ip").map(String::as_str);

        match check_message(config, message_file, &fields, ip, lang) {
            Ok(verdict) => process::exit(print_verdict(&verdict)),
            Err(e) => {
                eprintln!("❌ Error checking message: {e:#}");
                process::exit(1);
            }
        }
    }

    println!("Nothing to do. Use --check FILE, --test-config or --generate-config FILE.");
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn test_config(config: Config) {
    println!("🔍 Testing configuration...");
    println!();
    println!("Enabled: {}", config.enabled);
    println!(
        "Thresholds: minAddresses={}, addressThreshold={}, spamThreshold={}",
        config.min_addresses, config.address_threshold, config.spam_threshold
    );
    println!("Checked fields: {}", config.fields.join(", "));

    let inline_words: usize = config.spam_words.values().map(Vec::len).sum();
    let cache = spam_words_guard::WordListCache::default();
    let words = cache.get(&config);
    println!(
        "Word lists: {} entries ({} inline, built-in lists {})",
        words.len(),
        inline_words,
        if config.use_word_lists { "on" } else { "off" }
    );

    match SpamGuard::new(config) {
        Ok(_) => println!("✅ Configuration is valid"),
        Err(e) => {
            println!("❌ Configuration validation failed:");
            println!("Error: {e}");
            process::exit(1);
        }
    }
}

fn check_message(
    config: Config,
    message_file: &str,
    extra_fields: &[&String],
    ip: Option<&str>,
    lang: &str,
) -> anyhow::Result<Verdict> {
    let text = read_message(message_file)?;
    let first_field = config
        .fields
        .first()
        .cloned()
        .unwrap_or_else(|| "message".to_string());

    let mut submission = Submission::new().field(first_field, text);
    for field in extra_fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("Invalid --field '{field}', expected NAME=VALUE"))?;
        submission = submission.field(name, value);
    }
    if let Some(ip) = ip {
        submission = submission.client_ip(ip);
    }

    let mut guard = SpamGuard::new(config)?;
    if let Some(catalog) = Catalog::builtin(lang) {
        guard = guard.with_translator(Arc::new(catalog));
    }

    println!("🧪 Checking message: {message_file}");
    Ok(guard.check(&submission)?)
}

fn read_message(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read message from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read message file: {path}"))
    }
}

/// Prints the verdict and returns the process exit code.
fn print_verdict(verdict: &Verdict) -> i32 {
    if let Some(count) = verdict.address_count {
        println!("   Addresses: {count}");
    }
    if let Some(score) = &verdict.score {
        println!("   Spam score: {}", score.total);
        for (word, hit) in &score.matches {
            println!(
                "     - {word}: {} x {} = {}",
                hit.count, hit.weight, hit.subtotal
            );
        }
    }

    println!();
    match verdict.decision {
        Decision::Accept => {
            println!("✅ Result: ACCEPT");
            0
        }
        Decision::SoftReject(reason) => {
            println!("⚠️  Result: SOFT REJECT ({reason})");
            println!("   Message: {}", verdict.message.as_deref().unwrap_or_default());
            2
        }
        Decision::Reject(reason) => {
            println!("❌ Result: REJECT ({reason})");
            println!("   Message: {}", verdict.message.as_deref().unwrap_or_default());
            2
        }
    }
}
