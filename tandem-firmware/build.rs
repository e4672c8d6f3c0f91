//! Build script for tandem-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Frame capacity in bytes; templates must fit
const FRAME_CAPACITY: usize = 128;

/// Maximum number of residue moduli
const MAX_RESIDUES: usize = 4;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: link.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds link.toml. Create one in the               ║\n\
            ║  tandem-firmware directory.                                      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Failed to read link.toml                                 ║\n\
            ║                                                                  ║\n\
            ║  Error: {:<56} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            e
        ),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid TOML syntax in link.toml                         ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&e.to_string())
        ),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_initiator(&config, &mut errors);
    validate_responder(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in link.toml                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=link.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only the four known sections, each a table of known keys
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let known: &[(&str, &[&str])] = &[
        ("bus", &["frequency", "mode", "queue_depth"]),
        ("signal", &["active_low"]),
        (
            "initiator",
            &["timeout_ms", "cycle_delay_ms", "template", "overflow"],
        ),
        (
            "responder",
            &["timeout_ms", "template", "overflow", "policy", "residues"],
        ),
    ];

    let Some(root) = config.as_table() else {
        return;
    };
    for (name, section) in root {
        let Some((_, keys)) = known.iter().find(|(n, _)| *n == name.as_str()) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

fn check_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
        return;
    };
    match value.as_integer() {
        Some(v) if range.contains(&v) => {}
        _ => errors.push(format!(
            "[{}] {} must be an integer in {}..={}",
            section,
            key,
            range.start(),
            range.end()
        )),
    }
}

fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "bus", "frequency", 1..=u32::MAX as i64, errors);
    check_range(config, "bus", "mode", 0..=3, errors);
    check_range(config, "bus", "queue_depth", 1..=u8::MAX as i64, errors);

    if let Some(v) = config.get("signal").and_then(|s| s.get("active_low")) {
        if !v.is_bool() {
            errors.push("[signal] active_low must be true or false".to_string());
        }
    }
}

fn validate_template(config: &toml::Value, section: &str, errors: &mut Vec<String>) {
    let Some(section_table) = config.get(section) else {
        return;
    };
    if let Some(template) = section_table.get("template") {
        match template.as_str() {
            Some(t) if t.len() <= FRAME_CAPACITY => {}
            Some(_) => errors.push(format!(
                "[{}] template longer than {} bytes",
                section, FRAME_CAPACITY
            )),
            None => errors.push(format!("[{}] template must be a string", section)),
        }
    }
    if let Some(overflow) = section_table.get("overflow") {
        if !matches!(overflow.as_str(), Some("truncate" | "reject")) {
            errors.push(format!(
                "[{}] overflow must be 'truncate' or 'reject'",
                section
            ));
        }
    }
}

fn validate_initiator(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "initiator", "timeout_ms", 1..=u32::MAX as i64, errors);
    check_range(config, "initiator", "cycle_delay_ms", 0..=u32::MAX as i64, errors);
    validate_template(config, "initiator", errors);
}

fn validate_responder(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "responder", "timeout_ms", 0..=u32::MAX as i64, errors);
    validate_template(config, "responder", errors);

    let Some(responder) = config.get("responder") else {
        return;
    };

    let policy = responder.get("policy").map(|p| p.as_str());
    if let Some(policy) = policy {
        if !matches!(
            policy,
            Some("when_staged" | "always" | "never" | "residues")
        ) {
            errors.push(
                "[responder] policy must be when_staged, always, never or residues".to_string(),
            );
        }
    }

    match responder.get("residues") {
        Some(toml::Value::Array(moduli)) => {
            if moduli.is_empty() || moduli.len() > MAX_RESIDUES {
                errors.push(format!(
                    "[responder] residues needs 1 to {} entries",
                    MAX_RESIDUES
                ));
            }
            if moduli
                .iter()
                .any(|m| !matches!(m.as_integer(), Some(v) if v > 0 && v <= u32::MAX as i64))
            {
                errors.push("[responder] residues must be positive integers".to_string());
            }
        }
        Some(_) => errors.push("[responder] residues must be an array".to_string()),
        None if policy == Some(Some("residues")) => {
            errors.push("[responder] policy 'residues' needs a residues list".to_string())
        }
        None => {}
    }
}
