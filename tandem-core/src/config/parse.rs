//! Minimal TOML parser for link configuration
//!
//! Handles only the subset `link.toml` uses, not full TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean, integer array)
//! - [section] headers: `bus`, `signal`, `initiator`, `responder`
//! - Comments (# ...)
//!
//! Escape sequences in strings are kept verbatim; `\"` does not end a
//! string but is not unescaped either.
//!
//! Keys missing from the input keep their defaults.

use heapless::Vec;

use tandem_hal::Mode;
use tandem_protocol::OverflowPolicy;

use super::types::LinkConfig;
use crate::signal::{Policy, MAX_RESIDUES};

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigErrorKind {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    Syntax,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Template longer than a frame
    TemplateTooLong,
    /// Policy name unknown, or residues invalid
    InvalidPolicy,
}

/// Parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line the error was found on (0 for whole-input errors)
    pub line: usize,
    /// Error kind
    pub kind: ConfigErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Bus,
    Signal,
    Initiator,
    Responder,
}

/// Responder policy as written, resolved once the section is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolicyName {
    WhenStaged,
    Always,
    Never,
    Residues,
}

/// Parse TOML text into a [`LinkConfig`]
pub fn parse_config(input: &str) -> Result<LinkConfig, ParseError> {
    let mut config = LinkConfig::default();
    let mut section = Section::Root;

    let mut policy_name: Option<(usize, PolicyName)> = None;
    let mut residues: Option<(usize, Vec<u32, MAX_RESIDUES>)> = None;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let at = |kind| ParseError {
            line: line_no,
            kind,
        };
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(at(ConfigErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(at(ConfigErrorKind::Syntax))?;

        match (section, key) {
            (Section::Bus, "frequency") => config.bus.frequency = parse_int(value).map_err(at)?,
            (Section::Bus, "mode") => {
                config.bus.mode = Mode::from_index(parse_int(value).map_err(at)?)
                    .ok_or(at(ConfigErrorKind::InvalidValue))?
            }
            (Section::Bus, "queue_depth") => {
                config.bus.queue_depth = parse_int(value).map_err(at)?
            }

            (Section::Signal, "active_low") => {
                config.signal.active_low = parse_bool(value).map_err(at)?
            }

            (Section::Initiator, "timeout_ms") => {
                config.initiator.timeout_ms = parse_int(value).map_err(at)?
            }
            (Section::Initiator, "cycle_delay_ms") => {
                config.initiator.cycle_delay_ms = parse_int(value).map_err(at)?
            }
            (Section::Initiator, "template") => {
                config.initiator.template = parse_template(value).map_err(at)?
            }
            (Section::Initiator, "overflow") => {
                config.initiator.overflow = parse_overflow(value).map_err(at)?
            }

            (Section::Responder, "timeout_ms") => {
                let ms: u32 = parse_int(value).map_err(at)?;
                config.responder.timeout_ms = if ms == 0 { None } else { Some(ms) };
            }
            (Section::Responder, "template") => {
                config.responder.template = parse_template(value).map_err(at)?
            }
            (Section::Responder, "overflow") => {
                config.responder.overflow = parse_overflow(value).map_err(at)?
            }
            (Section::Responder, "policy") => {
                policy_name = Some((line_no, parse_policy_name(value).map_err(at)?))
            }
            (Section::Responder, "residues") => {
                residues = Some((line_no, parse_int_array(value).map_err(at)?))
            }

            _ => return Err(at(ConfigErrorKind::UnknownKey)),
        }
    }

    if let Some(policy) = resolve_policy(policy_name, residues)? {
        config.responder.policy = policy;
    }

    Ok(config)
}

fn resolve_policy(
    name: Option<(usize, PolicyName)>,
    residues: Option<(usize, Vec<u32, MAX_RESIDUES>)>,
) -> Result<Option<Policy>, ParseError> {
    let invalid = |line| ParseError {
        line,
        kind: ConfigErrorKind::InvalidPolicy,
    };
    match (name, residues) {
        (None, None) => Ok(None),
        (Some((_, PolicyName::WhenStaged)), _) => Ok(Some(Policy::WhenStaged)),
        (Some((_, PolicyName::Always)), _) => Ok(Some(Policy::Always)),
        (Some((_, PolicyName::Never)), _) => Ok(Some(Policy::Never)),
        (Some((line, PolicyName::Residues)), None) => Err(invalid(line)),
        // A schedule alone implies the residue policy
        (_, Some((line, moduli))) => Policy::residues(&moduli).map(Some).ok_or(invalid(line)),
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "bus" => Some(Section::Bus),
        "signal" => Some(Section::Signal),
        "initiator" => Some(Section::Initiator),
        "responder" => Some(Section::Responder),
        _ => None,
    }
}

/// Drop a trailing comment, leaving `#` inside strings alone
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ConfigErrorKind> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ConfigErrorKind::InvalidValue)
    }
}

/// Integers may use `_` separators (`1_000_000`)
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigErrorKind> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ConfigErrorKind::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigErrorKind::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

fn parse_template(
    value: &str,
) -> Result<heapless::String<{ crate::engine::MAX_TEMPLATE_LEN }>, ConfigErrorKind> {
    let text = parse_string(value)?;
    let mut template = heapless::String::new();
    template
        .push_str(text)
        .map_err(|_| ConfigErrorKind::TemplateTooLong)?;
    Ok(template)
}

fn parse_overflow(value: &str) -> Result<OverflowPolicy, ConfigErrorKind> {
    match parse_string(value)? {
        "truncate" => Ok(OverflowPolicy::Truncate),
        "reject" => Ok(OverflowPolicy::Reject),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

fn parse_policy_name(value: &str) -> Result<PolicyName, ConfigErrorKind> {
    match parse_string(value)? {
        "when_staged" => Ok(PolicyName::WhenStaged),
        "always" => Ok(PolicyName::Always),
        "never" => Ok(PolicyName::Never),
        "residues" => Ok(PolicyName::Residues),
        _ => Err(ConfigErrorKind::InvalidPolicy),
    }
}

/// Parse `[5, 6]`
fn parse_int_array(value: &str) -> Result<Vec<u32, MAX_RESIDUES>, ConfigErrorKind> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ConfigErrorKind::InvalidValue)?;

    let mut out = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() {
            // Trailing comma
            continue;
        }
        out.push(parse_int(item)?)
            .map_err(|_| ConfigErrorKind::InvalidPolicy)?;
    }
    Ok(out)
}
