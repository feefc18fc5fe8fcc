//! # Installed Options
//!
//! Resolves the job [`Configuration`] from the queue's printer description
//! file and the job's option string.
//!
//! Only the handful of entries the filter needs are read:
//!
//! | Entry | Values |
//! |-------|--------|
//! | `*TmxMotionUnitHori` | `"1"`..`"255"` |
//! | `*TmxMotionUnitVert` | `"1"`..`"255"` |
//! | `*DefaultTmxPaperReduction` | `Off`, `Top`, `Bottom`, `Both` |
//! | `*DefaultTmxBuzzerAndDrawer` | `NotUsed`, `InternalBuzzer`, `ExternalBuzzer`, `OpenDrawer1`, `OpenDrawer2` |
//! | `*DefaultTmxPaperCut` | `NoCut`, `CutPerJob`, `CutPerPage` |
//! | `*UIConstraints` | `*KeyA ChoiceA *KeyB ChoiceB` |
//!
//! Job options (`key=value`, whitespace separated) replace the defaults
//! before constraints are checked.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;

use super::config::{BuzzerMode, Configuration, CutPolicy, DrawerMode, PaperReduction};
use crate::error::FilterError;

const KEY_MOTION_HORI: &str = "TmxMotionUnitHori";
const KEY_MOTION_VERT: &str = "TmxMotionUnitVert";
const KEY_PAPER_REDUCTION: &str = "TmxPaperReduction";
const KEY_BUZZER_DRAWER: &str = "TmxBuzzerAndDrawer";
const KEY_PAPER_CUT: &str = "TmxPaperCut";

/// One side of a `*UIConstraints` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConstraintTerm {
    key: String,
    /// `None` matches any choice other than `None`, `False` or `Off`.
    choice: Option<String>,
}

impl ConstraintTerm {
    fn matches(&self, marked: &HashMap<String, String>) -> bool {
        let Some(value) = marked.get(&self.key) else {
            return false;
        };
        match &self.choice {
            Some(choice) => value == choice,
            None => !matches!(value.as_str(), "None" | "False" | "Off"),
        }
    }
}

/// The parts of a printer description file the filter reads.
#[derive(Debug, Clone, Default)]
pub struct PrinterDescription {
    attributes: HashMap<String, String>,
    defaults: HashMap<String, String>,
    constraints: Vec<(ConstraintTerm, ConstraintTerm)>,
}

impl PrinterDescription {
    /// Read and parse the description file at `path`.
    ///
    /// # Errors
    ///
    /// [`FilterError::ConfigOpen`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        let bytes = fs::read(path).map_err(|source| FilterError::ConfigOpen {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    pub fn parse(text: &str) -> Self {
        let mut desc = Self::default();

        for line in text.lines() {
            let line = line.trim_end();
            if !line.starts_with('*') || line.starts_with("*%") {
                continue;
            }
            let Some((left, value)) = line[1..].split_once(':') else {
                continue;
            };
            let value = value.trim();
            let mut words = left.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };
            // Entries with an option keyword (`*Key Option: ...`) describe
            // choices, not attributes.
            if words.next().is_some() {
                continue;
            }

            if keyword == "UIConstraints" || keyword == "NonUIConstraints" {
                if let Some(pair) = parse_constraint(value) {
                    desc.constraints.push(pair);
                }
            } else if let Some(key) = keyword.strip_prefix("Default") {
                desc.defaults.insert(key.to_string(), unquote(value).to_string());
            } else {
                desc.attributes
                    .insert(keyword.to_string(), unquote(value).to_string());
            }
        }

        desc
    }

    /// Mark defaults, apply `options`, and build the configuration.
    ///
    /// # Errors
    ///
    /// [`FilterError::ConfigConflict`] when the marked choices hit a
    /// constraint, [`FilterError::ConfigNotFound`] or
    /// [`FilterError::ConfigOutOfRange`] for a missing or invalid entry.
    pub fn resolve(
        &self,
        printer_name: &str,
        options: &str,
    ) -> Result<Configuration, FilterError> {
        let options = parse_options(options);
        let mut marked = self.defaults.clone();
        for (key, value) in &options {
            if marked.contains_key(key) {
                marked.insert(key.clone(), value.clone());
            }
        }

        // Conflicts are only checked when the job marked options of its own
        if !options.is_empty() {
            for (a, b) in &self.constraints {
                if a.matches(&marked) && b.matches(&marked) {
                    return Err(FilterError::ConfigConflict(format!(
                        "{}={} with {}={}",
                        a.key, marked[&a.key], b.key, marked[&b.key]
                    )));
                }
            }
        }

        let mut config = Configuration::new(printer_name);
        config.horizontal_motion_unit = self.motion_unit(KEY_MOTION_HORI, 4101, 4102)?;
        config.vertical_motion_unit = self.motion_unit(KEY_MOTION_VERT, 4103, 4104)?;

        config.paper_reduction = match choice(&marked, KEY_PAPER_REDUCTION, 4201)? {
            "Off" => PaperReduction::Off,
            "Top" => PaperReduction::Top,
            "Bottom" => PaperReduction::Bottom,
            "Both" => PaperReduction::Both,
            other => return Err(out_of_range(KEY_PAPER_REDUCTION, other, 4202)),
        };

        config.cut = match choice(&marked, KEY_PAPER_CUT, 4401)? {
            "NoCut" => CutPolicy::None,
            "CutPerJob" => CutPolicy::PerJob,
            "CutPerPage" => CutPolicy::PerPage,
            other => return Err(out_of_range(KEY_PAPER_CUT, other, 4402)),
        };

        match choice(&marked, KEY_BUZZER_DRAWER, 4301)? {
            "NotUsed" => {
                config.buzzer = BuzzerMode::None;
                config.drawer = DrawerMode::None;
            }
            "InternalBuzzer" => config.buzzer = BuzzerMode::Internal,
            "ExternalBuzzer" => config.buzzer = BuzzerMode::External,
            "OpenDrawer1" => config.drawer = DrawerMode::Drawer1,
            "OpenDrawer2" => config.drawer = DrawerMode::Drawer2,
            other => return Err(out_of_range(KEY_BUZZER_DRAWER, other, 4302)),
        }

        debug!("resolved configuration: {:?}", config);
        Ok(config)
    }

    fn motion_unit(
        &self,
        key: &'static str,
        missing: u16,
        invalid: u16,
    ) -> Result<u8, FilterError> {
        let value = self
            .attributes
            .get(key)
            .ok_or(FilterError::ConfigNotFound { key, code: missing })?;
        match value.trim().parse::<u32>() {
            Ok(n @ 1..=255) => Ok(n as u8),
            _ => Err(out_of_range(key, value, invalid)),
        }
    }
}

fn choice<'a>(
    marked: &'a HashMap<String, String>,
    key: &'static str,
    missing: u16,
) -> Result<&'a str, FilterError> {
    marked
        .get(key)
        .map(String::as_str)
        .ok_or(FilterError::ConfigNotFound { key, code: missing })
}

fn out_of_range(key: &'static str, value: &str, code: u16) -> FilterError {
    FilterError::ConfigOutOfRange {
        key,
        value: value.to_string(),
        code,
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_constraint(value: &str) -> Option<(ConstraintTerm, ConstraintTerm)> {
    let mut terms = Vec::with_capacity(2);
    let mut words = value.split_whitespace().peekable();

    while let Some(word) = words.next() {
        let key = word.strip_prefix('*')?;
        let choice = match words.peek() {
            Some(next) if !next.starts_with('*') => words.next().map(str::to_string),
            _ => None,
        };
        terms.push(ConstraintTerm {
            key: key.to_string(),
            choice,
        });
    }

    let mut terms = terms.into_iter();
    match (terms.next(), terms.next(), terms.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}

/// Split a job option string into `(name, value)` pairs.
///
/// `name=value`, `name='quoted value'` and `name="quoted value"` keep their
/// value; a bare `name` means `true` and `noname` means `name=false`.
pub fn parse_options(options: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = options.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=') {
            name.push(c);
        }

        if chars.next_if_eq(&'=').is_some() {
            let mut value = String::new();
            let mut quote = None;
            while let Some(&c) = chars.peek() {
                match quote {
                    Some(q) if c == q => quote = None,
                    Some(_) => value.push(c),
                    None if c == '\'' || c == '"' => quote = Some(c),
                    None if c.is_whitespace() => break,
                    None if c == '\\' => {
                        chars.next();
                        if let Some(escaped) = chars.peek().copied() {
                            value.push(escaped);
                        }
                    }
                    None => value.push(c),
                }
                chars.next();
            }
            pairs.push((name, value));
        } else if let Some(negated) = name.strip_prefix("no").filter(|n| !n.is_empty()) {
            pairs.push((negated.to_string(), "false".to_string()));
        } else if !name.is_empty() {
            pairs.push((name, "true".to_string()));
        }
    }

    pairs
}
