//! Loading of the run parameters.
//!
//! The parameters are a flat JSON object. Apart from the experiment arguments it carries the
//! machine description (`hardware`, `storage`, `scale_factor`) which is only echoed and recorded,
//! never interpreted.

use std::io::BufRead as _;
use std::path::Path;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::ConfigError;

/// Number of numbered experiment slots.
pub const EXPERIMENT_SLOT_COUNT: u8 = 5;

/// Key holding the arguments that are put in front of every numbered experiment.
pub const COMMON_ARGS_KEY: &str = "common_args";

/// The value that marks an experiment slot (or the common arguments) as not to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipSentinel {
    /// An empty or whitespace-only value
    Empty,
    /// The literal value `skip`
    Literal,
}

impl SkipSentinel {
    pub fn is_skip(&self, value: &str) -> bool {
        match self {
            SkipSentinel::Empty => value.trim().is_empty(),
            SkipSentinel::Literal => value.trim() == "skip",
        }
    }
}

/// The two parameter layouts produced by the provisioning profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamsVariant {
    /// `experiment_<k>_args` keys, `skip` marks an unused slot.
    #[default]
    Args,
    /// `experiment_<k>_flags` keys, an empty value marks an unused slot, and a baseline run with
    /// the default arguments happens before the numbered experiments.
    Flags,
}

impl ParamsVariant {
    pub fn experiment_key(&self, id: u8) -> String {
        match self {
            ParamsVariant::Args => format!("experiment_{id}_args"),
            ParamsVariant::Flags => format!("experiment_{id}_flags"),
        }
    }

    pub fn sentinel(&self) -> SkipSentinel {
        match self {
            ParamsVariant::Args => SkipSentinel::Literal,
            ParamsVariant::Flags => SkipSentinel::Empty,
        }
    }

    pub fn runs_baseline(&self) -> bool {
        matches!(self, ParamsVariant::Flags)
    }
}

/// The arguments configured for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotArguments {
    Skip,
    Run(String),
}

/// One configured experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentSlot {
    /// 1-based slot number
    pub id: u8,
    pub arguments: SlotArguments,
}

impl ExperimentSlot {
    pub fn is_skipped(&self) -> bool {
        matches!(self.arguments, SlotArguments::Skip)
    }

    /// The slot's own argument tokens, empty for a skipped slot.
    pub fn tokens(&self) -> Vec<String> {
        match &self.arguments {
            SlotArguments::Skip => Vec::new(),
            SlotArguments::Run(args) => split_args(args),
        }
    }
}

/// Parameters for a single pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchParams {
    pub variant: ParamsVariant,
    pub hardware: Option<Value>,
    pub storage: Option<Value>,
    pub scale_factor: Option<Value>,
    /// Common arguments, already checked against the skip sentinel
    pub common_args: Option<String>,
    /// Exactly [EXPERIMENT_SLOT_COUNT] slots, ordered by id
    pub experiments: Vec<ExperimentSlot>,
}

impl BenchParams {
    /// Parse parameters from a JSON document.
    pub fn from_json_str(json: &str, variant: ParamsVariant) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value, variant)
    }

    /// Read parameters from a file.
    ///
    /// Only the first line is used and it may be form encoded, as written by the provisioning
    /// profile. Plain JSON is read unchanged as long as it contains no `%` or `+`.
    pub fn from_file(path: impl AsRef<Path>, variant: ParamsVariant) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let mut first_line = String::new();
        std::io::BufReader::new(file).read_line(&mut first_line)?;
        Self::from_json_str(&unquote_plus(first_line.trim_end()), variant)
    }

    /// Read form encoded parameters from an environment variable.
    pub fn from_env(var: &str, variant: ParamsVariant) -> Result<Self, ConfigError> {
        let encoded = std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.to_string()))?;
        Self::from_json_str(&unquote_plus(&encoded), variant)
    }

    pub fn from_value(value: Value, variant: ParamsVariant) -> Result<Self, ConfigError> {
        let Value::Object(mut map) = value else {
            return Err(ConfigError::NotAnObject);
        };
        let sentinel = variant.sentinel();

        let experiments = (1..=EXPERIMENT_SLOT_COUNT)
            .map(|id| {
                let key = variant.experiment_key(id);
                let args = match map.get(&key) {
                    None => return Err(ConfigError::MissingKey(key)),
                    Some(Value::String(args)) => args,
                    Some(_) => return Err(ConfigError::NotAString(key)),
                };
                let arguments = if sentinel.is_skip(args) {
                    SlotArguments::Skip
                } else {
                    SlotArguments::Run(args.clone())
                };
                Ok(ExperimentSlot { id, arguments })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let common_args = optional_string(&map, COMMON_ARGS_KEY)?
            .filter(|args| !sentinel.is_skip(args));

        Ok(Self {
            variant,
            hardware: map.remove("hardware"),
            storage: map.remove("storage"),
            scale_factor: map.remove("scale_factor"),
            common_args,
            experiments,
        })
    }

    pub fn common_tokens(&self) -> Vec<String> {
        self.common_args
            .as_deref()
            .map(split_args)
            .unwrap_or_default()
    }
}

fn optional_string(map: &Map<String, Value>, key: &str) -> Result<Option<String>, ConfigError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::NotAString(key.to_string())),
    }
}

/// Split an argument string into tokens on any run of whitespace.
///
/// The tokens are passed to the benchmark as they are, no shell is involved so quoting has no
/// special meaning.
pub fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

/// Decode a form encoded string, `+` becomes a space and `%XX` escapes become bytes.
///
/// Unescaped `&` and `=` are kept as they are.
pub fn unquote_plus(input: &str) -> String {
    let mut decoded = String::with_capacity(input.len());
    let mut rest = input;
    while !rest.is_empty() {
        let end = rest.find(|c: char| c == '&' || c == '=').unwrap_or(rest.len());
        let (piece, tail) = rest.split_at(end);
        if let Some((name, _)) = form_urlencoded::parse(piece.as_bytes()).next() {
            decoded.push_str(&name);
        }
        match tail.chars().next() {
            Some(delimiter) => {
                decoded.push(delimiter);
                rest = &tail[delimiter.len_utf8()..];
            }
            None => rest = tail,
        }
    }
    decoded
}
