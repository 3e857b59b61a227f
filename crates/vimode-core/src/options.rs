//! Options: the `:set` system.
//!
//! [`Options`] holds the values the interpreter consults; [`parse_set`]
//! turns the arguments of `:set` into [`SetDirective`]s that
//! [`Options::apply`] executes.
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `:set option`    | Enable boolean / show numeric |
//! | `:set nooption`  | Disable boolean               |
//! | `:set invoption` | Toggle boolean                |
//! | `:set option!`   | Toggle boolean                |
//! | `:set option?`   | Query current value           |
//! | `:set option=N`  | Assign numeric value          |
//! | `:set`           | Show changed options          |
//! | `:set all`       | Show all options              |
//!
//! # Option names
//!
//! | Full name    | Abbrev | Type    | Default | Used by                 |
//! |--------------|--------|---------|---------|-------------------------|
//! | `shiftwidth` | `sw`   | integer | 4       | `>` `<`                 |
//! | `ignorecase` | `ic`   | bool    | false   | `/` `?` `n` `N`         |
//! | `smartcase`  | `scs`  | bool    | false   | `/` `?` `n` `N`         |
//! | `wrapscan`   | `ws`   | bool    | true    | `n` `N`                 |
//! | `incsearch`  | `is`   | bool    | true    | search preview          |

use thiserror::Error;

/// A parsed `:set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
    /// `:set` with no arguments.
    ShowChanged,
    /// `:set all`.
    ShowAll,
}

/// Why a `:set` argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("E518: Unknown option: {0}")]
    Unknown(String),

    #[error("E521: Number required after =: {name}={value}")]
    NotANumber { name: String, value: String },

    #[error("E474: Invalid argument: {0}")]
    InvalidArgument(String),
}

// ---------------------------------------------------------------------------
// Option names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionName {
    ShiftWidth,
    IgnoreCase,
    SmartCase,
    WrapScan,
    IncSearch,
}

impl OptionName {
    const ALL: [Self; 5] = [
        Self::IgnoreCase,
        Self::IncSearch,
        Self::ShiftWidth,
        Self::SmartCase,
        Self::WrapScan,
    ];

    fn lookup(name: &str) -> Option<Self> {
        match name {
            "shiftwidth" | "sw" => Some(Self::ShiftWidth),
            "ignorecase" | "ic" => Some(Self::IgnoreCase),
            "smartcase" | "scs" => Some(Self::SmartCase),
            "wrapscan" | "ws" => Some(Self::WrapScan),
            "incsearch" | "is" => Some(Self::IncSearch),
            _ => None,
        }
    }

    const fn full_name(self) -> &'static str {
        match self {
            Self::ShiftWidth => "shiftwidth",
            Self::IgnoreCase => "ignorecase",
            Self::SmartCase => "smartcase",
            Self::WrapScan => "wrapscan",
            Self::IncSearch => "incsearch",
        }
    }

    const fn is_bool(self) -> bool {
        !matches!(self, Self::ShiftWidth)
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    OptionName::lookup(name).is_some_and(OptionName::is_bool)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the `:set` arguments. Empty arguments mean [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `:set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `no` and `inv` only count when the rest names a boolean option, so
    // an option that itself starts with them still parses.
    if let Some(name) = arg.strip_prefix("inv").filter(|n| is_bool_option(n)) {
        return SetDirective::Toggle(name.to_string());
    }
    if let Some(name) = arg.strip_prefix("no").filter(|n| is_bool_option(n)) {
        return SetDirective::Off(name.to_string());
    }
    if OptionName::lookup(arg).is_some_and(|o| !o.is_bool()) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Columns per `>`/`<` step.
    pub shiftwidth: usize,
    pub ignorecase: bool,
    /// Override `ignorecase` when the pattern has an uppercase letter.
    pub smartcase: bool,
    /// `n`/`N` continue past the end (start) of the buffer.
    pub wrapscan: bool,
    /// Preview the match while typing a search.
    pub incsearch: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shiftwidth: 4,
            ignorecase: false,
            smartcase: false,
            wrapscan: true,
            incsearch: true,
        }
    }
}

impl Options {
    /// Run a `:set` argument string. Returns the text to show, if any.
    ///
    /// # Errors
    ///
    /// The first argument that names an unknown option or carries a bad
    /// value. Arguments before it have already been applied.
    pub fn apply(&mut self, args: &str) -> Result<Option<String>, OptionError> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(text) = self.apply_directive(&directive)? {
                shown.push(text);
            }
        }
        Ok((!shown.is_empty()).then(|| shown.join("  ")))
    }

    fn apply_directive(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        let known = |name: &str| OptionName::lookup(name).ok_or_else(|| OptionError::Unknown(name.to_string()));
        match directive {
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = OptionName::ALL
                    .into_iter()
                    .filter(|&o| self.format(o) != defaults.format(o))
                    .map(|o| self.format(o))
                    .collect();
                Ok(Some(changed.join("  ")).filter(|s| !s.is_empty()))
            }
            SetDirective::ShowAll => Ok(Some(
                OptionName::ALL
                    .into_iter()
                    .map(|o| self.format(o))
                    .collect::<Vec<_>>()
                    .join("  "),
            )),
            SetDirective::Query(name) => Ok(Some(self.format(known(name)?))),
            SetDirective::On(name) => self.set_bool(known(name)?, name, |_| true),
            SetDirective::Off(name) => self.set_bool(known(name)?, name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(known(name)?, name, |v| !v),
            SetDirective::Assign(name, value) => {
                let option = known(name)?;
                if option.is_bool() {
                    return Err(OptionError::InvalidArgument(format!("{name}={value}")));
                }
                let n: usize = value.parse().map_err(|_| OptionError::NotANumber {
                    name: name.clone(),
                    value: value.clone(),
                })?;
                if n == 0 {
                    return Err(OptionError::InvalidArgument(format!("{name}={value}")));
                }
                self.shiftwidth = n;
                Ok(None)
            }
        }
    }

    fn set_bool(
        &mut self,
        option: OptionName,
        name: &str,
        f: impl FnOnce(bool) -> bool,
    ) -> Result<Option<String>, OptionError> {
        let slot = match option {
            OptionName::IgnoreCase => &mut self.ignorecase,
            OptionName::SmartCase => &mut self.smartcase,
            OptionName::WrapScan => &mut self.wrapscan,
            OptionName::IncSearch => &mut self.incsearch,
            OptionName::ShiftWidth => return Err(OptionError::InvalidArgument(name.to_string())),
        };
        *slot = f(*slot);
        Ok(None)
    }

    fn format(&self, option: OptionName) -> String {
        let name = option.full_name();
        let value = match option {
            OptionName::ShiftWidth => return format!("{name}={}", self.shiftwidth),
            OptionName::IgnoreCase => self.ignorecase,
            OptionName::SmartCase => self.smartcase,
            OptionName::WrapScan => self.wrapscan,
            OptionName::IncSearch => self.incsearch,
        };
        if value { name.to_string() } else { format!("no{name}") }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
