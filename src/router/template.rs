//! Route template compiler.
//!
//! A [`RouteTemplate`] is built from a controller-level prefix (`/books`) and an
//! action-level pattern (`{string:category}/{int:id}.html`). The pattern is
//! scanned once, left to right, into an anchored regular expression with one
//! capturing group per typed placeholder, plus the ordered [`ParamSpec`] list
//! that describes those groups.
//!
//! Templates are compiled at startup and never mutated afterwards, so a
//! compiled template can be shared freely between request threads.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, error, warn};

use crate::error::{ParamConversionError, TemplateError};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated storage for extracted path parameters.
pub type ParamVec = SmallVec<[PathParam; MAX_INLINE_PARAMS]>;

#[allow(clippy::expect_used)]
static PREFIX_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/([0-9a-zA-Z\-_/]+)?$").expect("prefix rule compiles"));

#[allow(clippy::expect_used)]
static PATTERN_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([^/])([0-9a-zA-Z\-_/{}:.]+)([^/]))?$").expect("pattern rule compiles")
});

#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]+\}").expect("placeholder rule compiles"));

const STRING_GROUP: &str = r"([0-9a-zA-Z\-_]+)";
const NUMBER_GROUP: &str = r"([0-9]+)";
// Wildcards span path segments but carry no parameter, so they never capture.
const WILDCARD_GROUP: &str = r"(?:[0-9a-zA-Z\-_./]+)?";

/// Declared type of a path placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamKind {
    String,
    Int,
    Long,
}

impl ParamKind {
    /// Resolve the type prefix of a `{type:name}` placeholder.
    ///
    /// Matching is case-insensitive; anything other than `int` or `long`
    /// is a string parameter.
    #[must_use]
    pub fn from_type_name(type_name: &str) -> Self {
        if type_name.eq_ignore_ascii_case("int") {
            ParamKind::Int
        } else if type_name.eq_ignore_ascii_case("long") {
            ParamKind::Long
        } else {
            ParamKind::String
        }
    }

    fn capture_group(self) -> &'static str {
        match self {
            ParamKind::Int | ParamKind::Long => NUMBER_GROUP,
            ParamKind::String => STRING_GROUP,
        }
    }

    /// Convert a raw captured segment into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ParamConversionError`] when an `Int`/`Long` segment does not
    /// parse (non-numeric text or out of range). Values are never defaulted.
    pub fn convert(self, name: &str, raw: &str) -> Result<PathValue, ParamConversionError> {
        let failed = || ParamConversionError {
            name: name.to_string(),
            kind: self,
            raw: raw.to_string(),
        };
        match self {
            ParamKind::String => Ok(PathValue::Str(raw.to_string())),
            ParamKind::Int => raw.parse().map(PathValue::Int).map_err(|_| failed()),
            ParamKind::Long => raw.parse().map(PathValue::Long).map_err(|_| failed()),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::String => "string",
            ParamKind::Int => "int",
            ParamKind::Long => "long",
        })
    }
}

/// Name and kind of one placeholder, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    name: Arc<str>,
    kind: ParamKind,
}

impl ParamSpec {
    #[must_use]
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: Arc::from(name),
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }
}

/// A typed path parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathValue {
    Str(String),
    Int(i32),
    Long(i64),
}

impl PathValue {
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            PathValue::Str(_) => ParamKind::String,
            PathValue::Int(_) => ParamKind::Int,
            PathValue::Long(_) => ParamKind::Long,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PathValue::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            PathValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer values widen losslessly, so both `Int` and `Long` read as `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PathValue::Int(v) => Some(i64::from(*v)),
            PathValue::Long(v) => Some(*v),
            PathValue::Str(_) => None,
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::Str(s) => f.write_str(s),
            PathValue::Int(v) => write!(f, "{v}"),
            PathValue::Long(v) => write!(f, "{v}"),
        }
    }
}

/// One extracted parameter: the placeholder name and its converted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParam {
    pub name: Arc<str>,
    pub value: PathValue,
}

/// Scanner state while walking a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Literal,
    Placeholder { after_colon: bool },
}

struct Scanned {
    body: String,
    params: Vec<ParamSpec>,
}

fn malformed(pattern: &str, reason: &'static str) -> TemplateError {
    TemplateError::MalformedPattern {
        pattern: pattern.to_string(),
        reason,
    }
}

/// Single pass over `pattern`, producing the regex body and the parameter list.
fn scan(pattern: &str) -> Result<Scanned, TemplateError> {
    let mut body = String::with_capacity(pattern.len() + 16);
    let mut params = Vec::with_capacity(pattern.matches('{').count());
    let mut type_buf = String::new();
    let mut name_buf = String::new();
    let mut state = ScanState::Literal;

    for ch in pattern.chars() {
        state = match (state, ch) {
            (ScanState::Literal, '{') => {
                type_buf.clear();
                name_buf.clear();
                ScanState::Placeholder { after_colon: false }
            }
            (ScanState::Literal, '}') => {
                return Err(malformed(pattern, "'}' without a matching '{'"));
            }
            (ScanState::Literal, '*') => {
                body.push_str(WILDCARD_GROUP);
                ScanState::Literal
            }
            (ScanState::Literal, c) => {
                body.push(c);
                ScanState::Literal
            }
            (ScanState::Placeholder { .. }, '{') => {
                return Err(malformed(pattern, "placeholders cannot nest"));
            }
            (ScanState::Placeholder { .. }, '}') => {
                let spec = if name_buf.is_empty() {
                    // `{name}` or `{name:}`: everything landed in the type buffer
                    if type_buf.is_empty() {
                        return Err(malformed(pattern, "placeholder has no name"));
                    }
                    ParamSpec::new(&type_buf, ParamKind::String)
                } else {
                    ParamSpec::new(&name_buf, ParamKind::from_type_name(&type_buf))
                };
                body.push_str(spec.kind.capture_group());
                params.push(spec);
                ScanState::Literal
            }
            (ScanState::Placeholder { .. }, ':') => ScanState::Placeholder { after_colon: true },
            (ScanState::Placeholder { after_colon }, c) => {
                if after_colon {
                    name_buf.push(c);
                } else {
                    type_buf.push(c);
                }
                ScanState::Placeholder { after_colon }
            }
        };
    }

    if state != ScanState::Literal {
        return Err(malformed(pattern, "unterminated placeholder"));
    }

    Ok(Scanned { body, params })
}

fn normalize_prefix(prefix: &str) -> String {
    if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    }
}

/// True for `*`, any pattern with a `/*` segment, and any pattern with a placeholder.
fn is_universal_pattern(pattern: &str) -> bool {
    pattern == "*" || pattern.contains("/*") || PLACEHOLDER.is_match(pattern)
}

/// A compiled (prefix, pattern) pair.
///
/// Construction never fails outright: an illegal prefix or a structurally
/// malformed pattern yields a template whose [`is_valid`](Self::is_valid) is
/// `false` and which carries no compiled expression. The
/// [`Router`](super::Router) refuses to register such templates.
///
/// # Example
///
/// ```rust
/// use routeplate::router::{PathValue, RouteTemplate};
///
/// let t = RouteTemplate::new("books", "{string:category}/{int:id}.html");
/// assert!(t.is_valid());
/// assert!(t.is_universal());
///
/// let params = t.extract("/books/novel/42.html").unwrap().unwrap();
/// assert_eq!(params[0].value, PathValue::Str("novel".into()));
/// assert_eq!(params[1].value, PathValue::Int(42));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    prefix: String,
    pattern_source: String,
    compiled: Option<Regex>,
    params: Vec<ParamSpec>,
    universal: bool,
    invalid: Option<TemplateError>,
}

impl RouteTemplate {
    /// Compile `pattern` under `prefix`. A missing leading `/` on the prefix is added.
    #[must_use]
    pub fn new(prefix: &str, pattern: &str) -> Self {
        let prefix = normalize_prefix(prefix);
        let universal = is_universal_pattern(pattern);

        let mut template = Self {
            prefix,
            pattern_source: pattern.to_string(),
            compiled: None,
            params: Vec::new(),
            universal,
            invalid: None,
        };

        match Self::compile(&template.prefix, pattern) {
            Ok((regex, params)) => {
                debug!(
                    prefix = %template.prefix,
                    pattern = %pattern,
                    regex = %regex.as_str(),
                    params = params.len(),
                    universal,
                    "Route template compiled"
                );
                template.compiled = Some(regex);
                template.params = params;
            }
            Err(e) => {
                error!(prefix = %template.prefix, pattern = %pattern, error = %e, "Route template rejected");
                template.invalid = Some(e);
            }
        }

        template
    }

    fn compile(prefix: &str, pattern: &str) -> Result<(Regex, Vec<ParamSpec>), TemplateError> {
        if !PREFIX_RULE.is_match(prefix) {
            return Err(TemplateError::IllegalPrefix {
                prefix: prefix.to_string(),
            });
        }

        // A pattern outside the charset is reported but still compiled.
        if pattern != "*" && !PATTERN_RULE.is_match(&pattern.replace(' ', "")) {
            warn!(pattern = %pattern, "Route pattern is illegal");
        }

        let Scanned { body, params } = scan(pattern)?;

        let mut source = String::with_capacity(prefix.len() + body.len() + 3);
        source.push('^');
        source.push_str(prefix);
        if !prefix.ends_with('/') {
            source.push('/');
        }
        source.push_str(&body);
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| TemplateError::Regex {
            pattern: pattern.to_string(),
            source: e,
        })?;

        Ok((regex, params))
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn pattern_source(&self) -> &str {
        &self.pattern_source
    }

    /// The anchored expression, or `None` for an invalid template.
    #[must_use]
    pub fn compiled_pattern(&self) -> Option<&str> {
        self.compiled.as_ref().map(Regex::as_str)
    }

    /// Number of capturing groups in the compiled expression (always `params().len()`).
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.compiled
            .as_ref()
            .map_or(0, |re| re.captures_len().saturating_sub(1))
    }

    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    /// Wildcard or parameterised templates rank below fixed literal paths.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.universal
    }

    /// Why the template is invalid, if it is.
    #[must_use]
    pub fn error(&self) -> Option<&TemplateError> {
        self.invalid.as_ref()
    }

    /// Consume the template, keeping it only if it compiled.
    ///
    /// # Errors
    ///
    /// Returns the validation failure recorded at construction.
    pub fn into_valid(mut self) -> Result<Self, TemplateError> {
        match self.invalid.take() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    /// Does `path` match this template? Invalid templates match nothing.
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.compiled.as_ref().is_some_and(|re| re.is_match(path))
    }

    /// Extract typed parameters from `path` in declaration order.
    ///
    /// Returns `Ok(None)` when the template declares no parameters (a fixed
    /// path carries nothing to extract) or when `path` does not match.
    ///
    /// # Errors
    ///
    /// Returns [`ParamConversionError`] when a numeric segment does not fit
    /// its declared type (e.g. `99999999999` for an `int` placeholder).
    pub fn extract(&self, path: &str) -> Result<Option<ParamVec>, ParamConversionError> {
        if self.params.is_empty() {
            return Ok(None);
        }
        let Some(captures) = self.compiled.as_ref().and_then(|re| re.captures(path)) else {
            return Ok(None);
        };

        let mut values = ParamVec::new();
        for (i, spec) in self.params.iter().enumerate() {
            let raw = captures.get(i + 1).map_or("", |m| m.as_str());
            values.push(PathParam {
                name: Arc::clone(&spec.name),
                value: spec.kind.convert(&spec.name, raw)?,
            });
        }
        Ok(Some(values))
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.ends_with('/') {
            write!(f, "{}{}", self.prefix, self.pattern_source)
        } else {
            write!(f, "{}/{}", self.prefix, self.pattern_source)
        }
    }
}
