//! Range metadata: the optional `key:value,key:value@@` header.
//!
//! Decoding is strict: an unknown key, a duplicate key or a value of the
//! wrong type is an error. Range construction maps any error to empty
//! fields, so a hand-mangled header never stops a document from rendering.

use criticmark_config::{DefaultMetadata, MergePolicy, MetadataMergePolicies};
use criticmark_syntax::RangeKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("unknown metadata key `{0}`")]
    UnknownKey(String),

    #[error("metadata entry `{0}` has no `:`")]
    MissingSeparator(String),

    #[error("duplicate metadata key `{0}`")]
    DuplicateKey(&'static str),

    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unexpected text after metadata value: `{0}`")]
    Trailing(String),
}

/// The decoded metadata of one range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFields {
    pub author: Option<String>,
    /// Unix seconds.
    pub time: Option<i64>,
    pub done: Option<bool>,
    pub style: Option<String>,
    /// Hex colour, e.g. `#ff0000`.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Author,
    Time,
    Done,
    Style,
    Color,
}

impl Key {
    fn parse(raw: &str) -> Result<Self, MetadataError> {
        match raw {
            "author" | "a" => Ok(Key::Author),
            "time" | "t" => Ok(Key::Time),
            "done" | "d" => Ok(Key::Done),
            "style" | "s" => Ok(Key::Style),
            "color" | "c" => Ok(Key::Color),
            other => Err(MetadataError::UnknownKey(other.to_string())),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Key::Author => "author",
            Key::Time => "time",
            Key::Done => "done",
            Key::Style => "style",
            Key::Color => "color",
        }
    }
}

/// Characters that force a string value into quoted form.
const RESERVED: &[char] = &[',', ':', '"', '@', '{', '}', '~', '\n', '\r'];

/// Characters escaped inside quoted values so that no bracket, separator
/// or sentinel can appear in the header.
const ESCAPED: &[(char, &str)] = &[
    ('@', "\\u0040"),
    ('{', "\\u007b"),
    ('}', "\\u007d"),
    ('~', "\\u007e"),
];

impl MetadataFields {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.time.is_none()
            && self.done.is_none()
            && self.style.is_none()
            && self.color.is_none()
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    /// The fields a host stamps on new markup.
    pub fn from_defaults(defaults: &DefaultMetadata, now: Option<i64>) -> Self {
        Self {
            author: defaults.author.clone(),
            time: if defaults.add_timestamp { now } else { None },
            ..Self::default()
        }
    }

    /// Decode a header body (without the trailing `@@`).
    pub fn decode(header: &str) -> Result<Self, MetadataError> {
        let mut fields = Self::default();
        let mut rest = header.trim();

        while !rest.is_empty() {
            let (raw_key, after_key) = rest
                .split_once(':')
                .ok_or_else(|| MetadataError::MissingSeparator(rest.to_string()))?;
            let key = Key::parse(raw_key.trim())?;

            let after_key = after_key.trim_start();
            let (value, remainder) = if after_key.starts_with('"') {
                split_quoted(key, after_key)?
            } else {
                match after_key.find(',') {
                    Some(comma) => (after_key[..comma].trim_end().to_string(), &after_key[comma..]),
                    None => (after_key.trim_end().to_string(), ""),
                }
            };
            fields.set(key, value)?;

            let remainder = remainder.trim_start();
            rest = match remainder.strip_prefix(',') {
                Some(next) => next.trim_start(),
                None if remainder.is_empty() => remainder,
                None => return Err(MetadataError::Trailing(remainder.to_string())),
            };
        }

        Ok(fields)
    }

    /// Decode, falling back to empty fields on any error.
    pub fn decode_lossy(header: &str) -> Self {
        Self::decode(header).unwrap_or_else(|err| {
            log::debug!("ignoring malformed metadata {header:?}: {err}");
            Self::default()
        })
    }

    fn set(&mut self, key: Key, value: String) -> Result<(), MetadataError> {
        let invalid = |value: String| MetadataError::InvalidValue {
            key: key.name(),
            value,
        };
        let duplicate = match key {
            Key::Author => self.author.replace(value).is_some(),
            Key::Style => self.style.replace(value).is_some(),
            Key::Color => self.color.replace(value).is_some(),
            Key::Time => {
                let time = value.parse::<i64>().map_err(|_| invalid(value))?;
                self.time.replace(time).is_some()
            }
            Key::Done => {
                let done = match value.as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                };
                let done = done.ok_or_else(|| invalid(value))?;
                self.done.replace(done).is_some()
            }
        };
        if duplicate {
            return Err(MetadataError::DuplicateKey(key.name()));
        }
        Ok(())
    }

    /// Canonical encoding, keys in a fixed order. Empty fields encode to `""`.
    pub fn encode(&self) -> String {
        let mut entries = Vec::new();
        if let Some(author) = &self.author {
            entries.push(format!("author:{}", encode_string(author)));
        }
        if let Some(time) = self.time {
            entries.push(format!("time:{time}"));
        }
        if let Some(done) = self.done {
            entries.push(format!("done:{done}"));
        }
        if let Some(style) = &self.style {
            entries.push(format!("style:{}", encode_string(style)));
        }
        if let Some(color) = &self.color {
            entries.push(format!("color:{}", encode_string(color)));
        }
        entries.join(",")
    }

    /// The full header including the `@@` sentinel, or `""` when empty.
    pub fn header(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.encode(), RangeKind::METADATA_END)
        }
    }

    /// Resolve these (existing) fields against incoming ones.
    ///
    /// Fields present on only one side are carried over. Fields present on
    /// both sides with different values are settled by the policy for that
    /// field. A Comment by a different author never merges.
    pub fn merge_with(
        &self,
        incoming: &MetadataFields,
        policies: &MetadataMergePolicies,
        kind: RangeKind,
    ) -> MergeOutcome {
        if kind == RangeKind::Comment
            && matches!((&self.author, &incoming.author), (Some(old), Some(new)) if old != new)
        {
            return MergeOutcome::Conflict {
                move_outside: false,
            };
        }

        match merge_fields(self, incoming, policies) {
            Ok(fields) => MergeOutcome::Merged(fields),
            Err(move_outside) => MergeOutcome::Conflict { move_outside },
        }
    }
}

/// Result of [`MetadataFields::merge_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MetadataFields),
    /// The ranges must stay separate. With `move_outside`, new markup
    /// belongs outside the existing range rather than splitting it.
    Conflict { move_outside: bool },
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged(_))
    }
}

fn merge_fields(
    old: &MetadataFields,
    new: &MetadataFields,
    policies: &MetadataMergePolicies,
) -> Result<MetadataFields, bool> {
    Ok(MetadataFields {
        author: merge_field(&old.author, &new.author, policies.author)?,
        time: merge_field(&old.time, &new.time, policies.time)?,
        done: merge_field(&old.done, &new.done, policies.done)?,
        style: merge_field(&old.style, &new.style, policies.style)?,
        color: merge_field(&old.color, &new.color, policies.color)?,
    })
}

/// `Err(move_outside)` on conflict.
fn merge_field<T: Clone + PartialEq>(
    old: &Option<T>,
    new: &Option<T>,
    policy: MergePolicy,
) -> Result<Option<T>, bool> {
    match (old, new) {
        (Some(old), Some(new)) if old != new => match policy {
            MergePolicy::Skip => Ok(None),
            MergePolicy::Split => Err(false),
            MergePolicy::MoveOutside => Err(true),
            MergePolicy::KeepOld => Ok(Some(old.clone())),
            MergePolicy::KeepNew => Ok(Some(new.clone())),
        },
        (Some(old), _) => Ok(Some(old.clone())),
        (None, new) => Ok(new.clone()),
    }
}

fn encode_string(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.trim() != value
        || value.contains(RESERVED)
        || value.starts_with('"');
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = serde_json::Value::String(value.to_string()).to_string();
    for (ch, escape) in ESCAPED {
        quoted = quoted.replace(*ch, escape);
    }
    quoted
}

/// Split a leading JSON string off `input`, returning it decoded plus the rest.
fn split_quoted(key: Key, input: &str) -> Result<(String, &str), MetadataError> {
    let invalid = || MetadataError::InvalidValue {
        key: key.name(),
        value: input.to_string(),
    };

    let mut escaped = false;
    let mut end = None;
    for (idx, ch) in input.char_indices().skip(1) {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                end = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let end = end.ok_or_else(invalid)?;
    let value: String = serde_json::from_str(&input[..=end]).map_err(|_| invalid())?;
    Ok((value, &input[end + 1..]))
}
