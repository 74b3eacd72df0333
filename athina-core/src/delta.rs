//! Reversible text deltas.
//!
//! A delta is a TAB-separated token stream: `=N` copies `N` characters of the
//! base, `-N` skips `N` characters of the base and `+text` inserts the
//! percent-encoded `text`. Lengths count Unicode scalar values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum OpKind {
    Delete,
    Equal,
    Insert,
}

impl From<OpKind> for i8 {
    fn from(kind: OpKind) -> Self {
        match kind {
            OpKind::Delete => -1,
            OpKind::Equal => 0,
            OpKind::Insert => 1,
        }
    }
}

impl TryFrom<i8> for OpKind {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            -1 => Ok(OpKind::Delete),
            0 => Ok(OpKind::Equal),
            1 => Ok(OpKind::Insert),
            other => Err(format!("unknown diff operation type {}", other)),
        }
    }
}

impl From<ChangeTag> for OpKind {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Delete => OpKind::Delete,
            ChangeTag::Equal => OpKind::Equal,
            ChangeTag::Insert => OpKind::Insert,
        }
    }
}

/// One segment of an edit script, carrying its literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    #[serde(rename = "Type")]
    pub kind: OpKind,
    #[serde(rename = "Text")]
    pub text: String,
}

impl DiffOp {
    pub fn new(kind: OpKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// The result of diffing two strings: the raw edit script and its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub ops: Vec<DiffOp>,
    pub encoded: String,
}

impl Delta {
    pub fn is_noop(&self) -> bool {
        is_noop(&self.encoded)
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Computes the delta turning `base` into `target`.
///
/// Uses a character-level Myers diff without a deadline, so the output only
/// depends on the two inputs.
pub fn diff(base: &str, target: &str) -> Delta {
    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(base, target);

    let mut ops: Vec<DiffOp> = Vec::new();
    for change in text_diff.iter_all_changes() {
        let kind = OpKind::from(change.tag());
        match ops.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => ops.push(DiffOp::new(kind, change.value())),
        }
    }

    let encoded = encode(&ops);
    Delta { ops, encoded }
}

/// Encodes an edit script into the token stream.
pub fn encode(ops: &[DiffOp]) -> String {
    ops.iter()
        .map(|op| match op.kind {
            OpKind::Equal => format!("={}", op.text.chars().count()),
            OpKind::Delete => format!("-{}", op.text.chars().count()),
            OpKind::Insert => format!("+{}", urlencoding::encode(&op.text)),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Replays `delta` against `base`.
///
/// Fails with [`Error::MalformedDelta`] when a token does not parse or the
/// lengths the delta consumes do not add up to the length of `base`.
pub fn apply(base: &str, delta: &str) -> Result<String> {
    let chars: Vec<char> = base.chars().collect();
    let mut cursor = 0usize;
    let mut output = String::with_capacity(base.len());

    for token in delta.split('\t') {
        let Some(op) = token.chars().next() else {
            continue;
        };
        let param = &token[op.len_utf8()..];

        match op {
            '+' => {
                let text = urlencoding::decode(param).map_err(|e| {
                    Error::MalformedDelta(format!("invalid insertion literal {:?}: {}", param, e))
                })?;
                output.push_str(&text);
            }
            '=' | '-' => {
                let count: usize = param.parse().map_err(|_| {
                    Error::MalformedDelta(format!("invalid length in token {:?}", token))
                })?;
                let end = cursor
                    .checked_add(count)
                    .filter(|end| *end <= chars.len())
                    .ok_or_else(|| {
                        Error::MalformedDelta(format!(
                            "token {:?} runs past the end of a {}-character base",
                            token,
                            chars.len()
                        ))
                    })?;
                if op == '=' {
                    output.extend(&chars[cursor..end]);
                }
                cursor = end;
            }
            other => {
                return Err(Error::MalformedDelta(format!(
                    "unknown operation {:?} in token {:?}",
                    other, token
                )));
            }
        }
    }

    if cursor != chars.len() {
        return Err(Error::MalformedDelta(format!(
            "delta covers {} characters but the base has {}",
            cursor,
            chars.len()
        )));
    }

    Ok(output)
}

/// A delta is a no-op when it holds neither insertions nor deletions.
pub fn is_noop(delta: &str) -> bool {
    !delta
        .split('\t')
        .any(|token| token.starts_with('+') || token.starts_with('-'))
}

/// Human-readable rendering of an edit script, used as identity hash input.
pub fn render_ops(ops: &[DiffOp]) -> String {
    let mut rendered = String::new();
    for op in ops {
        match op.kind {
            OpKind::Equal => rendered.push_str(&op.text),
            OpKind::Insert => {
                rendered.push_str("[+");
                rendered.push_str(&op.text);
                rendered.push(']');
            }
            OpKind::Delete => {
                rendered.push_str("[-");
                rendered.push_str(&op.text);
                rendered.push(']');
            }
        }
    }
    rendered
}
