//! Document ranks.
//!
//! A rank is the integer sort key attached to an indexed document. The search
//! backend returns documents in *descending* rank order by default, so ranks
//! that were requested ascending are stored inverted against [`MAX_RANK`].
//!
//! String ranks are derived with [`encode_string_rank`], a bounded-precision
//! encoding that preserves lexicographic order for a prefix of the input.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::metrics;

/// Upper bound of the rank range.
pub const MAX_RANK: i64 = 1 << 31;

/// Default digit budget for string rank encoding.
pub const DEFAULT_RANK_DIGITS: usize = 9;

// Budgets beyond 18 digits would no longer fit an i64.
const MAX_RANK_DIGITS: usize = 18;

static DIGIT_BUDGET: AtomicUsize = AtomicUsize::new(DEFAULT_RANK_DIGITS);

type Transliterator = Box<dyn Fn(&str) -> String + Send + Sync>;

static TRANSLITERATOR: RwLock<Option<Transliterator>> = RwLock::new(None);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    /// The named field or method does not exist on the instance.
    #[error("no field or method '{0}' on the instance")]
    UnresolvableField(String),
    /// The named member exists but cannot serve as a rank.
    #[error("member '{0}' cannot be used as a document rank")]
    UnsupportedValue(String),
}

/// A value a rank source can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum RankValue {
    Integer(i64),
    Text(String),
}

/// Field or method access by name, for rank resolution.
///
/// Implemented for `serde_json::Value` documents; model wrappers implement it
/// to expose computed members.
pub trait RankAccess {
    /// Whether the named member exists at all.
    fn has_member(&self, name: &str) -> bool;

    /// The member's value, when it exists and is rankable.
    fn rank_field(&self, name: &str) -> Option<RankValue>;
}

impl RankAccess for Value {
    fn has_member(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn rank_field(&self, name: &str) -> Option<RankValue> {
        match self.get(name)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(RankValue::Integer),
            Value::String(s) => Some(RankValue::Text(s.clone())),
            _ => None,
        }
    }
}

/// How an index derives the rank for an instance's document.
pub enum RankSpec {
    /// A field or zero-argument method name on the instance. A leading `-`
    /// marks the rank as ascending-requested.
    Field(String),
    /// A fixed rank value.
    Value(i64),
    /// A callable producing the rank.
    Computed(Box<dyn Fn() -> RankValue + Send + Sync>),
}

impl RankSpec {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn value(rank: i64) -> Self {
        Self::Value(rank)
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn() -> RankValue + Send + Sync + 'static,
    {
        Self::Computed(Box::new(f))
    }
}

impl fmt::Debug for RankSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Value(rank) => f.debug_tuple("Value").field(rank).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Install the ASCII transliteration collaborator used by
/// [`encode_string_rank`] for non-ASCII input.
pub fn set_transliterator<F>(f: F)
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    *TRANSLITERATOR.write() = Some(Box::new(f));
}

/// Remove the installed transliterator, reverting to raw characters.
pub fn clear_transliterator() {
    *TRANSLITERATOR.write() = None;
}

/// Set the digit budget used when [`resolve_rank`] encodes string ranks.
pub fn set_rank_digit_budget(digits: usize) {
    DIGIT_BUDGET.store(digits.clamp(1, MAX_RANK_DIGITS), Ordering::Relaxed);
}

/// The configured digit budget for string rank encoding.
pub fn rank_digit_budget() -> usize {
    DIGIT_BUDGET.load(Ordering::Relaxed)
}

/// Convert a string into a number such that when the numbers are sorted they
/// maintain the lexicographic sort order of the words they represent.
///
/// The number of characters for which lexicographic order is maintained
/// depends on `max_digits`: each character contributes a two-digit code, so a
/// budget of 9 fully preserves the first four characters plus the leading
/// digit of the fifth. Strings differing only beyond that prefix compare
/// equal, a deliberate bounded-precision tradeoff rather than a defect:
///
/// ```
/// use search_bridge::rank::encode_string_rank;
///
/// assert_eq!(encode_string_rank("Python", 9), encode_string_rank("Pythonic", 9));
/// ```
///
/// Non-ASCII input is transliterated via the collaborator installed with
/// [`set_transliterator`]; with none installed, raw characters are used and a
/// warning is logged (degraded ordering, best effort).
pub fn encode_string_rank(s: &str, max_digits: usize) -> i64 {
    let max_digits = max_digits.clamp(1, MAX_RANK_DIGITS);

    // Smallest ordinal taken into account.
    const SMALLEST_ORD: u32 = 'A' as u32;
    // Ordinal used for punctuation and right padding; sorts before all
    // letters.
    const PUNCTUATION_ORD: u32 = SMALLEST_ORD - 1;
    // Normalization offset, chosen so 'A' maps to 11: a smaller code would
    // start with '0' and be dropped when the numeral string is parsed.
    const OFFSET: u32 = SMALLEST_ORD - 11;
    const PADDING: char = '@';

    let guard = TRANSLITERATOR.read();
    let text: Cow<'_, str> = match guard.as_ref() {
        Some(transliterate) => Cow::Owned(transliterate(s)),
        None => {
            warn!(
                "no ASCII transliterator installed; a rank string with \
                 non-ASCII characters may produce unexpected ordering"
            );
            Cow::Borrowed(s)
        }
    };
    metrics::record_rank_encoding(guard.is_some());

    let code = |c: char| {
        let ord = if c.is_alphabetic() {
            c as u32
        } else {
            PUNCTUATION_ORD
        };
        ord - OFFSET
    };

    let mut digits = String::with_capacity(max_digits + 2);
    for c in text.chars().chain(std::iter::repeat(PADDING)) {
        digits.push_str(&format!("{:02}", code(c)));
        if digits.len() >= max_digits {
            break;
        }
    }
    digits.truncate(max_digits);

    // All characters are ASCII digits and the budget fits an i64, so the
    // parse cannot fail.
    digits.parse().unwrap_or(0)
}

/// Resolve the rank with which an instance's document should be indexed.
///
/// `spec` names a field, a zero-argument method, a callable, or a fixed
/// number; `None` means the document carries no rank. String values pass
/// through [`encode_string_rank`] with the configured digit budget.
///
/// The backend returns documents in descending rank order by default, so a
/// rank whose field name carried a leading `-` (ascending-requested) is
/// stored as `MAX_RANK - value`.
pub fn resolve_rank<A: RankAccess>(
    instance: &A,
    spec: Option<&RankSpec>,
) -> Result<Option<i64>, RankError> {
    let Some(spec) = spec else {
        return Ok(None);
    };

    let mut ascending = false;
    let value = match spec {
        RankSpec::Value(rank) => RankValue::Integer(*rank),
        RankSpec::Computed(f) => f(),
        RankSpec::Field(name) => {
            let stripped = name.strip_prefix('-');
            ascending = stripped.is_some();
            let name = stripped.unwrap_or(name);

            if !instance.has_member(name) {
                return Err(RankError::UnresolvableField(name.to_string()));
            }
            instance
                .rank_field(name)
                .ok_or_else(|| RankError::UnsupportedValue(name.to_string()))?
        }
    };

    let rank = match value {
        RankValue::Integer(rank) => rank,
        RankValue::Text(s) => encode_string_rank(&s, rank_digit_budget()),
    };

    Ok(Some(if ascending { MAX_RANK - rank } else { rank }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(
            encode_string_rank("deterministic", 9),
            encode_string_rank("deterministic", 9)
        );
    }

    #[test]
    fn test_known_encodings() {
        // 'A' -> 11, then padding code 10 repeated, truncated to 9 digits.
        assert_eq!(encode_string_rank("A", 9), 111010101);
        // Empty input is all padding.
        assert_eq!(encode_string_rank("", 9), 101010101);
    }

    #[test]
    fn test_budget_truncation() {
        // Two characters fill a four-digit budget exactly.
        assert_eq!(encode_string_rank("ABCDEFGH", 4), 1112);
    }

    #[test]
    fn test_precision_is_bounded() {
        assert_eq!(
            encode_string_rank("Python", 9),
            encode_string_rank("Pythonic", 9)
        );
    }

    #[test]
    fn test_lexicographic_order_preserved() {
        assert!(encode_string_rank("Alpha", 9) < encode_string_rank("Beta", 9));
        assert!(encode_string_rank("AAAA", 9) < encode_string_rank("AAAB", 9));
        // Uppercase sorts before lowercase, as in raw ordinal order.
        assert!(encode_string_rank("Zebra", 9) < encode_string_rank("apple", 9));
        // A longer string ranks after its own prefix.
        assert!(encode_string_rank("AB", 9) < encode_string_rank("ABA", 9));
    }

    #[test]
    fn test_punctuation_sorts_before_letters() {
        assert!(encode_string_rank("!zzz", 9) < encode_string_rank("Azzz", 9));
        // All punctuation shares one code.
        assert_eq!(encode_string_rank("!!", 9), encode_string_rank("??", 9));
    }

    #[test]
    fn test_transliterator_is_used() {
        set_transliterator(|s| s.replace('é', "e"));
        assert_eq!(encode_string_rank("écho", 9), encode_string_rank("echo", 9));
        clear_transliterator();
    }

    #[test]
    fn test_resolve_without_spec() {
        let instance = json!({"score": 5});
        assert_eq!(resolve_rank(&instance, None), Ok(None));
    }

    #[test]
    fn test_resolve_numeric_field() {
        let instance = json!({"score": 5});
        let spec = RankSpec::field("score");
        assert_eq!(resolve_rank(&instance, Some(&spec)), Ok(Some(5)));
    }

    #[test]
    fn test_resolve_ascending_requested_inverts() {
        let instance = json!({"score": 5});
        let spec = RankSpec::field("-score");
        assert_eq!(resolve_rank(&instance, Some(&spec)), Ok(Some(MAX_RANK - 5)));
    }

    #[test]
    fn test_resolve_string_field_is_encoded() {
        let instance = json!({"name": "Python"});
        let spec = RankSpec::field("name");
        assert_eq!(
            resolve_rank(&instance, Some(&spec)),
            Ok(Some(encode_string_rank("Python", 9)))
        );

        let spec = RankSpec::field("-name");
        assert_eq!(
            resolve_rank(&instance, Some(&spec)),
            Ok(Some(MAX_RANK - encode_string_rank("Python", 9)))
        );
    }

    #[test]
    fn test_resolve_fixed_value() {
        let instance = json!({});
        let spec = RankSpec::value(7);
        assert_eq!(resolve_rank(&instance, Some(&spec)), Ok(Some(7)));
    }

    #[test]
    fn test_resolve_computed() {
        let instance = json!({});
        let spec = RankSpec::computed(|| RankValue::Integer(42));
        assert_eq!(resolve_rank(&instance, Some(&spec)), Ok(Some(42)));

        let spec = RankSpec::computed(|| RankValue::Text("Python".into()));
        assert_eq!(
            resolve_rank(&instance, Some(&spec)),
            Ok(Some(encode_string_rank("Python", 9)))
        );
    }

    #[test]
    fn test_resolve_missing_field() {
        let instance = json!({"score": 5});
        let spec = RankSpec::field("missing");
        assert_eq!(
            resolve_rank(&instance, Some(&spec)),
            Err(RankError::UnresolvableField("missing".into()))
        );
    }

    #[test]
    fn test_resolve_unsupported_member() {
        let instance = json!({"flag": true});
        let spec = RankSpec::field("flag");
        assert_eq!(
            resolve_rank(&instance, Some(&spec)),
            Err(RankError::UnsupportedValue("flag".into()))
        );
    }
}
