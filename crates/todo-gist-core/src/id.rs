use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeSet, fmt, str::FromStr};
use uuid::Uuid;

use crate::error::TaskError;

/// Length of freshly generated identifiers.
pub const ID_LEN: usize = 12;

/// Shortest prefix accepted by [`resolve_prefix`].
pub const MIN_PREFIX_LEN: usize = 3;

/// Identifier of a task.
///
/// Generated ids are 12 lowercase hex characters; ids read from the remote
/// document are kept verbatim, so the only guarantee is that they are non-empty.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh task identifier.
    #[must_use]
    pub fn generate() -> Self {
        // The first 12 hex digits of a v4 UUID precede the version nibble, so all 48 bits are random.
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..ID_LEN].to_owned())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters shown in listings.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(MIN_PREFIX_LEN)
            .map_or(self.0.as_str(), |(idx, _)| &self.0[..idx])
    }

    fn matches_prefix(&self, lowered_prefix: &str) -> bool {
        self.0.to_lowercase().starts_with(lowered_prefix)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(TaskError::EmptyId);
        }
        Ok(Self(s.to_owned()))
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of fresh task identifiers.
pub trait IdGenerator {
    /// Produce an identifier not handed out before.
    fn next_id(&self) -> TaskId;
}

/// Default generator backed by random UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> TaskId {
        TaskId::generate()
    }
}

/// Resolve a user-typed prefix to the single known id it identifies.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Errors
/// Returns [`TaskError::InvalidPrefix`] for prefixes shorter than
/// [`MIN_PREFIX_LEN`], [`TaskError::NoMatch`] when nothing matches and
/// [`TaskError::Ambiguous`] when several ids match.
pub fn resolve_prefix<'a, I>(prefix: &str, known: I) -> Result<TaskId, TaskError>
where
    I: IntoIterator<Item = &'a TaskId>,
{
    let trimmed = prefix.trim();
    if trimmed.chars().count() < MIN_PREFIX_LEN {
        return Err(TaskError::InvalidPrefix {
            prefix: trimmed.to_owned(),
            min: MIN_PREFIX_LEN,
        });
    }

    let needle = trimmed.to_lowercase();
    let matches: BTreeSet<&TaskId> = known.into_iter().filter(|id| id.matches_prefix(&needle)).collect();
    let matches: Vec<&TaskId> = matches.into_iter().collect();

    match matches.as_slice() {
        [] => Err(TaskError::NoMatch(trimmed.to_owned())),
        [only] => Ok((*only).clone()),
        many => Err(TaskError::Ambiguous {
            prefix: trimmed.to_owned(),
            count: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    fn ids(raw: &[&str]) -> Vec<TaskId> {
        raw.iter()
            .map(|s| s.parse().unwrap_or_else(|err| panic!("valid id {s}: {err}")))
            .collect()
    }

    #[test]
    fn generated_ids_are_lowercase_hex_of_fixed_length() {
        let id = TaskId::generate();
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let seen: HashSet<TaskId> = (0..2_000).map(|_| RandomIds.next_id()).collect();
        assert_eq!(seen.len(), 2_000);
    }

    #[test]
    fn resolves_prefix_table() {
        let known = ids(&["abc123def456", "abc789uvw012", "xyz345pqr678"]);

        let err = resolve_prefix("abc", &known).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);

        let resolved = resolve_prefix("abc1", &known).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(resolved.as_str(), "abc123def456");

        let err = resolve_prefix("zz", &known).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = resolve_prefix("zzz", &known).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn empty_prefix_is_invalid() {
        let known = ids(&["abc123def456"]);
        assert!(matches!(
            resolve_prefix("", &known),
            Err(TaskError::InvalidPrefix { min: MIN_PREFIX_LEN, .. })
        ));
        assert!(matches!(
            resolve_prefix("   ", &known),
            Err(TaskError::InvalidPrefix { .. })
        ));
    }

    #[test]
    fn prefix_matching_ignores_case_and_padding() {
        let known = ids(&["ABC123def456", "xyz345pqr678"]);
        let resolved = resolve_prefix("  abc1 ", &known).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(resolved.as_str(), "ABC123def456");
    }

    #[test]
    fn ambiguous_error_reports_match_count() {
        let known = ids(&["abc1", "abc2", "abc3"]);
        let err = resolve_prefix("abc", &known).unwrap_err();
        assert_eq!(
            err,
            TaskError::Ambiguous {
                prefix: "abc".into(),
                count: 3
            }
        );
    }

    #[test]
    fn repeated_ids_count_once() {
        let known = ids(&["abc123def456", "xyz345pqr678", "abc123def456"]);
        let resolved = resolve_prefix("abc", &known).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(resolved.as_str(), "abc123def456");

        let known = ids(&["abc123def456", "abc999000111", "abc123def456"]);
        assert_eq!(
            resolve_prefix("abc", &known),
            Err(TaskError::Ambiguous {
                prefix: "abc".into(),
                count: 2
            })
        );
    }

    #[test]
    fn short_form_is_three_characters() {
        let [long, tiny] = <[TaskId; 2]>::try_from(ids(&["abc123def456", "ab"]))
            .unwrap_or_else(|_| unreachable!("two ids"));
        assert_eq!(long.short(), "abc");
        assert_eq!(tiny.short(), "ab");
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert_eq!("".parse::<TaskId>(), Err(TaskError::EmptyId));
        assert_eq!(" ".parse::<TaskId>(), Err(TaskError::EmptyId));
    }

    #[test]
    fn task_id_roundtrip_through_json() {
        let id = TaskId::generate();
        let json = serde_json::to_string(&id).unwrap_or_else(|err| panic!("{err}"));
        let parsed: TaskId = serde_json::from_str(&json).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<TaskId>("\"\"").is_err());
    }
}
