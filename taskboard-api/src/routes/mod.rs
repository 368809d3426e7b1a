/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `boards`, `columns`, `tasks`, `members`: Board resources
/// - `stream`: Live per-board event stream

pub mod auth;
pub mod boards;
pub mod columns;
pub mod health;
pub mod members;
pub mod stream;
pub mod tasks;

/// Deserializer for nullable PATCH/PUT fields that must distinguish "absent"
/// (leave as is) from explicit `null` (clear the value).
///
/// Used with `#[serde(default, deserialize_with = "...")]`: an absent field
/// takes the default `None`; a present field, `null` included, lands here and
/// becomes `Some(inner)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        value: Option<Option<i32>>,
    }

    #[test]
    fn test_double_option_distinguishes_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.value, None);

        let cleared: Patch = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(cleared.value, Some(None));

        let set: Patch = serde_json::from_str(r#"{"value": 7}"#).unwrap();
        assert_eq!(set.value, Some(Some(7)));
    }
}
