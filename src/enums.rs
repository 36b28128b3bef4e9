//! Closed-set string enumerations.
//!
//! Status and action fields across the API are restricted strings. Each one
//! is declared with [`closed_enum!`](crate::closed_enum), which generates the
//! Rust enum together with [`ClosedEnum`], `Display`, `FromStr` and serde
//! impls that all go through [`parse`]. Matching is case-sensitive and an
//! unknown string is always an error, both when validating caller input and
//! when decoding server responses.

use thiserror::Error;

/// A string enumeration drawn from a statically declared set.
pub trait ClosedEnum: Sized + Copy + 'static {
    /// Field name used in error messages (e.g. `"status"`).
    const FIELD: &'static str;

    /// Every member of the set, in declaration order.
    const VARIANTS: &'static [Self];

    /// Wire representation of this value.
    fn as_str(self) -> &'static str;

    /// Wire representations of every member, in declaration order.
    fn allowed() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.as_str()).collect()
    }
}

/// A string that is not a member of the expected set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {field} value '{value}' (expected one of: {})", .allowed.join(", "))]
pub struct UnrecognizedValue {
    /// Field the value was meant for.
    pub field: &'static str,
    /// The offending input.
    pub value: String,
    /// Every accepted spelling.
    pub allowed: Vec<&'static str>,
}

/// Parse `raw` into a member of `E`.
///
/// # Errors
///
/// Returns [`UnrecognizedValue`] naming the input and the allowed set when
/// `raw` does not exactly match any member's wire representation.
pub fn parse<E: ClosedEnum>(raw: &str) -> Result<E, UnrecognizedValue> {
    E::VARIANTS
        .iter()
        .copied()
        .find(|v| v.as_str() == raw)
        .ok_or_else(|| UnrecognizedValue {
            field: E::FIELD,
            value: raw.to_string(),
            allowed: E::allowed(),
        })
}

/// Declare a closed string enumeration.
///
/// ```
/// infrapi::closed_enum! {
///     /// Power state reported for a replica.
///     pub enum ReplicaState: "state" {
///         Online => "Online",
///         Offline => "Offline",
///     }
/// }
///
/// let state: ReplicaState = "Online".parse().unwrap();
/// assert_eq!(state, ReplicaState::Online);
/// assert!("online".parse::<ReplicaState>().is_err());
/// ```
#[macro_export]
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::enums::ClosedEnum for $name {
            const FIELD: &'static str = $field;
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::enums::ClosedEnum::as_str(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::enums::UnrecognizedValue;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::enums::parse(s)
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str($crate::enums::ClosedEnum::as_str(*self))
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let raw = <::std::string::String as $crate::__serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                $crate::enums::parse(&raw).map_err($crate::__serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::closed_enum! {
        enum Power: "power" {
            Online => "Online",
            Offline => "Offline",
        }
    }

    #[test]
    fn test_every_variant_round_trips() {
        for v in Power::VARIANTS {
            let parsed: Power = parse(&v.to_string()).unwrap();
            assert_eq!(parsed, *v);
        }
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let err = parse::<Power>("Paused").unwrap_err();
        assert_eq!(err.field, "power");
        assert_eq!(err.value, "Paused");
        assert_eq!(err.allowed, vec!["Online", "Offline"]);
        assert_eq!(
            err.to_string(),
            "unrecognized power value 'Paused' (expected one of: Online, Offline)"
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(parse::<Power>("online").is_err());
        assert!(parse::<Power>("").is_err());
        assert!(parse::<Power>(" Online").is_err());
    }

    #[test]
    fn test_serde_goes_through_parse() {
        let json = serde_json::to_string(&Power::Offline).unwrap();
        assert_eq!(json, r#""Offline""#);

        let back: Power = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Power::Offline);

        let err = serde_json::from_str::<Power>(r#""Paused""#).unwrap_err();
        assert!(err.to_string().contains("unrecognized power value 'Paused'"));
    }
}
