//! Macros for reducing boilerplate code
//!
//! Wire-facing enums (priority classes, queue states) are spelled in
//! lowercase on the wire and in config files; this macro keeps `Display` and
//! `FromStr` in sync with that spelling.

/// Implements Display and FromStr for lowercase-spelled enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// The string literals must be lowercase, since parsing lowercases its input
/// before matching.
///
/// # Example
///
/// ```rust
/// use batchgate_common::impl_status_conversions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Priority {
///     High,
///     Normal,
///     Low,
/// }
///
/// impl_status_conversions!(Priority {
///     High => "high",
///     Normal => "normal",
///     Low => "low",
/// });
///
/// assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
/// assert_eq!(Priority::Low.to_string(), "low");
/// ```
#[macro_export]
macro_rules! impl_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    //! Unit tests for utils::macros.
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum DrainState {
        Idle,
        Waiting,
        Draining,
    }

    impl_status_conversions!(DrainState {
        Idle => "idle",
        Waiting => "waiting",
        Draining => "draining",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(DrainState::Idle.to_string(), "idle");
        assert_eq!(DrainState::Waiting.to_string(), "waiting");
        assert_eq!(DrainState::Draining.to_string(), "draining");
    }

    #[test]
    fn test_fromstr_is_case_insensitive() {
        assert_eq!(DrainState::from_str("idle").unwrap(), DrainState::Idle);
        assert_eq!(DrainState::from_str("WAITING").unwrap(), DrainState::Waiting);
        assert_eq!(DrainState::from_str(" DrAiNiNg ").unwrap(), DrainState::Draining);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = DrainState::from_str("stalled");
        assert!(result.unwrap_err().contains("Invalid DrainState: stalled"));
        assert!(DrainState::from_str("").is_err());
    }
}
