//! Macro for implementing Display and FromStr for label enums
//!
//! Stage and failure-kind enums are logged, shown to the UI layer and read
//! back from configuration as lowercase snake_case labels.
//!
//! # Example
//!
//! ```rust
//! use scoutgate_domain::impl_domain_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum StoreKind {
//!     Keyring,
//!     Memory,
//! }
//!
//! impl_domain_label_conversions!(StoreKind {
//!     Keyring => "keyring",
//!     Memory => "memory",
//! });
//!
//! assert_eq!(StoreKind::Keyring.to_string(), "keyring");
//! assert_eq!("MEMORY".parse::<StoreKind>(), Ok(StoreKind::Memory));
//! ```

/// Implements Display and FromStr traits for label enums
///
/// - Display writes the label
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Stable lowercase label
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
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
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStage {
        Idle,
        AwaitingRedirect,
    }

    impl_domain_label_conversions!(TestStage {
        Idle => "idle",
        AwaitingRedirect => "awaiting_redirect",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestStage::Idle.to_string(), "idle");
        assert_eq!(TestStage::AwaitingRedirect.to_string(), "awaiting_redirect");
    }

    #[test]
    fn test_fromstr_case_insensitive() {
        assert_eq!(TestStage::from_str("AWAITING_REDIRECT").unwrap(), TestStage::AwaitingRedirect);
        assert_eq!(TestStage::from_str(" Idle ").unwrap(), TestStage::Idle);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestStage::from_str("redirecting");
        assert!(result.unwrap_err().contains("Invalid TestStage: redirecting"));
        assert!(TestStage::from_str("").is_err());
    }
}
