/// Defines a closed identifier enum with a stable wire name, a human-readable
/// name and optional lowercase aliases.
///
/// Variants are listed in priority order; `all_variants()` returns them in that
/// order. Parsing is case-insensitive and unknown names fail with a suggestion
/// for the closest known name.
#[macro_export]
macro_rules! define_id_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $serde_name:literal : $display_name:literal
                $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl $enum_name {
            /// Stable lowercase name used in configuration, logs and output.
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $serde_name,
                    )*
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let lowered = name.trim().to_lowercase();
                $(
                    if lowered == $serde_name
                        || lowered == $display_name.to_lowercase()
                        $( || lowered == $alias )*
                    {
                        return Some(Self::$variant);
                    }
                )*
                None
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }

            /// Closest known name by Jaro-Winkler similarity, if reasonably close.
            pub fn suggest(name: &str) -> Option<&'static str> {
                let lowered = name.trim().to_lowercase();
                Self::all_variants()
                    .iter()
                    .map(|v| (v.name(), strsim::jaro_winkler(&lowered, v.name())))
                    .filter(|(_, score)| *score >= 0.7)
                    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(name, _)| name)
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| $crate::error::ConfigError::UnknownPlatform {
                    name: s.to_string(),
                    suggestion: Self::suggest(s).map(str::to_string),
                })
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}
