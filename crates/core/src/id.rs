// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.

/// Define a prefixed newtype ID wrapper around `SmolStr`.
///
/// Generated IDs look like `{prefix}{nanoid}` with a 19 character random
/// suffix, so the whole ID stays within `SmolStr`'s inline capacity.
///
/// ```ignore
/// define_id! {
///     /// Identifies a job.
///     pub struct JobId("job-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random ID carrying the type prefix.
            pub fn generate() -> Self {
                Self(smol_str::SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
            }

            /// Wrap an existing ID string as-is.
            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The ID without its type prefix.
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }

            /// First `n` characters of the suffix, for log lines.
            pub fn short(&self, n: usize) -> &str {
                let suffix = self.suffix();
                suffix.char_indices().nth(n).map_or(suffix, |(end, _)| &suffix[..end])
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Unique identifier for a supervised job.
    pub struct JobId("job-");
}

crate::define_id! {
    /// Owner of a job. Recovery notifications are routed to this user's room.
    pub struct UserId("usr-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
