//! Strongly typed entity identifiers.
//!
//! Every aggregate is keyed by an application-generated UUID v4. Wrapping each
//! key in its own newtype stops a `PostId` being handed to a query expecting a
//! `CommentId`.

use uuid::Uuid;

/// Raised when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} id must be a valid UUID")]
pub struct IdParseError {
    entity: &'static str,
}

impl IdParseError {
    /// Name of the entity whose identifier failed to parse.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        self.entity
    }
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident => $entity:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse a UUID string.
            ///
            /// # Errors
            /// Returns [`IdParseError`] when `raw` is not a UUID.
            pub fn parse(raw: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdParseError { entity: $entity })
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_entity_id!(
    /// Registered account identifier.
    UserId => "user"
);
define_entity_id!(
    /// Community identifier.
    CommunityId => "community"
);
define_entity_id!(
    /// Post identifier.
    PostId => "post"
);
define_entity_id!(
    /// Comment identifier.
    CommentId => "comment"
);
define_entity_id!(
    /// Vote row identifier.
    VoteId => "vote"
);
