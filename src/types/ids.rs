use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Declares a stable string key for one record kind.
/// Keeps the id text shared behind an `Arc<str>` so clones across overlays and stop lists stay cheap.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Prefix used when the record store mints a new id (`<prefix>-<n>`).
            pub const PREFIX: &'static str = $prefix;

            pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

            /// Mint the `n`-th id of this kind, e.g. `bin-9`.
            pub fn numbered(n: u64) -> Self { Self(Arc::from(format!("{}-{n}", Self::PREFIX))) }

            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self { Self::new(id) }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self { Self(Arc::from(id)) }
        }
    };
}

record_id!(
    /// Identity of a collection bin.
    BinId, "bin"
);
record_id!(
    /// Identity of a zone polygon.
    ZoneId, "zone"
);
record_id!(
    /// Identity of a collection route.
    RouteId, "route"
);
record_id!(TruckId, "truck");
record_id!(DriverId, "driver");
record_id!(LogId, "log");
