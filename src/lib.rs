//! Magnet URI parsing.
//!
//! A [`MagnetLink`] wraps a raw `magnet:` URI and exposes the files,
//! trackers and acceptable sources it describes:
//!
//! ```
//! let link = magnet_uri::parse("magnet:?xt=urn:btih:ABCDEF&dn=My%20File&tr=udp://t.example:6969");
//! let files = link.files();
//! assert_eq!(files[0].hash_type.as_deref(), Some("btih"));
//! assert_eq!(files[0].display_name.as_deref(), Some("My File"));
//! assert_eq!(link.trackers(), vec!["udp://t.example:6969".to_string()]);
//! ```
//!
//! Malformed input never fails: accessors return empty results instead.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod magnet;
pub mod query;

pub use error::MagnetError;
pub use magnet::{FileEntry, MagnetLink};
pub use query::{QueryData, QueryValue};

/// Shortcut for [`MagnetLink::new`].
pub fn parse(magnet_url: &str) -> MagnetLink {
    MagnetLink::new(magnet_url)
}
