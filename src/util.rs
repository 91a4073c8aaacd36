//! Text, path and encoding helpers.

pub(crate) mod encoding;
pub(crate) mod media;
pub mod str;
pub(crate) mod uri;
