pub mod feed;
pub mod models;
pub mod provider;

#[cfg(test)]
pub(crate) mod fixtures;

pub use feed::SeasonFiles;
pub use models::{CompletedGame, FutureGame};
#[cfg(test)]
pub use models::{HomeAway, Week};
pub use provider::GameSource;
