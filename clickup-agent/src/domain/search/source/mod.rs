//! Record sources an index can be built from.

mod clickup;
#[cfg(test)]
mod mock;

pub use self::clickup::ClickUpRecordSource;
#[cfg(test)]
pub use mock::MockRecordSource;
