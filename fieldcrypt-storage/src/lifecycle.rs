use crate::dirty::DirtyTracker;
use crate::row::Row;

/// Error returned by a `before_save` hook. Boxed so models keep their own
/// error types.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A model that persists through [`MemoryStore`](crate::MemoryStore).
///
/// The store calls `before_save` exactly once per save attempt, before the
/// row reaches storage; an error aborts the write. `after_reload` runs after
/// the row and dirty tracking have been refreshed.
pub trait Lifecycle {
    /// Table the model's rows live in.
    fn table(&self) -> &str;

    fn row(&self) -> &Row;

    fn row_mut(&mut self) -> &mut Row;

    fn dirty_mut(&mut self) -> &mut DirtyTracker;

    fn before_save(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    fn after_save(&mut self) {}

    fn after_reload(&mut self) {}
}
