use std::ptr::NonNull;

use super::{MapError, MapProtection};
use crate::fs::error::{OsError, ProtectionMismatchError};
use crate::fs::sys::{MappedView, NativeView};

/// The mapping attached to a [`File`](super::File).
///
/// Invariant: `view` is `Some` exactly when `count > 0`.
#[derive(Debug, Default)]
pub(crate) struct MapState {
    count: usize,
    view: Option<(MappedView, MapProtection)>,
}

impl MapState {
    pub const fn count(&self) -> usize {
        self.count
    }

    pub fn view(&self) -> Option<&MappedView> {
        self.view.as_ref().map(|(view, _)| view)
    }

    /// Hands out the live view if there is one, otherwise calls `establish` to create it. The
    /// state is left untouched when either step fails.
    pub fn acquire<F>(&mut self, protection: MapProtection, establish: F) -> Result<NonNull<u8>, MapError>
    where
        F: FnOnce() -> Result<MappedView, MapError>,
    {
        if let Some((view, current)) = &self.view {
            if !current.covers(protection) {
                Err(ProtectionMismatchError)?
            }
            self.count += 1;
            return Ok(view.as_ptr());
        }

        let view = establish()?;
        let base = view.as_ptr();
        tracing::trace!(len = view.len(), ?protection, "established file mapping");

        self.view = Some((view, protection));
        self.count = 1;
        Ok(base)
    }

    /// Drops one reference, releasing the view when the last one goes. A no-op at zero.
    pub fn release(&mut self) -> Result<(), OsError> {
        match self.count {
            0 => Ok(()),
            1 => self.teardown(),
            _ => {
                self.count -= 1;
                Ok(())
            },
        }
    }

    /// Releases the view regardless of how many references are outstanding.
    pub fn teardown(&mut self) -> Result<(), OsError> {
        self.count = 0;
        match self.view.take() {
            Some((view, _)) => {
                tracing::trace!(len = view.len(), "releasing file mapping");
                view.unmap()
            },
            None => Ok(()),
        }
    }
}
