//! See [`RenderListener`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::data::Feature;
use crate::error::RenderError;

/// Receives notifications about the progress of a render.
///
/// Listeners are called on the rendering thread in no particular order.
pub trait RenderListener: Send + Sync {
    /// A feature was drawn by at least one symbolizer.
    fn feature_rendered(&self, feature: &Feature);
    /// A failure did not stop the render but some of its content is missing.
    fn error_occurred(&self, error: &RenderError);
}

/// Set of registered listeners.
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: RwLock<Vec<Arc<dyn RenderListener>>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<dyn RenderListener>) {
        self.listeners.write().push(listener);
    }

    /// Removes the listener by identity. Returns true if it was registered.
    pub(crate) fn remove(&self, listener: &Arc<dyn RenderListener>) -> bool {
        let mut listeners = self.listeners.write();
        let len = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != len
    }

    pub(crate) fn feature_rendered(&self, feature: &Feature) {
        for listener in self.listeners.read().iter() {
            listener.feature_rendered(feature);
        }
    }

    pub(crate) fn error_occurred(&self, error: &RenderError) {
        if error.is_fatal() {
            log::error!("{error}");
        } else {
            log::warn!("{error}");
        }

        for listener in self.listeners.read().iter() {
            listener.error_occurred(error);
        }
    }
}
