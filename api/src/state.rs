use std::sync::Arc;

use shared::PaymentStore;

/// Shared by every request. The store client is pooled and only read from,
/// so no locking is needed.
pub struct AppState {
    pub store: Arc<dyn PaymentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        AppState { store }
    }
}
