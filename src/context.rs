use std::sync::Arc;

use crate::{
    dispatch::service::DispatchService, notifications::service::NotificationService,
    settings::Settings,
};

pub struct AppContext {
    pub notification_service: Arc<NotificationService>,
    pub dispatch_service: DispatchService,
}

impl AppContext {
    /// Creates the application context. The push backend is initialized here,
    /// before any request can be served.
    pub async fn from_settings(settings: &Settings) -> Self {
        let notification_service = NotificationService::initialize(&settings.push).await;
        Self::new(Arc::new(notification_service))
    }

    pub fn new(notification_service: Arc<NotificationService>) -> Self {
        let dispatch_service = DispatchService::new(notification_service.clone());

        Self {
            notification_service,
            dispatch_service,
        }
    }
}
