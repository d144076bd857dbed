use std::sync::Arc;

use reservas_core::{BookingRules, Identity, ReservationGateway, Shell, SpaceGateway};

/// Where the development proxy forwards to.
#[derive(Clone)]
pub struct ProxyTarget {
    pub prefix: String,
    pub target: String,
    pub http: reqwest::Client,
}

#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Shell>,
    pub spaces: Arc<dyn SpaceGateway>,
    pub reservations: Arc<dyn ReservationGateway>,
    pub identity: Identity,
    pub booking: BookingRules,
    pub proxy: Option<ProxyTarget>,
}

impl AppState {
    pub fn new(
        spaces: Arc<dyn SpaceGateway>,
        reservations: Arc<dyn ReservationGateway>,
        identity: Identity,
        booking: BookingRules,
    ) -> Self {
        Self {
            shell: Arc::new(Shell::new(booking.page_size)),
            spaces,
            reservations,
            identity,
            booking,
            proxy: None,
        }
    }

    pub fn with_proxy(mut self, proxy: ProxyTarget) -> Self {
        self.proxy = Some(proxy);
        self
    }
}
