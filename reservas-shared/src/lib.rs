pub mod codec;
pub mod models;

pub use models::reservation::{Reservation, ReservationOwner, SpaceRef};
pub use models::space::Space;
pub use models::wire::{
    CancelReservationResponse, CreateReservationRequest, CreateReservationResponse,
    CreatedReservation, Listing, ReservationDetails,
};
