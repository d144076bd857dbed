pub mod admin;
pub mod availability;
pub mod booking;
pub mod filters;
pub mod gateway;
pub mod results;
pub mod shell;

use chrono::NaiveDateTime;

pub use availability::{CoworkingPeriod, HourSelection, HourSlot, Interval, Occupancy, PERIODS};
pub use booking::{BookingRules, BookingSession, Confirmation, Identity, PeriodSlot, SubmitError};
pub use filters::{FilterField, FilterOptions, SpaceFilter, SpaceQuery};
pub use gateway::{GatewayError, GatewayResult, ReservationGateway, SpaceGateway};
pub use results::{LoadOutcome, ResultsView, SpacePage};
pub use shell::{FilterScope, Shell, ShellState, View};

/// Local validation failures. The display text is what the operator sees.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Por favor ingrese un título para la reserva")]
    MissingTitle,
    #[error("Por favor seleccione un período de tiempo")]
    MissingPeriod,
    #[error("Por favor seleccione al menos una hora")]
    MissingHours,
    #[error("Solo puedes seleccionar horas consecutivas")]
    NonConsecutiveHours,
    #[error("Solo puedes quitar la primera o la última hora seleccionada")]
    WouldSplitSelection,
    #[error("Este horario ya está ocupado. Por favor seleccione otro.")]
    SlotOccupied,
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("Hour {0} is outside the bookable grid")]
    HourOutOfRange(u32),
    #[error("Unknown period: {0}")]
    UnknownPeriod(u8),
    #[error("Unknown filter field: {0}")]
    UnknownFilterField(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
pub(crate) mod testing;
