pub mod capture;
pub mod csv;
pub mod domain;
pub mod ports;

pub use domain::{
    AnalyticsEvent, ContactSubmission, EventType, FieldError, NewContactSubmission,
    UnknownEventType,
};
pub use ports::{AnalyticsStore, ContactStore, PortError, PortResult};
