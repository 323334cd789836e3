use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("View event channel is closed")]
    Closed,
}
