use crate::registry::OverlayHandle;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid overlay callback handle: {0}")]
    UnknownHandle(OverlayHandle),
    #[error("GUI library unavailable: {0}")]
    GuiUnavailable(String),
    #[error("host GPU call failed")]
    Gpu(#[source] BoxError),
}

impl OverlayError {
    pub fn gpu<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Gpu(Box::new(err))
    }
}
