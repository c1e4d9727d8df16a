/// Errors surfaced by the render session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing to the terminal failed.
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),
    /// The ticker thread could not be started.
    #[error("failed to spawn render ticker: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
