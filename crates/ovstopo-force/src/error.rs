#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("link {link_index} references a node outside the simulation")]
    MissingEndpoint { link_index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
