#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    #[error("unknown node: {node_id}")]
    UnknownNode { node_id: String },

    #[error("node {node_id} is not the one being dragged")]
    NotDragging { node_id: String },

    #[error("transform is not invertible (determinant {determinant})")]
    SingularTransform { determinant: f64 },

    #[error("invalid SVG transform `{input}`: {message}")]
    InvalidTransform { input: String, message: String },

    #[error("link {link_id} references a node outside the graph")]
    DanglingLink { link_id: String },

    #[error(transparent)]
    Core(#[from] ovstopo_core::Error),

    #[error(transparent)]
    Force(#[from] ovstopo_force::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
