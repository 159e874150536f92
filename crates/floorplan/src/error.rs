use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Segmentation model error: {0}")]
    Model(String),

    #[error("Strategy '{0}' produced no walls or rooms")]
    EmptyGeometry(String),

    #[error("Не удалось обнаружить комнаты на плане. Проверьте качество изображения.")]
    NoRoomsFound,

    #[error("Invalid record '{0}'")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
