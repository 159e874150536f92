pub mod geojson;
pub mod raster;

pub use raster::{load_plan_image, load_plan_image_from_base64, load_plan_image_from_bytes};
