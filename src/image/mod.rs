pub mod f32;
pub mod traits;
pub mod volume;

pub use self::f32::ImageF32;
pub use self::traits::Raster;
pub use self::volume::{rescale_intensity, LabelVolume, SubVolume, Volume, VolumeF32};
