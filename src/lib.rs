pub mod config;
pub mod debug;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod result;
pub mod scan;
pub mod validation;
pub mod processing {
    pub mod blur;
    pub mod chassis;
    pub mod chemistry;
    pub mod composite;
    pub mod grain;
    pub mod layout;
    pub mod mask;
    pub mod normal_map;
    pub mod optics;
    pub mod photo_block;
    pub mod resample;
}

pub use config::{ProfileSet, StyleParameters};
pub use debug::{DebugSink, DirectorySink, NullSink};
pub use error::{Error, Result, ValidationError};
pub use pipeline::{Overrides, ProcessRequest, process, process_with};
pub use processing::layout::{Layout, Rect};
pub use result::{ResultBundle, StyleInfo};
pub use validation::{validate, validate_dimensions};
