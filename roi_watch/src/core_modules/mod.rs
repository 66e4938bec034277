pub mod frame;
pub mod frame_differencer;
pub mod motion_mask;
pub mod region;
pub mod region_extractor;
pub mod region_filter;
pub mod roi_capture;
pub mod utils;
