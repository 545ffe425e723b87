//! Frame lifecycle scenarios for the component registry

mod frame_lifecycle;
