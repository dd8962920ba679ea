pub mod config;
pub mod dimensions;
pub mod error;
pub mod scene {
    pub mod draw;
    pub mod layout;
    pub mod mapping;
    pub mod noise;
    pub mod paint;
    pub mod world;
}
pub mod render {
    pub mod loader;
    pub mod viewer;
}
