mod gallery;

pub use gallery::write_gallery;
