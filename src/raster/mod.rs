pub mod buffer;
pub mod composite;
pub mod shapes;
