//! Canvas, line and triangle rasterization.

pub mod canvas;
pub mod line;
pub mod rasterizer;

pub use canvas::{Canvas, OutputError, Viewport, WriteStats};
pub use line::BresenhamLine;
pub use rasterizer::{
    rasterize_triangle, ColorShader, DepthShader, FragmentShader, PhongShader, TriangleSetup,
    Vertex,
};
