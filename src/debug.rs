//! Debug-draw hook
//!
//! The simulation never renders. It emits line segments through [`DebugDraw`];
//! [`LineBatch`] collects them into a vertex buffer a renderer can upload as-is.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

use crate::sim::bounds::BoundingBox;

/// Sink for debug geometry
pub trait DebugDraw {
    fn line(&mut self, start: DVec3, end: DVec3, color: [f32; 4]);

    /// Draw the 12 edges of a box
    fn draw_box(&mut self, bounds: &BoundingBox, color: [f32; 4]) {
        for (start, end) in bounds.edges() {
            self.line(start, end, color);
        }
    }
}

/// Line-list vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: DVec3, color: [f32; 4]) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            color,
        }
    }
}

/// Collects debug lines as a line-list vertex buffer
#[derive(Debug, Clone, Default)]
pub struct LineBatch {
    vertices: Vec<LineVertex>,
}

impl LineBatch {
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl DebugDraw for LineBatch {
    fn line(&mut self, start: DVec3, end: DVec3, color: [f32; 4]) {
        self.vertices.push(LineVertex::new(start, color));
        self.vertices.push(LineVertex::new(end, color));
    }
}

/// Colors for debug geometry
pub mod colors {
    pub const ARENA_RIM: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
    pub const ACTIVE_BODY: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const STATIC_BODY: [f32; 4] = [0.7, 0.7, 0.8, 1.0];
    pub const FINISHED_BODY: [f32; 4] = [1.0, 0.4, 0.2, 1.0];
}
