/// Headless software render context.
///
/// Holds the display and every off-screen target as CPU-side color (RGB8)
/// and depth (f32) planes. Rows are stored bottom row first, the same order
/// readbacks deliver them. Resampling is nearest-neighbour.
///
/// Useful on machines without a GPU, and as a reference backend to check
/// what a packed frame should contain.

use glam::{Mat4, UVec2};
use slotmap::SlotMap;
use crate::error::Result;
use crate::capture_bail;
use super::{
    BlitMask, RenderContext, RenderTargetId, RenderTargetKey, TargetBindings, Viewpoint,
};

const SOURCE: &str = "galaxy3d::capture::HeadlessContext";

/// Depth value of a cleared surface (far plane)
const CLEAR_DEPTH: f32 = 1.0;

// ============================================================================
// SoftwareSurface
// ============================================================================

/// CPU color + depth surface
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    size: UVec2,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl SoftwareSurface {
    /// Create a black surface at the far plane
    ///
    /// # Errors
    ///
    /// Returns `ResourceAllocationError` for an empty size or when the planes
    /// cannot be allocated.
    pub fn new(size: UVec2) -> Result<Self> {
        if size.x == 0 || size.y == 0 {
            capture_bail!(SOURCE, ResourceAllocationError,
                "cannot create a {}x{} surface", size.x, size.y);
        }
        let pixels = size.x as usize * size.y as usize;

        let mut color = Vec::new();
        let mut depth = Vec::new();
        let reserved = pixels
            .checked_mul(3)
            .map(|bytes| color.try_reserve_exact(bytes).is_ok() && depth.try_reserve_exact(pixels).is_ok())
            .unwrap_or(false);
        if !reserved {
            capture_bail!(SOURCE, ResourceAllocationError,
                "out of memory for a {}x{} surface", size.x, size.y);
        }
        color.resize(pixels * 3, 0);
        depth.resize(pixels, CLEAR_DEPTH);

        Ok(Self { size, color, depth })
    }

    /// Size in pixels
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// RGB plane, bottom row first
    pub fn color(&self) -> &[u8] {
        &self.color
    }

    /// Depth plane, bottom row first
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Fill both planes with a single value
    pub fn fill(&mut self, rgb: [u8; 3], depth: f32) {
        for pixel in self.color.chunks_exact_mut(3) {
            pixel.copy_from_slice(&rgb);
        }
        self.depth.fill(depth);
    }

    /// Set one pixel; `(0, 0)` is the bottom-left corner.
    ///
    /// Pixels outside the surface are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3], depth: f32) {
        if let Some(index) = self.index(x, y) {
            self.color[index * 3..index * 3 + 3].copy_from_slice(&rgb);
            self.depth[index] = depth;
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.size.x && y < self.size.y {
            Some(y as usize * self.size.x as usize + x as usize)
        } else {
            None
        }
    }

    fn covers(&self, size: UVec2) -> bool {
        size.x <= self.size.x && size.y <= self.size.y
    }

    /// Resample `src_size` of this surface to `dst_size`
    fn resample(&self, src_size: UVec2, dst_size: UVec2, mask: BlitMask) -> ResampledPlanes {
        let pixels = dst_size.x as usize * dst_size.y as usize;
        let mut planes = ResampledPlanes {
            size: dst_size,
            color: mask.contains(BlitMask::COLOR).then(|| Vec::with_capacity(pixels * 3)),
            depth: mask.contains(BlitMask::DEPTH).then(|| Vec::with_capacity(pixels)),
        };

        for y in 0..dst_size.y {
            let sy = nearest(y, dst_size.y, src_size.y);
            for x in 0..dst_size.x {
                let sx = nearest(x, dst_size.x, src_size.x);
                let index = sy as usize * self.size.x as usize + sx as usize;
                if let Some(color) = planes.color.as_mut() {
                    color.extend_from_slice(&self.color[index * 3..index * 3 + 3]);
                }
                if let Some(depth) = planes.depth.as_mut() {
                    depth.push(self.depth[index]);
                }
            }
        }
        planes
    }

    /// Write resampled planes into the lower-left region of this surface
    fn write(&mut self, planes: ResampledPlanes) {
        let row = planes.size.x as usize;
        let stride = self.size.x as usize;
        for y in 0..planes.size.y as usize {
            if let Some(color) = &planes.color {
                let src = &color[y * row * 3..(y + 1) * row * 3];
                self.color[y * stride * 3..y * stride * 3 + row * 3].copy_from_slice(src);
            }
            if let Some(depth) = &planes.depth {
                let src = &depth[y * row..(y + 1) * row];
                self.depth[y * stride..y * stride + row].copy_from_slice(src);
            }
        }
    }
}

/// Nearest source coordinate for destination coordinate `dst`
///
/// Samples at the destination pixel center, as GPU nearest filtering does.
fn nearest(dst: u32, dst_extent: u32, src_extent: u32) -> u32 {
    let scaled = (2 * dst as u64 + 1) * src_extent as u64 / (2 * dst_extent as u64);
    (scaled as u32).min(src_extent.saturating_sub(1))
}

struct ResampledPlanes {
    size: UVec2,
    color: Option<Vec<u8>>,
    depth: Option<Vec<f32>>,
}

// ============================================================================
// HeadlessContext
// ============================================================================

/// Counters exposed for leak checks and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    /// Off-screen targets created
    pub targets_created: u32,
    /// Off-screen targets destroyed
    pub targets_destroyed: u32,
    /// render_frame and blit calls
    pub frames_rendered: u32,
    /// Color and depth readbacks
    pub readbacks: u32,
}

/// Software implementation of `RenderContext`
pub struct HeadlessContext {
    display: SoftwareSurface,
    targets: SlotMap<RenderTargetKey, SoftwareSurface>,
    bindings: TargetBindings,
    model_view: Mat4,
    projection: Mat4,
    viewpoint: Viewpoint,
    stats: ContextStats,
}

impl HeadlessContext {
    /// Create a context whose display is `width` x `height`
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            display: SoftwareSurface::new(UVec2::new(width, height))?,
            targets: SlotMap::with_key(),
            bindings: TargetBindings::display(),
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            viewpoint: Viewpoint::default(),
            stats: ContextStats::default(),
        })
    }

    /// The live display surface
    pub fn display(&self) -> &SoftwareSurface {
        &self.display
    }

    /// Mutable access to the display, to draw the "current frame"
    pub fn display_mut(&mut self) -> &mut SoftwareSurface {
        &mut self.display
    }

    /// An off-screen target, if it is still alive
    pub fn target(&self, target: RenderTargetId) -> Option<&SoftwareSurface> {
        match target {
            RenderTargetId::Display => Some(&self.display),
            RenderTargetId::Offscreen(key) => self.targets.get(key),
        }
    }

    /// Set the model-view matrix reported to the captor
    pub fn set_model_view(&mut self, matrix: Mat4) {
        self.model_view = matrix;
    }

    /// Set the projection matrix reported to the captor
    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection = matrix;
    }

    /// Last viewpoint requested
    pub fn viewpoint(&self) -> Viewpoint {
        self.viewpoint
    }

    /// Number of off-screen targets not yet destroyed
    pub fn live_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Creation/destruction/readback counters
    pub fn stats(&self) -> ContextStats {
        self.stats
    }

    fn surface(&self, target: RenderTargetId, what: &str) -> Result<&SoftwareSurface> {
        match self.target(target) {
            Some(surface) => Ok(surface),
            None => capture_bail!(SOURCE, BackendReadbackError,
                "{}: render target {:?} does not exist", what, target),
        }
    }

    fn surface_mut(&mut self, target: RenderTargetId, what: &str) -> Result<&mut SoftwareSurface> {
        let surface = match target {
            RenderTargetId::Display => Some(&mut self.display),
            RenderTargetId::Offscreen(key) => self.targets.get_mut(key),
        };
        match surface {
            Some(surface) => Ok(surface),
            None => capture_bail!(SOURCE, BackendReadbackError,
                "{}: render target {:?} does not exist", what, target),
        }
    }

    /// Bound read target, checked to cover `size`
    fn read_surface(&self, size: UVec2, what: &str) -> Result<&SoftwareSurface> {
        let surface = self.surface(self.bindings.read, what)?;
        if !surface.covers(size) {
            capture_bail!(SOURCE, BackendReadbackError,
                "{}: {}x{} exceeds the {}x{} read target",
                what, size.x, size.y, surface.size.x, surface.size.y);
        }
        Ok(surface)
    }

    fn transfer(&mut self, source: RenderTargetId, src_size: UVec2, dst_size: UVec2, mask: BlitMask, what: &str) -> Result<()> {
        if dst_size.x == 0 || dst_size.y == 0 || src_size.x == 0 || src_size.y == 0 {
            capture_bail!(SOURCE, BackendReadbackError, "{}: empty region", what);
        }

        let src = self.surface(source, what)?;
        if !src.covers(src_size) {
            capture_bail!(SOURCE, BackendReadbackError,
                "{}: source region {}x{} exceeds {}x{}",
                what, src_size.x, src_size.y, src.size.x, src.size.y);
        }
        let planes = src.resample(src_size, dst_size, mask);

        let dst = self.surface_mut(self.bindings.draw, what)?;
        if !dst.covers(dst_size) {
            capture_bail!(SOURCE, BackendReadbackError,
                "{}: destination region {}x{} exceeds {}x{}",
                what, dst_size.x, dst_size.y, dst.size.x, dst.size.y);
        }
        dst.write(planes);

        self.stats.frames_rendered += 1;
        Ok(())
    }
}

impl RenderContext for HeadlessContext {
    fn display_size(&self) -> UVec2 {
        self.display.size()
    }

    fn create_render_target(&mut self, size: UVec2) -> Result<RenderTargetId> {
        let surface = SoftwareSurface::new(size)?;
        let key = self.targets.insert(surface);
        self.stats.targets_created += 1;
        crate::capture_debug!(SOURCE, "Created {}x{} render target", size.x, size.y);
        Ok(RenderTargetId::Offscreen(key))
    }

    fn destroy_render_target(&mut self, target: RenderTargetId) -> Result<()> {
        let key = match target {
            RenderTargetId::Display => capture_bail!(SOURCE, ResourceAllocationError,
                "the display target cannot be destroyed"),
            RenderTargetId::Offscreen(key) => key,
        };
        if self.targets.remove(key).is_none() {
            capture_bail!(SOURCE, ResourceAllocationError,
                "render target {:?} was already destroyed", target);
        }
        // A destroyed target falls back to the display, as deleting a bound framebuffer does
        if self.bindings.read == target {
            self.bindings.read = RenderTargetId::Display;
        }
        if self.bindings.draw == target {
            self.bindings.draw = RenderTargetId::Display;
        }
        self.stats.targets_destroyed += 1;
        Ok(())
    }

    fn bindings(&self) -> TargetBindings {
        self.bindings
    }

    fn bind(&mut self, bindings: TargetBindings) {
        self.bindings = bindings;
    }

    fn render_frame(&mut self, size: UVec2) -> Result<()> {
        let display_size = self.display.size();
        self.transfer(RenderTargetId::Display, display_size, size, BlitMask::COLOR, "render_frame")
    }

    fn blit(&mut self, src_size: UVec2, dst_size: UVec2, mask: BlitMask) -> Result<()> {
        self.transfer(self.bindings.read, src_size, dst_size, mask, "blit")
    }

    fn read_rgb(&mut self, size: UVec2, dst: &mut [u8]) -> Result<()> {
        let row = size.x as usize * 3;
        if dst.len() != row * size.y as usize {
            capture_bail!(SOURCE, BackendReadbackError,
                "read_rgb: destination holds {} bytes, {}x{} needs {}",
                dst.len(), size.x, size.y, row * size.y as usize);
        }
        let surface = self.read_surface(size, "read_rgb")?;
        let stride = surface.size.x as usize * 3;
        for (y, out) in dst.chunks_exact_mut(row).enumerate() {
            out.copy_from_slice(&surface.color[y * stride..y * stride + row]);
        }
        self.stats.readbacks += 1;
        Ok(())
    }

    fn read_depth(&mut self, size: UVec2, dst: &mut [f32]) -> Result<()> {
        let row = size.x as usize;
        if dst.len() != row * size.y as usize {
            capture_bail!(SOURCE, BackendReadbackError,
                "read_depth: destination holds {} samples, {}x{} needs {}",
                dst.len(), size.x, size.y, row * size.y as usize);
        }
        let surface = self.read_surface(size, "read_depth")?;
        let stride = surface.size.x as usize;
        for (y, out) in dst.chunks_exact_mut(row).enumerate() {
            out.copy_from_slice(&surface.depth[y * stride..y * stride + row]);
        }
        self.stats.readbacks += 1;
        Ok(())
    }

    fn model_view_matrix(&self) -> Mat4 {
        self.model_view
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    fn set_viewpoint(&mut self, viewpoint: Viewpoint) {
        self.viewpoint = viewpoint;
    }
}

#[cfg(test)]
#[path = "headless_context_tests.rs"]
mod tests;
