/// Mock RenderContext for unit tests (no GPU required)
///
/// Returns a uniform color, a depth gradient and configurable matrices.
/// Records every call, counts target allocations/releases and can be told
/// to fail allocation or either readback.

use glam::{Mat4, UVec2};
use slotmap::SlotMap;
use crate::error::{Error, Result};
use super::{
    BlitMask, RenderContext, RenderTargetId, RenderTargetKey, TargetBindings, Viewpoint,
};

#[derive(Debug)]
pub struct MockRenderContext {
    pub display_size: UVec2,
    pub color: [u8; 3],
    pub model_view: Mat4,
    pub projection: Mat4,
    pub fail_allocation: bool,
    pub fail_color_readback: bool,
    pub fail_depth_readback: bool,
    pub viewpoint: Option<Viewpoint>,
    pub last_blit_mask: Option<BlitMask>,
    /// Names of the calls received, in order
    pub calls: Vec<String>,
    pub allocated: u32,
    pub released: u32,
    targets: SlotMap<RenderTargetKey, UVec2>,
    bindings: TargetBindings,
}

impl MockRenderContext {
    pub fn new(display_width: u32, display_height: u32) -> Self {
        Self {
            display_size: UVec2::new(display_width, display_height),
            color: [255, 0, 0],
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            fail_allocation: false,
            fail_color_readback: false,
            fail_depth_readback: false,
            viewpoint: None,
            last_blit_mask: None,
            calls: Vec::new(),
            allocated: 0,
            released: 0,
            targets: SlotMap::with_key(),
            bindings: TargetBindings::display(),
        }
    }

    /// Number of targets allocated and not released
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Number of recorded calls with the given name
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.iter().filter(|call| call.as_str() == name).count()
    }

    /// Depth value the mock reports for pixel `index` of `pixels`
    pub fn depth_at(index: usize, pixels: usize) -> f32 {
        index as f32 / pixels as f32
    }

    fn check_offscreen_read(&self, what: &str) -> Result<()> {
        match self.bindings.read {
            RenderTargetId::Offscreen(key) if self.targets.contains_key(key) => Ok(()),
            other => Err(Error::BackendReadbackError(format!(
                "{} with read binding {:?}", what, other
            ))),
        }
    }
}

impl RenderContext for MockRenderContext {
    fn display_size(&self) -> UVec2 {
        self.display_size
    }

    fn create_render_target(&mut self, size: UVec2) -> Result<RenderTargetId> {
        self.calls.push("create_render_target".to_string());
        if self.fail_allocation {
            return Err(Error::ResourceAllocationError("mock allocation failure".to_string()));
        }
        self.allocated += 1;
        Ok(RenderTargetId::Offscreen(self.targets.insert(size)))
    }

    fn destroy_render_target(&mut self, target: RenderTargetId) -> Result<()> {
        self.calls.push("destroy_render_target".to_string());
        match target {
            RenderTargetId::Offscreen(key) if self.targets.remove(key).is_some() => {
                self.released += 1;
                Ok(())
            }
            other => Err(Error::ResourceAllocationError(format!("unknown target {:?}", other))),
        }
    }

    fn bindings(&self) -> TargetBindings {
        self.bindings
    }

    fn bind(&mut self, bindings: TargetBindings) {
        self.calls.push("bind".to_string());
        self.bindings = bindings;
    }

    fn render_frame(&mut self, _size: UVec2) -> Result<()> {
        self.calls.push("render_frame".to_string());
        Ok(())
    }

    fn blit(&mut self, _src_size: UVec2, _dst_size: UVec2, mask: BlitMask) -> Result<()> {
        self.calls.push("blit".to_string());
        self.last_blit_mask = Some(mask);
        Ok(())
    }

    fn read_rgb(&mut self, _size: UVec2, dst: &mut [u8]) -> Result<()> {
        self.calls.push("read_rgb".to_string());
        self.check_offscreen_read("read_rgb")?;
        if self.fail_color_readback {
            return Err(Error::BackendReadbackError("mock color readback failure".to_string()));
        }
        for pixel in dst.chunks_exact_mut(3) {
            pixel.copy_from_slice(&self.color);
        }
        Ok(())
    }

    fn read_depth(&mut self, _size: UVec2, dst: &mut [f32]) -> Result<()> {
        self.calls.push("read_depth".to_string());
        self.check_offscreen_read("read_depth")?;
        if self.fail_depth_readback {
            return Err(Error::BackendReadbackError("mock depth readback failure".to_string()));
        }
        let pixels = dst.len();
        for (index, sample) in dst.iter_mut().enumerate() {
            *sample = Self::depth_at(index, pixels);
        }
        Ok(())
    }

    fn model_view_matrix(&self) -> Mat4 {
        self.model_view
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    fn set_viewpoint(&mut self, viewpoint: Viewpoint) {
        self.calls.push("set_viewpoint".to_string());
        self.viewpoint = Some(viewpoint);
    }
}
