/// Scoped render target binding.
///
/// Binding a capture target mutates global renderer state. `BoundTarget`
/// saves the previous read/draw bindings and puts them back when dropped,
/// so every exit path (including `?` on a failed readback) restores them.

use std::ops::{Deref, DerefMut};
use super::{RenderContext, TargetBindings};

/// Render context with temporary bindings applied
pub struct BoundTarget<'a> {
    context: &'a mut dyn RenderContext,
    previous: TargetBindings,
}

impl<'a> BoundTarget<'a> {
    /// Apply `bindings` until the returned guard is dropped
    pub fn bind(context: &'a mut dyn RenderContext, bindings: TargetBindings) -> Self {
        let previous = context.bindings();
        context.bind(bindings);
        Self { context, previous }
    }

    /// Bindings that will be restored on drop
    pub fn previous(&self) -> TargetBindings {
        self.previous
    }
}

impl<'a> Deref for BoundTarget<'a> {
    type Target = dyn RenderContext + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.context
    }
}

impl<'a> DerefMut for BoundTarget<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.context
    }
}

impl Drop for BoundTarget<'_> {
    fn drop(&mut self) {
        self.context.bind(self.previous);
    }
}
