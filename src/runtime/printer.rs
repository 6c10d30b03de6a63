//! Text rendering of object graphs.
//!
//! Rendering recurses through pair edges and is meant for acyclic graphs. A
//! cycle (or a very deep chain) runs into [`MAX_RENDER_DEPTH`] and is reported
//! as [`VmError::RenderDepthExceeded`].

use std::fmt::Write;

use crate::runtime::{
    gc::{GcHandle, GcHeap, HeapObject},
    vm_error::VmError,
};

pub const MAX_RENDER_DEPTH: usize = 512;

/// Renders `handle` as `42` for integers and `(head, tail)` for pairs.
pub fn render(heap: &GcHeap, handle: GcHandle) -> Result<String, VmError> {
    let mut out = String::new();
    render_into(heap, handle, 0, &mut out)?;
    Ok(out)
}

fn render_into(
    heap: &GcHeap,
    handle: GcHandle,
    depth: usize,
    out: &mut String,
) -> Result<(), VmError> {
    if depth >= MAX_RENDER_DEPTH {
        return Err(VmError::RenderDepthExceeded {
            limit: MAX_RENDER_DEPTH,
        });
    }
    match *heap.get(handle)? {
        HeapObject::Int(value) => {
            let _ = write!(out, "{value}");
        }
        HeapObject::Pair { head, tail } => {
            out.push('(');
            render_into(heap, head, depth + 1, out)?;
            out.push_str(", ");
            render_into(heap, tail, depth + 1, out)?;
            out.push(')');
        }
    }
    Ok(())
}
