//! Wavefront OBJ output for deformed frames.

use std::io::Write;
use std::path::Path;

use swim_core::Result;

use crate::pipeline::RenderMesh;
use crate::scene::{SceneContext, SwimmerFrame};

/// Write every swimmer of one frame as a separate OBJ object.
///
/// Vertices come from each instance's [`RenderMesh`], which
/// [`SceneContext::frame`] refreshes with the deformed positions. Faces are
/// offset past the vertices already written (OBJ indices are 1-based and global).
pub fn write_frame_obj<W: Write>(out: &mut W, scene: &SceneContext, frames: &[SwimmerFrame]) -> Result<()> {
    writeln!(out, "# swimpath frame, {} swimmers", frames.len())?;
    let mut base = 1u32;
    for frame in frames {
        let Some(instance) = scene.swimmer(frame.key) else {
            continue;
        };
        writeln!(out, "o {}", frame.id)?;
        write_render_mesh(out, &instance.render, base)?;
        base += instance.render.vertices.len() as u32;
    }
    Ok(())
}

fn write_render_mesh<W: Write>(out: &mut W, mesh: &RenderMesh, base: u32) -> std::io::Result<()> {
    for v in &mesh.vertices {
        writeln!(out, "v {:.5} {:.5} {:.5}", v.position[0], v.position[1], v.position[2])?;
    }
    for v in &mesh.vertices {
        writeln!(out, "vt {:.5} {:.5}", v.uv[0], v.uv[1])?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + base, tri[1] + base, tri[2] + base);
        writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
    }
    Ok(())
}

pub fn export_frame_obj(path: &Path, scene: &SceneContext, frames: &[SwimmerFrame]) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_frame_obj(&mut file, scene, frames)?;
    file.flush()?;
    Ok(())
}
