// mesh.rs — UV sphere viewed from the inside

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Builds an equirectangular-mapped sphere. X is negated so the winding is
/// inverted and the texture faces the camera sitting at the origin.
pub fn build_sphere(radius: f32, lat_segments: usize, lon_segments: usize) -> SphereMesh {
    let mut vertices = Vec::with_capacity((lat_segments + 1) * (lon_segments + 1));
    let mut indices = Vec::with_capacity(lat_segments * lon_segments * 6);

    for i in 0..=lat_segments {
        let theta = std::f32::consts::PI * (i as f32) / (lat_segments as f32);
        let y = radius * theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon_segments {
            let phi = 2.0 * std::f32::consts::PI * (j as f32) / (lon_segments as f32);

            // scale -1 on X: interior-facing
            let x = -radius * phi.cos() * sin_t;
            let z = radius * phi.sin() * sin_t;

            let u = (j as f32) / (lon_segments as f32);
            let v = (i as f32) / (lat_segments as f32);

            vertices.push(Vertex {
                position: [x, y, z],
                uv: [u, v],
            });
        }
    }

    for i in 0..lat_segments {
        for j in 0..lon_segments {
            let a = (i * (lon_segments + 1) + j) as u32;
            let b = a + (lon_segments + 1) as u32;

            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }

    SphereMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_and_index_counts() {
        let m = build_sphere(500.0, 40, 60);
        assert_eq!(m.vertices.len(), 41 * 61);
        assert_eq!(m.indices.len(), 40 * 60 * 6);
    }

    #[test]
    fn vertices_lie_on_sphere() {
        let m = build_sphere(500.0, 16, 32);
        for v in &m.vertices {
            let r = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - 500.0).abs() < 1e-2, "radius {r}");
        }
    }

    #[test]
    fn indices_in_range_and_uvs_normalized() {
        let m = build_sphere(1.0, 8, 8);
        let n = m.vertices.len() as u32;
        assert!(m.indices.iter().all(|&i| i < n));
        for v in &m.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }
}
