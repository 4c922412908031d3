use super::*;
use crate::mesh::{IndexBuffer, Mesh, Submesh, VertexBuffer};
use crate::test_utils::*;

fn request_of(mesh: &Mesh) -> LodResult<BuildRequest> {
  snapshot(mesh, single_level(0.5), RequestId::next())
}

#[test]
fn test_snapshot_private_submesh() {
  let mesh = quad();
  let request = request_of(&mesh).unwrap();

  assert_eq!(request.mesh_id, mesh.id());
  assert_eq!(request.mesh_name, "quad");
  assert!(request.shared_vertices.is_none());
  assert_eq!(request.submeshes.len(), 1);

  let submesh = &request.submeshes[0];
  assert!(!submesh.uses_shared_vertices());
  assert_eq!(submesh.indices.width, IndexWidth::U16);
  assert_eq!(submesh.indices.index_count, 6);
  assert_eq!(submesh.indices.triangle_count(), 2);
  assert_eq!(request.submesh_vertex_count(0), 4);

  match &submesh.vertices {
    SubmeshVertices::Private(vertices) => {
      assert_eq!(vertices.positions[2], Vec3::new(1.0, 1.0, 0.0));
    }
    SubmeshVertices::Shared => panic!("quad uses private vertices"),
  }
}

#[test]
fn test_snapshot_copies_shared_vertices_once() {
  let mesh = cube();
  let request = request_of(&mesh).unwrap();

  assert_eq!(request.submeshes.len(), 6);
  assert!(request.submeshes.iter().all(SubmeshSnapshot::uses_shared_vertices));
  assert_eq!(
    request.shared_vertices.as_ref().map(VertexSnapshot::vertex_count),
    Some(8)
  );
  for i in 0..6 {
    assert_eq!(request.submesh_vertex_count(i), 8);
  }
}

#[test]
fn test_snapshot_interleaved_positions() {
  // 20-byte vertices: 4 bytes padding, position, 4 bytes padding
  let mut bytes = Vec::new();
  for p in [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]] {
    bytes.extend_from_slice(&[0xAA; 4]);
    for c in p {
      bytes.extend_from_slice(&c.to_ne_bytes());
    }
    bytes.extend_from_slice(&[0xBB; 4]);
  }
  let mesh = Mesh::new("interleaved").with_submesh(Submesh::private(
    VertexBuffer::interleaved(bytes, 20, 4),
    IndexBuffer::from_u32(&[0, 1, 2]),
  ));

  let request = request_of(&mesh).unwrap();
  match &request.submeshes[0].vertices {
    SubmeshVertices::Private(vertices) => assert_eq!(
      vertices.positions,
      vec![
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(4.0, 5.0, 6.0),
        Vec3::new(7.0, 8.0, 9.0),
      ]
    ),
    SubmeshVertices::Shared => panic!("expected private vertices"),
  }
  assert_eq!(request.submeshes[0].indices.width, IndexWidth::U32);
}

#[test]
fn test_snapshot_honors_index_start() {
  let mesh = Mesh::new("ranged").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
    IndexBuffer::from_u16(&[7, 7, 2, 1, 0]).with_range(2, 3),
  ));

  let request = request_of(&mesh).unwrap();
  let indices = &request.submeshes[0].indices;
  assert_eq!(indices.index_count, 3);
  assert_eq!((indices.get(0), indices.get(1), indices.get(2)), (2, 1, 0));
}

#[test]
fn test_snapshot_rejects_bad_position_size() {
  let mut vertices = VertexBuffer::from_positions(&[[0.0, 0.0, 0.0]]);
  vertices.position_size = 16;
  let mesh = Mesh::new("bad").with_submesh(Submesh::private(vertices, IndexBuffer::from_u16(&[])));

  assert_eq!(
    request_of(&mesh).unwrap_err(),
    LodError::UnexpectedVertexStride {
      expected: 12,
      found: 16,
    }
  );
}

#[test]
fn test_snapshot_rejects_short_vertex_stride() {
  let mesh = Mesh::new("bad").with_submesh(Submesh::private(
    VertexBuffer::interleaved(vec![0u8; 40], 8, 0),
    IndexBuffer::from_u16(&[]),
  ));

  assert!(matches!(
    request_of(&mesh),
    Err(LodError::UnexpectedVertexStride { .. })
  ));
}

#[test]
fn test_snapshot_rejects_short_buffers() {
  let mut vertices = VertexBuffer::from_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
  vertices.vertex_count = 3;
  let mesh = Mesh::new("short").with_submesh(Submesh::private(vertices, IndexBuffer::from_u16(&[])));
  assert_eq!(
    request_of(&mesh).unwrap_err(),
    LodError::BufferTooSmall {
      what: "vertex",
      required: 36,
      available: 24,
    }
  );

  let mesh = Mesh::new("short").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[[0.0, 0.0, 0.0]]),
    IndexBuffer::from_u16(&[0, 0, 0]).with_range(1, 3),
  ));
  assert_eq!(
    request_of(&mesh).unwrap_err(),
    LodError::BufferTooSmall {
      what: "index",
      required: 8,
      available: 6,
    }
  );
}

#[test]
fn test_snapshot_rejects_unsupported_index_width() {
  let bytes = [0u8, 1, 2];
  let data = IndexData {
    bytes: &bytes,
    index_size: 1,
    index_start: 0,
    index_count: 3,
  };
  assert_eq!(
    copy_indices(&data).unwrap_err(),
    LodError::UnsupportedIndexWidth(1)
  );
}

#[test]
fn test_snapshot_rejects_missing_shared_vertices() {
  let mesh = Mesh::new("no_shared").with_submesh(Submesh::shared(IndexBuffer::from_u16(&[])));
  assert_eq!(
    request_of(&mesh).unwrap_err(),
    LodError::MissingSharedVertices(0)
  );
}

#[test]
fn test_snapshot_rejects_out_of_range_index() {
  let mesh = Mesh::new("oob").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
    IndexBuffer::from_u16(&[0, 1, 3]),
  ));
  assert_eq!(
    request_of(&mesh).unwrap_err(),
    LodError::IndexOutOfRange {
      submesh: 0,
      index: 3,
      vertex_count: 3,
    }
  );
}

#[test]
fn test_snapshot_empty_submesh() {
  let request = request_of(&empty_submesh()).unwrap();
  assert_eq!(request.submesh_vertex_count(0), 0);
  assert_eq!(request.submeshes[0].indices.index_count, 0);
  assert!(request.submeshes[0].indices.bytes.is_empty());
}
