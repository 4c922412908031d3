use std::collections::HashMap;
use std::time::Duration;

use super::*;
use crate::error::LodError;
use crate::inject::InjectorState;
use crate::mesh::Mesh;
use crate::test_utils::*;
use crate::threading::{InlineWorkQueue, RayonWorkQueue, WorkerConfig};
use crate::types::ReductionMethod;

fn inline_pipeline() -> (LodGenerator, LodInjector) {
  lod_pipeline(Arc::new(InlineWorkQueue), CostParams::default())
}

fn registry_of(meshes: Vec<Mesh>) -> HashMap<MeshId, Mesh> {
  meshes.into_iter().map(|mesh| (mesh.id(), mesh)).collect()
}

#[test]
fn test_run_build_quad() {
  let mesh = quad();
  let request = snapshot(&mesh, single_level(1.0), RequestId::next()).unwrap();
  let build = run_build(request, &CostParams::default());

  assert_eq!(build.mesh_id, mesh.id());
  assert_eq!(build.submesh_count(), 1);
  assert_eq!(build.level_count(), 1);
  assert_eq!(build.submeshes[0][0].indices(), vec![0, 0, 0]);
  assert_eq!(build.unique_vertex_count, 4);
  assert_eq!(build.triangles_per_level(), vec![1]);
}

#[test]
fn test_build_rejects_invalid_config() {
  let (generator, injector) = inline_pipeline();
  let mesh = quad();

  assert_eq!(
    generator.build(&mesh, LodConfig::new()),
    Err(LodError::EmptyLodLevels)
  );
  let unsorted = LodConfig::new()
    .with_level(20.0, ReductionMethod::Proportional(0.5))
    .with_level(10.0, ReductionMethod::Proportional(0.7));
  assert!(matches!(
    generator.build(&mesh, unsorted),
    Err(LodError::UnsortedLodLevels { .. })
  ));
  assert_eq!(injector.queued_count(), 0);
}

#[test]
fn test_build_rejects_bad_data_before_submitting() {
  let (generator, injector) = inline_pipeline();
  let mut mesh = quad();
  if let Some(vertices) = mesh.submeshes[0].vertices.as_mut() {
    vertices.position_size = 8;
  }

  assert!(matches!(
    generator.build(&mesh, single_level(0.5)),
    Err(LodError::UnexpectedVertexStride { .. })
  ));
  assert_eq!(injector.queued_count(), 0);
}

#[test]
fn test_quad_end_to_end() {
  let (generator, mut injector) = inline_pipeline();
  let mesh = quad();
  let id = mesh.id();
  let mut registry = registry_of(vec![mesh]);

  let request_id = generator.build(&registry[&id], single_level(1.0)).unwrap();
  assert_eq!(injector.queued_count(), 1);

  let report = injector.process_frame(&mut registry);
  assert_eq!(report.injected, vec![request_id]);
  assert_eq!(injector.state, InjectorState::Idle);

  let mesh = &registry[&id];
  let face_lists = mesh.lod_face_lists(0);
  assert_eq!(face_lists.len(), 1);
  assert_eq!(face_lists[0].index_count, 3);
  assert_eq!(
    face_lists[0].index_buffer.as_ref().map(|b| b.indices()),
    Some(vec![0, 0, 0])
  );
}

#[test]
fn test_cube_end_to_end() {
  let (generator, mut injector) = inline_pipeline();
  let mesh = cube();
  let id = mesh.id();
  let mut registry = registry_of(vec![mesh]);

  generator.build(&registry[&id], single_level(0.5)).unwrap();
  injector.process_frame(&mut registry);

  let mesh = &registry[&id];
  for submesh in 0..6 {
    let face_lists = mesh.lod_face_lists(submesh);
    assert_eq!(face_lists.len(), 1);
    // One surviving triangle or the dummy: three indices either way
    assert_eq!(face_lists[0].index_count, 3);
  }
  assert_eq!(mesh.lod_level_count(), 1);
}

#[test]
fn test_rebuild_replaces_levels() {
  let (generator, mut injector) = inline_pipeline();
  let mesh = grid(5);
  let id = mesh.id();
  let mut registry = registry_of(vec![mesh]);

  generator.build(&registry[&id], three_levels()).unwrap();
  injector.process_frame(&mut registry);
  assert_eq!(registry[&id].lod_level_count(), 3);

  generator.build(&registry[&id], single_level(0.5)).unwrap();
  generator.build(&registry[&id], single_level(0.5)).unwrap();
  injector.process_frame(&mut registry);
  assert_eq!(registry[&id].lod_level_count(), 1);
  assert_eq!(registry[&id].lod_face_lists(0).len(), 1);
}

#[test]
fn test_dropped_injector_discards_result() {
  let (generator, injector) = inline_pipeline();
  drop(injector);

  // The worker's send fails; the build is logged and dropped
  assert!(generator.build(&quad(), single_level(0.5)).is_ok());
}

#[test]
fn test_rayon_pipeline_completes_all_builds() {
  let queue = RayonWorkQueue::with_config(&WorkerConfig::new().with_threads(2)).unwrap();
  let (generator, mut injector) = lod_pipeline(Arc::new(queue), CostParams::default());

  let meshes = vec![quad(), cube(), grid(6), grid(10), seam_quads()];
  let ids: Vec<MeshId> = meshes.iter().map(|m| m.id()).collect();
  let mut registry = registry_of(meshes);

  for id in &ids {
    generator.build(&registry[id], three_levels()).unwrap();
  }

  let mut injected = 0;
  for _ in 0..5000 {
    injected += injector.process_frame(&mut registry).injected.len();
    if injected == ids.len() {
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }

  assert_eq!(injected, ids.len());
  for id in &ids {
    assert_eq!(registry[id].lod_level_count(), 3);
  }
}
