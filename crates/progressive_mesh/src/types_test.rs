use super::*;

// Identifier tests
#[test]
fn test_mesh_id_is_unique() {
  let a = MeshId::new();
  let b = MeshId::new();
  assert_ne!(a, b);
  assert_eq!(MeshId::from_raw(7).raw(), 7);
}

#[test]
fn test_request_id_increments() {
  let a = RequestId::next();
  let b = RequestId::next();
  assert!(b.raw() > a.raw());
}

// Index width tests
#[test]
fn test_index_width_from_size() {
  assert_eq!(IndexWidth::from_size(2), Ok(IndexWidth::U16));
  assert_eq!(IndexWidth::from_size(4), Ok(IndexWidth::U32));
  assert_eq!(
    IndexWidth::from_size(1),
    Err(LodError::UnsupportedIndexWidth(1))
  );
  assert_eq!(
    IndexWidth::from_size(8),
    Err(LodError::UnsupportedIndexWidth(8))
  );
}

#[test]
fn test_index_width_write_read() {
  let mut bytes = Vec::new();
  IndexWidth::U16.write(&mut bytes, 513);
  IndexWidth::U16.write(&mut bytes, 7);
  assert_eq!(bytes.len(), 4);
  assert_eq!(IndexWidth::U16.read(&bytes, 0), 513);
  assert_eq!(IndexWidth::U16.read(&bytes, 1), 7);

  let mut bytes = Vec::new();
  IndexWidth::U32.write(&mut bytes, 70_000);
  assert_eq!(bytes.len(), 4);
  assert_eq!(IndexWidth::U32.read(&bytes, 0), 70_000);
}

// LodConfig validation tests
#[test]
fn test_config_builder() {
  let config = LodConfig::new()
    .with_strategy(LodStrategy::DistanceBox)
    .with_level(10.0, ReductionMethod::Proportional(0.25))
    .with_level(20.0, ReductionMethod::Constant(4));

  assert_eq!(config.strategy, LodStrategy::DistanceBox);
  assert_eq!(config.level_count(), 2);
  assert_eq!(config.levels[1].reduction, ReductionMethod::Constant(4));
  assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_empty() {
  assert_eq!(LodConfig::new().validate(), Err(LodError::EmptyLodLevels));
}

#[test]
fn test_config_rejects_too_many_levels() {
  let levels = (0..MAX_LOD_LEVELS + 1).map(|i| LodLevel::proportional(i as f32 + 1.0, 0.0));
  let config = LodConfig::new().with_levels(levels);
  assert_eq!(
    config.validate(),
    Err(LodError::TooManyLodLevels {
      count: MAX_LOD_LEVELS + 1,
      max: MAX_LOD_LEVELS,
    })
  );
}

#[test]
fn test_config_rejects_unsorted() {
  let config = LodConfig::new()
    .with_level(20.0, ReductionMethod::Proportional(0.2))
    .with_level(10.0, ReductionMethod::Proportional(0.4));
  assert_eq!(
    config.validate(),
    Err(LodError::UnsortedLodLevels {
      index: 1,
      distance: 10.0,
      previous: 20.0,
    })
  );

  // Equal distances are not strictly increasing
  let config = LodConfig::new()
    .with_level(10.0, ReductionMethod::Proportional(0.2))
    .with_level(10.0, ReductionMethod::Proportional(0.4));
  assert!(matches!(
    config.validate(),
    Err(LodError::UnsortedLodLevels { index: 1, .. })
  ));
}

#[test]
fn test_config_rejects_bad_values() {
  let config = LodConfig::new().with_level(f32::NAN, ReductionMethod::Proportional(0.5));
  assert!(matches!(
    config.validate(),
    Err(LodError::InvalidLodDistance { index: 0, .. })
  ));

  let config = LodConfig::new().with_level(5.0, ReductionMethod::Proportional(1.5));
  assert_eq!(
    config.validate(),
    Err(LodError::InvalidReduction {
      index: 0,
      value: 1.5,
    })
  );

  let config = LodConfig::new().with_level(5.0, ReductionMethod::CollapseCost(f32::NAN));
  assert!(matches!(
    config.validate(),
    Err(LodError::InvalidReduction { index: 0, .. })
  ));
}

#[test]
fn test_lod_usage_squares_distance() {
  let config = LodConfig::new()
    .with_level(3.0, ReductionMethod::Proportional(0.5))
    .with_level(4.0, ReductionMethod::Proportional(0.75));
  let usage = config.lod_usage();

  assert_eq!(usage.strategy, LodStrategy::DistanceSphere);
  assert_eq!(usage.levels.len(), 2);
  assert_eq!(usage.levels[0].user_value, 3.0);
  assert_eq!(usage.levels[0].value, 9.0);
  assert_eq!(usage.levels[1].value, 16.0);
}

#[test]
fn test_cost_params_builder() {
  let params = CostParams::new()
    .with_min_curvature(0.01)
    .with_flip_penalty(5.0)
    .with_border_penalty(0.2, 4.0)
    .with_validation(true);

  assert_eq!(params.min_curvature, 0.01);
  assert_eq!(params.flip_penalty, 5.0);
  assert_eq!(params.border, (0.2, 4.0));
  assert!(params.validate_topology);
}
