use tilemesh::config::FileConfig;
use tilemesh::input::parse_tile;
use tilemesh::layers::{
    build_powerline_graph, build_road_graph, generate_building_meshes, generate_powerline_meshes,
    generate_road_meshes,
};
use tilemesh::mesh::stl::estimate_stl_size;
use tilemesh::mesh::{validate_and_fix, write_stl};
use tilemesh::roof::{ConvexSkeleton, RoofBuilder, RoofType};

const TILE: &str = r#"{
    "buildings": [
        {"id": 1, "outer": [[[0,0],[20,0],[20,10],[0,10]]], "height": 10,
         "roof": {"type": "hipped", "height": 4}},
        {"id": 2, "outer": [[[30,0],[40,0],[40,10],[30,10]]],
         "roof": {"type": "pyramidal"}},
        {"id": 3, "outer": [[[50,0],[70,0],[70,12],[50,12]]], "height": 12,
         "roof": {"type": "mansard", "height": 4}},
        {"id": 4, "outer": [[[0,20],[16,20],[16,28],[0,28]]],
         "roof": {"type": "gambrel", "orientation": "along"}},
        {"id": 5, "outer": [[[20,20],[30,20],[30,30],[20,30]]],
         "roof": {"type": "skillion", "direction": 45}},
        {"id": 6, "outer": [[[40,20],[50,20],[50,30],[40,30]]],
         "roof": {"type": "onion", "height": 6}},
        {"id": 7, "outer": [[[60,20],[80,20],[80,40],[70,30],[60,40]]],
         "roof": {"type": "gabled"}},
        {"id": 8, "outer": [[[0,50],[30,50],[30,80],[0,80]]],
         "inner": [[[10,60],[20,60],[20,70],[10,70]]],
         "roof": {"type": "hipped"}}
    ],
    "roads": [
        {"points": [[-50,-10],[0,-10],[50,-10]], "width": 6},
        {"points": [[0,-60],[0,-10]], "width": 4},
        {"points": [[100,0],[120,0],[120,20],[100,20],[100,0]], "width": 3}
    ],
    "powerlines": [{"points": [[-50,100],[0,100],[50,100],[50,150]]}],
    "powerline_nodes": [
        {"position": [-50,100], "type": "tower"},
        {"position": [0,100], "type": "pole"},
        {"position": [50,100], "type": "tower"}
    ]
}"#;

#[test]
fn builds_a_whole_tile() {
    let tile = parse_tile(TILE).unwrap();
    let config = FileConfig::default();

    let roofs = RoofBuilder::new(&ConvexSkeleton, config.roof.clone());
    let buildings = generate_building_meshes(&tile.buildings, &roofs, &config.buildings);
    assert!(!buildings.is_empty());

    let mut roads = build_road_graph(&tile.roads, &config.roads);
    assert_eq!(roads.intersections().len(), 1);
    assert_eq!(roads.intersections()[0].directions().len(), 3);
    assert!(roads.road(tilemesh::roads::RoadId(2)).is_closed());
    let road_triangles = generate_road_meshes(&mut roads, &config.roads);
    assert!(!road_triangles.is_empty());

    let graph = build_powerline_graph(&tile.powerlines, &tile.powerline_nodes);
    let entities = graph.create_entities();
    // Three explicit nodes plus the ground end of the last span
    assert_eq!(entities.nodes.len(), 4);
    assert_eq!(entities.segments.len(), 3);
    let powerlines = generate_powerline_meshes(&entities, &config.powerlines);
    assert!(!powerlines.is_empty());

    let mut all = buildings;
    all.extend(road_triangles);
    all.extend(powerlines);
    let (validated, report) = validate_and_fix(all);
    assert_eq!(report.invalid_coords, 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.stl");
    write_stl(&path, &validated).unwrap();
    let written = std::fs::metadata(&path).unwrap().len() as usize;
    assert_eq!(written, estimate_stl_size(validated.len()));
}

#[test]
fn every_roof_shape_stays_within_its_building() {
    let tile = parse_tile(TILE).unwrap();
    let config = FileConfig::default();
    let roofs = RoofBuilder::new(&ConvexSkeleton, config.roof.clone());

    for building in &tile.buildings {
        let footprint = building.footprint().unwrap();
        let params = building.roof_params(&config.buildings);
        let roof = roofs.build(&footprint, &params);
        assert!(!roof.mesh.is_empty(), "building {} has no roof", building.id);

        let top = roof
            .mesh
            .positions
            .chunks(3)
            .map(|p| f64::from(p[1]))
            .fold(f64::MIN, f64::max);
        assert!(top <= params.top() + 1e-3, "building {} roof too tall", building.id);

        if params.roof_type == RoofType::Onion {
            continue;
        }
        let bounds = footprint.aabb().padded(config.roof.validation_padding);
        for p in roof.mesh.positions.chunks(3) {
            let (x, y) = (f64::from(p[0]), f64::from(p[2]));
            assert!(
                x >= bounds.min_x - 1e-4 && x <= bounds.max_x + 1e-4,
                "building {} roof leaves its footprint",
                building.id
            );
            assert!(y >= bounds.min_y - 1e-4 && y <= bounds.max_y + 1e-4);
        }
    }
}
