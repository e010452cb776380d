use super::*;
use crate::geometry::boxes_overlap;
use crate::types::Coordinates;

fn container(id: &str, width: u32, depth: u32, height: u32) -> Container {
    Container {
        container_id: id.to_string(),
        zone: "A".to_string(),
        dimensions: Dimensions {
            width,
            depth,
            height,
        },
        occupied_volume: 0,
        preloaded_items: Vec::new(),
    }
}

fn dims(width: u32, depth: u32, height: u32) -> Dimensions {
    Dimensions {
        width,
        depth,
        height,
    }
}

fn pos(x1: u32, y1: u32, z1: u32, x2: u32, y2: u32, z2: u32) -> Position {
    Position {
        start_coordinates: Coordinates {
            width: x1,
            depth: y1,
            height: z1,
        },
        end_coordinates: Coordinates {
            width: x2,
            depth: y2,
            height: z2,
        },
    }
}

#[test]
fn place_marks_region_and_tracks_volume() {
    let mut grid = OccupancyGrid::new(&container("c1", 10, 10, 10));

    assert!(grid.place_item("box", "Box", 24, &pos(0, 0, 0, 2, 3, 4)));
    assert_eq!(grid.occupied_volume(), 24);
    assert_eq!(grid.occupied_voxels(), 24);
    assert_eq!(grid.available_volume(), 1000 - 24);
    assert!(!grid.is_region_empty(0, 0, 0, 1, 1, 1));
    assert!(grid.is_region_empty(2, 0, 0, 10, 10, 10));
    assert_eq!(grid.item_at(1, 2, 3), Some("box"));
    assert_eq!(grid.item_at(2, 0, 0), None);
    assert_eq!(grid.item_position("box"), Some(&pos(0, 0, 0, 2, 3, 4)));
}

#[test]
fn place_rejects_out_of_bounds() {
    let mut grid = OccupancyGrid::new(&container("c1", 5, 5, 5));

    assert!(!grid.place_item("a", "A", 30, &pos(0, 0, 0, 6, 5, 1)));
    assert!(!grid.place_item("a", "A", 8, &pos(4, 4, 4, 6, 6, 6)));
    assert_eq!(grid.occupied_volume(), 0);
    assert_eq!(grid.occupied_voxels(), 0);
}

#[test]
fn place_rejects_collision_without_mutation() {
    let mut grid = OccupancyGrid::new(&container("c1", 5, 5, 5));

    assert!(grid.place_item("a", "A", 8, &pos(0, 0, 0, 2, 2, 2)));
    assert!(!grid.place_item("b", "B", 8, &pos(1, 1, 1, 3, 3, 3)));
    assert_eq!(grid.occupied_volume(), 8);
    assert!(!grid.contains_item("b"));
    assert_eq!(grid.item_at(1, 1, 1), Some("a"));
}

#[test]
fn place_rejects_duplicate_id_and_volume_mismatch() {
    let mut grid = OccupancyGrid::new(&container("c1", 5, 5, 5));

    assert!(grid.place_item("a", "A", 1, &pos(0, 0, 0, 1, 1, 1)));
    assert!(!grid.place_item("a", "A", 1, &pos(2, 2, 2, 3, 3, 3)));
    // a 2x2x2 box cannot hold an item whose true volume is 7
    assert!(!grid.place_item("b", "B", 7, &pos(2, 2, 2, 4, 4, 4)));
    assert_eq!(grid.occupied_volume(), 1);
    assert!(grid.is_region_empty(2, 2, 2, 4, 4, 4));
}

#[test]
fn remove_restores_pristine_state() {
    let mut grid = OccupancyGrid::new(&container("c1", 6, 6, 6));

    assert!(grid.place_item("a", "A", 27, &pos(1, 1, 1, 4, 4, 4)));
    assert!(grid.remove_item("a"));
    assert_eq!(grid.occupied_volume(), 0);
    assert_eq!(grid.occupied_voxels(), 0);
    assert!(grid.is_region_empty(0, 0, 0, 6, 6, 6));
    assert!(!grid.contains_item("a"));
    assert!(!grid.remove_item("a"));
}

#[test]
fn region_query_rejects_degenerate_boxes() {
    let grid = OccupancyGrid::new(&container("c1", 4, 4, 4));

    assert!(!grid.is_region_empty(2, 0, 0, 2, 4, 4));
    assert!(!grid.is_region_empty(3, 0, 0, 2, 4, 4));
    assert!(!grid.is_region_empty(0, 0, 0, 5, 4, 4));
    assert!(grid.is_region_empty(0, 0, 0, 4, 4, 4));
}

#[test]
fn occupancy_is_conserved_across_many_items() {
    let mut grid = OccupancyGrid::new(&container("c1", 8, 8, 8));
    let boxes = [
        ("a", pos(0, 0, 0, 4, 4, 4)),
        ("b", pos(4, 0, 0, 8, 2, 2)),
        ("c", pos(0, 4, 0, 2, 8, 3)),
    ];

    let mut expected = 0;
    for (id, position) in &boxes {
        assert!(grid.place_item(id, id, position.volume(), position));
        expected += position.volume();
    }
    assert_eq!(grid.occupied_volume(), expected);
    assert_eq!(grid.occupied_voxels(), expected);

    // stored boxes are pairwise disjoint
    for (i, (id_a, _)) in boxes.iter().enumerate() {
        for (id_b, _) in &boxes[i + 1..] {
            let a = grid.item_position(id_a).unwrap();
            let b = grid.item_position(id_b).unwrap();
            assert!(!boxes_overlap(a, b));
        }
    }

    assert!(grid.remove_item("b"));
    assert_eq!(grid.occupied_volume(), expected - 32);
    assert_eq!(grid.occupied_voxels(), expected - 32);
}

#[test]
fn best_fit_prefers_low_then_left_then_front() {
    let mut grid = OccupancyGrid::new(&container("c1", 4, 4, 4));
    assert!(grid.place_item("wall", "Wall", 32, &pos(0, 0, 0, 2, 4, 4)));

    // floor is taken for x < 2, so the best anchor sits at (2, 0, 0)
    assert_eq!(
        grid.find_best_fit(&dims(1, 1, 1)),
        FitSearch::Fit(pos(2, 0, 0, 3, 1, 1))
    );
}

#[test]
fn best_fit_prefers_front_over_back() {
    let mut grid = OccupancyGrid::new(&container("c1", 2, 4, 2));
    assert!(grid.place_item("front", "Front", 4, &pos(0, 0, 0, 2, 1, 2)));

    assert_eq!(
        grid.find_best_fit(&dims(2, 1, 2)),
        FitSearch::Fit(pos(0, 1, 0, 2, 2, 2))
    );
}

#[test]
fn best_fit_rotates_to_the_only_feasible_orientation() {
    let grid = OccupancyGrid::new(&container("c1", 10, 10, 2));

    // only the (10, 10, 2) permutation of (2, 10, 10) fits under the ceiling
    assert_eq!(
        grid.find_best_fit(&dims(2, 10, 10)),
        FitSearch::Fit(pos(0, 0, 0, 10, 10, 2))
    );
}

#[test]
fn best_fit_reports_no_fit() {
    let grid = OccupancyGrid::new(&container("c1", 2, 2, 2));
    assert_eq!(grid.find_best_fit(&dims(3, 1, 1)), FitSearch::NoFit);

    let mut full = OccupancyGrid::new(&container("c2", 3, 3, 3));
    assert!(full.place_item("block", "Block", 27, &pos(0, 0, 0, 3, 3, 3)));
    assert_eq!(full.find_best_fit(&dims(1, 1, 1)), FitSearch::NoFit);
}

#[test]
fn best_fit_exhausts_budget_in_a_full_container() {
    // 25^3 anchor positions for a unit item exceed the 10,000-position
    // budget, and the single block leaves none of them empty
    let mut grid = OccupancyGrid::new(&container("c1", 25, 25, 25));
    assert!(grid.place_item(
        "block",
        "Block",
        25 * 25 * 25,
        &pos(0, 0, 0, 25, 25, 25)
    ));

    assert_eq!(grid.find_best_fit(&dims(1, 1, 1)), FitSearch::Exhausted);
}

#[test]
fn large_items_keep_their_volume_through_sampling() {
    // volume 5,832 > 5,000 triggers anchor subsampling
    let grid = OccupancyGrid::new(&container("c1", 40, 40, 40));
    match grid.find_best_fit(&dims(18, 18, 18)) {
        FitSearch::Fit(position) => {
            assert_eq!(position, pos(0, 0, 0, 18, 18, 18));
            assert_eq!(position.volume(), 5_832);
        }
        other => panic!("expected a fit, got {other:?}"),
    }
}

#[test]
fn sparse_storage_is_chosen_above_the_voxel_limit() {
    let dense = OccupancyGrid::new(&container("small", 100, 100, 100));
    assert!(!dense.is_sparse());

    let sparse = OccupancyGrid::new(&container("big", 101, 100, 100));
    assert!(sparse.is_sparse());
}

#[test]
fn sparse_grid_behaves_like_the_dense_form() {
    let mut grid = OccupancyGrid::new(&container("big", 101, 100, 100));
    assert!(grid.is_sparse());

    assert!(grid.place_item("a", "A", 8, &pos(0, 0, 0, 2, 2, 2)));
    assert!(!grid.place_item("b", "B", 8, &pos(1, 1, 1, 3, 3, 3)));
    assert_eq!(grid.occupied_volume(), 8);
    assert_eq!(grid.occupied_voxels(), 8);
    assert_eq!(grid.item_at(0, 0, 0), Some("a"));

    // anchors up to y=1 sit inside the block, so the search lands behind it
    assert_eq!(
        grid.find_best_fit(&dims(1, 1, 1)),
        FitSearch::Fit(pos(0, 2, 0, 1, 3, 1))
    );

    assert!(grid.remove_item("a"));
    assert_eq!(grid.occupied_voxels(), 0);
    assert!(grid.is_region_empty(0, 0, 0, 2, 2, 2));
}

#[test]
fn anchor_offsets_always_include_both_extremes() {
    assert_eq!(anchor_offsets(0, 1), vec![0]);
    assert_eq!(anchor_offsets(4, 1), vec![0, 1, 2, 3, 4]);
    assert_eq!(anchor_offsets(10, 3), vec![0, 3, 6, 9, 10]);
    assert_eq!(anchor_offsets(9, 3), vec![0, 3, 6, 9]);
}
