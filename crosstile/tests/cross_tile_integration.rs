//! Integration tests for the cross-tile symbol index.
//!
//! These tests drive the public API the way a tile cache would:
//! - Tiles across several zoom levels load and evict in random order
//! - Every label keeps at most one visible copy
//! - Protocol mistakes are reported without corrupting the index
//!
//! Run with: `cargo test --test cross_tile_integration`

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crosstile::coord::TileCoord;
use crosstile::cross_tile::{CrossTileSymbolIndex, SymbolIndexError, DEFAULT_TILE_EXTENT};
use crosstile::symbol::{Anchor, DuplicateState, OpacityState, SymbolInstance, TileSymbols};

// ============================================================================
// Helper Functions
// ============================================================================

const EXTENT: f64 = DEFAULT_TILE_EXTENT as f64;
const SOURCE_MAX_ZOOM: u8 = 14;
const LAYER: &str = "place-label";

/// Label positions are generated in extent units at this zoom.
const WORLD_ZOOM: u8 = 10;

/// A 4x4 block of zoom-10 tiles straddling zoom-8 and zoom-6 tile edges, so
/// every coarser level has non-descendant siblings.
const BLOCK_ROWS: std::ops::Range<u32> = 382..386;
const BLOCK_COLS: std::ops::Range<u32> = 510..514;
const PYRAMID_ZOOMS: [u8; 3] = [6, 8, 10];

/// A label at a fixed world position.
#[derive(Debug, Clone)]
struct Label {
    name: String,
    world: (f64, f64),
}

/// A tile of the pyramid and the labels it carries, in container order.
struct LoadedTile {
    coord: TileCoord,
    symbols: TileSymbols,
    labels: Vec<usize>,
}

fn random_labels(rng: &mut StdRng, count: usize) -> Vec<Label> {
    let x_range = (BLOCK_COLS.start as i64 * 8192)..(BLOCK_COLS.end as i64 * 8192);
    let y_range = (BLOCK_ROWS.start as i64 * 8192)..(BLOCK_ROWS.end as i64 * 8192);
    (0..count)
        .map(|i| Label {
            name: format!("label-{}", i),
            world: (
                rng.random_range(x_range.clone()) as f64,
                rng.random_range(y_range.clone()) as f64,
            ),
        })
        .collect()
}

/// Build every tile of the pyramid over the block, placing each label in the
/// one tile per zoom that contains it.
fn build_pyramid(labels: &[Label]) -> Vec<LoadedTile> {
    let mut tiles = Vec::new();
    for &zoom in &PYRAMID_ZOOMS {
        let shift = WORLD_ZOOM - zoom;
        let rows = (BLOCK_ROWS.start >> shift)..=((BLOCK_ROWS.end - 1) >> shift);
        for row in rows {
            let cols = (BLOCK_COLS.start >> shift)..=((BLOCK_COLS.end - 1) >> shift);
            for col in cols {
                let coord = TileCoord::new(row, col, zoom).unwrap();
                let scale = 2f64.powi(zoom as i32 - WORLD_ZOOM as i32);

                let mut instances = Vec::new();
                let mut carried = Vec::new();
                for (i, label) in labels.iter().enumerate() {
                    let x = label.world.0 * scale - col as f64 * EXTENT;
                    let y = label.world.1 * scale - row as f64 * EXTENT;
                    if (0.0..EXTENT).contains(&x) && (0.0..EXTENT).contains(&y) {
                        instances.push(
                            SymbolInstance::new(Anchor::new(x, y), label.name.as_str())
                                .with_opacity(
                                    OpacityState::new(zoom as f32 / 16.0, true),
                                    OpacityState::new(zoom as f32 / 32.0, true),
                                ),
                        );
                        carried.push(i);
                    }
                }

                tiles.push(LoadedTile {
                    coord,
                    symbols: TileSymbols::new(instances),
                    labels: carried,
                });
            }
        }
    }
    tiles
}

/// Check every label: the finest loaded copy is shown and all coarser loaded
/// copies are hidden.
fn assert_one_copy_per_label(tiles: &[LoadedTile], loaded: &[bool], label_count: usize) {
    let mut copies: Vec<Vec<(u8, DuplicateState)>> = vec![Vec::new(); label_count];
    for (tile, _) in tiles.iter().zip(loaded).filter(|&(_, &is_loaded)| is_loaded) {
        let symbols = tile.symbols.lock();
        for (slot, &label) in tile.labels.iter().enumerate() {
            copies[label].push((tile.coord.zoom, symbols[slot].duplicate));
        }
    }

    for (label, states) in copies.iter().enumerate() {
        let shown = states
            .iter()
            .filter(|(_, s)| *s == DuplicateState::Authoritative)
            .count();
        assert!(shown <= 1, "label-{} shown {} times: {:?}", label, shown, states);

        if states.len() >= 2 {
            let finest = states.iter().map(|(z, _)| *z).max().unwrap();
            for (zoom, state) in states {
                let expected = if *zoom == finest {
                    DuplicateState::Authoritative
                } else {
                    DuplicateState::Suppressed
                };
                assert_eq!(*state, expected, "label-{} at z{}: {:?}", label, zoom, states);
            }
        } else if let Some((zoom, state)) = states.first() {
            assert_ne!(
                *state,
                DuplicateState::Suppressed,
                "label-{} hidden with no other copy (z{})",
                label,
                zoom
            );
        }
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Load every tile in random order, then evict and reload at random.
#[test]
fn test_random_load_and_evict_keeps_one_copy_per_label() {
    for seed in [7_u64, 42, 1234] {
        let mut rng = StdRng::seed_from_u64(seed);
        let labels = random_labels(&mut rng, 60);
        let tiles = build_pyramid(&labels);
        assert_eq!(tiles.len(), 16 + 4 + 4);

        let mut index = CrossTileSymbolIndex::new();
        let mut loaded = vec![false; tiles.len()];

        let mut order: Vec<usize> = (0..tiles.len()).collect();
        order.shuffle(&mut rng);
        for i in order {
            index
                .add_tile_layer(LAYER, tiles[i].coord, SOURCE_MAX_ZOOM, &tiles[i].symbols)
                .unwrap();
            loaded[i] = true;
            assert_one_copy_per_label(&tiles, &loaded, labels.len());
        }

        // With the whole pyramid loaded only the zoom-10 copies are shown
        let snapshot = index.snapshot();
        let layer = snapshot.layer(LAYER).unwrap();
        assert_eq!(layer.zoom_levels, vec![6, 8, 10]);
        assert_eq!(layer.authoritative, labels.len());
        assert_eq!(layer.suppressed, 2 * labels.len());

        for _ in 0..200 {
            let i = rng.random_range(0..tiles.len());
            if loaded[i] {
                index
                    .remove_tile_layer(LAYER, tiles[i].coord, SOURCE_MAX_ZOOM)
                    .unwrap();
            } else {
                index
                    .add_tile_layer(LAYER, tiles[i].coord, SOURCE_MAX_ZOOM, &tiles[i].symbols)
                    .unwrap();
            }
            loaded[i] = !loaded[i];
            assert_one_copy_per_label(&tiles, &loaded, labels.len());
        }

        assert_eq!(
            index.layer(LAYER).map(|l| l.tile_count()).unwrap_or(0),
            loaded.iter().filter(|&&l| l).count()
        );
    }
}

/// The same tiles registered under two layers resolve independently.
#[test]
fn test_layers_resolve_independently() {
    let mut rng = StdRng::seed_from_u64(99);
    let labels = random_labels(&mut rng, 20);
    let roads = build_pyramid(&labels);
    let pois = build_pyramid(&labels);

    let mut index = CrossTileSymbolIndex::new();
    for tile in &roads {
        index
            .add_tile_layer("road-label", tile.coord, SOURCE_MAX_ZOOM, &tile.symbols)
            .unwrap();
    }
    // Only the coarsest poi tile is loaded: nothing to resolve against
    let coarsest = pois.iter().find(|t| t.coord.zoom == 6).unwrap();
    index
        .add_tile_layer("poi-label", coarsest.coord, SOURCE_MAX_ZOOM, &coarsest.symbols)
        .unwrap();

    assert!(coarsest
        .symbols
        .snapshot()
        .iter()
        .all(|s| s.duplicate == DuplicateState::Unevaluated));

    let snapshot = index.snapshot();
    assert_eq!(snapshot.layers.len(), 2);
    assert_eq!(snapshot.layer("poi-label").unwrap().tiles, 1);
    assert_eq!(snapshot.layer("road-label").unwrap().authoritative, labels.len());
}

/// Double registration and unknown removals are rejected without side effects.
#[test]
fn test_protocol_errors_leave_state_unchanged() {
    let parent = TileCoord::new(24, 32, 6).unwrap();
    let child = TileCoord::new(96, 128, 8).unwrap();
    let parent_symbols =
        TileSymbols::new(vec![SymbolInstance::new(Anchor::new(1024.0, 1024.0), "Harbour")]);
    let child_symbols =
        TileSymbols::new(vec![SymbolInstance::new(Anchor::new(4096.0, 4096.0), "Harbour")]);

    let mut index = CrossTileSymbolIndex::new();
    index
        .add_tile_layer(LAYER, parent, SOURCE_MAX_ZOOM, &parent_symbols)
        .unwrap();
    index
        .add_tile_layer(LAYER, child, SOURCE_MAX_ZOOM, &child_symbols)
        .unwrap();

    let before = index.snapshot();
    let parent_before = parent_symbols.snapshot();
    let child_before = child_symbols.snapshot();
    assert_eq!(child_before[0].duplicate, DuplicateState::Authoritative);

    let err = index
        .add_tile_layer(LAYER, child, SOURCE_MAX_ZOOM, &child_symbols)
        .unwrap_err();
    assert!(matches!(err, SymbolIndexError::TileAlreadyRegistered { tile, .. } if tile == child));

    let stranger = TileCoord::new(0, 0, 3).unwrap();
    let err = index
        .remove_tile_layer(LAYER, stranger, SOURCE_MAX_ZOOM)
        .unwrap_err();
    assert!(matches!(err, SymbolIndexError::TileNotRegistered { tile, .. } if tile == stranger));
    assert!(err.to_string().contains("3/0/0"));

    assert!(index
        .remove_tile_layer("unknown-layer", child, SOURCE_MAX_ZOOM)
        .is_err());

    assert_eq!(index.snapshot(), before);
    assert_eq!(parent_symbols.snapshot(), parent_before);
    assert_eq!(child_symbols.snapshot(), child_before);
}

/// A container dropped while registered is skipped rather than dereferenced.
#[test]
fn test_dropped_container_is_skipped() {
    let parent = TileCoord::new(24, 32, 6).unwrap();
    let child = TileCoord::new(96, 128, 8).unwrap();
    let parent_symbols =
        TileSymbols::new(vec![SymbolInstance::new(Anchor::new(1024.0, 1024.0), "Harbour")]);
    let child_symbols =
        TileSymbols::new(vec![SymbolInstance::new(Anchor::new(4096.0, 4096.0), "Harbour")]);

    let mut index = CrossTileSymbolIndex::new();
    index
        .add_tile_layer(LAYER, parent, SOURCE_MAX_ZOOM, &parent_symbols)
        .unwrap();
    index
        .add_tile_layer(LAYER, child, SOURCE_MAX_ZOOM, &child_symbols)
        .unwrap();
    assert_eq!(parent_symbols.lock()[0].duplicate, DuplicateState::Suppressed);

    drop(child_symbols);
    let snapshot = index.snapshot();
    assert_eq!(snapshot.layer(LAYER).unwrap().dead_tiles, 1);

    // No copy is left to hand the fade back from
    index
        .remove_tile_layer(LAYER, child, SOURCE_MAX_ZOOM)
        .unwrap();
    assert_eq!(parent_symbols.lock()[0].duplicate, DuplicateState::Suppressed);
    assert!(!index.contains_tile(LAYER, &child));
}
