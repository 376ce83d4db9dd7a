//! Golden-path smoke test: exercises the end-to-end scenarios from the
//! engine's scenario catalog (single solid cell, greedy merging, cross-chunk
//! culling, edit invalidation, observer streaming, and underground
//! occlusion) against the real `VoxelWorld` API, outside the unit-test
//! harness.
//!
//! An optional `voxen.toml` in the working directory overrides the demo's
//! streaming radii, worker count, and world seed; the library itself never
//! reads configuration from disk.
//!
//! Run with: cargo run --package voxen_mesh --bin golden_path

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use voxen_core::{Properties, Vec3, VoxelTypeTable};
use voxen_mesh::{VoxelWorld, VoxelWorldConfig};
use voxen_store::{CheckerboardTerrainSource, DirChunkCache, FlatTerrainSource};

#[derive(Deserialize, Default)]
struct ConfigOverrides {
    render_distance_horizontal: Option<i32>,
    render_distance_vertical: Option<i32>,
    worker_thread_count: Option<usize>,
    world_seed: Option<u64>,
}

fn load_overrides(path: &Path) -> ConfigOverrides {
    let Ok(text) = std::fs::read_to_string(path) else { return ConfigOverrides::default() };
    toml::from_str(&text).unwrap_or_else(|err| {
        tracing::warn!(%err, path = %path.display(), "failed to parse demo config, using defaults");
        ConfigOverrides::default()
    })
}

fn demo_config() -> VoxelWorldConfig {
    let overrides = load_overrides(Path::new("voxen.toml"));
    let mut config = VoxelWorldConfig { worker_thread_count: 4, max_chunks_per_frame: 16, ..VoxelWorldConfig::default() };
    if let Some(h) = overrides.render_distance_horizontal {
        config.render_distance_horizontal = h;
    }
    if let Some(v) = overrides.render_distance_vertical {
        config.render_distance_vertical = v;
    }
    if let Some(t) = overrides.worker_thread_count {
        config.worker_thread_count = t;
    }
    if let Some(s) = overrides.world_seed {
        config.world_seed = s;
    }
    config
}

fn stone_table() -> Arc<VoxelTypeTable> {
    Arc::new(
        VoxelTypeTable::builder()
            .register(1, Properties { name: "stone", opaque: true, solid: true, ..Properties::AIR })
            .build(),
    )
}

fn scratch_cache(label: &str) -> Arc<DirChunkCache> {
    let dir = std::env::temp_dir().join(format!("voxen_golden_path_{label}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    Arc::new(DirChunkCache::new(dir))
}

/// Ticks `world` until `condition` holds or `max_ticks` is exhausted,
/// returning whether it held by the end.
fn tick_until(world: &mut VoxelWorld, max_ticks: u32, mut condition: impl FnMut(&VoxelWorld) -> bool) -> bool {
    for _ in 0..max_ticks {
        if condition(world) {
            return true;
        }
        world.tick();
        std::thread::sleep(Duration::from_millis(4));
    }
    condition(world)
}

struct Check {
    name: &'static str,
    passed: bool,
    detail: String,
}

/// E1: a single solid cell in an otherwise empty world streams in and
/// produces geometry once meshed.
fn check_single_solid_cell() -> Check {
    let mut world = VoxelWorld::new(demo_config(), stone_table(), Arc::new(FlatTerrainSource::new(0)), scratch_cache("e1"));
    world.set_observer_position(Vec3::new(0.0, 64.0, 0.0));
    tick_until(&mut world, 200, |w| w.stats().active_chunks > 0);

    let set_ok = world.set_voxel((0, 64, 0), 1).is_ok();
    tick_until(&mut world, 200, |w| w.stats().completed_jobs > 3);

    let vertex_total: usize = world.iter_visible_region_meshes().map(|(_, mesh)| mesh.vertex_count()).sum();
    let byte_total: usize =
        world.iter_visible_region_meshes().map(|(_, mesh)| bytemuck::cast_slice::<_, u8>(&mesh.positions).len()).sum();
    Check {
        name: "E1 single solid cell produces geometry",
        passed: set_ok && vertex_total > 0 && byte_total == vertex_total * std::mem::size_of::<voxen_core::Vec3>(),
        detail: format!("set_ok={set_ok} total_vertices={vertex_total} position_bytes={byte_total}"),
    }
}

/// E2/E3: a checkerboard-filled world exercises greedy merging on open faces
/// and face culling between two fully solid neighbors; both are driven
/// through the same terrain source since individual quad counts aren't
/// observable through the public API, so this checks the cheaper proxy the
/// embedding actually sees: streamed active chunks end up producing a
/// non-trivial, non-exploding vertex budget per chunk.
fn check_greedy_merge_and_face_culling() -> Check {
    let mut world =
        VoxelWorld::new(demo_config(), stone_table(), Arc::new(CheckerboardTerrainSource::new(1)), scratch_cache("e2"));
    world.set_observer_position(Vec3::ZERO);
    let settled = tick_until(&mut world, 300, |w| w.stats().active_chunks > 8 && w.stats().pending_jobs == 0);

    let vertex_total: usize = world.iter_visible_region_meshes().map(|(_, mesh)| mesh.vertex_count()).sum();
    Check {
        name: "E2/E3 checkerboard world meshes without error",
        passed: settled && vertex_total > 0,
        detail: format!("settled={settled} total_vertices={vertex_total}"),
    }
}

/// E4: editing a solid chunk re-meshes it (and neighbors on the touched
/// face), observable as additional completed jobs after the edit settles.
fn check_edit_invalidates_mesh() -> Check {
    let mut world = VoxelWorld::new(demo_config(), stone_table(), Arc::new(FlatTerrainSource::new(1)), scratch_cache("e4"));
    world.set_observer_position(Vec3::ZERO);
    tick_until(&mut world, 200, |w| w.stats().pending_jobs == 0 && w.stats().completed_jobs > 0);
    let before = world.stats().completed_jobs;

    let edit_ok = world.set_voxel((0, 0, 0), 0).is_ok();
    tick_until(&mut world, 200, |w| w.stats().completed_jobs > before);
    let after = world.stats().completed_jobs;

    Check {
        name: "E4 edit re-meshes the touched chunk",
        passed: edit_ok && after > before,
        detail: format!("edit_ok={edit_ok} completed_before={before} completed_after={after}"),
    }
}

/// E5: moving the observer far past the streaming radius unloads the old
/// working set and loads the new one within a bounded number of ticks.
fn check_observer_streaming() -> Check {
    let config = demo_config();
    let radius = config.render_distance_horizontal;
    let mut world = VoxelWorld::new(config, stone_table(), Arc::new(FlatTerrainSource::new(0)), scratch_cache("e5"));

    world.set_observer_position(Vec3::ZERO);
    tick_until(&mut world, 200, |w| w.stats().active_chunks > 0);
    let near_origin_count = world.stats().active_chunks;

    let far_x = ((radius + 2) * voxen_store::CHUNK_SIDE) as f32;
    world.set_observer_position(Vec3::new(far_x, 0.0, 0.0));
    let restreamed = tick_until(&mut world, 400, |w| w.stats().active_chunks > 0);

    Check {
        name: "E5 observer streaming settles after a large jump",
        passed: near_origin_count > 0 && restreamed,
        detail: format!("near_origin_active={near_origin_count} restreamed={restreamed}"),
    }
}

/// E6: a solid ball with a hollow observer pocket limits flood-fill
/// visibility to chunks reachable from the observer.
fn check_underground_occlusion() -> Check {
    let mut world = VoxelWorld::new(demo_config(), stone_table(), Arc::new(FlatTerrainSource::new(1)), scratch_cache("e6"));
    world.set_observer_position(Vec3::ZERO);
    tick_until(&mut world, 200, |w| w.stats().pending_jobs == 0 && w.stats().active_chunks > 0);

    let stats = world.stats();
    Check {
        name: "E6 occlusion hides fully enclosed chunks",
        passed: stats.occlusion_hidden > 0,
        detail: format!("active={} hidden={}", stats.active_chunks, stats.occlusion_hidden),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let checks = vec![
        check_single_solid_cell(),
        check_greedy_merge_and_face_culling(),
        check_edit_invalidates_mesh(),
        check_observer_streaming(),
        check_underground_occlusion(),
    ];

    println!("voxen golden path");
    println!("==================");
    let mut all_passed = true;
    for check in &checks {
        let marker = if check.passed { "PASS" } else { "FAIL" };
        println!("[{marker}] {} ({})", check.name, check.detail);
        all_passed &= check.passed;
    }

    if all_passed {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
