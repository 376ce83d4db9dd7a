//! Benchmark for greedy-meshing a single chunk under a few fill patterns.
//!
//! Run with: cargo bench --package voxen_mesh --bench greedy_mesh

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use voxen_core::{Properties, VoxelTypeTable};
use voxen_mesh::greedy_mesh::{GreedyMesher, NeighborhoodSnapshot};
use voxen_store::{Chunk, ChunkCoord, VoxelStore, CHUNK_SIDE};

fn table() -> Arc<VoxelTypeTable> {
    Arc::new(
        VoxelTypeTable::builder()
            .register(1, Properties { name: "stone", opaque: true, solid: true, ..Properties::AIR })
            .build(),
    )
}

fn solid_chunk(side: usize, height: usize) -> Chunk {
    let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
    chunk.install_store(VoxelStore::dense_filled(side, height, 1));
    chunk
}

fn checkerboard_chunk(side: usize, height: usize) -> Chunk {
    let mut store = VoxelStore::dense_filled(side, height, 0);
    for y in 0..height {
        for z in 0..side {
            for x in 0..side {
                if (x + y + z) % 2 == 0 {
                    store.set(side, height, x, y, z, 1);
                }
            }
        }
    }
    let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
    chunk.install_store(store);
    chunk
}

fn benchmark_solid_chunk(c: &mut Criterion) {
    let table = table();
    let side = usize::try_from(CHUNK_SIDE).unwrap();
    let chunk = solid_chunk(side, 16);

    c.bench_function("greedy_mesh_solid_16_cube", |b| {
        let mut mesher = GreedyMesher::new();
        b.iter(|| {
            let snapshot = NeighborhoodSnapshot::new(&chunk, [None; 6]);
            black_box(mesher.mesh(&snapshot, &table))
        });
    });
}

fn benchmark_checkerboard_chunk(c: &mut Criterion) {
    let table = table();
    let side = usize::try_from(CHUNK_SIDE).unwrap();
    let chunk = checkerboard_chunk(side, 16);

    // Worst case for greedy merging: every quad is 1x1, nothing merges.
    c.bench_function("greedy_mesh_checkerboard_16_cube", |b| {
        let mut mesher = GreedyMesher::new();
        b.iter(|| {
            let snapshot = NeighborhoodSnapshot::new(&chunk, [None; 6]);
            black_box(mesher.mesh(&snapshot, &table))
        });
    });
}

fn benchmark_empty_chunk(c: &mut Criterion) {
    let table = table();
    let chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));

    c.bench_function("greedy_mesh_empty_chunk", |b| {
        let mut mesher = GreedyMesher::new();
        b.iter(|| {
            let snapshot = NeighborhoodSnapshot::new(&chunk, [None; 6]);
            black_box(mesher.mesh(&snapshot, &table))
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchmark_solid_chunk, benchmark_checkerboard_chunk, benchmark_empty_chunk
}

criterion_main!(benches);
