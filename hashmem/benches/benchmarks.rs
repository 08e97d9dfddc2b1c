use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hashmem::config::MemOpt;
use hashmem::index::encoded::EncodedSequence;
use hashmem::index::kmer_hash::KmerHashIndex;
use hashmem::mem::extend::SeedExtender;
use hashmem::mem::find_mems;

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

fn bench_index_build(c: &mut Criterion) {
    let reference = EncodedSequence::from_bytes(&make_reference(100_000), false, 1);

    c.bench_function("kmer_index_build_100k", |b| {
        b.iter(|| {
            black_box(KmerHashIndex::build(black_box(&reference), 56, 2).unwrap());
        })
    });
}

fn bench_seed_lookup(c: &mut Criterion) {
    let reference = EncodedSequence::from_bytes(&make_reference(100_000), false, 1);
    let index = KmerHashIndex::build(&reference, 56, 2).unwrap();
    let query = EncodedSequence::from_bytes(&make_reference(100_000)[5_000..6_000], false, 2);

    c.bench_function("seed_lookup_1k_positions", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for pos in (0..=query.last_bit() - 54).step_by(2) {
                if let Some(p) = index.lookup(query.seed_at(pos, 56)) {
                    found += p.len();
                }
            }
            black_box(found)
        })
    });
}

fn bench_extend(c: &mut Criterion) {
    let bases = make_reference(10_000);
    let reference = EncodedSequence::from_bytes(&bases, false, 1);
    let query = EncodedSequence::from_bytes(&bases[2_000..4_000], false, 2);

    c.bench_function("extend_2k_match", |b| {
        b.iter(|| {
            let mut ext = SeedExtender::new(&reference, &query, 56, 100);
            black_box(ext.extend(black_box(2 * 3_000), black_box(2 * 1_000)));
        })
    });
}

fn bench_find_mems(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    let bases = make_reference(50_000);
    let mut query = bases[10_000..12_000].to_vec();
    query.extend_from_slice(&bases[30_000..33_000]);
    let ref_path = dir.path().join("ref.fa");
    let query_path = dir.path().join("qry.fa");
    std::fs::write(&ref_path, [b">ref\n".as_slice(), &bases, b"\n"].concat()).unwrap();
    std::fs::write(&query_path, [b">qry\n".as_slice(), &query, b"\n"].concat()).unwrap();
    let opt = MemOpt { min_len: 50, work_prefix: Some(dir.path().to_path_buf()), ..Default::default() };

    c.bench_function("find_mems_50k_vs_5k", |b| {
        b.iter(|| {
            black_box(find_mems(&opt, &ref_path, &query_path).unwrap());
        })
    });
}

criterion_group!(benches, bench_index_build, bench_seed_lookup, bench_extend, bench_find_mems);
criterion_main!(benches);
