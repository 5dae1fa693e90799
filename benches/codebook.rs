use criterion::{Criterion, black_box, criterion_group, criterion_main};
use imclassify::Codebook;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// 使用固定种子生成随机矩阵，确保结果可重现
fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_simple_fn((rows, cols), || rng.random::<f32>())
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let mut rng = StdRng::seed_from_u64(42);

    for (words, dim) in [(100, 64), (100, 128), (400, 128)] {
        let codebook = Codebook::new(random_matrix(&mut rng, words, dim)).unwrap();
        let descriptors = black_box(random_matrix(&mut rng, 500, dim));

        group.bench_function(format!("encode_{words}x{dim}"), |b| {
            b.iter(|| codebook.encode(descriptors.view()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
