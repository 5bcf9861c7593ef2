use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use faer::rand::{Rng, SeedableRng, rngs::SmallRng};
use index_transform::{
    DimensionSelection, Index, IndexArray, IndexInterval, IndexTransform,
    ops::change_implicit_state,
};
use std::hint::black_box;

const RANK: usize = 3;
const EXTENT: Index = 64;

fn coords(n_rows: usize) -> Vec<Vec<Index>> {
    let mut rng = SmallRng::seed_from_u64(1991);
    let mut pts = Vec::with_capacity(n_rows);
    for _ in 0..n_rows {
        let mut pt = Vec::with_capacity(RANK);
        for _ in 0..RANK {
            pt.push(rng.random_range(0..EXTENT));
        }
        pts.push(pt);
    }
    pts
}

fn bounded_builder(output_rank: usize) -> index_transform::IndexTransformBuilder {
    let mut builder = IndexTransform::builder(RANK, output_rank);
    builder
        .lower_bounds(&[0; RANK])
        .unwrap()
        .shape(&[EXTENT; RANK])
        .unwrap();
    builder
}

fn single_input_transform() -> IndexTransform {
    let mut builder = bounded_builder(RANK);
    for d in 0..RANK {
        builder
            .output_single_input_dimension(d, 3, 2, RANK - 1 - d)
            .unwrap();
    }
    builder.build().unwrap()
}

fn array_transform() -> IndexTransform {
    let n = (EXTENT * EXTENT) as usize;
    let array = IndexArray::try_new((0..n as Index).collect(), &[EXTENT as usize, 1, EXTENT as usize])
        .unwrap();
    let mut builder = bounded_builder(2);
    builder
        .output_index_array(0, 0, 1, array, IndexInterval::infinite())
        .unwrap()
        .output_single_input_dimension(1, 0, 1, 1)
        .unwrap();
    builder.build().unwrap()
}

struct Bencher<'c> {
    name: String,
    criterion: &'c mut Criterion,
}

impl<'c> Bencher<'c> {
    fn new<S: Into<String>>(name: S, criterion: &'c mut Criterion) -> Self {
        Self {
            name: name.into(),
            criterion,
        }
    }

    fn evaluate(&mut self, t: &IndexTransform) {
        let coords = coords(1000);
        self.criterion
            .bench_function(&format!("{}[evaluate]", self.name), |b| {
                b.iter(|| {
                    for pt in coords.iter() {
                        black_box(t.transform_indices(pt).unwrap());
                    }
                })
            });
    }

    fn mark_implicit(&mut self, t: &IndexTransform) {
        let dims = DimensionSelection::try_new(&[1], RANK).unwrap();

        // the clone of the rep is made in setup, so this measures an in-place update
        self.criterion
            .bench_function(&format!("{}[mark unique]", self.name), |b| {
                b.iter_batched(
                    || IndexTransform::clone(t).mark_bounds_explicit(&dims, true, true).unwrap(),
                    |unique| black_box(change_implicit_state(unique, &dims, true, true, true, false)),
                    BatchSize::SmallInput,
                )
            });

        self.criterion
            .bench_function(&format!("{}[mark shared]", self.name), |b| {
                b.iter(|| black_box(change_implicit_state(t.clone(), &dims, true, true, true, false)))
            });

        self.criterion
            .bench_function(&format!("{}[mark shared domain-only]", self.name), |b| {
                b.iter(|| black_box(change_implicit_state(t.clone(), &dims, true, true, true, true)))
            });
    }
}

fn identity(c: &mut Criterion) {
    let mut bencher = Bencher::new("Identity", c);
    let t = IndexTransform::identity(RANK);
    bencher.evaluate(&t);
    bencher.mark_implicit(&t);
}

fn single_input_dimension(c: &mut Criterion) {
    let mut bencher = Bencher::new("SingleInputDimension", c);
    let t = single_input_transform();
    bencher.evaluate(&t);
    bencher.mark_implicit(&t);
}

fn index_array(c: &mut Criterion) {
    let mut bencher = Bencher::new("IndexArray", c);
    let t = array_transform();
    bencher.evaluate(&t);
    bencher.mark_implicit(&t);
}

criterion_group!(atoms, identity, single_input_dimension, index_array);
criterion_main!(atoms);
