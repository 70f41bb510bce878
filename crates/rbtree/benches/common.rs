use std::collections::BTreeMap;
use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{
    KeyOrder, apply_large_runtime_config, apply_medium_runtime_config, apply_small_runtime_config,
    generate_keys, seed_base, seed_for_iter,
};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rbtree::{Bias, RbTree, TreeMap, TreeMultiMap};

const SIZES: [usize; 3] = [1_000, 16_000, 256_000];
const LARGE_SIZE: usize = 100_000;
const OPS_PER_ITER: usize = 200;

/// The slice of a multimap API the workloads need.
pub trait BenchMap {
    fn new() -> Self;
    fn len(&self) -> usize;
    fn insert(&mut self, key: u64, value: u64);
    fn lower_bound(&self, key: u64) -> Option<u64>;
    fn count(&self, key: u64) -> usize;
    fn remove_one(&mut self, key: u64) -> bool;
}

impl BenchMap for TreeMap<u64, u64> {
    fn new() -> Self {
        TreeMap::new()
    }

    fn len(&self) -> usize {
        TreeMap::len(self)
    }

    fn insert(&mut self, key: u64, value: u64) {
        self.insert_or_assign(key, value);
    }

    fn lower_bound(&self, key: u64) -> Option<u64> {
        self.get(TreeMap::lower_bound(self, &key)).map(|&(k, _)| k)
    }

    fn count(&self, key: u64) -> usize {
        TreeMap::count(self, &key)
    }

    fn remove_one(&mut self, key: u64) -> bool {
        self.erase(&key) > 0
    }
}

impl BenchMap for TreeMultiMap<u64, u64> {
    fn new() -> Self {
        TreeMultiMap::new()
    }

    fn len(&self) -> usize {
        TreeMultiMap::len(self)
    }

    fn insert(&mut self, key: u64, value: u64) {
        self.emplace(key, value);
    }

    fn lower_bound(&self, key: u64) -> Option<u64> {
        self.get(TreeMultiMap::lower_bound(self, &key)).map(|&(k, _)| k)
    }

    fn count(&self, key: u64) -> usize {
        TreeMultiMap::count(self, &key)
    }

    fn remove_one(&mut self, key: u64) -> bool {
        self.extract(&key).is_ok()
    }
}

/// Multimap oracle: `std` B-tree of counts.
pub struct StdCounts(BTreeMap<u64, usize>, usize);

impl BenchMap for StdCounts {
    fn new() -> Self {
        StdCounts(BTreeMap::new(), 0)
    }

    fn len(&self) -> usize {
        self.1
    }

    fn insert(&mut self, key: u64, _value: u64) {
        *self.0.entry(key).or_default() += 1;
        self.1 += 1;
    }

    fn lower_bound(&self, key: u64) -> Option<u64> {
        self.0.range(key..).next().map(|(&k, _)| k)
    }

    fn count(&self, key: u64) -> usize {
        self.0.get(&key).copied().unwrap_or(0)
    }

    fn remove_one(&mut self, key: u64) -> bool {
        let Some(count) = self.0.get_mut(&key) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.0.remove(&key);
        }
        self.1 -= 1;
        true
    }
}

/// The bare engine, storing keys directly.
pub struct Engine(RbTree<u64>);

fn less(a: &u64, b: &u64) -> bool {
    a < b
}

impl BenchMap for Engine {
    fn new() -> Self {
        Engine(RbTree::new())
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, key: u64, _value: u64) {
        self.0.insert(key, less);
    }

    fn lower_bound(&self, key: u64) -> Option<u64> {
        let id = self.0.nearest(&key, less)?;
        let found = *self.0.value(id);
        if found < key {
            self.0.successor(id).map(|next| *self.0.value(next))
        } else {
            Some(found)
        }
    }

    fn count(&self, key: u64) -> usize {
        let mut count = 0;
        let mut current = self.0.descend_by(|v| v.cmp(&key), Bias::Left);
        while let Some(id) = current.filter(|&id| *self.0.value(id) == key) {
            count += 1;
            current = self.0.successor(id);
        }
        count
    }

    fn remove_one(&mut self, key: u64) -> bool {
        self.0.erase(&key, less).is_some()
    }
}

fn fill<M: BenchMap>(keys: &[u64]) -> M {
    let mut map = M::new();
    for (i, &k) in keys.iter().enumerate() {
        map.insert(k, i as u64);
    }
    map
}

pub fn bench_build<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str, order: KeyOrder)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    for &size in &SIZES {
        if size >= LARGE_SIZE {
            apply_large_runtime_config(group);
        } else {
            apply_medium_runtime_config(group);
        }
        let keys = generate_keys(order, size, seed_base(1, size as u64));
        let id = BenchmarkId::new(format!("{label}/{}", order.label()), size);
        group.bench_function(id, |bencher| {
            bencher.iter(|| black_box(fill::<M>(&keys).len()));
        });
    }
}

pub fn bench_lookup<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    for &size in &SIZES {
        apply_small_runtime_config(group);
        let base_seed = seed_base(2, size as u64);
        let keys = generate_keys(KeyOrder::Duplicated, size, base_seed);
        let map = fill::<M>(&keys);
        let span = (size / 8).max(1) as u64;

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(seed_for_iter(base_seed, iter));
                    let targets: Vec<u64> = (0..OPS_PER_ITER)
                        .map(|_| rng.random_range(0..span + span / 4))
                        .collect();
                    let start = Instant::now();
                    for &key in &targets {
                        black_box(map.lower_bound(key));
                        black_box(map.count(key));
                    }
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_churn<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    for &size in &SIZES {
        apply_small_runtime_config(group);
        let base_seed = seed_base(3, size as u64);
        let keys = generate_keys(KeyOrder::Shuffled, size, base_seed);
        let mut map = fill::<M>(&keys);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(seed_for_iter(base_seed, iter));
                    let victims: Vec<u64> = (0..OPS_PER_ITER / 2)
                        .map(|_| keys[rng.random_range(0..keys.len())])
                        .collect();
                    let start = Instant::now();
                    // Each victim goes out and straight back in, so the size is stable.
                    for &key in &victims {
                        if map.remove_one(key) {
                            map.insert(key, iter);
                        }
                    }
                    black_box(map.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_all_build<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    for order in KeyOrder::ALL {
        bench_build::<StdCounts, _>(group, "std_btree", order);
        bench_build::<Engine, _>(group, "engine", order);
        bench_build::<TreeMultiMap<u64, u64>, _>(group, "tree_multimap", order);
    }
    bench_build::<TreeMap<u64, u64>, _>(group, "tree_map", KeyOrder::Shuffled);
}

pub fn bench_all_lookup<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_lookup::<StdCounts, _>(group, "std_btree");
    bench_lookup::<Engine, _>(group, "engine");
    bench_lookup::<TreeMap<u64, u64>, _>(group, "tree_map");
    bench_lookup::<TreeMultiMap<u64, u64>, _>(group, "tree_multimap");
}

pub fn bench_all_churn<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_churn::<StdCounts, _>(group, "std_btree");
    bench_churn::<Engine, _>(group, "engine");
    bench_churn::<TreeMap<u64, u64>, _>(group, "tree_map");
    bench_churn::<TreeMultiMap<u64, u64>, _>(group, "tree_multimap");
}
