//! Micro-benchmarks of the randomizer cache and the DGK comparison round.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use secomp_core::cache::{ComparisonBlindingTuple, DgkBlindingTuple};
use secomp_core::dgk;
use secomp_core::integer::Integer;
use secomp_toycrypto::{paillier_keygen, ToyPaillier};

const L: u32 = 16;
const KAPPA: u32 = 80;

fn bench_randomizer_sampling(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(42);
    let (pk, _sk) = paillier_keygen(256, &mut rng);
    c.bench_function("comparison_blinding_tuple_sample", |b| {
        b.iter(|| ComparisonBlindingTuple::<ToyPaillier>::sample(&pk, L, KAPPA, &mut rng).unwrap())
    });
}

fn bench_dgk_round(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(43);
    let (dgk_pk, dgk_sk) = paillier_keygen(256, &mut rng);
    let alpha = Integer::from_i64(12345);
    let beta = Integer::from_i64(6789);
    c.bench_function("dgk_round_end_to_end", |b| {
        b.iter(|| {
            let tuple = DgkBlindingTuple::<ToyPaillier>::sample(&dgk_pk, L, &mut rng).unwrap();
            let beta_bits = dgk::encrypt_bits::<ToyPaillier>(&dgk_pk, &beta, L, &mut rng).unwrap();
            let (masked_terms, sign) = dgk::server_prepare_masked_terms::<ToyPaillier>(
                &dgk_pk, &alpha, L, &beta_bits, &tuple, &mut rng,
            )
            .unwrap();
            let delta_b = dgk::client_evaluate::<ToyPaillier>(&dgk_sk, &dgk_pk, &masked_terms).unwrap();
            dgk::combine_with_sign(delta_b, sign)
        })
    });
}

criterion_group!(benches, bench_randomizer_sampling, bench_dgk_round);
criterion_main!(benches);
