//! End-to-end exercise of the comparison algorithm with a single process
//! playing both roles, using the toy cryptosystem. The interactive message
//! passing implemented for real in `secomp-client`/`secomp-server` is inlined
//! here as direct function calls over the same pure protocol logic.

use rand::SeedableRng;
use secomp_core::cache::{ComparisonBlindingTuple, DgkBlindingTuple};
use secomp_core::compare;
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::dgk;
use secomp_core::integer::Integer;
use secomp_toycrypto::{paillier_keygen, ToyPaillier, ToyPublicKey, ToySecretKey};

const L: u32 = 16;
const KAPPA: u32 = 80;

struct Fixture {
    outer_pk: ToyPublicKey,
    outer_sk: ToySecretKey,
    dgk_pk: ToyPublicKey,
    dgk_sk: ToySecretKey,
}

fn fixture(seed: u64) -> Fixture {
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
    let (outer_pk, outer_sk) = paillier_keygen(256, &mut rng);
    let (dgk_pk, dgk_sk) = paillier_keygen(256, &mut rng);
    Fixture {
        outer_pk,
        outer_sk,
        dgk_pk,
        dgk_sk,
    }
}

/// Runs the full protocol for one `(a, b)` pair and returns the decrypted result.
fn run_compare(fixture: &Fixture, a: i64, b: i64, rng: &mut rand_chacha::ChaCha20Rng) -> i64 {
    let a_ct =
        compare::encrypt_operand::<ToyPaillier>(&fixture.outer_pk, &Integer::from_i64(a), L, rng).unwrap();
    let b_ct =
        compare::encrypt_operand::<ToyPaillier>(&fixture.outer_pk, &Integer::from_i64(b), L, rng).unwrap();

    let tuple = ComparisonBlindingTuple::<ToyPaillier>::sample(&fixture.outer_pk, L, KAPPA, rng).unwrap();
    let z_ct = compare::blind_difference::<ToyPaillier>(&fixture.outer_pk, L, &a_ct, &b_ct, &tuple).unwrap();

    // Client: decrypt z, split it, and re-encrypt the quotient.
    let z = ToyPaillier::decrypt(&fixture.outer_sk, &fixture.outer_pk, &z_ct).unwrap();
    let (z_mod, z_div) = compare::split_z(&z, L);
    let z_div_ct = ToyPaillier::encrypt(&fixture.outer_pk, &z_div, rng).unwrap();

    // DGK round: server's share is r mod 2^l, client's share is z mod 2^l.
    let dgk_tuple = DgkBlindingTuple::<ToyPaillier>::sample(&fixture.dgk_pk, L, rng).unwrap();
    let beta_bits = dgk::encrypt_bits::<ToyPaillier>(&fixture.dgk_pk, &z_mod, L, rng).unwrap();
    let (masked_terms, sign) = dgk::server_prepare_masked_terms::<ToyPaillier>(
        &fixture.dgk_pk,
        &tuple.r_mod_two_pow_l,
        L,
        &beta_bits,
        &dgk_tuple,
        rng,
    )
    .unwrap();
    let delta_b = dgk::client_evaluate::<ToyPaillier>(&fixture.dgk_sk, &fixture.dgk_pk, &masked_terms).unwrap();
    let t = dgk::combine_with_sign(delta_b, sign);
    let t_ct = ToyPaillier::encrypt(&fixture.outer_pk, &Integer::from_i64(t as i64), rng).unwrap();

    let gamma_ct = compare::finish_compare::<ToyPaillier>(&z_div_ct, &tuple, &t_ct);
    let gamma = ToyPaillier::decrypt(&fixture.outer_sk, &fixture.outer_pk, &gamma_ct).unwrap();
    if gamma.bit(0) {
        1
    } else {
        0
    }
}

#[test]
fn scenario_table_matches_spec() {
    let fixture = fixture(1);
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(2);
    let cases = [
        (0i64, 0i64, 1i64),
        (5, 3, 1),
        (3, 5, 0),
        (-100, 100, 0),
        (32767, -32767, 1),
        (42, 42, 1),
    ];
    for (a, b, expected) in cases {
        let result = run_compare(&fixture, a, b, &mut rng);
        assert_eq!(result, expected, "compare({a}, {b})");
    }
}

#[test]
fn truth_table_is_complementary_except_on_ties() {
    let fixture = fixture(3);
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(4);
    let forward = run_compare(&fixture, 10, 20, &mut rng);
    let backward = run_compare(&fixture, 20, 10, &mut rng);
    assert_eq!(forward, 0);
    assert_eq!(backward, 1);

    let tie_a = run_compare(&fixture, 7, 7, &mut rng);
    let tie_b = run_compare(&fixture, 7, 7, &mut rng);
    assert_eq!(tie_a, 1);
    assert_eq!(tie_b, 1);
}

#[test]
fn precision_bound_is_enforced() {
    let fixture = fixture(5);
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(6);
    let too_large = Integer::two_pow(L - 1);
    let result = compare::encrypt_operand::<ToyPaillier>(&fixture.outer_pk, &too_large, L, &mut rng);
    assert!(matches!(
        result,
        Err(secomp_core::Error::PrecisionBound { l: L, .. })
    ));
}
